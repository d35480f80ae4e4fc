//! # Broker Runtime
//!
//! Initializes and orchestrates the broker services over one shared bus.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Construct the bus
//! 3. Start the db-processor consumer (request topics must be consumed
//!    before any caller publishes)
//! 4. Start the bridge: subscribe response topics, spawn the correlator,
//!    flip the readiness gate
//! 5. Start price-feed ingestion
//! 6. Signal ready

use api_bridge::{Bridge, BridgeConfig, BridgeHandle, RequestDispatcher};
use db_processor::{DbProcessor, DbProcessorHandle, MemoryStore};
use price_feed::{FeedConfig, PricePoller, PriceSource, SimulatedSource};
use shared_bus::InMemoryBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Runtime configuration, loaded from the environment with defaults.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bridge: BridgeConfig,
    pub feed: FeedConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Read overrides from the environment.
    ///
    /// - `BROKER_CALL_TIMEOUT_MS` - default per-call deadline
    /// - `BROKER_READINESS_WAIT_MS` - readiness gate wait budget
    /// - `BROKER_FEED_SYMBOLS` - comma-separated symbol list
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = env_millis("BROKER_CALL_TIMEOUT_MS") {
            config.bridge.default_call_timeout = ms;
        }
        if let Some(ms) = env_millis("BROKER_READINESS_WAIT_MS") {
            config.bridge.readiness_wait = ms;
        }
        if let Ok(symbols) = std::env::var("BROKER_FEED_SYMBOLS") {
            let parsed: Vec<String> = symbols
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !parsed.is_empty() {
                config.feed.symbols = parsed;
            }
        }

        config
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// The assembled broker process.
pub struct BrokerRuntime {
    bus: Arc<InMemoryBus>,
    bridge: BridgeHandle,
    processor: DbProcessorHandle,
    poller: JoinHandle<()>,
}

impl BrokerRuntime {
    /// Wire and start every component over a fresh in-memory bus, using
    /// the simulated upstream feed.
    ///
    /// # Errors
    ///
    /// Fails when the bridge configuration is invalid.
    pub fn start(config: RuntimeConfig) -> anyhow::Result<Self> {
        let source = Arc::new(SimulatedSource::default());
        Self::start_with_source(config, source)
    }

    /// Wire and start with a specific upstream price source (the
    /// exchange adapter in production, a scripted source in tests).
    ///
    /// # Errors
    ///
    /// Fails when the bridge configuration is invalid.
    pub fn start_with_source(
        config: RuntimeConfig,
        source: Arc<dyn PriceSource>,
    ) -> anyhow::Result<Self> {
        let bus = Arc::new(InMemoryBus::new());
        let store = Arc::new(MemoryStore::new());

        // Consumers first: request topics before anything publishes.
        let processor = DbProcessor::start(bus.clone(), store);
        info!("DB processor started");

        let bridge = Bridge::start(bus.clone(), config.bridge)?;
        info!("Request-reply bridge ready");

        let poller = PricePoller::new(source, bus.clone(), config.feed).spawn();
        info!("Price feed ingestion started");

        Ok(Self {
            bus,
            bridge,
            processor,
            poller,
        })
    }

    /// A dispatcher for issuing calls into the platform (what the API
    /// server embeds).
    #[must_use]
    pub fn dispatcher(&self) -> RequestDispatcher {
        self.bridge.dispatcher()
    }

    /// The shared bus, for consumers outside the request-reply pairs
    /// (e.g. fanning `price-updates` out to browser clients).
    #[must_use]
    pub fn bus(&self) -> Arc<InMemoryBus> {
        self.bus.clone()
    }

    /// Stop every background task.
    pub fn shutdown(self) {
        self.poller.abort();
        self.processor.shutdown();
        self.bridge.shutdown();
        info!("Broker runtime stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::topics::{BALANCE_QUERY, USER_CREATION};

    #[tokio::test]
    async fn test_runtime_signup_then_balance() {
        let runtime = BrokerRuntime::start(RuntimeConfig::default()).unwrap();
        let dispatcher = runtime.dispatcher();

        let created = dispatcher
            .call(
                USER_CREATION.request,
                json!({"email": "a@b.c", "name": "Ada", "password": "$2b$10$hash"}),
                Some(Duration::from_secs(2)),
            )
            .await
            .unwrap();
        assert!(created.is_success());

        // Balance queries need the user id; authenticate to fetch it.
        let auth = dispatcher
            .call(
                "user-authentication-request",
                json!({"email": "a@b.c"}),
                Some(Duration::from_secs(2)),
            )
            .await
            .unwrap();
        let user_id = auth.payload()["userId"].as_str().unwrap().to_string();

        let balance = dispatcher
            .call(
                BALANCE_QUERY.request,
                json!({"userId": user_id}),
                Some(Duration::from_secs(2)),
            )
            .await
            .unwrap();
        assert!(balance.is_success());
        assert_eq!(balance.payload()["balance"], 500_000);

        runtime.shutdown();
    }

    #[test]
    fn test_config_from_env_defaults() {
        let config = RuntimeConfig::from_env();
        assert_eq!(config.bridge.default_call_timeout, Duration::from_secs(10));
        assert!(!config.feed.symbols.is_empty());
    }
}
