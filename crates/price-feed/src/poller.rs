//! The ingestion loop.

use crate::config::FeedConfig;
use crate::source::PriceSource;
use shared_bus::{BusPublisher, BusRecord};
use shared_types::topics::PRICE_UPDATES;
use shared_types::PriceUpdate;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

/// Connects upstream, republishes ticks, reconnects on loss.
pub struct PricePoller {
    source: Arc<dyn PriceSource>,
    bus: Arc<dyn BusPublisher>,
    config: FeedConfig,
}

impl PricePoller {
    pub fn new(
        source: Arc<dyn PriceSource>,
        bus: Arc<dyn BusPublisher>,
        config: FeedConfig,
    ) -> Self {
        Self {
            source,
            bus,
            config,
        }
    }

    /// Run the poller as a background task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Connect-consume-reconnect forever.
    ///
    /// The backoff delay doubles per failed attempt up to its cap and
    /// resets to the initial delay once a connect succeeds.
    pub async fn run(self) {
        let mut policy = self.config.reconnect.clone();

        loop {
            match self.source.connect(&self.config.symbols).await {
                Ok(mut stream) => {
                    info!(symbols = ?self.config.symbols, "Connected to price feed");
                    policy.reset();

                    while let Some(tick) = stream.next().await {
                        self.publish_tick(tick).await;
                    }

                    warn!("Price feed stream lost");
                }
                Err(e) => {
                    error!(error = %e, "Price feed connect failed");
                }
            }

            let delay = policy.next_delay();
            warn!(delay_ms = delay.as_millis(), "Reconnecting to price feed");
            tokio::time::sleep(delay).await;
        }
    }

    async fn publish_tick(&self, tick: PriceUpdate) {
        let record = match BusRecord::json(PRICE_UPDATES, Some(tick.symbol.clone()), &tick) {
            Ok(record) => record,
            Err(e) => {
                error!(symbol = %tick.symbol, error = %e, "Tick could not be encoded");
                return;
            }
        };

        match self.bus.publish(record).await {
            Ok(_) => debug!(symbol = %tick.symbol, price = %tick.price, "Tick republished"),
            Err(e) => error!(symbol = %tick.symbol, error = %e, "Tick publish failed"),
        }
    }
}
