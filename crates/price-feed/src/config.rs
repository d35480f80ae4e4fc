//! Feed configuration.

use shared_bus::ReconnectPolicy;

/// Configuration for the price poller.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Symbols to subscribe upstream.
    pub symbols: Vec<String>,
    /// Reconnect discipline on stream loss.
    pub reconnect: ReconnectPolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                "SOL_USDC".to_string(),
                "BTC_USDC".to_string(),
                "ETH_USDC".to_string(),
                "DOGE_USDC".to_string(),
                "BNB_USDC".to_string(),
            ],
            reconnect: ReconnectPolicy::default(),
        }
    }
}
