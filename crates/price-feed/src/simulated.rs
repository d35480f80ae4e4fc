//! Simulated upstream source for local runs and demos.
//!
//! Cycles through the subscribed symbols on a fixed interval with a
//! deterministic wobble around each symbol's base price. A production
//! deployment replaces this with the exchange websocket adapter.

use crate::source::{FeedError, PriceSource, TickStream};
use async_trait::async_trait;
use shared_types::{PriceUpdate, UsdCents};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_stream::{wrappers::IntervalStream, StreamExt};

/// Deterministic in-process tick generator.
pub struct SimulatedSource {
    /// Gap between generated ticks.
    pub tick_interval: Duration,
}

impl SimulatedSource {
    #[must_use]
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl PriceSource for SimulatedSource {
    async fn connect(&self, symbols: &[String]) -> Result<TickStream, FeedError> {
        if symbols.is_empty() {
            return Err(FeedError::Subscribe("no symbols requested".to_string()));
        }

        let symbols = symbols.to_vec();
        let mut sequence: u64 = 0;
        let interval = tokio::time::interval(self.tick_interval);

        let stream = IntervalStream::new(interval).map(move |_| {
            let symbol = symbols[usize::try_from(sequence).unwrap_or(0) % symbols.len()].clone();
            let price = base_price(&symbol) + wobble(sequence);
            sequence += 1;
            PriceUpdate {
                symbol,
                price,
                timestamp: now_millis(),
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Rough cent-denominated anchor per symbol.
fn base_price(symbol: &str) -> UsdCents {
    match symbol {
        s if s.starts_with("BTC") => UsdCents(6_000_000),
        s if s.starts_with("ETH") => UsdCents(250_000),
        s if s.starts_with("SOL") => UsdCents(15_000),
        s if s.starts_with("BNB") => UsdCents(55_000),
        s if s.starts_with("DOGE") => UsdCents(12),
        _ => UsdCents(10_000),
    }
}

/// Deterministic +/- 50 cent drift.
fn wobble(sequence: u64) -> UsdCents {
    UsdCents(i64::try_from((sequence * 7) % 100).unwrap_or(0) - 50)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
