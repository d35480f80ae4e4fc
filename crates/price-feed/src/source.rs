//! Inbound port: the upstream price stream.

use async_trait::async_trait;
use shared_types::PriceUpdate;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// A live stream of ticks; ends when the upstream connection is lost.
pub type TickStream = Pin<Box<dyn Stream<Item = PriceUpdate> + Send>>;

/// Upstream feed failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Could not establish the upstream connection.
    #[error("price feed connect failed: {0}")]
    Connect(String),
    /// The subscribe request was rejected.
    #[error("price feed subscribe rejected: {0}")]
    Subscribe(String),
}

/// Port: connect to the exchange stream and subscribe symbols.
///
/// The production adapter speaks the exchange's websocket protocol; the
/// poller only sees decoded [`PriceUpdate`] ticks.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Connect and subscribe. Yields ticks until the stream drops.
    async fn connect(&self, symbols: &[String]) -> Result<TickStream, FeedError>;
}
