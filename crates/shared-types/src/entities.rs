//! # Core Domain Entities
//!
//! Persistent records and identifiers for the broker platform.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `OrderId`, `Asset`
//! - **Accounts**: `UserRecord`, `BalanceRecord`, `HoldingRecord`
//! - **Trading**: `TradeRecord`, `TradeSide`, `TradeStatus`
//! - **Market Data**: `PriceUpdate`

use crate::money::{Quantity, UsdCents};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Unique identifier for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Mint a fresh random user id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a trade order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Mint a fresh random order id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Tradeable asset symbol (e.g. "BTC_USDC").
pub type Asset = String;

// =============================================================================
// CLUSTER B: ACCOUNTS
// =============================================================================

/// A registered user.
///
/// The password arrives already hashed from the API server; this service
/// never sees a plaintext credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub verified: bool,
}

/// A user's USD balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub user_id: UserId,
    pub amount: UsdCents,
}

/// A user's holding of one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub user_id: UserId,
    pub asset: Asset,
    pub quantity: Quantity,
}

// =============================================================================
// CLUSTER C: TRADING
// =============================================================================

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Lifecycle state of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
    Liquidated,
}

/// A CFD trade as persisted by the db-processor.
///
/// Margin and prices are integer cents; quantity is integer base units.
/// `quantity` and `entry_price` are filled in by the matching engine's
/// outcome report; `close_price` and `pnl` stay `None` until the trade
/// leaves `Open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: OrderId,
    pub user_id: UserId,
    pub asset: Asset,
    pub side: TradeSide,
    pub margin: UsdCents,
    pub leverage: u32,
    pub slippage: u32,
    pub status: TradeStatus,
    pub quantity: Option<Quantity>,
    pub entry_price: Option<UsdCents>,
    pub close_price: Option<UsdCents>,
    pub pnl: Option<UsdCents>,
    /// Unix millis when the trade was opened.
    pub opened_at: u64,
    /// Unix millis when the trade was closed, if it has been.
    pub closed_at: Option<u64>,
}

// =============================================================================
// CLUSTER D: MARKET DATA
// =============================================================================

/// One tick from the upstream price feed, republished on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Asset symbol as quoted by the exchange.
    pub symbol: Asset,
    /// Last traded price in integer cents.
    pub price: UsdCents,
    /// Exchange-reported tick time, unix millis.
    pub timestamp: u64,
}
