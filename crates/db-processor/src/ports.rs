//! Outbound port: the persistent store.
//!
//! Each method is one atomic unit of work. An adapter backed by a SQL
//! database maps each to a single transaction; the in-memory adapter
//! holds one lock across the whole operation. Handlers never compose
//! multi-step mutations out of separate calls.

use async_trait::async_trait;
use shared_types::{
    OrderId, Quantity, TradeRecord, TradeSide, TradeStatus, UsdCents, UserId, UserRecord,
};
use thiserror::Error;

/// Storage failures, split into the business conditions handlers answer
/// for and the internal faults they report generically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,
    #[error("balance not found for user")]
    BalanceNotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("trade not found or not open")]
    TradeNotOpen,
    #[error("store failure: {0}")]
    Internal(String),
}

/// Everything needed to open a trade.
///
/// Debiting the margin and creating the trade row commit or fail
/// together.
#[derive(Debug, Clone)]
pub struct OpenTrade {
    pub user_id: UserId,
    pub asset: String,
    pub side: TradeSide,
    pub margin: UsdCents,
    pub leverage: u32,
    pub slippage: u32,
    /// Unix millis at which the trade opens.
    pub opened_at: u64,
}

/// An engine-reported trade outcome to be applied in one transaction:
/// the trade upsert plus whichever of balance/holdings the engine
/// recomputed.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub trade_id: OrderId,
    pub user_id: UserId,
    pub asset: String,
    pub side: TradeSide,
    pub status: TradeStatus,
    pub quantity: Quantity,
    pub entry_price: UsdCents,
    pub close_price: Option<UsdCents>,
    pub pnl: Option<UsdCents>,
    pub margin: UsdCents,
    pub leverage: u32,
    pub slippage: u32,
    pub timestamp: Option<u64>,
    pub updated_balance: Option<UsdCents>,
    pub updated_holdings: Option<Quantity>,
}

/// Port: the broker's persistent state.
#[async_trait]
pub trait BrokerStore: Send + Sync {
    /// Look up a user by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Create a user and their opening balance atomically.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateEmail`] when the email is taken; neither
    /// record is written in that case.
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        opening_balance: UsdCents,
    ) -> Result<UserId, StoreError>;

    /// Current balance for a user.
    ///
    /// # Errors
    ///
    /// [`StoreError::BalanceNotFound`] when the user has no balance row.
    async fn balance_of(&self, user_id: &UserId) -> Result<UsdCents, StoreError>;

    /// Held quantity for one user/asset; zero when no row exists.
    async fn holdings_of(&self, user_id: &UserId, asset: &str) -> Result<Quantity, StoreError>;

    /// Debit the margin and create the open trade atomically.
    ///
    /// # Errors
    ///
    /// [`StoreError::InsufficientBalance`] (or a missing balance row)
    /// rolls the whole operation back; the balance is untouched.
    async fn open_trade(&self, request: OpenTrade) -> Result<OrderId, StoreError>;

    /// Close an open trade owned by this user.
    ///
    /// # Errors
    ///
    /// [`StoreError::TradeNotOpen`] when the trade is missing, owned by
    /// someone else, or already closed.
    async fn close_trade(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
        closed_at: u64,
    ) -> Result<(), StoreError>;

    /// Apply an engine outcome: trade upsert + balance + holdings in one
    /// transaction.
    async fn apply_trade_outcome(&self, outcome: TradeOutcome) -> Result<(), StoreError>;

    /// Fetch a trade by id (primarily for verification in tests and
    /// admin tooling).
    async fn find_trade(&self, order_id: &OrderId) -> Result<Option<TradeRecord>, StoreError>;
}
