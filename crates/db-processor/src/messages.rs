//! Typed request payloads for each request topic.
//!
//! Wire field names are camelCase JSON, matching what the API server
//! publishes. The `correlationId` is stripped by the consumer loop before
//! a handler sees the payload, so none of these carry it.

use serde::Deserialize;
use shared_types::{OrderId, Quantity, TradeSide, TradeStatus, UsdCents, UserId};

/// `user-existence-check`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExistenceRequest {
    pub email: String,
}

/// `user-creation-request` - the password arrives already hashed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreationRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// `user-authentication-request`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAuthenticationRequest {
    pub email: String,
}

/// `balance-query-request`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQueryRequest {
    pub user_id: UserId,
}

/// `holdings-query-request`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsQueryRequest {
    pub user_id: UserId,
    pub asset: String,
}

/// `trade-create-request`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeCreateRequest {
    pub user_id: UserId,
    pub asset: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub margin: UsdCents,
    pub leverage: u32,
    pub slippage: u32,
}

/// `trade-close-request`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeCloseRequest {
    pub user_id: UserId,
    pub order_id: OrderId,
}

/// `trade-outcome` - fire-and-forget report from the matching engine.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOutcomeMessage {
    pub trade_id: OrderId,
    pub user_id: UserId,
    pub asset: String,
    pub side: TradeSide,
    pub status: TradeStatus,
    pub quantity: Quantity,
    pub entry_price: UsdCents,
    #[serde(default)]
    pub close_price: Option<UsdCents>,
    #[serde(default)]
    pub pnl: Option<UsdCents>,
    #[serde(default)]
    pub margin: Option<UsdCents>,
    #[serde(default)]
    pub leverage: Option<u32>,
    #[serde(default)]
    pub slippage: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub updated_balance: Option<UsdCents>,
    #[serde(default)]
    pub updated_holdings: Option<Quantity>,
}
