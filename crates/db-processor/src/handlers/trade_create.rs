//! Handler for `trade-create-request`.
//!
//! Debiting the margin and creating the trade are one transaction:
//! insufficient balance means nothing is written.

use super::{failure, invalid_message, now_millis, HandlerOutcome, RequestHandler};
use crate::messages::TradeCreateRequest;
use crate::ports::{BrokerStore, OpenTrade, StoreError};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct TradeCreateHandler {
    store: Arc<dyn BrokerStore>,
}

impl TradeCreateHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for TradeCreateHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let request: TradeCreateRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return invalid_message("Missing required fields."),
        };
        if request.user_id.as_str().is_empty() || request.asset.is_empty() {
            return invalid_message("Missing required fields.");
        }
        if request.margin.cents() <= 0 || request.leverage == 0 {
            return invalid_message("Margin and leverage must be positive.");
        }

        let open = OpenTrade {
            user_id: request.user_id.clone(),
            asset: request.asset,
            side: request.side,
            margin: request.margin,
            leverage: request.leverage,
            slippage: request.slippage,
            opened_at: now_millis(),
        };

        match self.store.open_trade(open).await {
            Ok(order_id) => {
                info!(
                    user_id = %request.user_id,
                    order_id = %order_id,
                    margin = %request.margin,
                    "Trade created"
                );
                HandlerOutcome::Completed(json!({
                    "success": true,
                    "orderId": order_id,
                }))
            }
            Err(StoreError::InsufficientBalance) => failure("Insufficient balance"),
            Err(e) => failure(format!("Error creating trade: {e}")),
        }
    }
}
