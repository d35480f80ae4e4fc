//! Handler for `trade-close-request`.

use super::{failure, invalid_message, now_millis, HandlerOutcome, RequestHandler};
use crate::messages::TradeCloseRequest;
use crate::ports::{BrokerStore, StoreError};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct TradeCloseHandler {
    store: Arc<dyn BrokerStore>,
}

impl TradeCloseHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for TradeCloseHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let request: TradeCloseRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return invalid_message("Missing required fields."),
        };
        if request.user_id.as_str().is_empty() || request.order_id.as_str().is_empty() {
            return invalid_message("Missing required fields.");
        }

        match self
            .store
            .close_trade(&request.user_id, &request.order_id, now_millis())
            .await
        {
            Ok(()) => {
                info!(
                    user_id = %request.user_id,
                    order_id = %request.order_id,
                    "Trade closed"
                );
                HandlerOutcome::Completed(json!({
                    "success": true,
                    "message": "Trade closed successfully",
                }))
            }
            Err(StoreError::TradeNotOpen) => failure("Trade not found or not open"),
            Err(e) => failure(format!("Error closing trade: {e}")),
        }
    }
}
