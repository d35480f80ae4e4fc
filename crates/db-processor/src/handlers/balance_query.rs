//! Handler for `balance-query-request`.

use super::{failure, invalid_message, HandlerOutcome, RequestHandler};
use crate::messages::BalanceQueryRequest;
use crate::ports::{BrokerStore, StoreError};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub struct BalanceQueryHandler {
    store: Arc<dyn BrokerStore>,
}

impl BalanceQueryHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for BalanceQueryHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let request: BalanceQueryRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return invalid_message("Missing userId."),
        };
        if request.user_id.as_str().is_empty() {
            return invalid_message("Missing userId.");
        }

        match self.store.balance_of(&request.user_id).await {
            Ok(balance) => {
                debug!(user_id = %request.user_id, balance = %balance, "Balance fetched");
                HandlerOutcome::Completed(json!({
                    "success": true,
                    "balance": balance,
                }))
            }
            Err(StoreError::BalanceNotFound) => failure("Balance not found for user."),
            Err(e) => failure(format!("Error fetching balance: {e}")),
        }
    }
}
