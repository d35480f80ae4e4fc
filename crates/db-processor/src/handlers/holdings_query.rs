//! Handler for `holdings-query-request`.

use super::{failure, invalid_message, HandlerOutcome, RequestHandler};
use crate::messages::HoldingsQueryRequest;
use crate::ports::BrokerStore;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Reports the held quantity for one user/asset and whether any of it
/// is available.
pub struct HoldingsQueryHandler {
    store: Arc<dyn BrokerStore>,
}

impl HoldingsQueryHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for HoldingsQueryHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let request: HoldingsQueryRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return invalid_message("Missing userId or asset."),
        };
        if request.user_id.as_str().is_empty() || request.asset.is_empty() {
            return invalid_message("Missing userId or asset.");
        }

        match self
            .store
            .holdings_of(&request.user_id, &request.asset)
            .await
        {
            Ok(held) => {
                debug!(
                    user_id = %request.user_id,
                    asset = %request.asset,
                    held = %held,
                    "Holdings check"
                );
                HandlerOutcome::Completed(json!({
                    "success": true,
                    "sufficient": held.is_positive(),
                    "heldQuantity": held,
                    "userId": request.user_id,
                    "asset": request.asset,
                }))
            }
            Err(e) => failure(format!("Error checking holdings: {e}")),
        }
    }
}
