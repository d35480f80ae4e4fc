//! Handler for `user-creation-request`.

use super::{failure, invalid_message, HandlerOutcome, RequestHandler};
use crate::messages::UserCreationRequest;
use crate::ports::{BrokerStore, StoreError};
use async_trait::async_trait;
use serde_json::json;
use shared_types::UsdCents;
use std::sync::Arc;
use tracing::info;

/// Every new account starts with $5,000.
pub const OPENING_BALANCE: UsdCents = UsdCents(500_000);

/// Creates a user and their opening balance in one transaction.
pub struct UserCreationHandler {
    store: Arc<dyn BrokerStore>,
}

impl UserCreationHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for UserCreationHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let request: UserCreationRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return invalid_message("Missing required fields."),
        };
        if request.email.is_empty() || request.name.is_empty() || request.password.is_empty() {
            return invalid_message("Missing required fields.");
        }

        match self
            .store
            .create_user(&request.email, &request.name, &request.password, OPENING_BALANCE)
            .await
        {
            Ok(user_id) => {
                info!(email = %request.email, user_id = %user_id, "User created");
                HandlerOutcome::Completed(json!({
                    "success": true,
                    "message": "User created successfully.",
                }))
            }
            Err(StoreError::DuplicateEmail) => {
                failure("Failed to create user: email already registered")
            }
            Err(e) => failure(format!("Failed to create user: {e}")),
        }
    }
}
