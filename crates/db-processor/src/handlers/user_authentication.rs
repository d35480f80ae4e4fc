//! Handler for `user-authentication-request`.
//!
//! Returns the stored password hash for the API server to verify;
//! hashing and comparison never happen on this side.

use super::{failure, invalid_message, HandlerOutcome, RequestHandler};
use crate::messages::UserAuthenticationRequest;
use crate::ports::BrokerStore;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

pub struct UserAuthenticationHandler {
    store: Arc<dyn BrokerStore>,
}

impl UserAuthenticationHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for UserAuthenticationHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let request: UserAuthenticationRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return invalid_message("Missing email."),
        };
        if request.email.is_empty() {
            return invalid_message("Missing email.");
        }

        match self.store.find_user_by_email(&request.email).await {
            Ok(Some(user)) => {
                debug!(user_id = %user.id, "Authentication lookup succeeded");
                HandlerOutcome::Completed(json!({
                    "success": true,
                    "userId": user.id,
                    "hashedPassword": user.password_hash,
                }))
            }
            Ok(None) => failure("user not found"),
            Err(e) => {
                error!(error = %e, "Authentication lookup failed");
                failure("Internal server error")
            }
        }
    }
}
