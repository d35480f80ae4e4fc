//! Handler for `user-existence-check`.

use super::{failure, invalid_message, HandlerOutcome, RequestHandler};
use crate::messages::UserExistenceRequest;
use crate::ports::BrokerStore;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Answers whether an email is already registered.
pub struct UserExistenceHandler {
    store: Arc<dyn BrokerStore>,
}

impl UserExistenceHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for UserExistenceHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let request: UserExistenceRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return invalid_message("Missing email."),
        };
        if request.email.is_empty() {
            return invalid_message("Missing email.");
        }

        match self.store.find_user_by_email(&request.email).await {
            Ok(user) => {
                let exists = user.is_some();
                debug!(email = %request.email, exists, "User existence check");
                HandlerOutcome::Completed(json!({
                    "success": true,
                    "exists": exists,
                }))
            }
            Err(e) => failure(format!("Failed to check user existence: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use shared_types::UsdCents;

    async fn handler_with_user(email: &str) -> UserExistenceHandler {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(email, "Ada", "hash", UsdCents(500_000))
            .await
            .unwrap();
        UserExistenceHandler::new(store)
    }

    #[tokio::test]
    async fn test_existing_user() {
        let handler = handler_with_user("a@b.c").await;
        let outcome = handler.handle(json!({"email": "a@b.c"})).await;
        let payload = outcome.into_payload().unwrap();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["exists"], true);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let handler = handler_with_user("a@b.c").await;
        let outcome = handler.handle(json!({"email": "nobody@b.c"})).await;
        let payload = outcome.into_payload().unwrap();
        assert_eq!(payload["exists"], false);
    }

    #[tokio::test]
    async fn test_missing_email_is_business_failure() {
        let handler = UserExistenceHandler::new(Arc::new(MemoryStore::new()));
        let outcome = handler.handle(json!({})).await;
        assert!(matches!(outcome, HandlerOutcome::BusinessFailure(_)));
    }
}
