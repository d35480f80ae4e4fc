//! The domain handler set.
//!
//! One handler per request topic, collected into the dispatch table the
//! shared consumer consults. Handlers return a typed [`HandlerOutcome`];
//! expected business outcomes never travel by panic or error propagation.

use crate::ports::BrokerStore;
use async_trait::async_trait;
use serde_json::json;
use shared_types::topics;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod balance_query;
pub mod holdings_query;
pub mod trade_close;
pub mod trade_create;
pub mod trade_outcome;
pub mod user_authentication;
pub mod user_creation;
pub mod user_existence;

pub use balance_query::BalanceQueryHandler;
pub use holdings_query::HoldingsQueryHandler;
pub use trade_close::TradeCloseHandler;
pub use trade_create::TradeCreateHandler;
pub use trade_outcome::TradeOutcomeHandler;
pub use user_authentication::UserAuthenticationHandler;
pub use user_creation::UserCreationHandler;
pub use user_existence::UserExistenceHandler;

/// Typed result of handling one request.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// The operation succeeded; publish this payload.
    Completed(serde_json::Value),
    /// A recoverable business failure; publish this payload. Still a
    /// normal settlement for the caller.
    BusinessFailure(serde_json::Value),
    /// Nothing to publish (fire-and-forget topic, or unusable message).
    Dropped,
}

impl HandlerOutcome {
    /// The payload to publish, if any.
    #[must_use]
    pub fn into_payload(self) -> Option<serde_json::Value> {
        match self {
            Self::Completed(p) | Self::BusinessFailure(p) => Some(p),
            Self::Dropped => None,
        }
    }
}

/// One handler behind one request topic.
///
/// The consumer strips `correlationId` before calling `handle`; echoing
/// it on the response is the consumer's job, which is what makes "every
/// response is correlated" structural rather than per-handler diligence.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome;
}

/// A dispatch-table row: the handler and where its replies go.
/// `response_topic` is `None` for fire-and-forget topics.
pub struct Route {
    pub handler: Box<dyn RequestHandler>,
    pub response_topic: Option<&'static str>,
}

/// Build the dispatch table consulted by the shared consumer.
#[must_use]
pub fn dispatch_table(store: Arc<dyn BrokerStore>) -> HashMap<&'static str, Route> {
    let mut table: HashMap<&'static str, Route> = HashMap::new();

    table.insert(
        topics::USER_EXISTENCE.request,
        Route {
            handler: Box::new(UserExistenceHandler::new(store.clone())),
            response_topic: Some(topics::USER_EXISTENCE.response),
        },
    );
    table.insert(
        topics::USER_CREATION.request,
        Route {
            handler: Box::new(UserCreationHandler::new(store.clone())),
            response_topic: Some(topics::USER_CREATION.response),
        },
    );
    table.insert(
        topics::USER_AUTHENTICATION.request,
        Route {
            handler: Box::new(UserAuthenticationHandler::new(store.clone())),
            response_topic: Some(topics::USER_AUTHENTICATION.response),
        },
    );
    table.insert(
        topics::BALANCE_QUERY.request,
        Route {
            handler: Box::new(BalanceQueryHandler::new(store.clone())),
            response_topic: Some(topics::BALANCE_QUERY.response),
        },
    );
    table.insert(
        topics::HOLDINGS_QUERY.request,
        Route {
            handler: Box::new(HoldingsQueryHandler::new(store.clone())),
            response_topic: Some(topics::HOLDINGS_QUERY.response),
        },
    );
    table.insert(
        topics::TRADE_CREATE.request,
        Route {
            handler: Box::new(TradeCreateHandler::new(store.clone())),
            response_topic: Some(topics::TRADE_CREATE.response),
        },
    );
    table.insert(
        topics::TRADE_CLOSE.request,
        Route {
            handler: Box::new(TradeCloseHandler::new(store.clone())),
            response_topic: Some(topics::TRADE_CLOSE.response),
        },
    );
    table.insert(
        topics::TRADE_OUTCOME,
        Route {
            handler: Box::new(TradeOutcomeHandler::new(store)),
            response_topic: None,
        },
    );

    table
}

/// Business-failure payload for a request that failed validation.
pub(crate) fn invalid_message(detail: &str) -> HandlerOutcome {
    HandlerOutcome::BusinessFailure(json!({
        "success": false,
        "message": format!("Invalid message: {detail}"),
    }))
}

/// Business-failure payload with a plain message.
pub(crate) fn failure(message: impl Into<String>) -> HandlerOutcome {
    HandlerOutcome::BusinessFailure(json!({
        "success": false,
        "message": message.into(),
    }))
}

/// Wall-clock unix millis.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
