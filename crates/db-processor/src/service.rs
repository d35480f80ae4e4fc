//! The shared consumer loop.
//!
//! Subscribes the fixed request-topic set once at startup, routes each
//! record through the dispatch table, and publishes the correlated
//! response. Echoing the `correlationId` happens here, for every handler,
//! so no individual handler can forget it.

use crate::handlers::{dispatch_table, HandlerOutcome, Route};
use crate::ports::BrokerStore;
use shared_bus::{BusPublisher, BusRecord, BusSubscriber, Subscription};
use shared_types::topics::REQUEST_TOPICS;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A running db-processor.
pub struct DbProcessorHandle {
    task: JoinHandle<()>,
}

impl DbProcessorHandle {
    /// Stop the consumer loop.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// DB processor construction.
pub struct DbProcessor;

impl DbProcessor {
    /// Subscribe the request topics and start the consumer loop.
    pub fn start<B>(bus: Arc<B>, store: Arc<dyn BrokerStore>) -> DbProcessorHandle
    where
        B: BusPublisher + BusSubscriber + 'static,
    {
        let subscription = bus.subscribe(&REQUEST_TOPICS);
        let routes = dispatch_table(store);
        let publisher: Arc<dyn BusPublisher> = bus;

        let task = tokio::spawn(run_loop(subscription, routes, publisher));
        DbProcessorHandle { task }
    }
}

async fn run_loop(
    mut subscription: Subscription,
    routes: HashMap<&'static str, Route>,
    publisher: Arc<dyn BusPublisher>,
) {
    info!(topics = ?subscription.topics(), "DB processor started");

    while let Some(record) = subscription.recv().await {
        process_record(&routes, publisher.as_ref(), record).await;
    }

    warn!("Bus closed, DB processor stopping");
}

/// Route one record; never lets a handler failure stop the loop.
async fn process_record(
    routes: &HashMap<&'static str, Route>,
    publisher: &dyn BusPublisher,
    record: BusRecord,
) {
    let Some(route) = routes.get(record.topic.as_str()) else {
        warn!(topic = %record.topic, "No handler for topic");
        return;
    };

    let mut payload: serde_json::Value = match serde_json::from_slice(&record.payload) {
        Ok(value) => value,
        Err(e) => {
            warn!(topic = %record.topic, error = %e, "Malformed request dropped");
            return;
        }
    };

    // Strip the correlation id; handlers see pure request fields.
    let correlation_id = payload
        .as_object_mut()
        .and_then(|map| map.remove("correlationId"))
        .and_then(|v| v.as_str().map(String::from));

    match route.response_topic {
        Some(response_topic) => {
            // Without a correlation id there is nothing to correlate a
            // response to; the caller will see a timeout either way.
            let Some(correlation_id) = correlation_id else {
                warn!(topic = %record.topic, "Request without correlationId dropped");
                return;
            };

            debug!(
                topic = %record.topic,
                correlation_id = %correlation_id,
                "Processing request"
            );

            let outcome = route.handler.handle(payload).await;
            let Some(response) = outcome.into_payload() else {
                return;
            };
            publish_response(publisher, response_topic, &correlation_id, response).await;
        }
        None => {
            // Fire-and-forget topic: no response regardless of outcome.
            let outcome = route.handler.handle(payload).await;
            debug_assert!(matches!(outcome, HandlerOutcome::Dropped));
        }
    }
}

/// Publish a response carrying the original correlation id.
async fn publish_response(
    publisher: &dyn BusPublisher,
    topic: &'static str,
    correlation_id: &str,
    mut payload: serde_json::Value,
) {
    if let Some(map) = payload.as_object_mut() {
        map.insert(
            "correlationId".to_string(),
            serde_json::Value::String(correlation_id.to_string()),
        );
    }

    let bytes = match serde_json::to_vec(&payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(topic, correlation_id, error = %e, "Response could not be encoded");
            return;
        }
    };

    let record = BusRecord {
        topic: topic.to_string(),
        key: Some(correlation_id.to_string()),
        payload: bytes,
    };

    if let Err(e) = publisher.publish(record).await {
        error!(topic, correlation_id, error = %e, "Response publish failed");
    }
}
