//! # End-to-End Flows
//!
//! The whole platform over one bus: API-side dispatcher, db-processor
//! handlers against the store, and price-feed ingestion.

#[cfg(test)]
mod tests {
    use api_bridge::{Bridge, BridgeConfig};
    use broker_runtime::{BrokerRuntime, RuntimeConfig};
    use db_processor::{BrokerStore, DbProcessor, MemoryStore};
    use price_feed::SimulatedSource;
    use serde_json::json;
    use shared_bus::InMemoryBus;
    use shared_types::topics::{
        BALANCE_QUERY, HOLDINGS_QUERY, PRICE_UPDATES, TRADE_CLOSE, TRADE_CREATE,
        USER_AUTHENTICATION, USER_CREATION, USER_EXISTENCE,
    };
    use shared_types::PriceUpdate;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const CALL_TIMEOUT: Option<Duration> = Some(Duration::from_secs(2));

    // =========================================================================
    // ROUND-TRIP: EXACT PAYLOAD SETTLEMENT (dispatcher <-> db-processor)
    // =========================================================================

    #[tokio::test]
    async fn test_balance_round_trip_settles_with_exact_payload() {
        let bus = Arc::new(InMemoryBus::new());
        let store = Arc::new(MemoryStore::new());
        let user_id = store
            .create_user("u1@b.c", "Una", "hash", shared_types::UsdCents(500_000))
            .await
            .unwrap();

        let processor = DbProcessor::start(bus.clone(), store);
        let handle = Bridge::start(bus, BridgeConfig::default()).unwrap();
        let dispatcher = handle.dispatcher();

        let reply = dispatcher
            .call(BALANCE_QUERY.request, json!({"userId": user_id}), CALL_TIMEOUT)
            .await
            .unwrap();

        // The settlement is the handler's payload, verbatim: the success
        // flag, the balance in cents, and the echoed correlation id -
        // nothing more.
        let payload = reply.payload();
        let correlation_id = payload["correlationId"].as_str().unwrap().to_string();
        assert_eq!(
            *payload,
            json!({
                "success": true,
                "balance": 500_000,
                "correlationId": correlation_id,
            })
        );

        handle.shutdown();
        processor.shutdown();
    }

    // =========================================================================
    // FULL TRADING FLOW THROUGH THE RUNTIME
    // =========================================================================

    #[tokio::test]
    async fn test_signup_trade_and_close_flow() {
        let runtime = BrokerRuntime::start_with_source(
            RuntimeConfig::default(),
            Arc::new(SimulatedSource::new(Duration::from_millis(5))),
        )
        .unwrap();
        let dispatcher = runtime.dispatcher();

        // Nobody home yet.
        let exists = dispatcher
            .call(USER_EXISTENCE.request, json!({"email": "ada@b.c"}), CALL_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(exists.payload()["exists"], false);

        // Sign up, then the account exists and authenticates.
        let created = dispatcher
            .call(
                USER_CREATION.request,
                json!({"email": "ada@b.c", "name": "Ada", "password": "$2b$10$hash"}),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert!(created.is_success());

        let exists = dispatcher
            .call(USER_EXISTENCE.request, json!({"email": "ada@b.c"}), CALL_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(exists.payload()["exists"], true);

        let auth = dispatcher
            .call(
                USER_AUTHENTICATION.request,
                json!({"email": "ada@b.c"}),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert_eq!(auth.payload()["hashedPassword"], "$2b$10$hash");
        let user_id = auth.payload()["userId"].as_str().unwrap().to_string();

        // Open a trade; the margin leaves the balance atomically.
        let trade = dispatcher
            .call(
                TRADE_CREATE.request,
                json!({
                    "userId": user_id,
                    "asset": "BTC_USDC",
                    "type": "buy",
                    "margin": 100_000,
                    "leverage": 10,
                    "slippage": 50
                }),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert!(trade.is_success());
        let order_id = trade.payload()["orderId"].as_str().unwrap().to_string();

        let balance = dispatcher
            .call(BALANCE_QUERY.request, json!({"userId": user_id}), CALL_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(balance.payload()["balance"], 400_000);

        // An order the balance cannot cover is a business failure, and
        // the failed transaction leaves the balance alone.
        let rejected = dispatcher
            .call(
                TRADE_CREATE.request,
                json!({
                    "userId": user_id,
                    "asset": "ETH_USDC",
                    "type": "sell",
                    "margin": 999_999_999,
                    "leverage": 5,
                    "slippage": 50
                }),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert!(!rejected.is_success());
        assert_eq!(rejected.message(), Some("Insufficient balance"));

        let balance = dispatcher
            .call(BALANCE_QUERY.request, json!({"userId": user_id}), CALL_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(balance.payload()["balance"], 400_000);

        // Close once: success. Close again: business failure.
        let closed = dispatcher
            .call(
                TRADE_CLOSE.request,
                json!({"userId": user_id, "orderId": order_id}),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert!(closed.is_success());

        let reclosed = dispatcher
            .call(
                TRADE_CLOSE.request,
                json!({"userId": user_id, "orderId": order_id}),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert!(!reclosed.is_success());

        // No holdings for this account yet.
        let holdings = dispatcher
            .call(
                HOLDINGS_QUERY.request,
                json!({"userId": user_id, "asset": "BTC_USDC"}),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert_eq!(holdings.payload()["sufficient"], false);
        assert_eq!(holdings.payload()["heldQuantity"], 0);

        runtime.shutdown();
    }

    // =========================================================================
    // PRICE FEED INGESTION
    // =========================================================================

    #[tokio::test]
    async fn test_price_ticks_flow_to_bus_subscribers() {
        let runtime = BrokerRuntime::start_with_source(
            RuntimeConfig::default(),
            Arc::new(SimulatedSource::new(Duration::from_millis(5))),
        )
        .unwrap();

        let mut ticks = runtime.bus().subscribe(&[PRICE_UPDATES]);
        let record = timeout(Duration::from_secs(2), ticks.recv())
            .await
            .expect("timeout")
            .expect("tick");

        let update: PriceUpdate = record.parse().unwrap();
        assert!(!update.symbol.is_empty());
        assert_eq!(record.key.as_deref(), Some(update.symbol.as_str()));

        runtime.shutdown();
    }

    // =========================================================================
    // MIXED TRAFFIC: CORRELATED CALLS WHILE FIRE-AND-FORGET FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_correlated_calls_unaffected_by_price_traffic() {
        let runtime = BrokerRuntime::start_with_source(
            RuntimeConfig::default(),
            Arc::new(SimulatedSource::new(Duration::from_millis(1))),
        )
        .unwrap();
        let dispatcher = runtime.dispatcher();

        // Let the feed chatter for a moment, then issue calls through it.
        tokio::time::sleep(Duration::from_millis(20)).await;

        for i in 0..10 {
            let email = format!("user{i}@b.c");
            let created = dispatcher
                .call(
                    USER_CREATION.request,
                    json!({"email": email, "name": "User", "password": "hash"}),
                    CALL_TIMEOUT,
                )
                .await
                .unwrap();
            assert!(created.is_success(), "signup {i} failed");
        }

        assert_eq!(dispatcher.pending_count(), 0);
        runtime.shutdown();
    }
}
