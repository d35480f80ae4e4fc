//! # Bridge Settlement Properties
//!
//! Exercises the request-reply guarantees end-to-end over the in-memory
//! bus:
//!
//! 1. Every call settles exactly once - no double settlement, no leaked
//!    pending entry - regardless of response delivery order.
//! 2. Orphan responses are dropped without touching unrelated calls.
//! 3. A call issued before readiness blocks until the gate flips, or
//!    fails `NotReady` after the wait budget; it is never silently lost.
//! 4. Timeout removes the pending entry; a late response for the same
//!    correlation id is a no-op.
//! 5. The caller receives the handler's exact payload.
//! 6. Concurrent calls sharing one topic pair never cross-talk.

#[cfg(test)]
mod tests {
    use api_bridge::{
        Bridge, BridgeConfig, CallError, CorrelatedMessage, CorrelationId, PendingCallStore,
        ReadinessGate, RequestDispatcher,
    };
    use rand::seq::SliceRandom;
    use serde_json::json;
    use shared_bus::{BusPublisher, BusRecord, InMemoryBus};
    use shared_types::topics::BALANCE_QUERY;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    async fn publish_response(bus: &InMemoryBus, correlation_id: CorrelationId, body: serde_json::Value) {
        let reply = CorrelatedMessage::new(correlation_id, body);
        bus.publish(BusRecord {
            topic: BALANCE_QUERY.response.to_string(),
            key: Some(correlation_id.to_string()),
            payload: reply.encode().unwrap(),
        })
        .await
        .unwrap();
    }

    // =========================================================================
    // PROPERTY 1: EXACTLY-ONCE SETTLEMENT UNDER RANDOMIZED DELIVERY ORDER
    // =========================================================================

    #[tokio::test]
    async fn test_concurrent_calls_settle_exactly_once_in_randomized_order() {
        const CALLS: usize = 32;

        let bus = Arc::new(InMemoryBus::new());
        let handle = Bridge::start(bus.clone(), BridgeConfig::default()).unwrap();
        let dispatcher = handle.dispatcher();

        // Collect every request first, then answer in shuffled order.
        let mut requests = bus.subscribe(&[BALANCE_QUERY.request]);
        let responder_bus = bus.clone();
        let responder = tokio::spawn(async move {
            let mut envelopes = Vec::with_capacity(CALLS);
            for _ in 0..CALLS {
                let record = requests.recv().await.expect("bus closed");
                envelopes.push(CorrelatedMessage::decode(&record.payload).unwrap());
            }
            envelopes.shuffle(&mut rand::thread_rng());
            for envelope in envelopes {
                let seq = envelope.payload["seq"].clone();
                publish_response(
                    &responder_bus,
                    envelope.correlation_id,
                    json!({"success": true, "seq": seq}),
                )
                .await;
            }
        });

        let calls: Vec<_> = (0..CALLS)
            .map(|seq| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    dispatcher
                        .call(
                            BALANCE_QUERY.request,
                            json!({"seq": seq}),
                            Some(Duration::from_secs(5)),
                        )
                        .await
                })
            })
            .collect();

        for (seq, call) in calls.into_iter().enumerate() {
            let reply = call.await.unwrap().unwrap();
            assert!(reply.is_success());
            assert_eq!(reply.payload()["seq"], seq, "cross-talk at seq {seq}");
        }
        responder.await.unwrap();

        // Exactly one settlement per call, table empty afterward.
        assert_eq!(dispatcher.pending_count(), 0);
        let stats = dispatcher.stats();
        assert_eq!(stats.total_registered.load(Ordering::Relaxed), CALLS as u64);
        assert_eq!(stats.total_resolved.load(Ordering::Relaxed), CALLS as u64);
        assert_eq!(stats.total_timeouts.load(Ordering::Relaxed), 0);

        handle.shutdown();
    }

    // =========================================================================
    // PROPERTY 2: ORPHAN RESPONSES ARE INERT
    // =========================================================================

    #[tokio::test]
    async fn test_orphan_response_does_not_affect_pending_calls() {
        let bus = Arc::new(InMemoryBus::new());
        let handle = Bridge::start(bus.clone(), BridgeConfig::default()).unwrap();
        let dispatcher = handle.dispatcher();

        let mut requests = bus.subscribe(&[BALANCE_QUERY.request]);
        let responder_bus = bus.clone();
        let responder = tokio::spawn(async move {
            let record = requests.recv().await.expect("bus closed");
            let envelope = CorrelatedMessage::decode(&record.payload).unwrap();

            // An orphan nobody is waiting on, then the real settlement.
            publish_response(&responder_bus, CorrelationId::new(), json!({"success": false}))
                .await;
            publish_response(
                &responder_bus,
                envelope.correlation_id,
                json!({"success": true, "balance": 500_000}),
            )
            .await;
        });

        let reply = dispatcher
            .call(
                BALANCE_QUERY.request,
                json!({"userId": "u1"}),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        assert!(reply.is_success());
        assert_eq!(reply.payload()["balance"], 500_000);
        assert_eq!(dispatcher.pending_count(), 0);

        responder.await.unwrap();
        handle.shutdown();
    }

    // =========================================================================
    // PROPERTY 3: READINESS GATE
    // =========================================================================

    #[tokio::test]
    async fn test_call_before_readiness_fails_not_ready_and_never_publishes() {
        let bus = Arc::new(InMemoryBus::new());

        // A dispatcher whose gate never activates.
        let gate = Arc::new(ReadinessGate::new());
        let dispatcher = RequestDispatcher::new(
            bus.clone(),
            Arc::new(PendingCallStore::new()),
            gate,
            BridgeConfig {
                readiness_wait: Duration::from_millis(50),
                ..BridgeConfig::default()
            },
        );

        let result = dispatcher
            .call(BALANCE_QUERY.request, json!({"userId": "u1"}), None)
            .await;

        assert!(matches!(result, Err(CallError::NotReady { .. })));
        // Never sent: nothing was published to the bus at all.
        assert_eq!(bus.records_published(), 0);
        assert_eq!(dispatcher.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_call_blocks_until_gate_flips() {
        let bus = Arc::new(InMemoryBus::new());
        let pending = Arc::new(PendingCallStore::new());
        let gate = Arc::new(ReadinessGate::new());
        let dispatcher = RequestDispatcher::new(
            bus.clone(),
            pending.clone(),
            gate.clone(),
            BridgeConfig::default(),
        );

        // Responder answers the request whenever it lands, settling
        // directly through the store: this test isolates the gate, not
        // the correlator.
        let mut requests = bus.subscribe(&[BALANCE_QUERY.request]);
        let responder_pending = pending.clone();
        tokio::spawn(async move {
            if let Some(record) = requests.recv().await {
                let envelope = CorrelatedMessage::decode(&record.payload).unwrap();
                responder_pending.resolve(envelope.correlation_id, json!({"success": true}));
            }
        });

        // Flip the gate only after the call has started waiting.
        let late_gate = gate.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            late_gate.mark_ready();
        });

        let reply = dispatcher
            .call(
                BALANCE_QUERY.request,
                json!({"userId": "u1"}),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        assert!(reply.is_success());
    }

    // =========================================================================
    // PROPERTY 4: TIMEOUT THEN LATE RESPONSE
    // =========================================================================

    #[tokio::test]
    async fn test_late_response_after_timeout_is_noop() {
        let bus = Arc::new(InMemoryBus::new());
        let handle = Bridge::start(bus.clone(), BridgeConfig::default()).unwrap();
        let dispatcher = handle.dispatcher();

        let mut requests = bus.subscribe(&[BALANCE_QUERY.request]);

        let result = dispatcher
            .call(
                BALANCE_QUERY.request,
                json!({"userId": "u1"}),
                Some(Duration::from_millis(50)),
            )
            .await;
        assert!(matches!(result, Err(CallError::Timeout { .. })));
        assert_eq!(dispatcher.pending_count(), 0);

        // Deliver the response well after the deadline.
        let record = requests.try_recv().unwrap().expect("request was published");
        let envelope = CorrelatedMessage::decode(&record.payload).unwrap();
        publish_response(
            &bus,
            envelope.correlation_id,
            json!({"success": true, "balance": 1}),
        )
        .await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        // No crash, no re-settlement: the late record matched nothing.
        let stats = dispatcher.stats();
        assert_eq!(stats.total_resolved.load(Ordering::Relaxed), 0);
        assert_eq!(stats.total_timeouts.load(Ordering::Relaxed), 1);
        assert_eq!(dispatcher.pending_count(), 0);

        handle.shutdown();
    }

    // =========================================================================
    // PROPERTY 6: NO CROSS-TALK AT SCALE
    // =========================================================================

    #[tokio::test]
    async fn test_hundred_concurrent_calls_settle_independently() {
        const CALLS: usize = 100;

        let bus = Arc::new(InMemoryBus::new());
        let handle = Bridge::start(bus.clone(), BridgeConfig::default()).unwrap();
        let dispatcher = handle.dispatcher();

        // Answer each request as it arrives, echoing its payload back.
        let mut requests = bus.subscribe(&[BALANCE_QUERY.request]);
        let responder_bus = bus.clone();
        let responder = tokio::spawn(async move {
            for _ in 0..CALLS {
                let record = requests.recv().await.expect("bus closed");
                let envelope = CorrelatedMessage::decode(&record.payload).unwrap();
                let user = envelope.payload["userId"].clone();
                publish_response(
                    &responder_bus,
                    envelope.correlation_id,
                    json!({"success": true, "userId": user}),
                )
                .await;
            }
        });

        let calls: Vec<_> = (0..CALLS)
            .map(|i| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let user = format!("user-{i}");
                    let reply = dispatcher
                        .call(
                            BALANCE_QUERY.request,
                            json!({"userId": user}),
                            Some(Duration::from_secs(5)),
                        )
                        .await
                        .unwrap();
                    (user, reply)
                })
            })
            .collect();

        for call in calls {
            let (user, reply) = call.await.unwrap();
            assert!(reply.is_success());
            assert_eq!(reply.payload()["userId"], user);
        }
        responder.await.unwrap();

        assert_eq!(dispatcher.pending_count(), 0);
        handle.shutdown();
    }
}
