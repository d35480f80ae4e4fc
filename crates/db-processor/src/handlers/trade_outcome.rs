//! Handler for `trade-outcome` - fire-and-forget reports from the
//! matching engine. No response topic; malformed reports are logged and
//! dropped.

use super::{HandlerOutcome, RequestHandler};
use crate::messages::TradeOutcomeMessage;
use crate::ports::{BrokerStore, TradeOutcome};
use async_trait::async_trait;
use shared_types::UsdCents;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct TradeOutcomeHandler {
    store: Arc<dyn BrokerStore>,
}

impl TradeOutcomeHandler {
    pub fn new(store: Arc<dyn BrokerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for TradeOutcomeHandler {
    async fn handle(&self, payload: serde_json::Value) -> HandlerOutcome {
        let message: TradeOutcomeMessage = match serde_json::from_value(payload) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Malformed trade outcome dropped");
                return HandlerOutcome::Dropped;
            }
        };

        let outcome = TradeOutcome {
            trade_id: message.trade_id.clone(),
            user_id: message.user_id,
            asset: message.asset,
            side: message.side,
            status: message.status,
            quantity: message.quantity,
            entry_price: message.entry_price,
            close_price: message.close_price,
            pnl: message.pnl,
            margin: message.margin.unwrap_or(UsdCents::ZERO),
            leverage: message.leverage.unwrap_or(0),
            slippage: message.slippage.unwrap_or(0),
            timestamp: message.timestamp,
            updated_balance: message.updated_balance,
            updated_holdings: message.updated_holdings,
        };

        match self.store.apply_trade_outcome(outcome).await {
            Ok(()) => {
                info!(trade_id = %message.trade_id, "Trade outcome applied");
            }
            Err(e) => {
                error!(trade_id = %message.trade_id, error = %e, "Trade outcome failed");
            }
        }
        HandlerOutcome::Dropped
    }
}
