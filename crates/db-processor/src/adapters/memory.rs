//! In-memory store adapter.
//!
//! One mutex guards all state, so every port operation is atomic by
//! construction - the same commit-or-nothing behavior a SQL adapter gets
//! from a database transaction.

use crate::ports::{BrokerStore, OpenTrade, StoreError, TradeOutcome};
use async_trait::async_trait;
use shared_types::{
    OrderId, Quantity, TradeRecord, TradeStatus, UsdCents, UserId, UserRecord,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    email_index: HashMap<String, UserId>,
    balances: HashMap<UserId, UsdCents>,
    holdings: HashMap<(UserId, String), Quantity>,
    trades: HashMap<OrderId, TradeRecord>,
}

/// Mutex-guarded in-memory implementation of [`BrokerStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Internal(format!("store lock poisoned: {e}")))
    }
}

#[async_trait]
impl BrokerStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        opening_balance: UsdCents,
    ) -> Result<UserId, StoreError> {
        let mut state = self.lock()?;
        if state.email_index.contains_key(email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = UserRecord {
            id: UserId::generate(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            verified: true,
        };
        let id = user.id.clone();

        // User and opening balance land together or not at all; the
        // duplicate check above is the only early exit.
        state.email_index.insert(email.to_string(), id.clone());
        state.users.insert(id.clone(), user);
        state.balances.insert(id.clone(), opening_balance);

        Ok(id)
    }

    async fn balance_of(&self, user_id: &UserId) -> Result<UsdCents, StoreError> {
        let state = self.lock()?;
        state
            .balances
            .get(user_id)
            .copied()
            .ok_or(StoreError::BalanceNotFound)
    }

    async fn holdings_of(&self, user_id: &UserId, asset: &str) -> Result<Quantity, StoreError> {
        let state = self.lock()?;
        Ok(state
            .holdings
            .get(&(user_id.clone(), asset.to_string()))
            .copied()
            .unwrap_or(Quantity::ZERO))
    }

    async fn open_trade(&self, request: OpenTrade) -> Result<OrderId, StoreError> {
        let mut state = self.lock()?;

        let balance = state
            .balances
            .get(&request.user_id)
            .copied()
            .ok_or(StoreError::InsufficientBalance)?;
        if balance < request.margin {
            return Err(StoreError::InsufficientBalance);
        }

        let order_id = OrderId::generate();
        let trade = TradeRecord {
            id: order_id.clone(),
            user_id: request.user_id.clone(),
            asset: request.asset,
            side: request.side,
            margin: request.margin,
            leverage: request.leverage,
            slippage: request.slippage,
            status: TradeStatus::Open,
            quantity: None,
            entry_price: None,
            close_price: None,
            pnl: None,
            opened_at: request.opened_at,
            closed_at: None,
        };

        // Debit and insert under the same lock: commit or fail together.
        state
            .balances
            .insert(request.user_id, balance - request.margin);
        state.trades.insert(order_id.clone(), trade);

        Ok(order_id)
    }

    async fn close_trade(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
        closed_at: u64,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;

        let trade = state.trades.get_mut(order_id).ok_or(StoreError::TradeNotOpen)?;
        if trade.user_id != *user_id || trade.status != TradeStatus::Open {
            return Err(StoreError::TradeNotOpen);
        }

        trade.status = TradeStatus::Closed;
        trade.closed_at = Some(closed_at);
        Ok(())
    }

    async fn apply_trade_outcome(&self, outcome: TradeOutcome) -> Result<(), StoreError> {
        let mut state = self.lock()?;

        let record = TradeRecord {
            id: outcome.trade_id.clone(),
            user_id: outcome.user_id.clone(),
            asset: outcome.asset.clone(),
            side: outcome.side,
            margin: outcome.margin,
            leverage: outcome.leverage,
            slippage: outcome.slippage,
            status: outcome.status,
            quantity: Some(outcome.quantity),
            entry_price: Some(outcome.entry_price),
            close_price: outcome.close_price,
            pnl: outcome.pnl,
            opened_at: state
                .trades
                .get(&outcome.trade_id)
                .map_or_else(|| outcome.timestamp.unwrap_or_default(), |t| t.opened_at),
            closed_at: outcome.timestamp,
        };
        state.trades.insert(outcome.trade_id, record);

        if let Some(balance) = outcome.updated_balance {
            state.balances.insert(outcome.user_id.clone(), balance);
        }
        if let Some(quantity) = outcome.updated_holdings {
            state
                .holdings
                .insert((outcome.user_id, outcome.asset), quantity);
        }

        Ok(())
    }

    async fn find_trade(&self, order_id: &OrderId) -> Result<Option<TradeRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state.trades.get(order_id).cloned())
    }
}
