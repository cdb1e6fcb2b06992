//! In-process record store.
//!
//! Backs local runs and the test suite. Behaves like the remote store,
//! including the conditional-update contract, and adds fault-injection
//! hooks so the engine's rollback paths can be exercised
//! deterministically.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::models::{NewTransaction, Transaction, User, Wallet};
use crate::{RemitError, Result};

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    wallets: HashMap<String, Wallet>,
    transactions: Vec<Transaction>,
    /// Wallet ids whose next delta fails with `DependencyUnavailable`.
    /// Each entry is consumed by one failure.
    failing_deltas: Vec<String>,
    /// 1-based ordinals of `apply_delta` calls that fail.
    failing_delta_calls: Vec<u64>,
    delta_calls: u64,
    /// 1-based ordinals of `append_transaction` calls that fail.
    failing_append_calls: Vec<u64>,
    append_calls: u64,
}

/// Mutex-guarded in-memory store.
///
/// The lock is held only for the duration of each synchronous map
/// operation, never across an await point, so the async trait methods
/// are safe with the std mutex.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or replaces a user record.
    pub fn put_user(&self, user: User) {
        self.lock().users.insert(user.id.clone(), user);
    }

    /// Seeds or replaces a wallet record.
    pub fn put_wallet(&self, wallet: Wallet) {
        self.lock().wallets.insert(wallet.id.clone(), wallet);
    }

    /// Makes the next delta against `wallet_id` fail as if the store
    /// were unreachable. One injection per call.
    pub fn fail_next_delta(&self, wallet_id: &str) {
        self.lock().failing_deltas.push(wallet_id.to_string());
    }

    /// Makes the `n`-th `apply_delta` call (1-based, counting from now)
    /// fail as if the store were unreachable. Lets tests target a write
    /// deep inside a multi-step operation, e.g. the compensating refund.
    pub fn fail_delta_call(&self, n: u64) {
        let mut inner = self.lock();
        let ordinal = inner.delta_calls + n;
        inner.failing_delta_calls.push(ordinal);
    }

    /// Makes the `n`-th `append_transaction` call (1-based, counting
    /// from now) fail as if the store were unreachable.
    pub fn fail_append_call(&self, n: u64) {
        let mut inner = self.lock();
        let ordinal = inner.append_calls + n;
        inner.failing_append_calls.push(ordinal);
    }

    /// Snapshot of every recorded transaction, in append order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }

    /// Current balance of a wallet, for test assertions.
    pub fn balance_of(&self, wallet_id: &str) -> Option<Decimal> {
        self.lock().wallets.get(wallet_id).map(|w| w.balance)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl super::RecordStore for MemoryStore {
    async fn user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.lock().users.get(user_id).cloned())
    }

    async fn wallet(&self, wallet_id: &str) -> Result<Option<Wallet>> {
        Ok(self.lock().wallets.get(wallet_id).cloned())
    }

    async fn wallets_for_user(&self, user_id: &str) -> Result<Vec<Wallet>> {
        Ok(self
            .lock()
            .wallets
            .values()
            .filter(|w| w.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn apply_delta(
        &self,
        wallet_id: &str,
        expected_balance: Decimal,
        delta: Decimal,
    ) -> Result<Wallet> {
        let mut inner = self.lock();

        inner.delta_calls += 1;
        let call = inner.delta_calls;
        if let Some(pos) = inner.failing_delta_calls.iter().position(|&n| n == call) {
            inner.failing_delta_calls.remove(pos);
            return Err(RemitError::DependencyUnavailable(format!(
                "injected fault on delta call {call}"
            )));
        }
        if let Some(pos) = inner.failing_deltas.iter().position(|id| id == wallet_id) {
            inner.failing_deltas.remove(pos);
            return Err(RemitError::DependencyUnavailable(format!(
                "injected fault on delta for {wallet_id}"
            )));
        }

        let wallet = inner
            .wallets
            .get_mut(wallet_id)
            .ok_or_else(|| RemitError::WalletNotFound(wallet_id.to_string()))?;

        if wallet.balance != expected_balance {
            return Err(RemitError::BalanceConflict);
        }

        let new_balance = wallet.balance + delta;
        if new_balance < Decimal::ZERO {
            return Err(RemitError::NegativeBalance);
        }

        wallet.balance = new_balance;
        debug!(wallet = wallet_id, %delta, balance = %new_balance, "applied delta");
        Ok(wallet.clone())
    }

    async fn append_transaction(&self, tx: NewTransaction) -> Result<Uuid> {
        let mut inner = self.lock();

        inner.append_calls += 1;
        let call = inner.append_calls;
        if let Some(pos) = inner.failing_append_calls.iter().position(|&n| n == call) {
            inner.failing_append_calls.remove(pos);
            return Err(RemitError::DependencyUnavailable(format!(
                "injected fault on append call {call}"
            )));
        }

        let id = Uuid::new_v4();
        inner.transactions.push(tx.into_record(id));
        Ok(id)
    }

    async fn transactions_for_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .filter(|tx| {
                tx.from_wallet.as_deref() == Some(wallet_id)
                    || tx.to_wallet.as_deref() == Some(wallet_id)
            })
            .cloned()
            .collect())
    }
}
