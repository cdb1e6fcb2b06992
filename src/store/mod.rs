//! Record store abstraction: ledger balances plus the append-only
//! transaction log.
//!
//! Both concerns live behind one [`RecordStore`] trait because they share
//! a backend (a generic JSON record collection). The engine only needs
//! the contract: reads by id, a conditional balance delta, and an
//! append that never mutates existing records.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::Result;
use crate::models::{NewTransaction, Transaction, User, Wallet};

pub use http::HttpRecordStore;
pub use memory::MemoryStore;

/// Backend contract for the ledger store and transaction log.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads a user by id, `None` when the id does not resolve.
    async fn user(&self, user_id: &str) -> Result<Option<User>>;

    /// Loads a wallet by id, `None` when the id does not resolve.
    async fn wallet(&self, wallet_id: &str) -> Result<Option<Wallet>>;

    /// Lists all wallets owned by a user.
    async fn wallets_for_user(&self, user_id: &str) -> Result<Vec<Wallet>>;

    /// Conditionally applies `delta` to a wallet's balance.
    ///
    /// The new balance `expected_balance + delta` commits only while the
    /// stored balance still equals `expected_balance`; otherwise the call
    /// fails with [`RemitError::BalanceConflict`](crate::RemitError::BalanceConflict)
    /// and no change occurs. A result below zero is rejected with
    /// [`RemitError::NegativeBalance`](crate::RemitError::NegativeBalance)
    /// regardless of any user-level threshold. All-or-nothing per wallet.
    async fn apply_delta(
        &self,
        wallet_id: &str,
        expected_balance: Decimal,
        delta: Decimal,
    ) -> Result<Wallet>;

    /// Appends a transaction record and returns its generated id.
    ///
    /// Ids are 128-bit random; existing records are never touched, so
    /// concurrent appends need no coordination.
    async fn append_transaction(&self, tx: NewTransaction) -> Result<Uuid>;

    /// Transactions touching a wallet, for history display. Not used by
    /// the engine itself.
    async fn transactions_for_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>>;
}
