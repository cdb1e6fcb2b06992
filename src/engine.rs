//! Transfer engine: orchestrates one money movement end-to-end.
//!
//! A transfer runs as a fixed sequence: validate the amount, pass the
//! authorization gate, load both wallets, compute the service charge,
//! enforce the owner's minimum-balance floor, debit, credit, then append
//! the history records. Every failure before the debit leaves the store
//! untouched; a failure after the debit triggers a compensating write so
//! the ledger never keeps a half-applied transfer.
//!
//! Balance writes go through the store's conditional delta, so a lost
//! race against a concurrent debit shows up as
//! [`RemitError::BalanceConflict`] and is retried with a fresh read
//! instead of overdrafting the wallet.

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::auth;
use crate::config::FeeConfig;
use crate::models::{NewTransaction, TransactionStatus, TransactionType, User, Wallet};
use crate::store::RecordStore;
use crate::timefmt::iso_timestamp;
use crate::{RemitError, Result};

/// Service charge for a transfer between wallets of the same user (0.2%).
pub const INTERNAL_FEE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 3);

/// Service charge for a transfer to another user's wallet (2%).
pub const EXTERNAL_FEE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// How many times a conditional delta is retried after losing a race.
const DELTA_ATTEMPTS: u32 = 3;

/// Whether the destination wallet belongs to the initiator or to
/// another user. External transfers carry the higher fee rate and a
/// second, credit-side history record for the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Internal,
    External,
}

/// One requested wallet-to-wallet movement.
#[derive(Debug)]
pub struct TransferRequest {
    pub initiator_user_id: String,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    /// Principal to move, excluding the service charge.
    pub amount: Decimal,
    /// Optional free-text memo recorded on the transaction.
    pub reason: Option<String>,
    /// Re-entered credential, checked by the authorization gate.
    pub credential: Zeroizing<String>,
    pub kind: TransferKind,
}

/// A deposit into or withdrawal from a single wallet.
#[derive(Debug)]
pub struct FundingRequest {
    pub user_id: String,
    pub wallet_id: String,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub credential: Zeroizing<String>,
}

/// Outcome of a successful transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    /// Id of the debit-side transaction record.
    pub transaction_id: Uuid,
    pub service_charge: Decimal,
    /// Principal plus service charge, the full amount removed from the
    /// source wallet.
    pub total_debit: Decimal,
}

/// Engine bound to a record store and a fee schedule.
pub struct TransferEngine<S> {
    store: S,
    fees: FeeConfig,
}

impl<S: RecordStore> TransferEngine<S> {
    pub fn new(store: S, fees: FeeConfig) -> Self {
        Self { store, fees }
    }

    /// The backing store, for history reads by the caller.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves `request.amount` between two wallets.
    ///
    /// Two calls with identical parameters are two transfers: the engine
    /// performs no deduplication, and idempotency keys are the caller's
    /// concern.
    ///
    /// # Errors
    ///
    /// Returns the validation, authorization, or business-rule failure
    /// described in [`RemitError`]. [`RemitError::RollbackFailed`] means
    /// a compensating write failed and the ledger needs reconciliation.
    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt> {
        if request.amount <= Decimal::ZERO {
            return Err(RemitError::InvalidAmount);
        }

        // Authorization strictly precedes any ledger read performed for
        // mutation, so an unauthorized caller learns nothing about
        // balances.
        let user = self.load_user(&request.initiator_user_id).await?;
        auth::authorize(&user, &request.credential)?;

        let from = self.load_wallet(&request.from_wallet_id).await?;
        let to = self.load_wallet(&request.to_wallet_id).await?;

        if from.owner_id != user.id {
            return Err(RemitError::Unauthorized);
        }
        if from.currency != to.currency {
            return Err(RemitError::CurrencyMismatch {
                from: from.currency,
                to: to.currency,
            });
        }

        let service_charge = request.amount * self.rate(request.kind);
        let total_debit = request.amount + service_charge;

        self.debit_source(&from, total_debit, user.min_balance_threshold)
            .await?;

        if let Err(credit_err) = self.credit_destination(&to, request.amount).await {
            return Err(self
                .refund_source(&from.id, total_debit, credit_err)
                .await);
        }

        let timestamp = iso_timestamp();
        let debit_record = NewTransaction {
            from_wallet: Some(from.id.clone()),
            to_wallet: Some(to.id.clone()),
            amount: request.amount,
            service_charge,
            tpe: TransactionType::Transfer,
            status: TransactionStatus::Success,
            reason: request.reason.clone(),
            timestamp: timestamp.clone(),
        };

        let transaction_id = match self.store.append_transaction(debit_record).await {
            Ok(id) => id,
            Err(append_err) => {
                // Both deltas committed but nothing is recorded yet, so
                // reverse both and surface the append failure.
                return Err(self
                    .unwind_transfer(&from.id, &to.id, total_debit, request.amount, append_err)
                    .await);
            }
        };

        if request.kind == TransferKind::External {
            let receive_record = NewTransaction {
                from_wallet: Some(from.id.clone()),
                to_wallet: Some(to.id.clone()),
                amount: request.amount,
                service_charge: Decimal::ZERO,
                tpe: TransactionType::Receive,
                status: TransactionStatus::Success,
                reason: request.reason,
                timestamp,
            };
            if let Err(e) = self.store.append_transaction(receive_record).await {
                // The transfer is final: funds moved and the debit record
                // is committed. The receive entry only feeds the
                // recipient's history view; reconciliation backfills it.
                error!(
                    transaction = %transaction_id,
                    error = %e,
                    "receive-side record append failed"
                );
            }
        }

        info!(
            transaction = %transaction_id,
            from = %from.id,
            to = %to.id,
            amount = %request.amount,
            %service_charge,
            "transfer complete"
        );

        Ok(TransferReceipt {
            transaction_id,
            service_charge,
            total_debit,
        })
    }

    /// Credits external funds into a user's wallet. No service charge,
    /// no floor check.
    pub async fn deposit(&self, request: FundingRequest) -> Result<Uuid> {
        let (_, wallet) = self.validate_funding(&request).await?;

        self.credit_destination(&wallet, request.amount).await?;

        let record = NewTransaction {
            from_wallet: None,
            to_wallet: Some(wallet.id.clone()),
            amount: request.amount,
            service_charge: Decimal::ZERO,
            tpe: TransactionType::Deposit,
            status: TransactionStatus::Success,
            reason: request.reason,
            timestamp: iso_timestamp(),
        };
        match self.store.append_transaction(record).await {
            Ok(id) => {
                info!(wallet = %wallet.id, amount = %request.amount, "deposit complete");
                Ok(id)
            }
            Err(append_err) => {
                Err(self
                    .reverse_delta(&wallet.id, -request.amount, append_err)
                    .await)
            }
        }
    }

    /// Debits funds out of a user's wallet. No service charge, but the
    /// owner's minimum-balance floor applies just as for transfers.
    pub async fn withdraw(&self, request: FundingRequest) -> Result<Uuid> {
        let (user, wallet) = self.validate_funding(&request).await?;

        self.debit_source(&wallet, request.amount, user.min_balance_threshold)
            .await?;

        let record = NewTransaction {
            from_wallet: Some(wallet.id.clone()),
            to_wallet: None,
            amount: request.amount,
            service_charge: Decimal::ZERO,
            tpe: TransactionType::Withdraw,
            status: TransactionStatus::Success,
            reason: request.reason,
            timestamp: iso_timestamp(),
        };
        match self.store.append_transaction(record).await {
            Ok(id) => {
                info!(wallet = %wallet.id, amount = %request.amount, "withdrawal complete");
                Ok(id)
            }
            Err(append_err) => {
                Err(self
                    .reverse_delta(&wallet.id, request.amount, append_err)
                    .await)
            }
        }
    }

    fn rate(&self, kind: TransferKind) -> Decimal {
        match kind {
            TransferKind::Internal => self.fees.internal_rate,
            TransferKind::External => self.fees.external_rate,
        }
    }

    async fn load_user(&self, user_id: &str) -> Result<User> {
        self.store
            .user(user_id)
            .await?
            .ok_or_else(|| RemitError::UserNotFound(user_id.to_string()))
    }

    async fn load_wallet(&self, wallet_id: &str) -> Result<Wallet> {
        self.store
            .wallet(wallet_id)
            .await?
            .ok_or_else(|| RemitError::WalletNotFound(wallet_id.to_string()))
    }

    /// Shared validation for deposit/withdraw requests. Mirrors the
    /// transfer ordering: amount, then authorization, then structure.
    async fn validate_funding(&self, request: &FundingRequest) -> Result<(User, Wallet)> {
        if request.amount <= Decimal::ZERO {
            return Err(RemitError::InvalidAmount);
        }
        let user = self.load_user(&request.user_id).await?;
        auth::authorize(&user, &request.credential)?;
        let wallet = self.load_wallet(&request.wallet_id).await?;
        if wallet.owner_id != user.id {
            return Err(RemitError::Unauthorized);
        }
        Ok((user, wallet))
    }

    /// Debits `total` from a wallet, re-checking the floor against a
    /// fresh snapshot each time a conditional write loses a race.
    async fn debit_source(&self, wallet: &Wallet, total: Decimal, floor: Decimal) -> Result<Wallet> {
        let mut snapshot = wallet.clone();
        for attempt in 0..DELTA_ATTEMPTS {
            let remaining = snapshot.balance - total;
            if remaining < floor {
                return Err(RemitError::InsufficientBalance {
                    deficit: floor - remaining,
                });
            }
            match self
                .store
                .apply_delta(&snapshot.id, snapshot.balance, -total)
                .await
            {
                Ok(updated) => return Ok(updated),
                Err(RemitError::BalanceConflict) if attempt + 1 < DELTA_ATTEMPTS => {
                    warn!(wallet = %snapshot.id, attempt, "debit lost a race, retrying");
                    snapshot = self.load_wallet(&snapshot.id).await?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(RemitError::BalanceConflict)
    }

    /// Credits `amount` into a wallet, retrying lost races with a fresh
    /// snapshot. A credit can only fail on contention or store faults.
    async fn credit_destination(&self, wallet: &Wallet, amount: Decimal) -> Result<()> {
        let mut snapshot = wallet.clone();
        for attempt in 0..DELTA_ATTEMPTS {
            match self
                .store
                .apply_delta(&snapshot.id, snapshot.balance, amount)
                .await
            {
                Ok(_) => return Ok(()),
                Err(RemitError::BalanceConflict) if attempt + 1 < DELTA_ATTEMPTS => {
                    warn!(wallet = %snapshot.id, attempt, "credit lost a race, retrying");
                    snapshot = self.load_wallet(&snapshot.id).await?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(RemitError::BalanceConflict)
    }

    /// Compensates a committed debit after the credit side failed.
    /// Returns the error the caller should surface: the original cause,
    /// or `RollbackFailed` when the compensation itself fails.
    async fn refund_source(
        &self,
        wallet_id: &str,
        total: Decimal,
        cause: RemitError,
    ) -> RemitError {
        warn!(wallet = wallet_id, %total, error = %cause, "returning committed debit to source");
        match self.reapply(wallet_id, total).await {
            Ok(()) => cause,
            Err(e) => {
                error!(wallet = wallet_id, error = %e, "compensating credit failed");
                RemitError::RollbackFailed(format!(
                    "could not return {total} to wallet {wallet_id} after `{cause}`: {e}"
                ))
            }
        }
    }

    /// Reverses both committed deltas of a transfer after the log append
    /// failed, so no balance movement survives without a record.
    async fn unwind_transfer(
        &self,
        from_id: &str,
        to_id: &str,
        total: Decimal,
        amount: Decimal,
        cause: RemitError,
    ) -> RemitError {
        warn!(from = from_id, to = to_id, error = %cause, "log append failed, unwinding transfer");
        if let Err(e) = self.reapply(to_id, -amount).await {
            error!(wallet = to_id, error = %e, "could not reverse destination credit");
            return RemitError::RollbackFailed(format!(
                "could not reverse credit of {amount} to wallet {to_id} after `{cause}`: {e}"
            ));
        }
        self.refund_source(from_id, total, cause).await
    }

    /// Compensates a single committed funding delta after its log append
    /// failed.
    async fn reverse_delta(
        &self,
        wallet_id: &str,
        delta: Decimal,
        cause: RemitError,
    ) -> RemitError {
        warn!(wallet = wallet_id, error = %cause, "log append failed, reversing delta");
        match self.reapply(wallet_id, delta).await {
            Ok(()) => cause,
            Err(e) => {
                error!(wallet = wallet_id, error = %e, "compensating delta failed");
                RemitError::RollbackFailed(format!(
                    "could not apply compensating delta {delta} to wallet {wallet_id} after `{cause}`: {e}"
                ))
            }
        }
    }

    /// Applies a compensating delta against a freshly-read balance,
    /// retrying lost races.
    async fn reapply(&self, wallet_id: &str, delta: Decimal) -> Result<()> {
        for attempt in 0..DELTA_ATTEMPTS {
            let snapshot = self.load_wallet(wallet_id).await?;
            match self
                .store
                .apply_delta(wallet_id, snapshot.balance, delta)
                .await
            {
                Ok(_) => return Ok(()),
                Err(RemitError::BalanceConflict) if attempt + 1 < DELTA_ATTEMPTS => {
                    debug!(wallet = wallet_id, attempt, "compensation lost a race, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(RemitError::BalanceConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KycStatus, User, Wallet};
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn engine_with(store: MemoryStore) -> TransferEngine<MemoryStore> {
        TransferEngine::new(store, FeeConfig::default())
    }

    fn seed_user(store: &MemoryStore, id: &str) {
        store.put_user(User {
            id: id.to_string(),
            credential: "pw".to_string(),
            kyc_status: KycStatus::Approved,
            currency: Some("USD".to_string()),
            min_balance_threshold: dec!(100),
        });
    }

    fn seed_wallet(store: &MemoryStore, id: &str, owner: &str, balance: Decimal) {
        store.put_wallet(Wallet {
            id: id.to_string(),
            owner_id: owner.to_string(),
            display_label: format!("wallet {id}"),
            balance,
            currency: "USD".to_string(),
        });
    }

    fn funding(user: &str, wallet: &str, amount: Decimal) -> FundingRequest {
        FundingRequest {
            user_id: user.to_string(),
            wallet_id: wallet.to_string(),
            amount,
            reason: None,
            credential: Zeroizing::new("pw".to_string()),
        }
    }

    #[test]
    fn fee_rate_constants() {
        assert_eq!(INTERNAL_FEE_RATE, dec!(0.002));
        assert_eq!(EXTERNAL_FEE_RATE, dec!(0.02));
    }

    #[tokio::test]
    async fn deposit_credits_and_records() {
        let store = MemoryStore::new();
        seed_user(&store, "u1");
        seed_wallet(&store, "w1", "u1", dec!(100));
        let engine = engine_with(store);

        engine.deposit(funding("u1", "w1", dec!(40))).await.unwrap();

        assert_eq!(engine.store().balance_of("w1"), Some(dec!(140)));
        let txs = engine.store().transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].tpe, TransactionType::Deposit);
        assert!(txs[0].from_wallet.is_none());
        assert_eq!(txs[0].service_charge, dec!(0));
    }

    #[tokio::test]
    async fn withdraw_enforces_floor() {
        let store = MemoryStore::new();
        seed_user(&store, "u1");
        seed_wallet(&store, "w1", "u1", dec!(150));
        let engine = engine_with(store);

        // 150 - 60 = 90 < 100 threshold.
        let err = engine
            .withdraw(funding("u1", "w1", dec!(60)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RemitError::InsufficientBalance { deficit } if deficit == dec!(10)
        ));
        assert_eq!(engine.store().balance_of("w1"), Some(dec!(150)));
        assert!(engine.store().transactions().is_empty());
    }

    #[tokio::test]
    async fn withdraw_debits_and_records() {
        let store = MemoryStore::new();
        seed_user(&store, "u1");
        seed_wallet(&store, "w1", "u1", dec!(500));
        let engine = engine_with(store);

        engine.withdraw(funding("u1", "w1", dec!(300))).await.unwrap();

        assert_eq!(engine.store().balance_of("w1"), Some(dec!(200)));
        let txs = engine.store().transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].tpe, TransactionType::Withdraw);
        assert!(txs[0].to_wallet.is_none());
    }

    #[tokio::test]
    async fn deposit_rolls_back_when_append_fails() {
        let store = MemoryStore::new();
        seed_user(&store, "u1");
        seed_wallet(&store, "w1", "u1", dec!(100));
        store.fail_append_call(1);
        let engine = engine_with(store);

        let err = engine.deposit(funding("u1", "w1", dec!(40))).await.unwrap_err();
        assert!(matches!(err, RemitError::DependencyUnavailable(_)));
        assert_eq!(engine.store().balance_of("w1"), Some(dec!(100)));
        assert!(engine.store().transactions().is_empty());
    }

    #[tokio::test]
    async fn funding_requires_wallet_ownership() {
        let store = MemoryStore::new();
        seed_user(&store, "u1");
        seed_wallet(&store, "w2", "someone-else", dec!(100));
        let engine = engine_with(store);

        let err = engine.deposit(funding("u1", "w2", dec!(40))).await.unwrap_err();
        assert!(matches!(err, RemitError::Unauthorized));
    }
}
