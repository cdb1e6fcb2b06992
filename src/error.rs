//! Crate-level error types.
//!
//! [`RemitError`] unifies every failure the transfer core can surface
//! (validation, authorization, business-rule rejections, record-store
//! faults) behind a single enum so callers can match on the variant they
//! care about while still using the `?` operator for easy propagation.
//!
//! Retry guidance: [`RemitError::DependencyUnavailable`] and
//! [`RemitError::BalanceConflict`] are safe to retry; every other variant
//! is a definitive rejection. [`RemitError::RollbackFailed`] means a
//! compensating write could not be applied and the ledger needs manual
//! reconciliation.

use rust_decimal::Decimal;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RemitError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum RemitError {
    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested amount is zero or negative.
    #[error("amount must be positive")]
    InvalidAmount,

    /// The initiating user does not exist in the record store.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The initiating user has not completed KYC approval.
    #[error("user has not passed KYC approval")]
    KycNotApproved,

    /// The supplied credential does not match the stored one.
    #[error("invalid credential")]
    InvalidCredential,

    /// A wallet referenced by the request does not exist.
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    /// The source wallet is not owned by the initiating user.
    #[error("wallet does not belong to the initiating user")]
    Unauthorized,

    /// Source and destination wallets hold different currencies.
    #[error("currency mismatch: {from} -> {to}")]
    CurrencyMismatch { from: String, to: String },

    /// The debit would take the source wallet below the owner's
    /// minimum-balance threshold. `deficit` is how far below.
    #[error("insufficient balance: short by {deficit}")]
    InsufficientBalance { deficit: Decimal },

    /// A delta would take a wallet's literal balance below zero. This is
    /// the record store's hard floor, independent of any user threshold.
    #[error("delta would make wallet balance negative")]
    NegativeBalance,

    /// A conditional balance update lost a race: the wallet's stored
    /// balance no longer matched the expected value. Retry with a fresh
    /// read.
    #[error("wallet balance changed concurrently")]
    BalanceConflict,

    /// The record store could not be reached or returned a transport-level
    /// failure. Any partially applied mutation has been rolled back.
    #[error("record store unavailable: {0}")]
    DependencyUnavailable(String),

    /// A compensating write failed after a partial mutation. The ledger
    /// may be inconsistent and requires manual reconciliation.
    #[error("rollback failed, ledger requires reconciliation: {0}")]
    RollbackFailed(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RemitError {
    fn from(err: reqwest::Error) -> Self {
        RemitError::DependencyUnavailable(err.to_string())
    }
}
