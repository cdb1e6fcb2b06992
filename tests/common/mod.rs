//! Shared helpers for the integration test suite.

use rust_decimal::Decimal;
use zeroize::Zeroizing;

use remit::config::FeeConfig;
use remit::engine::{TransferEngine, TransferKind, TransferRequest};
use remit::models::{KycStatus, User, Wallet};
use remit::store::MemoryStore;

pub const CREDENTIAL: &str = "correct horse battery staple";

/// Engine over a fresh in-memory store with the default fee schedule.
pub fn engine() -> TransferEngine<MemoryStore> {
    TransferEngine::new(MemoryStore::new(), FeeConfig::default())
}

pub fn seed_user(store: &MemoryStore, id: &str, threshold: Decimal) {
    store.put_user(User {
        id: id.to_string(),
        credential: CREDENTIAL.to_string(),
        kyc_status: KycStatus::Approved,
        currency: Some("USD".to_string()),
        min_balance_threshold: threshold,
    });
}

pub fn seed_wallet(store: &MemoryStore, id: &str, owner: &str, balance: Decimal) {
    store.put_wallet(Wallet {
        id: id.to_string(),
        owner_id: owner.to_string(),
        display_label: format!("Account {id}"),
        balance,
        currency: "USD".to_string(),
    });
}

/// A transfer request with the shared test credential.
pub fn request(
    user: &str,
    from: &str,
    to: &str,
    amount: Decimal,
    kind: TransferKind,
) -> TransferRequest {
    TransferRequest {
        initiator_user_id: user.to_string(),
        from_wallet_id: from.to_string(),
        to_wallet_id: to.to_string(),
        amount,
        reason: None,
        credential: Zeroizing::new(CREDENTIAL.to_string()),
        kind,
    }
}
