//! Deserialization tests for the record store model types.

use rust_decimal_macros::dec;

use remit::models::{
    KycStatus, Transaction, TransactionStatus, TransactionType, User, Wallet,
};

const USER_JSON: &str = include_str!("fixtures/user.json");
const WALLET_JSON: &str = include_str!("fixtures/wallet.json");
const WALLETS_JSON: &str = include_str!("fixtures/wallets.json");
const TRANSFER_JSON: &str = include_str!("fixtures/transaction_transfer.json");
const RECEIVE_JSON: &str = include_str!("fixtures/transaction_receive.json");
const WITHDRAW_JSON: &str = include_str!("fixtures/transaction_withdraw.json");

#[test]
fn test_user_deserializes() {
    let user: User = serde_json::from_str(USER_JSON).expect("Failed to deserialize user");

    assert_eq!(user.id, "u-1001");
    assert_eq!(user.credential, "s3cret");
    assert_eq!(user.kyc_status, KycStatus::Approved);
    assert_eq!(user.currency.as_deref(), Some("USD"));
    assert_eq!(user.min_balance_threshold, dec!(100));
}

#[test]
fn test_wallet_deserializes() {
    let wallet: Wallet = serde_json::from_str(WALLET_JSON).expect("Failed to deserialize wallet");

    assert_eq!(wallet.id, "w-2001");
    assert_eq!(wallet.owner_id, "u-1001");
    assert_eq!(wallet.display_label, "Main account 4821");
    assert_eq!(wallet.balance, dec!(1000.50));
    assert_eq!(wallet.currency, "USD");
}

#[test]
fn test_wallet_list_deserializes() {
    let wallets: Vec<Wallet> =
        serde_json::from_str(WALLETS_JSON).expect("Failed to deserialize wallet list");

    assert_eq!(wallets.len(), 2);
    assert_eq!(wallets[0].id, "w-2001");
    assert_eq!(wallets[1].id, "w-2002");
    assert_eq!(wallets[1].balance, dec!(200));
    assert!(wallets.iter().all(|w| w.owner_id == "u-1001"));
}

#[test]
fn test_transfer_transaction_deserializes() {
    let tx: Transaction =
        serde_json::from_str(TRANSFER_JSON).expect("Failed to deserialize transfer transaction");

    assert_eq!(tx.tpe, TransactionType::Transfer);
    assert_eq!(tx.status, TransactionStatus::Success);
    assert_eq!(tx.from_wallet.as_deref(), Some("w-2001"));
    assert_eq!(tx.to_wallet.as_deref(), Some("w-2002"));
    assert_eq!(tx.amount, dec!(500));
    assert_eq!(tx.service_charge, dec!(1));
    assert_eq!(tx.reason.as_deref(), Some("monthly savings"));
    assert_eq!(tx.timestamp, "2024-01-15T10:30:00.123456Z");
}

#[test]
fn test_receive_transaction_has_no_charge() {
    let tx: Transaction =
        serde_json::from_str(RECEIVE_JSON).expect("Failed to deserialize receive transaction");

    assert_eq!(tx.tpe, TransactionType::Receive);
    assert_eq!(tx.service_charge, dec!(0));
    assert!(tx.reason.is_none());
}

#[test]
fn test_withdraw_transaction_deserializes() {
    let tx: Transaction =
        serde_json::from_str(WITHDRAW_JSON).expect("Failed to deserialize withdraw transaction");

    assert_eq!(tx.tpe, TransactionType::Withdraw);
    assert_eq!(tx.status, TransactionStatus::NotStarted);
    assert!(tx.to_wallet.is_none());
    assert_eq!(tx.amount, dec!(75.25));
}

#[test]
fn test_round_trip_preserves_wire_names() {
    let tx: Transaction = serde_json::from_str(TRANSFER_JSON).unwrap();
    let value = serde_json::to_value(&tx).unwrap();

    assert_eq!(value["fromWallet"], "w-2001");
    assert_eq!(value["serviceCharge"], "1");
    assert_eq!(value["type"], "transfer");
    assert_eq!(value["status"], "success");
}
