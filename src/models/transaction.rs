//! Transaction records appended to the history log.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Funds entering a wallet from outside the system; no source wallet.
    Deposit,
    /// Funds leaving the system; no destination wallet.
    Withdraw,
    /// Debit side of a wallet-to-wallet movement.
    Transfer,
    /// Credit side of an external transfer, recorded in the recipient's
    /// own history with no service charge.
    Receive,
}

/// Outcome recorded on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TransactionStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "not-started")]
    NotStarted,
}

/// An immutable, fully-recorded history entry.
///
/// Once appended a transaction is never updated in place; corrections
/// are modeled as new transactions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    /// Principal requested by the user, excluding the service charge.
    pub amount: Decimal,
    /// Fee computed by the engine, never user-supplied.
    pub service_charge: Decimal,
    #[serde(rename = "type")]
    pub tpe: TransactionType,
    pub status: TransactionStatus,
    #[serde(default)]
    pub reason: Option<String>,
    /// ISO 8601 creation time, immutable.
    pub timestamp: String,
}

/// Payload for a log append. The store assigns the id at creation time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    pub amount: Decimal,
    pub service_charge: Decimal,
    #[serde(rename = "type")]
    pub tpe: TransactionType,
    pub status: TransactionStatus,
    pub reason: Option<String>,
    pub timestamp: String,
}

impl NewTransaction {
    /// Seals the payload with a freshly generated 128-bit random id.
    pub fn into_record(self, id: Uuid) -> Transaction {
        Transaction {
            id,
            from_wallet: self.from_wallet,
            to_wallet: self.to_wallet,
            amount: self.amount,
            service_charge: self.service_charge,
            tpe: self.tpe,
            status: self.status,
            reason: self.reason,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deserializes_transfer_record() {
        let tx: Transaction = serde_json::from_str(
            r#"{
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "fromWallet": "w1",
                "toWallet": "w2",
                "amount": "500",
                "serviceCharge": "1",
                "type": "transfer",
                "status": "success",
                "reason": "rent",
                "timestamp": "2024-01-15T10:30:00.000000Z"
            }"#,
        )
        .unwrap();
        assert_eq!(tx.tpe, TransactionType::Transfer);
        assert_eq!(tx.status, TransactionStatus::Success);
        assert_eq!(tx.amount, dec!(500));
        assert_eq!(tx.service_charge, dec!(1));
        assert_eq!(tx.reason.as_deref(), Some("rent"));
    }

    #[test]
    fn deposit_has_no_source_wallet() {
        let tx: Transaction = serde_json::from_str(
            r#"{
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "fromWallet": null,
                "toWallet": "w2",
                "amount": "50",
                "serviceCharge": "0",
                "type": "deposit",
                "status": "success",
                "timestamp": "2024-01-15T10:30:00.000000Z"
            }"#,
        )
        .unwrap();
        assert_eq!(tx.tpe, TransactionType::Deposit);
        assert!(tx.from_wallet.is_none());
        assert!(tx.reason.is_none());
    }

    #[test]
    fn serializes_wire_field_names() {
        let payload = NewTransaction {
            from_wallet: Some("w1".to_string()),
            to_wallet: Some("w2".to_string()),
            amount: dec!(500),
            service_charge: dec!(1),
            tpe: TransactionType::Transfer,
            status: TransactionStatus::Success,
            reason: None,
            timestamp: "2024-01-15T10:30:00.000000Z".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["fromWallet"], "w1");
        assert_eq!(json["serviceCharge"], "1");
        assert_eq!(json["type"], "transfer");
        assert_eq!(json["status"], "success");
    }
}
