//! User records as stored by the record collection API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default minimum balance a source wallet must retain after a debit.
pub const DEFAULT_MIN_BALANCE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// KYC verification state. Only `Approved` users may move money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum KycStatus {
    #[serde(rename = "not-started")]
    NotStarted,
    #[serde(rename = "approved")]
    Approved,
}

/// A registered user of the wallet application.
///
/// The transfer core only ever reads users: `credential` and
/// `kyc_status` feed the authorization gate, `min_balance_threshold`
/// feeds the sufficient-funds check.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Stored plaintext credential, compared byte-for-byte by the
    /// authorization gate. No hashing is modeled.
    pub credential: String,
    pub kyc_status: KycStatus,
    /// ISO-like currency code for the user's wallets.
    #[serde(default)]
    pub currency: Option<String>,
    /// Floor the user's source wallet may not drop below.
    #[serde(default = "default_min_balance")]
    pub min_balance_threshold: Decimal,
}

fn default_min_balance() -> Decimal {
    DEFAULT_MIN_BALANCE
}
