//! Wallet (account) records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single wallet holding a balance in one currency.
///
/// Balances are only ever mutated through the record store's conditional
/// delta operation; the engine treats a loaded `Wallet` as a snapshot
/// whose `balance` doubles as the optimistic-concurrency precondition for
/// the next write.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    /// Id of the owning user.
    pub owner_id: String,
    /// Human-readable account number or name.
    #[serde(default)]
    pub display_label: String,
    /// Current balance, never negative.
    pub balance: Decimal,
    /// ISO-like currency code. Both wallets of a transfer must match.
    pub currency: String,
}
