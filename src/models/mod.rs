//! Typed records exchanged with the wallet record store.
//!
//! The backing store is a loosely-shaped JSON collection API; these
//! models pin the field names and types down at the boundary so malformed
//! records are rejected during deserialization instead of propagating
//! into the transfer engine.

pub mod transaction;
pub mod user;
pub mod wallet;

pub use transaction::{NewTransaction, Transaction, TransactionStatus, TransactionType};
pub use user::{KycStatus, User};
pub use wallet::Wallet;
