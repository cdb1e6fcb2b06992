//! Transfer and ledger mutation core for a demo wallet application.
//!
//! Provides typed models, an authorization gate, a record-store
//! abstraction (in-memory and HTTP-backed), and the transfer engine that
//! validates requests, computes service charges, applies balance deltas,
//! and appends transaction records.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod timefmt;

pub use error::{RemitError, Result};
