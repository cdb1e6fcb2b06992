//! Application configuration loaded from environment variables.
//!
//! - `REMIT_STORE_URL` — base URL of the record store (default
//!   `http://localhost:3004`)
//! - `REMIT_HTTP_TIMEOUT_MS` — per-call timeout for record store requests
//!   (default 5000)
//! - `REMIT_INTERNAL_FEE_RATE` / `REMIT_EXTERNAL_FEE_RATE` — decimal fee
//!   rates overriding the built-in 0.002 / 0.02 pair

use std::time::Duration;

use rust_decimal::Decimal;

use crate::engine::{EXTERNAL_FEE_RATE, INTERNAL_FEE_RATE};

/// Default record store endpoint (json-server style mock backend).
const DEFAULT_STORE_URL: &str = "http://localhost:3004";

/// Default per-call timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub fees: FeeConfig,
}

/// Record store connection settings.
#[derive(Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Service-charge rates applied by the transfer engine.
#[derive(Debug, Clone, Copy)]
pub struct FeeConfig {
    pub internal_rate: Decimal,
    pub external_rate: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            internal_rate: INTERNAL_FEE_RATE,
            external_rate: EXTERNAL_FEE_RATE,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`RemitError::Config`](crate::RemitError::Config) when the
/// timeout or a fee rate is set but not parseable, or a fee rate is
/// negative.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url =
        non_empty_var("REMIT_STORE_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_string());

    let timeout_ms = match non_empty_var("REMIT_HTTP_TIMEOUT_MS") {
        Some(raw) => raw.parse::<u64>().map_err(|e| {
            crate::RemitError::Config(format!("invalid REMIT_HTTP_TIMEOUT_MS: {e}"))
        })?,
        None => DEFAULT_TIMEOUT_MS,
    };

    let fees = FeeConfig {
        internal_rate: fee_rate_var("REMIT_INTERNAL_FEE_RATE", INTERNAL_FEE_RATE)?,
        external_rate: fee_rate_var("REMIT_EXTERNAL_FEE_RATE", EXTERNAL_FEE_RATE)?,
    };

    Ok(AppConfig {
        store: StoreConfig {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
        },
        fees,
    })
}

/// Parses a fee-rate variable, falling back to `default` when unset.
fn fee_rate_var(name: &str, default: Decimal) -> crate::Result<Decimal> {
    let Some(raw) = non_empty_var(name) else {
        return Ok(default);
    };
    let rate: Decimal = raw
        .parse()
        .map_err(|e| crate::RemitError::Config(format!("invalid {name}: {e}")))?;
    if rate.is_sign_negative() {
        return Err(crate::RemitError::Config(format!(
            "{name} must not be negative: {rate}"
        )));
    }
    Ok(rate)
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
