//! HTTP-backed record store client.
//!
//! Wraps the wallet application's mock REST backend (a generic JSON
//! record collection):
//!
//! - `GET /users/{id}`
//! - `GET /wallets/{id}`, `GET /wallets?userId={id}`
//! - `PATCH /wallets/{id}` with `{ balance, expectedBalance }`
//! - `POST /transactions`, `GET /transactions?fromWallet=...`
//!
//! Balance writes carry the expected previous balance so the backend can
//! reject a stale update with `409 Conflict`; an unconditional
//! read-then-patch would let two concurrent debits both pass their
//! funds check and both apply. Every call is bounded by the configured
//! timeout, and transport failures surface as
//! [`RemitError::DependencyUnavailable`].

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::models::{NewTransaction, Transaction, User, Wallet};
use crate::{RemitError, Result};

/// Client for the remote record collection API.
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: String,
}

/// Conditional balance update body for `PATCH /wallets/{id}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BalancePatch {
    balance: Decimal,
    expected_balance: Decimal,
}

impl HttpRecordStore {
    /// Builds a client bound to the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::Config`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemitError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches a single record, mapping 404 to `None`.
    async fn get_optional<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.client.get(self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = unexpected_status(response, path)?;
        Ok(Some(response.json().await?))
    }

    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = unexpected_status(response, path)?;
        Ok(response.json().await?)
    }
}

/// Maps any non-success status to `DependencyUnavailable`.
fn unexpected_status(response: reqwest::Response, path: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(RemitError::DependencyUnavailable(format!(
            "{path} returned {status}"
        )));
    }
    Ok(response)
}

#[async_trait]
impl super::RecordStore for HttpRecordStore {
    async fn user(&self, user_id: &str) -> Result<Option<User>> {
        self.get_optional(&format!("/users/{user_id}")).await
    }

    async fn wallet(&self, wallet_id: &str) -> Result<Option<Wallet>> {
        self.get_optional(&format!("/wallets/{wallet_id}")).await
    }

    async fn wallets_for_user(&self, user_id: &str) -> Result<Vec<Wallet>> {
        self.get_list(&format!("/wallets?userId={user_id}")).await
    }

    async fn apply_delta(
        &self,
        wallet_id: &str,
        expected_balance: Decimal,
        delta: Decimal,
    ) -> Result<Wallet> {
        let new_balance = expected_balance + delta;
        if new_balance < Decimal::ZERO {
            return Err(RemitError::NegativeBalance);
        }

        let path = format!("/wallets/{wallet_id}");
        let response = self
            .client
            .patch(self.url(&path))
            .json(&BalancePatch {
                balance: new_balance,
                expected_balance,
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RemitError::WalletNotFound(wallet_id.to_string())),
            // Either spelling of a failed precondition means a lost race.
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Err(RemitError::BalanceConflict)
            }
            _ => {
                let response = unexpected_status(response, &path)?;
                debug!(wallet = wallet_id, %delta, balance = %new_balance, "applied delta");
                Ok(response.json().await?)
            }
        }
    }

    async fn append_transaction(&self, tx: NewTransaction) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let record = tx.into_record(id);
        let response = self
            .client
            .post(self.url("/transactions"))
            .json(&record)
            .send()
            .await?;
        unexpected_status(response, "/transactions")?;
        debug!(transaction = %id, "appended transaction");
        Ok(id)
    }

    async fn transactions_for_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        let mut outgoing: Vec<Transaction> = self
            .get_list(&format!("/transactions?fromWallet={wallet_id}"))
            .await?;
        let incoming: Vec<Transaction> = self
            .get_list(&format!("/transactions?toWallet={wallet_id}"))
            .await?;
        outgoing.extend(incoming);
        Ok(outgoing)
    }
}
