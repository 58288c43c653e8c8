//! Bank aggregation provider boundary.
//!
//! The engine never talks to a bank API directly; it goes through
//! [`BankProvider`], which the binary wires to a concrete aggregator. Sync
//! and linking logic in the ops layer only sees the normalized types here.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Cents, Currency, ResultEngine};

/// A bank the provider can connect to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub country: String,
}

/// Inputs to start an end-user authorization with an institution.
#[derive(Clone, Debug)]
pub struct AuthorizationParams {
    pub institution_id: String,
    /// Where the aggregator redirects the user after consent.
    pub redirect_url: String,
}

/// An authorization in flight at the aggregator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStart {
    /// Aggregator-side session to poll or finalize later.
    pub provider_session_id: String,
    /// URL the end user must visit to grant consent.
    pub consent_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_ref: String,
    pub amount: Cents,
    pub currency: Currency,
}

/// One transaction as reported by the aggregator, already normalized.
///
/// `(external_id, account_id)` is the dedup key the sync loop relies on;
/// providers must keep `external_id` stable across fetches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankTransactionRecord {
    pub external_id: String,
    pub account_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Cents,
    pub currency: Currency,
}

/// A page of transactions; `next_page_token` is `None` on the last page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<BankTransactionRecord>,
    pub next_page_token: Option<String>,
}

/// Aggregator client the engine syncs through.
#[async_trait]
pub trait BankProvider: Send + Sync {
    async fn list_institutions(&self, country: &str) -> ResultEngine<Vec<Institution>>;

    async fn start_authorization(
        &self,
        params: AuthorizationParams,
    ) -> ResultEngine<AuthorizationStart>;

    async fn fetch_account_balance(&self, account_ref: &str) -> ResultEngine<AccountBalance>;

    /// Fetches one page of transactions for an account in a date range.
    /// `page_token` comes from the previous page, `None` for the first.
    async fn fetch_transactions(
        &self,
        account_ref: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        page_token: Option<&str>,
    ) -> ResultEngine<TransactionPage>;
}
