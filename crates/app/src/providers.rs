//! Placeholder collaborators for deployments without a configured bank
//! aggregator or WebAuthn verifier. Every call fails with a `Validation`
//! error naming the missing integration.

use async_trait::async_trait;
use engine::{
    AccountBalance, AuthorizationParams, AuthorizationStart, BankProvider,
    EngineError, Institution, PasskeyVerifier, StoredCredential, TransactionPage,
    VerifiedAuthentication, VerifiedRegistration,
};

fn unconfigured(what: &str) -> EngineError {
    EngineError::Validation(format!("{what} is not configured"))
}

pub struct UnconfiguredBank;

#[async_trait]
impl BankProvider for UnconfiguredBank {
    async fn list_institutions(&self, _country: &str) -> Result<Vec<Institution>, EngineError> {
        Err(unconfigured("bank provider"))
    }

    async fn start_authorization(
        &self,
        _params: AuthorizationParams,
    ) -> Result<AuthorizationStart, EngineError> {
        Err(unconfigured("bank provider"))
    }

    async fn fetch_account_balance(
        &self,
        _account_ref: &str,
    ) -> Result<AccountBalance, EngineError> {
        Err(unconfigured("bank provider"))
    }

    async fn fetch_transactions(
        &self,
        _account_ref: &str,
        _date_from: chrono::NaiveDate,
        _date_to: chrono::NaiveDate,
        _page_token: Option<&str>,
    ) -> Result<TransactionPage, EngineError> {
        Err(unconfigured("bank provider"))
    }
}

pub struct UnconfiguredPasskeys;

impl PasskeyVerifier for UnconfiguredPasskeys {
    fn verify_registration(
        &self,
        _challenge: &str,
        _response_json: &str,
    ) -> Result<VerifiedRegistration, EngineError> {
        Err(unconfigured("passkey verifier"))
    }

    fn verify_authentication(
        &self,
        _challenge: &str,
        _response_json: &str,
        _credential: &StoredCredential,
    ) -> Result<VerifiedAuthentication, EngineError> {
        Err(unconfigured("passkey verifier"))
    }
}
