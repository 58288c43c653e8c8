//! Session claims and the step-up authorization gate.
//!
//! The claims travel in a server-signed token; nothing here is persisted.
//! Every check is re-derivable from the claims plus a wall-clock timestamp,
//! so no cross-request state or locking exists for MFA checks.
//!
//! Two tiers:
//! - `mfa_verified` — set once per session by a successful passkey
//!   ceremony, required before anything bank-adjacent.
//! - `bank_mfa_verified_at` — re-armed by a passkey re-authentication while
//!   already verified; valid for [`BANK_MFA_WINDOW_MS`], then the gate
//!   fails closed until the ceremony is repeated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Validity window of a bank-operation step-up, in milliseconds.
pub const BANK_MFA_WINDOW_MS: i64 = 15 * 60 * 1000;

/// Default session lifetime.
pub const SESSION_TTL_HOURS: i64 = 12;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username the session was issued to.
    pub sub: String,
    /// True once a passkey ceremony succeeded in this session.
    pub mfa_verified: bool,
    /// Epoch milliseconds of the last bank-operation step-up.
    pub bank_mfa_verified_at: Option<i64>,
    /// Challenge issued by a ceremony start, consumed by its finish.
    pub pending_mfa_challenge: Option<String>,
    /// Issued-at, epoch milliseconds.
    pub iat: i64,
    /// Expiry, epoch milliseconds.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(sub: String, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp_millis();
        Self {
            sub,
            mfa_verified: false,
            bank_mfa_verified_at: None,
            pending_mfa_challenge: None,
            iat,
            exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp_millis(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.exp
    }

    /// Gate check for bank-connection-mutating and sync operations.
    ///
    /// Fails closed: no verified MFA or no step-up timestamp →
    /// [`EngineError::BankMfaRequired`]; a stale timestamp →
    /// [`EngineError::BankMfaExpired`]. Both are retryable after the caller
    /// re-drives the step-up ceremony.
    pub fn check_bank_operation(&self, now: DateTime<Utc>) -> ResultEngine<()> {
        if !self.mfa_verified {
            return Err(EngineError::BankMfaRequired);
        }
        let Some(verified_at) = self.bank_mfa_verified_at else {
            return Err(EngineError::BankMfaRequired);
        };
        if now.timestamp_millis() - verified_at >= BANK_MFA_WINDOW_MS {
            return Err(EngineError::BankMfaExpired);
        }
        Ok(())
    }

    /// Marks the first MFA tier verified for the rest of the session.
    #[must_use]
    pub fn with_mfa_verified(mut self) -> Self {
        self.mfa_verified = true;
        self
    }

    /// Re-arms the bank-operation window. Only meaningful once
    /// `mfa_verified` is true; the MFA ops refuse to call it otherwise.
    #[must_use]
    pub fn with_bank_step_up(mut self, now: DateTime<Utc>) -> Self {
        self.bank_mfa_verified_at = Some(now.timestamp_millis());
        self
    }

    /// Stores (or clears) the challenge between ceremony start and finish.
    #[must_use]
    pub fn with_pending_challenge(mut self, challenge: Option<String>) -> Self {
        self.pending_mfa_challenge = challenge;
        self
    }

    /// Takes the pending challenge, failing when no ceremony was started.
    pub fn take_pending_challenge(&mut self) -> ResultEngine<String> {
        self.pending_mfa_challenge
            .take()
            .ok_or_else(|| EngineError::Unauthorized("no pending MFA ceremony".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> SessionClaims {
        SessionClaims::new("alice".to_string(), Utc::now())
    }

    #[test]
    fn bank_check_requires_mfa_first() {
        let now = Utc::now();
        assert_eq!(
            claims().check_bank_operation(now),
            Err(EngineError::BankMfaRequired)
        );
    }

    #[test]
    fn bank_check_requires_step_up_timestamp() {
        let now = Utc::now();
        let verified = claims().with_mfa_verified();
        assert_eq!(
            verified.check_bank_operation(now),
            Err(EngineError::BankMfaRequired)
        );
    }

    #[test]
    fn bank_check_passes_within_window() {
        let now = Utc::now();
        let armed = claims()
            .with_mfa_verified()
            .with_bank_step_up(now - Duration::minutes(5));
        assert_eq!(armed.check_bank_operation(now), Ok(()));
    }

    #[test]
    fn bank_check_expires_after_window() {
        let now = Utc::now();
        let stale = claims()
            .with_mfa_verified()
            .with_bank_step_up(now - Duration::minutes(20));
        assert_eq!(
            stale.check_bank_operation(now),
            Err(EngineError::BankMfaExpired)
        );
    }

    #[test]
    fn pending_challenge_is_single_use() {
        let mut started = claims().with_pending_challenge(Some("challenge-1".to_string()));
        assert_eq!(started.take_pending_challenge().unwrap(), "challenge-1");
        assert!(started.take_pending_challenge().is_err());
    }

    #[test]
    fn session_expiry() {
        let now = Utc::now();
        let session = SessionClaims::new("alice".to_string(), now);
        assert!(!session.is_expired(now + Duration::hours(1)));
        assert!(session.is_expired(now + Duration::hours(13)));
    }
}
