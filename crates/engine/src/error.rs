//! The module contains the errors the engine can throw.
//!
//! The taxonomy mirrors how failures surface to callers:
//!
//! - [`Validation`] for missing or malformed input (never retried),
//! - [`NotFound`] for absent referenced entities,
//! - [`SplitMismatch`] when custom splits do not sum to the expense total,
//! - [`Consistency`] when a multi-row write would be left partial,
//! - [`BankMfaRequired`] / [`BankMfaExpired`] for the step-up gate, both
//!   retryable after a fresh passkey ceremony.
//!
//! [`Validation`]: EngineError::Validation
//! [`NotFound`]: EngineError::NotFound
//! [`SplitMismatch`]: EngineError::SplitMismatch
//! [`Consistency`]: EngineError::Consistency
//! [`BankMfaRequired`]: EngineError::BankMfaRequired
//! [`BankMfaExpired`]: EngineError::BankMfaExpired
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Split mismatch: {0}")]
    SplitMismatch(String),
    #[error("Consistency violation: {0}")]
    Consistency(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("bank operation requires step-up verification")]
    BankMfaRequired,
    #[error("bank operation step-up verification expired")]
    BankMfaExpired,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Machine-readable code for authorization failures, used by callers to
    /// re-drive the step-up ceremony.
    pub fn authorization_code(&self) -> Option<&'static str> {
        match self {
            Self::BankMfaRequired => Some("BANK_MFA_REQUIRED"),
            Self::BankMfaExpired => Some("BANK_MFA_EXPIRED"),
            _ => None,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::SplitMismatch(a), Self::SplitMismatch(b)) => a == b,
            (Self::Consistency(a), Self::Consistency(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::BankMfaRequired, Self::BankMfaRequired) => true,
            (Self::BankMfaExpired, Self::BankMfaExpired) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
