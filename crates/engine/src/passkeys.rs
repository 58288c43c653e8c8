//! Passkey (WebAuthn) verifier boundary.
//!
//! The engine treats attestation and assertion verification as opaque: it
//! hands the verifier the challenge, the client payload and the stored
//! credential material, and gets back a verdict plus the updated counter.
//! Challenge bookkeeping and counter-regression policy stay in the engine.

use serde::{Deserialize, Serialize};

use crate::ResultEngine;

/// Credential material persisted per enrollment, as the verifier needs it
/// back. `credential_id` and `public_key` are base64url.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub credential_id: String,
    pub public_key: String,
    pub sign_count: i64,
}

/// Options for a registration ceremony, sent to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationChallenge {
    pub challenge: String,
    pub rp_id: String,
    pub user_id: String,
    /// Credential ids already enrolled, so the authenticator refuses to
    /// re-register one of them.
    pub exclude_credential_ids: Vec<String>,
}

/// Options for an authentication ceremony, sent to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationChallenge {
    pub challenge: String,
    pub rp_id: String,
    pub allow_credential_ids: Vec<String>,
}

/// Outcome of verifying a registration response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedRegistration {
    pub verified: bool,
    pub credential_id: String,
    pub public_key: String,
    pub sign_count: i64,
}

/// Outcome of verifying an authentication response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedAuthentication {
    pub verified: bool,
    /// Authenticator-reported counter; the engine rejects regressions.
    pub new_sign_count: i64,
}

/// Cryptographic verification of ceremony responses.
///
/// Implementations must not mutate stored state; persistence of the new
/// counter is the engine's job after its own checks pass.
pub trait PasskeyVerifier: Send + Sync {
    fn verify_registration(
        &self,
        challenge: &str,
        response_json: &str,
    ) -> ResultEngine<VerifiedRegistration>;

    fn verify_authentication(
        &self,
        challenge: &str,
        response_json: &str,
        credential: &StoredCredential,
    ) -> ResultEngine<VerifiedAuthentication>;
}
