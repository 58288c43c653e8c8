//! Signed session tokens.
//!
//! A token is `base64url(claims json) . base64url(hmac-sha256 tag)`. The
//! claims are server-authoritative: any change (MFA tier, step-up window,
//! pending challenge) is a re-issuance, never a merge of client state.

use api_types::session::SessionResponse;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use engine::{EngineError, SessionClaims};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::ServerError;

type HmacSha256 = Hmac<Sha256>;

pub fn sign(claims: &SessionClaims, key: &[u8]) -> Result<String, ServerError> {
    let payload =
        serde_json::to_vec(claims).map_err(|err| ServerError::Generic(err.to_string()))?;
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|err| ServerError::Generic(err.to_string()))?;
    mac.update(&payload);
    let tag = mac.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(tag)
    ))
}

pub fn verify(token: &str, key: &[u8], now: DateTime<Utc>) -> Result<SessionClaims, ServerError> {
    let rejected =
        || ServerError::Engine(EngineError::Unauthorized("invalid session token".to_string()));

    let (payload, tag) = token.split_once('.').ok_or_else(rejected)?;
    let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| rejected())?;
    let tag = URL_SAFE_NO_PAD.decode(tag).map_err(|_| rejected())?;

    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|err| ServerError::Generic(err.to_string()))?;
    mac.update(&payload);
    mac.verify_slice(&tag).map_err(|_| rejected())?;

    let claims: SessionClaims = serde_json::from_slice(&payload).map_err(|_| rejected())?;
    if claims.is_expired(now) {
        return Err(ServerError::Engine(EngineError::Unauthorized(
            "session expired".to_string(),
        )));
    }

    Ok(claims)
}

/// Re-issues the token for the given claims and snapshots them for the
/// client.
pub fn session_response(
    claims: &SessionClaims,
    key: &[u8],
) -> Result<SessionResponse, ServerError> {
    Ok(SessionResponse {
        token: sign(claims, key)?,
        mfa_verified: claims.mfa_verified,
        bank_mfa_verified_at: claims.bank_mfa_verified_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const KEY: &[u8] = b"test-signing-key";

    #[test]
    fn round_trip() {
        let claims = SessionClaims::new("alice".to_string(), Utc::now()).with_mfa_verified();
        let token = sign(&claims, KEY).ok().unwrap();
        let decoded = verify(&token, KEY, Utc::now()).ok().unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let claims = SessionClaims::new("alice".to_string(), Utc::now());
        let token = sign(&claims, KEY).ok().unwrap();

        let evil = SessionClaims::new("alice".to_string(), Utc::now())
            .with_mfa_verified()
            .with_bank_step_up(Utc::now());
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&evil).unwrap());
        let tag = token.split_once('.').unwrap().1;
        let forged = format!("{forged_payload}.{tag}");

        assert!(verify(&forged, KEY, Utc::now()).is_err());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let claims = SessionClaims::new("alice".to_string(), Utc::now());
        let token = sign(&claims, KEY).ok().unwrap();
        assert!(verify(&token, b"other-key", Utc::now()).is_err());
    }

    #[test]
    fn expired_session_is_rejected() {
        let issued = Utc::now() - Duration::hours(13);
        let claims = SessionClaims::new("alice".to_string(), issued);
        let token = sign(&claims, KEY).ok().unwrap();
        assert!(verify(&token, KEY, Utc::now()).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify("not-a-token", KEY, Utc::now()).is_err());
        assert!(verify("a.b", KEY, Utc::now()).is_err());
    }
}
