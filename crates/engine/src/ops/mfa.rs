//! Passkey enrollment and the two-tier verification ceremonies.
//!
//! Challenges are generated here and carried between start and finish in
//! the session claims; the cryptographic verification itself is delegated
//! to the [`PasskeyVerifier`] collaborator.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MfaCredential, ResultEngine, SessionClaims, credentials,
    passkeys::{AuthenticationChallenge, PasskeyVerifier, RegistrationChallenge},
};

use super::{Engine, with_tx};

fn new_challenge() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

impl Engine {
    /// Starts a passkey registration ceremony.
    ///
    /// The challenge excludes the user's already-registered credential ids
    /// and is stored in the returned claims until the finish call.
    pub async fn start_passkey_registration(
        &self,
        claims: &SessionClaims,
        rp_id: &str,
    ) -> ResultEngine<(RegistrationChallenge, SessionClaims)> {
        let existing = self
            .active_credentials(&self.database, &claims.sub)
            .await?;
        let challenge = new_challenge();
        let registration = RegistrationChallenge {
            challenge: challenge.clone(),
            rp_id: rp_id.to_string(),
            user_id: claims.sub.clone(),
            exclude_credential_ids: existing.iter().map(|c| c.credential_id.clone()).collect(),
        };
        let claims = claims.clone().with_pending_challenge(Some(challenge));
        Ok((registration, claims))
    }

    /// Verifies a registration response and persists the new credential.
    pub async fn finish_passkey_registration(
        &self,
        claims: &SessionClaims,
        verifier: &dyn PasskeyVerifier,
        response_json: &str,
        label: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<(MfaCredential, SessionClaims)> {
        let mut claims = claims.clone();
        let challenge = claims.take_pending_challenge()?;
        let verification = verifier.verify_registration(&challenge, response_json)?;
        if !verification.verified {
            return Err(EngineError::Unauthorized(
                "passkey registration rejected".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let duplicate = credentials::Entity::find()
                .filter(credentials::Column::UserId.eq(claims.sub.clone()))
                .filter(credentials::Column::CredentialId.eq(verification.credential_id.clone()))
                .filter(credentials::Column::IsActive.eq(true))
                .one(&db_tx)
                .await?
                .is_some();
            if duplicate {
                return Err(EngineError::Validation(
                    "credential is already registered".to_string(),
                ));
            }

            let credential = MfaCredential {
                id: Uuid::new_v4(),
                user_id: claims.sub.clone(),
                credential_id: verification.credential_id.clone(),
                public_key: verification.public_key.clone(),
                sign_count: verification.sign_count,
                label,
                is_active: true,
                created_at: now,
            };
            credentials::ActiveModel::from(&credential)
                .insert(&db_tx)
                .await?;
            Ok((credential, claims))
        })
    }

    /// Starts a passkey authentication ceremony.
    ///
    /// Enrollment is mandatory: a user with no active credential cannot
    /// start one.
    pub async fn start_passkey_authentication(
        &self,
        claims: &SessionClaims,
        rp_id: &str,
    ) -> ResultEngine<(AuthenticationChallenge, SessionClaims)> {
        let existing = self
            .active_credentials(&self.database, &claims.sub)
            .await?;
        if existing.is_empty() {
            return Err(EngineError::Validation(
                "no passkey enrolled for this user".to_string(),
            ));
        }
        let challenge = new_challenge();
        let authentication = AuthenticationChallenge {
            challenge: challenge.clone(),
            rp_id: rp_id.to_string(),
            allow_credential_ids: existing.iter().map(|c| c.credential_id.clone()).collect(),
        };
        let claims = claims.clone().with_pending_challenge(Some(challenge));
        Ok((authentication, claims))
    }

    /// Verifies an assertion and advances the session claims.
    ///
    /// A failed verification or a signature-counter regression leaves the
    /// claims untouched. On success the stored counter is updated and the
    /// session advances: first success verifies the session's MFA tier,
    /// subsequent successes re-arm the bank-operation window.
    pub async fn finish_passkey_authentication(
        &self,
        claims: &SessionClaims,
        verifier: &dyn PasskeyVerifier,
        credential_id: &str,
        response_json: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<SessionClaims> {
        let mut claims = claims.clone();
        let challenge = claims.take_pending_challenge()?;

        with_tx!(self, |db_tx| {
            let model = credentials::Entity::find()
                .filter(credentials::Column::UserId.eq(claims.sub.clone()))
                .filter(credentials::Column::CredentialId.eq(credential_id.to_string()))
                .filter(credentials::Column::IsActive.eq(true))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("credential".to_string()))?;
            let credential = MfaCredential::try_from(model)?;

            let verification =
                verifier.verify_authentication(&challenge, response_json, &credential.stored())?;
            if !verification.verified {
                return Err(EngineError::Unauthorized(
                    "passkey assertion rejected".to_string(),
                ));
            }
            // Counter must advance strictly; a regression suggests a cloned
            // authenticator.
            if verification.new_sign_count <= credential.sign_count {
                return Err(EngineError::Unauthorized(
                    "authenticator signature counter regression".to_string(),
                ));
            }

            let update = credentials::ActiveModel {
                id: ActiveValue::Set(credential.id.to_string()),
                sign_count: ActiveValue::Set(verification.new_sign_count),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            let advanced = if claims.mfa_verified {
                claims.with_bank_step_up(now)
            } else {
                claims.with_mfa_verified()
            };
            Ok(advanced)
        })
    }

    pub async fn mfa_methods(&self, user: &str) -> ResultEngine<Vec<MfaCredential>> {
        self.active_credentials(&self.database, user).await
    }

    /// Soft-deactivates an MFA method, refusing to remove the last one.
    pub async fn delete_mfa_method(&self, user: &str, credential_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let active = self.active_credentials(&db_tx, user).await?;
            let target = active
                .iter()
                .find(|c| c.id == credential_id)
                .ok_or_else(|| EngineError::NotFound("credential".to_string()))?;
            if active.len() <= 1 {
                return Err(EngineError::Validation(
                    "cannot remove the last active MFA method".to_string(),
                ));
            }

            let update = credentials::ActiveModel {
                id: ActiveValue::Set(target.id.to_string()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(())
        })
    }

    async fn active_credentials<C: ConnectionTrait>(
        &self,
        db: &C,
        user: &str,
    ) -> ResultEngine<Vec<MfaCredential>> {
        credentials::Entity::find()
            .filter(credentials::Column::UserId.eq(user.to_string()))
            .filter(credentials::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(MfaCredential::try_from)
            .collect()
    }
}
