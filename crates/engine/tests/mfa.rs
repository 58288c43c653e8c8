use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, Statement};

use engine::{
    Engine, EngineError, PasskeyVerifier, SessionClaims, StoredCredential,
    VerifiedAuthentication, VerifiedRegistration,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

/// Verifier stub: accepts everything and reports a fixed credential id and
/// counter.
struct StubVerifier {
    credential_id: String,
    new_sign_count: i64,
    verified: bool,
}

impl StubVerifier {
    fn accepting(credential_id: &str, new_sign_count: i64) -> Self {
        Self {
            credential_id: credential_id.to_string(),
            new_sign_count,
            verified: true,
        }
    }

    fn rejecting() -> Self {
        Self {
            credential_id: "unused".to_string(),
            new_sign_count: 0,
            verified: false,
        }
    }
}

impl PasskeyVerifier for StubVerifier {
    fn verify_registration(
        &self,
        _challenge: &str,
        _response_json: &str,
    ) -> Result<VerifiedRegistration, EngineError> {
        Ok(VerifiedRegistration {
            verified: self.verified,
            credential_id: self.credential_id.clone(),
            public_key: "pk".to_string(),
            sign_count: 0,
        })
    }

    fn verify_authentication(
        &self,
        _challenge: &str,
        _response_json: &str,
        _credential: &StoredCredential,
    ) -> Result<VerifiedAuthentication, EngineError> {
        Ok(VerifiedAuthentication {
            verified: self.verified,
            new_sign_count: self.new_sign_count,
        })
    }
}

async fn register(engine: &Engine, claims: &SessionClaims, credential_id: &str) -> SessionClaims {
    let (_, claims) = engine
        .start_passkey_registration(claims, "cassa.local")
        .await
        .unwrap();
    let verifier = StubVerifier::accepting(credential_id, 0);
    let (_, claims) = engine
        .finish_passkey_registration(&claims, &verifier, "{}", None, Utc::now())
        .await
        .unwrap();
    claims
}

async fn authenticate(
    engine: &Engine,
    claims: &SessionClaims,
    credential_id: &str,
    new_sign_count: i64,
) -> Result<SessionClaims, EngineError> {
    let (_, claims) = engine
        .start_passkey_authentication(claims, "cassa.local")
        .await?;
    let verifier = StubVerifier::accepting(credential_id, new_sign_count);
    engine
        .finish_passkey_authentication(&claims, &verifier, credential_id, "{}", Utc::now())
        .await
}

#[tokio::test]
async fn first_authentication_verifies_then_second_arms_bank_window() {
    let engine = engine_with_db().await;
    let claims = SessionClaims::new("alice".to_string(), Utc::now());
    let claims = register(&engine, &claims, "cred-1").await;
    assert!(!claims.mfa_verified, "registration alone does not verify");

    let claims = authenticate(&engine, &claims, "cred-1", 1).await.unwrap();
    assert!(claims.mfa_verified);
    assert!(claims.bank_mfa_verified_at.is_none());
    assert_eq!(
        claims.check_bank_operation(Utc::now()),
        Err(EngineError::BankMfaRequired)
    );

    let claims = authenticate(&engine, &claims, "cred-1", 2).await.unwrap();
    assert!(claims.bank_mfa_verified_at.is_some());
    assert_eq!(claims.check_bank_operation(Utc::now()), Ok(()));
}

#[tokio::test]
async fn counter_regression_is_refused() {
    let engine = engine_with_db().await;
    let claims = SessionClaims::new("alice".to_string(), Utc::now());
    let claims = register(&engine, &claims, "cred-1").await;
    let claims = authenticate(&engine, &claims, "cred-1", 5).await.unwrap();

    // 5 again: not strictly greater than the stored counter.
    let err = authenticate(&engine, &claims, "cred-1", 5).await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let methods = engine.mfa_methods("alice").await.unwrap();
    assert_eq!(methods[0].sign_count, 5, "stored counter untouched");
}

#[tokio::test]
async fn rejected_assertion_does_not_advance_claims() {
    let engine = engine_with_db().await;
    let claims = SessionClaims::new("alice".to_string(), Utc::now());
    let claims = register(&engine, &claims, "cred-1").await;

    let (_, started) = engine
        .start_passkey_authentication(&claims, "cassa.local")
        .await
        .unwrap();
    let err = engine
        .finish_passkey_authentication(&started, &StubVerifier::rejecting(), "cred-1", "{}", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn authentication_requires_enrollment() {
    let engine = engine_with_db().await;
    let claims = SessionClaims::new("alice".to_string(), Utc::now());

    let err = engine
        .start_passkey_authentication(&claims, "cassa.local")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn finish_without_start_is_unauthorized() {
    let engine = engine_with_db().await;
    let claims = SessionClaims::new("alice".to_string(), Utc::now());
    let claims = register(&engine, &claims, "cred-1").await;

    let err = engine
        .finish_passkey_authentication(
            &claims,
            &StubVerifier::accepting("cred-1", 1),
            "cred-1",
            "{}",
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn duplicate_credential_registration_is_refused() {
    let engine = engine_with_db().await;
    let claims = SessionClaims::new("alice".to_string(), Utc::now());
    let claims = register(&engine, &claims, "cred-1").await;

    let (_, started) = engine
        .start_passkey_registration(&claims, "cassa.local")
        .await
        .unwrap();
    let err = engine
        .finish_passkey_registration(
            &started,
            &StubVerifier::accepting("cred-1", 0),
            "{}",
            None,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn the_last_active_method_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let claims = SessionClaims::new("alice".to_string(), Utc::now());
    let claims = register(&engine, &claims, "cred-1").await;

    let methods = engine.mfa_methods("alice").await.unwrap();
    let err = engine
        .delete_mfa_method("alice", methods[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    register(&engine, &claims, "cred-2").await;
    let methods = engine.mfa_methods("alice").await.unwrap();
    assert_eq!(methods.len(), 2);
    engine
        .delete_mfa_method("alice", methods[0].id)
        .await
        .unwrap();
    assert_eq!(engine.mfa_methods("alice").await.unwrap().len(), 1);
}
