//! Passkey ceremony endpoints.
//!
//! Every handler that advances the session claims re-issues the signed
//! token; the client replaces its bearer token with the one in the
//! response.

use api_types::mfa::{
    AuthenticationFinish, AuthenticationStartResponse, MethodView, MethodsResponse,
    RegistrationFinish, RegistrationFinishResponse, RegistrationStartResponse,
};
use api_types::session::SessionResponse;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, token};
use engine::{MfaCredential, SessionClaims};

fn method_view(credential: MfaCredential) -> MethodView {
    MethodView {
        id: credential.id,
        credential_id: credential.credential_id,
        label: credential.label,
    }
}

pub async fn register_start(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
) -> Result<Json<RegistrationStartResponse>, ServerError> {
    let (registration, claims) = state
        .engine
        .start_passkey_registration(&claims, &state.rp_id)
        .await?;

    Ok(Json(RegistrationStartResponse {
        token: token::sign(&claims, &state.signing_key)?,
        challenge: registration.challenge,
        rp_id: registration.rp_id,
        user_id: registration.user_id,
        exclude_credential_ids: registration.exclude_credential_ids,
    }))
}

pub async fn register_finish(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<RegistrationFinish>,
) -> Result<Json<RegistrationFinishResponse>, ServerError> {
    let (credential, claims) = state
        .engine
        .finish_passkey_registration(
            &claims,
            state.passkeys.as_ref(),
            &payload.response_json,
            payload.label,
            Utc::now(),
        )
        .await?;

    Ok(Json(RegistrationFinishResponse {
        token: token::sign(&claims, &state.signing_key)?,
        method: method_view(credential),
    }))
}

pub async fn authenticate_start(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
) -> Result<Json<AuthenticationStartResponse>, ServerError> {
    let (authentication, claims) = state
        .engine
        .start_passkey_authentication(&claims, &state.rp_id)
        .await?;

    Ok(Json(AuthenticationStartResponse {
        token: token::sign(&claims, &state.signing_key)?,
        challenge: authentication.challenge,
        rp_id: authentication.rp_id,
        allow_credential_ids: authentication.allow_credential_ids,
    }))
}

pub async fn authenticate_finish(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<AuthenticationFinish>,
) -> Result<Json<SessionResponse>, ServerError> {
    let claims = state
        .engine
        .finish_passkey_authentication(
            &claims,
            state.passkeys.as_ref(),
            &payload.credential_id,
            &payload.response_json,
            Utc::now(),
        )
        .await?;

    Ok(Json(token::session_response(&claims, &state.signing_key)?))
}

pub async fn methods(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
) -> Result<Json<MethodsResponse>, ServerError> {
    let methods = state.engine.mfa_methods(&claims.sub).await?;
    Ok(Json(MethodsResponse {
        methods: methods.into_iter().map(method_view).collect(),
    }))
}

pub async fn remove_method(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_mfa_method(&claims.sub, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
