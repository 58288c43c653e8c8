//! First-factor login.
//!
//! Verifies Basic credentials against the users table and issues the signed
//! session token. MFA state starts unverified; the passkey ceremonies under
//! `/mfa` advance it.

use api_types::session::SessionResponse;
use axum::{Json, extract::State};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono::Utc;
use sea_orm::entity::prelude::*;

use crate::{ServerError, server::ServerState, token};
use engine::{EngineError, SessionClaims};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn login(
    State(state): State<ServerState>,
    auth_header: TypedHeader<Authorization<Basic>>,
) -> Result<Json<SessionResponse>, ServerError> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(EngineError::Unauthorized("missing credentials".to_string()).into());
    }

    let user = Entity::find()
        .filter(Column::Username.eq(auth_header.username()))
        .filter(Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(EngineError::from)?
        .ok_or_else(|| EngineError::Unauthorized("invalid credentials".to_string()))?;

    let claims = SessionClaims::new(user.username, Utc::now());
    Ok(Json(token::session_response(&claims, &state.signing_key)?))
}
