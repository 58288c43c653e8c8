//! Registered passkey (WebAuthn) credentials.
//!
//! The engine stores only the opaque material the verifier needs back:
//! credential id, public key (both base64url) and the signature counter.
//! Counters must be strictly increasing; a regression is treated as
//! intrusion suspicion and fails the ceremony.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, passkeys::StoredCredential, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MfaCredential {
    pub id: Uuid,
    pub user_id: String,
    pub credential_id: String,
    pub public_key: String,
    pub sign_count: i64,
    pub label: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MfaCredential {
    pub fn stored(&self) -> StoredCredential {
        StoredCredential {
            credential_id: self.credential_id.clone(),
            public_key: self.public_key.clone(),
            sign_count: self.sign_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mfa_credentials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub credential_id: String,
    pub public_key: String,
    pub sign_count: i64,
    pub label: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MfaCredential> for ActiveModel {
    fn from(credential: &MfaCredential) -> Self {
        Self {
            id: ActiveValue::Set(credential.id.to_string()),
            user_id: ActiveValue::Set(credential.user_id.clone()),
            credential_id: ActiveValue::Set(credential.credential_id.clone()),
            public_key: ActiveValue::Set(credential.public_key.clone()),
            sign_count: ActiveValue::Set(credential.sign_count),
            label: ActiveValue::Set(credential.label.clone()),
            is_active: ActiveValue::Set(credential.is_active),
            created_at: ActiveValue::Set(credential.created_at),
        }
    }
}

impl TryFrom<Model> for MfaCredential {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "credential")?,
            user_id: model.user_id,
            credential_id: model.credential_id,
            public_key: model.public_key,
            sign_count: model.sign_count,
            label: model.label,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}
