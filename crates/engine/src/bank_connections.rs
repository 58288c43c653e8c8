//! Linked bank connections.
//!
//! A connection ties a household to one account at an aggregator (Plaid,
//! Enable Banking). Every operation that creates, removes or syncs a
//! connection sits behind the step-up authorization gate.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankConnection {
    pub id: Uuid,
    pub household_id: String,
    pub provider: String,
    pub institution_name: String,
    pub provider_session_id: String,
    pub account_ref: String,
    pub created_by: String,
}

impl BankConnection {
    pub fn new(
        household_id: String,
        provider: String,
        institution_name: String,
        provider_session_id: String,
        account_ref: String,
        created_by: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            household_id,
            provider,
            institution_name,
            provider_session_id,
            account_ref,
            created_by,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_connections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub provider: String,
    pub institution_name: String,
    pub provider_session_id: String,
    pub account_ref: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_transactions::Entity")]
    Transactions,
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankConnection> for ActiveModel {
    fn from(connection: &BankConnection) -> Self {
        Self {
            id: ActiveValue::Set(connection.id.to_string()),
            household_id: ActiveValue::Set(connection.household_id.clone()),
            provider: ActiveValue::Set(connection.provider.clone()),
            institution_name: ActiveValue::Set(connection.institution_name.clone()),
            provider_session_id: ActiveValue::Set(connection.provider_session_id.clone()),
            account_ref: ActiveValue::Set(connection.account_ref.clone()),
            created_by: ActiveValue::Set(connection.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for BankConnection {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "bank connection")?,
            household_id: model.household_id,
            provider: model.provider,
            institution_name: model.institution_name,
            provider_session_id: model.provider_session_id,
            account_ref: model.account_ref,
            created_by: model.created_by,
        })
    }
}
