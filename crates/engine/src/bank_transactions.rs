//! Imported bank transactions.
//!
//! Normalized records produced by an aggregator sync. The pair
//! (external_id, account_id) is the dedup key: a transaction already seen
//! for the same account is never inserted twice.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Cents, Currency, EngineError, bank::BankTransactionRecord,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: Uuid,
    pub household_id: String,
    pub connection_id: Uuid,
    pub external_id: String,
    pub account_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Cents,
    pub currency: Currency,
    pub linked_to_expense: bool,
}

impl BankTransaction {
    pub fn from_record(
        household_id: String,
        connection_id: Uuid,
        record: &BankTransactionRecord,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            household_id,
            connection_id,
            external_id: record.external_id.clone(),
            account_id: record.account_id.clone(),
            date: record.date,
            description: record.description.clone(),
            amount: record.amount,
            currency: record.currency,
            linked_to_expense: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub connection_id: String,
    pub external_id: String,
    pub account_id: String,
    pub date: Date,
    pub description: String,
    pub amount_cents: i64,
    pub currency: String,
    pub linked_to_expense: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_connections::Entity",
        from = "Column::ConnectionId",
        to = "super::bank_connections::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Connections,
}

impl Related<super::bank_connections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Connections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankTransaction> for ActiveModel {
    fn from(tx: &BankTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            household_id: ActiveValue::Set(tx.household_id.clone()),
            connection_id: ActiveValue::Set(tx.connection_id.to_string()),
            external_id: ActiveValue::Set(tx.external_id.clone()),
            account_id: ActiveValue::Set(tx.account_id.clone()),
            date: ActiveValue::Set(tx.date),
            description: ActiveValue::Set(tx.description.clone()),
            amount_cents: ActiveValue::Set(tx.amount.cents()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            linked_to_expense: ActiveValue::Set(tx.linked_to_expense),
        }
    }
}

impl TryFrom<Model> for BankTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "bank transaction")?,
            household_id: model.household_id,
            connection_id: parse_uuid(&model.connection_id, "bank connection")?,
            external_id: model.external_id,
            account_id: model.account_id,
            date: model.date,
            description: model.description,
            amount: Cents::new(model.amount_cents),
            currency: model_currency(&model.currency)?,
            linked_to_expense: model.linked_to_expense,
        })
    }
}
