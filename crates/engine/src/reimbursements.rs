//! Reimbursements: tracked debts for shared expenses paid outside the pool.
//!
//! Created atomically with their expense, settled explicitly, never
//! auto-expired. Settlement is a bookkeeping acknowledgment — it moves no
//! pool funds.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cents, EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reimbursement {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub amount: Cents,
    pub settled: bool,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Reimbursement {
    pub fn new(expense_id: Uuid, member_id: Uuid, amount: Cents) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            member_id,
            amount,
            settled: false,
            settled_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reimbursements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub member_id: String,
    pub amount_cents: i64,
    pub settled: bool,
    pub settled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Reimbursement> for ActiveModel {
    fn from(reimbursement: &Reimbursement) -> Self {
        Self {
            id: ActiveValue::Set(reimbursement.id.to_string()),
            expense_id: ActiveValue::Set(reimbursement.expense_id.to_string()),
            member_id: ActiveValue::Set(reimbursement.member_id.to_string()),
            amount_cents: ActiveValue::Set(reimbursement.amount.cents()),
            settled: ActiveValue::Set(reimbursement.settled),
            settled_at: ActiveValue::Set(reimbursement.settled_at),
        }
    }
}

impl TryFrom<Model> for Reimbursement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "reimbursement")?,
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            member_id: parse_uuid(&model.member_id, "member")?,
            amount: Cents::new(model.amount_cents),
            settled: model.settled,
            settled_at: model.settled_at,
        })
    }
}
