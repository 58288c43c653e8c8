//! Expense splits (individual accounting mode only).
//!
//! One row per (expense, member). The amounts of all splits of an expense
//! sum to the expense amount exactly; the invariant is guaranteed by the
//! split calculator and enforced again at write time.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cents, EngineError, split::SplitShare, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub amount: Cents,
    pub paid: bool,
}

impl ExpenseSplit {
    pub fn from_share(expense_id: Uuid, share: &SplitShare) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            member_id: share.member_id,
            amount: share.amount,
            paid: share.paid,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub member_id: String,
    pub amount_cents: i64,
    pub paid: bool,
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

impl From<&ExpenseSplit> for ActiveModel {
    fn from(split: &ExpenseSplit) -> Self {
        Self {
            id: ActiveValue::Set(split.id.to_string()),
            expense_id: ActiveValue::Set(split.expense_id.to_string()),
            member_id: ActiveValue::Set(split.member_id.to_string()),
            amount_cents: ActiveValue::Set(split.amount.cents()),
            paid: ActiveValue::Set(split.paid),
        }
    }
}

impl TryFrom<Model> for ExpenseSplit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "split")?,
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            member_id: parse_uuid(&model.member_id, "member")?,
            amount: Cents::new(model.amount_cents),
            paid: model.paid,
        })
    }
}
