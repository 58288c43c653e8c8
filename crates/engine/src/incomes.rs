//! Income records.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cents, EngineError, MonthKey, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub household_id: String,
    pub member_id: Uuid,
    pub date: NaiveDate,
    pub amount: Cents,
    pub income_type: String,
    /// Explicit override of the calendar month the income accrues to.
    pub allocated_to_month: Option<MonthKey>,
    pub created_by: String,
}

impl Income {
    pub fn new(
        household_id: String,
        member_id: Uuid,
        date: NaiveDate,
        amount: Cents,
        income_type: String,
        allocated_to_month: Option<MonthKey>,
        created_by: String,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "income amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            household_id,
            member_id,
            date,
            amount,
            income_type,
            allocated_to_month,
            created_by,
        })
    }

    /// The month this income accrues to: the explicit allocation month when
    /// present, otherwise the income's own calendar month.
    #[must_use]
    pub fn effective_month(&self) -> MonthKey {
        self.allocated_to_month
            .unwrap_or_else(|| MonthKey::from_date(self.date))
    }
}

/// Outcome of routing an income through the shared-pool engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncomeProcessed {
    pub income_id: Uuid,
    pub month: MonthKey,
    pub allowance_allocated: Cents,
    pub pool_contribution: Cents,
    pub pool_balance: Cents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub member_id: String,
    pub date: Date,
    pub amount_cents: i64,
    pub income_type: String,
    pub allocated_to_month: Option<String>,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Members,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Income> for ActiveModel {
    fn from(income: &Income) -> Self {
        Self {
            id: ActiveValue::Set(income.id.to_string()),
            household_id: ActiveValue::Set(income.household_id.clone()),
            member_id: ActiveValue::Set(income.member_id.to_string()),
            date: ActiveValue::Set(income.date),
            amount_cents: ActiveValue::Set(income.amount.cents()),
            income_type: ActiveValue::Set(income.income_type.clone()),
            allocated_to_month: ActiveValue::Set(
                income.allocated_to_month.map(|m| m.to_string()),
            ),
            created_by: ActiveValue::Set(income.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for Income {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "income")?,
            household_id: model.household_id,
            member_id: parse_uuid(&model.member_id, "member")?,
            date: model.date,
            amount: Cents::new(model.amount_cents),
            income_type: model.income_type,
            allocated_to_month: model
                .allocated_to_month
                .as_deref()
                .map(MonthKey::parse)
                .transpose()?,
            created_by: model.created_by,
        })
    }
}
