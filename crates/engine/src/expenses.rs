//! Expense records.
//!
//! An expense is always owned by a household and paid by a member. In
//! shared-pool mode it additionally tracks whether it was funded from the
//! pool and whether the payer is owed a reimbursement
//! (`needs_reimbursement` is derived: shared ∧ ¬paid_from_pool).

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Cents, Currency, EngineError, ResultEngine, splits::ExpenseSplit,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    Personal,
    Shared,
}

impl ExpenseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Shared => "shared",
        }
    }
}

impl TryFrom<&str> for ExpenseType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "personal" => Ok(Self::Personal),
            "shared" => Ok(Self::Shared),
            other => Err(EngineError::Validation(format!(
                "invalid expense type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub household_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub category_id: Uuid,
    pub amount: Cents,
    pub currency: Currency,
    pub paid_by: Uuid,
    pub expense_type: ExpenseType,
    pub paid: bool,
    pub paid_from_pool: bool,
    pub needs_reimbursement: bool,
    pub created_by: String,
}

impl Expense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        household_id: String,
        date: NaiveDate,
        description: String,
        category_id: Uuid,
        amount: Cents,
        currency: Currency,
        paid_by: Uuid,
        expense_type: ExpenseType,
        paid_from_pool: bool,
        created_by: String,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "expense amount must be > 0".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(EngineError::Validation(
                "expense description must not be empty".to_string(),
            ));
        }
        let needs_reimbursement = expense_type == ExpenseType::Shared && !paid_from_pool;
        Ok(Self {
            id: Uuid::new_v4(),
            household_id,
            date,
            description,
            category_id,
            amount,
            currency,
            paid_by,
            expense_type,
            paid: false,
            paid_from_pool,
            needs_reimbursement,
            created_by,
        })
    }
}

/// An expense joined with its splits, as returned by the individual engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseWithSplits {
    pub expense: Expense,
    pub splits: Vec<ExpenseSplit>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub date: Date,
    pub description: String,
    pub category_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub paid_by: String,
    pub expense_type: String,
    pub paid: bool,
    pub paid_from_pool: bool,
    pub needs_reimbursement: bool,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
    #[sea_orm(has_one = "super::reimbursements::Entity")]
    Reimbursement,
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl Related<super::reimbursements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reimbursement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            household_id: ActiveValue::Set(expense.household_id.clone()),
            date: ActiveValue::Set(expense.date),
            description: ActiveValue::Set(expense.description.clone()),
            category_id: ActiveValue::Set(expense.category_id.to_string()),
            amount_cents: ActiveValue::Set(expense.amount.cents()),
            currency: ActiveValue::Set(expense.currency.code().to_string()),
            paid_by: ActiveValue::Set(expense.paid_by.to_string()),
            expense_type: ActiveValue::Set(expense.expense_type.as_str().to_string()),
            paid: ActiveValue::Set(expense.paid),
            paid_from_pool: ActiveValue::Set(expense.paid_from_pool),
            needs_reimbursement: ActiveValue::Set(expense.needs_reimbursement),
            created_by: ActiveValue::Set(expense.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            household_id: model.household_id,
            date: model.date,
            description: model.description,
            category_id: parse_uuid(&model.category_id, "category")?,
            amount: Cents::new(model.amount_cents),
            currency: model_currency(&model.currency)?,
            paid_by: parse_uuid(&model.paid_by, "member")?,
            expense_type: ExpenseType::try_from(model.expense_type.as_str())?,
            paid: model.paid,
            paid_from_pool: model.paid_from_pool,
            needs_reimbursement: model.needs_reimbursement,
            created_by: model.created_by,
        })
    }
}
