//! Household aggregate: the explicitly keyed settings row.
//!
//! Each household carries its accounting mode and the defaults applied to
//! new expenses. There is no "first row found" singleton anywhere; every
//! lookup goes through the household id.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountingMode, EngineError, ExpenseType, SplitPolicy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub accounting_mode: AccountingMode,
    pub default_paid_by: Option<Uuid>,
    pub default_expense_type: ExpenseType,
    pub default_split_type: SplitPolicy,
}

impl Household {
    pub fn new(name: String, owner: String, accounting_mode: AccountingMode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            owner,
            accounting_mode,
            default_paid_by: None,
            default_expense_type: ExpenseType::Shared,
            default_split_type: SplitPolicy::Equal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "households")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub owner: String,
    pub accounting_mode: String,
    pub default_paid_by: Option<String>,
    pub default_expense_type: String,
    pub default_split_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::members::Entity")]
    Members,
    #[sea_orm(has_one = "super::pool::Entity")]
    Pool,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Household> for ActiveModel {
    fn from(household: &Household) -> Self {
        Self {
            id: ActiveValue::Set(household.id.clone()),
            name: ActiveValue::Set(household.name.clone()),
            owner: ActiveValue::Set(household.owner.clone()),
            accounting_mode: ActiveValue::Set(household.accounting_mode.as_str().to_string()),
            default_paid_by: ActiveValue::Set(household.default_paid_by.map(|id| id.to_string())),
            default_expense_type: ActiveValue::Set(
                household.default_expense_type.as_str().to_string(),
            ),
            default_split_type: ActiveValue::Set(
                household.default_split_type.as_str().to_string(),
            ),
        }
    }
}

impl TryFrom<Model> for Household {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            owner: model.owner,
            accounting_mode: AccountingMode::try_from(model.accounting_mode.as_str())?,
            default_paid_by: model
                .default_paid_by
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            default_expense_type: ExpenseType::try_from(model.default_expense_type.as_str())?,
            default_split_type: SplitPolicy::try_from(model.default_split_type.as_str())?,
        })
    }
}
