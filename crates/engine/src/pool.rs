//! The shared pool: one running balance per household.
//!
//! Funded by income contributions net of personal allowances, drawn down by
//! pool-funded shared expenses. Keyed by household id (no singleton row).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::Cents;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharedPool {
    pub household_id: String,
    pub balance: Cents,
}

impl SharedPool {
    pub fn new(household_id: String) -> Self {
        Self {
            household_id,
            balance: Cents::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shared_pools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub household_id: String,
    pub balance_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::households::Entity",
        from = "Column::HouseholdId",
        to = "super::households::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Households,
}

impl Related<super::households::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Households.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SharedPool> for ActiveModel {
    fn from(pool: &SharedPool) -> Self {
        Self {
            household_id: ActiveValue::Set(pool.household_id.clone()),
            balance_cents: ActiveValue::Set(pool.balance.cents()),
        }
    }
}

impl From<Model> for SharedPool {
    fn from(model: Model) -> Self {
        Self {
            household_id: model.household_id,
            balance: Cents::new(model.balance_cents),
        }
    }
}
