//! Household members and their allowance configuration.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cents, EngineError, ResultEngine, util::parse_uuid};

/// How income is apportioned to a member's personal allowance.
///
/// Percentage is a fraction of each income event (0..=1); Fixed is a flat
/// amount per income event. Config changes take effect prospectively only;
/// historical allowances are never recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AllowanceConfig {
    Percentage(f64),
    Fixed(Cents),
}

impl AllowanceConfig {
    /// A configuration that allocates nothing (every cent goes to the pool).
    pub const NONE: AllowanceConfig = AllowanceConfig::Percentage(0.0);

    pub fn validate(&self) -> ResultEngine<()> {
        match self {
            Self::Percentage(pct) if !(0.0..=1.0).contains(pct) => Err(EngineError::Validation(
                format!("allowance percentage out of range: {pct}"),
            )),
            Self::Fixed(amount) if amount.is_negative() => Err(EngineError::Validation(format!(
                "fixed allowance must be >= 0, got {amount}"
            ))),
            _ => Ok(()),
        }
    }

    /// The portion of `income` allocated to the personal allowance.
    ///
    /// Percentage rounds half-up on integer cents. A fixed allocation is
    /// capped at the income amount, so a single income event never pushes
    /// the pool contribution negative.
    #[must_use]
    pub fn allocation_for(&self, income: Cents) -> Cents {
        match *self {
            Self::Percentage(pct) => {
                let basis_points = (pct * 10_000.0).round() as i128;
                let cents = (i128::from(income.cents()) * basis_points + 5_000) / 10_000;
                Cents::new(cents as i64)
            }
            Self::Fixed(amount) => amount.min(income),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::Fixed(_) => "fixed",
        }
    }
}

/// A member of a household.
///
/// Members are soft-deleted: `is_active` flips false and the row stays, so
/// historical expenses and splits keep resolving. `split_ratio` is the
/// weight used by ratio-based expense splitting (0..=1, default 0.5).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub id: Uuid,
    pub household_id: String,
    pub name: String,
    pub is_active: bool,
    pub split_ratio: f64,
    pub allowance: AllowanceConfig,
}

impl HouseholdMember {
    pub fn new(household_id: String, name: String, split_ratio: Option<f64>) -> ResultEngine<Self> {
        let split_ratio = split_ratio.unwrap_or(0.5);
        if !(0.0..=1.0).contains(&split_ratio) {
            return Err(EngineError::Validation(format!(
                "split ratio out of range: {split_ratio}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            household_id,
            name,
            is_active: true,
            split_ratio,
            allowance: AllowanceConfig::NONE,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "household_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub is_active: bool,
    pub split_ratio: f64,
    pub allowance_kind: String,
    pub allowance_pct: Option<f64>,
    pub allowance_fixed_cents: Option<i64>,
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

impl From<&HouseholdMember> for ActiveModel {
    fn from(member: &HouseholdMember) -> Self {
        let (pct, fixed) = match member.allowance {
            AllowanceConfig::Percentage(pct) => (Some(pct), None),
            AllowanceConfig::Fixed(amount) => (None, Some(amount.cents())),
        };
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            household_id: ActiveValue::Set(member.household_id.clone()),
            name: ActiveValue::Set(member.name.clone()),
            is_active: ActiveValue::Set(member.is_active),
            split_ratio: ActiveValue::Set(member.split_ratio),
            allowance_kind: ActiveValue::Set(member.allowance.kind().to_string()),
            allowance_pct: ActiveValue::Set(pct),
            allowance_fixed_cents: ActiveValue::Set(fixed),
        }
    }
}

impl TryFrom<Model> for HouseholdMember {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let allowance = match model.allowance_kind.as_str() {
            "percentage" => AllowanceConfig::Percentage(model.allowance_pct.unwrap_or(0.0)),
            "fixed" => AllowanceConfig::Fixed(Cents::new(model.allowance_fixed_cents.unwrap_or(0))),
            other => {
                return Err(EngineError::Validation(format!(
                    "invalid allowance kind: {other}"
                )));
            }
        };
        Ok(Self {
            id: parse_uuid(&model.id, "member")?,
            household_id: model.household_id,
            name: model.name,
            is_active: model.is_active,
            split_ratio: model.split_ratio,
            allowance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_allocation_rounds_half_up() {
        let config = AllowanceConfig::Percentage(0.3);
        assert_eq!(config.allocation_for(Cents::new(100_000)).cents(), 30_000);
        // 0.3 × 101 = 30.3 → 30; 0.3 × 105 = 31.5 → 32
        assert_eq!(config.allocation_for(Cents::new(101)).cents(), 30);
        assert_eq!(config.allocation_for(Cents::new(105)).cents(), 32);
    }

    #[test]
    fn fixed_allocation_caps_at_income() {
        let config = AllowanceConfig::Fixed(Cents::new(500_00));
        assert_eq!(config.allocation_for(Cents::new(300_00)).cents(), 300_00);
        assert_eq!(config.allocation_for(Cents::new(900_00)).cents(), 500_00);
    }

    #[test]
    fn config_validation() {
        assert!(AllowanceConfig::Percentage(1.5).validate().is_err());
        assert!(AllowanceConfig::Fixed(Cents::new(-1)).validate().is_err());
        assert!(AllowanceConfig::Percentage(0.5).validate().is_ok());
    }

    #[test]
    fn member_ratio_out_of_range_rejected() {
        assert!(HouseholdMember::new("h".to_string(), "Ada".to_string(), Some(1.5)).is_err());
        let member = HouseholdMember::new("h".to_string(), "Ada".to_string(), None).unwrap();
        assert_eq!(member.split_ratio, 0.5);
    }
}
