//! Personal allowances: per-member, per-month discretionary budgets.
//!
//! The bookkeeping invariant `remaining == allocated − spent` must hold
//! after every mutation. `remaining` is allowed to go negative — that is a
//! meaningful overspend — but `allocated` and `spent` must stay consistent.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cents, EngineError, MonthKey, ResultEngine, util::parse_uuid};

/// An explicit spend/refund adjustment against an allowance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceOp {
    Spend,
    Refund,
}

impl TryFrom<&str> for AllowanceOp {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "spend" => Ok(Self::Spend),
            "refund" => Ok(Self::Refund),
            other => Err(EngineError::Validation(format!(
                "invalid allowance op: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalAllowance {
    pub id: Uuid,
    pub household_id: String,
    pub member_id: Uuid,
    pub month: MonthKey,
    pub allocated: Cents,
    pub spent: Cents,
    pub remaining: Cents,
    /// Amount rolled into the next month; set only by an explicit rollover
    /// action, never automatically.
    pub carried_to: Option<Cents>,
}

impl PersonalAllowance {
    pub fn new(household_id: String, member_id: Uuid, month: MonthKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            household_id,
            member_id,
            month,
            allocated: Cents::ZERO,
            spent: Cents::ZERO,
            remaining: Cents::ZERO,
            carried_to: None,
        }
    }

    /// Credits an income allocation. The only path that increases
    /// `allocated`.
    pub fn allocate(&mut self, amount: Cents) {
        self.allocated += amount;
        self.remaining += amount;
    }

    /// Applies an explicit spend or refund.
    pub fn adjust(&mut self, amount: Cents, op: AllowanceOp) -> ResultEngine<()> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "adjustment amount must be > 0".to_string(),
            ));
        }
        match op {
            AllowanceOp::Spend => {
                self.spent += amount;
                self.remaining -= amount;
            }
            AllowanceOp::Refund => {
                self.spent -= amount;
                self.remaining += amount;
            }
        }
        Ok(())
    }

    /// Records the carry value for a month rollover: `max(remaining, 0)`.
    ///
    /// This records intent only; the next month's row is not created or
    /// credited here.
    pub fn rollover(&mut self) -> Cents {
        let carry = self.remaining.max(Cents::ZERO);
        self.carried_to = Some(carry);
        carry
    }

    /// The bookkeeping invariant; checked after mutations at write time.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.remaining == self.allocated - self.spent
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "personal_allowances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub member_id: String,
    pub month: String,
    pub allocated_cents: i64,
    pub spent_cents: i64,
    pub remaining_cents: i64,
    pub carried_to_cents: Option<i64>,
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

impl From<&PersonalAllowance> for ActiveModel {
    fn from(allowance: &PersonalAllowance) -> Self {
        Self {
            id: ActiveValue::Set(allowance.id.to_string()),
            household_id: ActiveValue::Set(allowance.household_id.clone()),
            member_id: ActiveValue::Set(allowance.member_id.to_string()),
            month: ActiveValue::Set(allowance.month.to_string()),
            allocated_cents: ActiveValue::Set(allowance.allocated.cents()),
            spent_cents: ActiveValue::Set(allowance.spent.cents()),
            remaining_cents: ActiveValue::Set(allowance.remaining.cents()),
            carried_to_cents: ActiveValue::Set(allowance.carried_to.map(Cents::cents)),
        }
    }
}

impl TryFrom<Model> for PersonalAllowance {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "allowance")?,
            household_id: model.household_id,
            member_id: parse_uuid(&model.member_id, "member")?,
            month: MonthKey::parse(&model.month)?,
            allocated: Cents::new(model.allocated_cents),
            spent: Cents::new(model.spent_cents),
            remaining: Cents::new(model.remaining_cents),
            carried_to: model.carried_to_cents.map(Cents::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowance() -> PersonalAllowance {
        PersonalAllowance::new("h".to_string(), Uuid::new_v4(), MonthKey::parse("2026-01").unwrap())
    }

    #[test]
    fn invariant_holds_across_operations() {
        let mut a = allowance();
        a.allocate(Cents::new(300_00));
        a.adjust(Cents::new(120_00), AllowanceOp::Spend).unwrap();
        a.adjust(Cents::new(20_00), AllowanceOp::Refund).unwrap();
        a.adjust(Cents::new(50_00), AllowanceOp::Spend).unwrap();

        assert_eq!(a.allocated.cents(), 300_00);
        assert_eq!(a.spent.cents(), 150_00);
        assert_eq!(a.remaining.cents(), 150_00);
        assert!(a.is_consistent());
    }

    #[test]
    fn remaining_may_go_negative() {
        let mut a = allowance();
        a.allocate(Cents::new(100_00));
        a.adjust(Cents::new(150_00), AllowanceOp::Spend).unwrap();

        assert_eq!(a.remaining.cents(), -50_00);
        assert!(a.is_consistent());
    }

    #[test]
    fn rollover_records_carry_and_floors_at_zero() {
        let mut a = allowance();
        a.allocate(Cents::new(80_00));
        a.adjust(Cents::new(30_00), AllowanceOp::Spend).unwrap();
        assert_eq!(a.rollover().cents(), 50_00);
        assert_eq!(a.carried_to, Some(Cents::new(50_00)));

        let mut overspent = allowance();
        overspent.allocate(Cents::new(10_00));
        overspent
            .adjust(Cents::new(40_00), AllowanceOp::Spend)
            .unwrap();
        assert_eq!(overspent.rollover(), Cents::ZERO);
    }

    #[test]
    fn non_positive_adjustment_rejected() {
        let mut a = allowance();
        assert!(a.adjust(Cents::ZERO, AllowanceOp::Spend).is_err());
        assert!(a.adjust(Cents::new(-5), AllowanceOp::Refund).is_err());
    }
}
