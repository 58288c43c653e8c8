//! Command structs for engine operations.
//!
//! Handlers build these from request payloads; the engine validates and
//! executes them. Grouping arguments this way keeps the op signatures
//! stable as fields grow.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    AccountingMode, AllowanceConfig, AllowanceOp, Cents, Currency, ExpenseType, MonthKey,
    SplitPolicy, split::CustomSplit,
};

/// A new expense under either accounting mode.
///
/// `split_type`/`custom_splits` matter only in individual mode;
/// `paid_from_pool` only in shared-pool mode. The mode policy validates the
/// combination before the engine runs.
#[derive(Clone, Debug)]
pub struct ExpenseNewCmd {
    pub household_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub category_id: Uuid,
    pub amount: Cents,
    pub currency: Option<Currency>,
    pub paid_by: Uuid,
    pub expense_type: ExpenseType,
    pub split_type: Option<SplitPolicy>,
    pub custom_splits: Option<Vec<CustomSplit>>,
    pub paid_from_pool: Option<bool>,
    /// Optional source bank transaction to link (marks it consumed).
    pub transaction_id: Option<Uuid>,
    pub created_by: String,
}

#[derive(Clone, Debug)]
pub struct IncomeNewCmd {
    pub household_id: String,
    pub member_id: Uuid,
    pub date: NaiveDate,
    pub amount: Cents,
    pub income_type: String,
    pub allocated_to_month: Option<MonthKey>,
    pub created_by: String,
}

#[derive(Clone, Debug)]
pub struct HouseholdNewCmd {
    pub name: String,
    pub owner: String,
    pub accounting_mode: AccountingMode,
}

#[derive(Clone, Debug)]
pub struct MemberNewCmd {
    pub household_id: String,
    pub name: String,
    pub split_ratio: Option<f64>,
    pub allowance: Option<AllowanceConfig>,
}

/// Partial member update; `None` fields stay untouched.
#[derive(Clone, Debug, Default)]
pub struct MemberUpdateCmd {
    pub split_ratio: Option<f64>,
    pub allowance: Option<AllowanceConfig>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct AllowanceAdjustCmd {
    pub household_id: String,
    pub member_id: Uuid,
    pub month: MonthKey,
    pub amount: Cents,
    pub op: AllowanceOp,
}

#[derive(Clone, Debug)]
pub struct BankConnectionNewCmd {
    pub household_id: String,
    pub provider: String,
    pub institution_name: String,
    pub provider_session_id: String,
    pub account_ref: String,
    pub created_by: String,
}

#[derive(Clone, Debug)]
pub struct SyncCmd {
    pub connection_id: Uuid,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}
