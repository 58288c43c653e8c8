//! Accounting-mode policy.
//!
//! The two modes are mutually exclusive and routing-relevant, so the policy
//! is a tagged enum with exhaustive matching rather than a lookup table: a
//! third mode would fail compilation everywhere a decision is missing.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ExpenseType, commands::ExpenseNewCmd};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingMode {
    Individual,
    SharedPool,
}

impl AccountingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::SharedPool => "shared_pool",
        }
    }
}

impl TryFrom<&str> for AccountingMode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "individual" => Ok(Self::Individual),
            "shared_pool" => Ok(Self::SharedPool),
            other => Err(EngineError::Validation(format!(
                "invalid accounting mode: {other}"
            ))),
        }
    }
}

/// A feature a mode enables; used by routing and client UI gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeFeature {
    ExpenseSplits,
    DebtTracking,
    SharedPool,
    PersonalAllowances,
    Reimbursements,
}

/// Where expense/income creation routes for a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeEndpoints {
    pub expenses: &'static str,
    pub income: &'static str,
}

/// UI gating hints (consumed by clients, opaque to the engine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeUi {
    pub show_split_editor: bool,
    pub show_pool_balance: bool,
    pub show_allowances: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModeConfig {
    pub features: &'static [ModeFeature],
    pub endpoints: ModeEndpoints,
    pub ui: ModeUi,
}

/// The enabled feature set and routing for a mode. Pure function of `mode`.
#[must_use]
pub const fn config(mode: AccountingMode) -> ModeConfig {
    match mode {
        AccountingMode::Individual => ModeConfig {
            features: &[ModeFeature::ExpenseSplits, ModeFeature::DebtTracking],
            endpoints: ModeEndpoints {
                expenses: "/expenses/individual",
                income: "/income/individual",
            },
            ui: ModeUi {
                show_split_editor: true,
                show_pool_balance: false,
                show_allowances: false,
            },
        },
        AccountingMode::SharedPool => ModeConfig {
            features: &[
                ModeFeature::SharedPool,
                ModeFeature::PersonalAllowances,
                ModeFeature::Reimbursements,
            ],
            endpoints: ModeEndpoints {
                expenses: "/expenses/pool",
                income: "/income/pool",
            },
            ui: ModeUi {
                show_split_editor: false,
                show_pool_balance: true,
                show_allowances: true,
            },
        },
    }
}

/// Result of checking an expense payload against a mode's required fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ModeValidation {
    /// Converts the report into an engine error for callers that want to
    /// fail fast.
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.valid {
            Ok(())
        } else {
            Err(EngineError::Validation(self.errors.join("; ")))
        }
    }
}

/// Checks the mode-specific required fields of an expense payload.
///
/// Shared-pool mode requires `paid_from_pool`; individual mode requires a
/// split type or explicit custom splits when the expense is shared.
#[must_use]
pub fn validate_expense(mode: AccountingMode, cmd: &ExpenseNewCmd) -> ModeValidation {
    let mut errors = Vec::new();

    if cmd.description.trim().is_empty() {
        errors.push("description is required".to_string());
    }
    if !cmd.amount.is_positive() {
        errors.push("amount must be > 0".to_string());
    }

    match mode {
        AccountingMode::SharedPool => {
            if cmd.paid_from_pool.is_none() {
                errors.push("paid_from_pool is required in shared_pool mode".to_string());
            }
            if cmd.custom_splits.is_some() {
                errors.push("custom splits are not available in shared_pool mode".to_string());
            }
            if cmd.expense_type == ExpenseType::Personal && cmd.paid_from_pool == Some(true) {
                errors.push("personal expenses cannot be paid from the pool".to_string());
            }
        }
        AccountingMode::Individual => {
            if cmd.paid_from_pool.is_some() {
                errors.push("paid_from_pool is not available in individual mode".to_string());
            }
            if cmd.expense_type == ExpenseType::Shared
                && cmd.split_type.is_none()
                && cmd.custom_splits.is_none()
            {
                errors.push(
                    "shared expenses require split_type or custom_splits in individual mode"
                        .to_string(),
                );
            }
        }
    }

    ModeValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{Cents, split::CustomSplit};

    fn base_cmd() -> ExpenseNewCmd {
        ExpenseNewCmd {
            household_id: "h".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            description: "Groceries".to_string(),
            category_id: Uuid::new_v4(),
            amount: Cents::new(50_00),
            currency: None,
            paid_by: Uuid::new_v4(),
            expense_type: crate::ExpenseType::Shared,
            split_type: None,
            custom_splits: None,
            paid_from_pool: None,
            transaction_id: None,
            created_by: "alice".to_string(),
        }
    }

    #[test]
    fn endpoints_differ_per_mode() {
        let individual = config(AccountingMode::Individual);
        let pool = config(AccountingMode::SharedPool);
        assert_ne!(individual.endpoints.expenses, pool.endpoints.expenses);
        assert!(individual.ui.show_split_editor);
        assert!(pool.ui.show_pool_balance);
    }

    #[test]
    fn config_serializes_for_clients() {
        let value = serde_json::to_value(config(AccountingMode::SharedPool)).unwrap();
        assert!(
            value["features"]
                .as_array()
                .is_some_and(|features| !features.is_empty())
        );
        assert_eq!(value["endpoints"]["expenses"], "/expenses/pool");
        assert_eq!(value["ui"]["show_pool_balance"], true);
    }

    #[test]
    fn shared_pool_requires_paid_from_pool() {
        let report = validate_expense(AccountingMode::SharedPool, &base_cmd());
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("paid_from_pool")));

        let mut cmd = base_cmd();
        cmd.paid_from_pool = Some(true);
        assert!(validate_expense(AccountingMode::SharedPool, &cmd).valid);
    }

    #[test]
    fn individual_shared_requires_split_info() {
        let report = validate_expense(AccountingMode::Individual, &base_cmd());
        assert!(!report.valid);

        let mut with_policy = base_cmd();
        with_policy.split_type = Some(crate::SplitPolicy::Equal);
        assert!(validate_expense(AccountingMode::Individual, &with_policy).valid);

        let mut with_custom = base_cmd();
        with_custom.custom_splits = Some(vec![CustomSplit {
            member_id: with_custom.paid_by,
            amount_cents: 50_00,
        }]);
        assert!(validate_expense(AccountingMode::Individual, &with_custom).valid);
    }

    #[test]
    fn personal_expense_needs_no_split_info() {
        let mut cmd = base_cmd();
        cmd.expense_type = crate::ExpenseType::Personal;
        assert!(validate_expense(AccountingMode::Individual, &cmd).valid);
    }
}
