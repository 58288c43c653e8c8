//! Individual-accounts operations: per-member debts tracked through splits.

use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    AccountingMode, Currency, EngineError, Expense, ExpenseNewCmd, ExpenseSplit, ExpenseType,
    ExpenseWithSplits, Income, IncomeNewCmd, ResultEngine, expenses, incomes, mode,
    split::{self, Participant, SplitPolicy, SplitShare},
    splits,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates an expense with its splits atomically.
    ///
    /// Personal expenses get one split (the payer's, already paid). Shared
    /// expenses go through the split calculator over the active members, or
    /// use the caller's custom splits verbatim after the exact-sum check. A
    /// split failure rolls the expense back.
    pub async fn create_individual_expense(
        &self,
        cmd: ExpenseNewCmd,
    ) -> ResultEngine<ExpenseWithSplits> {
        with_tx!(self, |db_tx| {
            let household = self.require_household(&db_tx, &cmd.household_id).await?;
            if household.accounting_mode != AccountingMode::Individual {
                return Err(EngineError::Validation(
                    "household is not in individual mode".to_string(),
                ));
            }
            mode::validate_expense(AccountingMode::Individual, &cmd).into_result()?;
            self.require_category(&db_tx, &cmd.household_id, cmd.category_id)
                .await?;
            let payer = self
                .require_active_member(&db_tx, &cmd.household_id, cmd.paid_by)
                .await?;

            let expense = Expense::new(
                cmd.household_id.clone(),
                cmd.date,
                cmd.description.clone(),
                cmd.category_id,
                cmd.amount,
                cmd.currency.unwrap_or(Currency::Eur),
                cmd.paid_by,
                cmd.expense_type,
                false,
                cmd.created_by.clone(),
            )?;

            let shares = match expense.expense_type {
                ExpenseType::Personal => vec![SplitShare {
                    member_id: payer.id,
                    amount: expense.amount,
                    paid: true,
                }],
                ExpenseType::Shared => {
                    let policy = if cmd.custom_splits.is_some() {
                        SplitPolicy::Custom
                    } else {
                        cmd.split_type.unwrap_or(household.default_split_type)
                    };
                    let participants: Vec<Participant> = self
                        .active_members(&db_tx, &cmd.household_id)
                        .await?
                        .iter()
                        .map(|m| Participant {
                            member_id: m.id,
                            ratio: m.split_ratio,
                        })
                        .collect();
                    split::compute_splits(
                        expense.amount,
                        policy,
                        &participants,
                        cmd.custom_splits.as_deref(),
                        cmd.paid_by,
                    )?
                }
            };

            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            let mut expense_splits = Vec::with_capacity(shares.len());
            for share in &shares {
                let split = ExpenseSplit::from_share(expense.id, share);
                splits::ActiveModel::from(&split).insert(&db_tx).await?;
                expense_splits.push(split);
            }

            if let Some(transaction_id) = cmd.transaction_id {
                self.consume_bank_transaction(&db_tx, &cmd.household_id, transaction_id)
                    .await?;
            }

            Ok(ExpenseWithSplits {
                expense,
                splits: expense_splits,
            })
        })
    }

    /// Records an income in individual mode. No pool or allowance effect.
    pub async fn record_individual_income(&self, cmd: IncomeNewCmd) -> ResultEngine<Income> {
        with_tx!(self, |db_tx| {
            let household = self.require_household(&db_tx, &cmd.household_id).await?;
            if household.accounting_mode != AccountingMode::Individual {
                return Err(EngineError::Validation(
                    "household is not in individual mode".to_string(),
                ));
            }
            self.require_active_member(&db_tx, &cmd.household_id, cmd.member_id)
                .await?;

            let income = Income::new(
                cmd.household_id.clone(),
                cmd.member_id,
                cmd.date,
                cmd.amount,
                cmd.income_type.clone(),
                cmd.allocated_to_month,
                cmd.created_by.clone(),
            )?;
            incomes::ActiveModel::from(&income).insert(&db_tx).await?;
            Ok(income)
        })
    }
}
