//! Shared-pool operations: income routing, pool expenses, allowances,
//! reimbursements and the one-way mode switch.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AccountingMode, AllowanceAdjustCmd, Cents, Currency, EngineError, Expense, ExpenseNewCmd,
    Income, IncomeNewCmd, IncomeProcessed, MonthKey, PersonalAllowance, Reimbursement,
    ResultEngine, allowances, expenses, incomes, mode, pool, reimbursements,
};

use super::{Engine, with_tx};

/// Outcome of creating an expense in shared-pool mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolExpenseOutcome {
    pub expense: Expense,
    /// Present only for shared expenses paid outside the pool.
    pub reimbursement: Option<Reimbursement>,
    pub pool_balance: Cents,
}

/// Outcome of switching a household to shared-pool mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeSwitchReport {
    pub household_id: String,
    pub incomes_replayed: usize,
    pub pool_balance: Cents,
}

impl Engine {
    /// Routes an income through the allowance/pool allocation.
    ///
    /// Effective month is the explicit allocation month when present, else
    /// the income's calendar month. The member's allowance config decides
    /// the personal portion; the rest is credited to the pool. Income row,
    /// allowance row and pool balance all move in one transaction.
    pub async fn process_income_for_shared_pool(
        &self,
        cmd: IncomeNewCmd,
    ) -> ResultEngine<IncomeProcessed> {
        with_tx!(self, |db_tx| {
            let household = self.require_household(&db_tx, &cmd.household_id).await?;
            if household.accounting_mode != AccountingMode::SharedPool {
                return Err(EngineError::Validation(
                    "household is not in shared_pool mode".to_string(),
                ));
            }
            let member = self
                .require_active_member(&db_tx, &cmd.household_id, cmd.member_id)
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
            let month = income.effective_month();
            let portion = member.allowance.allocation_for(income.amount);
            let contribution = income.amount - portion;

            incomes::ActiveModel::from(&income).insert(&db_tx).await?;
            self.credit_allowance(&db_tx, &cmd.household_id, cmd.member_id, month, portion)
                .await?;

            let balance = self.pool_balance_for(&db_tx, &cmd.household_id).await? + contribution;
            self.set_pool_balance(&db_tx, &cmd.household_id, balance)
                .await?;

            Ok(IncomeProcessed {
                income_id: income.id,
                month,
                allowance_allocated: portion,
                pool_contribution: contribution,
                pool_balance: balance,
            })
        })
    }

    /// Creates an expense in shared-pool mode.
    ///
    /// Paid from the pool → the balance drops by the amount. Shared but paid
    /// out of pocket → a reimbursement is created atomically with the
    /// expense. Personal → no pool or allowance effect.
    pub async fn create_pool_expense(&self, cmd: ExpenseNewCmd) -> ResultEngine<PoolExpenseOutcome> {
        with_tx!(self, |db_tx| {
            let household = self.require_household(&db_tx, &cmd.household_id).await?;
            if household.accounting_mode != AccountingMode::SharedPool {
                return Err(EngineError::Validation(
                    "household is not in shared_pool mode".to_string(),
                ));
            }
            mode::validate_expense(AccountingMode::SharedPool, &cmd).into_result()?;
            self.require_category(&db_tx, &cmd.household_id, cmd.category_id)
                .await?;
            self.require_active_member(&db_tx, &cmd.household_id, cmd.paid_by)
                .await?;

            let paid_from_pool = cmd.paid_from_pool.unwrap_or(false);
            let expense = Expense::new(
                cmd.household_id.clone(),
                cmd.date,
                cmd.description.clone(),
                cmd.category_id,
                cmd.amount,
                cmd.currency.unwrap_or(Currency::Eur),
                cmd.paid_by,
                cmd.expense_type,
                paid_from_pool,
                cmd.created_by.clone(),
            )?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            let mut balance = self.pool_balance_for(&db_tx, &cmd.household_id).await?;
            let mut reimbursement = None;

            if paid_from_pool {
                balance = balance - expense.amount;
                self.set_pool_balance(&db_tx, &cmd.household_id, balance)
                    .await?;
            } else if expense.needs_reimbursement {
                let owed = Reimbursement::new(expense.id, expense.paid_by, expense.amount);
                reimbursements::ActiveModel::from(&owed)
                    .insert(&db_tx)
                    .await?;
                reimbursement = Some(owed);
            }

            if let Some(transaction_id) = cmd.transaction_id {
                self.consume_bank_transaction(&db_tx, &cmd.household_id, transaction_id)
                    .await?;
            }

            Ok(PoolExpenseOutcome {
                expense,
                reimbursement,
                pool_balance: balance,
            })
        })
    }

    /// Applies an explicit spend or refund to an existing allowance row.
    ///
    /// `NotFound` when no allowance exists for that member and month:
    /// allocation happens through income processing, never here.
    pub async fn adjust_allowance(
        &self,
        cmd: AllowanceAdjustCmd,
    ) -> ResultEngine<PersonalAllowance> {
        with_tx!(self, |db_tx| {
            let model = self
                .find_allowance(&db_tx, &cmd.household_id, cmd.member_id, cmd.month)
                .await?
                .ok_or_else(|| EngineError::NotFound("allowance".to_string()))?;
            let mut allowance = PersonalAllowance::try_from(model)?;
            allowance.adjust(cmd.amount, cmd.op)?;
            if !allowance.is_consistent() {
                return Err(EngineError::Consistency(
                    "allowance bookkeeping out of balance".to_string(),
                ));
            }
            allowances::ActiveModel::from(&allowance)
                .update(&db_tx)
                .await?;
            Ok(allowance)
        })
    }

    /// Records the rollover carry on a month's allowance row. The next
    /// month's row is never created or credited here.
    pub async fn rollover_allowance(
        &self,
        household_id: &str,
        member_id: Uuid,
        month: MonthKey,
    ) -> ResultEngine<PersonalAllowance> {
        with_tx!(self, |db_tx| {
            let model = self
                .find_allowance(&db_tx, household_id, member_id, month)
                .await?
                .ok_or_else(|| EngineError::NotFound("allowance".to_string()))?;
            let mut allowance = PersonalAllowance::try_from(model)?;
            allowance.rollover();
            allowances::ActiveModel::from(&allowance)
                .update(&db_tx)
                .await?;
            Ok(allowance)
        })
    }

    pub async fn allowance(
        &self,
        household_id: &str,
        member_id: Uuid,
        month: MonthKey,
    ) -> ResultEngine<PersonalAllowance> {
        let model = self
            .find_allowance(&self.database, household_id, member_id, month)
            .await?
            .ok_or_else(|| EngineError::NotFound("allowance".to_string()))?;
        PersonalAllowance::try_from(model)
    }

    /// Marks a reimbursement settled. Bookkeeping only; moves no pool funds.
    pub async fn settle_reimbursement(
        &self,
        household_id: &str,
        reimbursement_id: Uuid,
    ) -> ResultEngine<Reimbursement> {
        with_tx!(self, |db_tx| {
            let model = reimbursements::Entity::find_by_id(reimbursement_id.to_string())
                .join(JoinType::InnerJoin, reimbursements::Relation::Expenses.def())
                .filter(expenses::Column::HouseholdId.eq(household_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("reimbursement".to_string()))?;
            let mut reimbursement = Reimbursement::try_from(model)?;
            if reimbursement.settled {
                return Err(EngineError::Validation(
                    "reimbursement is already settled".to_string(),
                ));
            }
            reimbursement.settled = true;
            reimbursement.settled_at = Some(Utc::now());
            reimbursements::ActiveModel::from(&reimbursement)
                .update(&db_tx)
                .await?;
            Ok(reimbursement)
        })
    }

    pub async fn reimbursements(
        &self,
        household_id: &str,
        unsettled_only: bool,
    ) -> ResultEngine<Vec<Reimbursement>> {
        let mut query = reimbursements::Entity::find()
            .join(JoinType::InnerJoin, reimbursements::Relation::Expenses.def())
            .filter(expenses::Column::HouseholdId.eq(household_id.to_string()));
        if unsettled_only {
            query = query.filter(reimbursements::Column::Settled.eq(false));
        }
        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Reimbursement::try_from)
            .collect()
    }

    pub async fn pool_balance(&self, household_id: &str) -> ResultEngine<Cents> {
        self.pool_balance_for(&self.database, household_id).await
    }

    /// One-way switch from individual to shared-pool mode.
    ///
    /// Replays every existing income, ordered by date ascending, through the
    /// allowance/pool allocation using the members' current configs. The
    /// whole switch is one transaction: a mid-replay failure leaves the
    /// household in individual mode with nothing applied.
    pub async fn switch_to_shared_pool(&self, household_id: &str) -> ResultEngine<ModeSwitchReport> {
        with_tx!(self, |db_tx| {
            let household = self.require_household(&db_tx, household_id).await?;
            if household.accounting_mode == AccountingMode::SharedPool {
                return Err(EngineError::Validation(
                    "household is already in shared_pool mode".to_string(),
                ));
            }

            let update = crate::households::ActiveModel {
                id: ActiveValue::Set(household_id.to_string()),
                accounting_mode: ActiveValue::Set(AccountingMode::SharedPool.as_str().to_string()),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            let income_models = incomes::Entity::find()
                .filter(incomes::Column::HouseholdId.eq(household_id.to_string()))
                .order_by_asc(incomes::Column::Date)
                .order_by_asc(incomes::Column::Id)
                .all(&db_tx)
                .await?;

            let mut contribution_total = Cents::ZERO;
            let mut replayed = 0usize;
            for model in income_models {
                let income = Income::try_from(model)?;
                // Inactive members still replay; their rows survive soft
                // deletion precisely for this.
                let member = self
                    .require_member(&db_tx, household_id, income.member_id)
                    .await?;
                let portion = member.allowance.allocation_for(income.amount);
                self.credit_allowance(
                    &db_tx,
                    household_id,
                    income.member_id,
                    income.effective_month(),
                    portion,
                )
                .await?;
                contribution_total += income.amount - portion;
                replayed += 1;
            }

            let balance = self.pool_balance_for(&db_tx, household_id).await? + contribution_total;
            self.set_pool_balance(&db_tx, household_id, balance).await?;

            tracing::info!(
                household = household_id,
                incomes = replayed,
                balance = %balance,
                "switched household to shared_pool mode"
            );
            Ok(ModeSwitchReport {
                household_id: household_id.to_string(),
                incomes_replayed: replayed,
                pool_balance: balance,
            })
        })
    }

    /// Find-or-create the allowance row for (member, month) and credit it.
    async fn credit_allowance<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        member_id: Uuid,
        month: MonthKey,
        portion: Cents,
    ) -> ResultEngine<PersonalAllowance> {
        let existing = self.find_allowance(db, household_id, member_id, month).await?;
        let mut allowance = match &existing {
            Some(model) => PersonalAllowance::try_from(model.clone())?,
            None => PersonalAllowance::new(household_id.to_string(), member_id, month),
        };
        allowance.allocate(portion);
        if !allowance.is_consistent() {
            return Err(EngineError::Consistency(
                "allowance bookkeeping out of balance".to_string(),
            ));
        }
        let active = allowances::ActiveModel::from(&allowance);
        if existing.is_some() {
            active.update(db).await?;
        } else {
            active.insert(db).await?;
        }
        Ok(allowance)
    }

    async fn find_allowance<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        member_id: Uuid,
        month: MonthKey,
    ) -> ResultEngine<Option<allowances::Model>> {
        Ok(allowances::Entity::find()
            .filter(allowances::Column::HouseholdId.eq(household_id.to_string()))
            .filter(allowances::Column::MemberId.eq(member_id.to_string()))
            .filter(allowances::Column::Month.eq(month.to_string()))
            .one(db)
            .await?)
    }

    pub(super) async fn pool_balance_for<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
    ) -> ResultEngine<Cents> {
        let model = pool::Entity::find_by_id(household_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("shared pool".to_string()))?;
        Ok(Cents::new(model.balance_cents))
    }

    async fn set_pool_balance<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        balance: Cents,
    ) -> ResultEngine<()> {
        let update = pool::ActiveModel {
            household_id: ActiveValue::Set(household_id.to_string()),
            balance_cents: ActiveValue::Set(balance.cents()),
        };
        update.update(db).await?;
        Ok(())
    }
}
