use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseSplit, ExpenseWithSplits, ResultEngine, expenses, reimbursements,
    splits,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn expense(
        &self,
        household_id: &str,
        expense_id: Uuid,
    ) -> ResultEngine<ExpenseWithSplits> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, household_id, expense_id).await?;
            let splits = self.expense_splits(&db_tx, expense_id).await?;
            Ok(ExpenseWithSplits {
                expense: Expense::try_from(model)?,
                splits,
            })
        })
    }

    pub async fn expenses(&self, household_id: &str) -> ResultEngine<Vec<ExpenseWithSplits>> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::HouseholdId.eq(household_id.to_string()))
            .order_by_desc(expenses::Column::Date)
            .find_with_related(splits::Entity)
            .all(&self.database)
            .await?;

        rows.into_iter()
            .map(|(expense_model, split_models)| {
                Ok(ExpenseWithSplits {
                    expense: Expense::try_from(expense_model)?,
                    splits: split_models
                        .into_iter()
                        .map(ExpenseSplit::try_from)
                        .collect::<ResultEngine<_>>()?,
                })
            })
            .collect()
    }

    /// Marks a member's split as paid; once every split of the expense is
    /// paid the expense itself flips to paid, in the same transaction.
    pub async fn mark_split_paid(
        &self,
        household_id: &str,
        expense_id: Uuid,
        member_id: Uuid,
    ) -> ResultEngine<ExpenseWithSplits> {
        with_tx!(self, |db_tx| {
            let expense_model = self.require_expense(&db_tx, household_id, expense_id).await?;

            let split_model = splits::Entity::find()
                .filter(splits::Column::ExpenseId.eq(expense_id.to_string()))
                .filter(splits::Column::MemberId.eq(member_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("split".to_string()))?;

            let update = splits::ActiveModel {
                id: ActiveValue::Set(split_model.id),
                paid: ActiveValue::Set(true),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            let mut splits = self.expense_splits(&db_tx, expense_id).await?;
            for split in &mut splits {
                if split.member_id == member_id {
                    split.paid = true;
                }
            }

            let mut expense = Expense::try_from(expense_model)?;
            if splits.iter().all(|s| s.paid) && !expense.paid {
                let update = expenses::ActiveModel {
                    id: ActiveValue::Set(expense_id.to_string()),
                    paid: ActiveValue::Set(true),
                    ..Default::default()
                };
                update.update(&db_tx).await?;
                expense.paid = true;
            }

            Ok(ExpenseWithSplits { expense, splits })
        })
    }

    /// Deletes an expense with its splits and reimbursement in one
    /// transaction.
    pub async fn delete_expense(&self, household_id: &str, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, household_id, expense_id).await?;

            splits::Entity::delete_many()
                .filter(splits::Column::ExpenseId.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?;
            reimbursements::Entity::delete_many()
                .filter(reimbursements::Column::ExpenseId.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub(super) async fn require_expense<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        expense_id: Uuid,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(expense_id.to_string())
            .filter(expenses::Column::HouseholdId.eq(household_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("expense".to_string()))
    }

    pub(super) async fn expense_splits<C: ConnectionTrait>(
        &self,
        db: &C,
        expense_id: Uuid,
    ) -> ResultEngine<Vec<ExpenseSplit>> {
        splits::Entity::find()
            .filter(splits::Column::ExpenseId.eq(expense_id.to_string()))
            .all(db)
            .await?
            .into_iter()
            .map(ExpenseSplit::try_from)
            .collect()
    }
}
