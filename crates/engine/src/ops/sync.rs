//! Bank connections and transaction sync.
//!
//! Network I/O (the provider pagination loop) happens before the DB
//! transaction; dedup and inserts run inside one transaction afterwards.

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BankConnection, BankConnectionNewCmd, BankTransaction, EngineError, ResultEngine, SyncCmd,
    bank::{BankProvider, BankTransactionRecord},
    bank_connections, bank_transactions,
};

use super::{Engine, with_tx};

/// Summary of one sync run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub inserted: usize,
    pub duplicates: usize,
}

impl Engine {
    pub async fn create_bank_connection(
        &self,
        cmd: BankConnectionNewCmd,
    ) -> ResultEngine<BankConnection> {
        with_tx!(self, |db_tx| {
            self.require_household(&db_tx, &cmd.household_id).await?;
            let connection = BankConnection::new(
                cmd.household_id.clone(),
                cmd.provider.clone(),
                cmd.institution_name.clone(),
                cmd.provider_session_id.clone(),
                cmd.account_ref.clone(),
                cmd.created_by.clone(),
            );
            bank_connections::ActiveModel::from(&connection)
                .insert(&db_tx)
                .await?;
            Ok(connection)
        })
    }

    /// Removes a connection together with its imported transactions.
    pub async fn delete_bank_connection(
        &self,
        household_id: &str,
        connection_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_connection(&db_tx, household_id, connection_id)
                .await?;
            bank_transactions::Entity::delete_many()
                .filter(bank_transactions::Column::ConnectionId.eq(connection_id.to_string()))
                .exec(&db_tx)
                .await?;
            bank_connections::Entity::delete_by_id(connection_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn bank_connections(&self, household_id: &str) -> ResultEngine<Vec<BankConnection>> {
        bank_connections::Entity::find()
            .filter(bank_connections::Column::HouseholdId.eq(household_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(BankConnection::try_from)
            .collect()
    }

    pub async fn bank_connection(
        &self,
        household_id: &str,
        connection_id: Uuid,
    ) -> ResultEngine<BankConnection> {
        self.require_connection(&self.database, household_id, connection_id)
            .await
    }

    /// Pulls transactions for a connection over a date range.
    ///
    /// Pages are fetched until the provider stops returning a next-page
    /// token. Records already stored under the same (external_id,
    /// account_id) pair are counted as duplicates and skipped.
    pub async fn sync_transactions(
        &self,
        provider: &dyn BankProvider,
        household_id: &str,
        cmd: SyncCmd,
    ) -> ResultEngine<SyncReport> {
        let connection = self
            .require_connection(&self.database, household_id, cmd.connection_id)
            .await?;

        let mut records: Vec<BankTransactionRecord> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = provider
                .fetch_transactions(
                    &connection.account_ref,
                    cmd.date_from,
                    cmd.date_to,
                    page_token.as_deref(),
                )
                .await?;
            records.extend(page.transactions);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        let fetched = records.len();
        let report: ResultEngine<SyncReport> = with_tx!(self, |db_tx| {
            let mut inserted = 0usize;
            let mut duplicates = 0usize;
            for record in &records {
                let exists = bank_transactions::Entity::find()
                    .filter(bank_transactions::Column::ExternalId.eq(record.external_id.clone()))
                    .filter(bank_transactions::Column::AccountId.eq(record.account_id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if exists {
                    duplicates += 1;
                    continue;
                }
                let transaction = BankTransaction::from_record(
                    household_id.to_string(),
                    connection.id,
                    record,
                );
                bank_transactions::ActiveModel::from(&transaction)
                    .insert(&db_tx)
                    .await?;
                inserted += 1;
            }
            Ok(SyncReport {
                fetched,
                inserted,
                duplicates,
            })
        });
        let report = report?;

        tracing::info!(
            connection = %connection.id,
            fetched = report.fetched,
            inserted = report.inserted,
            duplicates = report.duplicates,
            "bank transaction sync finished"
        );
        Ok(report)
    }

    pub async fn bank_transactions(
        &self,
        household_id: &str,
        unlinked_only: bool,
    ) -> ResultEngine<Vec<BankTransaction>> {
        let mut query = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::HouseholdId.eq(household_id.to_string()));
        if unlinked_only {
            query = query.filter(bank_transactions::Column::LinkedToExpense.eq(false));
        }
        query
            .order_by_desc(bank_transactions::Column::Date)
            .all(&self.database)
            .await?
            .into_iter()
            .map(BankTransaction::try_from)
            .collect()
    }

    /// Links an imported transaction to an existing expense.
    pub async fn link_transaction(
        &self,
        household_id: &str,
        transaction_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<BankTransaction> {
        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, household_id, expense_id).await?;
            self.consume_bank_transaction(&db_tx, household_id, transaction_id)
                .await
        })
    }

    /// Marks a transaction consumed by an expense; already-linked rows are
    /// refused.
    pub(super) async fn consume_bank_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<BankTransaction> {
        let model = bank_transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(bank_transactions::Column::HouseholdId.eq(household_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank transaction".to_string()))?;
        let mut transaction = BankTransaction::try_from(model)?;
        if transaction.linked_to_expense {
            return Err(EngineError::Validation(
                "bank transaction is already linked to an expense".to_string(),
            ));
        }
        transaction.linked_to_expense = true;

        let update = bank_transactions::ActiveModel {
            id: ActiveValue::Set(transaction.id.to_string()),
            linked_to_expense: ActiveValue::Set(true),
            ..Default::default()
        };
        update.update(db).await?;
        Ok(transaction)
    }

    async fn require_connection<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        connection_id: Uuid,
    ) -> ResultEngine<BankConnection> {
        let model = bank_connections::Entity::find_by_id(connection_id.to_string())
            .filter(bank_connections::Column::HouseholdId.eq(household_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank connection".to_string()))?;
        BankConnection::try_from(model)
    }
}
