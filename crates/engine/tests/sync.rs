use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, Statement};
use uuid::Uuid;

use engine::{
    AccountBalance, AccountingMode, AuthorizationParams, AuthorizationStart, BankConnectionNewCmd,
    BankProvider, BankTransactionRecord, Cents, Currency, Engine, EngineError, ExpenseNewCmd,
    ExpenseType, HouseholdNewCmd, Institution, MemberNewCmd, SplitPolicy, SyncCmd,
    TransactionPage,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn connected_household(engine: &Engine) -> (String, Uuid) {
    let household = engine
        .create_household(HouseholdNewCmd {
            name: "Casa".to_string(),
            owner: "alice".to_string(),
            accounting_mode: AccountingMode::Individual,
        })
        .await
        .unwrap();
    let connection = engine
        .create_bank_connection(BankConnectionNewCmd {
            household_id: household.id.clone(),
            provider: "enablebanking".to_string(),
            institution_name: "Test Bank".to_string(),
            provider_session_id: "session-1".to_string(),
            account_ref: "acct-1".to_string(),
            created_by: "alice".to_string(),
        })
        .await
        .unwrap();
    (household.id, connection.id)
}

fn record(external_id: &str) -> BankTransactionRecord {
    BankTransactionRecord {
        external_id: external_id.to_string(),
        account_id: "acct-1".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
        description: format!("tx {external_id}"),
        amount: Cents::new(-12_50),
        currency: Currency::Eur,
    }
}

fn sync_cmd(connection_id: Uuid) -> SyncCmd {
    SyncCmd {
        connection_id,
        date_from: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        date_to: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
    }
}

/// Provider stub serving fixed pages, keyed by the page token.
struct PagedProvider {
    pages: Vec<Vec<BankTransactionRecord>>,
}

#[async_trait]
impl BankProvider for PagedProvider {
    async fn list_institutions(&self, _country: &str) -> Result<Vec<Institution>, EngineError> {
        Ok(Vec::new())
    }

    async fn start_authorization(
        &self,
        _params: AuthorizationParams,
    ) -> Result<AuthorizationStart, EngineError> {
        Err(EngineError::Validation("not used in this test".to_string()))
    }

    async fn fetch_account_balance(
        &self,
        account_ref: &str,
    ) -> Result<AccountBalance, EngineError> {
        Ok(AccountBalance {
            account_ref: account_ref.to_string(),
            amount: Cents::ZERO,
            currency: Currency::Eur,
        })
    }

    async fn fetch_transactions(
        &self,
        _account_ref: &str,
        _date_from: NaiveDate,
        _date_to: NaiveDate,
        page_token: Option<&str>,
    ) -> Result<TransactionPage, EngineError> {
        let index: usize = page_token.map_or(0, |t| t.parse().unwrap_or(0));
        let next_page_token = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(TransactionPage {
            transactions: self.pages.get(index).cloned().unwrap_or_default(),
            next_page_token,
        })
    }
}

#[tokio::test]
async fn sync_walks_all_pages_and_deduplicates_on_rerun() {
    let engine = engine_with_db().await;
    let (household, connection) = connected_household(&engine).await;

    let provider = PagedProvider {
        pages: vec![
            vec![record("a"), record("b")],
            vec![record("c")],
        ],
    };

    let report = engine
        .sync_transactions(&provider, &household, sync_cmd(connection))
        .await
        .unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.duplicates, 0);

    let report = engine
        .sync_transactions(&provider, &household, sync_cmd(connection))
        .await
        .unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.duplicates, 3);

    let transactions = engine.bank_transactions(&household, false).await.unwrap();
    assert_eq!(transactions.len(), 3);
}

#[tokio::test]
async fn linking_a_transaction_is_single_use() {
    let engine = engine_with_db().await;
    let (household, connection) = connected_household(&engine).await;
    let member = engine
        .add_member(MemberNewCmd {
            household_id: household.clone(),
            name: "Ada".to_string(),
            split_ratio: None,
            allowance: None,
        })
        .await
        .unwrap();
    let category = engine.create_category(&household, "Groceries").await.unwrap();

    let provider = PagedProvider {
        pages: vec![vec![record("a")]],
    };
    engine
        .sync_transactions(&provider, &household, sync_cmd(connection))
        .await
        .unwrap();
    let imported = engine.bank_transactions(&household, true).await.unwrap();
    assert_eq!(imported.len(), 1);

    let created = engine
        .create_individual_expense(ExpenseNewCmd {
            household_id: household.clone(),
            date: NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
            description: "Weekly shop".to_string(),
            category_id: category.id,
            amount: Cents::new(12_50),
            currency: None,
            paid_by: member.id,
            expense_type: ExpenseType::Shared,
            split_type: Some(SplitPolicy::Equal),
            custom_splits: None,
            paid_from_pool: None,
            transaction_id: Some(imported[0].id),
            created_by: "alice".to_string(),
        })
        .await
        .unwrap();

    assert!(engine
        .bank_transactions(&household, true)
        .await
        .unwrap()
        .is_empty());

    let err = engine
        .link_transaction(&household, imported[0].id, created.expense.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn deleting_a_connection_removes_its_transactions() {
    let engine = engine_with_db().await;
    let (household, connection) = connected_household(&engine).await;

    let provider = PagedProvider {
        pages: vec![vec![record("a"), record("b")]],
    };
    engine
        .sync_transactions(&provider, &household, sync_cmd(connection))
        .await
        .unwrap();

    engine
        .delete_bank_connection(&household, connection)
        .await
        .unwrap();

    assert!(engine.bank_connections(&household).await.unwrap().is_empty());
    assert!(engine
        .bank_transactions(&household, false)
        .await
        .unwrap()
        .is_empty());

    let err = engine
        .sync_transactions(&provider, &household, sync_cmd(connection))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("bank connection".to_string()));
}
