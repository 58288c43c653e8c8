use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, Statement};
use uuid::Uuid;

use engine::{
    AccountingMode, AllowanceAdjustCmd, AllowanceConfig, AllowanceOp, Cents, Engine, EngineError,
    ExpenseNewCmd, ExpenseType, HouseholdNewCmd, IncomeNewCmd, MemberNewCmd, MonthKey,
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

async fn pool_household(
    engine: &Engine,
    allowance: AllowanceConfig,
) -> (String, Uuid, Uuid) {
    let household = engine
        .create_household(HouseholdNewCmd {
            name: "Casa".to_string(),
            owner: "alice".to_string(),
            accounting_mode: AccountingMode::SharedPool,
        })
        .await
        .unwrap();
    let member = engine
        .add_member(MemberNewCmd {
            household_id: household.id.clone(),
            name: "Ada".to_string(),
            split_ratio: None,
            allowance: Some(allowance),
        })
        .await
        .unwrap();
    let category = engine
        .create_category(&household.id, "Groceries")
        .await
        .unwrap();
    (household.id, member.id, category.id)
}

fn income_cmd(household_id: &str, member_id: Uuid, amount: i64) -> IncomeNewCmd {
    IncomeNewCmd {
        household_id: household_id.to_string(),
        member_id,
        date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        amount: Cents::new(amount),
        income_type: "salary".to_string(),
        allocated_to_month: None,
        created_by: "alice".to_string(),
    }
}

fn pool_expense_cmd(
    household_id: &str,
    category_id: Uuid,
    paid_by: Uuid,
    amount: i64,
    paid_from_pool: bool,
) -> ExpenseNewCmd {
    ExpenseNewCmd {
        household_id: household_id.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        description: "Weekly shop".to_string(),
        category_id,
        amount: Cents::new(amount),
        currency: None,
        paid_by,
        expense_type: ExpenseType::Shared,
        split_type: None,
        custom_splits: None,
        paid_from_pool: Some(paid_from_pool),
        transaction_id: None,
        created_by: "alice".to_string(),
    }
}

#[tokio::test]
async fn income_splits_between_allowance_and_pool() {
    let engine = engine_with_db().await;
    let (household, member, _) =
        pool_household(&engine, AllowanceConfig::Percentage(0.3)).await;

    let processed = engine
        .process_income_for_shared_pool(income_cmd(&household, member, 1_000_00))
        .await
        .unwrap();

    assert_eq!(processed.allowance_allocated.cents(), 300_00);
    assert_eq!(processed.pool_contribution.cents(), 700_00);
    assert_eq!(processed.pool_balance.cents(), 700_00);

    let month = MonthKey::parse("2026-02").unwrap();
    let allowance = engine.allowance(&household, member, month).await.unwrap();
    assert_eq!(allowance.allocated.cents(), 300_00);
    assert_eq!(allowance.remaining.cents(), 300_00);
}

#[tokio::test]
async fn fixed_allowance_never_exceeds_the_income() {
    let engine = engine_with_db().await;
    let (household, member, _) =
        pool_household(&engine, AllowanceConfig::Fixed(Cents::new(500_00))).await;

    let processed = engine
        .process_income_for_shared_pool(income_cmd(&household, member, 300_00))
        .await
        .unwrap();

    assert_eq!(processed.allowance_allocated.cents(), 300_00);
    assert_eq!(processed.pool_contribution, Cents::ZERO);
    assert_eq!(processed.pool_balance, Cents::ZERO);
}

#[tokio::test]
async fn explicit_allocation_month_wins_over_calendar_month() {
    let engine = engine_with_db().await;
    let (household, member, _) =
        pool_household(&engine, AllowanceConfig::Percentage(0.5)).await;

    let mut cmd = income_cmd(&household, member, 100_00);
    cmd.allocated_to_month = Some(MonthKey::parse("2026-03").unwrap());
    let processed = engine.process_income_for_shared_pool(cmd).await.unwrap();
    assert_eq!(processed.month.to_string(), "2026-03");

    let march = MonthKey::parse("2026-03").unwrap();
    assert!(engine.allowance(&household, member, march).await.is_ok());
    let february = MonthKey::parse("2026-02").unwrap();
    assert!(engine.allowance(&household, member, february).await.is_err());
}

#[tokio::test]
async fn off_pool_shared_expense_creates_reimbursement_and_leaves_pool_alone() {
    let engine = engine_with_db().await;
    let (household, member, category) =
        pool_household(&engine, AllowanceConfig::Percentage(0.0)).await;
    engine
        .process_income_for_shared_pool(income_cmd(&household, member, 200_00))
        .await
        .unwrap();

    let outcome = engine
        .create_pool_expense(pool_expense_cmd(&household, category, member, 50_00, false))
        .await
        .unwrap();

    assert!(outcome.expense.needs_reimbursement);
    let reimbursement = outcome.reimbursement.unwrap();
    assert_eq!(reimbursement.amount.cents(), 50_00);
    assert!(!reimbursement.settled);
    assert_eq!(outcome.pool_balance.cents(), 200_00, "pool untouched");

    let settled = engine
        .settle_reimbursement(&household, reimbursement.id)
        .await
        .unwrap();
    assert!(settled.settled);
    assert!(settled.settled_at.is_some());
    assert_eq!(
        engine.pool_balance(&household).await.unwrap().cents(),
        200_00,
        "settlement moves no funds"
    );

    let err = engine
        .settle_reimbursement(&household, reimbursement.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn on_pool_expense_draws_the_pool_down_without_reimbursement() {
    let engine = engine_with_db().await;
    let (household, member, category) =
        pool_household(&engine, AllowanceConfig::Percentage(0.0)).await;
    engine
        .process_income_for_shared_pool(income_cmd(&household, member, 200_00))
        .await
        .unwrap();

    let outcome = engine
        .create_pool_expense(pool_expense_cmd(&household, category, member, 50_00, true))
        .await
        .unwrap();

    assert!(outcome.reimbursement.is_none());
    assert!(!outcome.expense.needs_reimbursement);
    assert_eq!(outcome.pool_balance.cents(), 150_00);
    assert!(engine
        .reimbursements(&household, false)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn personal_expense_cannot_be_paid_from_the_pool() {
    let engine = engine_with_db().await;
    let (household, member, category) =
        pool_household(&engine, AllowanceConfig::Percentage(0.0)).await;

    let mut cmd = pool_expense_cmd(&household, category, member, 20_00, true);
    cmd.expense_type = ExpenseType::Personal;
    let err = engine.create_pool_expense(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn allowance_invariant_holds_under_spend_and_refund() {
    let engine = engine_with_db().await;
    let (household, member, _) =
        pool_household(&engine, AllowanceConfig::Percentage(0.3)).await;
    engine
        .process_income_for_shared_pool(income_cmd(&household, member, 1_000_00))
        .await
        .unwrap();

    let month = MonthKey::parse("2026-02").unwrap();
    let adjust = |amount: i64, op: AllowanceOp| AllowanceAdjustCmd {
        household_id: household.clone(),
        member_id: member,
        month,
        amount: Cents::new(amount),
        op,
    };

    engine.adjust_allowance(adjust(120_00, AllowanceOp::Spend)).await.unwrap();
    engine.adjust_allowance(adjust(20_00, AllowanceOp::Refund)).await.unwrap();
    let allowance = engine
        .adjust_allowance(adjust(250_00, AllowanceOp::Spend))
        .await
        .unwrap();

    assert_eq!(allowance.allocated.cents(), 300_00);
    assert_eq!(allowance.spent.cents(), 350_00);
    assert_eq!(allowance.remaining.cents(), -50_00, "overspend is allowed");
    assert!(allowance.is_consistent());
}

#[tokio::test]
async fn adjusting_a_missing_allowance_is_not_found() {
    let engine = engine_with_db().await;
    let (household, member, _) =
        pool_household(&engine, AllowanceConfig::Percentage(0.3)).await;

    let err = engine
        .adjust_allowance(AllowanceAdjustCmd {
            household_id: household,
            member_id: member,
            month: MonthKey::parse("2026-05").unwrap(),
            amount: Cents::new(10_00),
            op: AllowanceOp::Spend,
        })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("allowance".to_string()));
}

#[tokio::test]
async fn rollover_records_carry_without_touching_next_month() {
    let engine = engine_with_db().await;
    let (household, member, _) =
        pool_household(&engine, AllowanceConfig::Percentage(0.3)).await;
    engine
        .process_income_for_shared_pool(income_cmd(&household, member, 1_000_00))
        .await
        .unwrap();

    let month = MonthKey::parse("2026-02").unwrap();
    let rolled = engine
        .rollover_allowance(&household, member, month)
        .await
        .unwrap();
    assert_eq!(rolled.carried_to, Some(Cents::new(300_00)));

    let err = engine
        .allowance(&household, member, month.next())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)), "never auto-credits");
}

#[tokio::test]
async fn mode_switch_replays_income_history_once() {
    let engine = engine_with_db().await;
    let household = engine
        .create_household(HouseholdNewCmd {
            name: "Casa".to_string(),
            owner: "alice".to_string(),
            accounting_mode: AccountingMode::Individual,
        })
        .await
        .unwrap();
    let member = engine
        .add_member(MemberNewCmd {
            household_id: household.id.clone(),
            name: "Ada".to_string(),
            split_ratio: None,
            allowance: Some(AllowanceConfig::Percentage(0.3)),
        })
        .await
        .unwrap();

    for (month, amount) in [(1, 1_000_00), (2, 500_00)] {
        engine
            .record_individual_income(IncomeNewCmd {
                household_id: household.id.clone(),
                member_id: member.id,
                date: NaiveDate::from_ymd_opt(2026, month, 1).unwrap(),
                amount: Cents::new(amount),
                income_type: "salary".to_string(),
                allocated_to_month: None,
                created_by: "alice".to_string(),
            })
            .await
            .unwrap();
    }

    let report = engine.switch_to_shared_pool(&household.id).await.unwrap();
    assert_eq!(report.incomes_replayed, 2);
    assert_eq!(report.pool_balance.cents(), 700_00 + 350_00);

    let january = MonthKey::parse("2026-01").unwrap();
    let allowance = engine
        .allowance(&household.id, member.id, january)
        .await
        .unwrap();
    assert_eq!(allowance.allocated.cents(), 300_00);

    let switched = engine.household(&household.id).await.unwrap();
    assert_eq!(switched.accounting_mode, AccountingMode::SharedPool);

    let err = engine.switch_to_shared_pool(&household.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "switch is one-way");
}
