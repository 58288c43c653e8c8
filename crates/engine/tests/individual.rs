use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, Statement};
use uuid::Uuid;

use engine::{
    AccountingMode, Cents, CustomSplit, Engine, EngineError, ExpenseNewCmd, ExpenseType,
    HouseholdMember, HouseholdNewCmd, IncomeNewCmd, MemberNewCmd, SplitPolicy,
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

async fn household_with_members(engine: &Engine, n: usize) -> (String, Vec<HouseholdMember>, Uuid) {
    let household = engine
        .create_household(HouseholdNewCmd {
            name: "Casa".to_string(),
            owner: "alice".to_string(),
            accounting_mode: AccountingMode::Individual,
        })
        .await
        .unwrap();
    let mut members = Vec::new();
    for i in 0..n {
        members.push(
            engine
                .add_member(MemberNewCmd {
                    household_id: household.id.clone(),
                    name: format!("Member {i}"),
                    split_ratio: None,
                    allowance: None,
                })
                .await
                .unwrap(),
        );
    }
    let category = engine
        .create_category(&household.id, "Groceries")
        .await
        .unwrap();
    (household.id, members, category.id)
}

fn expense_cmd(household_id: &str, category_id: Uuid, paid_by: Uuid, amount: i64) -> ExpenseNewCmd {
    ExpenseNewCmd {
        household_id: household_id.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        description: "Weekly shop".to_string(),
        category_id,
        amount: Cents::new(amount),
        currency: None,
        paid_by,
        expense_type: ExpenseType::Shared,
        split_type: Some(SplitPolicy::Equal),
        custom_splits: None,
        paid_from_pool: None,
        transaction_id: None,
        created_by: "alice".to_string(),
    }
}

#[tokio::test]
async fn equal_split_sums_exactly_and_marks_payer_paid() {
    let engine = engine_with_db().await;
    let (household, members, category) = household_with_members(&engine, 3).await;

    let created = engine
        .create_individual_expense(expense_cmd(&household, category, members[0].id, 100))
        .await
        .unwrap();

    let total: i64 = created.splits.iter().map(|s| s.amount.cents()).sum();
    assert_eq!(total, 100);
    assert_eq!(created.splits.len(), 3);
    let payer = created
        .splits
        .iter()
        .find(|s| s.member_id == members[0].id)
        .unwrap();
    assert!(payer.paid);
    assert_eq!(
        created.splits.iter().filter(|s| s.paid).count(),
        1,
        "only the payer's split starts paid"
    );
}

#[tokio::test]
async fn mismatched_custom_splits_leave_no_expense_row() {
    let engine = engine_with_db().await;
    let (household, members, category) = household_with_members(&engine, 2).await;

    let mut cmd = expense_cmd(&household, category, members[0].id, 100_00);
    cmd.split_type = None;
    cmd.custom_splits = Some(vec![
        CustomSplit {
            member_id: members[0].id,
            amount_cents: 60_00,
        },
        CustomSplit {
            member_id: members[1].id,
            amount_cents: 30_00,
        },
    ]);

    let err = engine.create_individual_expense(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::SplitMismatch(_)));

    let expenses = engine.expenses(&household).await.unwrap();
    assert!(expenses.is_empty(), "failed split must roll the expense back");
}

#[tokio::test]
async fn personal_expense_gets_single_paid_split() {
    let engine = engine_with_db().await;
    let (household, members, category) = household_with_members(&engine, 2).await;

    let mut cmd = expense_cmd(&household, category, members[1].id, 25_00);
    cmd.expense_type = ExpenseType::Personal;
    cmd.split_type = None;

    let created = engine.create_individual_expense(cmd).await.unwrap();
    assert_eq!(created.splits.len(), 1);
    assert_eq!(created.splits[0].member_id, members[1].id);
    assert_eq!(created.splits[0].amount.cents(), 25_00);
    assert!(created.splits[0].paid);
}

#[tokio::test]
async fn marking_all_splits_paid_flips_the_expense() {
    let engine = engine_with_db().await;
    let (household, members, category) = household_with_members(&engine, 2).await;

    let created = engine
        .create_individual_expense(expense_cmd(&household, category, members[0].id, 40_00))
        .await
        .unwrap();
    assert!(!created.expense.paid);

    let updated = engine
        .mark_split_paid(&household, created.expense.id, members[1].id)
        .await
        .unwrap();
    assert!(updated.splits.iter().all(|s| s.paid));
    assert!(updated.expense.paid);
}

#[tokio::test]
async fn delete_expense_removes_splits_too() {
    let engine = engine_with_db().await;
    let (household, members, category) = household_with_members(&engine, 2).await;

    let created = engine
        .create_individual_expense(expense_cmd(&household, category, members[0].id, 40_00))
        .await
        .unwrap();
    engine
        .delete_expense(&household, created.expense.id)
        .await
        .unwrap();

    assert!(engine.expenses(&household).await.unwrap().is_empty());
    let err = engine
        .expense(&household, created.expense.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn unknown_category_and_inactive_payer_are_not_found() {
    let engine = engine_with_db().await;
    let (household, members, category) = household_with_members(&engine, 2).await;

    let cmd = expense_cmd(&household, Uuid::new_v4(), members[0].id, 10_00);
    let err = engine.create_individual_expense(cmd).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("category".to_string()));

    engine
        .deactivate_member(&household, members[0].id)
        .await
        .unwrap();
    let cmd = expense_cmd(&household, category, members[0].id, 10_00);
    let err = engine.create_individual_expense(cmd).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("member".to_string()));
}

#[tokio::test]
async fn individual_income_has_no_pool_effect() {
    let engine = engine_with_db().await;
    let (household, members, _) = household_with_members(&engine, 2).await;

    engine
        .record_individual_income(IncomeNewCmd {
            household_id: household.clone(),
            member_id: members[0].id,
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            amount: Cents::new(1_000_00),
            income_type: "salary".to_string(),
            allocated_to_month: None,
            created_by: "alice".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(engine.pool_balance(&household).await.unwrap(), Cents::ZERO);
}
