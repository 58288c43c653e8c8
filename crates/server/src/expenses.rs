//! Expense endpoints for both accounting modes.

use api_types::expense::{ExpenseNew, ExpenseView, PoolExpenseResponse, SplitView};
use api_types::household::HouseholdRef;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, allowances, server::ServerState};
use engine::{
    Cents, CustomSplit, ExpenseNewCmd, ExpenseType, ExpenseWithSplits, SessionClaims, SplitPolicy,
};

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Eur => api_types::Currency::Eur,
    }
}

fn map_currency_in(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Eur => engine::Currency::Eur,
    }
}

pub(crate) fn expense_view(created: ExpenseWithSplits) -> ExpenseView {
    let expense = created.expense;
    ExpenseView {
        id: expense.id,
        household_id: expense.household_id,
        date: expense.date,
        description: expense.description,
        amount_cents: expense.amount.cents(),
        currency: map_currency(expense.currency),
        paid_by: expense.paid_by,
        expense_type: expense.expense_type.as_str().to_string(),
        paid: expense.paid,
        paid_from_pool: expense.paid_from_pool,
        needs_reimbursement: expense.needs_reimbursement,
        splits: created
            .splits
            .into_iter()
            .map(|split| SplitView {
                member_id: split.member_id,
                amount_cents: split.amount.cents(),
                paid: split.paid,
            })
            .collect(),
    }
}

fn expense_cmd(payload: ExpenseNew, created_by: String) -> Result<ExpenseNewCmd, ServerError> {
    let expense_type = ExpenseType::try_from(payload.expense_type.as_str())?;
    let split_type = payload
        .split_type
        .as_deref()
        .map(SplitPolicy::try_from)
        .transpose()?;
    let custom_splits = payload.custom_splits.map(|splits| {
        splits
            .into_iter()
            .map(|split| CustomSplit {
                member_id: split.member_id,
                amount_cents: split.amount_cents,
            })
            .collect()
    });

    Ok(ExpenseNewCmd {
        household_id: payload.household_id,
        date: payload.date,
        description: payload.description,
        category_id: payload.category_id,
        amount: Cents::new(payload.amount_cents),
        currency: payload.currency.map(map_currency_in),
        paid_by: payload.paid_by,
        expense_type,
        split_type,
        custom_splits,
        paid_from_pool: payload.paid_from_pool,
        transaction_id: payload.transaction_id,
        created_by,
    })
}

pub async fn individual_new(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let cmd = expense_cmd(payload, claims.sub)?;
    let created = state.engine.create_individual_expense(cmd).await?;
    Ok(Json(expense_view(created)))
}

pub async fn pool_new(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<PoolExpenseResponse>, ServerError> {
    let cmd = expense_cmd(payload, claims.sub)?;
    let outcome = state.engine.create_pool_expense(cmd).await?;

    Ok(Json(PoolExpenseResponse {
        expense: expense_view(ExpenseWithSplits {
            expense: outcome.expense,
            splits: Vec::new(),
        }),
        reimbursement: outcome.reimbursement.map(allowances::reimbursement_view),
        pool_balance_cents: outcome.pool_balance.cents(),
    }))
}

pub async fn list(
    State(state): State<ServerState>,
    Json(payload): Json<HouseholdRef>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.expenses(&payload.household_id).await?;
    Ok(Json(expenses.into_iter().map(expense_view).collect()))
}

pub async fn pay_split(
    State(state): State<ServerState>,
    Path((expense_id, member_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<HouseholdRef>,
) -> Result<Json<ExpenseView>, ServerError> {
    let updated = state
        .engine
        .mark_split_paid(&payload.household_id, expense_id, member_id)
        .await?;

    Ok(Json(expense_view(updated)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<HouseholdRef>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(&payload.household_id, expense_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
