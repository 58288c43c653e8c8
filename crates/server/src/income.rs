//! Income endpoints: plain recording in individual mode, allowance/pool
//! allocation in shared-pool mode.

use api_types::income::{IncomeNew, IncomeProcessedView, IncomeView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::{Cents, IncomeNewCmd, MonthKey, SessionClaims};

fn income_cmd(payload: IncomeNew, created_by: String) -> Result<IncomeNewCmd, ServerError> {
    let allocated_to_month = payload
        .allocated_to_month
        .as_deref()
        .map(MonthKey::parse)
        .transpose()?;

    Ok(IncomeNewCmd {
        household_id: payload.household_id,
        member_id: payload.member_id,
        date: payload.date,
        amount: Cents::new(payload.amount_cents),
        income_type: payload.income_type,
        allocated_to_month,
        created_by,
    })
}

pub async fn individual_new(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<Json<IncomeView>, ServerError> {
    let cmd = income_cmd(payload, claims.sub)?;
    let income = state.engine.record_individual_income(cmd).await?;

    Ok(Json(IncomeView {
        id: income.id,
        member_id: income.member_id,
        date: income.date,
        amount_cents: income.amount.cents(),
        income_type: income.income_type,
    }))
}

pub async fn pool_new(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<Json<IncomeProcessedView>, ServerError> {
    let cmd = income_cmd(payload, claims.sub)?;
    let processed = state.engine.process_income_for_shared_pool(cmd).await?;

    Ok(Json(IncomeProcessedView {
        income_id: processed.income_id,
        month: processed.month.to_string(),
        allowance_allocated_cents: processed.allowance_allocated.cents(),
        pool_contribution_cents: processed.pool_contribution.cents(),
        pool_balance_cents: processed.pool_balance.cents(),
    }))
}
