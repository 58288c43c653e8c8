//! Allowance, pool balance and reimbursement endpoints.

use api_types::allowance::{AllowanceAdjust, AllowanceView, RolloverBody};
use api_types::household::HouseholdRef;
use api_types::pool::PoolView;
use api_types::reimbursement::{ReimbursementList, ReimbursementView, SettleBody};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{AllowanceAdjustCmd, AllowanceOp, Cents, MonthKey, PersonalAllowance, Reimbursement};

fn allowance_view(allowance: PersonalAllowance) -> AllowanceView {
    AllowanceView {
        member_id: allowance.member_id,
        month: allowance.month.to_string(),
        allocated_cents: allowance.allocated.cents(),
        spent_cents: allowance.spent.cents(),
        remaining_cents: allowance.remaining.cents(),
        carried_to_cents: allowance.carried_to.map(Cents::cents),
    }
}

pub(crate) fn reimbursement_view(reimbursement: Reimbursement) -> ReimbursementView {
    ReimbursementView {
        id: reimbursement.id,
        expense_id: reimbursement.expense_id,
        member_id: reimbursement.member_id,
        amount_cents: reimbursement.amount.cents(),
        settled: reimbursement.settled,
    }
}

pub async fn adjust(
    State(state): State<ServerState>,
    Path((member_id, month)): Path<(Uuid, String)>,
    Json(payload): Json<AllowanceAdjust>,
) -> Result<Json<AllowanceView>, ServerError> {
    let month = MonthKey::parse(&month)?;
    let op = AllowanceOp::try_from(payload.op.as_str())?;
    let allowance = state
        .engine
        .adjust_allowance(AllowanceAdjustCmd {
            household_id: payload.household_id,
            member_id,
            month,
            amount: Cents::new(payload.amount_cents),
            op,
        })
        .await?;

    Ok(Json(allowance_view(allowance)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path((member_id, month)): Path<(Uuid, String)>,
    Json(payload): Json<HouseholdRef>,
) -> Result<Json<AllowanceView>, ServerError> {
    let month = MonthKey::parse(&month)?;
    let allowance = state
        .engine
        .allowance(&payload.household_id, member_id, month)
        .await?;

    Ok(Json(allowance_view(allowance)))
}

pub async fn rollover(
    State(state): State<ServerState>,
    Path((member_id, month)): Path<(Uuid, String)>,
    Json(payload): Json<RolloverBody>,
) -> Result<Json<AllowanceView>, ServerError> {
    let month = MonthKey::parse(&month)?;
    let allowance = state
        .engine
        .rollover_allowance(&payload.household_id, member_id, month)
        .await?;

    Ok(Json(allowance_view(allowance)))
}

pub async fn pool(
    State(state): State<ServerState>,
    Path(household_id): Path<String>,
) -> Result<Json<PoolView>, ServerError> {
    let balance = state.engine.pool_balance(&household_id).await?;
    Ok(Json(PoolView {
        household_id,
        balance_cents: balance.cents(),
    }))
}

pub async fn reimbursements(
    State(state): State<ServerState>,
    Json(payload): Json<ReimbursementList>,
) -> Result<Json<Vec<ReimbursementView>>, ServerError> {
    let reimbursements = state
        .engine
        .reimbursements(
            &payload.household_id,
            payload.unsettled_only.unwrap_or(false),
        )
        .await?;

    Ok(Json(
        reimbursements.into_iter().map(reimbursement_view).collect(),
    ))
}

pub async fn settle(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SettleBody>,
) -> Result<Json<ReimbursementView>, ServerError> {
    let settled = state
        .engine
        .settle_reimbursement(&payload.household_id, id)
        .await?;

    Ok(Json(reimbursement_view(settled)))
}
