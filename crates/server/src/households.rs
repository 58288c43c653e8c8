//! Household and category endpoints, plus the one-way mode switch.

use api_types::household::{
    CategoryNew, CategoryView, HouseholdNew, HouseholdView, ModeConfigView, ModeSwitchResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};
use engine::{
    AccountingMode, Category, Household, HouseholdNewCmd, SessionClaims,
    mode::{self, ModeFeature},
};

fn household_view(household: Household) -> HouseholdView {
    HouseholdView {
        id: household.id,
        name: household.name,
        owner: household.owner,
        accounting_mode: household.accounting_mode.as_str().to_string(),
    }
}

fn category_view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
    }
}

fn feature_name(feature: ModeFeature) -> &'static str {
    match feature {
        ModeFeature::ExpenseSplits => "expense_splits",
        ModeFeature::DebtTracking => "debt_tracking",
        ModeFeature::SharedPool => "shared_pool",
        ModeFeature::PersonalAllowances => "personal_allowances",
        ModeFeature::Reimbursements => "reimbursements",
    }
}

pub async fn household_new(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<HouseholdNew>,
) -> Result<Json<HouseholdView>, ServerError> {
    let accounting_mode = AccountingMode::try_from(payload.accounting_mode.as_str())?;
    let household = state
        .engine
        .create_household(HouseholdNewCmd {
            name: payload.name,
            owner: claims.sub,
            accounting_mode,
        })
        .await?;

    Ok(Json(household_view(household)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<HouseholdView>, ServerError> {
    let household = state.engine.household(&id).await?;
    Ok(Json(household_view(household)))
}

/// The mode policy for a household: enabled features, where expense and
/// income creation route, and UI gating hints.
pub async fn mode(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ModeConfigView>, ServerError> {
    let household = state.engine.household(&id).await?;
    let config = mode::config(household.accounting_mode);

    Ok(Json(ModeConfigView {
        accounting_mode: household.accounting_mode.as_str().to_string(),
        features: config
            .features
            .iter()
            .map(|f| feature_name(*f).to_string())
            .collect(),
        expenses_endpoint: config.endpoints.expenses.to_string(),
        income_endpoint: config.endpoints.income.to_string(),
        show_split_editor: config.ui.show_split_editor,
        show_pool_balance: config.ui.show_pool_balance,
        show_allowances: config.ui.show_allowances,
    }))
}

pub async fn category_new(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryNew>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.create_category(&id, &payload.name).await?;
    Ok(Json(category_view(category)))
}

pub async fn categories(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.categories(&id).await?;
    Ok(Json(categories.into_iter().map(category_view).collect()))
}

pub async fn switch_to_pool(
    State(state): State<ServerState>,
    Path(household_id): Path<String>,
) -> Result<Json<ModeSwitchResponse>, ServerError> {
    let report = state.engine.switch_to_shared_pool(&household_id).await?;
    Ok(Json(ModeSwitchResponse {
        household_id: report.household_id,
        incomes_replayed: report.incomes_replayed,
        pool_balance_cents: report.pool_balance.cents(),
    }))
}
