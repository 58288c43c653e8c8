//! Household member endpoints.

use api_types::member::{AllowanceConfigBody, MemberNew, MemberUpdate, MemberView};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{AllowanceConfig, Cents, HouseholdMember, MemberNewCmd, MemberUpdateCmd};

pub(crate) fn member_view(member: HouseholdMember) -> MemberView {
    MemberView {
        id: member.id,
        name: member.name,
        is_active: member.is_active,
        split_ratio: member.split_ratio,
    }
}

pub(crate) fn map_allowance_config(
    body: AllowanceConfigBody,
) -> Result<AllowanceConfig, ServerError> {
    match body.kind.as_str() {
        "percentage" => body
            .percentage
            .map(AllowanceConfig::Percentage)
            .ok_or_else(|| {
                ServerError::Generic("percentage allowance requires a percentage".to_string())
            }),
        "fixed" => body
            .fixed_cents
            .map(|cents| AllowanceConfig::Fixed(Cents::new(cents)))
            .ok_or_else(|| {
                ServerError::Generic("fixed allowance requires fixed_cents".to_string())
            }),
        other => Err(ServerError::Generic(format!(
            "invalid allowance kind: {other}"
        ))),
    }
}

pub async fn member_new(
    State(state): State<ServerState>,
    Path(household_id): Path<String>,
    Json(payload): Json<MemberNew>,
) -> Result<Json<MemberView>, ServerError> {
    let allowance = payload.allowance.map(map_allowance_config).transpose()?;
    let member = state
        .engine
        .add_member(MemberNewCmd {
            household_id,
            name: payload.name,
            split_ratio: payload.split_ratio,
            allowance,
        })
        .await?;

    Ok(Json(member_view(member)))
}

#[derive(Deserialize)]
pub struct MembersQuery {
    pub include_inactive: Option<bool>,
}

pub async fn list(
    State(state): State<ServerState>,
    Path(household_id): Path<String>,
    Query(query): Query<MembersQuery>,
) -> Result<Json<Vec<MemberView>>, ServerError> {
    let members = state
        .engine
        .members(&household_id, query.include_inactive.unwrap_or(false))
        .await?;

    Ok(Json(members.into_iter().map(member_view).collect()))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<MemberUpdate>,
) -> Result<Json<MemberView>, ServerError> {
    let allowance = payload.allowance.map(map_allowance_config).transpose()?;
    let member = state
        .engine
        .update_member(
            &payload.household_id,
            member_id,
            MemberUpdateCmd {
                split_ratio: payload.split_ratio,
                allowance,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(member_view(member)))
}
