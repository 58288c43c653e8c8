//! Bank aggregator endpoints. Everything here sits behind the step-up gate.

use api_types::bank::{
    AuthorizationNew, AuthorizationView, BalanceView, ConnectionNew, ConnectionView,
    InstitutionView, LinkRequest, SyncReportView, SyncRequest, TransactionView, TransactionsList,
};
use api_types::household::HouseholdRef;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, expenses::map_currency, server::ServerState};
use engine::{
    AuthorizationParams, BankConnection, BankConnectionNewCmd, BankTransaction, SessionClaims,
    SyncCmd,
};

fn connection_view(connection: BankConnection) -> ConnectionView {
    ConnectionView {
        id: connection.id,
        household_id: connection.household_id,
        provider: connection.provider,
        institution_name: connection.institution_name,
        account_ref: connection.account_ref,
    }
}

fn transaction_view(transaction: BankTransaction) -> TransactionView {
    TransactionView {
        id: transaction.id,
        external_id: transaction.external_id,
        account_id: transaction.account_id,
        date: transaction.date,
        description: transaction.description,
        amount_cents: transaction.amount.cents(),
        linked_to_expense: transaction.linked_to_expense,
    }
}

#[derive(Deserialize)]
pub struct InstitutionsQuery {
    pub country: String,
}

pub async fn institutions(
    State(state): State<ServerState>,
    Query(query): Query<InstitutionsQuery>,
) -> Result<Json<Vec<InstitutionView>>, ServerError> {
    let institutions = state.bank.list_institutions(&query.country).await?;
    Ok(Json(
        institutions
            .into_iter()
            .map(|i| InstitutionView {
                id: i.id,
                name: i.name,
                country: i.country,
            })
            .collect(),
    ))
}

pub async fn authorization_new(
    State(state): State<ServerState>,
    Json(payload): Json<AuthorizationNew>,
) -> Result<Json<AuthorizationView>, ServerError> {
    let started = state
        .bank
        .start_authorization(AuthorizationParams {
            institution_id: payload.institution_id,
            redirect_url: payload.redirect_url,
        })
        .await?;

    Ok(Json(AuthorizationView {
        provider_session_id: started.provider_session_id,
        consent_url: started.consent_url,
    }))
}

pub async fn connection_new(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<ServerState>,
    Json(payload): Json<ConnectionNew>,
) -> Result<Json<ConnectionView>, ServerError> {
    let connection = state
        .engine
        .create_bank_connection(BankConnectionNewCmd {
            household_id: payload.household_id,
            provider: payload.provider,
            institution_name: payload.institution_name,
            provider_session_id: payload.provider_session_id,
            account_ref: payload.account_ref,
            created_by: claims.sub,
        })
        .await?;

    Ok(Json(connection_view(connection)))
}

pub async fn connections(
    State(state): State<ServerState>,
    Json(payload): Json<HouseholdRef>,
) -> Result<Json<Vec<ConnectionView>>, ServerError> {
    let connections = state.engine.bank_connections(&payload.household_id).await?;
    Ok(Json(connections.into_iter().map(connection_view).collect()))
}

pub async fn connection_delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HouseholdRef>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_bank_connection(&payload.household_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn sync(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SyncRequest>,
) -> Result<Json<SyncReportView>, ServerError> {
    let report = state
        .engine
        .sync_transactions(
            state.bank.as_ref(),
            &payload.household_id,
            SyncCmd {
                connection_id: id,
                date_from: payload.date_from,
                date_to: payload.date_to,
            },
        )
        .await?;

    Ok(Json(SyncReportView {
        fetched: report.fetched,
        inserted: report.inserted,
        duplicates: report.duplicates,
    }))
}

pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HouseholdRef>,
) -> Result<Json<BalanceView>, ServerError> {
    let connection = state
        .engine
        .bank_connection(&payload.household_id, id)
        .await?;
    let balance = state
        .bank
        .fetch_account_balance(&connection.account_ref)
        .await?;

    Ok(Json(BalanceView {
        account_ref: balance.account_ref,
        amount_cents: balance.amount.cents(),
        currency: map_currency(balance.currency),
    }))
}

pub async fn transactions(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionsList>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let transactions = state
        .engine
        .bank_transactions(
            &payload.household_id,
            payload.unlinked_only.unwrap_or(false),
        )
        .await?;

    Ok(Json(transactions.into_iter().map(transaction_view).collect()))
}

pub async fn link(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinkRequest>,
) -> Result<Json<TransactionView>, ServerError> {
    let linked = state
        .engine
        .link_transaction(&payload.household_id, id, payload.expense_id)
        .await?;

    Ok(Json(transaction_view(linked)))
}
