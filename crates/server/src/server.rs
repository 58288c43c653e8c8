use axum::{
    Extension, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{
    ServerError, allowances, bank, expenses, households, income, members, mfa, token, user,
};
use engine::{BankProvider, Engine, PasskeyVerifier, SessionClaims};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub bank: Arc<dyn BankProvider>,
    pub passkeys: Arc<dyn PasskeyVerifier>,
    pub signing_key: Arc<Vec<u8>>,
    pub rp_id: String,
}

impl ServerState {
    pub fn new(
        engine: Engine,
        db: DatabaseConnection,
        bank: Arc<dyn BankProvider>,
        passkeys: Arc<dyn PasskeyVerifier>,
        signing_key: Vec<u8>,
        rp_id: String,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            db,
            bank,
            passkeys,
            signing_key: Arc::new(signing_key),
            rp_id,
        }
    }
}

/// Decodes and verifies the bearer token, making the session claims
/// available to handlers as an extension.
async fn auth(
    State(state): State<ServerState>,
    bearer: TypedHeader<Authorization<Bearer>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let claims = token::verify(bearer.token(), &state.signing_key, Utc::now())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Step-up gate in front of the bank routes. Fails closed: no verified MFA
/// or a stale step-up window rejects the request before any handler runs.
async fn bank_gate(
    Extension(claims): Extension<SessionClaims>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    claims.check_bank_operation(Utc::now())?;
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let gated = Router::new()
        .route("/bank/institutions", get(bank::institutions))
        .route("/bank/authorizations", post(bank::authorization_new))
        .route(
            "/bank/connections",
            post(bank::connection_new).get(bank::connections),
        )
        .route("/bank/connections/{id}", delete(bank::connection_delete))
        .route("/bank/connections/{id}/sync", post(bank::sync))
        .route("/bank/connections/{id}/balance", get(bank::balance))
        .route("/bank/transactions", get(bank::transactions))
        .route("/bank/transactions/{id}/link", post(bank::link))
        .route_layer(middleware::from_fn(bank_gate));

    Router::new()
        .route("/mfa/register/start", post(mfa::register_start))
        .route("/mfa/register/finish", post(mfa::register_finish))
        .route("/mfa/authenticate/start", post(mfa::authenticate_start))
        .route("/mfa/authenticate/finish", post(mfa::authenticate_finish))
        .route("/mfa/methods", get(mfa::methods))
        .route("/mfa/methods/{id}", delete(mfa::remove_method))
        .route("/households", post(households::household_new))
        .route("/households/{id}", get(households::get))
        .route("/households/{id}/mode", get(households::mode))
        .route(
            "/households/{id}/categories",
            post(households::category_new).get(households::categories),
        )
        .route(
            "/households/{id}/members",
            post(members::member_new).get(members::list),
        )
        .route("/members/{id}", patch(members::update))
        .route("/expenses", get(expenses::list))
        .route("/expenses/individual", post(expenses::individual_new))
        .route("/expenses/pool", post(expenses::pool_new))
        .route("/expenses/{id}", delete(expenses::remove))
        .route(
            "/expenses/{id}/splits/{member_id}/pay",
            post(expenses::pay_split),
        )
        .route("/income/individual", post(income::individual_new))
        .route("/income/pool", post(income::pool_new))
        .route(
            "/allowances/{member_id}/{month}",
            put(allowances::adjust).get(allowances::get),
        )
        .route(
            "/allowances/{member_id}/{month}/rollover",
            post(allowances::rollover),
        )
        .route("/pool/{household_id}", get(allowances::pool))
        .route("/reimbursements", get(allowances::reimbursements))
        .route("/reimbursements/{id}/settle", post(allowances::settle))
        .route(
            "/settings/{household_id}/switch-to-pool",
            post(households::switch_to_pool),
        )
        .merge(gated)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/session/login", post(user::login))
        .with_state(state)
}

pub async fn run(state: ServerState) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
