use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, run, run_with_listener, spawn_with_listener};

mod allowances;
mod bank;
mod expenses;
mod households;
mod income;
mod members;
mod mfa;
mod server;
mod token;
mod user;

pub mod types {
    pub mod session {
        pub use api_types::session::SessionResponse;
    }

    pub mod mfa {
        pub use api_types::mfa::{
            AuthenticationFinish, AuthenticationStartResponse, MethodView, MethodsResponse,
            RegistrationFinish, RegistrationFinishResponse, RegistrationStartResponse,
        };
    }

    pub mod household {
        pub use api_types::household::{
            CategoryNew, CategoryView, HouseholdNew, HouseholdRef, HouseholdView, ModeConfigView,
            ModeSwitchResponse,
        };
    }

    pub mod member {
        pub use api_types::member::{AllowanceConfigBody, MemberNew, MemberUpdate, MemberView};
    }

    pub mod expense {
        pub use api_types::expense::{
            CustomSplitBody, ExpenseNew, ExpenseView, PoolExpenseResponse, SplitView,
        };
    }

    pub mod income {
        pub use api_types::income::{IncomeNew, IncomeProcessedView, IncomeView};
    }

    pub mod allowance {
        pub use api_types::allowance::{AllowanceAdjust, AllowanceView, RolloverBody};
        pub use api_types::pool::PoolView;
        pub use api_types::reimbursement::{ReimbursementList, ReimbursementView, SettleBody};
    }

    pub mod bank {
        pub use api_types::bank::{
            AuthorizationNew, AuthorizationView, BalanceView, ConnectionNew, ConnectionView,
            InstitutionView, LinkRequest, SyncReportView, SyncRequest, TransactionView,
            TransactionsList,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::BankMfaRequired | EngineError::BankMfaExpired => StatusCode::FORBIDDEN,
        EngineError::Validation(_) | EngineError::SplitMismatch(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Consistency(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Consistency(detail) => {
            tracing::error!("consistency violation: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, code) = match self {
            ServerError::Engine(err) => {
                let code = err.authorization_code();
                (status_for_engine_error(&err), message_for_engine_error(err), code)
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err, None),
        };

        (status, Json(Error { error, code })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_unauthorized_maps_to_401() {
        let res =
            ServerError::from(EngineError::Unauthorized("nope".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_split_mismatch_maps_to_422() {
        let res = ServerError::from(EngineError::SplitMismatch("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_consistency_maps_to_500() {
        let res = ServerError::from(EngineError::Consistency("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn step_up_errors_carry_machine_codes() {
        for (err, code) in [
            (EngineError::BankMfaRequired, "BANK_MFA_REQUIRED"),
            (EngineError::BankMfaExpired, "BANK_MFA_EXPIRED"),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::FORBIDDEN);
            let bytes = res.into_body().collect().await.unwrap().to_bytes();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["code"], code);
        }
    }

    #[tokio::test]
    async fn database_errors_are_redacted() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("secret detail".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
    }
}
