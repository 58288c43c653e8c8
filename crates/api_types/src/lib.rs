use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
}

pub mod session {
    use super::*;

    /// Response body for a login: the signed bearer token plus the claims
    /// snapshot the client may display.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionResponse {
        pub token: String,
        pub mfa_verified: bool,
        /// Epoch milliseconds of the last bank step-up, when armed.
        pub bank_mfa_verified_at: Option<i64>,
    }
}

pub mod mfa {
    use super::*;

    /// Response of a ceremony start: the options the client passes to the
    /// authenticator, plus the re-issued token carrying the challenge.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegistrationStartResponse {
        pub token: String,
        pub challenge: String,
        pub rp_id: String,
        pub user_id: String,
        pub exclude_credential_ids: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegistrationFinish {
        pub response_json: String,
        pub label: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegistrationFinishResponse {
        pub token: String,
        pub method: MethodView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthenticationStartResponse {
        pub token: String,
        pub challenge: String,
        pub rp_id: String,
        pub allow_credential_ids: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthenticationFinish {
        pub credential_id: String,
        pub response_json: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MethodView {
        pub id: Uuid,
        pub credential_id: String,
        pub label: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MethodsResponse {
        pub methods: Vec<MethodView>,
    }
}

pub mod household {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HouseholdNew {
        pub name: String,
        pub accounting_mode: String,
    }

    /// Household scoping body for routes addressed by a child resource id.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct HouseholdRef {
        pub household_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HouseholdView {
        pub id: String,
        pub name: String,
        pub owner: String,
        pub accounting_mode: String,
    }

    /// The mode policy as served to clients: enabled features, where
    /// expense/income creation routes, and UI gating hints.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ModeConfigView {
        pub accounting_mode: String,
        pub features: Vec<String>,
        pub expenses_endpoint: String,
        pub income_endpoint: String,
        pub show_split_editor: bool,
        pub show_pool_balance: bool,
        pub show_allowances: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ModeSwitchResponse {
        pub household_id: String,
        pub incomes_replayed: usize,
        pub pool_balance_cents: i64,
    }
}

pub mod member {
    use super::*;

    /// Allowance config in wire form; `kind` is "percentage" or "fixed".
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AllowanceConfigBody {
        pub kind: String,
        pub percentage: Option<f64>,
        pub fixed_cents: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub name: String,
        pub split_ratio: Option<f64>,
        pub allowance: Option<AllowanceConfigBody>,
    }

    /// Partial update; absent fields stay untouched.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberUpdate {
        pub household_id: String,
        pub split_ratio: Option<f64>,
        pub allowance: Option<AllowanceConfigBody>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub name: String,
        pub is_active: bool,
        pub split_ratio: f64,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomSplitBody {
        pub member_id: Uuid,
        pub amount_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub household_id: String,
        pub date: NaiveDate,
        pub description: String,
        pub category_id: Uuid,
        pub amount_cents: i64,
        pub currency: Option<Currency>,
        pub paid_by: Uuid,
        /// "personal" or "shared".
        pub expense_type: String,
        /// "equal", "ratio" or "custom" (individual mode).
        pub split_type: Option<String>,
        pub custom_splits: Option<Vec<CustomSplitBody>>,
        /// Required in shared-pool mode.
        pub paid_from_pool: Option<bool>,
        /// Imported bank transaction to link.
        pub transaction_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub member_id: Uuid,
        pub amount_cents: i64,
        pub paid: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub household_id: String,
        pub date: NaiveDate,
        pub description: String,
        pub amount_cents: i64,
        pub currency: Currency,
        pub paid_by: Uuid,
        pub expense_type: String,
        pub paid: bool,
        pub paid_from_pool: bool,
        pub needs_reimbursement: bool,
        pub splits: Vec<SplitView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolExpenseResponse {
        pub expense: ExpenseView,
        pub reimbursement: Option<super::reimbursement::ReimbursementView>,
        pub pool_balance_cents: i64,
    }
}

pub mod income {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub household_id: String,
        pub member_id: Uuid,
        pub date: NaiveDate,
        pub amount_cents: i64,
        pub income_type: String,
        /// Explicit "YYYY-MM" override of the accrual month.
        pub allocated_to_month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: Uuid,
        pub member_id: Uuid,
        pub date: NaiveDate,
        pub amount_cents: i64,
        pub income_type: String,
    }

    /// Outcome of routing an income through the shared pool.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeProcessedView {
        pub income_id: Uuid,
        pub month: String,
        pub allowance_allocated_cents: i64,
        pub pool_contribution_cents: i64,
        pub pool_balance_cents: i64,
    }
}

pub mod allowance {
    use super::*;

    /// Spend/refund adjustment body; `op` is "spend" or "refund".
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllowanceAdjust {
        pub household_id: String,
        pub amount_cents: i64,
        pub op: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RolloverBody {
        pub household_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllowanceView {
        pub member_id: Uuid,
        pub month: String,
        pub allocated_cents: i64,
        pub spent_cents: i64,
        pub remaining_cents: i64,
        pub carried_to_cents: Option<i64>,
    }
}

pub mod pool {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolView {
        pub household_id: String,
        pub balance_cents: i64,
    }
}

pub mod reimbursement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleBody {
        pub household_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReimbursementList {
        pub household_id: String,
        pub unsettled_only: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReimbursementView {
        pub id: Uuid,
        pub expense_id: Uuid,
        pub member_id: Uuid,
        pub amount_cents: i64,
        pub settled: bool,
    }
}

pub mod bank {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstitutionView {
        pub id: String,
        pub name: String,
        pub country: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthorizationNew {
        pub institution_id: String,
        pub redirect_url: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthorizationView {
        pub provider_session_id: String,
        pub consent_url: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConnectionNew {
        pub household_id: String,
        pub provider: String,
        pub institution_name: String,
        pub provider_session_id: String,
        pub account_ref: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConnectionView {
        pub id: Uuid,
        pub household_id: String,
        pub provider: String,
        pub institution_name: String,
        pub account_ref: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncRequest {
        pub household_id: String,
        pub date_from: NaiveDate,
        pub date_to: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncReportView {
        pub fetched: usize,
        pub inserted: usize,
        pub duplicates: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsList {
        pub household_id: String,
        pub unlinked_only: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkRequest {
        pub household_id: String,
        pub expense_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub account_ref: String,
        pub amount_cents: i64,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub external_id: String,
        pub account_id: String,
        pub date: NaiveDate,
        pub description: String,
        pub amount_cents: i64,
        pub linked_to_expense: bool,
    }
}
