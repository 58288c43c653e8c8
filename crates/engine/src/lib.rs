//! Cassa accounting engine.
//!
//! The engine owns the household accounting state machine: shared-pool
//! balances, per-member personal allowances, reimbursement lifecycle and
//! expense splitting under the two accounting modes. It talks to the store
//! through sea-orm and exposes its operations on [`Engine`].

pub use allowances::{AllowanceOp, PersonalAllowance};
pub use bank::{
    AccountBalance, AuthorizationParams, AuthorizationStart, BankProvider, BankTransactionRecord,
    Institution, TransactionPage,
};
pub use bank_connections::BankConnection;
pub use bank_transactions::BankTransaction;
pub use categories::Category;
pub use commands::{
    AllowanceAdjustCmd, BankConnectionNewCmd, ExpenseNewCmd, HouseholdNewCmd, IncomeNewCmd,
    MemberNewCmd, MemberUpdateCmd, SyncCmd,
};
pub use credentials::MfaCredential;
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseType, ExpenseWithSplits};
pub use households::Household;
pub use incomes::{Income, IncomeProcessed};
pub use members::{AllowanceConfig, HouseholdMember};
pub use mode::{AccountingMode, ModeConfig, ModeValidation};
pub use money::Cents;
pub use ops::{Engine, EngineBuilder, ModeSwitchReport, PoolExpenseOutcome, SyncReport};
pub use passkeys::{
    AuthenticationChallenge, PasskeyVerifier, RegistrationChallenge, StoredCredential,
    VerifiedAuthentication, VerifiedRegistration,
};
pub use pool::SharedPool;
pub use reimbursements::Reimbursement;
pub use session::{BANK_MFA_WINDOW_MS, SessionClaims};
pub use split::{CustomSplit, Participant, SplitPolicy, SplitShare};
pub use splits::ExpenseSplit;
pub use util::MonthKey;

mod allowances;
mod bank;
mod bank_connections;
mod bank_transactions;
mod categories;
mod commands;
mod credentials;
mod currency;
mod error;
mod expenses;
mod households;
mod incomes;
mod members;
pub mod mode;
mod money;
mod ops;
mod passkeys;
mod pool;
mod reimbursements;
mod session;
pub mod split;
mod splits;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
