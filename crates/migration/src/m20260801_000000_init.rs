//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Cassa:
//!
//! - `users`: authentication
//! - `households`: accounting mode and expense defaults, keyed explicitly
//! - `household_members`: members with split ratio and allowance config
//! - `categories`: expense categories
//! - `expenses` / `expense_splits`: expenses and their per-member splits
//! - `incomes`: income events
//! - `personal_allowances`: per-member, per-month discretionary budgets
//! - `shared_pools`: one running balance per household
//! - `reimbursements`: debts for shared expenses paid out of pocket
//! - `bank_connections` / `bank_transactions`: aggregator links and imports
//! - `mfa_credentials`: registered passkeys

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Households {
    Table,
    Id,
    Name,
    Owner,
    AccountingMode,
    DefaultPaidBy,
    DefaultExpenseType,
    DefaultSplitType,
}

#[derive(Iden)]
enum HouseholdMembers {
    Table,
    Id,
    HouseholdId,
    Name,
    IsActive,
    SplitRatio,
    AllowanceKind,
    AllowancePct,
    AllowanceFixedCents,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    HouseholdId,
    Name,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    HouseholdId,
    Date,
    Description,
    CategoryId,
    AmountCents,
    Currency,
    PaidBy,
    ExpenseType,
    Paid,
    PaidFromPool,
    NeedsReimbursement,
    CreatedBy,
}

#[derive(Iden)]
enum ExpenseSplits {
    Table,
    Id,
    ExpenseId,
    MemberId,
    AmountCents,
    Paid,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    HouseholdId,
    MemberId,
    Date,
    AmountCents,
    IncomeType,
    AllocatedToMonth,
    CreatedBy,
}

#[derive(Iden)]
enum PersonalAllowances {
    Table,
    Id,
    HouseholdId,
    MemberId,
    Month,
    AllocatedCents,
    SpentCents,
    RemainingCents,
    CarriedToCents,
}

#[derive(Iden)]
enum SharedPools {
    Table,
    HouseholdId,
    BalanceCents,
}

#[derive(Iden)]
enum Reimbursements {
    Table,
    Id,
    ExpenseId,
    MemberId,
    AmountCents,
    Settled,
    SettledAt,
}

#[derive(Iden)]
enum BankConnections {
    Table,
    Id,
    HouseholdId,
    Provider,
    InstitutionName,
    ProviderSessionId,
    AccountRef,
    CreatedBy,
}

#[derive(Iden)]
enum BankTransactions {
    Table,
    Id,
    HouseholdId,
    ConnectionId,
    ExternalId,
    AccountId,
    Date,
    Description,
    AmountCents,
    Currency,
    LinkedToExpense,
}

#[derive(Iden)]
enum MfaCredentials {
    Table,
    Id,
    UserId,
    CredentialId,
    PublicKey,
    SignCount,
    Label,
    IsActive,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Households
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Households::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Households::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Households::Name).string().not_null())
                    .col(ColumnDef::new(Households::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Households::AccountingMode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Households::DefaultPaidBy).string())
                    .col(
                        ColumnDef::new(Households::DefaultExpenseType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Households::DefaultSplitType)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-households-owner")
                            .from(Households::Table, Households::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Household members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(HouseholdMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HouseholdMembers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HouseholdMembers::HouseholdId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HouseholdMembers::Name).string().not_null())
                    .col(
                        ColumnDef::new(HouseholdMembers::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseholdMembers::SplitRatio)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseholdMembers::AllowanceKind)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HouseholdMembers::AllowancePct).double())
                    .col(ColumnDef::new(HouseholdMembers::AllowanceFixedCents).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-household_members-household_id")
                            .from(HouseholdMembers::Table, HouseholdMembers::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-household_members-household_id")
                    .table(HouseholdMembers::Table)
                    .col(HouseholdMembers::HouseholdId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::HouseholdId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-household_id")
                            .from(Categories::Table, Categories::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::HouseholdId).string().not_null())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Currency).string().not_null())
                    .col(ColumnDef::new(Expenses::PaidBy).string().not_null())
                    .col(ColumnDef::new(Expenses::ExpenseType).string().not_null())
                    .col(ColumnDef::new(Expenses::Paid).boolean().not_null())
                    .col(ColumnDef::new(Expenses::PaidFromPool).boolean().not_null())
                    .col(
                        ColumnDef::new(Expenses::NeedsReimbursement)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-household_id")
                            .from(Expenses::Table, Expenses::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-paid_by")
                            .from(Expenses::Table, Expenses::PaidBy)
                            .to(HouseholdMembers::Table, HouseholdMembers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-household_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::HouseholdId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Expense splits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseSplits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseSplits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseSplits::ExpenseId).string().not_null())
                    .col(ColumnDef::new(ExpenseSplits::MemberId).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseSplits::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseSplits::Paid).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_splits-expense_id")
                            .from(ExpenseSplits::Table, ExpenseSplits::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_splits-member_id")
                            .from(ExpenseSplits::Table, ExpenseSplits::MemberId)
                            .to(HouseholdMembers::Table, HouseholdMembers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_splits-expense_id")
                    .table(ExpenseSplits::Table)
                    .col(ExpenseSplits::ExpenseId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Incomes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incomes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incomes::HouseholdId).string().not_null())
                    .col(ColumnDef::new(Incomes::MemberId).string().not_null())
                    .col(ColumnDef::new(Incomes::Date).date().not_null())
                    .col(
                        ColumnDef::new(Incomes::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Incomes::IncomeType).string().not_null())
                    .col(ColumnDef::new(Incomes::AllocatedToMonth).string())
                    .col(ColumnDef::new(Incomes::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-household_id")
                            .from(Incomes::Table, Incomes::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-member_id")
                            .from(Incomes::Table, Incomes::MemberId)
                            .to(HouseholdMembers::Table, HouseholdMembers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-household_id-date")
                    .table(Incomes::Table)
                    .col(Incomes::HouseholdId)
                    .col(Incomes::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Personal allowances
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PersonalAllowances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonalAllowances::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PersonalAllowances::HouseholdId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonalAllowances::MemberId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PersonalAllowances::Month).string().not_null())
                    .col(
                        ColumnDef::new(PersonalAllowances::AllocatedCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonalAllowances::SpentCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonalAllowances::RemainingCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PersonalAllowances::CarriedToCents).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-personal_allowances-member_id")
                            .from(PersonalAllowances::Table, PersonalAllowances::MemberId)
                            .to(HouseholdMembers::Table, HouseholdMembers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-personal_allowances-member_id-month-unique")
                    .table(PersonalAllowances::Table)
                    .col(PersonalAllowances::MemberId)
                    .col(PersonalAllowances::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Shared pools
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SharedPools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SharedPools::HouseholdId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SharedPools::BalanceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shared_pools-household_id")
                            .from(SharedPools::Table, SharedPools::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Reimbursements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Reimbursements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reimbursements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reimbursements::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reimbursements::MemberId).string().not_null())
                    .col(
                        ColumnDef::new(Reimbursements::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reimbursements::Settled).boolean().not_null())
                    .col(ColumnDef::new(Reimbursements::SettledAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reimbursements-expense_id")
                            .from(Reimbursements::Table, Reimbursements::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reimbursements-expense_id-unique")
                    .table(Reimbursements::Table)
                    .col(Reimbursements::ExpenseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Bank connections
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankConnections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankConnections::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BankConnections::HouseholdId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankConnections::Provider).string().not_null())
                    .col(
                        ColumnDef::new(BankConnections::InstitutionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankConnections::ProviderSessionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankConnections::AccountRef)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankConnections::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_connections-household_id")
                            .from(BankConnections::Table, BankConnections::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 12. Bank transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::HouseholdId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::ConnectionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::ExternalId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankTransactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(BankTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::Currency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::LinkedToExpense)
                            .boolean()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_transactions-connection_id")
                            .from(BankTransactions::Table, BankTransactions::ConnectionId)
                            .to(BankConnections::Table, BankConnections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_transactions-external_id-account_id-unique")
                    .table(BankTransactions::Table)
                    .col(BankTransactions::ExternalId)
                    .col(BankTransactions::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 13. MFA credentials
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MfaCredentials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MfaCredentials::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MfaCredentials::UserId).string().not_null())
                    .col(
                        ColumnDef::new(MfaCredentials::CredentialId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MfaCredentials::PublicKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MfaCredentials::SignCount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MfaCredentials::Label).string())
                    .col(ColumnDef::new(MfaCredentials::IsActive).boolean().not_null())
                    .col(
                        ColumnDef::new(MfaCredentials::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mfa_credentials-user_id")
                            .from(MfaCredentials::Table, MfaCredentials::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-mfa_credentials-user_id-credential_id-unique")
                    .table(MfaCredentials::Table)
                    .col(MfaCredentials::UserId)
                    .col(MfaCredentials::CredentialId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MfaCredentials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankConnections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reimbursements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SharedPools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonalAllowances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseSplits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HouseholdMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Households::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
