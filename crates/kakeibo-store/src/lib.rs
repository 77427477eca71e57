//! Relational storage for kakeibo
//!
//! The [`Store`] trait is the record-fetch and member-list interface used by
//! the core, plus the plain insert/update/read operations behind the forms.
//! [`SqliteStore`] is the sqlx-backed implementation.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod sqlite;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
pub use types::{
    Category, CategoryKind, DatedAmount, Expense, ExpenseDetail, FixedExpense, Household,
    HouseholdSeed, Income, IncomeDetail, Invitation, InvitationStatus, Member, NewExpense,
    NewFixedExpense, NewIncome, PendingInvitation, Tag, User,
};

/// Store reference type
pub type StoreRef = Arc<dyn Store>;

/// Storage operations
///
/// Month arguments are zero-padded "YYYY-MM" strings; records match when
/// their date starts with `month + "-"`.
#[async_trait]
pub trait Store: Send + Sync {
    // ---- users ----

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, name: &str, email: &str) -> StoreResult<User>;

    // ---- households and members ----

    async fn household(&self, id: &str) -> StoreResult<Option<Household>>;

    /// Households the user belongs to, in join order
    async fn households_for_user(&self, user_id: &str) -> StoreResult<Vec<Household>>;

    /// Create a household with seeded categories/tags and the creator as owner
    async fn create_household(&self, name: &str, owner_id: &str, seed: &HouseholdSeed) -> StoreResult<Household>;

    /// Membership of one user, if any
    async fn membership(&self, household_id: &str, user_id: &str) -> StoreResult<Option<Member>>;

    /// Household members in join order
    async fn members(&self, household_id: &str) -> StoreResult<Vec<Member>>;

    async fn categories(&self, household_id: &str) -> StoreResult<Vec<Category>>;

    async fn tags(&self, household_id: &str) -> StoreResult<Vec<Tag>>;

    // ---- monthly records ----

    async fn expenses_in_month(&self, household_id: &str, month: &str) -> StoreResult<Vec<DatedAmount>>;

    async fn incomes_in_month(&self, household_id: &str, month: &str) -> StoreResult<Vec<DatedAmount>>;

    /// One page of a month's expenses, newest first, plus the month's total count
    async fn expense_page(&self, household_id: &str, month: &str, limit: usize, offset: usize) -> StoreResult<(Vec<ExpenseDetail>, usize)>;

    /// One page of a month's incomes, newest first, plus the month's total count
    async fn income_page(&self, household_id: &str, month: &str, limit: usize, offset: usize) -> StoreResult<(Vec<IncomeDetail>, usize)>;

    /// Distinct months holding any expense or income, newest first
    async fn active_months(&self, household_id: &str) -> StoreResult<Vec<String>>;

    // ---- expenses and incomes ----

    async fn expense(&self, household_id: &str, id: &str) -> StoreResult<Option<Expense>>;

    async fn insert_expense(&self, household_id: &str, expense: &NewExpense) -> StoreResult<Expense>;

    async fn update_expense(&self, household_id: &str, id: &str, expense: &NewExpense) -> StoreResult<Expense>;

    async fn income(&self, household_id: &str, id: &str) -> StoreResult<Option<Income>>;

    async fn insert_income(&self, household_id: &str, income: &NewIncome) -> StoreResult<Income>;

    async fn update_income(&self, household_id: &str, id: &str, income: &NewIncome) -> StoreResult<Income>;

    // ---- fixed expenses ----

    async fn fixed_expenses(&self, household_id: &str) -> StoreResult<Vec<FixedExpense>>;

    async fn insert_fixed_expense(&self, household_id: &str, fixed: &NewFixedExpense) -> StoreResult<String>;

    // ---- invitations ----

    async fn create_invitation(&self, household_id: &str, inviter_id: &str, invitee_email: &str) -> StoreResult<Invitation>;

    async fn pending_invitations(&self, invitee_email: &str) -> StoreResult<Vec<PendingInvitation>>;

    /// Answer a pending invitation addressed to `invitee_email`.
    /// Accepting adds `user_id` to the household as a non-owner.
    async fn respond_invitation(&self, id: &str, invitee_email: &str, user_id: &str, accept: bool) -> StoreResult<Invitation>;
}
