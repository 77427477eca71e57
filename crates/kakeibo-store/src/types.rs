//! Entity types shared by the store and its callers

use serde::{Deserialize, Serialize};

/// Registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Household (shared account book)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Household {
    pub id: String,
    pub name: String,
}

/// User in a household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    /// User id
    pub id: String,
    pub name: String,
    /// Household owner (may invite)
    pub owner: bool,
}

/// Category class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKind::Expense => write!(f, "expense"),
            CategoryKind::Income => write!(f, "income"),
        }
    }
}

/// Expense or income category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub household_id: String,
    pub is_expense: bool,
}

impl Category {
    pub fn kind(&self) -> CategoryKind {
        if self.is_expense {
            CategoryKind::Expense
        } else {
            CategoryKind::Income
        }
    }
}

/// Classification tag attached to an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub household_id: String,
}

/// Expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Expense {
    pub id: String,
    pub household_id: String,
    pub amount: i64,
    pub category_id: String,
    pub tag_id: Option<String>,
    pub note: Option<String>,
    /// Member id of the payer
    pub payer: String,
    /// Payment date (YYYY-MM-DD)
    pub paid_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Expense joined with display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExpenseDetail {
    pub id: String,
    pub amount: i64,
    pub category_id: String,
    pub category_name: String,
    pub tag_id: Option<String>,
    pub tag_name: Option<String>,
    pub note: Option<String>,
    pub payer: String,
    pub payer_name: String,
    pub paid_at: String,
}

/// Fields submitted to create or update an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: i64,
    pub category_id: String,
    pub tag_id: Option<String>,
    pub note: Option<String>,
    pub payer: String,
    pub paid_at: String,
}

/// Income record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Income {
    pub id: String,
    pub household_id: String,
    pub amount: i64,
    pub category_id: String,
    pub note: Option<String>,
    /// Member id of the receiver
    pub payee: String,
    /// Receipt date (YYYY-MM-DD)
    pub received_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Income joined with display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IncomeDetail {
    pub id: String,
    pub amount: i64,
    pub category_id: String,
    pub category_name: String,
    pub note: Option<String>,
    pub payee: String,
    pub payee_name: String,
    pub received_at: String,
}

/// Fields submitted to create or update an income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncome {
    pub amount: i64,
    pub category_id: String,
    pub note: Option<String>,
    pub payee: String,
    pub received_at: String,
}

/// Recurring expense template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FixedExpense {
    pub id: String,
    pub amount: i64,
    pub note: Option<String>,
    pub category_id: String,
    pub category_name: String,
    pub tag_id: Option<String>,
    pub tag_name: Option<String>,
    pub payer: String,
    pub payer_name: String,
}

/// Fields submitted to create a fixed expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFixedExpense {
    pub amount: i64,
    pub category_id: String,
    pub tag_id: Option<String>,
    pub note: Option<String>,
    pub payer: String,
}

/// Minimal dated record used for monthly aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DatedAmount {
    pub id: String,
    pub amount: i64,
    /// Payer (expenses) or payee (incomes)
    pub member_id: String,
    /// YYYY-MM-DD
    pub date: String,
    pub category_id: String,
}

/// Invitation status (stored as 0/1/2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending = 0,
    Accepted = 1,
    Declined = 2,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitationStatus::Pending => write!(f, "pending"),
            InvitationStatus::Accepted => write!(f, "accepted"),
            InvitationStatus::Declined => write!(f, "declined"),
        }
    }
}

/// Invitation to join a household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: String,
    pub household_id: String,
    pub inviter_id: String,
    pub invitee_email: String,
    pub token: String,
    pub status: InvitationStatus,
    pub created_at: String,
    pub responded_at: Option<String>,
}

/// Pending invitation as shown to the invitee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingInvitation {
    pub id: String,
    pub household_id: String,
    pub household_name: String,
    pub inviter_name: String,
}

/// Categories and tags seeded into a new household
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HouseholdSeed {
    pub expense_categories: Vec<String>,
    pub income_categories: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&kakeibo_config::HouseholdDefaults> for HouseholdSeed {
    fn from(defaults: &kakeibo_config::HouseholdDefaults) -> Self {
        Self {
            expense_categories: defaults.expense_categories.clone(),
            income_categories: defaults.income_categories.clone(),
            tags: defaults.tags.clone(),
        }
    }
}
