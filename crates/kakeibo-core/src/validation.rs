//! Form parsing and validation
//!
//! Each form parses raw urlencoded fields into the store's insert types.
//! Failures are collected per field so the page can redisplay the submitted
//! values next to the messages.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use kakeibo_store::{Category, CategoryKind, Member, NewExpense, NewFixedExpense, NewIncome, Tag};
use serde::{Deserialize, Serialize};

/// Raw submitted fields
pub type FormValues = HashMap<String, String>;

pub const MSG_NAME: &str = "Enter a name of at least one character";
pub const MSG_HOUSEHOLD_NAME: &str = "Enter a household name";
pub const MSG_EMAIL_EMPTY: &str = "Email address is required";
pub const MSG_EMAIL_FORMAT: &str = "Email address is not valid";
pub const MSG_AMOUNT: &str = "Enter an amount";
pub const MSG_AMOUNT_NEGATIVE: &str = "Amount must not be negative";
pub const MSG_AMOUNT_TOO_LARGE: &str = "Amount is too large";

/// Largest amount a single record may carry
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
pub const MSG_CATEGORY: &str = "Select a category";
pub const MSG_TAG: &str = "Select a tag";
pub const MSG_PAYER: &str = "Select who paid";
pub const MSG_PAYEE: &str = "Select who received it";
pub const MSG_PAID_AT: &str = "Select the payment date";
pub const MSG_RECEIVED_AT: &str = "Select the date received";
pub const MSG_ALREADY_MEMBER: &str = "Already a member of this household";

/// Field name to first error message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message; the first message per field wins
    pub fn add(&mut self, field: &str, message: &str) {
        self.0.entry(field.to_string()).or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", fields.join(", "))
    }
}

fn field<'a>(values: &'a FormValues, name: &str) -> &'a str {
    values.get(name).map(|s| s.trim()).unwrap_or("")
}

fn optional(values: &FormValues, name: &str) -> Option<String> {
    Some(field(values, name)).filter(|s| !s.is_empty()).map(str::to_string)
}

fn required(values: &FormValues, name: &str, message: &str, errors: &mut FormErrors) -> String {
    let value = field(values, name);
    if value.is_empty() {
        errors.add(name, message);
    }
    value.to_string()
}

/// Whole non-negative amount; thousands separators are tolerated
fn amount(values: &FormValues, name: &str, errors: &mut FormErrors) -> i64 {
    let raw: String = field(values, name).chars().filter(|c| *c != ',').collect();
    match raw.parse::<i64>() {
        Ok(n) if n < 0 => {
            errors.add(name, MSG_AMOUNT_NEGATIVE);
            0
        }
        Ok(n) if n > MAX_AMOUNT => {
            errors.add(name, MSG_AMOUNT_TOO_LARGE);
            0
        }
        Ok(n) => n,
        Err(_) => {
            errors.add(name, MSG_AMOUNT);
            0
        }
    }
}

/// Zero-padded calendar date
fn date(values: &FormValues, name: &str, message: &str, errors: &mut FormErrors) -> String {
    let value = field(values, name);
    if !is_valid_date(value) {
        errors.add(name, message);
    }
    value.to_string()
}

pub fn is_valid_date(value: &str) -> bool {
    static DATE_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re = DATE_PATTERN.get_or_init(|| regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
    re.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

pub fn is_valid_email(value: &str) -> bool {
    static EMAIL_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re = EMAIL_PATTERN.get_or_init(|| regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    re.is_match(value)
}

fn email(values: &FormValues, name: &str, errors: &mut FormErrors) -> String {
    let value = field(values, name);
    if value.is_empty() {
        errors.add(name, MSG_EMAIL_EMPTY);
    } else if !is_valid_email(value) {
        errors.add(name, MSG_EMAIL_FORMAT);
    }
    value.to_string()
}

/// First id of a comma-separated selection.
///
/// Expenses carry at most one tag; extra selections are ignored.
pub fn first_tag(raw: &str) -> Option<String> {
    raw.split(',').map(str::trim).find(|s| !s.is_empty()).map(str::to_string)
}

// ==================== Forms ====================

/// User registration
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpForm {
    pub name: String,
}

impl SignUpForm {
    pub fn parse(values: &FormValues) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();
        let name = required(values, "name", MSG_NAME, &mut errors);
        errors.finish(|| Self { name })
    }
}

/// New household
#[derive(Debug, Clone, PartialEq)]
pub struct NewHouseholdForm {
    pub name: String,
}

impl NewHouseholdForm {
    pub fn parse(values: &FormValues) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();
        let name = required(values, "name", MSG_HOUSEHOLD_NAME, &mut errors);
        errors.finish(|| Self { name })
    }
}

/// Invitation by email
#[derive(Debug, Clone, PartialEq)]
pub struct InviteForm {
    pub invitee_email: String,
}

impl InviteForm {
    pub fn parse(values: &FormValues) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();
        let invitee_email = email(values, "invitee_email", &mut errors);
        errors.finish(|| Self { invitee_email })
    }
}

/// Expense entry and edit form
pub fn parse_expense(values: &FormValues) -> Result<NewExpense, FormErrors> {
    let mut errors = FormErrors::new();
    let amount = amount(values, "amount", &mut errors);
    let category_id = required(values, "category", MSG_CATEGORY, &mut errors);
    let payer = required(values, "payer", MSG_PAYER, &mut errors);
    let paid_at = date(values, "paid_at", MSG_PAID_AT, &mut errors);
    let tag_id = first_tag(field(values, "tags"));
    let note = optional(values, "note");

    errors.finish(|| NewExpense {
        amount,
        category_id,
        tag_id,
        note,
        payer,
        paid_at,
    })
}

/// Income entry and edit form
pub fn parse_income(values: &FormValues) -> Result<NewIncome, FormErrors> {
    let mut errors = FormErrors::new();
    let amount = amount(values, "amount", &mut errors);
    let category_id = required(values, "category", MSG_CATEGORY, &mut errors);
    let payee = required(values, "payee", MSG_PAYEE, &mut errors);
    let received_at = date(values, "received_at", MSG_RECEIVED_AT, &mut errors);
    let note = optional(values, "note");

    errors.finish(|| NewIncome {
        amount,
        category_id,
        note,
        payee,
        received_at,
    })
}

/// Fixed expense template form
pub fn parse_fixed_expense(values: &FormValues) -> Result<NewFixedExpense, FormErrors> {
    let mut errors = FormErrors::new();
    let amount = amount(values, "amount", &mut errors);
    let category_id = required(values, "category_id", MSG_CATEGORY, &mut errors);
    let payer = required(values, "payer", MSG_PAYER, &mut errors);
    let tag_id = first_tag(field(values, "tag_id"));
    let note = optional(values, "note");

    errors.finish(|| NewFixedExpense {
        amount,
        category_id,
        tag_id,
        note,
        payer,
    })
}

// ==================== Reference checks ====================

/// Household data that submitted ids must refer to
pub struct References<'a> {
    pub categories: &'a [Category],
    pub tags: &'a [Tag],
    pub members: &'a [Member],
}

impl References<'_> {
    /// Category must exist and be of the expected class
    pub fn check_category(&self, field: &str, id: &str, kind: CategoryKind, errors: &mut FormErrors) {
        if !self.categories.iter().any(|c| c.id == id && c.kind() == kind) {
            errors.add(field, MSG_CATEGORY);
        }
    }

    pub fn check_tag(&self, field: &str, id: Option<&str>, errors: &mut FormErrors) {
        if let Some(id) = id {
            if !self.tags.iter().any(|t| t.id == id) {
                errors.add(field, MSG_TAG);
            }
        }
    }

    pub fn check_member(&self, field: &str, id: &str, message: &str, errors: &mut FormErrors) {
        if !self.members.iter().any(|m| m.id == id) {
            errors.add(field, message);
        }
    }

    pub fn expense(&self, expense: &NewExpense) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        self.check_category("category", &expense.category_id, CategoryKind::Expense, &mut errors);
        self.check_tag("tags", expense.tag_id.as_deref(), &mut errors);
        self.check_member("payer", &expense.payer, MSG_PAYER, &mut errors);
        errors.finish(|| ())
    }

    pub fn income(&self, income: &NewIncome) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        self.check_category("category", &income.category_id, CategoryKind::Income, &mut errors);
        self.check_member("payee", &income.payee, MSG_PAYEE, &mut errors);
        errors.finish(|| ())
    }

    pub fn fixed_expense(&self, fixed: &NewFixedExpense) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        self.check_category("category_id", &fixed.category_id, CategoryKind::Expense, &mut errors);
        self.check_tag("tag_id", fixed.tag_id.as_deref(), &mut errors);
        self.check_member("payer", &fixed.payer, MSG_PAYER, &mut errors);
        errors.finish(|| ())
    }
}
