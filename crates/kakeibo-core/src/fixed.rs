//! Paid/unpaid status of fixed expenses for a month

use std::collections::HashSet;

use kakeibo_store::{DatedAmount, FixedExpense};
use serde::{Deserialize, Serialize};

use crate::month::YearMonth;

/// Fixed expense with its derived status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedExpenseStatus {
    #[serde(flatten)]
    pub fixed: FixedExpense,
    pub paid: bool,
}

/// Fixed expenses of a month, split for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedExpenseReport {
    pub ym: YearMonth,
    pub items: Vec<FixedExpenseStatus>,
}

impl FixedExpenseReport {
    pub fn paid(&self) -> impl Iterator<Item = &FixedExpenseStatus> {
        self.items.iter().filter(|s| s.paid)
    }

    pub fn unpaid(&self) -> impl Iterator<Item = &FixedExpenseStatus> {
        self.items.iter().filter(|s| !s.paid)
    }

    /// Sum of the template amounts not yet covered this month
    pub fn unpaid_total(&self) -> i64 {
        self.unpaid().fold(0i64, |sum, s| sum.saturating_add(s.fixed.amount))
    }
}

/// A template is paid when any expense in `ym` shares its category.
/// Amount, tag and payer are not compared.
pub fn mark_paid(fixed: Vec<FixedExpense>, expenses: &[DatedAmount], ym: YearMonth) -> FixedExpenseReport {
    let categories: HashSet<&str> = expenses
        .iter()
        .filter(|e| ym.contains(&e.date))
        .map(|e| e.category_id.as_str())
        .collect();

    let items = fixed
        .into_iter()
        .map(|f| {
            let paid = categories.contains(f.category_id.as_str());
            FixedExpenseStatus { fixed: f, paid }
        })
        .collect();

    FixedExpenseReport { ym, items }
}
