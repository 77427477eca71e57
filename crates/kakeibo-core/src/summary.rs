//! Monthly totals and per-member breakdowns

use std::collections::HashMap;

use kakeibo_store::{DatedAmount, Member};
use serde::{Deserialize, Serialize};

use crate::month::YearMonth;

/// One member's share of a monthly total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAmount {
    pub member_id: String,
    pub name: String,
    pub amount: i64,
}

/// Aggregate of one record kind over one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub ym: YearMonth,
    pub total: i64,
    /// One entry per member, in member-list order
    pub per_member: Vec<MemberAmount>,
}

/// Expenses and incomes of a month side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdOverview {
    pub ym: YearMonth,
    /// Keyed by payer
    pub expenses: MonthlySummary,
    /// Keyed by payee
    pub incomes: MonthlySummary,
    /// Total income minus total expense
    pub balance: i64,
}

impl HouseholdOverview {
    pub fn new(expenses: MonthlySummary, incomes: MonthlySummary) -> Self {
        Self {
            ym: expenses.ym,
            balance: incomes.total.saturating_sub(expenses.total),
            expenses,
            incomes,
        }
    }
}

/// Sum the records dated in `ym`.
///
/// Amounts from ids outside `members` count toward the total but have no
/// bucket in the breakdown. Sums saturate instead of overflowing.
pub fn aggregate(records: &[DatedAmount], members: &[Member], ym: YearMonth) -> MonthlySummary {
    let mut total = 0i64;
    let mut by_member: HashMap<&str, i64> = HashMap::new();

    for record in records.iter().filter(|r| ym.contains(&r.date)) {
        total = total.saturating_add(record.amount);
        let sum = by_member.entry(record.member_id.as_str()).or_insert(0);
        *sum = sum.saturating_add(record.amount);
    }

    let per_member = members
        .iter()
        .map(|m| MemberAmount {
            member_id: m.id.clone(),
            name: m.name.clone(),
            amount: by_member.get(m.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    MonthlySummary { ym, total, per_member }
}
