//! Year-month selection for monthly views

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month, written as zero-padded "YYYY-MM"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Current month in local time
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    /// Parse "YYYY-MM"; anything else is `None`
    pub fn parse(s: &str) -> Option<Self> {
        static YM_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
        let re = YM_PATTERN.get_or_init(|| regex::Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

        let caps = re.captures(s.trim())?;
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        Self::new(year, month)
    }

    /// Parse the `ym` query value, falling back to the current month
    pub fn from_query(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_else(Self::current)
    }

    /// Month of a "YYYY-MM-DD" date string
    pub fn of_date_str(date: &str) -> Option<Self> {
        date.get(..7).filter(|_| date.as_bytes().get(7) == Some(&b'-')).and_then(Self::parse)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Whether a "YYYY-MM-DD" date string falls in this month.
    ///
    /// Plain string prefix on `ym + "-"`, so "2024-010-01" is not in "2024-01".
    pub fn contains(&self, date: &str) -> bool {
        let ym = self.to_string();
        date.len() > ym.len() && date.starts_with(&ym) && date.as_bytes()[ym.len()] == b'-'
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// First day of the month, used as the default date on entry forms
    pub fn first_day(&self) -> String {
        format!("{}-01", self)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid year-month: {}", s))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}
