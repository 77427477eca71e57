//! Summary routes - Monthly totals with paginated detail lists
//!
//! Features:
//! - Month picker limited to months with records, plus prev/next links
//! - Expense totals per payer and income totals per payee
//! - Expense and income tables, paged independently (`page` / `ipage`)
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_expenses, api_incomes};
pub use page::{page_summary, summary_card};
