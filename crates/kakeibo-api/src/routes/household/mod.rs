//! Household routes - Dashboard and invitations
//!
//! Features:
//! - Current month's income, expense and balance
//! - Member list
//! - Invitation form for the household owner
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_household_months, api_household_summary};
pub use page::{household_submit, page_household};
