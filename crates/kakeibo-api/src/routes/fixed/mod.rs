//! Fixed expense routes - Recurring costs and whether they are paid
//!
//! A fixed expense counts as paid in a month once any expense of that month
//! shares its category.
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::api_fixed;
pub use page::{fixed_submit, page_fixed};
