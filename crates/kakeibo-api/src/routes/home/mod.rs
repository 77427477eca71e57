//! Home routes - Landing, sign-up, household list and invitations
//!
//! Structure:
//! - api.rs: Current auth state (JSON)
//! - page.rs: Landing, sign-up and household list pages

pub mod api;
pub mod page;

pub use api::api_me;
pub use page::{home_submit, index_page, page_home, page_signup, signup_submit};
