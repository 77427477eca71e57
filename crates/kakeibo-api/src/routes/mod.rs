//! Route modules for the HTTP server
//!
//! Each module follows the same structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints (where the area has any)
//! - page.rs: HTML page rendering and form handling

pub mod expenses;
pub mod fixed;
pub mod home;
pub mod household;
pub mod incomes;
pub mod summary;
