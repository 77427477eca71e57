//! Income routes - Entry and edit forms

pub mod page;

pub use page::{income_edit_submit, income_submit, page_income_edit, page_income_new};
