//! Expense routes - Entry and edit forms
//!
//! A saved expense redirects to the summary of the month it is dated in.

pub mod page;

pub use page::{expense_edit_submit, expense_submit, page_expense_edit, page_expense_new};
