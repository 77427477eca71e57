//! Error types for kakeibo-api
//!
//! [`ApiError`] answers JSON routes with a status code and error details.
//! [`PageError`] answers HTML routes: missing identity redirects to the
//! landing page, missing registration to `/signup`, anything else renders
//! an error page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use kakeibo_core::{CoreError, ErrorSeverity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

fn log_core_error(error: &CoreError) {
    match error.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => log::error!("[{}] {}", error.code(), error),
        ErrorSeverity::Warning => log::warn!("[{}] {}", error.code(), error),
        ErrorSeverity::Info => log::debug!("[{}] {}", error.code(), error),
    }
}

fn status_of(error: &CoreError) -> StatusCode {
    StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Core(error) => {
                log_core_error(&error);
                (status_of(&error), Json(error.to_details())).into_response()
            }
        }
    }
}

/// Error raised by an HTML page handler
#[derive(Error, Debug)]
#[error(transparent)]
pub struct PageError(#[from] pub CoreError);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let error = self.0;
        match error {
            CoreError::Unauthorized => Redirect::to("/").into_response(),
            CoreError::RegistrationRequired { .. } => Redirect::to("/signup").into_response(),
            _ => {
                log_core_error(&error);
                let details = error.to_details();
                let status = status_of(&error);
                let content = format!(
                    r#"<div class='max-w-lg mx-auto mt-24 bg-white rounded-xl shadow-sm p-8 text-center'>
    <p class='text-5xl font-bold text-gray-300 mb-4'>{}</p>
    <p class='text-lg font-medium text-gray-800 mb-2'>{}</p>
    <p class='text-sm text-gray-500 mb-6'>{}</p>
    <a href='/home' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Back to home</a>
</div>"#,
                    status.as_u16(),
                    kakeibo_utils::escape_html(&details.message),
                    details
                        .suggestions
                        .iter()
                        .map(|s| kakeibo_utils::escape_html(s))
                        .collect::<Vec<_>>()
                        .join("<br>"),
                );
                (status, Html(crate::base_html("Error", &content))).into_response()
            }
        }
    }
}
