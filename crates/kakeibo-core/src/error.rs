//! Error types for kakeibo-core
//!
//! Error codes, severities and detail records shared by the service layer
//! and the HTTP layer.

use kakeibo_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::FormErrors;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No signed-in identity
    Unauthorized,
    /// Signed in but not registered yet
    RegistrationRequired,
    /// Not a member of the household
    Forbidden,
    /// Household not found
    HouseholdNotFound,
    /// Expense or income not found
    RecordNotFound,
    /// Invitation not found
    InvitationNotFound,
    /// Invitation already accepted or declined
    InvitationClosed,
    /// Form validation error
    ValidationError,
    /// Storage failure
    StorageError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::RegistrationRequired => write!(f, "REGISTRATION_REQUIRED"),
            ErrorCode::Forbidden => write!(f, "FORBIDDEN"),
            ErrorCode::HouseholdNotFound => write!(f, "HOUSEHOLD_NOT_FOUND"),
            ErrorCode::RecordNotFound => write!(f, "RECORD_NOT_FOUND"),
            ErrorCode::InvitationNotFound => write!(f, "INVITATION_NOT_FOUND"),
            ErrorCode::InvitationClosed => write!(f, "INVITATION_CLOSED"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for kakeibo-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Sign-in required")]
    Unauthorized,

    #[error("Registration required for {email}")]
    RegistrationRequired { email: String },

    #[error("Not a member of household {household_id}")]
    Forbidden { household_id: String },

    #[error("Household not found: {id}")]
    HouseholdNotFound { id: String },

    #[error("Record not found: {entity} {id}")]
    RecordNotFound { entity: &'static str, id: String },

    #[error("Invitation not found: {id}")]
    InvitationNotFound { id: String },

    #[error("Invitation already answered: {id}")]
    InvitationClosed { id: String },

    /// Submitted form has field errors; the page redisplays it
    #[error("Invalid form: {0}")]
    InvalidForm(FormErrors),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::RegistrationRequired { .. } => ErrorCode::RegistrationRequired,
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
            CoreError::HouseholdNotFound { .. } => ErrorCode::HouseholdNotFound,
            CoreError::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            CoreError::InvitationNotFound { .. } => ErrorCode::InvitationNotFound,
            CoreError::InvitationClosed { .. } => ErrorCode::InvitationClosed,
            CoreError::InvalidForm(_) => ErrorCode::ValidationError,
            CoreError::StorageError { .. } => ErrorCode::StorageError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Unauthorized | CoreError::RegistrationRequired { .. } => ErrorSeverity::Info,
            CoreError::HouseholdNotFound { .. }
            | CoreError::RecordNotFound { .. }
            | CoreError::InvitationNotFound { .. } => ErrorSeverity::Info,
            CoreError::Forbidden { .. }
            | CoreError::InvitationClosed { .. }
            | CoreError::InvalidForm(_) => ErrorSeverity::Warning,
            CoreError::StorageError { .. } => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Unauthorized | CoreError::RegistrationRequired { .. } => 401,
            CoreError::Forbidden { .. } => 403,
            CoreError::HouseholdNotFound { .. }
            | CoreError::RecordNotFound { .. }
            | CoreError::InvitationNotFound { .. } => 404,
            CoreError::InvitationClosed { .. } => 409,
            CoreError::InvalidForm(_) => 422,
            CoreError::StorageError { .. } | CoreError::InternalError { .. } => 500,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::RegistrationRequired { email } => {
                details = details.with_detail(serde_json::json!({ "email": email }));
                details = details.with_suggestion("Register a display name at /signup.".to_string());
            }
            CoreError::Forbidden { .. } => {
                details = details.with_suggestion(
                    "Ask the household owner to send you an invitation.".to_string(),
                );
            }
            CoreError::InvalidForm(errors) => {
                details = details.with_detail(serde_json::json!({ "fields": errors }));
            }
            // Storage internals stay in the log, not in responses
            CoreError::StorageError { .. } => {
                details.message = "Storage error".to_string();
            }
            _ => {}
        }

        details
    }
}

impl From<FormErrors> for CoreError {
    fn from(errors: FormErrors) -> Self {
        CoreError::InvalidForm(errors)
    }
}

impl From<StoreError> for CoreError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity: "invitation", id } => CoreError::InvitationNotFound { id },
            StoreError::NotFound { entity, id } => CoreError::RecordNotFound { entity, id },
            StoreError::AlreadyResponded { id } => CoreError::InvitationClosed { id },
            StoreError::Migration { message } => CoreError::InternalError { message },
            other => CoreError::StorageError { message: other.to_string() },
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::Forbidden.to_string(), "FORBIDDEN");
        assert_eq!(ErrorCode::HouseholdNotFound.to_string(), "HOUSEHOLD_NOT_FOUND");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CoreError::Unauthorized.status_code(), 401);
        assert_eq!(CoreError::Forbidden { household_id: "h".into() }.status_code(), 403);
        assert_eq!(CoreError::HouseholdNotFound { id: "h".into() }.status_code(), 404);
        assert_eq!(CoreError::InvitationClosed { id: "i".into() }.status_code(), 409);
    }

    #[test]
    fn test_store_error_mapping() {
        let err: CoreError = StoreError::not_found("invitation", "i1").into();
        assert_eq!(err.code(), ErrorCode::InvitationNotFound);

        let err: CoreError = StoreError::not_found("expense", "e1").into();
        assert_eq!(err.code(), ErrorCode::RecordNotFound);

        let err: CoreError = StoreError::AlreadyResponded { id: "i1".into() }.into();
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_storage_details_hide_message() {
        let err = CoreError::StorageError { message: "disk I/O error".to_string() };
        let details = err.to_details();
        assert_eq!(details.code, ErrorCode::StorageError);
        assert!(!details.message.contains("disk"));
    }
}
