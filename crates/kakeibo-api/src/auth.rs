//! Request identity
//!
//! Sign-in happens at an upstream proxy, which forwards the verified email
//! in the configured header. Without the header the configured development
//! email (if any) is used.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kakeibo_core::{AuthState, CoreError, CurrentUser, HouseholdContext};

use crate::error::{ApiError, PageError};
use crate::AppState;

/// Auth state of the current request
#[derive(Debug, Clone)]
pub struct Auth(pub AuthState);

impl Auth {
    pub fn require_user(self) -> Result<CurrentUser, CoreError> {
        self.0.require_user()
    }

    /// Require a registered user who belongs to `household_id`
    pub async fn household(self, state: &AppState, household_id: &str) -> Result<HouseholdContext, CoreError> {
        let user = self.require_user()?;
        state.service.authorize(household_id, &user).await
    }
}

/// Email forwarded by the identity proxy
pub fn forwarded_email(parts: &Parts, state: &AppState) -> Option<String> {
    let auth = &state.config.server.auth;
    parts
        .headers
        .get(auth.email_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| auth.dev_email.clone())
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<AuthState, CoreError> {
    let email = forwarded_email(parts, state);
    state.service.resolve_auth(email.as_deref()).await
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Auth(resolve(parts, state).await?))
    }
}

/// [`Auth`] for JSON routes; lookup failures answer with JSON
#[derive(Debug, Clone)]
pub struct ApiAuth(pub Auth);

#[axum::async_trait]
impl FromRequestParts<AppState> for ApiAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(ApiAuth(Auth(resolve(parts, state).await?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;
    use axum::response::IntoResponse;

    fn failed_lookup() -> CoreError {
        CoreError::InternalError { message: "database is locked".to_string() }
    }

    #[test]
    fn test_page_rejection_is_html() {
        let rejection: <Auth as FromRequestParts<AppState>>::Rejection = failed_lookup().into();
        let response = rejection.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    }

    #[test]
    fn test_api_rejection_is_json() {
        let rejection: <ApiAuth as FromRequestParts<AppState>>::Rejection = failed_lookup().into();
        let response = rejection.into_response();
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
