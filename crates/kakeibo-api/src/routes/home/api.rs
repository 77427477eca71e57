//! Home API endpoints

use axum::Json;
use kakeibo_core::AuthState;

use crate::ApiAuth;

/// Current auth state (JSON API)
pub async fn api_me(ApiAuth(auth): ApiAuth) -> Json<AuthState> {
    Json(auth.0)
}
