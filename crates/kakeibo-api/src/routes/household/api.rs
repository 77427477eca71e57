//! Household API endpoints

use axum::extract::{Path, Query};
use axum::Json;
use kakeibo_core::{HouseholdOverview, YearMonth};
use std::collections::HashMap;

use crate::{ApiAuth, ApiError, AppState};

/// Income and expense summaries for `?ym=YYYY-MM` (default: current month)
pub async fn api_household_summary(
    state: axum::extract::State<AppState>,
    ApiAuth(auth): ApiAuth,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Result<Json<HouseholdOverview>, ApiError> {
    let ctx = auth.household(&state, &path.0).await?;
    let ym = YearMonth::from_query(query.get("ym").map(String::as_str));
    Ok(Json(state.service.overview(&ctx, ym).await?))
}

/// Months holding any record, newest first
pub async fn api_household_months(
    state: axum::extract::State<AppState>,
    ApiAuth(auth): ApiAuth,
    path: Path<String>,
) -> Result<Json<Vec<YearMonth>>, ApiError> {
    let ctx = auth.household(&state, &path.0).await?;
    Ok(Json(state.service.active_months(&ctx).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_summary_json() {
        let state = state().await;
        let id = signed_up_with_household(&state, "a@example.com", "Ann").await;

        let response = get(&state, &format!("/api/households/{}/summary?ym=2024-01", id), Some("a@example.com")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["ym"], "2024-01");
        assert_eq!(json["expenses"]["total"], 0);
        assert_eq!(json["expenses"]["per_member"][0]["name"], "Ann");
        assert_eq!(json["expenses"]["per_member"][0]["amount"], 0);
        assert_eq!(json["balance"], 0);
    }

    #[tokio::test]
    async fn test_unknown_household() {
        let state = state().await;
        signed_up_with_household(&state, "a@example.com", "Ann").await;

        let response = get(&state, "/api/households/missing/summary", Some("a@example.com")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_requires_identity() {
        let state = state().await;
        let id = signed_up_with_household(&state, "a@example.com", "Ann").await;

        let response = get(&state, &format!("/api/households/{}/months", id), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
