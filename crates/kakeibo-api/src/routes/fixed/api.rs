//! Fixed expense API endpoints

use axum::extract::{Path, Query};
use axum::Json;
use kakeibo_core::{FixedExpenseReport, YearMonth};
use std::collections::HashMap;

use crate::{ApiAuth, ApiError, AppState};

/// Fixed expenses with paid flags for `?ym=`
pub async fn api_fixed(
    state: axum::extract::State<AppState>,
    ApiAuth(auth): ApiAuth,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Result<Json<FixedExpenseReport>, ApiError> {
    let ctx = auth.household(&state, &path.0).await?;
    let ym = YearMonth::from_query(query.get("ym").map(String::as_str));
    Ok(Json(state.service.fixed_expenses(&ctx, ym).await?))
}
