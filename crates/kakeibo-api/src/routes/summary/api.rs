//! Summary API endpoints - Paged detail lists

use axum::extract::{Path, Query};
use axum::Json;
use kakeibo_core::{ExpenseDetail, IncomeDetail, Page, PageRequest, YearMonth};
use std::collections::HashMap;

use crate::{ApiAuth, ApiError, AppState};

/// Expenses of `?ym=`, newest first, page `?page=`
pub async fn api_expenses(
    state: axum::extract::State<AppState>,
    ApiAuth(auth): ApiAuth,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Result<Json<Page<ExpenseDetail>>, ApiError> {
    let ctx = auth.household(&state, &path.0).await?;
    let ym = YearMonth::from_query(query.get("ym").map(String::as_str));
    let request = PageRequest::from_query(query.get("page").map(String::as_str), state.service.page_size());
    Ok(Json(state.service.expense_page(&ctx, ym, request).await?))
}

/// Incomes of `?ym=`, newest first, page `?page=`
pub async fn api_incomes(
    state: axum::extract::State<AppState>,
    ApiAuth(auth): ApiAuth,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Result<Json<Page<IncomeDetail>>, ApiError> {
    let ctx = auth.household(&state, &path.0).await?;
    let ym = YearMonth::from_query(query.get("ym").map(String::as_str));
    let request = PageRequest::from_query(query.get("page").map(String::as_str), state.service.page_size());
    Ok(Json(state.service.income_page(&ctx, ym, request).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;

    #[tokio::test]
    async fn test_expense_page_json() {
        let state = state().await;
        let id = signed_up_with_household(&state, "a@example.com", "Ann").await;
        let (category, payer) = expense_refs(&state, &id, "a@example.com").await;

        for day in 1..=3 {
            let body = format!("amount=100&category={}&payer={}&paid_at=2024-05-0{}", category, payer, day);
            post(&state, &format!("/{}/expenses", id), "a@example.com", &body).await;
        }

        let uri = format!("/api/households/{}/expenses?ym=2024-05&page=1", id);
        let json: serde_json::Value = serde_json::from_str(&body_string(get(&state, &uri, Some("a@example.com")).await).await).unwrap();
        assert_eq!(json["total_count"], 3);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["items"][0]["paid_at"], "2024-05-03");

        let uri = format!("/api/households/{}/expenses?ym=2024-05&page=9", id);
        let json: serde_json::Value = serde_json::from_str(&body_string(get(&state, &uri, Some("a@example.com")).await).await).unwrap();
        assert_eq!(json["current_page"], 9);
        assert_eq!(json["items"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_income_page_json_empty_month() {
        let state = state().await;
        let id = signed_up_with_household(&state, "a@example.com", "Ann").await;

        let uri = format!("/api/households/{}/incomes?ym=2024-05&page=0", id);
        let json: serde_json::Value = serde_json::from_str(&body_string(get(&state, &uri, Some("a@example.com")).await).await).unwrap();
        assert_eq!(json["current_page"], 1);
        assert_eq!(json["total_pages"], 0);
    }
}
