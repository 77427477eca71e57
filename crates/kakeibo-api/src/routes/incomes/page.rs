//! Income form rendering

use axum::extract::Path;
use axum::response::{Html, IntoResponse, Redirect, Response};
use kakeibo_core::{CoreError, FormErrors, FormOptions, FormValues, HouseholdContext, Income};

use crate::{field_error, form_value, page_response, parse_form, select_options, summary_url, today, AppState, Auth, PageError};

fn income_values(income: &Income) -> FormValues {
    [
        ("amount", income.amount.to_string()),
        ("category", income.category_id.clone()),
        ("payee", income.payee.clone()),
        ("received_at", income.received_at.clone()),
        ("note", income.note.clone().unwrap_or_default()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn render_income_form(
    ctx: &HouseholdContext,
    options: &FormOptions,
    income_id: Option<&str>,
    values: Option<&FormValues>,
    errors: Option<&FormErrors>,
) -> Html<String> {
    let action = match income_id {
        Some(item) => format!("/{}/edit/incomes/{}", ctx.id(), item),
        None => format!("/{}/income", ctx.id()),
    };
    let category = values.and_then(|v| v.get("category")).cloned().unwrap_or_default();
    let payee = values.and_then(|v| v.get("payee")).cloned().unwrap_or_else(|| ctx.member.id.clone());

    let inner_content = format!(
        r#"<div class='max-w-lg bg-white rounded-xl shadow-sm p-6'>
    <h2 class='text-2xl font-bold mb-6'>{}</h2>
    <form method='post' action='{}' class='space-y-4'>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Amount</label>
            <input type='text' inputmode='numeric' name='amount' value='{}' class='w-full px-3 py-2 border rounded-lg'>
            {}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Category</label>
            <select name='category' class='w-full px-3 py-2 border rounded-lg'>{}</select>
            {}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Received by</label>
            <select name='payee' class='w-full px-3 py-2 border rounded-lg'>{}</select>
            {}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Date</label>
            <input type='date' name='received_at' value='{}' class='w-full px-3 py-2 border rounded-lg'>
            {}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Note</label>
            <textarea name='note' rows='2' class='w-full px-3 py-2 border rounded-lg'>{}</textarea>
        </div>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>{}</button>
    </form>
</div>"#,
        if income_id.is_some() { "Edit income" } else { "New income" },
        action,
        form_value(values, "amount", ""),
        field_error(errors, "amount"),
        select_options(options.income_categories.iter().map(|c| (c.id.as_str(), c.name.as_str())), &category),
        field_error(errors, "category"),
        select_options(options.members.iter().map(|m| (m.id.as_str(), m.name.as_str())), &payee),
        field_error(errors, "payee"),
        form_value(values, "received_at", &today()),
        field_error(errors, "received_at"),
        form_value(values, "note", ""),
        if income_id.is_some() { "Save" } else { "Add" },
    );

    page_response("Income", Some(&ctx.household), &format!("/{}/income", ctx.id()), &inner_content)
}

pub async fn page_income_new(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
) -> Result<Html<String>, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let options = state.service.form_options(&ctx).await?;
    Ok(render_income_form(&ctx, &options, None, None, None))
}

pub async fn income_submit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
    body: String,
) -> Result<Response, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let values = parse_form(&body);
    match state.service.add_income(&ctx, &values).await {
        Ok(income) => Ok(Redirect::to(&summary_url(ctx.id(), &income.received_at)).into_response()),
        Err(CoreError::InvalidForm(errors)) => {
            let options = state.service.form_options(&ctx).await?;
            Ok(render_income_form(&ctx, &options, None, Some(&values), Some(&errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn page_income_edit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<(String, String)>,
) -> Result<Html<String>, PageError> {
    let (household_id, income_id) = path.0;
    let ctx = auth.household(&state, &household_id).await?;
    let income = state.service.income(&ctx, &income_id).await?;
    let options = state.service.form_options(&ctx).await?;
    Ok(render_income_form(&ctx, &options, Some(income.id.as_str()), Some(&income_values(&income)), None))
}

pub async fn income_edit_submit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<(String, String)>,
    body: String,
) -> Result<Response, PageError> {
    let (household_id, income_id) = path.0;
    let ctx = auth.household(&state, &household_id).await?;
    let values = parse_form(&body);
    match state.service.update_income(&ctx, &income_id, &values).await {
        Ok(income) => Ok(Redirect::to(&summary_url(ctx.id(), &income.received_at)).into_response()),
        Err(CoreError::InvalidForm(errors)) => {
            let options = state.service.form_options(&ctx).await?;
            Ok(render_income_form(&ctx, &options, Some(income_id.as_str()), Some(&values), Some(&errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_income_round_trip_through_summary() {
        let state = state().await;
        let id = signed_up_with_household(&state, "a@example.com", "Ann").await;
        let (category, payee) = income_refs(&state, &id, "a@example.com").await;

        let body = format!("amount=300000&category={}&payee={}&received_at=2024-01-25", category, payee);
        let response = post(&state, &format!("/{}/income", id), "a@example.com", &body).await;
        assert_eq!(location(&response), format!("/{}/summary?ym=2024-01", id));

        let uri = format!("/api/households/{}/summary?ym=2024-01", id);
        let json: serde_json::Value = serde_json::from_str(&body_string(get(&state, &uri, Some("a@example.com")).await).await).unwrap();
        assert_eq!(json["incomes"]["total"], 300000);
        assert_eq!(json["balance"], 300000);
    }

    #[tokio::test]
    async fn test_expense_category_rejected_for_income() {
        let state = state().await;
        let id = signed_up_with_household(&state, "a@example.com", "Ann").await;
        let (expense_category, payee) = expense_refs(&state, &id, "a@example.com").await;

        let body = format!("amount=10&category={}&payee={}&received_at=2024-01-25", expense_category, payee);
        let response = post(&state, &format!("/{}/income", id), "a@example.com", &body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Select a category"));
    }

    #[tokio::test]
    async fn test_edit_income_form_prefilled() {
        let state = state().await;
        let id = signed_up_with_household(&state, "a@example.com", "Ann").await;
        let (category, payee) = income_refs(&state, &id, "a@example.com").await;

        let body = format!("amount=42&category={}&payee={}&received_at=2024-01-05&note=bonus", category, payee);
        post(&state, &format!("/{}/income", id), "a@example.com", &body).await;

        let uri = format!("/api/households/{}/incomes?ym=2024-01", id);
        let json: serde_json::Value = serde_json::from_str(&body_string(get(&state, &uri, Some("a@example.com")).await).await).unwrap();
        let income_id = json["items"][0]["id"].as_str().unwrap().to_string();

        let html = body_string(get(&state, &format!("/{}/edit/incomes/{}", id, income_id), Some("a@example.com")).await).await;
        assert!(html.contains("Edit income"));
        assert!(html.contains("bonus"));
        assert!(html.contains("2024-01-05"));
    }
}
