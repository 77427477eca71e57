//! Expense form rendering

use axum::extract::Path;
use axum::response::{Html, IntoResponse, Redirect, Response};
use kakeibo_core::{CoreError, Expense, FormErrors, FormOptions, FormValues, HouseholdContext};

use crate::{field_error, form_value, page_response, parse_form, select_options, summary_url, today, AppState, Auth, PageError};

/// Form values of a stored expense
fn expense_values(expense: &Expense) -> FormValues {
    let mut values = FormValues::new();
    values.insert("amount".into(), expense.amount.to_string());
    values.insert("category".into(), expense.category_id.clone());
    values.insert("tags".into(), expense.tag_id.clone().unwrap_or_default());
    values.insert("payer".into(), expense.payer.clone());
    values.insert("paid_at".into(), expense.paid_at.clone());
    values.insert("note".into(), expense.note.clone().unwrap_or_default());
    values
}

fn render_expense_form(
    ctx: &HouseholdContext,
    options: &FormOptions,
    action: &str,
    values: Option<&FormValues>,
    errors: Option<&FormErrors>,
) -> Html<String> {
    let editing = action.contains("/edit/");
    let selected = |field: &str| values.and_then(|v| v.get(field)).map(String::as_str).unwrap_or("").to_string();
    let payer = values.and_then(|v| v.get("payer")).cloned().unwrap_or_else(|| ctx.member.id.clone());
    let today = today();

    let inner_content = format!(
        r#"<div class='max-w-lg bg-white rounded-xl shadow-sm p-6'>
    <h2 class='text-2xl font-bold mb-6'>{title}</h2>
    <form method='post' action='{action}' class='space-y-4'>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Amount</label>
            <input type='text' inputmode='numeric' name='amount' value='{amount}' class='w-full px-3 py-2 border rounded-lg'>
            {amount_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Category</label>
            <select name='category' class='w-full px-3 py-2 border rounded-lg'>{categories}</select>
            {category_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Tag</label>
            <select name='tags' class='w-full px-3 py-2 border rounded-lg'>{tags}</select>
            {tag_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Paid by</label>
            <select name='payer' class='w-full px-3 py-2 border rounded-lg'>{members}</select>
            {payer_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Date</label>
            <input type='date' name='paid_at' value='{paid_at}' class='w-full px-3 py-2 border rounded-lg'>
            {paid_at_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Note</label>
            <textarea name='note' rows='2' class='w-full px-3 py-2 border rounded-lg'>{note}</textarea>
        </div>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>{submit}</button>
    </form>
</div>"#,
        title = if editing { "Edit expense" } else { "New expense" },
        action = action,
        amount = form_value(values, "amount", ""),
        amount_error = field_error(errors, "amount"),
        categories = select_options(options.expense_categories.iter().map(|c| (c.id.as_str(), c.name.as_str())), &selected("category")),
        category_error = field_error(errors, "category"),
        tags = select_options(options.tags.iter().map(|t| (t.id.as_str(), t.name.as_str())), &selected("tags")),
        tag_error = field_error(errors, "tags"),
        members = select_options(options.members.iter().map(|m| (m.id.as_str(), m.name.as_str())), &payer),
        payer_error = field_error(errors, "payer"),
        paid_at = form_value(values, "paid_at", &today),
        paid_at_error = field_error(errors, "paid_at"),
        note = form_value(values, "note", ""),
        submit = if editing { "Save" } else { "Add" },
    );

    page_response("Expense", Some(&ctx.household), &format!("/{}/expenses", ctx.id()), &inner_content)
}

pub async fn page_expense_new(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
) -> Result<Html<String>, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let options = state.service.form_options(&ctx).await?;
    let action = format!("/{}/expenses", ctx.id());
    Ok(render_expense_form(&ctx, &options, &action, None, None))
}

pub async fn expense_submit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
    body: String,
) -> Result<Response, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let values = parse_form(&body);
    match state.service.add_expense(&ctx, &values).await {
        Ok(expense) => Ok(Redirect::to(&summary_url(ctx.id(), &expense.paid_at)).into_response()),
        Err(CoreError::InvalidForm(errors)) => {
            let options = state.service.form_options(&ctx).await?;
            let action = format!("/{}/expenses", ctx.id());
            Ok(render_expense_form(&ctx, &options, &action, Some(&values), Some(&errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn page_expense_edit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<(String, String)>,
) -> Result<Html<String>, PageError> {
    let (household_id, expense_id) = path.0;
    let ctx = auth.household(&state, &household_id).await?;
    let expense = state.service.expense(&ctx, &expense_id).await?;
    let options = state.service.form_options(&ctx).await?;
    let action = format!("/{}/edit/expenses/{}", ctx.id(), expense.id);
    Ok(render_expense_form(&ctx, &options, &action, Some(&expense_values(&expense)), None))
}

pub async fn expense_edit_submit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<(String, String)>,
    body: String,
) -> Result<Response, PageError> {
    let (household_id, expense_id) = path.0;
    let ctx = auth.household(&state, &household_id).await?;
    let values = parse_form(&body);
    match state.service.update_expense(&ctx, &expense_id, &values).await {
        Ok(expense) => Ok(Redirect::to(&summary_url(ctx.id(), &expense.paid_at)).into_response()),
        Err(CoreError::InvalidForm(errors)) => {
            let options = state.service.form_options(&ctx).await?;
            let action = format!("/{}/edit/expenses/{}", ctx.id(), expense_id);
            Ok(render_expense_form(&ctx, &options, &action, Some(&values), Some(&errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
