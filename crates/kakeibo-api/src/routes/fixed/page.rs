//! Fixed expense page rendering

use axum::extract::{Path, Query};
use axum::response::{Html, IntoResponse, Redirect, Response};
use kakeibo_core::{CoreError, FixedExpenseReport, FixedExpenseStatus, FormErrors, FormOptions, FormValues, HouseholdContext, YearMonth};
use kakeibo_utils::escape_html;
use std::collections::HashMap;

use crate::{field_error, form_value, month_selector, page_response, parse_form, select_options, AppState, Auth, PageError};

fn fixed_rows<'a>(state: &AppState, items: impl Iterator<Item = &'a FixedExpenseStatus>, empty: &str) -> String {
    let rows: String = items
        .map(|item| {
            let f = &item.fixed;
            format!(
                r#"<tr class='border-t'>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2 text-gray-500'>{}</td>
    <td class='px-4 py-2 text-right font-mono'>{}</td>
</tr>"#,
                escape_html(&f.category_name),
                escape_html(f.tag_name.as_deref().unwrap_or("")),
                escape_html(&f.payer_name),
                escape_html(f.note.as_deref().unwrap_or("")),
                state.money(f.amount)
            )
        })
        .collect();
    if rows.is_empty() {
        format!("<tr><td colspan='5' class='px-4 py-4 text-center text-gray-400'>{}</td></tr>", empty)
    } else {
        rows
    }
}

fn render_fixed(
    state: &AppState,
    ctx: &HouseholdContext,
    report: &FixedExpenseReport,
    months: &[YearMonth],
    options: &FormOptions,
    values: Option<&FormValues>,
    errors: Option<&FormErrors>,
) -> Html<String> {
    let id = ctx.id();
    let base_path = format!("/{}/fixed", id);
    let selected = |field: &str| values.and_then(|v| v.get(field)).cloned().unwrap_or_default();
    let payer = values.and_then(|v| v.get("payer")).cloned().unwrap_or_else(|| ctx.member.id.clone());
    let head = "<thead class='bg-gray-50 text-gray-500'><tr><th class='px-4 py-2 text-left'>Category</th><th class='px-4 py-2 text-left'>Tag</th><th class='px-4 py-2 text-left'>Paid by</th><th class='px-4 py-2 text-left'>Note</th><th class='px-4 py-2 text-right'>Amount</th></tr></thead>";

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'>
    <h2 class='text-2xl font-bold'>Fixed costs {ym}</h2>
    {selector}
</div>
<div class='bg-white rounded-xl shadow-sm mb-6'>
    <div class='flex justify-between items-center p-4 border-b'>
        <h3 class='text-lg font-semibold text-red-600'>Unpaid</h3>
        <span class='font-mono'>{unpaid_total}</span>
    </div>
    <table class='w-full text-sm'>{head}<tbody>{unpaid}</tbody></table>
</div>
<div class='bg-white rounded-xl shadow-sm mb-6'>
    <div class='p-4 border-b'><h3 class='text-lg font-semibold text-green-600'>Paid</h3></div>
    <table class='w-full text-sm'>{head}<tbody>{paid}</tbody></table>
</div>
<div class='max-w-lg bg-white rounded-xl shadow-sm p-6'>
    <h3 class='text-lg font-semibold mb-4'>New fixed cost</h3>
    <form method='post' action='{base_path}' class='space-y-4'>
        <input type='hidden' name='ym' value='{ym}'>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Amount</label>
            <input type='text' inputmode='numeric' name='amount' value='{amount}' class='w-full px-3 py-2 border rounded-lg'>
            {amount_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Category</label>
            <select name='category_id' class='w-full px-3 py-2 border rounded-lg'>{categories}</select>
            {category_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Tag</label>
            <select name='tag_id' class='w-full px-3 py-2 border rounded-lg'>{tags}</select>
            {tag_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Paid by</label>
            <select name='payer' class='w-full px-3 py-2 border rounded-lg'>{members}</select>
            {payer_error}
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Note</label>
            <input type='text' name='note' value='{note}' class='w-full px-3 py-2 border rounded-lg'>
        </div>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Add</button>
    </form>
</div>"#,
        ym = report.ym,
        selector = month_selector(&base_path, report.ym, months),
        unpaid_total = state.money(report.unpaid_total()),
        head = head,
        unpaid = fixed_rows(state, report.unpaid(), "Nothing left to pay"),
        paid = fixed_rows(state, report.paid(), "Nothing paid yet"),
        base_path = base_path,
        amount = form_value(values, "amount", ""),
        amount_error = field_error(errors, "amount"),
        categories = select_options(options.expense_categories.iter().map(|c| (c.id.as_str(), c.name.as_str())), &selected("category_id")),
        category_error = field_error(errors, "category_id"),
        tags = select_options(options.tags.iter().map(|t| (t.id.as_str(), t.name.as_str())), &selected("tag_id")),
        tag_error = field_error(errors, "tag_id"),
        members = select_options(options.members.iter().map(|m| (m.id.as_str(), m.name.as_str())), &payer),
        payer_error = field_error(errors, "payer"),
        note = form_value(values, "note", ""),
    );

    page_response("Fixed costs", Some(&ctx.household), &base_path, &inner_content)
}

/// Fixed costs split into paid and unpaid for `?ym=`
pub async fn page_fixed(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Result<Html<String>, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let ym = YearMonth::from_query(query.get("ym").map(String::as_str));
    let report = state.service.fixed_expenses(&ctx, ym).await?;
    let months = state.service.active_months(&ctx).await?;
    let options = state.service.form_options(&ctx).await?;
    Ok(render_fixed(&state, &ctx, &report, &months, &options, None, None))
}

pub async fn fixed_submit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
    body: String,
) -> Result<Response, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let values = parse_form(&body);
    let ym = YearMonth::from_query(values.get("ym").map(String::as_str));

    match state.service.add_fixed_expense(&ctx, &values).await {
        Ok(_) => Ok(Redirect::to(&format!("/{}/fixed?ym={}", ctx.id(), ym)).into_response()),
        Err(CoreError::InvalidForm(errors)) => {
            let report = state.service.fixed_expenses(&ctx, ym).await?;
            let months = state.service.active_months(&ctx).await?;
            let options = state.service.form_options(&ctx).await?;
            Ok(render_fixed(&state, &ctx, &report, &months, &options, Some(&values), Some(&errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
