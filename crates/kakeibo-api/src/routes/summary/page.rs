//! Summary page rendering

use axum::extract::{Path, Query};
use axum::response::Html;
use kakeibo_core::{ExpenseDetail, IncomeDetail, MonthlySummary, Page, PageRequest, YearMonth};
use kakeibo_utils::escape_html;
use std::collections::HashMap;

use crate::{month_selector, page_response, pagination_controls, AppState, Auth, PageError};

/// Total plus one row per member
pub fn summary_card(state: &AppState, heading: &str, summary: &MonthlySummary) -> String {
    let rows: String = summary
        .per_member
        .iter()
        .map(|m| {
            format!(
                "<div class='flex justify-between py-1'><span class='text-gray-600'>{}</span><span class='font-mono'>{}</span></div>",
                escape_html(&m.name),
                state.money(m.amount)
            )
        })
        .collect();

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
    <div class='flex justify-between items-baseline mb-3'>
        <h3 class='text-lg font-semibold'>{}</h3>
        <span class='text-xl font-bold font-mono'>{}</span>
    </div>
    <div class='divide-y text-sm'>{}</div>
</div>"#,
        escape_html(heading),
        state.money(summary.total),
        rows
    )
}

fn expense_table(state: &AppState, household_id: &str, page: &Page<ExpenseDetail>) -> String {
    if page.items.is_empty() {
        return "<tr><td colspan='6' class='px-4 py-6 text-center text-gray-400'>No expenses</td></tr>".to_string();
    }
    page.items
        .iter()
        .map(|e| {
            format!(
                r#"<tr class='border-t'>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2 text-right font-mono'>{}</td>
    <td class='px-4 py-2 text-right'><a href='/{}/edit/expenses/{}' class='text-indigo-600 hover:underline'>Edit</a></td>
</tr>"#,
                escape_html(&e.paid_at),
                escape_html(&e.category_name),
                escape_html(e.tag_name.as_deref().unwrap_or("")),
                escape_html(&e.payer_name),
                state.money(e.amount),
                household_id,
                escape_html(&e.id)
            )
        })
        .collect()
}

fn income_table(state: &AppState, household_id: &str, page: &Page<IncomeDetail>) -> String {
    if page.items.is_empty() {
        return "<tr><td colspan='5' class='px-4 py-6 text-center text-gray-400'>No income</td></tr>".to_string();
    }
    page.items
        .iter()
        .map(|i| {
            format!(
                r#"<tr class='border-t'>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2'>{}</td>
    <td class='px-4 py-2 text-right font-mono'>{}</td>
    <td class='px-4 py-2 text-right'><a href='/{}/edit/incomes/{}' class='text-indigo-600 hover:underline'>Edit</a></td>
</tr>"#,
                escape_html(&i.received_at),
                escape_html(&i.category_name),
                escape_html(&i.payee_name),
                state.money(i.amount),
                household_id,
                escape_html(&i.id)
            )
        })
        .collect()
}

/// Monthly summary: `?ym=YYYY-MM&page=N&ipage=N`
pub async fn page_summary(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Result<Html<String>, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let id = ctx.id().to_string();
    let size = state.service.page_size();
    let ym = YearMonth::from_query(query.get("ym").map(String::as_str));
    let expense_request = PageRequest::from_query(query.get("page").map(String::as_str), size);
    let income_request = PageRequest::from_query(query.get("ipage").map(String::as_str), size);

    let overview = state.service.overview(&ctx, ym).await?;
    let expenses = state.service.expense_page(&ctx, ym, expense_request).await?;
    let incomes = state.service.income_page(&ctx, ym, income_request).await?;
    let months = state.service.active_months(&ctx).await?;

    let base_path = format!("/{}/summary", id);
    let balance_class = if overview.balance < 0 { "text-red-600" } else { "text-green-600" };

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'>
    <h2 class='text-2xl font-bold'>{ym}</h2>
    {selector}
</div>
<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
    {expense_card}
    {income_card}
    <div class='bg-white rounded-xl shadow-sm p-6'>
        <h3 class='text-lg font-semibold mb-3'>Balance</h3>
        <p class='text-2xl font-bold font-mono {balance_class}'>{balance}</p>
    </div>
</div>
<div class='bg-white rounded-xl shadow-sm mb-6'>
    <div class='flex justify-between items-center p-4 border-b'>
        <h3 class='text-lg font-semibold'>Expenses</h3>
        <a href='/{id}/expenses' class='text-sm text-indigo-600 hover:underline'>+ Add</a>
    </div>
    <table class='w-full text-sm'>
        <thead class='bg-gray-50 text-gray-500'><tr><th class='px-4 py-2 text-left'>Date</th><th class='px-4 py-2 text-left'>Category</th><th class='px-4 py-2 text-left'>Tag</th><th class='px-4 py-2 text-left'>Paid by</th><th class='px-4 py-2 text-right'>Amount</th><th></th></tr></thead>
        <tbody>{expense_rows}</tbody>
    </table>
    <div class='pb-4'>{expense_pager}</div>
</div>
<div class='bg-white rounded-xl shadow-sm'>
    <div class='flex justify-between items-center p-4 border-b'>
        <h3 class='text-lg font-semibold'>Income</h3>
        <a href='/{id}/income' class='text-sm text-indigo-600 hover:underline'>+ Add</a>
    </div>
    <table class='w-full text-sm'>
        <thead class='bg-gray-50 text-gray-500'><tr><th class='px-4 py-2 text-left'>Date</th><th class='px-4 py-2 text-left'>Category</th><th class='px-4 py-2 text-left'>Received by</th><th class='px-4 py-2 text-right'>Amount</th><th></th></tr></thead>
        <tbody>{income_rows}</tbody>
    </table>
    <div class='pb-4'>{income_pager}</div>
</div>"#,
        ym = ym,
        selector = month_selector(&base_path, ym, &months),
        expense_card = summary_card(&state, "Expenses by payer", &overview.expenses),
        income_card = summary_card(&state, "Income by payee", &overview.incomes),
        balance_class = balance_class,
        balance = state.money(overview.balance),
        id = id,
        expense_rows = expense_table(&state, &id, &expenses),
        expense_pager = pagination_controls(&format!("{}?ym={}&ipage={}", base_path, ym, incomes.current_page), "page", &expenses),
        income_rows = income_table(&state, &id, &incomes),
        income_pager = pagination_controls(&format!("{}?ym={}&page={}", base_path, ym, expenses.current_page), "ipage", &incomes),
    );

    Ok(page_response(&format!("{} summary", ym), Some(&ctx.household), &base_path, &inner_content))
}
