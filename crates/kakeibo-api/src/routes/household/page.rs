//! Household dashboard page rendering

use axum::extract::Path;
use axum::response::{Html, IntoResponse, Redirect, Response};
use kakeibo_core::{CoreError, FormErrors, FormValues, HouseholdContext, HouseholdOverview, YearMonth};
use kakeibo_utils::escape_html;

use crate::routes::summary::summary_card;
use crate::{field_error, form_value, page_response, parse_form, AppState, Auth, PageError};

/// Outcome of the last invite submission
enum InviteNotice<'a> {
    None,
    Sent(&'a str),
    Failed(&'a FormValues, &'a FormErrors),
}

fn render_household(state: &AppState, ctx: &HouseholdContext, overview: &HouseholdOverview, notice: InviteNotice<'_>) -> Html<String> {
    let id = ctx.id();
    let balance_class = if overview.balance < 0 { "text-red-600" } else { "text-green-600" };

    let members: String = ctx
        .members
        .iter()
        .map(|m| {
            format!(
                "<li class='flex justify-between py-2'><span>{}</span><span class='text-xs text-gray-400'>{}</span></li>",
                escape_html(&m.name),
                if m.owner { "owner" } else { "" }
            )
        })
        .collect();

    let invite_section = if ctx.member.owner {
        let (values, errors, message) = match notice {
            InviteNotice::None => (None, None, String::new()),
            InviteNotice::Sent(email) => (
                None,
                None,
                format!("<p class='text-sm text-green-600 mb-2'>Invitation sent to {}</p>", escape_html(email)),
            ),
            InviteNotice::Failed(values, errors) => (Some(values), Some(errors), String::new()),
        };
        format!(
            r#"<div class='bg-white rounded-xl shadow-sm p-6'>
    <h3 class='text-lg font-semibold mb-4'>Invite a member</h3>
    {}
    <form method='post' action='/{}' class='space-y-3'>
        <input type='hidden' name='intent' value='invite'>
        <input type='email' name='invitee_email' value='{}' placeholder='Email address' class='w-full px-3 py-2 border rounded-lg'>
        {}
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Send invitation</button>
    </form>
</div>"#,
            message,
            id,
            form_value(values, "invitee_email", ""),
            field_error(errors, "invitee_email"),
        )
    } else {
        String::new()
    };

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'>
    <h2 class='text-2xl font-bold'>{name}</h2>
    <a href='/{id}/summary?ym={ym}' class='text-sm text-indigo-600 hover:underline'>{ym} details &rarr;</a>
</div>
<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
    <div class='bg-white rounded-xl shadow-sm p-6'><p class='text-sm text-gray-500'>Income</p><p class='text-2xl font-bold text-green-600'>{income}</p></div>
    <div class='bg-white rounded-xl shadow-sm p-6'><p class='text-sm text-gray-500'>Expense</p><p class='text-2xl font-bold text-red-600'>{expense}</p></div>
    <div class='bg-white rounded-xl shadow-sm p-6'><p class='text-sm text-gray-500'>Balance</p><p class='text-2xl font-bold {balance_class}'>{balance}</p></div>
</div>
<div class='grid grid-cols-1 md:grid-cols-2 gap-4 mb-6'>
    {expense_card}
    {income_card}
</div>
<div class='grid grid-cols-1 md:grid-cols-2 gap-4'>
    <div class='bg-white rounded-xl shadow-sm p-6'>
        <h3 class='text-lg font-semibold mb-2'>Members</h3>
        <ul class='divide-y'>{members}</ul>
    </div>
    {invite_section}
</div>"#,
        name = escape_html(&ctx.household.name),
        id = id,
        ym = overview.ym,
        income = state.money(overview.incomes.total),
        expense = state.money(overview.expenses.total),
        balance_class = balance_class,
        balance = state.money(overview.balance),
        expense_card = summary_card(state, "Paid by", &overview.expenses),
        income_card = summary_card(state, "Received by", &overview.incomes),
        members = members,
        invite_section = invite_section,
    );

    page_response(&ctx.household.name, Some(&ctx.household), &format!("/{}", id), &inner_content)
}

/// Dashboard for the current month
pub async fn page_household(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
) -> Result<Html<String>, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let overview = state.service.overview(&ctx, YearMonth::current()).await?;
    Ok(render_household(&state, &ctx, &overview, InviteNotice::None))
}

/// `intent=invite` (owners only)
pub async fn household_submit(
    state: axum::extract::State<AppState>,
    auth: Auth,
    path: Path<String>,
    body: String,
) -> Result<Response, PageError> {
    let ctx = auth.household(&state, &path.0).await?;
    let values = parse_form(&body);

    if values.get("intent").map(String::as_str) != Some("invite") {
        return Ok(Redirect::to(&format!("/{}", ctx.id())).into_response());
    }

    let result = state.service.invite(&ctx, &values).await;
    let overview = state.service.overview(&ctx, YearMonth::current()).await?;
    match result {
        Ok(invitation) => {
            Ok(render_household(&state, &ctx, &overview, InviteNotice::Sent(&invitation.invitee_email)).into_response())
        }
        Err(CoreError::InvalidForm(errors)) => {
            Ok(render_household(&state, &ctx, &overview, InviteNotice::Failed(&values, &errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
