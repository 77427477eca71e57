//! Home page rendering - Landing, sign-up and household list

use axum::response::{Html, IntoResponse, Redirect, Response};
use kakeibo_core::{AuthState, CoreError, CurrentUser, FormErrors, FormValues, HomeView};
use kakeibo_utils::escape_html;

use crate::{base_html, field_error, form_value, page_response, parse_form, AppState, Auth, PageError};

/// Landing page: routes signed-in users onward
pub async fn index_page(auth: Auth) -> Response {
    match auth.0 {
        AuthState::Authenticated { .. } => Redirect::to("/home").into_response(),
        AuthState::Registering { .. } => Redirect::to("/signup").into_response(),
        AuthState::Unauthorized => Html(base_html(
            "Welcome",
            r#"<div class='max-w-lg mx-auto mt-24 bg-white rounded-xl shadow-sm p-8 text-center'>
    <h1 class='text-3xl font-bold text-indigo-600 mb-4'>Kakeibo</h1>
    <p class='text-gray-600 mb-6'>A shared account book for your household. Record expenses and income, and see who paid what each month.</p>
    <p class='text-sm text-gray-500'>Sign in through your identity provider to continue.</p>
</div>"#,
        ))
        .into_response(),
    }
}

fn render_signup(email: &str, values: Option<&FormValues>, errors: Option<&FormErrors>) -> Html<String> {
    let content = format!(
        r#"<div class='max-w-md mx-auto mt-16 bg-white rounded-xl shadow-sm p-8'>
    <h2 class='text-2xl font-bold mb-6 text-center'>Sign up</h2>
    <form method='post' action='/signup' class='space-y-4'>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Signed-in email</label>
            <input type='email' name='email' value='{}' readonly class='w-full px-3 py-2 border rounded-lg bg-gray-100'>
        </div>
        <div>
            <label class='block text-sm text-gray-600 mb-1'>Display name</label>
            <input type='text' name='name' value='{}' class='w-full px-3 py-2 border rounded-lg'>
            {}
        </div>
        <button type='submit' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Register</button>
    </form>
</div>"#,
        escape_html(email),
        form_value(values, "name", ""),
        field_error(errors, "name"),
    );
    Html(base_html("Sign up", &content))
}

/// Registration form for a signed-in email without a user row
pub async fn page_signup(auth: Auth) -> Response {
    match auth.0 {
        AuthState::Unauthorized => Redirect::to("/").into_response(),
        AuthState::Authenticated { .. } => Redirect::to("/home").into_response(),
        AuthState::Registering { email } => render_signup(&email, None, None).into_response(),
    }
}

pub async fn signup_submit(state: axum::extract::State<AppState>, auth: Auth, body: String) -> Result<Response, PageError> {
    let values = parse_form(&body);
    match state.service.register(&auth.0, &values).await {
        Ok(_) => Ok(Redirect::to("/home").into_response()),
        Err(CoreError::InvalidForm(errors)) => {
            let email = auth.0.email().unwrap_or_default();
            Ok(render_signup(email, Some(&values), Some(&errors)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

fn render_home(user: &CurrentUser, view: &HomeView, values: Option<&FormValues>, errors: Option<&FormErrors>) -> Html<String> {
    let households = if view.households.is_empty() {
        "<p class='text-gray-500'>No households yet. Create one below or accept an invitation.</p>".to_string()
    } else {
        view.households
            .iter()
            .map(|h| {
                format!(
                    "<a href='/{}' class='block bg-white rounded-xl shadow-sm p-4 hover:bg-indigo-50'><span class='font-medium'>{}</span></a>",
                    h.id,
                    escape_html(&h.name)
                )
            })
            .collect::<Vec<_>>()
            .join("")
    };

    let invitations: String = view
        .invitations
        .iter()
        .map(|inv| {
            format!(
                r#"<div class='flex items-center justify-between bg-yellow-50 border border-yellow-200 rounded-lg p-4'>
    <p><span class='font-medium'>{}</span> invited you to <span class='font-medium'>{}</span></p>
    <form method='post' action='/home' class='flex gap-2'>
        <input type='hidden' name='invitation_id' value='{}'>
        <button name='intent' value='accept' class='px-3 py-1 bg-indigo-600 text-white rounded-lg'>Accept</button>
        <button name='intent' value='decline' class='px-3 py-1 border rounded-lg'>Decline</button>
    </form>
</div>"#,
                escape_html(&inv.inviter_name),
                escape_html(&inv.household_name),
                escape_html(&inv.id)
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Welcome, {}</h2></div>
<div class='space-y-3 mb-6'>{}</div>
<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-8'>{}</div>
<div class='bg-white rounded-xl shadow-sm p-6 max-w-md'>
    <h3 class='text-lg font-semibold mb-4'>New household</h3>
    <form method='post' action='/home' class='space-y-3'>
        <input type='hidden' name='intent' value='create'>
        <input type='text' name='name' value='{}' placeholder='Household name' class='w-full px-3 py-2 border rounded-lg'>
        {}
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Create</button>
    </form>
</div>"#,
        escape_html(&user.name),
        invitations,
        households,
        form_value(values, "name", ""),
        field_error(errors, "name"),
    );

    page_response("Households", None, "/home", &inner_content)
}

/// Households of the signed-in user plus pending invitations
pub async fn page_home(state: axum::extract::State<AppState>, auth: Auth) -> Result<Html<String>, PageError> {
    let user = auth.require_user()?;
    let view = state.service.home(&user).await?;
    Ok(render_home(&user, &view, None, None))
}

/// `intent=create|accept|decline`
pub async fn home_submit(state: axum::extract::State<AppState>, auth: Auth, body: String) -> Result<Response, PageError> {
    let user = auth.require_user()?;
    let values = parse_form(&body);
    let intent = values.get("intent").map(String::as_str).unwrap_or("");
    let invitation_id = values.get("invitation_id").map(String::as_str).unwrap_or("");

    match intent {
        "create" => match state.service.create_household(&user, &values).await {
            Ok(household) => Ok(Redirect::to(&format!("/{}", household.id)).into_response()),
            Err(CoreError::InvalidForm(errors)) => {
                let view = state.service.home(&user).await?;
                Ok(render_home(&user, &view, Some(&values), Some(&errors)).into_response())
            }
            Err(e) => Err(e.into()),
        },
        "accept" => {
            let invitation = state.service.respond_invitation(&user, invitation_id, true).await?;
            Ok(Redirect::to(&format!("/{}", invitation.household_id)).into_response())
        }
        "decline" => {
            state.service.respond_invitation(&user, invitation_id, false).await?;
            Ok(Redirect::to("/home").into_response())
        }
        _ => Ok(Redirect::to("/home").into_response()),
    }
}
