//! HTTP server: HTML pages and JSON API
//!
//! Routes are organized into modules:
//! - routes::home: Landing, sign-up, household list and invitations
//! - routes::household: Household dashboard and invitations
//! - routes::summary: Monthly summary with paginated detail lists
//! - routes::expenses / routes::incomes: Entry and edit forms
//! - routes::fixed: Fixed expenses with paid status

pub mod auth;
pub mod error;
pub mod routes;

use axum::{response::Html, routing::get, Router};
use kakeibo_config::Config;
use kakeibo_core::{FormErrors, FormValues, Household, Kakeibo, Page, YearMonth};
use kakeibo_utils::escape_html;
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use auth::{ApiAuth, Auth};
pub use error::{ApiError, PageError};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Kakeibo>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: Arc<Kakeibo>) -> Self {
        let config = service.config().clone();
        Self { service, config }
    }

    /// Amount with separator and currency symbol
    pub fn money(&self, amount: i64) -> String {
        self.service.format_amount(amount)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::expenses::{expense_edit_submit, expense_submit, page_expense_edit, page_expense_new};
    use routes::fixed::{api_fixed, fixed_submit, page_fixed};
    use routes::home::{api_me, home_submit, index_page, page_home, page_signup, signup_submit};
    use routes::household::{api_household_months, api_household_summary, household_submit, page_household};
    use routes::incomes::{income_edit_submit, income_submit, page_income_edit, page_income_new};
    use routes::summary::{api_expenses, api_incomes, page_summary};

    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/me", get(api_me))
        .route("/api/households/:id/summary", get(api_household_summary))
        .route("/api/households/:id/expenses", get(api_expenses))
        .route("/api/households/:id/incomes", get(api_incomes))
        .route("/api/households/:id/fixed", get(api_fixed))
        .route("/api/households/:id/months", get(api_household_months))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .route("/", get(index_page))
        .route("/signup", get(page_signup).post(signup_submit))
        .route("/home", get(page_home).post(home_submit))
        .route("/:id", get(page_household).post(household_submit))
        .route("/:id/summary", get(page_summary))
        .route("/:id/expenses", get(page_expense_new).post(expense_submit))
        .route("/:id/income", get(page_income_new).post(income_submit))
        .route("/:id/fixed", get(page_fixed).post(fixed_submit))
        .route("/:id/edit/expenses/:item", get(page_expense_edit).post(expense_edit_submit))
        .route("/:id/edit/incomes/:item", get(page_income_edit).post(income_edit_submit))
        .merge(api)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Form Helpers ====================

/// Decode an `application/x-www-form-urlencoded` body.
///
/// Repeated keys (multi-select) are joined with commas.
pub fn parse_form(body: &str) -> FormValues {
    let mut values = FormValues::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(&key.replace('+', " ")).map(|s| s.into_owned()).unwrap_or_default();
        let value = urlencoding::decode(&value.replace('+', " ")).map(|s| s.into_owned()).unwrap_or_default();
        values
            .entry(key)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    values
}

/// Previously submitted value, escaped for an attribute
pub fn form_value(values: Option<&FormValues>, field: &str, default: &str) -> String {
    let value = values
        .and_then(|v| v.get(field))
        .map(String::as_str)
        .unwrap_or(default);
    escape_html(value)
}

/// Inline error message under a field
pub fn field_error(errors: Option<&FormErrors>, field: &str) -> String {
    match errors.and_then(|e| e.get(field)) {
        Some(message) => format!("<p class='text-sm text-red-600 mt-1'>{}</p>", escape_html(message)),
        None => String::new(),
    }
}

/// `<option>` list with one entry pre-selected
pub fn select_options<'a>(options: impl IntoIterator<Item = (&'a str, &'a str)>, selected: &str) -> String {
    let mut html = String::from("<option value=''>-</option>");
    for (value, label) in options {
        html.push_str(&format!(
            "<option value='{}' {}>{}</option>",
            escape_html(value),
            if value == selected { "selected" } else { "" },
            escape_html(label)
        ));
    }
    html
}

/// Today's date for date inputs
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Summary page of the month a saved record is dated in
pub fn summary_url(household_id: &str, date: &str) -> String {
    let ym = YearMonth::of_date_str(date).unwrap_or_else(YearMonth::current);
    format!("/{}/summary?ym={}", household_id, ym)
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Kakeibo</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar; household links appear once a household is open
pub fn nav_sidebar(household: Option<&Household>, current_path: &str) -> String {
    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Kakeibo</h1>");
    if let Some(h) = household {
        nav.push_str(&format!("<p class='text-sm text-gray-500 mt-1'>{}</p>", escape_html(&h.name)));
    }
    nav.push_str("</div><ul class='flex-1 py-2 space-y-1 px-2'>");

    let mut links = vec![("/home".to_string(), "Households", "🏠")];
    if let Some(h) = household {
        links.push((format!("/{}", h.id), "Dashboard", "📊"));
        links.push((format!("/{}/summary", h.id), "Summary", "📋"));
        links.push((format!("/{}/expenses", h.id), "Expense", "💸"));
        links.push((format!("/{}/income", h.id), "Income", "💰"));
        links.push((format!("/{}/fixed", h.id), "Fixed costs", "📌"));
    }

    for (path, label, icon) in &links {
        let active_class = if current_path == path {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Full page with sidebar
pub fn page_response(title: &str, household: Option<&Household>, current_path: &str, inner_content: &str) -> Html<String> {
    Html(base_html(
        title,
        &format!(
            r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(household, current_path),
            inner_content
        ),
    ))
}

/// Previous/next month links plus a picker of months with records
pub fn month_selector(base_path: &str, ym: YearMonth, months: &[YearMonth]) -> String {
    let mut options = String::new();
    let mut listed = months.to_vec();
    if !listed.contains(&ym) {
        listed.push(ym);
        listed.sort_by(|a, b| b.cmp(a));
    }
    for m in &listed {
        options.push_str(&format!(
            "<option value='{}' {}>{}</option>",
            m,
            if *m == ym { "selected" } else { "" },
            m
        ));
    }

    format!(
        r#"<div class='flex items-center gap-2'>
    <a href='{base}?ym={prev}' class='px-3 py-1 border rounded-lg hover:bg-gray-100'>&larr;</a>
    <form method='get' action='{base}'>
        <select name='ym' onchange='this.form.submit()' class='px-3 py-1 border rounded-lg'>{options}</select>
    </form>
    <a href='{base}?ym={next}' class='px-3 py-1 border rounded-lg hover:bg-gray-100'>&rarr;</a>
</div>"#,
        base = base_path,
        prev = ym.prev(),
        next = ym.next(),
        options = options
    )
}

/// "current / total" with prev/next links. An empty list reads "1 / 1".
pub fn pagination_controls<T>(base_url: &str, param: &str, page: &Page<T>) -> String {
    // base_url is a plain URL; separators are escaped for the attribute
    let href_base = base_url.replace('&', "&amp;");
    let link = |target: usize, label: &str, enabled: bool| {
        if enabled {
            format!(
                "<a href='{}&amp;{}={}' class='px-3 py-1 border rounded-lg hover:bg-gray-100'>{}</a>",
                href_base, param, target, label
            )
        } else {
            format!("<span class='px-3 py-1 border rounded-lg text-gray-300'>{}</span>", label)
        }
    };

    format!(
        r#"<div class='flex items-center justify-center gap-3 mt-4'>{}<span class='text-sm text-gray-600'>{} / {}</span>{}</div>"#,
        link(page.prev_page(), "&larr;", page.has_prev()),
        page.current_page,
        page.display_total_pages(),
        link(page.next_page(), "&rarr;", page.has_next())
    )
}

// ==================== Server ====================

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

/// Start the HTTP server and serve until Ctrl-C
pub async fn start_server(service: Arc<Kakeibo>) -> std::io::Result<()> {
    let state = AppState::new(service);
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Starting kakeibo server on http://{}", addr);
    info!("Available routes:");
    info!("  - /home (Households and invitations)");
    info!("  - /:id (Dashboard), /:id/summary, /:id/expenses, /:id/income, /:id/fixed");
    info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Response};
    use kakeibo_store::SqliteStore;
    use tower::ServiceExt;

    pub async fn state() -> AppState {
        state_with(Config::default()).await
    }

    pub async fn state_with(config: Config) -> AppState {
        let store = SqliteStore::in_memory().await.unwrap();
        AppState::new(Arc::new(Kakeibo::new(config, Arc::new(store))))
    }

    pub async fn get(state: &AppState, uri: &str, email: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(email) = email {
            request = request.header("x-forwarded-email", email);
        }
        create_router(state.clone())
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post(state: &AppState, uri: &str, email: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-forwarded-email", email)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    pub async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub fn location(response: &Response<Body>) -> String {
        response.headers()["location"].to_str().unwrap().to_string()
    }

    /// Registered user with one household; returns the household id
    pub async fn signed_up_with_household(state: &AppState, email: &str, name: &str) -> String {
        post(state, "/signup", email, &format!("name={}", name)).await;
        let response = post(state, "/home", email, "intent=create&name=Home").await;
        location(&response).trim_start_matches('/').to_string()
    }

    async fn context(state: &AppState, household_id: &str, email: &str) -> kakeibo_core::HouseholdContext {
        let user = state.service.resolve_auth(Some(email)).await.unwrap().require_user().unwrap();
        state.service.authorize(household_id, &user).await.unwrap()
    }

    /// First expense category id and the user's member id
    pub async fn expense_refs(state: &AppState, household_id: &str, email: &str) -> (String, String) {
        let ctx = context(state, household_id, email).await;
        let options = state.service.form_options(&ctx).await.unwrap();
        (options.expense_categories[0].id.clone(), ctx.member.id.clone())
    }

    /// First income category id and the user's member id
    pub async fn income_refs(state: &AppState, household_id: &str, email: &str) -> (String, String) {
        let ctx = context(state, household_id, email).await;
        let options = state.service.form_options(&ctx).await.unwrap();
        (options.income_categories[0].id.clone(), ctx.member.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{body_string, get, state};
    use super::{pagination_controls, parse_form, summary_url};
    use axum::http::StatusCode;
    use kakeibo_core::{paginate, Page, PageRequest};

    #[test]
    fn test_parse_form() {
        let values = parse_form("name=Ann+Lee&note=a%26b&tags=t1&tags=t2&empty=");
        assert_eq!(values["name"], "Ann Lee");
        assert_eq!(values["note"], "a&b");
        assert_eq!(values["tags"], "t1,t2");
        assert_eq!(values["empty"], "");
    }

    #[test]
    fn test_summary_url() {
        assert_eq!(summary_url("h1", "2024-03-09"), "/h1/summary?ym=2024-03");
    }

    #[test]
    fn test_pagination_controls_empty_list() {
        let page: Page<u8> = paginate(vec![], PageRequest::new(1, 20));
        let html = pagination_controls("/h/summary?ym=2024-01", "page", &page);
        assert!(html.contains("1 / 1"));
    }

    #[test]
    fn test_pagination_links_escape_ampersands() {
        let page: Page<u8> = paginate((0..30).collect(), PageRequest::new(1, 10));
        let html = pagination_controls("/h/summary?ym=2024-01&ipage=2", "page", &page);
        assert!(html.contains("href='/h/summary?ym=2024-01&amp;ipage=2&amp;page=2'"));
        assert!(!html.contains("&ipage"));
        assert!(!html.contains("&page"));
    }

    #[tokio::test]
    async fn test_health() {
        let state = state().await;
        let response = get(&state, "/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn test_dev_email_fallback() {
        let mut state = state().await;
        state.config.server.auth.dev_email = Some("dev@example.com".to_string());

        let response = get(&state, "/api/me", None).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["state"], "registering");
        assert_eq!(json["email"], "dev@example.com");
    }
}
