//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::auth: Sign-in and sign-out for both consoles, sign-up
//! - routes::transactions: Admin history, user activity, JSON API
//! - routes::requests: Deposit, withdrawal and send review queues
//! - routes::users / routes::banks: Admin directories
//! - routes::settings / routes::email: System settings and email composer
//! - routes::profile: Profile pages of both consoles
//! - routes::wallet: User dashboard forms
//! - routes::chat: Support chat widget

pub mod error;
pub mod routes;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use cashora_config::Config;
use cashora_core::{ChatScheduler, Notice, Overview, Role, Session, SessionStore, Workspace};
use cashora_utils::{escape_html, format_money};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<RwLock<Workspace>>,
    pub sessions: Arc<SessionStore>,
    pub chat: Arc<ChatScheduler>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, workspace: Workspace) -> Self {
        Self {
            workspace: Arc::new(RwLock::new(workspace)),
            sessions: Arc::new(SessionStore::new(config.auth.clone())),
            chat: Arc::new(ChatScheduler::canned(&config.chat)),
            config,
        }
    }

    /// State with the sample records on every screen
    pub fn seeded(config: Config) -> Self {
        let workspace = Workspace::seeded(&config.wallet);
        Self::new(config, workspace)
    }

    /// Render an amount with the configured currency symbol
    pub fn money(&self, amount: rust_decimal::Decimal) -> String {
        format_money(&self.config.wallet.currency_symbol, amount)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use cashora_core::TransactionKind;
    use routes::auth::{admin_signin, admin_signout, page_admin_signin, page_signup, page_user_signin, signup, user_signin, user_signout};
    use routes::banks::{htmx_bank_add, htmx_bank_assign, htmx_bank_delete, htmx_bank_rename, htmx_banks_list, page_banks};
    use routes::chat::{htmx_chat_messages, htmx_chat_send};
    use routes::email::{htmx_email_send, page_email};
    use routes::profile::{htmx_admin_profile, htmx_user_avatar, page_admin_profile, page_user_profile};
    use routes::settings::{htmx_settings_save, page_settings};
    use routes::transactions::{api_transaction_detail, api_transactions, htmx_activity_list, htmx_transaction_detail, htmx_transactions_list, page_transactions};
    use routes::users::{htmx_user_add, htmx_user_approve, htmx_user_delete, htmx_user_edit_form, htmx_user_reject, htmx_user_update, htmx_users_list, page_users};
    use routes::wallet::{htmx_deposit_submit, htmx_send_confirm, htmx_send_quote, htmx_withdraw_confirm, htmx_withdraw_quote, page_dashboard, page_deposit, page_send, page_withdraw};

    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/transactions", get(api_transactions))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/summary", get(api_summary))
        .layer(ServiceBuilder::new().layer(cors));

    Router::new()
        .merge(api)
        // Sign-in
        .route("/", get(index_page))
        .route("/signin", get(page_user_signin).post(user_signin))
        .route("/signout", post(user_signout))
        .route("/signup", get(page_signup).post(signup))
        .route("/admin/signin", get(page_admin_signin).post(admin_signin))
        .route("/admin/signout", post(admin_signout))
        // User dashboard
        .route("/dashboard", get(page_dashboard))
        .route("/dashboard/transactions/list", get(htmx_activity_list))
        .route("/dashboard/deposit", get(page_deposit).post(htmx_deposit_submit))
        .route("/dashboard/withdraw", get(page_withdraw).post(htmx_withdraw_quote))
        .route("/dashboard/withdraw/confirm", post(htmx_withdraw_confirm))
        .route("/dashboard/send", get(page_send).post(htmx_send_quote))
        .route("/dashboard/send/confirm", post(htmx_send_confirm))
        .route("/dashboard/profile", get(page_user_profile).post(htmx_user_avatar))
        .route("/chat/messages", get(htmx_chat_messages).post(htmx_chat_send))
        // Admin console
        .route("/admin", get(page_admin_overview))
        .route("/admin/transactions", get(page_transactions))
        .route("/admin/transactions/list", get(htmx_transactions_list))
        .route("/admin/transactions/:id/detail", get(htmx_transaction_detail))
        .nest("/admin/deposit-requests", routes::requests::router(TransactionKind::Deposit))
        .nest("/admin/withdrawal-requests", routes::requests::router(TransactionKind::Withdrawal))
        .nest("/admin/send-requests", routes::requests::router(TransactionKind::Send))
        .route("/admin/users", get(page_users).post(htmx_user_add))
        .route("/admin/users/list", get(htmx_users_list))
        .route("/admin/users/:id", post(htmx_user_update))
        .route("/admin/users/:id/edit", get(htmx_user_edit_form))
        .route("/admin/users/:id/delete", post(htmx_user_delete))
        .route("/admin/users/:id/approve", post(htmx_user_approve))
        .route("/admin/users/:id/reject", post(htmx_user_reject))
        .route("/admin/banks", get(page_banks).post(htmx_bank_add))
        .route("/admin/banks/list", get(htmx_banks_list))
        .route("/admin/banks/:id", post(htmx_bank_rename))
        .route("/admin/banks/:id/delete", post(htmx_bank_delete))
        .route("/admin/banks/:id/assign", post(htmx_bank_assign))
        .route("/admin/email", get(page_email).post(htmx_email_send))
        .route("/admin/settings", get(page_settings).post(htmx_settings_save))
        .route("/admin/profile", get(page_admin_profile).post(htmx_admin_profile))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Admin overview (JSON API)
async fn api_summary(state: State<AppState>, headers: HeaderMap) -> ApiResult<String> {
    require_api_session(&state, &headers)?;
    let workspace = state.workspace.read().await;
    let summary = workspace.admin_overview(5);
    Ok(serde_json::to_string(&summary).unwrap_or_default())
}

async fn index_page() -> Redirect {
    Redirect::to("/signin")
}

// ==================== Sessions ====================

/// Where a console's sign-in form lives
pub fn signin_path(role: Role) -> &'static str {
    match role {
        Role::User => "/signin",
        Role::Admin => "/admin/signin",
    }
}

/// Landing page of a console
pub fn home_path(role: Role) -> &'static str {
    match role {
        Role::User => "/dashboard",
        Role::Admin => "/admin",
    }
}

/// Read the session token from the Cookie header
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
}

/// Resolve the request's session or send the browser to sign in
pub fn require_session(state: &AppState, headers: &HeaderMap, role: Role) -> Result<Session, Response> {
    let token = session_token(headers, &state.sessions.cookie_name(role));
    state
        .sessions
        .authorize(token.as_deref(), role)
        .map_err(|_| redirect(headers, signin_path(role)))
}

/// Session check for the JSON API: 401 instead of a redirect
pub fn require_api_session(state: &AppState, headers: &HeaderMap) -> ApiResult<Session> {
    let token = session_token(headers, &state.sessions.cookie_name(Role::Admin));
    state
        .sessions
        .authorize(token.as_deref(), Role::Admin)
        .map_err(|_| ApiError::Unauthorized)
}

/// Redirect that also works for HTMX requests
pub fn redirect(headers: &HeaderMap, path: &str) -> Response {
    if is_htmx_request(headers) {
        ([("hx-redirect", path.to_string())], "").into_response()
    } else {
        Redirect::to(path).into_response()
    }
}

// ==================== Forms ====================

/// Decode an `application/x-www-form-urlencoded` body, keeping repeated keys
pub fn form_pairs(body: &str) -> Vec<(String, String)> {
    fn decode(raw: &str) -> String {
        let spaced = raw.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|s| s.into_owned())
            .unwrap_or(spaced)
    }

    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(pair), String::new()),
        })
        .collect()
}

/// Decode a form body; for repeated keys the last value wins
pub fn parse_form(body: &str) -> HashMap<String, String> {
    form_pairs(body).into_iter().collect()
}

pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
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
    <title>{} - Cashora</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id="toast"></div>
    <script>
        document.body.addEventListener('htmx:oobAfterSwap', function(e) {{
            if (e.detail.target.id === 'toast') {{
                setTimeout(function() {{ e.detail.target.innerHTML = ''; }}, 5000);
            }}
        }});
    </script>
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar of a console
pub fn nav_sidebar(role: Role, current_path: &str) -> String {
    let links: &[(&str, &str, &str)] = match role {
        Role::Admin => &[
            ("/admin", "Overview", "📊"),
            ("/admin/transactions", "Transactions", "📋"),
            ("/admin/deposit-requests", "Deposit Requests", "📥"),
            ("/admin/withdrawal-requests", "Withdrawal Requests", "📤"),
            ("/admin/send-requests", "Send Requests", "🔁"),
            ("/admin/users", "Users", "👥"),
            ("/admin/banks", "Banks", "🏦"),
            ("/admin/email", "Email", "✉️"),
            ("/admin/settings", "Settings", "⚙️"),
            ("/admin/profile", "Profile", "👤"),
        ],
        Role::User => &[
            ("/dashboard", "Dashboard", "📊"),
            ("/dashboard/deposit", "Deposit", "📥"),
            ("/dashboard/withdraw", "Withdraw", "📤"),
            ("/dashboard/send", "Send Money", "🔁"),
            ("/dashboard/profile", "Profile", "👤"),
        ],
    };
    let home = home_path(role);
    let signout = match role {
        Role::Admin => "/admin/signout",
        Role::User => "/signout",
    };

    let mut nav = format!(
        "<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Cashora</h1><p class='text-xs text-gray-500'>{}</p></div><ul class='flex-1 py-2 space-y-1 px-2'>",
        if role == Role::Admin { "Admin console" } else { "My wallet" }
    );

    for (path, label, icon) in links {
        let is_active = if *path == home {
            current_path == home
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str(&format!(
        r#"</ul><form method='post' action='{}' class='p-4 border-t'><button class='w-full px-3 py-2 text-sm text-gray-600 rounded-lg hover:bg-gray-50'>Sign out</button></form></div>"#,
        signout
    ));
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, role: Role, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        let widget = match role {
            Role::User => routes::chat::chat_widget(),
            Role::Admin => String::new(),
        };
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>{}"#,
            nav_sidebar(role, current_path), inner_content, widget))
    }
}

/// Out-of-band toast for a notice
pub fn toast_html(notice: &Notice) -> String {
    let (variant, box_class, title_class) = if notice.is_destructive() {
        ("destructive", "bg-red-50 border-red-200", "text-red-700")
    } else {
        ("default", "bg-white border-gray-200", "text-gray-900")
    };
    format!(
        r#"<div id='toast' hx-swap-oob='true' class='fixed bottom-4 right-4 z-50'><div role='status' data-variant='{}' class='w-80 rounded-lg border shadow-lg p-4 {}'><p class='font-semibold {}'>{}</p><p class='text-sm text-gray-600 mt-1'>{}</p></div></div>"#,
        variant,
        box_class,
        title_class,
        escape_html(&notice.title),
        escape_html(&notice.description)
    )
}

/// HTMX fragment followed by its toast
pub fn with_toast(fragment: String, notice: &Notice) -> Html<String> {
    Html(format!("{}{}", fragment, toast_html(notice)))
}

/// Admin overview page
async fn page_admin_overview(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    let session = require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;
    let overview = workspace.admin_overview(5);

    let recent: Vec<String> = overview.recent.iter().map(|t| {
        format!(
            "<div class='flex justify-between py-2 border-b'><span>#{} {} {}</span><span class='font-medium'>{}</span></div>",
            escape_html(&t.id),
            t.kind.title(),
            routes::status_badge(t.status),
            state.money(t.amount)
        )
    }).collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Overview</h2><p class='text-sm text-gray-500'>Signed in as {}</p></div>
        <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Users</p><p class='text-2xl font-bold text-indigo-700'>{}</p><p class='text-xs text-indigo-500'>{} pending</p></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Pending requests</p><p class='text-2xl font-bold text-yellow-700'>{}</p><p class='text-xs text-yellow-600'>{} deposits, {} withdrawals, {} sends</p></div>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Completed deposits</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Completed volume</p><p class='text-2xl font-bold text-blue-700'>{}</p><p class='text-xs text-blue-500'>withdrawals {}, sends {}</p></div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Recent transactions</h3>
            <div class='space-y-1'>{}</div>
        </div>"#,
        escape_html(&session.email),
        overview.total_users,
        overview.pending_users,
        overview.pending_requests(),
        overview.pending_deposits,
        overview.pending_withdrawals,
        overview.pending_sends,
        state.money(overview.deposit_volume),
        state.money(overview.completed_volume()),
        state.money(overview.withdrawal_volume),
        state.money(overview.send_volume),
        recent.join("")
    );

    Ok(Html(page_response(&headers, Role::Admin, "Overview", "/admin", &inner_content)))
}

/// Start the HTTP server
///
/// Binds the configured address and serves until Ctrl-C.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Cashora server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /signin (User dashboard)");
    log::info!("  - /admin/signin (Admin console)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

// ==================== Tests ====================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    pub fn state() -> AppState {
        AppState::seeded(Config::default())
    }

    /// Cookie header of a fresh session
    pub fn cookie(state: &AppState, role: Role) -> String {
        let credentials = match role {
            Role::User => &state.config.auth.user,
            Role::Admin => &state.config.auth.admin,
        };
        let session = state
            .sessions
            .sign_in(role, &credentials.email, &credentials.password)
            .unwrap();
        format!("{}={}", state.sessions.cookie_name(role), session.token)
    }

    pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(state: &AppState, uri: &str, cookie: Option<&str>) -> (StatusCode, HeaderMap, String) {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        send(state, builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(state: &AppState, uri: &str, cookie: Option<&str>, body: &str) -> (StatusCode, HeaderMap, String) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        send(state, builder.body(Body::from(body.to_string())).unwrap()).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::{form_pairs, session_token, toast_html};
    use axum::http::{header, HeaderMap, StatusCode};
    use cashora_core::{Notice, Role};

    #[test]
    fn test_form_pairs_decode() {
        let pairs = form_pairs("q=john+doe&email=a%40b.com&user_ids=1&user_ids=3&flag");
        assert_eq!(pairs[0], ("q".to_string(), "john doe".to_string()));
        assert_eq!(pairs[1].1, "a@b.com");
        assert_eq!(pairs.iter().filter(|(k, _)| k == "user_ids").count(), 2);
        assert_eq!(pairs[4], ("flag".to_string(), String::new()));
    }

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; cashora_session=abc123".parse().unwrap());
        assert_eq!(session_token(&headers, "cashora_session").as_deref(), Some("abc123"));
        assert_eq!(session_token(&headers, "other"), None);
    }

    #[test]
    fn test_toast_variants() {
        let ok = toast_html(&Notice::new("Deposit Approved", "done"));
        assert!(ok.contains("data-variant='default'"));
        assert!(ok.contains("hx-swap-oob='true'"));
        let refused = toast_html(&Notice::destructive("Rejection Failed", "<b>"));
        assert!(refused.contains("data-variant='destructive'"));
        assert!(refused.contains("&lt;b&gt;"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = state();
        let (status, _, body) = get(&state, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_admin_pages_redirect_without_session() {
        let state = state();
        let (status, headers, _) = get(&state, "/admin/transactions", None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/admin/signin");
    }

    #[tokio::test]
    async fn test_user_session_cannot_open_admin_console() {
        let state = state();
        let cookie = cookie(&state, Role::User);
        let (status, _, _) = get(&state, "/admin", Some(&cookie)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_htmx_redirect_header() {
        let state = state();
        let (status, headers, _) = post(&state, "/admin/deposit-requests/1/approve", None, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("hx-redirect").unwrap(), "/admin/signin");
        // nothing changed
        let workspace = state.workspace.read().await;
        assert!(workspace.deposit_requests.get("1").unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_admin_overview_page() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (status, _, body) = get(&state, "/admin", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Pending requests"));
        assert!(body.contains("admin@cashora.com"));
    }

    #[tokio::test]
    async fn test_api_summary_requires_admin() {
        let state = state();
        let (status, _, body) = get(&state, "/api/summary", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));

        let cookie = cookie(&state, Role::Admin);
        let (status, _, body) = get(&state, "/api/summary", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        let summary: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["pending_deposits"], 2);
        assert_eq!(summary["deposit_volume"], "1000");
    }

    #[tokio::test]
    async fn test_root_redirects_to_signin() {
        let state = state();
        let (status, headers, _) = get(&state, "/", None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/signin");
    }
}
