//! Sign-in, sign-out and sign-up
//!
//! A successful sign-in stores the session token in the console's cookie
//! and redirects to its landing page. Sign-up files a pending user for the
//! admin to review.

use crate::routes::users::draft_from_form;
use crate::{base_html, home_path, parse_form, session_token, signin_path, AppState};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use cashora_core::{Notice, Role, UserDraft};
use cashora_utils::escape_html;

fn alert(notice: &Notice) -> String {
    format!(
        "<div role='alert' class='mb-4 p-3 rounded-lg border border-red-200 bg-red-50'><p class='font-semibold text-red-700'>{}</p><p class='text-sm text-red-600'>{}</p></div>",
        escape_html(&notice.title),
        escape_html(&notice.description)
    )
}

fn signin_page(role: Role, refusal: Option<&Notice>, email: &str) -> String {
    let heading = match role {
        Role::User => "Sign in to your wallet",
        Role::Admin => "Admin sign in",
    };
    let banner = refusal.map(alert).unwrap_or_default();
    let signup = match role {
        Role::User => "<p class='mt-4 text-sm text-center text-gray-500'>No account yet? <a href='/signup' class='text-indigo-600'>Sign up</a></p>",
        Role::Admin => "",
    };

    let content = format!(
        r#"<div class='min-h-screen flex items-center justify-center'>
            <form method='post' action='{}' class='bg-white rounded-xl shadow-sm p-8 w-96'>
                <h1 class='text-2xl font-bold text-indigo-600 mb-1'>Cashora</h1>
                <p class='text-gray-500 mb-6'>{}</p>
                {}
                <label class='block text-sm text-gray-600 mb-1' for='email'>Email</label>
                <input id='email' type='email' name='email' value='{}' required class='w-full px-3 py-2 border rounded-lg mb-4'>
                <label class='block text-sm text-gray-600 mb-1' for='password'>Password</label>
                <input id='password' type='password' name='password' required class='w-full px-3 py-2 border rounded-lg mb-6'>
                <button class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Sign in</button>
                {}
            </form>
        </div>"#,
        signin_path(role),
        heading,
        banner,
        escape_html(email),
        signup
    );
    base_html("Sign in", &content)
}

fn show_signin(state: &AppState, headers: &HeaderMap, role: Role) -> Response {
    let token = session_token(headers, &state.sessions.cookie_name(role));
    if state.sessions.authorize(token.as_deref(), role).is_ok() {
        return Redirect::to(home_path(role)).into_response();
    }
    Html(signin_page(role, None, "")).into_response()
}

fn sign_in(state: &AppState, role: Role, body: &str) -> Response {
    let form = parse_form(body);
    let email = form.get("email").map(|s| s.as_str()).unwrap_or("");
    let password = form.get("password").map(|s| s.as_str()).unwrap_or("");

    match state.sessions.sign_in(role, email, password) {
        Ok(session) => {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                state.sessions.cookie_name(role),
                session.token
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to(home_path(role))).into_response()
        }
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Html(signin_page(role, Some(&Notice::from(&e)), email)),
        )
            .into_response(),
    }
}

fn sign_out(state: &AppState, headers: &HeaderMap, role: Role) -> Response {
    let name = state.sessions.cookie_name(role);
    if let Some(token) = session_token(headers, &name) {
        state.sessions.sign_out(&token);
        if role == Role::User {
            state.chat.end(&token);
        }
    }
    let cookie = format!("{}=; Path=/; Max-Age=0", name);
    ([(header::SET_COOKIE, cookie)], Redirect::to(signin_path(role))).into_response()
}

fn signup_page(refusal: Option<&Notice>, draft: &UserDraft) -> String {
    let input = |name: &str, label: &str, value: &str, kind: &str| {
        format!(
            "<div><label class='block text-sm text-gray-600 mb-1' for='{0}'>{1}</label><input id='{0}' name='{0}' type='{3}' value='{2}' required class='w-full px-3 py-2 border rounded-lg'></div>",
            name,
            label,
            escape_html(value),
            kind
        )
    };
    let dob = draft.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    let content = format!(
        r#"<div class='min-h-screen flex items-center justify-center py-12'>
            <form method='post' action='/signup' class='bg-white rounded-xl shadow-sm p-8 w-full max-w-2xl'>
                <h1 class='text-3xl font-bold text-center'>Create a Cashora Account</h1>
                <p class='text-gray-500 text-center mb-6'>Fill in your details to get started</p>
                {}
                <div class='grid grid-cols-1 md:grid-cols-2 gap-4 mb-6'>{}{}{}{}{}{}{}{}{}</div>
                <button class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Sign Up</button>
                <p class='mt-4 text-sm text-center text-gray-500'>Already have an account? <a href='/signin' class='text-indigo-600'>Sign in</a></p>
            </form>
        </div>"#,
        refusal.map(alert).unwrap_or_default(),
        input("first_name", "First Name", &draft.first_name, "text"),
        input("last_name", "Last Name", &draft.last_name, "text"),
        input("username", "Username", &draft.username, "text"),
        input("email", "Email", &draft.email, "email"),
        input("date_of_birth", "Date of Birth", &dob, "date"),
        input("place_of_birth", "Place of Birth", &draft.place_of_birth, "text"),
        input("residence", "Residence", &draft.residence, "text"),
        input("nationality", "Nationality", &draft.nationality, "text"),
        input("id_card", "ID Card", &draft.id_card, "text")
    );
    base_html("Sign up", &content)
}

fn signup_done(notice: &Notice) -> String {
    let content = format!(
        r#"<div class='min-h-screen flex items-center justify-center'>
            <div class='bg-white rounded-xl shadow-sm p-8 w-96 text-center'>
                <h1 class='text-2xl font-bold text-indigo-600 mb-2'>{}</h1>
                <p class='text-gray-600 mb-6'>{}</p>
                <a href='/signin' class='inline-block px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Back to sign in</a>
            </div>
        </div>"#,
        escape_html(&notice.title),
        escape_html(&notice.description)
    );
    base_html("Account created", &content)
}

pub async fn page_signup() -> Html<String> {
    Html(signup_page(None, &UserDraft::default()))
}

pub async fn signup(state: State<AppState>, body: String) -> Response {
    let draft = draft_from_form(&parse_form(&body));
    let mut workspace = state.workspace.write().await;
    match workspace.users.sign_up(draft.clone()) {
        Ok(notice) => Html(signup_done(&notice)).into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(signup_page(Some(&Notice::from(e)), &draft)),
        )
            .into_response(),
    }
}

pub async fn page_user_signin(state: State<AppState>, headers: HeaderMap) -> Response {
    show_signin(&state, &headers, Role::User)
}

pub async fn page_admin_signin(state: State<AppState>, headers: HeaderMap) -> Response {
    show_signin(&state, &headers, Role::Admin)
}

pub async fn user_signin(state: State<AppState>, body: String) -> Response {
    sign_in(&state, Role::User, &body)
}

pub async fn admin_signin(state: State<AppState>, body: String) -> Response {
    sign_in(&state, Role::Admin, &body)
}

pub async fn user_signout(state: State<AppState>, headers: HeaderMap) -> Response {
    sign_out(&state, &headers, Role::User)
}

pub async fn admin_signout(state: State<AppState>, headers: HeaderMap) -> Response {
    sign_out(&state, &headers, Role::Admin)
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{header, StatusCode};
    use cashora_core::Role;

    #[tokio::test]
    async fn test_admin_sign_in_sets_cookie() {
        let state = state();
        let (status, headers, _) = post(
            &state,
            "/admin/signin",
            None,
            "email=admin%40cashora.com&password=admin123",
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/admin");
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("cashora_session_admin="));
        assert_eq!(state.sessions.active_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_shows_refusal() {
        let state = state();
        let (status, headers, body) = post(
            &state,
            "/signin",
            None,
            "email=user%40cashora.com&password=wrong",
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(headers.get(header::SET_COOKIE).is_none());
        assert!(body.contains("Sign in failed"));
        assert!(body.contains("value='user@cashora.com'"));
        assert_eq!(state.sessions.active_count(), 0);
    }

    #[tokio::test]
    async fn test_signin_page_skips_form_when_signed_in() {
        let state = state();
        let (status, _, body) = get(&state, "/signin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sign in to your wallet"));

        let cookie = cookie(&state, Role::User);
        let (status, headers, _) = get(&state, "/signin", Some(&cookie)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/dashboard");
    }

    #[tokio::test]
    async fn test_sign_out_drops_session() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (status, headers, _) = post(&state, "/admin/signout", Some(&cookie), "").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/admin/signin");
        assert_eq!(state.sessions.active_count(), 0);

        let (status, _, _) = get(&state, "/admin", Some(&cookie)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_sign_up_files_pending_user() {
        let state = state();
        let (status, _, body) = get(&state, "/signup", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Create a Cashora Account"));

        let (status, _, body) = post(
            &state,
            "/signup",
            None,
            "first_name=Ann&last_name=Lee&username=annlee&email=ann%40example.com&date_of_birth=1995-03-02&role=admin",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Account Created"));

        let workspace = state.workspace.read().await;
        let user = workspace.users.get("3").unwrap();
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, cashora_core::Status::Pending);
    }

    #[tokio::test]
    async fn test_sign_up_refusal_keeps_input() {
        let state = state();
        let (status, _, body) = post(
            &state,
            "/signup",
            None,
            "first_name=Johnny&last_name=Doe&email=john%40example.com",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Already Exists"));
        assert!(body.contains("value='Johnny'"));
        assert_eq!(state.workspace.read().await.users.users().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_sign_out_ends_chat() {
        let state = state();
        let cookie = cookie(&state, Role::User);
        let token = cookie.split_once('=').map(|(_, t)| t.to_string()).unwrap();

        post(&state, "/chat/messages", Some(&cookie), "message=deposit").await;
        assert!(state.chat.has_pending(&token));

        let (status, headers, _) = post(&state, "/signout", Some(&cookie), "").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("cashora_session_user=;"));
        assert!(!state.chat.has_pending(&token));
        assert_eq!(state.chat.conversation_count(), 0);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        tokio::task::yield_now().await;
        assert_eq!(state.chat.conversation_count(), 0);
        assert!(state.chat.messages(&token).iter().all(|m| !m.text.contains("To make a deposit")));
    }

    #[tokio::test]
    async fn test_both_consoles_signed_in_side_by_side() {
        let state = state();
        let both = format!("{}; {}", cookie(&state, Role::User), cookie(&state, Role::Admin));

        let (status, _, _) = get(&state, "/dashboard", Some(&both)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = get(&state, "/admin", Some(&both)).await;
        assert_eq!(status, StatusCode::OK);

        post(&state, "/admin/signout", Some(&both), "").await;
        assert_eq!(state.sessions.active_count(), 1);
        let (status, _, _) = get(&state, "/dashboard", Some(&both)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
