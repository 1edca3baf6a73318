//! User directory - list, add, edit, delete, approve, reject

use crate::routes::{empty_row, param, sort_from_params, status_badge, status_select, ListTarget};
use crate::{page_response, parse_form, require_session, with_toast, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{project, FeeType, Limits, Notice, Role, User, UserDraft, UserField, UserFilter, ViewQuery};
use cashora_utils::escape_html;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub const USERS_LIST: ListTarget<'static> = ListTarget {
    url: "/admin/users/list",
    form_id: "users-filters",
    target: "users-list",
};

/// User list query: `q`, `status`, `sort`, `dir`, `click`
pub fn user_query(params: &HashMap<String, String>) -> ViewQuery<User> {
    ViewQuery::default()
        .with_search(params.get("q").map(|s| s.as_str()).unwrap_or(""))
        .with_filter(UserFilter::parse(param(params, "status")))
        .with_sort(sort_from_params(params))
}

fn limits_from_form(params: &HashMap<String, String>, prefix: &str) -> Option<Limits> {
    let keys = ["weekly", "monthly", "yearly"].map(|period| format!("{}_{}", prefix, period));
    if keys.iter().all(|k| !params.contains_key(k)) {
        return None;
    }
    let value = |key: &str| param(params, key).and_then(|v| v.trim().parse::<Decimal>().ok());
    Some(Limits {
        weekly: value(&keys[0]),
        monthly: value(&keys[1]),
        yearly: value(&keys[2]),
    })
}

/// Build a draft from the add/edit form
pub fn draft_from_form(params: &HashMap<String, String>) -> UserDraft {
    let text = |key: &str| params.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
    UserDraft {
        first_name: text("first_name"),
        last_name: text("last_name"),
        username: text("username"),
        email: text("email"),
        date_of_birth: param(params, "date_of_birth")
            .and_then(|d| chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
        place_of_birth: text("place_of_birth"),
        residence: text("residence"),
        nationality: text("nationality"),
        id_card: text("id_card"),
        role: param(params, "role").and_then(|r| r.parse().ok()).unwrap_or_default(),
        withdrawal_limit: limits_from_form(params, "withdrawal"),
        sending_limit: limits_from_form(params, "sending"),
        fee_type: param(params, "fee_type").and_then(|f| f.parse().ok()),
        fee_amount: param(params, "fee_amount").and_then(|f| f.trim().parse().ok()),
    }
}

fn input(name: &str, label: &str, value: &str, kind: &str) -> String {
    format!(
        "<div><label class='block text-sm text-gray-600 mb-1' for='{0}'>{1}</label><input id='{0}' name='{0}' type='{3}' value='{2}' placeholder='{1}' class='w-full px-3 py-2 border rounded-lg'></div>",
        name,
        label,
        escape_html(value),
        kind
    )
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!("<option value='{}'{}>{}</option>", value, if selected { " selected" } else { "" }, label)
}

fn limit_inputs(prefix: &str, label: &str, limits: &Limits) -> String {
    let show = |v: Option<Decimal>| v.map(|d| d.normalize().to_string()).unwrap_or_default();
    let field = |period: &str, title: &str, value: Option<Decimal>| {
        format!(
            "<div><label class='block text-xs text-gray-500 mb-1'>{}</label><input name='{}_{}' value='{}' placeholder='No limit' class='w-full px-3 py-2 border rounded-lg'></div>",
            title, prefix, period, show(value)
        )
    };
    format!(
        "<fieldset class='col-span-2'><legend class='text-sm text-gray-600 mb-1'>{}</legend><div class='grid grid-cols-3 gap-2'>{}{}{}</div></fieldset>",
        label,
        field("weekly", "Weekly", limits.weekly),
        field("monthly", "Monthly", limits.monthly),
        field("yearly", "Yearly", limits.yearly)
    )
}

/// Add form, or the edit form of an existing user
fn user_form(user: Option<&User>) -> String {
    let blank = User {
        id: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        username: String::new(),
        email: String::new(),
        date_of_birth: None,
        place_of_birth: String::new(),
        residence: String::new(),
        nationality: String::new(),
        id_card: String::new(),
        role: Role::User,
        status: Default::default(),
        balance: Decimal::ZERO,
        withdrawal_limit: Limits::default(),
        sending_limit: Limits::default(),
        fee_type: FeeType::default(),
        fee_amount: Decimal::ZERO,
    };
    let editing = user.is_some();
    let u = user.unwrap_or(&blank);
    let dob = u.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    let (heading, action, submit) = if editing {
        (
            format!("Edit {}", escape_html(&u.full_name())),
            format!("/admin/users/{}", urlencoding::encode(&u.id)),
            "Save Changes",
        )
    } else {
        ("Add User".to_string(), "/admin/users".to_string(), "Add User")
    };

    let extra = if editing {
        format!(
            "{}{}<div><label class='block text-sm text-gray-600 mb-1' for='fee_type'>Fee Type</label><select id='fee_type' name='fee_type' class='w-full px-3 py-2 border rounded-lg bg-white'>{}{}</select></div>{}",
            limit_inputs("withdrawal", "Withdrawal Limits", &u.withdrawal_limit),
            limit_inputs("sending", "Sending Limits", &u.sending_limit),
            option("fixed", "Fixed", u.fee_type == FeeType::Fixed),
            option("percentage", "Percentage", u.fee_type == FeeType::Percentage),
            input("fee_amount", "Fee Amount", &u.fee_amount.normalize().to_string(), "text")
        )
    } else {
        String::new()
    };

    format!(
        r#"<form class='bg-white rounded-xl shadow-sm p-6 mb-6' hx-post='{}' hx-target='#{}' hx-include='#{}'>
            <h3 class='text-lg font-semibold mb-4'>{}</h3>
            <div class='grid grid-cols-2 gap-4'>
                {}{}{}{}{}{}{}{}{}
                <div><label class='block text-sm text-gray-600 mb-1' for='role'>Role</label><select id='role' name='role' class='w-full px-3 py-2 border rounded-lg bg-white'>{}{}</select></div>
                {}
            </div>
            <div class='flex gap-2 mt-4'>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>{}</button>
                {}
            </div>
        </form>"#,
        action,
        USERS_LIST.target,
        USERS_LIST.form_id,
        heading,
        input("first_name", "First Name", &u.first_name, "text"),
        input("last_name", "Last Name", &u.last_name, "text"),
        input("username", "Username", &u.username, "text"),
        input("email", "Email", &u.email, "email"),
        input("date_of_birth", "Date of Birth", &dob, "date"),
        input("place_of_birth", "Place of Birth", &u.place_of_birth, "text"),
        input("residence", "Residence", &u.residence, "text"),
        input("nationality", "Nationality", &u.nationality, "text"),
        input("id_card", "ID Card", &u.id_card, "text"),
        option("user", "User", u.role == Role::User),
        option("admin", "Admin", u.role == Role::Admin),
        extra,
        submit,
        if editing {
            "<button type='button' class='px-4 py-2 border rounded-lg' hx-get='/admin/users/new/edit' hx-target='#user-editor'>Cancel</button>"
        } else {
            ""
        }
    )
}

/// Editor reset to the add form, swapped out of band
fn editor_reset() -> String {
    format!("<div id='user-editor' hx-swap-oob='true'>{}</div>", user_form(None))
}

fn action_cell(user: &User) -> String {
    let id = urlencoding::encode(&user.id);
    let review = if user.status == cashora_core::Status::Pending {
        format!(
            r#"<button class='px-2 py-1 text-sm border rounded-lg' hx-post='/admin/users/{0}/approve' hx-include='#{1}' hx-target='#{2}'>Approve</button>
            <input id='user-reason-{3}' name='reason' placeholder='Reason for rejection' class='px-2 py-1 text-sm border rounded-lg w-40'>
            <button class='px-2 py-1 text-sm bg-red-600 text-white rounded-lg' hx-post='/admin/users/{0}/reject' hx-include='#{1}, #user-reason-{3}' hx-target='#{2}'>Reject</button>"#,
            id,
            USERS_LIST.form_id,
            USERS_LIST.target,
            escape_html(&user.id)
        )
    } else {
        String::new()
    };
    format!(
        r#"<div class='flex flex-wrap items-center gap-2'>
            <button class='px-2 py-1 text-sm border rounded-lg' hx-get='/admin/users/{0}/edit' hx-target='#user-editor'>Edit</button>
            <button class='px-2 py-1 text-sm text-red-600 border border-red-200 rounded-lg' hx-post='/admin/users/{0}/delete' hx-include='#{1}' hx-target='#{2}' hx-confirm='Delete this user?'>Delete</button>
            {3}
        </div>"#,
        id, USERS_LIST.form_id, USERS_LIST.target, review
    )
}

pub fn render_users(state: &AppState, users: &[User], query: &ViewQuery<User>) -> String {
    let list = USERS_LIST;
    let rows = project(users, query);
    let headers = [
        list.sort_header("ID", UserField::Id, query.sort),
        list.sort_header("Name", UserField::Name, query.sort),
        list.sort_header("Email", UserField::Email, query.sort),
        "<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Role</th>".to_string(),
        list.sort_header("Status", UserField::Status, query.sort),
        list.sort_header("Balance", UserField::Balance, query.sort),
        "<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Actions</th>".to_string(),
    ];

    let body: Vec<String> = rows
        .iter()
        .map(|u| {
            format!(
                "<tr id='user-row-{}' class='border-b'><td class='px-4 py-2'>#{}</td><td class='px-4 py-2'>{}<br><span class='text-xs text-gray-500'>@{}</span></td><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td></tr>",
                escape_html(&u.id),
                escape_html(&u.id),
                escape_html(&u.full_name()),
                escape_html(&u.username),
                escape_html(&u.email),
                u.role,
                status_badge(u.status),
                state.money(u.balance),
                action_cell(u)
            )
        })
        .collect();

    let body = if body.is_empty() {
        empty_row(headers.len(), "No users found")
    } else {
        body.join("")
    };

    format!(
        r#"{}<div class='bg-white rounded-xl shadow-sm overflow-x-auto'><table class='min-w-full'><thead class='bg-gray-50'><tr>{}</tr></thead><tbody>{}</tbody></table></div>"#,
        list.sort_inputs(query.sort),
        headers.join(""),
        body
    )
}

pub async fn page_users(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = user_query(&params);
    let workspace = state.workspace.read().await;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Users</h2><p class='text-sm text-gray-500'>{} users, {} pending approval</p></div>
        <div id='user-editor'>{}</div>
        {}
        <div id='{}'>{}</div>"#,
        workspace.users.users().len(),
        workspace.users.pending_count(),
        user_form(None),
        USERS_LIST.filter_form(&query.search, &status_select(query.filter.status)),
        USERS_LIST.target,
        render_users(&state, workspace.users.users(), &query)
    );

    Ok(Html(page_response(&headers, Role::Admin, "Users", "/admin/users", &inner_content)))
}

pub async fn htmx_users_list(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = user_query(&params);
    let workspace = state.workspace.read().await;
    Ok(Html(render_users(&state, workspace.users.users(), &query)))
}

/// HTMX: Edit form of one user; `new` or an unknown id gives the add form
pub async fn htmx_user_edit_form(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;
    Ok(Html(user_form(workspace.users.get(&id))))
}

pub async fn htmx_user_add(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let params = parse_form(&body);
    let query = user_query(&params);
    let mut workspace = state.workspace.write().await;

    let (notice, reset) = match workspace.users.add(draft_from_form(&params)) {
        Ok(notice) => (notice, editor_reset()),
        Err(e) => (Notice::from(e), String::new()),
    };
    let list = render_users(&state, workspace.users.users(), &query);
    Ok(with_toast(format!("{}{}", list, reset), &notice))
}

pub async fn htmx_user_update(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let params = parse_form(&body);
    let query = user_query(&params);
    let mut workspace = state.workspace.write().await;

    let (notice, reset) = match workspace.users.update(&id, draft_from_form(&params)) {
        Ok(notice) => (notice, editor_reset()),
        Err(e) => (Notice::from(e), String::new()),
    };
    let list = render_users(&state, workspace.users.users(), &query);
    Ok(with_toast(format!("{}{}", list, reset), &notice))
}

pub async fn htmx_user_delete(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = user_query(&parse_form(&body));
    let mut workspace = state.workspace.write().await;
    let notice = workspace.users.delete(&id);
    Ok(with_toast(render_users(&state, workspace.users.users(), &query), &notice))
}

pub async fn htmx_user_approve(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = user_query(&parse_form(&body));
    let mut workspace = state.workspace.write().await;
    let notice = workspace.users.approve(&id);
    Ok(with_toast(render_users(&state, workspace.users.users(), &query), &notice))
}

pub async fn htmx_user_reject(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let params = parse_form(&body);
    let query = user_query(&params);
    let reason = params.get("reason").map(|s| s.as_str()).unwrap_or("");
    let mut workspace = state.workspace.write().await;
    let notice = workspace.users.reject(&id, reason).unwrap_or_else(Notice::from);
    Ok(with_toast(render_users(&state, workspace.users.users(), &query), &notice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cashora_core::Status;
    use rust_decimal::dec;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_draft_from_form() {
        let draft = draft_from_form(&form(&[
            ("first_name", " Ann "),
            ("last_name", "Lee"),
            ("email", "ann@example.com"),
            ("date_of_birth", "1995-04-02"),
            ("role", "admin"),
            ("withdrawal_weekly", "250"),
            ("withdrawal_monthly", ""),
            ("fee_type", "fixed"),
            ("fee_amount", "3.5"),
        ]));
        assert_eq!(draft.first_name, "Ann");
        assert_eq!(draft.role, Role::Admin);
        assert_eq!(draft.date_of_birth.unwrap().to_string(), "1995-04-02");
        let limits = draft.withdrawal_limit.unwrap();
        assert_eq!(limits.weekly, Some(dec!(250)));
        assert_eq!(limits.monthly, None);
        assert_eq!(draft.sending_limit, None);
        assert_eq!(draft.fee_type, Some(FeeType::Fixed));
        assert_eq!(draft.fee_amount, Some(dec!(3.5)));
    }

    #[tokio::test]
    async fn test_add_user_appends_pending() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (status, _, body) = post(
            &state,
            "/admin/users",
            Some(&cookie),
            "first_name=Ann&last_name=Lee&username=annlee&email=ann%40example.com&role=user",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("User Added"));
        assert!(body.contains("id='user-row-3'"));
        assert!(body.contains("id='user-editor' hx-swap-oob='true'"));

        let workspace = state.workspace.read().await;
        let user = workspace.users.get("3").unwrap();
        assert_eq!(user.status, Status::Pending);
        assert_eq!(user.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_add_user_refuses_taken_email() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(
            &state,
            "/admin/users",
            Some(&cookie),
            "first_name=Johnny&last_name=Doe&email=john%40example.com",
        )
        .await;
        assert!(body.contains("data-variant='destructive'"));
        assert!(body.contains("Already Exists"));
        assert!(body.contains("A user with the email john@example.com already exists."));
        assert_eq!(state.workspace.read().await.users.users().len(), 2);
    }

    #[tokio::test]
    async fn test_add_user_refuses_missing_fields() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(&state, "/admin/users", Some(&cookie), "first_name=Ann").await;
        assert!(body.contains("data-variant='destructive'"));
        assert!(body.contains("Last name, Email required."));
        assert!(!body.contains("id='user-editor'"));
        assert_eq!(state.workspace.read().await.users.users().len(), 2);
    }

    #[tokio::test]
    async fn test_update_user() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(
            &state,
            "/admin/users/2",
            Some(&cookie),
            "first_name=Janet&last_name=Smith&email=janet%40example.com&sending_weekly=100&sending_monthly=&sending_yearly=",
        )
        .await;
        assert!(body.contains("User Updated"));
        let workspace = state.workspace.read().await;
        let user = workspace.users.get("2").unwrap();
        assert_eq!(user.first_name, "Janet");
        assert_eq!(user.sending_limit.weekly, Some(dec!(100)));
        assert_eq!(user.status, Status::Pending);
    }

    #[tokio::test]
    async fn test_edit_form_prefilled() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = get(&state, "/admin/users/1/edit", Some(&cookie)).await;
        assert!(body.contains("Edit John Doe"));
        assert!(body.contains("name='withdrawal_weekly' value='500'"));
        assert!(body.contains("hx-post='/admin/users/1'"));
    }

    #[tokio::test]
    async fn test_review_and_delete_users() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);

        let (_, _, body) = post(&state, "/admin/users/2/reject", Some(&cookie), "reason=").await;
        assert!(body.contains("Rejection Failed"));

        let (_, _, body) = post(&state, "/admin/users/2/reject", Some(&cookie), "reason=incomplete+ID").await;
        assert!(body.contains("User Rejected"));
        assert_eq!(state.workspace.read().await.users.get("2").unwrap().status, Status::Rejected);

        let (_, _, body) = post(&state, "/admin/users/2/approve", Some(&cookie), "").await;
        assert!(body.contains("User Approved"));

        let (_, _, body) = post(&state, "/admin/users/1/delete", Some(&cookie), "").await;
        assert!(body.contains("User Deleted"));
        assert!(!body.contains("id='user-row-1'"));
    }

    #[tokio::test]
    async fn test_user_list_search_and_status() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = get(&state, "/admin/users/list?status=pending", Some(&cookie)).await;
        assert!(body.contains("id='user-row-2'"));
        assert!(!body.contains("id='user-row-1'"));

        let (_, _, body) = get(&state, "/admin/users/list?q=JOHNDOE", Some(&cookie)).await;
        assert!(body.contains("id='user-row-1'"));
        assert!(!body.contains("id='user-row-2'"));
    }
}
