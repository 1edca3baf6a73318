//! Email composer of the admin console

use crate::routes::banks::assignment_from_form;
use crate::routes::empty_row;
use crate::{page_response, parse_form, require_session, today, with_toast, AppState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{Notice, Outbox, Role, UserDirectory};
use cashora_utils::escape_html;

fn recipient_boxes(users: &UserDirectory) -> String {
    users
        .users()
        .iter()
        .map(|u| {
            format!(
                "<label class='flex items-center gap-2 text-sm'><input type='checkbox' name='user_ids' value='{}'><span>{}</span></label>",
                escape_html(&u.id),
                escape_html(&u.full_name())
            )
        })
        .collect()
}

fn render_sent(outbox: &Outbox) -> String {
    let rows: Vec<String> = outbox
        .sent()
        .iter()
        .map(|email| {
            format!(
                "<tr class='border-b'><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2 text-gray-600'>{}</td></tr>",
                email.sent_on.format("%Y-%m-%d"),
                escape_html(&email.subject),
                escape_html(&email.recipients.join(", "))
            )
        })
        .collect();
    let body = if rows.is_empty() {
        empty_row(3, "No emails sent yet")
    } else {
        rows.join("")
    };
    format!(
        r#"<table class='min-w-full'><thead class='bg-gray-50'><tr>
            <th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Date</th>
            <th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Subject</th>
            <th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Recipients</th>
        </tr></thead><tbody>{}</tbody></table>"#,
        body
    )
}

pub async fn page_email(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Email Management</h2><p class='text-sm text-gray-500'>Send custom emails to users</p></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold'>Compose Email</h3>
            <p class='text-sm text-gray-500 mb-4'>Leave every box unticked to write to all users</p>
            <form class='space-y-4' hx-post='/admin/email' hx-target='#sent-emails' hx-on::after-request='if(event.detail.successful) this.reset()'>
                <fieldset><legend class='text-sm text-gray-600 mb-2'>Recipients</legend>
                    <label class='flex items-center gap-2 text-sm font-medium mb-2'><input type='checkbox' name='all' value='on'><span>All Users</span></label>
                    <div class='grid grid-cols-1 md:grid-cols-3 gap-2'>{}</div>
                </fieldset>
                <div><label class='block text-sm text-gray-600 mb-1' for='subject'>Subject</label><input id='subject' name='subject' placeholder='Enter email subject' class='w-full px-3 py-2 border rounded-lg'></div>
                <div><label class='block text-sm text-gray-600 mb-1' for='message'>Message</label><textarea id='message' name='message' rows='6' placeholder='Enter your message' class='w-full px-3 py-2 border rounded-lg'></textarea></div>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Send Email</button>
            </form>
        </div>
        <div class='bg-white rounded-xl shadow-sm overflow-x-auto'><div id='sent-emails'>{}</div></div>"#,
        recipient_boxes(&workspace.users),
        render_sent(&workspace.outbox)
    );

    Ok(Html(page_response(&headers, Role::Admin, "Email", "/admin/email", &inner_content)))
}

pub async fn htmx_email_send(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let form = parse_form(&body);
    let field = |key: &str| form.get(key).map(|s| s.as_str()).unwrap_or("");
    let to = assignment_from_form(&body);

    let mut guard = state.workspace.write().await;
    let workspace = &mut *guard;
    let notice = workspace
        .outbox
        .send(&workspace.users, &to, field("subject"), field("message"), today())
        .unwrap_or_else(Notice::from);
    Ok(with_toast(render_sent(&workspace.outbox), &notice))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use cashora_core::Role;

    #[tokio::test]
    async fn test_compose_lists_users() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = get(&state, "/admin/email", Some(&cookie)).await;
        assert!(body.contains("Compose Email"));
        assert!(body.contains("name='user_ids' value='2'><span>Jane Smith</span>"));
        assert!(body.contains("No emails sent yet"));
    }

    #[tokio::test]
    async fn test_send_to_picked_user() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(
            &state,
            "/admin/email",
            Some(&cookie),
            "user_ids=2&subject=Verify+your+ID&message=Please+upload+a+clearer+copy.",
        )
        .await;
        assert!(body.contains("Email Sent"));
        assert!(body.contains("Verify your ID"));
        assert!(body.contains("jane@example.com"));
        assert!(!body.contains("john@example.com"));
    }

    #[tokio::test]
    async fn test_send_without_picks_goes_to_everyone() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        post(&state, "/admin/email", Some(&cookie), "subject=Hello&message=News").await;
        let workspace = state.workspace.read().await;
        assert_eq!(workspace.outbox.sent()[0].recipients.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_email_refused() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(&state, "/admin/email", Some(&cookie), "all=on&subject=&message=").await;
        assert!(body.contains("data-variant='destructive'"));
        assert!(body.contains("Please enter a subject and a message."));
        assert!(state.workspace.read().await.outbox.sent().is_empty());
    }
}
