//! Support chat widget
//!
//! The conversation is keyed by the session token. The log polls for the
//! delayed bot reply.

use crate::{parse_form, require_session, with_toast, AppState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{ChatMessage, Notice, Role, Sender};
use cashora_utils::escape_html;

/// Floating chat panel appended to every full user page
pub fn chat_widget() -> String {
    r#"<details class='fixed bottom-4 left-4 z-40 w-80'>
    <summary class='list-none cursor-pointer px-4 py-2 bg-indigo-600 text-white rounded-full shadow-lg inline-block'>Customer Support</summary>
    <div class='mt-2 bg-white rounded-xl shadow-lg border flex flex-col h-96'>
        <div id='chat-log' class='flex-1 overflow-y-auto p-3 space-y-2' hx-get='/chat/messages' hx-trigger='load, every 1s'></div>
        <form class='flex gap-2 p-3 border-t' hx-post='/chat/messages' hx-target='#chat-log' hx-on::after-request='if(event.detail.successful) this.reset()'>
            <input name='message' placeholder='Type your message...' autocomplete='off' class='flex-1 px-3 py-2 border rounded-lg text-sm'>
            <button class='px-3 py-2 bg-indigo-600 text-white rounded-lg text-sm'>Send</button>
        </form>
    </div>
</details>"#
        .to_string()
}

fn render_messages(messages: &[ChatMessage], pending: bool) -> String {
    let mut out: Vec<String> = messages
        .iter()
        .map(|m| {
            let (align, bubble) = match m.sender {
                Sender::User => ("justify-end", "bg-indigo-600 text-white"),
                Sender::Bot => ("justify-start", "bg-gray-100 text-gray-900"),
            };
            format!(
                "<div class='flex {}'><p data-sender='{}' class='max-w-[75%] px-3 py-2 rounded-lg text-sm {}'>{}</p></div>",
                align,
                if m.sender == Sender::User { "user" } else { "bot" },
                bubble,
                escape_html(&m.text)
            )
        })
        .collect();
    if pending {
        out.push("<p class='text-xs text-gray-400'>Support is typing...</p>".to_string());
    }
    out.join("")
}

pub async fn htmx_chat_messages(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    let session = require_session(&state, &headers, Role::User)?;
    let messages = state.chat.messages(&session.token);
    Ok(Html(render_messages(&messages, state.chat.has_pending(&session.token))))
}

pub async fn htmx_chat_send(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    let session = require_session(&state, &headers, Role::User)?;
    let form = parse_form(&body);
    let text = form.get("message").map(|s| s.as_str()).unwrap_or("");

    let sent = state.chat.send(&session.token, text);
    let log = render_messages(&state.chat.messages(&session.token), state.chat.has_pending(&session.token));
    match sent {
        Ok(_) => Ok(Html(log)),
        Err(e) => Ok(with_toast(log, &Notice::from(e))),
    }
}
