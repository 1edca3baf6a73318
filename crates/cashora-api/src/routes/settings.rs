//! System settings screen of the admin console

use crate::{form_pairs, page_response, require_session, with_toast, AppState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{Notice, PlatformSettings, Role, SettingsDraft};
use cashora_utils::escape_html;
use rust_decimal::Decimal;

/// Read the settings form; an unchecked switch is absent from the body
pub fn settings_from_form(body: &str) -> SettingsDraft {
    let pairs = form_pairs(body);
    let text = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    let checked = |key: &str| pairs.iter().any(|(k, v)| k == key && !v.is_empty());
    SettingsDraft {
        min_withdrawal: text("min_withdrawal"),
        max_withdrawal: text("max_withdrawal"),
        min_send: text("min_send"),
        max_send: text("max_send"),
        default_fee_percentage: text("default_fee_percentage"),
        email_notifications: checked("email_notifications"),
        maintenance_mode: checked("maintenance_mode"),
    }
}

fn number(name: &str, label: &str, value: &str) -> String {
    format!(
        "<div><label class='block text-sm text-gray-600 mb-1' for='{0}'>{1}</label><input id='{0}' name='{0}' type='number' step='0.01' value='{2}' class='w-full px-3 py-2 border rounded-lg'></div>",
        name,
        label,
        escape_html(value)
    )
}

fn switch(name: &str, label: &str, on: bool) -> String {
    format!(
        "<label class='flex items-center gap-2 text-sm'><input type='checkbox' name='{}' value='on'{}><span>{}</span></label>",
        name,
        if on { " checked" } else { "" },
        label
    )
}

fn settings_form(draft: &SettingsDraft) -> String {
    format!(
        r#"<form id='settings-form' class='space-y-4' hx-post='/admin/settings' hx-swap='outerHTML'>
            <div class='grid grid-cols-2 gap-4'>{}{}</div>
            <div class='grid grid-cols-2 gap-4'>{}{}</div>
            {}
            {}
            {}
            <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Save Settings</button>
        </form>"#,
        number("min_withdrawal", "Minimum Withdrawal", &draft.min_withdrawal),
        number("max_withdrawal", "Maximum Withdrawal", &draft.max_withdrawal),
        number("min_send", "Minimum Send Amount", &draft.min_send),
        number("max_send", "Maximum Send Amount", &draft.max_send),
        number("default_fee_percentage", "Default Fee Percentage", &draft.default_fee_percentage),
        switch("email_notifications", "Enable Email Notifications", draft.email_notifications),
        switch("maintenance_mode", "Maintenance Mode", draft.maintenance_mode)
    )
}

/// The stored values as the form shows them
fn as_draft(settings: &PlatformSettings) -> SettingsDraft {
    let show = |d: Decimal| d.normalize().to_string();
    SettingsDraft {
        min_withdrawal: show(settings.min_withdrawal),
        max_withdrawal: show(settings.max_withdrawal),
        min_send: show(settings.min_send),
        max_send: show(settings.max_send),
        default_fee_percentage: show(settings.default_fee_percentage),
        email_notifications: settings.email_notifications,
        maintenance_mode: settings.maintenance_mode,
    }
}

pub async fn page_settings(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>System Settings</h2><p class='text-sm text-gray-500'>Configure global settings for the Cashora platform</p></div>
        <div class='bg-white rounded-xl shadow-sm p-6 max-w-2xl'>
            <h3 class='text-lg font-semibold'>General Settings</h3>
            <p class='text-sm text-gray-500 mb-4'>Adjust system-wide settings and configurations</p>
            {}
        </div>"#,
        settings_form(&as_draft(&workspace.settings))
    );

    Ok(Html(page_response(&headers, Role::Admin, "Settings", "/admin/settings", &inner_content)))
}

pub async fn htmx_settings_save(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let draft = settings_from_form(&body);
    let mut workspace = state.workspace.write().await;
    match workspace.settings.update(&draft) {
        Ok(notice) => Ok(with_toast(settings_form(&as_draft(&workspace.settings)), &notice)),
        Err(e) => Ok(with_toast(settings_form(&draft), &Notice::from(e))),
    }
}
