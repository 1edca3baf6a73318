//! Bank directory - add, rename, delete, assign users

use crate::{form_pairs, page_response, parse_form, require_session, today, with_toast, AppState};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{Assignment, BankDirectory, Notice, Role};
use cashora_utils::escape_html;

/// Assignment submitted by the dialog: the "all" box wins over single picks
pub fn assignment_from_form(body: &str) -> Assignment {
    let pairs = form_pairs(body);
    if pairs.iter().any(|(k, v)| k == "all" && !v.is_empty()) {
        return Assignment::All;
    }
    Assignment::Only(
        pairs
            .into_iter()
            .filter(|(k, _)| k == "user_ids")
            .map(|(_, v)| v)
            .collect(),
    )
}

fn assign_form(directory: &BankDirectory, bank_id: &str, assigned: &[String]) -> String {
    let id = urlencoding::encode(bank_id);
    let everyone = !directory.members().is_empty()
        && directory.members().iter().all(|m| assigned.contains(&m.id));
    let boxes: Vec<String> = directory
        .members()
        .iter()
        .map(|m| {
            format!(
                "<label class='flex items-center gap-2 text-sm'><input type='checkbox' name='user_ids' value='{}'{}><span>{}</span><span class='text-gray-400'>{}</span></label>",
                escape_html(&m.id),
                if assigned.contains(&m.id) { " checked" } else { "" },
                escape_html(&m.name),
                escape_html(&m.email)
            )
        })
        .collect();
    format!(
        r#"<details class='mt-2'><summary class='text-sm text-indigo-600 cursor-pointer'>Assign users</summary>
            <form class='mt-2 space-y-1' hx-post='/admin/banks/{}/assign' hx-target='#banks-list'>
                <label class='flex items-center gap-2 text-sm font-medium'><input type='checkbox' name='all' value='on'{}><span>All Users</span></label>
                {}
                <button class='mt-2 px-3 py-1 text-sm bg-indigo-600 text-white rounded-lg'>Assign</button>
            </form>
        </details>"#,
        id,
        if everyone { " checked" } else { "" },
        boxes.join("")
    )
}

pub fn render_banks(directory: &BankDirectory) -> String {
    let rows: Vec<String> = directory
        .banks()
        .iter()
        .map(|bank| {
            let id = urlencoding::encode(&bank.id);
            let members: Vec<String> = directory
                .members_of(bank)
                .iter()
                .map(|m| escape_html(&m.name))
                .collect();
            format!(
                r#"<tr id='bank-row-{}' class='border-b align-top'>
                    <td class='px-4 py-2'>
                        <form class='flex gap-2' hx-post='/admin/banks/{}' hx-target='#banks-list'>
                            <input name='name' value='{}' class='px-2 py-1 border rounded-lg'>
                            <button class='px-2 py-1 text-sm border rounded-lg'>Rename</button>
                        </form>
                    </td>
                    <td class='px-4 py-2'>{}<p class='text-xs text-gray-500'>{}</p>{}</td>
                    <td class='px-4 py-2 text-gray-600'>{}</td>
                    <td class='px-4 py-2'><button class='px-2 py-1 text-sm text-red-600 border border-red-200 rounded-lg' hx-post='/admin/banks/{}/delete' hx-target='#banks-list' hx-confirm='Delete this bank?'>Delete</button></td>
                </tr>"#,
                escape_html(&bank.id),
                id,
                escape_html(&bank.name),
                bank.user_ids.len(),
                members.join(", "),
                assign_form(directory, &bank.id, &bank.user_ids),
                bank.date_added.format("%Y-%m-%d"),
                id
            )
        })
        .collect();

    let body = if rows.is_empty() {
        crate::routes::empty_row(4, "No banks yet")
    } else {
        rows.join("")
    };

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm overflow-x-auto'><table class='min-w-full'><thead class='bg-gray-50'><tr>
            <th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Name</th>
            <th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Users Assigned</th>
            <th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Date Added</th>
            <th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Actions</th>
        </tr></thead><tbody>{}</tbody></table></div>"#,
        body
    )
}

pub async fn page_banks(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Banks</h2><p class='text-sm text-gray-500'>Banks users can withdraw to</p></div>
        <form class='flex gap-2 mb-6' hx-post='/admin/banks' hx-target='#banks-list' hx-on::after-request='if(event.detail.successful) this.reset()'>
            <input name='name' placeholder='Enter bank name' class='px-3 py-2 border rounded-lg w-72'>
            <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Add Bank</button>
        </form>
        <div id='banks-list'>{}</div>"#,
        render_banks(&workspace.banks)
    );

    Ok(Html(page_response(&headers, Role::Admin, "Banks", "/admin/banks", &inner_content)))
}

pub async fn htmx_banks_list(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;
    Ok(Html(render_banks(&workspace.banks)))
}

pub async fn htmx_bank_add(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let form = parse_form(&body);
    let name = form.get("name").map(|s| s.as_str()).unwrap_or("");
    let mut workspace = state.workspace.write().await;
    let notice = workspace.banks.add(name, today()).unwrap_or_else(Notice::from);
    Ok(with_toast(render_banks(&workspace.banks), &notice))
}

pub async fn htmx_bank_rename(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let form = parse_form(&body);
    let name = form.get("name").map(|s| s.as_str()).unwrap_or("");
    let mut workspace = state.workspace.write().await;
    let notice = workspace.banks.rename(&id, name).unwrap_or_else(Notice::from);
    Ok(with_toast(render_banks(&workspace.banks), &notice))
}

pub async fn htmx_bank_delete(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let mut workspace = state.workspace.write().await;
    let notice = workspace.banks.delete(&id);
    Ok(with_toast(render_banks(&workspace.banks), &notice))
}

pub async fn htmx_bank_assign(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let mut workspace = state.workspace.write().await;
    let notice = workspace.banks.assign(&id, assignment_from_form(&body));
    Ok(with_toast(render_banks(&workspace.banks), &notice))
}
