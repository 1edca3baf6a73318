//! Transactions API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_transactions: Projected admin history (JSON)
//! - api_transaction_detail: Single record (JSON)
//! - htmx_transactions_list: Admin history (HTML fragment)
//! - htmx_activity_list: User activity panel (HTML fragment)
//! - htmx_transaction_detail: Detail panel (HTML fragment)

use crate::routes::{empty_row, kind_select, status_badge, status_select, transaction_query, ListTarget};
use crate::{require_api_session, require_session, ApiResult, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{Role, Transaction, TransactionField, ViewQuery};
use cashora_utils::escape_html;
use std::collections::HashMap;

pub const ADMIN_LIST: ListTarget<'static> = ListTarget {
    url: "/admin/transactions/list",
    form_id: "tx-filters",
    target: "tx-list",
};

pub const ACTIVITY_LIST: ListTarget<'static> = ListTarget {
    url: "/dashboard/transactions/list",
    form_id: "activity-filters",
    target: "activity-list",
};

/// Search box plus kind and status selects for a transaction list
pub fn transaction_filters(list: &ListTarget, query: &ViewQuery<Transaction>) -> String {
    let selects = format!("{}{}", kind_select(query.filter.kind), status_select(query.filter.status));
    list.filter_form(&query.search, &selects)
}

/// Table of projected rows plus the sort state the next request carries
///
/// The admin variant shows the holder column and opens the detail panel.
pub fn render_transaction_list(
    state: &AppState,
    rows: &[Transaction],
    query: &ViewQuery<Transaction>,
    list: &ListTarget,
    admin: bool,
) -> String {
    let sort = query.sort;
    let mut headers = vec![
        list.sort_header("ID", TransactionField::Id, sort),
        list.sort_header("Type", TransactionField::Kind, sort),
        list.sort_header("Amount", TransactionField::Amount, sort),
        list.sort_header("Status", TransactionField::Status, sort),
        list.sort_header("Date", TransactionField::Date, sort),
    ];
    if admin {
        headers.push(list.sort_header("User", TransactionField::Holder, sort));
    }
    headers.push(list.sort_header("Recipient", TransactionField::Counterparty, sort));
    let columns = headers.len();

    let body: Vec<String> = rows.iter().map(|tx| {
        let id = escape_html(&tx.id);
        let id_cell = if admin {
            format!(
                "<button class='text-indigo-600 hover:underline' hx-get='/admin/transactions/{}/detail' hx-target='#tx-detail'>#{}</button>",
                urlencoding::encode(&tx.id), id
            )
        } else {
            format!("#{}", id)
        };
        let holder_cell = if admin {
            format!("<td class='px-4 py-2'>{}</td>", escape_html(tx.holder.as_deref().unwrap_or("-")))
        } else {
            String::new()
        };
        format!(
            "<tr id='tx-row-{}' class='border-b hover:bg-gray-50'><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2 font-medium'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2 text-gray-600'>{}</td>{}<td class='px-4 py-2'>{}</td></tr>",
            id,
            id_cell,
            tx.kind.title(),
            state.money(tx.amount),
            status_badge(tx.status),
            tx.date.format("%Y-%m-%d"),
            holder_cell,
            escape_html(tx.counterparty.as_deref().unwrap_or("-"))
        )
    }).collect();

    let body = if body.is_empty() {
        empty_row(columns, "No transactions found")
    } else {
        body.join("")
    };

    format!(
        r#"{}<div class='bg-white rounded-xl shadow-sm overflow-x-auto'><table class='min-w-full'><thead class='bg-gray-50'><tr>{}</tr></thead><tbody>{}</tbody></table></div><p class='text-xs text-gray-500 mt-2'>{} of the records shown</p>"#,
        list.sort_inputs(sort),
        headers.join(""),
        body,
        rows.len()
    )
}

/// Projected admin history (JSON API)
pub async fn api_transactions(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> ApiResult<String> {
    require_api_session(&state, &headers)?;
    let workspace = state.workspace.read().await;
    let rows = workspace.admin_view(&transaction_query(&params));
    Ok(serde_json::to_string(&rows).unwrap_or_default())
}

/// Single admin history record (JSON API)
pub async fn api_transaction_detail(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<String> {
    require_api_session(&state, &headers)?;
    let workspace = state.workspace.read().await;
    let tx = workspace.transaction(&id)?;
    Ok(serde_json::to_string(tx).unwrap_or_default())
}

/// HTMX: Admin history - Partial page update
pub async fn htmx_transactions_list(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = transaction_query(&params);
    let workspace = state.workspace.read().await;
    let rows = workspace.admin_view(&query);
    Ok(Html(render_transaction_list(&state, &rows, &query, &ADMIN_LIST, true)))
}

/// HTMX: User activity panel - Partial page update
pub async fn htmx_activity_list(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let query = transaction_query(&params);
    let workspace = state.workspace.read().await;
    let rows = workspace.activity_view(&query);
    Ok(Html(render_transaction_list(&state, &rows, &query, &ACTIVITY_LIST, false)))
}

/// HTMX: Transaction detail panel
pub async fn htmx_transaction_detail(
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;

    let tx = match workspace.transaction(&id) {
        Ok(tx) => tx,
        Err(e) => {
            return Ok(Html(format!(
                "<div class='bg-white rounded-xl shadow-sm p-6 text-gray-500'>{}</div>",
                escape_html(&e.to_string())
            )))
        }
    };

    let mut rows = vec![
        ("Type", tx.kind.title().to_string()),
        ("Amount", state.money(tx.amount)),
        ("Status", status_badge(tx.status)),
        ("Date", tx.date.format("%Y-%m-%d").to_string()),
    ];
    if let Some(ref holder) = tx.holder {
        rows.push(("User", escape_html(holder)));
    }
    if let Some(ref counterparty) = tx.counterparty {
        rows.push(("Recipient", escape_html(counterparty)));
    }
    if let Some(ref bank) = tx.bank {
        rows.push(("Bank", escape_html(&bank.name)));
        rows.push(("Account number", escape_html(&bank.account_number)));
    }
    if let Some(fee) = tx.fee {
        rows.push(("Fee", state.money(fee)));
    }
    if let Some(ref receipt) = tx.receipt {
        rows.push((
            "Receipt",
            format!("<a href='{0}' target='_blank' class='text-indigo-600 hover:underline'>{0}</a>", escape_html(receipt)),
        ));
    }

    let items: Vec<String> = rows
        .into_iter()
        .map(|(label, value)| format!("<div><p class='text-sm text-gray-500'>{}</p><p class='font-medium'>{}</p></div>", label, value))
        .collect();

    Ok(Html(format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
            <div class='flex items-center justify-between mb-4'><h3 class='text-lg font-semibold'>Transaction #{}</h3><button class='text-gray-400 hover:text-gray-600' onclick="document.getElementById('tx-detail').innerHTML=''">✕</button></div>
            <div class='grid grid-cols-2 gap-4'>{}</div>
        </div>"#,
        escape_html(&tx.id),
        items.join("")
    )))
}
