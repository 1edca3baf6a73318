//! Review queues - deposit, withdrawal and send requests
//!
//! One router per kind, nested under `/admin/{kind}-requests`. Approve and
//! reject answer with the refreshed list plus a toast.

use crate::routes::{empty_row, status_badge, status_select, transaction_query, ListTarget};
use crate::{page_response, parse_form, require_session, with_toast, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::Router;
use cashora_core::{project, Notice, Role, Transaction, TransactionField, TransactionKind, ViewQuery};
use cashora_utils::escape_html;
use std::collections::HashMap;

type Params = Query<HashMap<String, String>>;

/// Routes of one queue
pub fn router(kind: TransactionKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |state: State<AppState>, headers: HeaderMap, params: Params| {
                page_requests(kind, state, headers, params)
            }),
        )
        .route(
            "/list",
            get(move |state: State<AppState>, headers: HeaderMap, params: Params| {
                htmx_requests_list(kind, state, headers, params)
            }),
        )
        .route(
            "/:id/approve",
            post(move |state: State<AppState>, headers: HeaderMap, path: Path<String>, body: String| {
                htmx_request_approve(kind, state, headers, path, body)
            }),
        )
        .route(
            "/:id/reject",
            post(move |state: State<AppState>, headers: HeaderMap, path: Path<String>, body: String| {
                htmx_request_reject(kind, state, headers, path, body)
            }),
        )
}

/// Element ids and endpoints of one queue screen
struct QueuePaths {
    base: String,
    list: String,
    form_id: String,
    target: String,
}

impl QueuePaths {
    fn new(kind: TransactionKind) -> Self {
        let base = format!("/admin/{}-requests", kind.as_str());
        Self {
            list: format!("{}/list", base),
            form_id: format!("{}-filters", kind.as_str()),
            target: format!("{}-list", kind.as_str()),
            base,
        }
    }

    fn list_target(&self) -> ListTarget<'_> {
        ListTarget {
            url: &self.list,
            form_id: &self.form_id,
            target: &self.target,
        }
    }
}

/// Kind-specific column: receipt, bank account or recipient
fn detail_cell(tx: &Transaction) -> String {
    match tx.kind {
        TransactionKind::Deposit => match tx.receipt {
            Some(ref receipt) => format!(
                "<a href='{0}' target='_blank' class='text-indigo-600 hover:underline'>View receipt</a>",
                escape_html(receipt)
            ),
            None => "-".to_string(),
        },
        TransactionKind::Withdrawal => match tx.bank {
            Some(ref bank) => format!(
                "{}<br><span class='text-xs text-gray-500'>{}</span>",
                escape_html(&bank.name),
                escape_html(&bank.account_number)
            ),
            None => "-".to_string(),
        },
        TransactionKind::Send => escape_html(tx.counterparty.as_deref().unwrap_or("-")),
    }
}

fn detail_header(kind: TransactionKind, list: &ListTarget, query: &ViewQuery<Transaction>) -> String {
    match kind {
        TransactionKind::Deposit => "<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Receipt</th>".to_string(),
        TransactionKind::Withdrawal => "<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Bank</th>".to_string(),
        TransactionKind::Send => list.sort_header("Recipient", TransactionField::Counterparty, query.sort),
    }
}

/// Approve button and reject form of a pending row
fn action_cell(paths: &QueuePaths, tx: &Transaction) -> String {
    if !tx.is_pending() {
        return String::new();
    }
    let id = urlencoding::encode(&tx.id);
    let reason_id = format!("reason-{}-{}", paths.form_id, escape_html(&tx.id));
    format!(
        r#"<div class='flex items-center gap-2'>
            <button class='px-3 py-1 text-sm border rounded-lg hover:bg-gray-50' hx-post='{0}/{1}/approve' hx-include='#{2}' hx-target='#{3}'>Approve</button>
            <input id='{4}' name='reason' placeholder='Reason for rejection' class='px-2 py-1 text-sm border rounded-lg w-44'>
            <button class='px-3 py-1 text-sm bg-red-600 text-white rounded-lg hover:bg-red-700' hx-post='{0}/{1}/reject' hx-include='#{2}, #{4}' hx-target='#{3}'>Reject</button>
        </div>"#,
        paths.base, id, paths.form_id, paths.target, reason_id
    )
}

fn render_requests(state: &AppState, kind: TransactionKind, records: &[Transaction], query: &ViewQuery<Transaction>) -> String {
    let paths = QueuePaths::new(kind);
    let list = paths.list_target();
    let rows = project(records, query);

    let headers = [
        list.sort_header("ID", TransactionField::Id, query.sort),
        list.sort_header("User", TransactionField::Holder, query.sort),
        list.sort_header("Amount", TransactionField::Amount, query.sort),
        list.sort_header("Date", TransactionField::Date, query.sort),
        list.sort_header("Status", TransactionField::Status, query.sort),
        detail_header(kind, &list, query),
        "<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>Actions</th>".to_string(),
    ];

    let body: Vec<String> = rows
        .iter()
        .map(|tx| {
            format!(
                "<tr id='request-row-{}' class='border-b'><td class='px-4 py-2'>#{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2 font-medium'>{}</td><td class='px-4 py-2 text-gray-600'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td></tr>",
                escape_html(&tx.id),
                escape_html(&tx.id),
                escape_html(tx.holder.as_deref().unwrap_or("-")),
                state.money(tx.amount),
                tx.date.format("%Y-%m-%d"),
                status_badge(tx.status),
                detail_cell(tx),
                action_cell(&paths, tx)
            )
        })
        .collect();

    let body = if body.is_empty() {
        empty_row(headers.len(), "No requests found")
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

async fn page_requests(kind: TransactionKind, state: State<AppState>, headers: HeaderMap, params: Params) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = transaction_query(&params);
    let workspace = state.workspace.read().await;
    let queue = workspace.queue(kind);
    let paths = QueuePaths::new(kind);
    let title = format!("{} Requests", kind.title());

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>{}</h2><p class='text-sm text-gray-500'>Review and process {} requests from users. {} pending.</p></div>
        {}
        <div id='{}'>{}</div>"#,
        title,
        kind.as_str(),
        queue.pending_count(),
        paths.list_target().filter_form(&query.search, &status_select(query.filter.status)),
        paths.target,
        render_requests(&state, kind, queue.records(), &query)
    );

    Ok(Html(page_response(&headers, Role::Admin, &title, &paths.base, &inner_content)))
}

async fn htmx_requests_list(kind: TransactionKind, state: State<AppState>, headers: HeaderMap, params: Params) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = transaction_query(&params);
    let workspace = state.workspace.read().await;
    Ok(Html(render_requests(&state, kind, workspace.queue(kind).records(), &query)))
}

async fn htmx_request_approve(
    kind: TransactionKind,
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let params = parse_form(&body);
    let query = transaction_query(&params);
    let mut workspace = state.workspace.write().await;
    let notice = workspace.queue_mut(kind).approve(&id);
    Ok(with_toast(render_requests(&state, kind, workspace.queue(kind).records(), &query), &notice))
}

async fn htmx_request_reject(
    kind: TransactionKind,
    state: State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let params = parse_form(&body);
    let query = transaction_query(&params);
    let reason = params.get("reason").map(|s| s.as_str()).unwrap_or("");
    let mut workspace = state.workspace.write().await;
    let notice = workspace
        .queue_mut(kind)
        .reject_with(&id, reason)
        .unwrap_or_else(Notice::from);
    Ok(with_toast(render_requests(&state, kind, workspace.queue(kind).records(), &query), &notice))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cashora_core::{Role, Status};

    #[tokio::test]
    async fn test_queue_page_lists_pending_requests() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (status, _, body) = get(&state, "/admin/withdrawal-requests", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Withdrawal Requests"));
        assert!(body.contains("ABC Bank"));
        assert!(body.contains("id='request-row-2'"));
        assert!(body.contains("2 pending"));
    }

    #[tokio::test]
    async fn test_approve_changes_only_that_record() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (status, _, body) = post(&state, "/admin/deposit-requests/2/approve", Some(&cookie), "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Deposit Approved"));
        assert!(body.contains("Deposit request has been approved."));

        let workspace = state.workspace.read().await;
        assert_eq!(workspace.deposit_requests.get("2").unwrap().status, Status::Completed);
        assert_eq!(workspace.deposit_requests.get("1").unwrap().status, Status::Pending);
        // other screens keep their own copies
        assert_eq!(workspace.transactions[1].status, Status::Pending);
    }

    #[tokio::test]
    async fn test_blank_reason_refused() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(&state, "/admin/send-requests/1/reject", Some(&cookie), "reason=+++").await;
        assert!(body.contains("Rejection Failed"));
        assert!(body.contains("Please provide a reason for rejection."));
        assert!(body.contains("data-variant='destructive'"));
        assert_eq!(body.matches("hx-swap-oob").count(), 1);

        let workspace = state.workspace.read().await;
        assert_eq!(workspace.send_requests.get("1").unwrap().status, Status::Pending);
    }

    #[tokio::test]
    async fn test_reject_then_approve_overwrites() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(
            &state,
            "/admin/withdrawal-requests/2/reject",
            Some(&cookie),
            "reason=insufficient+proof",
        )
        .await;
        assert!(body.contains("Withdrawal Rejected"));
        assert!(body.contains("Reason: insufficient proof"));
        assert_eq!(
            state.workspace.read().await.withdrawal_requests.get("2").unwrap().status,
            Status::Rejected
        );

        post(&state, "/admin/withdrawal-requests/2/approve", Some(&cookie), "").await;
        assert_eq!(
            state.workspace.read().await.withdrawal_requests.get("2").unwrap().status,
            Status::Completed
        );
    }

    #[tokio::test]
    async fn test_unknown_id_is_silent() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (status, _, body) = post(&state, "/admin/deposit-requests/99/approve", Some(&cookie), "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Deposit Approved"));
        let workspace = state.workspace.read().await;
        assert_eq!(workspace.deposit_requests.pending_count(), 2);
    }

    #[tokio::test]
    async fn test_list_keeps_filters_after_action() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = post(
            &state,
            "/admin/send-requests/1/approve",
            Some(&cookie),
            "q=&status=pending&sort=amount&dir=desc",
        )
        .await;
        assert!(!body.contains("id='request-row-1'"));
        assert!(body.contains("id='request-row-2'"));
        assert!(body.contains("name='dir' form='send-filters' value='desc'"));
    }
}
