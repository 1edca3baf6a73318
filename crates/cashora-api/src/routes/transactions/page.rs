//! Transactions page rendering - Full page endpoints

use super::api::{render_transaction_list, transaction_filters, ADMIN_LIST};
use crate::routes::transaction_query;
use crate::{page_response, require_session, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::Role;
use std::collections::HashMap;

/// Admin history page - search, kind/status filters and sortable columns
pub async fn page_transactions(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let query = transaction_query(&params);
    let workspace = state.workspace.read().await;
    let rows = workspace.admin_view(&query);

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>Transactions</h2>
            <span class='text-sm text-gray-500'>{} records</span>
        </div>
        {}
        <div id='{}'>{}</div>
        <div id='tx-detail' class='mt-6'></div>"#,
        workspace.transactions.len(),
        transaction_filters(&ADMIN_LIST, &query),
        ADMIN_LIST.target,
        render_transaction_list(&state, &rows, &query, &ADMIN_LIST, true)
    );

    Ok(Html(page_response(&headers, Role::Admin, "Transactions", "/admin/transactions", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use cashora_core::Role;

    #[tokio::test]
    async fn test_page_renders_filters_and_rows() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (status, _, body) = get(&state, "/admin/transactions", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("id='tx-filters'"));
        assert!(body.contains("id='tx-row-1'"));
        assert!(body.contains("id='tx-row-3'"));
        assert!(body.contains("3 records"));
    }

    #[tokio::test]
    async fn test_page_honours_query() {
        let state = state();
        let cookie = cookie(&state, Role::Admin);
        let (_, _, body) = get(&state, "/admin/transactions?kind=deposit", Some(&cookie)).await;
        assert!(body.contains("<option value='deposit' selected>"));
        assert!(body.contains("id='tx-row-1'"));
        assert!(!body.contains("id='tx-row-2'"));
    }
}
