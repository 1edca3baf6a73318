//! User dashboard - overview, deposit, withdraw and send forms
//!
//! Withdraw and send are two-step: the first POST returns a confirmation
//! panel holding the quoted fee, the second books the request.

use crate::routes::transactions::{render_transaction_list, transaction_filters, ACTIVITY_LIST};
use crate::routes::{empty_row, status_badge, transaction_query};
use crate::{page_response, parse_form, require_session, today, toast_html, with_toast, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{Notice, Overview, Quote, Role, Transaction, Wallet};
use cashora_utils::escape_html;
use std::collections::HashMap;

fn field<'a>(form: &'a HashMap<String, String>, key: &str) -> &'a str {
    form.get(key).map(|s| s.as_str()).unwrap_or("")
}

fn optional<'a>(form: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    form.get(key).map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
}

fn card(title: &str, body: &str) -> String {
    format!(
        "<div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>{}</h3>{}</div>",
        title, body
    )
}

fn history_table(heads: &[&str], rows: Vec<String>) -> String {
    let heads: Vec<String> = heads
        .iter()
        .map(|h| format!("<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>{}</th>", h))
        .collect();
    let body = if rows.is_empty() {
        empty_row(heads.len(), "No transactions yet")
    } else {
        rows.join("")
    };
    format!(
        "<table class='min-w-full'><thead class='bg-gray-50'><tr>{}</tr></thead><tbody>{}</tbody></table>",
        heads.join(""),
        body
    )
}

fn row(id: &str, cells: &[String]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| format!("<td class='px-4 py-2'>{}</td>", c)).collect();
    format!("<tr id='history-row-{}' class='border-b'>{}</tr>", escape_html(id), cells.join(""))
}

fn date(tx: &Transaction) -> String {
    tx.date.format("%Y-%m-%d").to_string()
}

/// Balance figure, also used as an out-of-band swap after a transfer
fn balance_span(state: &AppState, wallet: &Wallet, oob: bool) -> String {
    format!(
        "<span id='wallet-balance'{}>{}</span>",
        if oob { " hx-swap-oob='true'" } else { "" },
        state.money(wallet.balance())
    )
}

/// Empty confirmation panel, swapped out of band once a request is booked
fn clear_panel(id: &str) -> String {
    format!("<div id='{}' hx-swap-oob='true'></div>", id)
}

fn deposit_history(state: &AppState, wallet: &Wallet) -> String {
    let rows = wallet
        .deposits()
        .iter()
        .map(|tx| {
            let receipt = match tx.receipt {
                Some(ref r) => format!(
                    "<a href='{0}' target='_blank' class='text-indigo-600 hover:underline'>View Receipt</a>",
                    escape_html(r)
                ),
                None => "-".to_string(),
            };
            row(&tx.id, &[state.money(tx.amount), status_badge(tx.status), date(tx), receipt])
        })
        .collect();
    history_table(&["Amount", "Status", "Date", "Receipt"], rows)
}

fn withdraw_history(state: &AppState, wallet: &Wallet) -> String {
    let rows = wallet
        .withdrawals()
        .iter()
        .map(|tx| {
            let (bank, account) = match tx.bank {
                Some(ref b) => (escape_html(&b.name), escape_html(&b.account_number)),
                None => ("-".to_string(), "-".to_string()),
            };
            row(&tx.id, &[state.money(tx.amount), status_badge(tx.status), date(tx), bank, account])
        })
        .collect();
    history_table(&["Amount", "Status", "Date", "Bank Name", "Account Number"], rows)
}

fn send_history(state: &AppState, wallet: &Wallet) -> String {
    let rows = wallet
        .sends()
        .iter()
        .map(|tx| {
            row(
                &tx.id,
                &[
                    escape_html(tx.counterparty.as_deref().unwrap_or("-")),
                    state.money(tx.amount),
                    status_badge(tx.status),
                    date(tx),
                ],
            )
        })
        .collect();
    history_table(&["Recipient", "Amount", "Status", "Date"], rows)
}

/// Confirmation panel for a quoted withdrawal or send
///
/// Hidden inputs carry the submitted values to the confirm endpoint, which
/// quotes again before booking.
fn confirm_panel(state: &AppState, quote: &Quote, action: &str, target: &str, panel: &str, hidden: &[(&str, &str)]) -> String {
    let mut lines = vec![("Amount", state.money(quote.amount)), ("Fee", state.money(quote.fee))];
    if let Some(ref bank) = quote.bank {
        lines.push(("Bank", escape_html(&bank.name)));
        lines.push(("Account Number", escape_html(&bank.account_number)));
    }
    if let Some(ref recipient) = quote.recipient {
        lines.push(("Recipient", escape_html(recipient)));
    }
    lines.push(("Total", state.money(quote.total())));

    let items: Vec<String> = lines
        .into_iter()
        .map(|(label, value)| {
            format!("<div class='flex justify-between py-1'><span class='text-gray-500'>{}</span><span class='font-medium'>{}</span></div>", label, value)
        })
        .collect();
    let inputs: Vec<String> = hidden
        .iter()
        .map(|(name, value)| format!("<input type='hidden' name='{}' value='{}'>", name, escape_html(value)))
        .collect();

    format!(
        r#"<div class='mt-4 p-4 border border-indigo-200 bg-indigo-50 rounded-lg'>
            <h4 class='font-semibold mb-2'>Confirm {}</h4>
            {}
            <form class='flex gap-2 mt-4' hx-post='{}' hx-target='#{}'>
                {}
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Confirm</button>
                <button type='button' class='px-4 py-2 border rounded-lg' onclick="document.getElementById('{}').innerHTML=''">Cancel</button>
            </form>
        </div>"#,
        quote.kind.title(),
        items.join(""),
        action,
        target,
        inputs.join(""),
        panel
    )
}

/// Refusal toast with an empty panel
fn refused(notice: &Notice) -> Html<String> {
    Html(toast_html(notice))
}

// ==================== Overview ====================

pub async fn page_dashboard(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, Response> {
    let session = require_session(&state, &headers, Role::User)?;
    let query = transaction_query(&params);
    let workspace = state.workspace.read().await;
    let overview = workspace.user_overview(5);
    let rows = workspace.activity_view(&query);

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Dashboard</h2><p class='text-sm text-gray-500'>Welcome back, {}</p></div>
        <div class='grid grid-cols-1 md:grid-cols-2 gap-4 mb-6'>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Balance</p><p class='text-2xl font-bold text-indigo-700'>{}</p></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Pending requests</p><p class='text-2xl font-bold text-yellow-700'>{}</p></div>
        </div>
        <h3 class='text-lg font-semibold mb-2'>Recent activity</h3>
        {}
        <div id='{}'>{}</div>"#,
        escape_html(&session.email),
        balance_span(&state, &workspace.wallet, false),
        overview.pending_requests,
        transaction_filters(&ACTIVITY_LIST, &query),
        ACTIVITY_LIST.target,
        render_transaction_list(&state, &rows, &query, &ACTIVITY_LIST, false)
    );

    Ok(Html(page_response(&headers, Role::User, "Dashboard", "/dashboard", &inner_content)))
}

// ==================== Deposit ====================

pub async fn page_deposit(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let workspace = state.workspace.read().await;

    let form = r#"<form class='space-y-4' hx-post='/dashboard/deposit' hx-target='#deposit-history' hx-on::after-request='if(event.detail.successful) this.reset()'>
            <div><label class='block text-sm text-gray-600 mb-1' for='full_name'>Full Name</label><input id='full_name' name='full_name' class='w-full px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-sm text-gray-600 mb-1' for='amount'>Amount</label><input id='amount' name='amount' type='number' step='0.01' min='0' class='w-full px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-sm text-gray-600 mb-1' for='receipt'>Receipt Upload</label><input id='receipt' name='receipt' placeholder='Receipt reference or link' class='w-full px-3 py-2 border rounded-lg'></div>
            <button class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Submit Deposit</button>
        </form>"#;

    let inner_content = format!(
        "<div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>{}{}</div>",
        card("Make a Deposit", form),
        card(
            "Deposit Transactions",
            &format!("<div id='deposit-history'>{}</div>", deposit_history(&state, &workspace.wallet))
        )
    );

    Ok(Html(page_response(&headers, Role::User, "Deposit", "/dashboard/deposit", &inner_content)))
}

pub async fn htmx_deposit_submit(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let form = parse_form(&body);
    let mut workspace = state.workspace.write().await;
    let notice = workspace
        .wallet
        .submit_deposit(field(&form, "amount"), optional(&form, "full_name"), optional(&form, "receipt"), today())
        .unwrap_or_else(Notice::from);
    Ok(with_toast(deposit_history(&state, &workspace.wallet), &notice))
}

// ==================== Withdraw ====================

pub async fn page_withdraw(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let workspace = state.workspace.read().await;
    let wallet = &workspace.wallet;

    let options: Vec<String> = wallet
        .banks()
        .iter()
        .map(|b| format!("<option value='{}'>{}</option>", escape_html(&b.id), escape_html(&b.name)))
        .collect();

    let form = format!(
        r#"<form class='space-y-4' hx-post='/dashboard/withdraw' hx-target='#withdraw-confirm'>
            <div><label class='block text-sm text-gray-600 mb-1' for='amount'>Amount</label><input id='amount' name='amount' type='number' step='0.01' min='0' class='w-full px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-sm text-gray-600 mb-1' for='bank'>Select Bank</label><select id='bank' name='bank_id' class='w-full px-3 py-2 border rounded-lg'><option value=''>Select a bank</option>{}</select></div>
            <div><label class='block text-sm text-gray-600 mb-1' for='account_number'>Account Number</label><input id='account_number' name='account_number' placeholder='Defaults to the account on file' class='w-full px-3 py-2 border rounded-lg'></div>
            <p class='text-xs text-gray-500'>A fee applies to every withdrawal and is shown before you confirm.</p>
            <button class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Withdraw</button>
        </form>
        <div id='withdraw-confirm'></div>"#,
        options.join("")
    );

    let inner_content = format!(
        "<div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>{}{}</div>",
        card("Make a Withdrawal", &form),
        card(
            "Withdrawal Transactions",
            &format!("<div id='withdraw-history'>{}</div>", withdraw_history(&state, wallet))
        )
    );

    Ok(Html(page_response(&headers, Role::User, "Withdraw", "/dashboard/withdraw", &inner_content)))
}

pub async fn htmx_withdraw_quote(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let form = parse_form(&body);
    let workspace = state.workspace.read().await;

    let quote = workspace
        .wallet
        .quote_withdrawal(field(&form, "amount"), optional(&form, "bank_id"), optional(&form, "account_number"));
    match quote {
        Ok(quote) => {
            let account = quote.bank.as_ref().map(|b| b.account_number.as_str()).unwrap_or("");
            Ok(Html(confirm_panel(
                &state,
                &quote,
                "/dashboard/withdraw/confirm",
                "withdraw-history",
                "withdraw-confirm",
                &[
                    ("amount", field(&form, "amount")),
                    ("bank_id", field(&form, "bank_id")),
                    ("account_number", account),
                ],
            )))
        }
        Err(e) => Ok(refused(&Notice::from(e))),
    }
}

pub async fn htmx_withdraw_confirm(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let form = parse_form(&body);
    let mut workspace = state.workspace.write().await;

    let notice = workspace
        .wallet
        .confirm_withdrawal(
            field(&form, "amount"),
            optional(&form, "bank_id"),
            optional(&form, "account_number"),
            today(),
        )
        .unwrap_or_else(Notice::from);
    let fragment = format!("{}{}", withdraw_history(&state, &workspace.wallet), clear_panel("withdraw-confirm"));
    Ok(with_toast(fragment, &notice))
}

// ==================== Send ====================

pub async fn page_send(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let workspace = state.workspace.read().await;
    let wallet = &workspace.wallet;

    let form = format!(
        r#"<p class='text-sm text-gray-500 mb-4'>Available balance: {}</p>
        <form class='space-y-4' hx-post='/dashboard/send' hx-target='#send-confirm'>
            <div><label class='block text-sm text-gray-600 mb-1' for='recipient'>Recipient (Username or Email)</label><input id='recipient' name='recipient' class='w-full px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-sm text-gray-600 mb-1' for='amount'>Amount</label><input id='amount' name='amount' type='number' step='0.01' min='0' class='w-full px-3 py-2 border rounded-lg'></div>
            <button class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Send Money</button>
        </form>
        <div id='send-confirm'></div>"#,
        balance_span(&state, wallet, false)
    );

    let inner_content = format!(
        "<div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>{}{}</div>",
        card("Send Money", &form),
        card(
            "Send Transactions",
            &format!("<div id='send-history'>{}</div>", send_history(&state, wallet))
        )
    );

    Ok(Html(page_response(&headers, Role::User, "Send Money", "/dashboard/send", &inner_content)))
}

pub async fn htmx_send_quote(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let form = parse_form(&body);
    let workspace = state.workspace.read().await;

    match workspace.wallet.quote_send(field(&form, "amount"), field(&form, "recipient")) {
        Ok(quote) => Ok(Html(confirm_panel(
            &state,
            &quote,
            "/dashboard/send/confirm",
            "send-history",
            "send-confirm",
            &[("amount", field(&form, "amount")), ("recipient", field(&form, "recipient"))],
        ))),
        Err(e) => Ok(refused(&Notice::from(e))),
    }
}

pub async fn htmx_send_confirm(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let form = parse_form(&body);
    let mut workspace = state.workspace.write().await;

    let notice = workspace
        .wallet
        .confirm_send(field(&form, "amount"), field(&form, "recipient"), today())
        .unwrap_or_else(Notice::from);
    let fragment = format!(
        "{}{}{}",
        send_history(&state, &workspace.wallet),
        clear_panel("send-confirm"),
        balance_span(&state, &workspace.wallet, true)
    );
    Ok(with_toast(fragment, &notice))
}
