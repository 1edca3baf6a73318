//! Route modules for the API server
//!
//! - auth: Sign-in and sign-out for both consoles, sign-up
//! - transactions: Admin history, user activity panel, JSON API
//! - requests: The three review queues
//! - users / banks: Admin directories
//! - settings / email: Admin system settings and email composer
//! - profile: Profile pages of both consoles
//! - wallet: User dashboard forms
//! - chat: Support chat widget
//!
//! List screens share the helpers below: query parsing, sortable headers
//! and the filter form.

pub mod auth;
pub mod banks;
pub mod chat;
pub mod email;
pub mod profile;
pub mod requests;
pub mod settings;
pub mod transactions;
pub mod users;
pub mod wallet;

use cashora_core::{toggle_sort, SortDirection, SortSpec, Status, Transaction, TransactionFilter, TransactionKind, ViewQuery};
use cashora_utils::escape_html;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// Non-blank request parameter
pub fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
}

/// Current sort from `sort`/`dir`, with a `click` applied on top
pub fn sort_from_params<F: FromStr + PartialEq + Copy>(params: &HashMap<String, String>) -> Option<SortSpec<F>> {
    let current = SortSpec::parse(param(params, "sort"), param(params, "dir"));
    match param(params, "click").and_then(|c| c.parse::<F>().ok()) {
        Some(field) => toggle_sort(current, field),
        None => current,
    }
}

/// Transaction list query: `q`, `kind`, `status`, `sort`, `dir`, `click`
pub fn transaction_query(params: &HashMap<String, String>) -> ViewQuery<Transaction> {
    ViewQuery::default()
        .with_search(params.get("q").map(|s| s.as_str()).unwrap_or(""))
        .with_filter(TransactionFilter::parse(param(params, "kind"), param(params, "status")))
        .with_sort(sort_from_params(params))
}

/// Where a list lives on its page
#[derive(Debug, Clone, Copy)]
pub struct ListTarget<'a> {
    /// Fragment endpoint
    pub url: &'a str,
    /// Filter form the list reads its parameters from
    pub form_id: &'a str,
    /// Element the fragment is swapped into
    pub target: &'a str,
}

impl<'a> ListTarget<'a> {
    /// Column header that applies the tri-state toggle on click
    pub fn sort_header<F: Display + PartialEq + Copy>(&self, label: &str, field: F, sort: Option<SortSpec<F>>) -> String {
        let arrow = match sort {
            Some(spec) if spec.field == field => match spec.direction {
                SortDirection::Asc => "▲",
                SortDirection::Desc => "▼",
            },
            _ => "↕",
        };
        format!(
            r#"<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'><button type='button' class='flex items-center gap-1 hover:text-gray-900' hx-get='{}?click={}' hx-include='#{}' hx-target='#{}'>{}<span class='text-gray-400'>{}</span></button></th>"#,
            self.url, field, self.form_id, self.target, label, arrow
        )
    }

    /// Sort state carried by the filter form between requests
    pub fn sort_inputs<F: Display + Copy>(&self, sort: Option<SortSpec<F>>) -> String {
        let (field, direction) = match sort {
            Some(spec) => (spec.field.to_string(), spec.direction.to_string()),
            None => (String::new(), String::new()),
        };
        format!(
            r#"<input type='hidden' name='sort' form='{0}' value='{1}'><input type='hidden' name='dir' form='{0}' value='{2}'>"#,
            self.form_id, field, direction
        )
    }

    /// Search box plus the given selects
    pub fn filter_form(&self, search: &str, selects: &str) -> String {
        format!(
            r#"<form id='{}' class='flex flex-wrap items-center gap-3 mb-4' hx-get='{}' hx-target='#{}' hx-trigger='input delay:300ms, change' onsubmit='return false'>
                <input type='search' name='q' value='{}' placeholder='Search...' class='px-3 py-2 border rounded-lg w-64'>
                {}
            </form>"#,
            self.form_id,
            self.url,
            self.target,
            escape_html(search),
            selects
        )
    }
}

/// `<select>` whose first option restricts nothing
pub fn select_filter(name: &str, all_label: &str, options: &[(&str, &str)], selected: Option<&str>) -> String {
    let mut html = format!(
        "<select name='{}' class='px-3 py-2 border rounded-lg bg-white'><option value='all'>{}</option>",
        name, all_label
    );
    for (value, label) in options {
        html.push_str(&format!(
            "<option value='{}'{}>{}</option>",
            value,
            if selected == Some(*value) { " selected" } else { "" },
            label
        ));
    }
    html.push_str("</select>");
    html
}

pub fn kind_select(selected: Option<TransactionKind>) -> String {
    let options: Vec<(&str, &str)> = TransactionKind::ALL.iter().map(|k| (k.as_str(), k.title())).collect();
    select_filter("kind", "All types", &options, selected.map(|k| k.as_str()))
}

pub fn status_select(selected: Option<Status>) -> String {
    select_filter(
        "status",
        "All statuses",
        &[("pending", "Pending"), ("completed", "Completed"), ("rejected", "Rejected")],
        selected.map(|s| s.as_str()),
    )
}

pub fn status_badge(status: Status) -> String {
    let class = match status {
        Status::Pending => "bg-yellow-100 text-yellow-800",
        Status::Completed => "bg-green-100 text-green-800",
        Status::Rejected => "bg-red-100 text-red-800",
    };
    format!("<span class='px-2 py-0.5 rounded-full text-xs font-medium {}'>{}</span>", class, status.as_str())
}

pub fn empty_row(colspan: usize, text: &str) -> String {
    format!("<tr><td colspan='{}' class='px-4 py-8 text-center text-gray-500'>{}</td></tr>", colspan, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashora_core::TransactionField;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_click_cycles_through_three_states() {
        let first: Option<SortSpec<TransactionField>> = sort_from_params(&params(&[("click", "amount")]));
        assert_eq!(first, Some(SortSpec::asc(TransactionField::Amount)));

        let second: Option<SortSpec<TransactionField>> =
            sort_from_params(&params(&[("sort", "amount"), ("dir", "asc"), ("click", "amount")]));
        assert_eq!(second, Some(SortSpec::desc(TransactionField::Amount)));

        let third: Option<SortSpec<TransactionField>> =
            sort_from_params(&params(&[("sort", "amount"), ("dir", "desc"), ("click", "amount")]));
        assert_eq!(third, None);
    }

    #[test]
    fn test_blank_sort_inputs_mean_unsorted() {
        let sort: Option<SortSpec<TransactionField>> = sort_from_params(&params(&[("sort", ""), ("dir", "")]));
        assert_eq!(sort, None);
    }

    #[test]
    fn test_transaction_query_reads_filters() {
        let query = transaction_query(&params(&[("q", "500"), ("kind", "all"), ("status", "pending")]));
        assert_eq!(query.search, "500");
        assert_eq!(query.filter.kind, None);
        assert_eq!(query.filter.status, Some(Status::Pending));
    }

    #[test]
    fn test_sort_header_marks_direction() {
        let list = ListTarget { url: "/x/list", form_id: "f", target: "t" };
        let html = list.sort_header("Amount", TransactionField::Amount, Some(SortSpec::desc(TransactionField::Amount)));
        assert!(html.contains("hx-get='/x/list?click=amount'"));
        assert!(html.contains("▼"));
        let html = list.sort_header("Date", TransactionField::Date, Some(SortSpec::desc(TransactionField::Amount)));
        assert!(html.contains("↕"));
    }

    #[test]
    fn test_select_marks_selected_option() {
        let html = status_select(Some(Status::Rejected));
        assert!(html.contains("<option value='rejected' selected>"));
        assert!(html.contains("<option value='all'>"));
    }
}
