//! Transaction routes - Admin history, user activity panel, JSON API
//!
//! Structure:
//! - api.rs: JSON API and HTMX fragments
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{
    api_transaction_detail,
    api_transactions,
    htmx_activity_list,
    htmx_transaction_detail,
    htmx_transactions_list,
    render_transaction_list,
    transaction_filters,
    ACTIVITY_LIST,
    ADMIN_LIST,
};

pub use page::page_transactions;
