//! Transaction explorer routes

pub mod api;
pub mod page;

pub use api::{
    api_refresh, api_transaction_detail, api_transactions, htmx_draft_clear, htmx_draft_save,
    htmx_transaction_close, htmx_transaction_create_form, htmx_transaction_detail, htmx_transaction_store,
    htmx_transactions_clear_filters, htmx_transactions_export, htmx_transactions_filter, htmx_transactions_list,
    htmx_transactions_page, htmx_transactions_search, htmx_transactions_sort,
};
pub use page::page_transactions;
