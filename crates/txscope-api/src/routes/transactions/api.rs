//! Transactions API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_transactions: Snapshot plus the current page (JSON)
//! - api_transaction_detail: Single transaction (JSON)
//! - api_refresh: Non-silent refetch, used by Retry (JSON)
//! - htmx_transactions_list: Table and pager (HTML fragment)
//! - htmx_transactions_search / filter / clear_filters / sort / page: View changes (HTML fragment)
//! - htmx_transaction_detail / close: Details modal (HTML fragment)
//! - htmx_transaction_create_form / store: Create modal and submit (HTMX)
//! - htmx_draft_save / clear: Draft persistence (HTMX)
//! - htmx_transactions_export: CSV download

use super::page::{render_create_modal, render_detail_modal, render_explorer_body, render_fee_estimate, render_list};
use crate::{ApiError, ApiResult, AppState};
use axum::extract::{Form, Path};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use txscope_core::csv::export_filename;
use txscope_core::{CreateTxForm, DateRange, SortField, StatusFilter, Tx};

/// Tells the page to re-request the list
const LIST_CHANGED: [(&str, &str); 1] = [("HX-Trigger", "txListChanged")];
/// Tells the page to re-request the list and the toast area
const LIST_AND_TOASTS_CHANGED: [(&str, &str); 1] = [("HX-Trigger", "txListChanged, txToast")];
const TOASTS_CHANGED: [(&str, &str); 1] = [("HX-Trigger", "txToast")];

/// Snapshot plus the current page (JSON API)
pub async fn api_transactions(state: axum::extract::State<AppState>) -> Json<serde_json::Value> {
    let page = state.explorer.derived_view();
    let snapshot = state.explorer.snapshot();
    Json(serde_json::json!({
        "snapshot": snapshot,
        "page": page,
    }))
}

/// Single transaction from the remote API (JSON API)
pub async fn api_transaction_detail(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> ApiResult<Json<Tx>> {
    let tx = state.explorer.lookup(&path.0).await?;
    Ok(Json(tx))
}

/// Refetch the list, showing the loading state (JSON API)
pub async fn api_refresh(state: axum::extract::State<AppState>) -> impl IntoResponse {
    let body = match state.explorer.fetch_all(false).await {
        Ok(()) => serde_json::json!({ "success": true, "loadState": state.explorer.load_state() }),
        Err(e) => serde_json::json!({ "success": false, "error": e.to_details() }),
    };
    (LIST_CHANGED, Json(body))
}

/// HTMX: Table and pager
pub async fn htmx_transactions_list(state: axum::extract::State<AppState>) -> Html<String> {
    Html(render_list(&state.explorer, &state.config))
}

/// HTMX: Debounced search. Superseded inputs answer 204 so nothing is swapped.
pub async fn htmx_transactions_search(
    state: axum::extract::State<AppState>,
    form: Form<HashMap<String, String>>,
) -> Response {
    let text = form.get("q").map(String::as_str).unwrap_or("");
    if state.explorer.set_search(text).await {
        Html(render_list(&state.explorer, &state.config)).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

fn parse_date(value: Option<&String>) -> Option<NaiveDate> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// HTMX: Status and date range filters
pub async fn htmx_transactions_filter(
    state: axum::extract::State<AppState>,
    form: Form<HashMap<String, String>>,
) -> Html<String> {
    let status = StatusFilter::parse(form.get("status").map(String::as_str).unwrap_or("all"));
    let range = DateRange {
        from: parse_date(form.get("from")),
        to: parse_date(form.get("to")),
    };
    state.explorer.set_filters(status, range);
    Html(render_list(&state.explorer, &state.config))
}

/// HTMX: Reset filters and search; re-renders the filter bar too
pub async fn htmx_transactions_clear_filters(state: axum::extract::State<AppState>) -> Html<String> {
    state.explorer.clear_filters();
    Html(render_explorer_body(&state.explorer, &state.config))
}

/// HTMX: Toggle sort on a column
pub async fn htmx_transactions_sort(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> ApiResult<Html<String>> {
    let field: SortField = path.0.parse().map_err(|message| ApiError::BadRequest { message })?;
    state.explorer.toggle_sort(field);
    Ok(Html(render_list(&state.explorer, &state.config)))
}

/// HTMX: Go to page
pub async fn htmx_transactions_page(
    state: axum::extract::State<AppState>,
    path: Path<usize>,
) -> Html<String> {
    state.explorer.set_page(path.0);
    Html(render_list(&state.explorer, &state.config))
}

/// HTMX: Details modal. On failure nothing is shown besides the toast.
pub async fn htmx_transaction_detail(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Response {
    match state.explorer.open_details(&path.0).await {
        Ok(tx) => Html(render_detail_modal(&tx, &state.config)).into_response(),
        Err(_) => (TOASTS_CHANGED, Html(String::new())).into_response(),
    }
}

/// HTMX: Close the details modal
pub async fn htmx_transaction_close(state: axum::extract::State<AppState>) -> Html<String> {
    state.explorer.close_details();
    Html(String::new())
}

/// HTMX: Create modal, prefilled from the saved draft
pub async fn htmx_transaction_create_form(state: axum::extract::State<AppState>) -> Html<String> {
    let draft = match state.explorer.drafts() {
        Some(drafts) => drafts.load().await.unwrap_or_default(),
        None => CreateTxForm::default(),
    };
    Html(render_create_modal(&draft, &[], &state.config.display.currency))
}

/// HTMX: Submit the create form
///
/// Invalid input re-renders the modal with field errors. Valid input inserts
/// the optimistic row, closes the modal and resolves in the background.
pub async fn htmx_transaction_store(
    state: axum::extract::State<AppState>,
    form: Form<CreateTxForm>,
) -> Response {
    match form.validate() {
        Ok(request) => {
            let temp_id = state.explorer.submit_create(request);
            log::info!("Submitted transaction {}", temp_id);
            (LIST_AND_TOASTS_CHANGED, Html(String::new())).into_response()
        }
        Err(errors) => {
            log::debug!("Create form rejected with {} field errors", errors.len());
            Html(render_create_modal(&form, &errors, &state.config.display.currency)).into_response()
        }
    }
}

/// HTMX: Persist the in-progress form and return the fee estimate
pub async fn htmx_draft_save(
    state: axum::extract::State<AppState>,
    form: Form<CreateTxForm>,
) -> Html<String> {
    if let Some(drafts) = state.explorer.drafts() {
        if let Err(e) = drafts.save(&form).await {
            log::warn!("Failed to save draft: {}", e);
        }
    }
    Html(render_fee_estimate(&form, &state.config.display.currency))
}

/// HTMX: Drop the draft and return a blank create modal
pub async fn htmx_draft_clear(state: axum::extract::State<AppState>) -> Html<String> {
    if let Some(drafts) = state.explorer.drafts() {
        if let Err(e) = drafts.clear().await {
            log::warn!("Failed to clear draft: {}", e);
        }
    }
    Html(render_create_modal(&CreateTxForm::default(), &[], &state.config.display.currency))
}

/// CSV of the filtered and sorted list, all pages
pub async fn htmx_transactions_export(state: axum::extract::State<AppState>) -> impl IntoResponse {
    let csv = state.explorer.export_csv();
    let headers: [(HeaderName, String); 2] = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export_filename(Utc::now())),
        ),
    ];
    (headers, csv)
}
