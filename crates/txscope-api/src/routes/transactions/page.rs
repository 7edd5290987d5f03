//! Transactions page rendering
//!
//! Pages and partials:
//! - page_transactions: Explorer page (filter bar, table, pager)
//! - render_explorer_body: Filter bar plus the polled list container
//! - render_list: Summary cards, then the table and pager for the current load state
//! - render_detail_modal: Details of one transaction
//! - render_create_modal: Create form with validation errors and fee estimate

use crate::{page_response, AppState};
use chrono::Utc;
use txscope_config::Config;
use txscope_core::{
    CreateTxForm, Explorer, FieldError, LoadState, Page, Snapshot, Sort, SortDir, SortField, StatusFilter, Tx,
    TxStatus, ViewState,
};
use txscope_utils::{escape_html, estimate_fee, format_amount, format_full, format_relative, truncate_address};

/// Most page buttons shown at once
const PAGE_WINDOW: usize = 7;

/// Transactions page
pub async fn page_transactions(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let inner_content = format!(
        r#"<div class='mb-6 flex items-center justify-between'>
            <h2 class='text-2xl font-bold'>Transactions</h2>
            <div class='flex items-center gap-2'>
                <button hx-post='/api/refresh' hx-swap='none' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Refresh</button>
                <a href='/transactions/export' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Export CSV</a>
                <button hx-get='/transactions/create' hx-target='#modal-root' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>New Transaction</button>
            </div>
        </div>
        <div id='tx-explorer'>{}</div>"#,
        render_explorer_body(&state.explorer, &state.config)
    );

    axum::response::Html(page_response(&headers, "Transactions", "/transactions", &inner_content))
}

/// Filter bar and list container, re-rendered whole when filters are cleared
pub fn render_explorer_body(explorer: &Explorer, config: &Config) -> String {
    let snapshot = explorer.snapshot();
    format!(
        r#"{}
        <div id='transactions-content' hx-get='/transactions/list' hx-trigger='every 2s, txListChanged from:body'>{}</div>"#,
        render_filter_bar(&snapshot),
        render_list(explorer, config)
    )
}

fn render_filter_bar(snapshot: &Snapshot) -> String {
    let options: String = [("all", "All statuses"), ("pending", "Pending"), ("confirmed", "Confirmed"), ("failed", "Failed")]
        .iter()
        .map(|(value, label)| {
            let selected = if snapshot.status_filter == *value { " selected" } else { "" };
            format!("<option value='{}'{}>{}</option>", value, selected, label)
        })
        .collect();
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    format!(
        r#"<div class='flex flex-wrap items-center gap-3 mb-4 p-3 bg-white rounded-lg border shadow-sm'>
            <input type='search' name='q' value='{}' placeholder='Search hash or address…'
                class='flex-1 min-w-[240px] px-3 py-1.5 text-sm border rounded-lg'
                hx-post='/transactions/search' hx-trigger='input changed, search' hx-sync='this:replace' hx-target='#transactions-content'>
            <form id='filter-form' class='flex items-center gap-2' hx-post='/transactions/filters' hx-trigger='change' hx-target='#transactions-content'>
                <select name='status' class='px-2 py-1.5 text-sm border rounded-lg bg-white'>{}</select>
                <input type='date' name='from' value='{}' class='px-2 py-1.5 text-sm border rounded-lg'>
                <span class='text-gray-400'>–</span>
                <input type='date' name='to' value='{}' class='px-2 py-1.5 text-sm border rounded-lg'>
            </form>
            <button hx-post='/transactions/filters/clear' hx-target='#tx-explorer' class='px-3 py-1.5 text-sm text-gray-600 border rounded-lg hover:bg-gray-50'>Clear</button>
        </div>"#,
        escape_html(&snapshot.search),
        options,
        date(snapshot.date_from),
        date(snapshot.date_to)
    )
}

/// Status, date bounds and search each count once when set
pub fn active_filter_count(view: &ViewState) -> usize {
    [
        view.filters.status != StatusFilter::All,
        view.filters.range.from.is_some(),
        view.filters.range.to.is_some(),
        !view.search.is_empty(),
    ]
    .iter()
    .filter(|active| **active)
    .count()
}

fn summary_card(label: &str, value: usize, accent: &str) -> String {
    format!(
        r#"<div class='bg-white rounded-lg border shadow-sm p-4'>
            <p class='text-sm text-gray-500'>{}</p>
            <p class='text-2xl font-bold {}'>{}</p>
        </div>"#,
        label, accent, value
    )
}

fn render_summary(total: usize, active_filters: usize, filtered: usize) -> String {
    format!(
        "<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-4'>{}{}{}</div>",
        summary_card("Total Transactions", total, "text-gray-900"),
        summary_card("Active Filters", active_filters, "text-indigo-600"),
        summary_card("Filtered Results", filtered, "text-green-600")
    )
}

/// Summary cards, then the table and pager or the error panel / skeleton
pub fn render_list(explorer: &Explorer, config: &Config) -> String {
    let total = explorer.snapshot().list.len();
    let view = explorer.view_state();
    let (filtered, body) = match explorer.load_state() {
        LoadState::Error(message) => (explorer.filtered().len(), render_error_panel(&message)),
        LoadState::Idle | LoadState::Loading => (explorer.filtered().len(), render_skeleton()),
        LoadState::Ready => {
            let page = explorer.derived_view();
            (page.total, render_table(&page, view.sort, &config.display.currency))
        }
    };
    format!("{}{}", render_summary(total, active_filter_count(&view), filtered), body)
}

fn render_error_panel(message: &str) -> String {
    format!(
        r#"<div class='text-center py-12 bg-red-50 border border-red-200 rounded-lg'>
            <p class='text-red-700 font-medium'>Failed to load transactions</p>
            <p class='text-sm text-red-600 mt-1'>{}</p>
            <button hx-post='/api/refresh' hx-swap='none' class='mt-4 px-4 py-2 bg-red-600 text-white rounded-lg hover:bg-red-700'>Retry</button>
        </div>"#,
        escape_html(message)
    )
}

fn render_skeleton() -> String {
    let mut html = String::from("<div class='space-y-2 animate-pulse' aria-busy='true'>");
    for _ in 0..5 {
        html.push_str("<div class='h-12 bg-gray-200 rounded-lg'></div>");
    }
    html.push_str("</div>");
    html
}

fn sort_header(label: &str, field: SortField, sort: Sort) -> String {
    let indicator = if sort.field == field {
        match sort.dir {
            SortDir::Asc => " ▲",
            SortDir::Desc => " ▼",
        }
    } else {
        ""
    };
    format!(
        "<th class='px-4 py-2 text-left'><button hx-post='/transactions/sort/{}' hx-target='#transactions-content' class='font-medium hover:text-indigo-600'>{}{}</button></th>",
        field, label, indicator
    )
}

pub fn status_badge(status: &TxStatus) -> String {
    let color = match status {
        TxStatus::Pending => "bg-yellow-100 text-yellow-800",
        TxStatus::Confirmed => "bg-green-100 text-green-800",
        TxStatus::Failed => "bg-red-100 text-red-800",
        TxStatus::Other(_) => "bg-gray-100 text-gray-700",
    };
    format!(
        "<span class='px-2 py-0.5 text-xs rounded-full {}'>{}</span>",
        color,
        escape_html(status.as_str())
    )
}

/// Copies the full hash. Stops the click so the row does not open details.
fn copy_hash_button(hash: &str) -> String {
    if hash.is_empty() {
        return String::new();
    }
    format!(
        " <button onclick='event.stopPropagation(); txCopy(this.dataset.copy)' data-copy='{}' title='Copy hash' class='ml-1 text-xs px-1.5 py-0.5 border rounded text-gray-500 hover:bg-gray-100'>Copy hash</button>",
        escape_html(hash)
    )
}

fn render_row(tx: &Tx, currency: &str) -> String {
    let now = Utc::now();
    // a failed placeholder shows only its badge until it is removed
    let submitting = tx.optimistic && tx.status == TxStatus::Pending;
    let pending_marker = if submitting {
        " <span class='text-xs text-gray-400 italic'>submitting</span>"
    } else {
        ""
    };
    format!(
        r#"<tr class='border-t hover:bg-gray-50 cursor-pointer{}' hx-get='/transactions/{}/detail' hx-target='#modal-root'>
            <td class='px-4 py-2 font-mono text-sm'>{}{}{}</td>
            <td class='px-4 py-2 font-mono text-sm'>{}</td>
            <td class='px-4 py-2 font-mono text-sm'>{}</td>
            <td class='px-4 py-2 text-right'>{}</td>
            <td class='px-4 py-2'>{}</td>
            <td class='px-4 py-2 text-sm text-gray-500' title='{}'>{}</td>
        </tr>"#,
        if submitting { " opacity-60" } else { "" },
        urlencoding::encode(&tx.id),
        escape_html(&truncate_address(&tx.hash)),
        copy_hash_button(&tx.hash),
        pending_marker,
        escape_html(&truncate_address(&tx.from)),
        escape_html(&truncate_address(&tx.to)),
        escape_html(&format_amount(&tx.amount.to_string(), currency)),
        status_badge(&tx.status),
        escape_html(&format_full(&tx.timestamp)),
        escape_html(&format_relative(&tx.timestamp, now)),
    )
}

/// 1-based page numbers around `current`, at most [`PAGE_WINDOW`] of them
pub fn page_window(current: usize, count: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let half = PAGE_WINDOW / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = (start + PAGE_WINDOW - 1).min(count);
    if end + 1 - start < PAGE_WINDOW {
        start = (end + 1).saturating_sub(PAGE_WINDOW).max(1);
    }
    (start..=end).collect()
}

fn render_pager(page: &Page) -> String {
    let button = |target: usize, label: String, enabled: bool, active: bool| {
        if !enabled {
            return format!("<span class='px-3 py-1 text-gray-300 border rounded'>{}</span>", label);
        }
        let class = if active {
            "px-3 py-1 border rounded bg-indigo-600 text-white"
        } else {
            "px-3 py-1 border rounded hover:bg-gray-50"
        };
        format!(
            "<button hx-post='/transactions/page/{}' hx-target='#transactions-content' class='{}'>{}</button>",
            target, class, label
        )
    };

    let mut buttons = button(page.page.saturating_sub(1), "Previous".to_string(), page.page > 1, false);
    for n in page_window(page.page, page.page_count) {
        buttons.push_str(&button(n, n.to_string(), true, n == page.page));
    }
    buttons.push_str(&button(page.page + 1, "Next".to_string(), page.page < page.page_count, false));

    format!(
        r#"<div class='flex items-center justify-between mt-4 text-sm'>
            <span class='text-gray-500'>Showing {}-{} of {}</span>
            <div class='flex items-center gap-1'>{}</div>
        </div>"#,
        page.start, page.end, page.total, buttons
    )
}

fn render_table(page: &Page, sort: Sort, currency: &str) -> String {
    if page.items.is_empty() {
        return r#"<div class='text-center py-12 text-gray-500'>
            <p>No transactions found</p>
            <button hx-post='/transactions/filters/clear' hx-target='#tx-explorer' class='mt-2 text-indigo-600 hover:underline'>Clear filters</button>
        </div>"#
            .to_string();
    }

    let rows: String = page.items.iter().map(|tx| render_row(tx, currency)).collect();
    format!(
        r#"<div class='bg-white rounded-lg border overflow-hidden'>
            <table class='w-full'>
                <thead class='bg-gray-50 text-sm text-gray-600'>
                    <tr>
                        <th class='px-4 py-2 text-left'>Hash</th>
                        <th class='px-4 py-2 text-left'>From</th>
                        <th class='px-4 py-2 text-left'>To</th>
                        {}
                        {}
                        {}
                    </tr>
                </thead>
                <tbody>{}</tbody>
            </table>
        </div>
        {}"#,
        sort_header("Amount", SortField::Amount, sort).replace("text-left", "text-right"),
        sort_header("Status", SortField::Status, sort),
        sort_header("Time", SortField::Date, sort),
        rows,
        render_pager(page)
    )
}

fn copy_field(label: &str, value: &str) -> String {
    format!(
        r#"<div class='py-2 border-b'>
            <p class='text-xs text-gray-500'>{}</p>
            <div class='flex items-center gap-2'>
                <span class='font-mono text-sm break-all'>{}</span>
                <button onclick='txCopy(this.dataset.copy)' data-copy='{}' class='text-xs px-2 py-0.5 border rounded hover:bg-gray-50'>Copy</button>
            </div>
        </div>"#,
        label,
        escape_html(value),
        escape_html(value)
    )
}

fn plain_field(label: &str, value: &str) -> String {
    format!(
        "<div class='py-2 border-b'><p class='text-xs text-gray-500'>{}</p><p class='text-sm'>{}</p></div>",
        label, value
    )
}

/// Details modal for one transaction
pub fn render_detail_modal(tx: &Tx, config: &Config) -> String {
    let currency = &config.display.currency;
    let gas_limit = tx.gas_limit.as_deref().unwrap_or("—");
    let gas_price = tx.gas_price.as_deref().unwrap_or("—");
    let fee = match (tx.gas_limit.as_deref(), tx.gas_price.as_deref()) {
        (Some(limit), Some(price)) => estimate_fee(limit, price).map(|fee| format!("{} {}", fee, currency)),
        _ => None,
    };
    let explorer_link = format!("{}{}", config.display.explorer_tx_url, urlencoding::encode(&tx.hash));

    format!(
        r#"<div id='detail-modal' class='fixed inset-0 bg-black bg-opacity-50 z-50 flex items-center justify-center'>
    <div class='bg-white rounded-xl shadow-2xl w-full max-w-2xl max-h-[90vh] overflow-hidden'>
        <div class='flex items-center justify-between px-6 py-4 border-b'>
            <h2 class='text-xl font-bold'>Transaction Details</h2>
            <button hx-delete='/transactions/detail' hx-target='#modal-root' class='text-gray-500 hover:text-gray-700 p-2'>✕</button>
        </div>
        <div class='p-6 overflow-y-auto max-h-[calc(90vh-140px)]'>
            {}{}{}{}{}{}{}{}{}
            <a href='{}' target='_blank' rel='noopener noreferrer' class='inline-block mt-4 text-indigo-600 hover:underline'>View on Explorer ↗</a>
        </div>
    </div>
</div>"#,
        copy_field("Hash", &tx.hash),
        plain_field("Status", &status_badge(&tx.status)),
        copy_field("From", &tx.from),
        copy_field("To", &tx.to),
        plain_field("Amount", &escape_html(&format_amount(&tx.amount.to_string(), currency))),
        plain_field(
            "Time",
            &format!(
                "{} <span class='text-gray-400'>({})</span>",
                escape_html(&format_full(&tx.timestamp)),
                escape_html(&format_relative(&tx.timestamp, Utc::now()))
            )
        ),
        plain_field("Gas Limit", &escape_html(gas_limit)),
        plain_field("Gas Price", &escape_html(gas_price)),
        plain_field("Estimated Fee", &escape_html(fee.as_deref().unwrap_or("—"))),
        escape_html(&explorer_link)
    )
}

/// Fee line under the create form
pub fn render_fee_estimate(form: &CreateTxForm, currency: &str) -> String {
    let (limit, price) = form.gas_or_defaults();
    let fee = estimate_fee(&limit, &price)
        .map(|fee| format!("{} {}", fee, currency))
        .unwrap_or_else(|| "—".to_string());
    format!(
        "<span id='fee-estimate' class='text-sm text-gray-600'>Estimated fee: {}</span>",
        escape_html(&fee)
    )
}

fn form_input(name: &str, label: &str, value: &str, placeholder: &str, errors: &[FieldError]) -> String {
    let error = errors
        .iter()
        .find(|e| e.field == name)
        .map(|e| format!("<p class='text-xs text-red-600 mt-1'>{}</p>", escape_html(&e.message)))
        .unwrap_or_default();
    let border = if error.is_empty() { "border-gray-300" } else { "border-red-500" };
    format!(
        r#"<div>
            <label class='block text-sm font-medium text-gray-700 mb-1'>{}</label>
            <input name='{}' value='{}' placeholder='{}' autocomplete='off'
                class='w-full px-3 py-2 border rounded-lg {}'
                hx-post='/transactions/draft' hx-trigger='input changed delay:400ms' hx-include='#create-form' hx-target='#fee-estimate' hx-swap='outerHTML'>
            {}
        </div>"#,
        label,
        name,
        escape_html(value),
        placeholder,
        border,
        error
    )
}

/// Create modal. `errors` are shown under their fields.
pub fn render_create_modal(form: &CreateTxForm, errors: &[FieldError], currency: &str) -> String {
    format!(
        r#"<div id='create-modal' class='fixed inset-0 bg-black bg-opacity-50 z-50 flex items-center justify-center' onclick='if(event.target.id === "create-modal") closeModal("create-modal")'>
    <div class='bg-white rounded-xl shadow-2xl w-full max-w-xl max-h-[90vh] overflow-hidden' onclick='event.stopPropagation()'>
        <div class='flex items-center justify-between px-6 py-4 border-b'>
            <h2 class='text-xl font-bold'>New Transaction</h2>
            <button onclick='closeModal("create-modal")' class='text-gray-500 hover:text-gray-700 p-2'>✕</button>
        </div>
        <form id='create-form' class='p-6 space-y-4' hx-post='/transactions' hx-target='#create-modal' hx-swap='outerHTML'>
            {}{}
            <div class='grid grid-cols-2 gap-4'>{}{}</div>
            {}
            <div class='flex items-center justify-end gap-2 pt-2'>
                <button type='button' hx-delete='/transactions/draft' hx-target='#create-modal' hx-swap='outerHTML' class='px-4 py-2 text-gray-600 border rounded-lg hover:bg-gray-50'>Clear Draft</button>
                <button type='button' onclick='closeModal("create-modal")' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</button>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Submit</button>
            </div>
        </form>
    </div>
</div>"#,
        form_input("toAddress", "To Address", &form.to_address, "0x…", errors),
        form_input("amount", &format!("Amount ({})", escape_html(currency)), &form.amount, "0.0", errors),
        form_input("gasLimit", "Gas Limit", &form.gas_limit, txscope_core::models::DEFAULT_GAS_LIMIT, errors),
        form_input("gasPrice", "Gas Price", &form.gas_price, txscope_core::models::DEFAULT_GAS_PRICE, errors),
        render_fee_estimate(form, currency)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use txscope_core::Amount;

    fn tx(id: &str) -> Tx {
        Tx {
            id: id.to_string(),
            hash: "0xabcdef1234567890abcdef".to_string(),
            from: "0x1111111111111111111111111111111111111111".to_string(),
            to: "0x2222222222222222222222222222222222222222".to_string(),
            amount: Amount::Text("1.25".to_string()),
            status: TxStatus::Confirmed,
            timestamp: "2024-03-01T10:00:00.000Z".to_string(),
            gas_limit: Some("21000".to_string()),
            gas_price: Some("0.00000002".to_string()),
            optimistic: false,
        }
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 0), Vec::<usize>::new());
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 20), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(page_window(10, 20), vec![7, 8, 9, 10, 11, 12, 13]);
        assert_eq!(page_window(20, 20), vec![14, 15, 16, 17, 18, 19, 20]);
    }

    #[test]
    fn test_pager_bounds() {
        let page = Page {
            items: vec![tx("a")],
            page: 1,
            page_count: 3,
            total: 23,
            start: 1,
            end: 10,
        };
        let html = render_pager(&page);
        assert!(html.contains("Showing 1-10 of 23"));
        assert!(html.contains("<span class='px-3 py-1 text-gray-300 border rounded'>Previous</span>"));
        assert!(html.contains("hx-post='/transactions/page/2'"));
    }

    #[test]
    fn test_sort_indicator_on_active_column() {
        let sort = Sort {
            field: SortField::Amount,
            dir: SortDir::Asc,
        };
        assert!(sort_header("Amount", SortField::Amount, sort).contains("Amount ▲"));
        assert!(!sort_header("Status", SortField::Status, sort).contains('▲'));
    }

    #[test]
    fn test_detail_modal_contents() {
        let config = Config::default();
        let html = render_detail_modal(&tx("a"), &config);
        assert!(html.contains("data-copy='0xabcdef1234567890abcdef'"));
        assert!(html.contains("1.25 ETH"));
        assert!(html.contains("0.00042 ETH"));
        assert!(html.contains(&format!("{}0xabcdef1234567890abcdef", config.display.explorer_tx_url)));
    }

    #[test]
    fn test_create_modal_shows_field_errors() {
        let form = CreateTxForm {
            to_address: "0x12".to_string(),
            ..CreateTxForm::default()
        };
        let errors = form.validate().unwrap_err();
        let html = render_create_modal(&form, &errors, "ETH");
        assert!(html.contains("Enter a valid Ethereum address"));
        assert!(html.contains("Amount must be a positive number"));
        assert!(html.contains("value='0x12'"));
        assert!(html.contains("Estimated fee: 0.00042 ETH"));
    }

    #[test]
    fn test_row_copy_hash_does_not_open_details() {
        let html = render_row(&tx("a"), "ETH");
        assert!(html.contains("hx-get='/transactions/a/detail'"));
        assert!(html.contains("onclick='event.stopPropagation(); txCopy(this.dataset.copy)' data-copy='0xabcdef1234567890abcdef'"));
        assert!(html.contains("Copy hash"));

        let no_hash = Tx {
            hash: String::new(),
            ..tx("b")
        };
        assert!(!render_row(&no_hash, "ETH").contains("Copy hash"));
    }

    #[test]
    fn test_submitting_marker_only_while_pending() {
        let placeholder = Tx {
            optimistic: true,
            status: TxStatus::Pending,
            ..tx("temp_1")
        };
        let html = render_row(&placeholder, "ETH");
        assert!(html.contains("submitting"));
        assert!(html.contains("opacity-60"));

        let failed = Tx {
            status: TxStatus::Failed,
            ..placeholder
        };
        let html = render_row(&failed, "ETH");
        assert!(!html.contains("submitting"));
        assert!(!html.contains("opacity-60"));
        assert!(html.contains("failed"));
    }

    #[test]
    fn test_active_filter_count() {
        let mut view = ViewState::new(10);
        assert_eq!(active_filter_count(&view), 0);
        view.filters.status = StatusFilter::parse("failed");
        view.filters.range.to = chrono::NaiveDate::from_ymd_opt(2024, 3, 2);
        assert_eq!(active_filter_count(&view), 2);
        view.filters.range.from = chrono::NaiveDate::from_ymd_opt(2024, 3, 1);
        view.search = "0xab".to_string();
        assert_eq!(active_filter_count(&view), 4);
    }

    #[test]
    fn test_summary_cards() {
        let html = render_summary(12, 2, 5);
        let total = html.find("Total Transactions").unwrap();
        let active = html.find("Active Filters").unwrap();
        let filtered = html.find("Filtered Results").unwrap();
        assert!(total < active && active < filtered);
        assert!(html[total..active].contains("text-gray-900'>12</p>"));
        assert!(html[active..filtered].contains("text-indigo-600'>2</p>"));
        assert!(html[filtered..].contains("text-green-600'>5</p>"));
    }

    #[test]
    fn test_status_badge_other() {
        let html = status_badge(&TxStatus::Other("dropped".to_string()));
        assert!(html.contains("bg-gray-100"));
        assert!(html.contains("dropped"));
    }
}
