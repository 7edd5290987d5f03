//! Dashboard page rendering

use crate::{page_response, AppState};
use serde_json::Value;
use txscope_core::Stats;
use txscope_utils::{escape_html, format_amount, format_number};

const PLACEHOLDER: &str = "—";

/// Numbers and numeric strings render as-is, anything else is missing
fn stat_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn card(label: &str, value: Option<String>, color: &str) -> String {
    format!(
        "<div class='bg-{c}-50 p-4 rounded-lg border border-{c}-200'><p class='text-sm text-{c}-600'>{}</p><p class='text-2xl font-bold text-{c}-700'>{}</p></div>",
        label,
        escape_html(&value.unwrap_or_else(|| PLACEHOLDER.to_string())),
        c = color
    )
}

/// Stats cards, one per optional stat
pub fn render_stats(stats: &Stats, currency: &str) -> String {
    let total = stat_text(stats.total_transactions.as_ref()).map(format_number);
    let volume = stat_text(stats.total_volume.as_ref()).map(|v| format_amount(&v, currency));
    let rate = stat_text(stats.success_rate.as_ref()).map(|v| format!("{}%", v));
    let average = stat_text(stats.average_amount.as_ref()).map(|v| format_amount(&v, currency));
    let pending = stat_text(stats.pending_count.as_ref()).map(format_number);
    let confirmed = stat_text(stats.confirmed_count.as_ref()).map(format_number);
    let failed = stat_text(stats.failed_count.as_ref()).map(format_number);

    format!(
        r#"<div id='stats-cards' class='space-y-4'>
            <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4'>{}{}{}{}</div>
            <div class='grid grid-cols-1 md:grid-cols-3 gap-4'>{}{}{}</div>
        </div>"#,
        card("Total Transactions", total, "indigo"),
        card("Total Volume", volume, "blue"),
        card("Success Rate", rate, "green"),
        card("Average Amount", average, "purple"),
        card("Pending", pending, "yellow"),
        card("Confirmed", confirmed, "green"),
        card("Failed", failed, "red"),
    )
}

/// Dashboard page
pub async fn page_dashboard(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    uri: axum::http::Uri,
) -> axum::response::Html<String> {
    // failures are logged by the explorer; the cards fall back to placeholders
    let stats = state.explorer.stats().await.unwrap_or_default();

    let inner_content = format!(
        r#"<div class='mb-6 flex items-center justify-between'>
            <h2 class='text-2xl font-bold'>Dashboard</h2>
            <a href='/transactions' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>View transactions</a>
        </div>
        {}"#,
        render_stats(&stats, &state.config.display.currency)
    );

    axum::response::Html(page_response(&headers, "Dashboard", uri.path(), &inner_content))
}
