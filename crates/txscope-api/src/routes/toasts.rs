//! Notification area
//!
//! The browser polls `/toasts` and reports clipboard outcomes back through
//! `/toasts/copy`, since only the page can touch the clipboard.

use crate::AppState;
use axum::extract::{Form, Path};
use std::collections::HashMap;
use txscope_core::{Toast, ToastVariant};
use txscope_utils::escape_html;

pub fn render_toasts(toasts: &[Toast]) -> String {
    let mut html = String::new();
    for toast in toasts {
        let (bg, icon) = match toast.variant {
            ToastVariant::Success => ("bg-green-600", "✓"),
            ToastVariant::Error => ("bg-red-600", "✕"),
        };
        html.push_str(&format!(
            r#"<div class='toast flex items-center gap-2 px-4 py-3 rounded-lg shadow-lg text-white {}' role='status'>
                <span>{}</span><span class='flex-1'>{}</span>
                <button class='opacity-75 hover:opacity-100' hx-delete='/toasts/{}' hx-target='#toast-area'>×</button>
            </div>"#,
            bg,
            icon,
            escape_html(&toast.message),
            toast.id
        ));
    }
    html
}

/// HTMX: Current toasts
pub async fn htmx_toasts(state: axum::extract::State<AppState>) -> axum::response::Html<String> {
    axum::response::Html(render_toasts(&state.explorer.toasts()))
}

/// HTMX: Clipboard write outcome reported by the page
pub async fn htmx_copy_result(
    state: axum::extract::State<AppState>,
    form: Form<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let ok = form.get("ok").map(|v| v == "true").unwrap_or(false);
    state.explorer.record_copy(ok);
    axum::response::Html(render_toasts(&state.explorer.toasts()))
}

/// HTMX: Dismiss one toast
pub async fn htmx_toast_dismiss(
    state: axum::extract::State<AppState>,
    path: Path<u64>,
) -> axum::response::Html<String> {
    state.explorer.dismiss_toast(path.0);
    axum::response::Html(render_toasts(&state.explorer.toasts()))
}
