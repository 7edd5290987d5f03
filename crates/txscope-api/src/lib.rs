//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::dashboard: Stats cards and the stats JSON endpoint
//! - routes::transactions: Transaction table, filters, details, create, export
//! - routes::toasts: Notification area and clipboard reports

pub mod error;
pub mod routes;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use txscope_config::Config;
use txscope_core::Explorer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub explorer: Explorer,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{api_stats, page_dashboard};
    use routes::toasts::{htmx_copy_result, htmx_toast_dismiss, htmx_toasts};
    use routes::transactions::{
        api_refresh, api_transaction_detail, api_transactions, htmx_draft_clear, htmx_draft_save,
        htmx_transaction_close, htmx_transaction_create_form, htmx_transaction_detail,
        htmx_transaction_store, htmx_transactions_clear_filters, htmx_transactions_export,
        htmx_transactions_filter, htmx_transactions_list, htmx_transactions_page,
        htmx_transactions_search, htmx_transactions_sort, page_transactions,
    };

    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/transactions", get(api_transactions))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/stats", get(api_stats))
        .route("/api/refresh", post(api_refresh))
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(api)
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        .route("/transactions", get(page_transactions).post(htmx_transaction_store))
        // HTMX partial routes
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/search", post(htmx_transactions_search))
        .route("/transactions/filters", post(htmx_transactions_filter))
        .route("/transactions/filters/clear", post(htmx_transactions_clear_filters))
        .route("/transactions/sort/:field", post(htmx_transactions_sort))
        .route("/transactions/page/:page", post(htmx_transactions_page))
        .route("/transactions/:id/detail", get(htmx_transaction_detail))
        .route("/transactions/detail", delete(htmx_transaction_close))
        .route("/transactions/create", get(htmx_transaction_create_form))
        .route("/transactions/draft", post(htmx_draft_save).delete(htmx_draft_clear))
        .route("/transactions/export", get(htmx_transactions_export))
        .route("/toasts", get(htmx_toasts))
        .route("/toasts/copy", post(htmx_copy_result))
        .route("/toasts/:id", delete(htmx_toast_dismiss))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - txscope</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
    <script>
    function txCopy(text) {{
        const report = function(ok) {{
            htmx.ajax('POST', '/toasts/copy', {{values: {{ok: ok}}, target: '#toast-area'}});
        }};
        if (!navigator.clipboard) {{ report('false'); return; }}
        navigator.clipboard.writeText(text).then(function() {{ report('true'); }}, function() {{ report('false'); }});
    }}
    function closeModal(id) {{
        const modal = document.getElementById(id);
        if (modal) {{ modal.remove(); }}
    }}
    document.addEventListener('keydown', function(e) {{
        if (e.key === 'Escape') {{ closeModal('create-modal'); closeModal('detail-modal'); }}
    }});
    </script>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id='toast-area' class='fixed bottom-4 right-4 z-50 space-y-2 w-80' hx-get='/toasts' hx-trigger='load, every 1s, txToast from:body'></div>
    <div id='modal-root'></div>
</body>
</html>"#,
        title, content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Dashboard", "dashboard"),
        ("/transactions", "Transactions", "transactions"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>txscope</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/" || current_path == "/dashboard"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "dashboard" => "📊",
            "transactions" => "📋",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(
            r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#,
            inner_content
        )
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Start the HTTP server
///
/// Serves until Ctrl-C, then cancels the explorer's background work.
pub async fn start_server(config: Config, explorer: Explorer) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        explorer: explorer.clone(),
        config,
    };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting txscope server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /transactions (Transaction explorer)");
    log::info!("  - /api/* (JSON API endpoints)");

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    explorer.shutdown();
    match &result {
        Ok(_) => log::info!("Server stopped gracefully"),
        Err(e) => log::error!("Server error: {}", e),
    }
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(state_with(Arc::new(StaticSource::default())));
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[test]
    fn test_page_response_full_and_partial() {
        let mut headers = axum::http::HeaderMap::new();
        let full = page_response(&headers, "Transactions", "/transactions", "<p>x</p>");
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains("Transactions - txscope"));
        assert!(full.contains("bg-indigo-50 text-indigo-600'>📋"));

        headers.insert("hx-request", "true".parse().unwrap());
        let partial = page_response(&headers, "Transactions", "/transactions", "<p>x</p>");
        assert!(!partial.contains("<!DOCTYPE html>"));
        assert!(partial.contains("<p>x</p>"));
    }
}
