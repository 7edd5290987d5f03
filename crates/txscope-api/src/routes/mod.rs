//! Route modules
//!
//! Page areas follow a consistent structure:
//! - mod.rs: Module exports
//! - api.rs: JSON API endpoints and HTMX partials
//! - page.rs: Full page rendering

pub mod dashboard;
pub mod toasts;
pub mod transactions;
