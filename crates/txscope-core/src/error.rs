//! Error types for txscope-core
//!
//! Every failure the explorer can observe (remote API, local draft file,
//! form validation) is expressed as a `CoreError`, with a stable code and
//! operator-facing suggestions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Remote API unreachable or transport failure
    NetworkError,
    /// Remote API answered with a non-success status
    HttpStatus,
    /// Response body did not match any accepted envelope
    MalformedResponse,
    TransactionNotFound,
    ValidationError,
    ClipboardError,
    DraftError,
    ConfigError,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NetworkError => write!(f, "NETWORK_ERROR"),
            ErrorCode::HttpStatus => write!(f, "HTTP_STATUS"),
            ErrorCode::MalformedResponse => write!(f, "MALFORMED_RESPONSE"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::ClipboardError => write!(f, "CLIPBOARD_ERROR"),
            ErrorCode::DraftError => write!(f, "DRAFT_ERROR"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    /// Operation degraded, previous data still shown
    Warning,
    /// Operation failed
    Error,
    /// Process cannot continue
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for txscope-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request to {url} failed with status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Clipboard error: {message}")]
    Clipboard { message: String },

    #[error("Draft store error: {message}")]
    Draft { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Network { .. } => ErrorCode::NetworkError,
            CoreError::HttpStatus { .. } => ErrorCode::HttpStatus,
            CoreError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::Clipboard { .. } => ErrorCode::ClipboardError,
            CoreError::Draft { .. } => ErrorCode::DraftError,
            CoreError::Config { .. } => ErrorCode::ConfigError,
            CoreError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Network { .. } => ErrorSeverity::Error,
            CoreError::HttpStatus { .. } => ErrorSeverity::Error,
            CoreError::MalformedResponse { .. } => ErrorSeverity::Error,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::Validation { .. } => ErrorSeverity::Warning,
            CoreError::Clipboard { .. } => ErrorSeverity::Info,
            CoreError::Draft { .. } => ErrorSeverity::Warning,
            CoreError::Config { .. } => ErrorSeverity::Critical,
            CoreError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// HTTP status this error maps to when surfaced by the JSON API
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::TransactionNotFound { .. } => 404,
            CoreError::Validation { .. } => 422,
            CoreError::Network { .. }
            | CoreError::HttpStatus { .. }
            | CoreError::MalformedResponse { .. } => 502,
            _ => 500,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Network { .. } => {
                details = details.with_suggestion(
                    "Check that the remote API is running and api.base_url is correct.".to_string(),
                );
            }
            CoreError::HttpStatus { status, url } => {
                details = details.with_detail(serde_json::json!({ "status": status, "url": url }));
                if *status == 404 {
                    details = details.with_suggestion(
                        "Check api.path_prefix; the default is /api.".to_string(),
                    );
                }
            }
            CoreError::MalformedResponse { message } => {
                details = details.with_detail(serde_json::json!({ "reason": message }));
                details = details.with_suggestion(
                    "The API must answer with an array, an object, or a {data: ...} envelope."
                        .to_string(),
                );
            }
            CoreError::TransactionNotFound { .. } => {
                details = details.with_suggestion(
                    "The transaction may have been removed; refresh the list.".to_string(),
                );
            }
            CoreError::Validation { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::Draft { .. } => {
                details = details.with_suggestion(
                    "Check that drafts.path points at a writable location.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "txscope::error",
            "ERROR [{}] {} - Operation: {} - Context: {}",
            error.code(),
            error.to_details(),
            context.operation,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "txscope::error",
            "WARNING: {} - Operation: {} - Context: {}",
            message,
            context.operation,
            context.data
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "txscope::error",
            "DEBUG: {} - Operation: {}",
            message,
            context.operation
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NetworkError.to_string(), "NETWORK_ERROR");
        assert_eq!(ErrorCode::MalformedResponse.to_string(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn test_core_error_severity() {
        let error = CoreError::Network { message: "refused".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Error);

        let error = CoreError::Config { message: "bad".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_http_status_details() {
        let error = CoreError::HttpStatus {
            status: 404,
            url: "http://localhost:5000/transactions".to_string(),
        };
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::HttpStatus);
        assert!(details.details.is_some());
        assert!(details.suggestions.iter().any(|s| s.contains("path_prefix")));
        assert_eq!(error.status_code(), 502);
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("open_details")
            .with_data("id", serde_json::json!("tx-1"));
        assert_eq!(context.operation, "open_details");
        assert_eq!(context.data["id"], "tx-1");
    }
}
