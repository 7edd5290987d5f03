//! Error types for txscope-client

use thiserror::Error;
use txscope_core::CoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Builder(reqwest::Error),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("Malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for CoreError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Builder(e) => CoreError::Config {
                message: e.to_string(),
            },
            ClientError::Transport(e) => {
                let message = if e.is_timeout() {
                    format!("request timed out: {}", e)
                } else {
                    e.to_string()
                };
                CoreError::Network { message }
            }
            ClientError::Status { status, url } => CoreError::HttpStatus { status, url },
            ClientError::Malformed { url, message } => CoreError::MalformedResponse {
                message: format!("{}: {}", url, message),
            },
        }
    }
}
