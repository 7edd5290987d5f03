//! Client for the remote transactions API
//!
//! Implements [`TransactionSource`] over HTTP. Responses come in several
//! envelope shapes (`[...]`, `{data: ...}`, `{stats: ...}`); they are
//! unwrapped here so the explorer only ever sees payloads.

pub mod error;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use txscope_config::ApiConfig;
use txscope_core::{CoreError, CoreResult, CreateTxRequest, RawTx, Stats, TransactionSource};

pub use error::{ClientError, ClientResult};

/// `[...]` or `{data: [...]}`
pub fn unwrap_list(body: Value) -> Result<Vec<Value>, String> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err("expected an array or {data: array}".to_string()),
        },
        other => Err(format!("expected an array, got {}", json_kind(&other))),
    }
}

/// An object, `{data: object}`, or the first element of an array
pub fn unwrap_record(body: Value) -> Result<Value, String> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => Ok(inner),
            Some(Value::Array(items)) => first_record(items),
            Some(other) => {
                map.insert("data".to_string(), other);
                Ok(Value::Object(map))
            }
            None => Ok(Value::Object(map)),
        },
        Value::Array(items) => first_record(items),
        other => Err(format!("expected an object, got {}", json_kind(&other))),
    }
}

fn first_record(items: Vec<Value>) -> Result<Value, String> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| "expected a record, got an empty array".to_string())
}

/// The stats object itself, `{data: object}` or `{stats: object}`
pub fn unwrap_stats(body: Value) -> Result<Stats, String> {
    let inner = match body {
        Value::Object(mut map) => match (map.remove("data"), map.remove("stats")) {
            (Some(inner @ Value::Object(_)), _) => inner,
            (_, Some(inner @ Value::Object(_))) => inner,
            (data, stats) => {
                if let Some(data) = data {
                    map.insert("data".to_string(), data);
                }
                if let Some(stats) = stats {
                    map.insert("stats".to_string(), stats);
                }
                Value::Object(map)
            }
        },
        other => return Err(format!("expected an object, got {}", json_kind(&other))),
    };
    serde_json::from_value(inner).map_err(|e| e.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// HTTP implementation of the transactions API
#[derive(Debug, Clone)]
pub struct HttpTransactionSource {
    http: reqwest::Client,
    root: String,
}

impl HttpTransactionSource {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Builder)?;
        Ok(Self {
            http,
            root: config.endpoint_root(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }

    async fn read_json(&self, url: &str, response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.json::<Value>().await.map_err(|e| ClientError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> ClientResult<Value> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        self.read_json(url, response).await
    }

    fn malformed(url: &str, message: String) -> CoreError {
        ClientError::Malformed {
            url: url.to_string(),
            message,
        }
        .into()
    }
}

#[async_trait]
impl TransactionSource for HttpTransactionSource {
    async fn list_transactions(&self) -> CoreResult<Vec<RawTx>> {
        let url = self.url("transactions");
        let body = self.get_json(&url).await?;
        unwrap_list(body).map_err(|message| Self::malformed(&url, message))
    }

    async fn get_transaction(&self, id: &str) -> CoreResult<RawTx> {
        let url = self.url(&format!("transactions/{}", urlencoding::encode(id)));
        let body = match self.get_json(&url).await {
            Ok(body) => body,
            Err(ClientError::Status { status: 404, .. }) => {
                return Err(CoreError::TransactionNotFound { id: id.to_string() })
            }
            Err(e) => return Err(e.into()),
        };
        unwrap_record(body).map_err(|message| Self::malformed(&url, message))
    }

    async fn create_transaction(&self, request: &CreateTxRequest) -> CoreResult<RawTx> {
        let url = self.url("transactions");
        log::debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(ClientError::from)?;
        let body = self.read_json(&url, response).await?;
        unwrap_record(body).map_err(|message| Self::malformed(&url, message))
    }

    async fn stats(&self) -> CoreResult<Stats> {
        let url = self.url("stats");
        let body = self.get_json(&url).await?;
        unwrap_stats(body).map_err(|message| Self::malformed(&url, message))
    }
}
