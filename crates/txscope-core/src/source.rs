//! Data-source abstraction for the remote transactions API

use async_trait::async_trait;
use std::sync::Arc;

use super::error::CoreResult;
use super::models::{CreateTxRequest, Stats};

/// An unnormalized record as delivered by the API, envelope already removed
pub type RawTx = serde_json::Value;

/// Remote transactions API. Implementations unwrap response envelopes,
/// so callers only ever see the payload.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn list_transactions(&self) -> CoreResult<Vec<RawTx>>;

    async fn get_transaction(&self, id: &str) -> CoreResult<RawTx>;

    async fn create_transaction(&self, request: &CreateTxRequest) -> CoreResult<RawTx>;

    async fn stats(&self) -> CoreResult<Stats>;
}

/// Shared handle used by the explorer and the HTTP layer
pub type SourceRef = Arc<dyn TransactionSource>;
