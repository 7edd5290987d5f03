//! Dashboard API endpoints

use crate::{AppState, ApiResult};
use axum::Json;
use txscope_core::Stats;

/// Aggregate statistics from the remote API (JSON API)
pub async fn api_stats(state: axum::extract::State<AppState>) -> ApiResult<Json<Stats>> {
    let stats = state.explorer.stats().await?;
    Ok(Json(stats))
}
