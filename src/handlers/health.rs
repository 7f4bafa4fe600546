use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ListsError;
use crate::router::ListsState;
use crate::types::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub backend: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/health -> 200 once the store answers a trivial query.
pub async fn health(State(state): State<ListsState>) -> Result<ApiResponse<HealthStatus>, ListsError> {
    state.store.ping().await?;
    Ok(ApiResponse::ok(HealthStatus {
        status: "ok",
        backend: state.store.backend(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    }))
}
