use axum::extract::State;
use serde::Deserialize;

use crate::db::{ListStats, UsernameEntry};
use crate::error::ListsError;
use crate::handlers::parse_list_filter;
use crate::middleware::ApiQuery;
use crate::router::ListsState;
use crate::types::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub list_type: Option<String>,
}

/// GET /api/search?q=term[&list_type=]
pub async fn search_usernames(
    State(state): State<ListsState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<ApiResponse<Vec<UsernameEntry>>, ListsError> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ListsError::validation("Search query is required"))?;
    let filter = parse_list_filter(query.list_type.as_deref())?;
    let hits = state.store.search(term, filter).await?;
    Ok(ApiResponse::ok(hits))
}

/// GET /api/stats
pub async fn list_stats(
    State(state): State<ListsState>,
) -> Result<ApiResponse<ListStats>, ListsError> {
    Ok(ApiResponse::ok(state.store.stats().await?))
}
