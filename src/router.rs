use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::UsernameStore;
use crate::error::ListsError;
use crate::handlers::{health, search, usernames};

#[derive(Clone)]
pub struct ListsState {
    pub store: Arc<dyn UsernameStore>,
}

impl ListsState {
    pub fn new(store: Arc<dyn UsernameStore>) -> Self {
        Self { store }
    }
}

pub fn lists_router(state: ListsState) -> Router {
    let api = Router::new()
        .route(
            "/usernames",
            get(usernames::list_usernames).post(usernames::create_username),
        )
        .route("/usernames/bulk", post(usernames::bulk_import))
        .route("/usernames/list/{list_type}", delete(usernames::delete_list))
        .route(
            "/usernames/{id}",
            get(usernames::get_username)
                .put(usernames::update_username)
                .delete(usernames::delete_username),
        )
        .route("/search", get(search::search_usernames))
        .route("/stats", get(search::list_stats))
        .route("/health", get(health::health))
        .method_not_allowed_fallback(method_not_allowed);

    Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn route_not_found() -> ListsError {
    ListsError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> ListsError {
    ListsError::MethodNotAllowed
}
