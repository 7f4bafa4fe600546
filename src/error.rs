use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum ListsError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl ListsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ListsError::Validation(msg.into())
    }

    /// Unique-constraint violations become `Conflict`; anything else stays a database error.
    pub fn from_write(err: SqlxError, conflict_msg: &str) -> Self {
        match &err {
            SqlxError::Database(db_err) if db_err.is_unique_violation() => {
                ListsError::Conflict(conflict_msg.to_string())
            }
            _ => ListsError::DatabaseError(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ListsError::Validation(_) => StatusCode::BAD_REQUEST,
            ListsError::Conflict(_) => StatusCode::CONFLICT,
            ListsError::NotFound(_) => StatusCode::NOT_FOUND,
            ListsError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ListsError::DatabaseError(_)
            | ListsError::ConfigError(_)
            | ListsError::InvalidConfig(_)
            | ListsError::Io(_)
            | ListsError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<figment::Error> for ListsError {
    fn from(e: figment::Error) -> Self {
        ListsError::ConfigError(Box::new(e))
    }
}

impl IntoResponse for ListsError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (
            status,
            Json(ApiErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

/// Failure half of the response envelope.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ListsError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (status, serde_json::from_slice(&bytes).expect("body should be json"))
    }

    #[tokio::test]
    async fn validation_is_400_with_message() {
        let (status, body) = body_of(ListsError::validation("username is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "username is required");
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let (status, _) = body_of(ListsError::Conflict("exists".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn database_details_are_not_leaked() {
        let (status, body) = body_of(ListsError::DatabaseError(SqlxError::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
