use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KrishiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Recommendation service unavailable: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Serialize for KrishiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type KrishiResult<T> = Result<T, KrishiError>;

impl KrishiError {
    pub fn status(&self) -> StatusCode {
        match self {
            KrishiError::NotFound(_) => StatusCode::NOT_FOUND,
            KrishiError::Validation(_) => StatusCode::BAD_REQUEST,
            KrishiError::Auth(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for KrishiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            KrishiError::NotFound(msg) | KrishiError::Validation(msg) | KrishiError::Auth(msg) => {
                msg.clone()
            }
            KrishiError::Upstream(msg) => {
                tracing::error!("Upstream Error: {}", msg);
                self.to_string()
            }
            KrishiError::Database(e) => {
                tracing::error!("Database Error: {:?}", e);
                "Failed to save or load records".to_string()
            }
            KrishiError::Internal(msg) => {
                tracing::error!("Internal Error: {}", msg);
                "Internal server error".to_string()
            }
            other => {
                tracing::error!("Unhandled Error: {:?}", other);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
