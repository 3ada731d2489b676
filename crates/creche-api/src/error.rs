use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Handler-level error taxonomy. Every variant maps to a status plus a
/// user-facing message; internal detail stays in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("credenciais inválidas")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m),
            // One generic message for every authentication failure, so the
            // response never reveals which credential was wrong.
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Credenciais inválidas".to_string())
            }
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Internal(err) => {
                error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro interno do servidor".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Maps a storage error to 409 when it is a unique-key violation (the
/// constraint is the real duplicate guard under concurrent requests),
/// everything else to 500.
pub(crate) fn conflict_or_internal(err: anyhow::Error, message: &str) -> ApiError {
    if creche_db::is_unique_violation(&err) {
        ApiError::Conflict(message.to_string())
    } else {
        ApiError::Internal(err)
    }
}
