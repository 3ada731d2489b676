use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::warn;

use crate::{AppState, blocking};

/// Store connectivity probe: 200 when a trivial query answers, 503 when it
/// does not. Never exposes the underlying error to the client.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db = state.clone();
    match blocking(move || db.db.ping()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "message": "CrecheApp online" })),
        ),
        Err(err) => {
            warn!("health probe failed: {err:#}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": "Banco de dados não conectado" })),
            )
        }
    }
}
