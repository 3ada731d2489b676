pub mod alunos;
pub mod auth;
pub mod error;
pub mod eventos;
pub mod health;
pub mod middleware;
pub mod registros;
pub mod turmas;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use creche_db::Database;
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// The single consolidated route set. Deployment differences live entirely
/// in the configuration resolved by the server binary, never in the routes.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/register/aluno", post(auth::register_aluno))
        .route("/register/docente", post(auth::register_docente))
        .route("/login/aluno", post(auth::login_aluno))
        .route("/login/docente", post(auth::login_docente))
        .route("/api/health", get(health::health))
        // Creation checks the bearer token in the handler itself, so the
        // same path can stay in one router with a public GET.
        .route(
            "/api/events",
            get(eventos::list_eventos).post(eventos::create_evento),
        )
        .with_state(state.clone());

    let protected = Router::new()
        .route("/turmas", get(turmas::list_turmas))
        .route("/turmas", post(turmas::create_turma))
        .route("/turmas/{id}", put(turmas::update_turma))
        .route("/turmas/{id}", delete(turmas::delete_turma))
        .route("/turmas/{id}/alunos", get(turmas::list_alunos_da_turma))
        .route("/turmas/{id}/alunos", post(turmas::add_aluno))
        .route(
            "/turmas/{turma_id}/alunos/{aluno_id}",
            delete(turmas::remove_aluno),
        )
        .route("/alunos", get(alunos::list_alunos))
        .route("/registros", post(registros::create_registro))
        .route("/registros/{aluno_id}", get(registros::list_registros))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public).merge(protected).fallback(not_found)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Rota não encontrada".to_string())
}

/// Runs blocking rusqlite work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(e) => Err(anyhow::anyhow!("blocking task join error: {e}")),
    }
}

/// SQLite hands dates back as ISO-8601 text; a corrupt value is logged and
/// replaced rather than failing the whole listing.
pub(crate) fn parse_stored_date(s: &str) -> chrono::NaiveDate {
    s.parse::<chrono::NaiveDate>().unwrap_or_else(|e| {
        warn!("Corrupt stored date '{}': {}", s, e);
        chrono::NaiveDate::default()
    })
}
