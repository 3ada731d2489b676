use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use creche_types::api::{CreatedResponse, RegistroRequest};
use creche_types::models::Registro;

use crate::error::{ApiError, conflict_or_internal};
use crate::{AppState, blocking, parse_stored_date};

const REQUIRED_MSG: &str = "Campos aluno_id, turma_id e data são obrigatórios";

pub async fn create_registro(
    State(state): State<AppState>,
    Json(req): Json<RegistroRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let aluno_id = req
        .aluno_id
        .ok_or_else(|| ApiError::Validation(REQUIRED_MSG.to_string()))?;
    let turma_id = req
        .turma_id
        .ok_or_else(|| ApiError::Validation(REQUIRED_MSG.to_string()))?;
    let data = req
        .data
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(REQUIRED_MSG.to_string()))?
        .parse::<chrono::NaiveDate>()
        .map_err(|_| ApiError::Validation("Data inválida, use o formato AAAA-MM-DD".to_string()))?;

    let db = state.clone();
    if !blocking(move || db.db.aluno_exists_by_id(aluno_id)).await? {
        return Err(ApiError::NotFound("Aluno não encontrado".to_string()));
    }
    let db = state.clone();
    if !blocking(move || db.db.turma_exists(turma_id)).await? {
        return Err(ApiError::NotFound("Turma não encontrada".to_string()));
    }

    let db = state.clone();
    let id = blocking(move || {
        db.db.create_registro(
            aluno_id,
            turma_id,
            &data.to_string(),
            req.alimentacao.as_deref(),
            req.comportamento.as_deref(),
            req.presenca.as_deref(),
            req.observacoes.as_deref(),
        )
    })
    .await
    .map_err(|e| conflict_or_internal(e, "Já existe um registro deste aluno nesta data"))?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn list_registros(
    State(state): State<AppState>,
    Path(aluno_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    if !blocking(move || db.db.aluno_exists_by_id(aluno_id)).await? {
        return Err(ApiError::NotFound("Aluno não encontrado".to_string()));
    }

    let db = state.clone();
    let rows = blocking(move || db.db.list_registros_do_aluno(aluno_id)).await?;
    let registros: Vec<Registro> = rows
        .into_iter()
        .map(|row| Registro {
            id: row.id,
            aluno_id: row.aluno_id,
            turma_id: row.turma_id,
            data: parse_stored_date(&row.data),
            alimentacao: row.alimentacao,
            comportamento: row.comportamento,
            presenca: row.presenca,
            observacoes: row.observacoes,
        })
        .collect();
    Ok(Json(registros))
}
