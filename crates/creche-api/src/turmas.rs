use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use creche_types::api::{AddAlunoRequest, TurmaCreated, TurmaRequest};
use creche_types::models::{Aluno, Turma};

use crate::alunos::to_aluno;
use crate::error::{ApiError, conflict_or_internal};
use crate::{AppState, blocking};

const REQUIRED_MSG: &str = "Nome e ano são obrigatórios";

fn required(value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::Validation(REQUIRED_MSG.to_string())),
    }
}

pub async fn list_turmas(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_turmas()).await?;
    let turmas: Vec<Turma> = rows
        .into_iter()
        .map(|row| Turma {
            id: row.id,
            nome: row.nome,
            ano: row.ano,
            foto: row.foto,
        })
        .collect();
    Ok(Json(turmas))
}

pub async fn create_turma(
    State(state): State<AppState>,
    Json(req): Json<TurmaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nome = required(req.nome)?;
    let ano = required(req.ano)?;

    let db = state.clone();
    let (nome_ins, ano_ins) = (nome.clone(), ano.clone());
    let id = blocking(move || db.db.create_turma(&nome_ins, &ano_ins)).await?;

    Ok((StatusCode::CREATED, Json(TurmaCreated { id, nome, ano })))
}

pub async fn update_turma(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TurmaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nome = required(req.nome)?;
    let ano = required(req.ano)?;
    let foto = req.foto;

    let db = state.clone();
    let n = blocking(move || db.db.update_turma(id, &nome, &ano, foto.as_deref())).await?;
    if n == 0 {
        return Err(ApiError::NotFound("Turma não encontrada".to_string()));
    }

    Ok(Json(json!({ "message": "Turma atualizada com sucesso" })))
}

pub async fn delete_turma(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let n = blocking(move || db.db.delete_turma(id)).await?;
    if n == 0 {
        return Err(ApiError::NotFound("Turma não encontrada".to_string()));
    }

    Ok(Json(json!({ "message": "Turma excluída com sucesso" })))
}

pub async fn list_alunos_da_turma(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    if !blocking(move || db.db.turma_exists(id)).await? {
        return Err(ApiError::NotFound("Turma não encontrada".to_string()));
    }

    let db = state.clone();
    let rows = blocking(move || db.db.list_alunos_da_turma(id)).await?;
    let alunos: Vec<Aluno> = rows.into_iter().map(to_aluno).collect();
    Ok(Json(alunos))
}

pub async fn add_aluno(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AddAlunoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let aluno_id = req
        .aluno_id
        .ok_or_else(|| ApiError::Validation("Campo aluno_id é obrigatório".to_string()))?;

    let db = state.clone();
    if !blocking(move || db.db.turma_exists(id)).await? {
        return Err(ApiError::NotFound("Turma não encontrada".to_string()));
    }
    let db = state.clone();
    if !blocking(move || db.db.aluno_exists_by_id(aluno_id)).await? {
        return Err(ApiError::NotFound("Aluno não encontrado".to_string()));
    }

    let db = state.clone();
    blocking(move || db.db.add_aluno_to_turma(id, aluno_id))
        .await
        .map_err(|e| conflict_or_internal(e, "Aluno já está na turma"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Aluno adicionado à turma" })),
    ))
}

pub async fn remove_aluno(
    State(state): State<AppState>,
    Path((turma_id, aluno_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let n = blocking(move || db.db.remove_aluno_from_turma(turma_id, aluno_id)).await?;
    if n == 0 {
        return Err(ApiError::NotFound("Aluno não está na turma".to_string()));
    }

    Ok(Json(json!({ "message": "Aluno removido da turma" })))
}
