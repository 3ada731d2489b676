use axum::{Json, extract::State, response::IntoResponse};

use creche_db::models::AlunoRow;
use creche_types::models::Aluno;

use crate::error::ApiError;
use crate::{AppState, blocking};

pub(crate) fn to_aluno(row: AlunoRow) -> Aluno {
    Aluno {
        id: row.id,
        nome: row.nome,
        matricula: row.matricula,
        avatar: row.avatar,
        turma_id: row.turma_id,
    }
}

pub async fn list_alunos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_alunos()).await?;
    let alunos: Vec<Aluno> = rows.into_iter().map(to_aluno).collect();
    Ok(Json(alunos))
}
