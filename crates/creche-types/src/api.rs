use serde::{Deserialize, Serialize};

use crate::models::UserKind;

// -- JWT Claims --

/// Claims shared by the REST middleware and the token issuer. Canonical
/// definition lives here in creche-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub kind: UserKind,
    pub nome: String,
    /// Enrollment number, present on aluno tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matricula: Option<String>,
    pub exp: usize,
}

// -- Registration --

/// Fields arrive as options so a missing or blank field maps to a 400
/// with a readable message instead of a body-rejection error.
#[derive(Debug, Deserialize)]
pub struct RegisterAlunoRequest {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub matricula: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterDocenteRequest {
    pub nome: Option<String>,
    pub identificador: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub message: String,
}

// -- Login --

#[derive(Debug, Deserialize)]
pub struct LoginAlunoRequest {
    pub matricula: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginDocenteRequest {
    pub identificador: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: i64,
    pub nome: String,
    pub kind: UserKind,
}

// -- Turmas --

#[derive(Debug, Deserialize)]
pub struct TurmaRequest {
    pub nome: Option<String>,
    pub ano: Option<String>,
    pub foto: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TurmaCreated {
    pub id: i64,
    pub nome: String,
    pub ano: String,
}

#[derive(Debug, Deserialize)]
pub struct AddAlunoRequest {
    pub aluno_id: Option<i64>,
}

// -- Registros --

#[derive(Debug, Deserialize)]
pub struct RegistroRequest {
    pub aluno_id: Option<i64>,
    pub turma_id: Option<i64>,
    /// Kept as a string so a malformed date maps to a 400, not a
    /// body-rejection error.
    pub data: Option<String>,
    pub alimentacao: Option<String>,
    pub comportamento: Option<String>,
    pub presenca: Option<String>,
    pub observacoes: Option<String>,
}

// -- Calendário --

#[derive(Debug, Deserialize)]
pub struct EventoRequest {
    pub date: Option<String>,
    pub title: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}
