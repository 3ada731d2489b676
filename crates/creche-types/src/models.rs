use serde::{Deserialize, Serialize};

/// Which kind of account a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Aluno,
    Docente,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aluno {
    pub id: i64,
    pub nome: String,
    pub matricula: String,
    pub avatar: Option<String>,
    pub turma_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Docente {
    pub id: i64,
    pub nome: String,
    pub identificador: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Turma {
    pub id: i64,
    pub nome: String,
    pub ano: String,
    pub foto: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registro {
    pub id: i64,
    pub aluno_id: i64,
    pub turma_id: i64,
    pub data: chrono::NaiveDate,
    pub alimentacao: Option<String>,
    pub comportamento: Option<String>,
    pub presenca: String,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarioEvento {
    pub id: i64,
    pub docente_id: Option<i64>,
    pub data: chrono::NaiveDate,
    pub titulo: String,
    pub cor: String,
}
