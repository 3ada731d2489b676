/// Row types returned by the query layer, one-to-one with SQLite rows.
/// Kept separate from the creche-types API models so the DB layer stays
/// independent; dates come back as ISO-8601 strings.

pub struct AlunoRow {
    pub id: i64,
    pub nome: String,
    pub cpf: String,
    pub matricula: String,
    pub avatar: Option<String>,
    pub turma_id: Option<i64>,
}

pub struct DocenteRow {
    pub id: i64,
    pub nome: String,
    pub identificador: String,
    pub senha_hash: String,
    pub email: Option<String>,
}

pub struct TurmaRow {
    pub id: i64,
    pub nome: String,
    pub ano: String,
    pub foto: Option<String>,
}

pub struct RegistroRow {
    pub id: i64,
    pub aluno_id: i64,
    pub turma_id: i64,
    pub data: String,
    pub alimentacao: Option<String>,
    pub comportamento: Option<String>,
    pub presenca: String,
    pub observacoes: Option<String>,
}

pub struct EventoRow {
    pub id: i64,
    pub docente_id: Option<i64>,
    pub data: String,
    pub titulo: String,
    pub cor: String,
}
