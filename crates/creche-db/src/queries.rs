use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::models::{AlunoRow, DocenteRow, EventoRow, RegistroRow, TurmaRow};

impl Database {
    // -- Alunos --

    pub fn create_aluno(&self, nome: &str, cpf: &str, matricula: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO alunos (nome, cpf, matricula) VALUES (?1, ?2, ?3)",
                params![nome, cpf, matricula],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Duplicate pre-check on registration: a row matching either the
    /// matricula or the (normalized) cpf counts as already registered.
    pub fn aluno_exists(&self, matricula: &str, cpf: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let id: Option<i64> = conn
                .query_row(
                    "SELECT id FROM alunos WHERE matricula = ?1 OR cpf = ?2 LIMIT 1",
                    params![matricula, cpf],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id.is_some())
        })
    }

    pub fn aluno_exists_by_id(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT id FROM alunos WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Student login lookup: exact match on (matricula, cpf).
    pub fn find_aluno_by_credentials(&self, matricula: &str, cpf: &str) -> Result<Option<AlunoRow>> {
        self.with_conn(|conn| {
            query_aluno(
                conn,
                "WHERE a.matricula = ?1 AND a.cpf = ?2",
                params![matricula, cpf],
            )
        })
    }

    pub fn list_alunos(&self) -> Result<Vec<AlunoRow>> {
        self.with_conn(|conn| query_alunos(conn, "ORDER BY a.nome", []))
    }

    // -- Docentes --

    pub fn create_docente(&self, nome: &str, identificador: &str, senha_hash: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO docentes (nome, identificador, senha_hash) VALUES (?1, ?2, ?3)",
                params![nome, identificador, senha_hash],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn find_docente_by_identificador(&self, identificador: &str) -> Result<Option<DocenteRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, nome, identificador, senha_hash, email
                     FROM docentes WHERE identificador = ?1",
                    [identificador],
                    |row| {
                        Ok(DocenteRow {
                            id: row.get(0)?,
                            nome: row.get(1)?,
                            identificador: row.get(2)?,
                            senha_hash: row.get(3)?,
                            email: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Turmas --

    pub fn list_turmas(&self) -> Result<Vec<TurmaRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, nome, ano, foto FROM turmas ORDER BY nome")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(TurmaRow {
                        id: row.get(0)?,
                        nome: row.get(1)?,
                        ano: row.get(2)?,
                        foto: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_turma(&self, nome: &str, ano: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO turmas (nome, ano) VALUES (?1, ?2)",
                params![nome, ano],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Full-field update; the photo column is only touched when a value was
    /// submitted. Returns the number of rows affected.
    pub fn update_turma(
        &self,
        id: i64,
        nome: &str,
        ano: &str,
        foto: Option<&str>,
    ) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = match foto {
                Some(foto) => conn.execute(
                    "UPDATE turmas SET nome = ?1, ano = ?2, foto = ?3,
                            updated_at = datetime('now')
                     WHERE id = ?4",
                    params![nome, ano, foto, id],
                )?,
                None => conn.execute(
                    "UPDATE turmas SET nome = ?1, ano = ?2,
                            updated_at = datetime('now')
                     WHERE id = ?3",
                    params![nome, ano, id],
                )?,
            };
            Ok(n)
        })
    }

    /// Hard delete. Membership and record rows referencing the turma go
    /// first, otherwise their foreign keys reject the delete; the single
    /// writer connection keeps the statements from interleaving with
    /// other writes.
    pub fn delete_turma(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM turma_alunos WHERE turma_id = ?1", [id])?;
            conn.execute("DELETE FROM registros WHERE turma_id = ?1", [id])?;
            let n = conn.execute("DELETE FROM turmas WHERE id = ?1", [id])?;
            Ok(n)
        })
    }

    pub fn turma_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT id FROM turmas WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Matrículas por turma --

    pub fn add_aluno_to_turma(&self, turma_id: i64, aluno_id: i64) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO turma_alunos (turma_id, aluno_id) VALUES (?1, ?2)",
                params![turma_id, aluno_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn remove_aluno_from_turma(&self, turma_id: i64, aluno_id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "DELETE FROM turma_alunos WHERE turma_id = ?1 AND aluno_id = ?2",
                params![turma_id, aluno_id],
            )?;
            Ok(n)
        })
    }

    pub fn list_alunos_da_turma(&self, turma_id: i64) -> Result<Vec<AlunoRow>> {
        self.with_conn(|conn| {
            query_alunos(
                conn,
                "JOIN turma_alunos ta ON ta.aluno_id = a.id
                 WHERE ta.turma_id = ?1
                 ORDER BY a.nome",
                [turma_id],
            )
        })
    }

    // -- Registros diários --

    #[allow(clippy::too_many_arguments)]
    pub fn create_registro(
        &self,
        aluno_id: i64,
        turma_id: i64,
        data: &str,
        alimentacao: Option<&str>,
        comportamento: Option<&str>,
        presenca: Option<&str>,
        observacoes: Option<&str>,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO registros
                     (aluno_id, turma_id, data, alimentacao, comportamento, presenca, observacoes)
                 VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 'Presente'), ?7)",
                params![aluno_id, turma_id, data, alimentacao, comportamento, presenca, observacoes],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_registros_do_aluno(&self, aluno_id: i64) -> Result<Vec<RegistroRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, aluno_id, turma_id, data, alimentacao, comportamento,
                        presenca, observacoes
                 FROM registros WHERE aluno_id = ?1
                 ORDER BY data DESC",
            )?;
            let rows = stmt
                .query_map([aluno_id], |row| {
                    Ok(RegistroRow {
                        id: row.get(0)?,
                        aluno_id: row.get(1)?,
                        turma_id: row.get(2)?,
                        data: row.get(3)?,
                        alimentacao: row.get(4)?,
                        comportamento: row.get(5)?,
                        presenca: row.get(6)?,
                        observacoes: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Calendário --

    /// Events inside a closed ISO date interval, oldest first. Dates are
    /// stored as ISO-8601 text so BETWEEN compares correctly.
    pub fn list_eventos(
        &self,
        start: &str,
        end: &str,
        docente_id: Option<i64>,
    ) -> Result<Vec<EventoRow>> {
        self.with_conn(|conn| {
            let map = |row: &rusqlite::Row<'_>| {
                Ok(EventoRow {
                    id: row.get(0)?,
                    docente_id: row.get(1)?,
                    data: row.get(2)?,
                    titulo: row.get(3)?,
                    cor: row.get(4)?,
                })
            };
            let mut rows = Vec::new();
            match docente_id {
                Some(docente_id) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, docente_id, data, titulo, cor FROM calendario_eventos
                         WHERE data BETWEEN ?1 AND ?2 AND docente_id = ?3
                         ORDER BY data",
                    )?;
                    for row in stmt.query_map(params![start, end, docente_id], map)? {
                        rows.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, docente_id, data, titulo, cor FROM calendario_eventos
                         WHERE data BETWEEN ?1 AND ?2
                         ORDER BY data",
                    )?;
                    for row in stmt.query_map(params![start, end], map)? {
                        rows.push(row?);
                    }
                }
            }
            Ok(rows)
        })
    }

    pub fn create_evento(
        &self,
        docente_id: Option<i64>,
        data: &str,
        titulo: &str,
        cor: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO calendario_eventos (docente_id, data, titulo, cor)
                 VALUES (?1, ?2, ?3, ?4)",
                params![docente_id, data, titulo, cor],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    // -- Health --

    pub fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
    }
}

fn query_alunos<P: rusqlite::Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> Result<Vec<AlunoRow>> {
    let sql = format!(
        "SELECT a.id, a.nome, a.cpf, a.matricula, a.avatar,
                (SELECT ta.turma_id FROM turma_alunos ta
                 WHERE ta.aluno_id = a.id LIMIT 1) AS turma_id
         FROM alunos a {tail}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, map_aluno)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_aluno<P: rusqlite::Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> Result<Option<AlunoRow>> {
    let sql = format!(
        "SELECT a.id, a.nome, a.cpf, a.matricula, a.avatar,
                (SELECT ta.turma_id FROM turma_alunos ta
                 WHERE ta.aluno_id = a.id LIMIT 1) AS turma_id
         FROM alunos a {tail} LIMIT 1"
    );
    let row = conn.query_row(&sql, params, map_aluno).optional()?;
    Ok(row)
}

fn map_aluno(row: &rusqlite::Row<'_>) -> std::result::Result<AlunoRow, rusqlite::Error> {
    Ok(AlunoRow {
        id: row.get(0)?,
        nome: row.get(1)?,
        cpf: row.get(2)?,
        matricula: row.get(3)?,
        avatar: row.get(4)?,
        turma_id: row.get(5)?,
    })
}
