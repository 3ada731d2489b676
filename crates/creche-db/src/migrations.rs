use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Applies pending migrations in order, tracked by the schema_version
/// table. Each step is idempotent from the version check; a failure on
/// first boot propagates and aborts startup.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        migrate_v1(conn).context("migration v1 failed")?;
    }

    info!("Database migrations complete");
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE alunos (
            id              INTEGER PRIMARY KEY,
            nome            TEXT NOT NULL,
            cpf             TEXT NOT NULL UNIQUE,
            matricula       TEXT NOT NULL UNIQUE,
            data_nascimento TEXT,
            avatar          TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_alunos_matricula ON alunos(matricula);
        CREATE INDEX idx_alunos_cpf ON alunos(cpf);

        CREATE TABLE docentes (
            id              INTEGER PRIMARY KEY,
            nome            TEXT NOT NULL,
            identificador   TEXT NOT NULL UNIQUE,
            senha_hash      TEXT NOT NULL,
            email           TEXT,
            avatar          TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE turmas (
            id              INTEGER PRIMARY KEY,
            nome            TEXT NOT NULL,
            ano             TEXT NOT NULL,
            foto            TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Join table rather than a turma_id column on alunos, so a future
        -- many-to-many enrollment does not need a schema rewrite.
        CREATE TABLE turma_alunos (
            id              INTEGER PRIMARY KEY,
            turma_id        INTEGER NOT NULL REFERENCES turmas(id),
            aluno_id        INTEGER NOT NULL REFERENCES alunos(id),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(turma_id, aluno_id)
        );

        CREATE TABLE registros (
            id              INTEGER PRIMARY KEY,
            aluno_id        INTEGER NOT NULL REFERENCES alunos(id),
            turma_id        INTEGER NOT NULL REFERENCES turmas(id),
            data            TEXT NOT NULL,
            alimentacao     TEXT,
            comportamento   TEXT,
            presenca        TEXT NOT NULL DEFAULT 'Presente',
            observacoes     TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(aluno_id, data)
        );

        CREATE INDEX idx_registros_aluno ON registros(aluno_id, data);

        CREATE TABLE calendario_eventos (
            id              INTEGER PRIMARY KEY,
            docente_id      INTEGER REFERENCES docentes(id),
            data            TEXT NOT NULL,
            titulo          TEXT NOT NULL,
            cor             TEXT NOT NULL DEFAULT 'blue',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(docente_id, data)
        );

        CREATE INDEX idx_eventos_data ON calendario_eventos(data);

        -- Announcement entities carried as schema only; no routes serve
        -- them yet.
        CREATE TABLE comunicados (
            id              INTEGER PRIMARY KEY,
            docente_id      INTEGER NOT NULL REFERENCES docentes(id),
            titulo          TEXT NOT NULL,
            assunto         TEXT NOT NULL,
            mensagem        TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE comunicado_destinatarios (
            id              INTEGER PRIMARY KEY,
            comunicado_id   INTEGER NOT NULL REFERENCES comunicados(id),
            tipo            TEXT NOT NULL CHECK (tipo IN ('aluno', 'docente', 'geral')),
            destinatario_id INTEGER,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE rascunhos (
            id              INTEGER PRIMARY KEY,
            docente_id      INTEGER NOT NULL REFERENCES docentes(id),
            titulo          TEXT,
            assunto         TEXT,
            mensagem        TEXT,
            saved_at        TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE termos_aceitos (
            id              INTEGER PRIMARY KEY,
            user_type       TEXT NOT NULL CHECK (user_type IN ('aluno', 'docente')),
            user_id         INTEGER NOT NULL,
            aceito          INTEGER NOT NULL DEFAULT 0,
            data_aceite     TEXT NOT NULL DEFAULT (datetime('now')),
            ip_address      TEXT,
            UNIQUE(user_type, user_id)
        );

        INSERT INTO schema_version (version) VALUES (1);
        ",
    )?;
    Ok(())
}
