use sqlx::sqlite::SqlitePool;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS registros (
        id            TEXT PRIMARY KEY,
        tipo          TEXT NOT NULL,
        dados         TEXT NOT NULL,
        versao        INTEGER NOT NULL DEFAULT 1,
        atualizado_em TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_registros_tipo ON registros (tipo)",
    // One live appointment or block per date and time.
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_agenda_horario
        ON registros (json_extract(dados, '$.data'), json_extract(dados, '$.hora'))
        WHERE tipo = 'Agendamento' AND json_extract(dados, '$.status') <> 'CANCELADO'",
];

/// Creates the record table. Safe to run on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("record schema ready");
    Ok(())
}

/// Checks that the record table exists.
pub async fn verify_schema(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    let found: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'registros'",
    )
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}
