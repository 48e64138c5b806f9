use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Record families kept in the `registros` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Paciente,
    Agendamento,
    Evolucao,
    Laudo,
    Receita,
    Medicamento,
    Configuracao,
}

impl RecordKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paciente => "Paciente",
            Self::Agendamento => "Agendamento",
            Self::Evolucao => "Evolucao",
            Self::Laudo => "Laudo",
            Self::Receita => "Receita",
            Self::Medicamento => "Medicamento",
            Self::Configuracao => "Configuracao",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unique constraint violated: {0}")]
    Duplicate(String),
    #[error("stored record is not valid: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

fn write_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Duplicate(db.message().to_string())
        }
        _ => RepositoryError::Database(e),
    }
}

/// JSON document store over a single SQLite table.
///
/// Each record is kept whole in `dados`; `versao` goes up by one on every
/// write after the first.
pub struct RecordRepository {
    pool: SqlitePool,
}

impl RecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert<T: Serialize>(&self, kind: RecordKind, id: &str, record: &T) -> Result<()> {
        let dados = serde_json::to_string(record)?;
        sqlx::query(
            "INSERT INTO registros (id, tipo, dados, versao, atualizado_em)
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(dados)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        tracing::debug!(kind = kind.as_str(), id, "record inserted");
        Ok(())
    }

    /// Replaces an existing record. Returns `false` when nothing matched.
    pub async fn update<T: Serialize>(&self, kind: RecordKind, id: &str, record: &T) -> Result<bool> {
        let dados = serde_json::to_string(record)?;
        let result = sqlx::query(
            "UPDATE registros
             SET dados = ?, versao = versao + 1, atualizado_em = ?
             WHERE id = ? AND tipo = ?",
        )
        .bind(dados)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert-or-replace, used for singleton records such as settings.
    pub async fn upsert<T: Serialize>(&self, kind: RecordKind, id: &str, record: &T) -> Result<()> {
        let dados = serde_json::to_string(record)?;
        sqlx::query(
            "INSERT INTO registros (id, tipo, dados, versao, atualizado_em)
             VALUES (?, ?, ?, 1, ?)
             ON CONFLICT(id) DO UPDATE SET
                dados = excluded.dados,
                versao = registros.versao + 1,
                atualizado_em = excluded.atualizado_em",
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(dados)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, kind: RecordKind, id: &str) -> Result<Option<T>> {
        let row = sqlx::query("SELECT dados FROM registros WHERE id = ? AND tipo = ?")
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let dados: String = row.try_get("dados")?;
                Ok(Some(serde_json::from_str(&dados)?))
            }
            None => Ok(None),
        }
    }

    /// All records of a kind, in insertion order.
    pub async fn list<T: DeserializeOwned>(&self, kind: RecordKind) -> Result<Vec<T>> {
        let rows = sqlx::query("SELECT dados FROM registros WHERE tipo = ? ORDER BY rowid")
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;
        decode_rows(rows)
    }

    /// Records whose top-level JSON `field` equals `value`.
    pub async fn list_by_field<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>> {
        let rows = sqlx::query(
            "SELECT dados FROM registros
             WHERE tipo = ? AND json_extract(dados, ?) = ?
             ORDER BY rowid",
        )
        .bind(kind.as_str())
        .bind(format!("$.{field}"))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        decode_rows(rows)
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| -> Result<T> {
            let dados: String = row.try_get("dados")?;
            Ok(serde_json::from_str(&dados)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use serde::Deserialize;

    async fn versao(pool: &SqlitePool, id: &str) -> Option<i64> {
        sqlx::query_scalar("SELECT versao FROM registros WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .unwrap()
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Nota {
        id: String,
        dono: String,
        texto: String,
    }

    fn nota(id: &str, dono: &str, texto: &str) -> Nota {
        Nota {
            id: id.into(),
            dono: dono.into(),
            texto: texto.into(),
        }
    }

    #[tokio::test]
    async fn insert_get_and_version_bump() {
        let pool = open_in_memory().await.unwrap();
        let repo = RecordRepository::new(pool.clone());
        repo.insert(RecordKind::Evolucao, "n1", &nota("n1", "P1", "primeira"))
            .await
            .unwrap();

        let found: Option<Nota> = repo.get(RecordKind::Evolucao, "n1").await.unwrap();
        assert_eq!(found, Some(nota("n1", "P1", "primeira")));
        assert_eq!(versao(&pool, "n1").await, Some(1));

        let updated = repo
            .update(RecordKind::Evolucao, "n1", &nota("n1", "P1", "revisada"))
            .await
            .unwrap();
        assert!(updated);
        assert_eq!(versao(&pool, "n1").await, Some(2));
    }

    #[tokio::test]
    async fn kinds_do_not_leak_into_each_other() {
        let repo = RecordRepository::new(open_in_memory().await.unwrap());
        repo.insert(RecordKind::Laudo, "x", &nota("x", "P1", "laudo"))
            .await
            .unwrap();

        let wrong_kind: Option<Nota> = repo.get(RecordKind::Receita, "x").await.unwrap();
        assert!(wrong_kind.is_none());
        assert!(!repo
            .update(RecordKind::Receita, "x", &nota("x", "P1", "?"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn list_by_field_filters_on_json_value() {
        let repo = RecordRepository::new(open_in_memory().await.unwrap());
        repo.insert(RecordKind::Evolucao, "a", &nota("a", "P1", "um")).await.unwrap();
        repo.insert(RecordKind::Evolucao, "b", &nota("b", "P2", "dois")).await.unwrap();
        repo.insert(RecordKind::Evolucao, "c", &nota("c", "P1", "três")).await.unwrap();

        let do_p1: Vec<Nota> = repo
            .list_by_field(RecordKind::Evolucao, "dono", "P1")
            .await
            .unwrap();
        let ids: Vec<&str> = do_p1.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn upsert_creates_then_replaces() {
        let pool = open_in_memory().await.unwrap();
        let repo = RecordRepository::new(pool.clone());
        repo.upsert(RecordKind::Configuracao, "CONFIG", &nota("CONFIG", "-", "v1"))
            .await
            .unwrap();
        repo.upsert(RecordKind::Configuracao, "CONFIG", &nota("CONFIG", "-", "v2"))
            .await
            .unwrap();

        let all: Vec<Nota> = repo.list(RecordKind::Configuracao).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].texto, "v2");
        assert_eq!(versao(&pool, "CONFIG").await, Some(2));
    }

    #[tokio::test]
    async fn second_live_record_in_a_slot_is_a_duplicate() {
        let repo = RecordRepository::new(open_in_memory().await.unwrap());
        let ag = |id: &str, status: &str| {
            serde_json::json!({ "idAgenda": id, "data": "2025-03-05", "hora": "08:00", "status": status })
        };
        repo.insert(RecordKind::Agendamento, "a", &ag("a", "CANCELADO")).await.unwrap();
        repo.insert(RecordKind::Agendamento, "b", &ag("b", "AGENDADO")).await.unwrap();

        let err = repo
            .insert(RecordKind::Agendamento, "c", &ag("c", "CONFIRMADO"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)), "{err}");

        let err = repo
            .update(RecordKind::Agendamento, "a", &ag("a", "AGENDADO"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)), "{err}");

        // Other kinds are not constrained.
        repo.insert(RecordKind::Evolucao, "d", &ag("d", "AGENDADO")).await.unwrap();
    }
}
