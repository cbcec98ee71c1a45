use crate::{db, schema};
use mnema_core::error::StateError;
use mnema_core::time::now_iso8601;
use rusqlite::{Connection, params};
use std::path::Path;

/// Last-synced source revision for one actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    pub actor: String,
    pub revision: String,
    pub updated_at: String,
}

/// Durable single-value cursor per actor.
///
/// Best-effort by contract: there is no compare-and-swap, so two
/// overlapping syncs for one actor may both read the same stale value.
/// Idempotent upserts keep that safe for correctness.
pub trait WatermarkStore {
    fn get(&self, actor: &str) -> Result<Option<Watermark>, StateError>;
    fn set(&self, actor: &str, revision: &str) -> Result<(), StateError>;
    fn clear(&self, actor: &str) -> Result<(), StateError>;
}

/// SQLite-backed watermark store.
pub struct SqliteWatermarkStore {
    conn: Connection,
}

impl SqliteWatermarkStore {
    /// Open (or create) the backing database and ensure the schema.
    pub fn open(db_path: &Path) -> Result<Self, StateError> {
        let conn = db::open_connection(db_path)?;
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection; ensures the schema.
    pub fn with_connection(conn: Connection) -> Result<Self, StateError> {
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }
}

impl WatermarkStore for SqliteWatermarkStore {
    fn get(&self, actor: &str) -> Result<Option<Watermark>, StateError> {
        let result = self.conn.query_row(
            "SELECT actor, revision, updated_at FROM sync_watermark WHERE actor = ?1",
            params![actor],
            |row| {
                Ok(Watermark {
                    actor: row.get(0)?,
                    revision: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            },
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StateError::sqlite(e)),
        }
    }

    fn set(&self, actor: &str, revision: &str) -> Result<(), StateError> {
        self.conn
            .execute(
                "INSERT INTO sync_watermark (actor, revision, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(actor) DO UPDATE SET
                   revision = excluded.revision,
                   updated_at = excluded.updated_at",
                params![actor, revision, now_iso8601()],
            )
            .map_err(StateError::sqlite)?;
        Ok(())
    }

    fn clear(&self, actor: &str) -> Result<(), StateError> {
        self.conn
            .execute(
                "DELETE FROM sync_watermark WHERE actor = ?1",
                params![actor],
            )
            .map_err(StateError::sqlite)?;
        Ok(())
    }
}
