use mnema_core::error::StateError;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// Open a SQLite connection with default pragmas.
pub fn open_connection(db_path: &Path) -> Result<Connection, StateError> {
    open_connection_with_config(db_path, 5000)
}

/// Open a SQLite connection with a configurable busy timeout.
pub fn open_connection_with_config(
    db_path: &Path,
    busy_timeout_ms: u32,
) -> Result<Connection, StateError> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(StateError::Io)?;
    }

    let conn = Connection::open(db_path).map_err(StateError::sqlite)?;

    apply_pragmas(&conn, busy_timeout_ms)?;

    info!(?db_path, "SQLite connection opened");
    Ok(conn)
}

fn apply_pragmas(conn: &Connection, busy_timeout_ms: u32) -> Result<(), StateError> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {};",
        busy_timeout_ms
    ))
    .map_err(StateError::sqlite)?;
    Ok(())
}
