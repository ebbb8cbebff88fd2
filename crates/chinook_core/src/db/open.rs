//! Connection bootstrap utilities for the catalog store.
//!
//! # Responsibility
//! - Open an existing store file without ever creating one implicitly.
//! - Configure connection pragmas required by gateway behavior.
//! - Create a fresh store with the bundled catalog schema on request.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have passed a read probe against `sqlite_master`.

use super::schema::apply_catalog_schema;
use super::{GatewayError, GatewayResult};
use crate::config::GatewayConfig;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Instant;

/// Opens an existing store file for reading and writing.
///
/// # Errors
/// - `GatewayError::Connection` when the path is missing, not a regular file,
///   read-only, or not a readable SQLite database.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(path: &Path, config: &GatewayConfig) -> GatewayResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=existing");

    match open_existing(path, config) {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode=existing duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=existing duration_ms={} error_code={}",
                started_at.elapsed().as_millis(),
                err.code()
            );
            Err(err)
        }
    }
}

/// Creates the store file if needed and applies the catalog schema.
///
/// Safe to call on an existing store: schema statements are idempotent.
pub fn create_store(path: &Path) -> GatewayResult<()> {
    let started_at = Instant::now();
    info!("event=db_create module=db status=start");

    let result = Connection::open(path)
        .map_err(|err| connection_error(path, err.to_string()))
        .and_then(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
                .map_err(|err| connection_error(path, err.to_string()))?;
            apply_catalog_schema(&conn)
        });

    match &result {
        Ok(()) => info!(
            "event=db_create module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_create module=db status=error duration_ms={} error_code={}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    result
}

fn open_existing(path: &Path, config: &GatewayConfig) -> GatewayResult<Connection> {
    let metadata = std::fs::metadata(path).map_err(|err| {
        connection_error(path, format!("database file not found or unreadable ({err})"))
    })?;
    if !metadata.is_file() {
        return Err(connection_error(path, "path is not a regular file"));
    }
    if metadata.permissions().readonly() {
        return Err(connection_error(path, "insufficient permissions (file is read-only)"));
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|err| connection_error(path, err.to_string()))?;

    bootstrap_connection(&conn, config).map_err(|err| connection_error(path, err.to_string()))?;
    Ok(conn)
}

fn bootstrap_connection(conn: &Connection, config: &GatewayConfig) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(config.busy_timeout)?;
    // SQLite opens lazily; this read is what surfaces "file is not a database".
    conn.query_row("SELECT COUNT(*) FROM sqlite_master;", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(())
}

fn connection_error(path: &Path, reason: impl Into<String>) -> GatewayError {
    GatewayError::Connection {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
