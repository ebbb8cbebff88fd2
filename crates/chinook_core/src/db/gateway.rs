//! The validated query gateway: sole path between callers and the store.
//!
//! # Responsibility
//! - Own the store connection with an explicit `connect`/`disconnect`
//!   lifecycle.
//! - Execute positional-parameter statements, retrying BUSY/LOCKED failures
//!   up to a fixed ceiling.
//! - Cap the number of rows any caller-facing read can materialize.
//!
//! # Invariants
//! - Bound parameter values never appear in statement text or log lines.
//! - Query operations while disconnected fail with `NotConnected`.
//! - Constraint, malformed-statement and connection failures are never
//!   retried.
//! - Existence checks, counts and schema introspection read uncapped.

use super::open::open_store;
use super::result::{QueryOutcome, ResultSet};
use super::{classify, FailureClass, GatewayError, GatewayResult};
use crate::config::GatewayConfig;
use crate::logging::sanitize_message;
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};
use std::time::Instant;

const MAX_LOGGED_ERROR_CHARS: usize = 160;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

struct HeldConnection {
    conn: Connection,
    path: PathBuf,
}

/// Connection-owning gateway with retrying, parameterized execution.
///
/// Each instance holds at most one connection; separate instances never share
/// state.
pub struct ValidatedQueryGateway {
    config: GatewayConfig,
    connection: Option<HeldConnection>,
    attempts_made: u64,
}

impl Default for ValidatedQueryGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

impl ValidatedQueryGateway {
    /// Creates a disconnected gateway.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            connection: None,
            attempts_made: 0,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Path of the currently held store, if connected.
    pub fn path(&self) -> Option<&Path> {
        self.connection.as_ref().map(|held| held.path.as_path())
    }

    /// Total statement attempts issued by this gateway, retries included.
    pub fn attempts_made(&self) -> u64 {
        self.attempts_made
    }

    /// Opens `path` and holds the connection until [`Self::disconnect`].
    ///
    /// An already-held connection is released first.
    ///
    /// # Errors
    /// - `GatewayError::Connection` when the file is missing, unreadable or
    ///   not a SQLite database. Never retried.
    pub fn connect(&mut self, path: impl AsRef<Path>) -> GatewayResult<()> {
        let path = path.as_ref();
        if self.connection.is_some() {
            self.disconnect();
        }

        let conn = open_store(path, &self.config)?;
        self.connection = Some(HeldConnection {
            conn,
            path: path.to_path_buf(),
        });
        info!("event=gateway_connect module=gateway status=ok");
        Ok(())
    }

    /// Releases the held connection. Idempotent; never fails.
    pub fn disconnect(&mut self) {
        let Some(held) = self.connection.take() else {
            debug!("event=gateway_disconnect module=gateway status=noop");
            return;
        };

        match held.conn.close() {
            Ok(()) => info!("event=gateway_disconnect module=gateway status=ok"),
            Err((_conn, err)) => warn!(
                "event=gateway_disconnect module=gateway status=error error_code=close_failed error={}",
                sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
            ),
        }
    }

    /// Executes `statement` with positionally bound `parameters`.
    ///
    /// BUSY/LOCKED failures are re-attempted with the same parameters; at most
    /// `max_retries` attempts are made in total (a ceiling of zero still makes
    /// one attempt). Reads return at most `config.max_rows` rows; a cap of
    /// zero is treated as one.
    ///
    /// # Errors
    /// - `NotConnected` when no connection is held.
    /// - `RetriesExhausted` after the last transient failure.
    /// - `Integrity`, `MalformedQuery`, `Store` immediately, without retry.
    /// - `Connection` when the store became unusable; the gateway is then
    ///   disconnected.
    pub fn safe_execute(
        &mut self,
        statement: &str,
        parameters: &[Value],
        max_retries: u32,
    ) -> GatewayResult<QueryOutcome> {
        let row_cap = self.config.max_rows.max(1);
        self.execute_capped(statement, parameters, max_retries, row_cap)
    }

    fn execute_capped(
        &mut self,
        statement: &str,
        parameters: &[Value],
        max_retries: u32,
        row_cap: usize,
    ) -> GatewayResult<QueryOutcome> {
        let attempts = max_retries.max(1);
        let kind = statement_kind(statement);
        let started_at = Instant::now();
        let mut last_transient = None;

        for attempt in 1..=attempts {
            let held = self
                .connection
                .as_ref()
                .ok_or(GatewayError::NotConnected)?;
            self.attempts_made += 1;

            let failure = match run_statement(&held.conn, statement, parameters, row_cap) {
                Ok(outcome) => {
                    debug!(
                        "event=query_execute module=gateway status=ok statement={} attempt={}/{} duration_ms={}",
                        kind,
                        attempt,
                        attempts,
                        started_at.elapsed().as_millis()
                    );
                    return Ok(outcome);
                }
                Err(err) => classify(err),
            };

            match failure {
                FailureClass::Transient(err) => {
                    warn!(
                        "event=query_retry module=gateway status=retry statement={} attempt={}/{} error_code=store_busy",
                        kind, attempt, attempts
                    );
                    last_transient = Some(err);
                    if attempt < attempts && !self.config.retry_delay.is_zero() {
                        std::thread::sleep(self.config.retry_delay);
                    }
                }
                FailureClass::ConnectionLost(reason) => {
                    let path = held.path.clone();
                    error!(
                        "event=query_execute module=gateway status=error statement={} error_code=connection_lost",
                        kind
                    );
                    self.disconnect();
                    return Err(GatewayError::Connection { path, reason });
                }
                FailureClass::Fatal(err) => {
                    warn!(
                        "event=query_execute module=gateway status=error statement={} attempt={}/{} error_code={}",
                        kind,
                        attempt,
                        attempts,
                        err.code()
                    );
                    return Err(err);
                }
            }
        }

        error!(
            "event=query_execute module=gateway status=error statement={} attempts={} duration_ms={} error_code=retries_exhausted",
            kind,
            attempts,
            started_at.elapsed().as_millis()
        );
        Err(GatewayError::RetriesExhausted {
            attempts,
            last_error: last_transient,
        })
    }

    /// [`Self::safe_execute`] with the configured retry ceiling.
    pub fn execute(&mut self, statement: &str, parameters: &[Value]) -> GatewayResult<QueryOutcome> {
        let max_retries = self.config.max_retries;
        self.safe_execute(statement, parameters, max_retries)
    }

    /// Executes a read and returns its (row-capped) result set.
    pub fn query(&mut self, statement: &str, parameters: &[Value]) -> GatewayResult<ResultSet> {
        self.execute(statement, parameters)?.into_rows()
    }

    /// Internal read that ignores `max_rows`.
    fn query_uncapped(&mut self, statement: &str, parameters: &[Value]) -> GatewayResult<ResultSet> {
        let max_retries = self.config.max_retries;
        self.execute_capped(statement, parameters, max_retries, usize::MAX)?
            .into_rows()
    }

    /// Returns whether a row with `id_column = id_value` exists in
    /// `table_name`.
    ///
    /// Identifiers are checked against `[A-Za-z_][A-Za-z0-9_]*` before they
    /// are placed in statement text; the value is always bound.
    pub fn exists(
        &mut self,
        table_name: &str,
        id_column: &str,
        id_value: i64,
    ) -> GatewayResult<bool> {
        let table = checked_identifier(table_name)?;
        let column = checked_identifier(id_column)?;
        let statement = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {column} = ?1);");
        let rows = self.query_uncapped(&statement, &[Value::Integer(id_value)])?;
        Ok(rows.scalar_i64() == Some(1))
    }

    /// Returns whether `table_name` exists in the connected store.
    pub fn table_exists(&mut self, table_name: &str) -> GatewayResult<bool> {
        let rows = self.query_uncapped(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            &[Value::Text(table_name.to_string())],
        )?;
        Ok(rows.scalar_i64() == Some(1))
    }

    /// Returns the column names of `table_name` (empty when the table is
    /// missing).
    pub fn table_columns(&mut self, table_name: &str) -> GatewayResult<Vec<String>> {
        let rows = self.query_uncapped(
            "SELECT name FROM pragma_table_info(?1);",
            &[Value::Text(table_name.to_string())],
        )?;
        Ok(rows
            .rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some(Value::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// Counts rows in `table_name`.
    pub fn count_rows(&mut self, table_name: &str) -> GatewayResult<i64> {
        let table = checked_identifier(table_name)?;
        let rows = self.query_uncapped(&format!("SELECT COUNT(*) FROM {table};"), &[])?;
        rows.scalar_i64().ok_or_else(|| GatewayError::MalformedQuery {
            detail: format!("COUNT(*) on {table} returned no integer"),
        })
    }
}

impl Drop for ValidatedQueryGateway {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn run_statement(
    conn: &Connection,
    statement: &str,
    parameters: &[Value],
    max_rows: usize,
) -> rusqlite::Result<QueryOutcome> {
    let mut stmt = conn.prepare(statement)?;

    if stmt.column_count() == 0 {
        let affected_rows = stmt.execute(params_from_iter(parameters.iter()))?;
        return Ok(QueryOutcome::Written {
            affected_rows,
            last_insert_id: conn.last_insert_rowid(),
        });
    }

    let columns = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let column_count = columns.len();

    let mut rows = stmt.query(params_from_iter(parameters.iter()))?;
    let mut collected = Vec::new();
    let mut truncated = false;
    while let Some(row) = rows.next()? {
        if collected.len() >= max_rows {
            truncated = true;
            break;
        }
        let mut values = Vec::with_capacity(column_count);
        for index in 0..column_count {
            values.push(row.get::<_, Value>(index)?);
        }
        collected.push(values);
    }

    Ok(QueryOutcome::Rows(ResultSet {
        columns,
        rows: collected,
        truncated,
    }))
}

fn checked_identifier(name: &str) -> GatewayResult<&str> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(name)
    } else {
        Err(GatewayError::MalformedQuery {
            detail: format!("invalid identifier `{name}`"),
        })
    }
}

/// Leading keyword of a statement, for log lines.
fn statement_kind(statement: &str) -> String {
    statement
        .split_whitespace()
        .next()
        .unwrap_or("empty")
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_lowercase()
}
