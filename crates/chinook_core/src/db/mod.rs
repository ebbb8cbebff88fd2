//! SQLite store access: connection bootstrap, schema, and the query gateway.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog store.
//! - Provide the only query path (`ValidatedQueryGateway`) used by repositories.
//! - Translate raw SQLite failures into the typed `GatewayError` taxonomy.
//!
//! # Invariants
//! - Raw `rusqlite::Error` values only escape through `GatewayError::Store`.
//! - BUSY/LOCKED are the only failure classes that are ever retried.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod gateway;
mod open;
mod result;
pub mod schema;

pub use gateway::ValidatedQueryGateway;
pub use open::{create_store, open_store};
pub use result::{QueryOutcome, ResultSet};

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug)]
pub enum GatewayError {
    /// Query attempted while no connection is held.
    NotConnected,
    /// Store missing, unreadable, corrupt, or lost mid-session.
    Connection { path: PathBuf, reason: String },
    /// BUSY/LOCKED persisted through every allowed attempt.
    RetriesExhausted {
        attempts: u32,
        last_error: Option<rusqlite::Error>,
    },
    /// Constraint violation; `relationship` names what was violated.
    Integrity { relationship: String, detail: String },
    /// Unknown table/column or invalid statement shape.
    MalformedQuery { detail: String },
    Store(rusqlite::Error),
}

impl GatewayError {
    /// Integrity failure detected before issuing a write.
    pub fn missing_reference(relationship: impl Into<String>, id: i64) -> Self {
        Self::Integrity {
            relationship: relationship.into(),
            detail: format!("referenced id {id} does not exist"),
        }
    }

    /// Stable short code used in log lines and CLI diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::Connection { .. } => "connection_error",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::Integrity { .. } => "integrity_error",
            Self::MalformedQuery { .. } => "malformed_query",
            Self::Store(_) => "store_error",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected to a database"),
            Self::Connection { path, reason } => {
                write!(f, "cannot use database `{}`: {reason}", path.display())
            }
            Self::RetriesExhausted {
                attempts,
                last_error: Some(err),
            } => write!(f, "database stayed busy after {attempts} attempts: {err}"),
            Self::RetriesExhausted {
                attempts,
                last_error: None,
            } => write!(f, "database stayed busy after {attempts} attempts"),
            Self::Integrity {
                relationship,
                detail,
            } => write!(f, "data integrity violation on {relationship}: {detail}"),
            Self::MalformedQuery { detail } => write!(f, "malformed query: {detail}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RetriesExhausted {
                last_error: Some(err),
                ..
            } => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

/// How a single failed attempt should be handled.
#[derive(Debug)]
pub(crate) enum FailureClass {
    Transient(rusqlite::Error),
    ConnectionLost(String),
    Fatal(GatewayError),
}

pub(crate) fn classify(err: rusqlite::Error) -> FailureClass {
    let (code, message) = match &err {
        rusqlite::Error::SqliteFailure(failure, message) => (
            Some(failure.code),
            message.clone().unwrap_or_else(|| failure.to_string()),
        ),
        // Prepare-time errors carry the offending SQL offset.
        rusqlite::Error::SqlInputError { error, msg, .. } => (Some(error.code), msg.clone()),
        other => (None, other.to_string()),
    };

    match code {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => FailureClass::Transient(err),
        Some(ErrorCode::ConstraintViolation) => FailureClass::Fatal(GatewayError::Integrity {
            relationship: constraint_relationship(&message),
            detail: message,
        }),
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::SystemIoFailure,
        ) => FailureClass::ConnectionLost(message),
        // SQLITE_ERROR: "no such table", "no such column", syntax errors.
        Some(ErrorCode::Unknown) => {
            FailureClass::Fatal(GatewayError::MalformedQuery { detail: message })
        }
        Some(_) => FailureClass::Fatal(GatewayError::Store(err)),
        None => match err {
            rusqlite::Error::InvalidParameterCount(..)
            | rusqlite::Error::InvalidParameterName(_)
            | rusqlite::Error::MultipleStatement
            | rusqlite::Error::InvalidQuery => {
                FailureClass::Fatal(GatewayError::MalformedQuery { detail: message })
            }
            other => FailureClass::Fatal(GatewayError::Store(other)),
        },
    }
}

fn constraint_relationship(detail: &str) -> String {
    if detail.contains("FOREIGN KEY") {
        "foreign key".to_string()
    } else if let Some((_, columns)) = detail.split_once("constraint failed:") {
        columns.trim().to_string()
    } else {
        "constraint".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, FailureClass, GatewayError};
    use rusqlite::ffi;

    fn sqlite_failure(code: i32, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), Some(message.to_string()))
    }

    #[test]
    fn busy_and_locked_are_transient() {
        assert!(matches!(
            classify(sqlite_failure(ffi::SQLITE_BUSY, "database is locked")),
            FailureClass::Transient(_)
        ));
        assert!(matches!(
            classify(sqlite_failure(ffi::SQLITE_LOCKED, "database table is locked")),
            FailureClass::Transient(_)
        ));
    }

    #[test]
    fn constraint_failures_name_the_relationship() {
        match classify(sqlite_failure(
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            "FOREIGN KEY constraint failed",
        )) {
            FailureClass::Fatal(GatewayError::Integrity { relationship, .. }) => {
                assert_eq!(relationship, "foreign key");
            }
            other => panic!("unexpected class: {other:?}"),
        }

        match classify(sqlite_failure(
            ffi::SQLITE_CONSTRAINT_NOTNULL,
            "NOT NULL constraint failed: albums.Title",
        )) {
            FailureClass::Fatal(GatewayError::Integrity { relationship, .. }) => {
                assert_eq!(relationship, "albums.Title");
            }
            other => panic!("unexpected class: {other:?}"),
        }
    }

    #[test]
    fn generic_sql_error_is_malformed_query() {
        match classify(sqlite_failure(ffi::SQLITE_ERROR, "no such table: albumz")) {
            FailureClass::Fatal(GatewayError::MalformedQuery { detail }) => {
                assert!(detail.contains("albumz"));
            }
            other => panic!("unexpected class: {other:?}"),
        }
    }

    #[test]
    fn corrupt_store_is_connection_loss() {
        assert!(matches!(
            classify(sqlite_failure(
                ffi::SQLITE_NOTADB,
                "file is not a database"
            )),
            FailureClass::ConnectionLost(_)
        ));
    }
}
