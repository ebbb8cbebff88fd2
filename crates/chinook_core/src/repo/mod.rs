//! Repository layer over the validated query gateway.
//!
//! # Responsibility
//! - Define album/artist data access contracts.
//! - Keep SQL text inside the persistence boundary; every value is bound.
//!
//! # Invariants
//! - Writes validate their input before any statement is issued.
//! - Mutations check target existence first and report `NotFound` instead of
//!   silently affecting zero rows.
//! - Repositories refuse to operate on stores missing required tables/columns.
//! - Nullable catalog columns (`artists.Name`) read as `Option`.

use crate::db::{GatewayError, ValidatedQueryGateway};
use crate::validate::ValidationError;
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod album_repo;
pub mod artist_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Gateway(GatewayError),
    NotFound {
        entity: &'static str,
        id: i64,
    },
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// `true` for constraint/reference violations, pre-checked or store-reported.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::Integrity { .. }))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Gateway(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GatewayError> for RepoError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

/// Rows returned by a listing, with the gateway truncation flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub truncated: bool,
}

pub(crate) fn ensure_table_shape(
    gateway: &mut ValidatedQueryGateway,
    table: &'static str,
    columns: &'static [&'static str],
) -> RepoResult<()> {
    let present = gateway.table_columns(table)?;
    if present.is_empty() {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !present.iter().any(|name| name.eq_ignore_ascii_case(column)) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

/// Bound value for an optional listing limit; `-1` is SQLite's "no limit".
pub(crate) fn limit_value(limit: Option<u32>) -> Value {
    Value::Integer(limit.map_or(-1, i64::from))
}

pub(crate) fn integer_at(row: &[Value], index: usize, column: &str) -> RepoResult<i64> {
    match row.get(index) {
        Some(Value::Integer(value)) => Ok(*value),
        other => Err(RepoError::InvalidData(format!(
            "expected integer in {column}, found {}",
            describe(other)
        ))),
    }
}

pub(crate) fn text_at(row: &[Value], index: usize, column: &str) -> RepoResult<String> {
    match row.get(index) {
        Some(Value::Text(value)) => Ok(value.clone()),
        other => Err(RepoError::InvalidData(format!(
            "expected text in {column}, found {}",
            describe(other)
        ))),
    }
}

/// Like [`text_at`], but NULL reads as `None`.
pub(crate) fn optional_text_at(
    row: &[Value],
    index: usize,
    column: &str,
) -> RepoResult<Option<String>> {
    match row.get(index) {
        Some(Value::Null) => Ok(None),
        _ => text_at(row, index, column).map(Some),
    }
}

fn describe(value: Option<&Value>) -> &'static str {
    match value {
        None => "no value",
        Some(Value::Null) => "NULL",
        Some(Value::Integer(_)) => "integer",
        Some(Value::Real(_)) => "real",
        Some(Value::Text(_)) => "text",
        Some(Value::Blob(_)) => "blob",
    }
}
