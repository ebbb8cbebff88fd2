//! Typed outcomes returned by `ValidatedQueryGateway::safe_execute`.

use super::{GatewayError, GatewayResult};
use rusqlite::types::Value;

/// Rows materialized from one read, capped by the gateway row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// `true` when the statement matched more rows than were kept.
    pub truncated: bool,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the first column of the first row as an integer.
    ///
    /// Used by `COUNT(*)` / `EXISTS(...)` style scalar reads.
    pub fn scalar_i64(&self) -> Option<i64> {
        match self.rows.first().and_then(|row| row.first()) {
            Some(Value::Integer(value)) => Some(*value),
            _ => None,
        }
    }
}

/// Outcome of a single statement execution.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Statement produced a result set (possibly empty).
    Rows(ResultSet),
    /// Statement mutated the store.
    Written {
        affected_rows: usize,
        last_insert_id: i64,
    },
}

impl QueryOutcome {
    pub fn into_rows(self) -> GatewayResult<ResultSet> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Written { .. } => Err(GatewayError::MalformedQuery {
                detail: "statement returned no result columns".to_string(),
            }),
        }
    }

    /// Returns `(affected_rows, last_insert_id)` for write statements.
    pub fn into_written(self) -> GatewayResult<(usize, i64)> {
        match self {
            Self::Written {
                affected_rows,
                last_insert_id,
            } => Ok((affected_rows, last_insert_id)),
            Self::Rows(_) => Err(GatewayError::MalformedQuery {
                detail: "write statement returned a result set".to_string(),
            }),
        }
    }
}
