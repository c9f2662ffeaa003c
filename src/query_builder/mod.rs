//! SQL text generation from a table name and unordered column maps.
//!
//! One builder serves both ad-hoc statements and prepared-statement templates; the
//! [`ValueMode`] decides whether values pass through the value encoder or are embedded as given.

use std::borrow::Cow;

use crate::encoder::{encode_value, normalize_marker};
use crate::error::SqlShimError;
use crate::types::{ColumnMap, NULL_MARKER, ValueMode};

mod dml;
mod select;

/// Builds `SELECT`/`INSERT`/`UPDATE`/`DELETE` text against a single table.
///
/// ```rust
/// use sql_shim::prelude::*;
///
/// let sql = SqlBuilder::new("t")
///     .insert(&ColumnMap::from([("id", "7"), ("name", "O'Brien")]))
///     .unwrap();
/// assert_eq!(sql, "INSERT INTO t (id,name) VALUES (7,'O''Brien')");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SqlBuilder<'t> {
    table: &'t str,
    mode: ValueMode,
}

impl<'t> SqlBuilder<'t> {
    /// Builder that encodes values (see [`crate::encoder::encode_value`]).
    #[must_use]
    pub fn new(table: &'t str) -> Self {
        Self {
            table,
            mode: ValueMode::Encode,
        }
    }

    /// Override how values are rendered.
    #[must_use]
    pub fn mode(mut self, mode: ValueMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn table(&self) -> &'t str {
        self.table
    }

    fn render<'v>(&self, value: &'v str) -> Cow<'v, str> {
        match self.mode {
            ValueMode::Encode => encode_value(value),
            ValueMode::PreEncoded => Cow::Borrowed(normalize_marker(value)),
        }
    }

    fn check_names(&self, cols: &ColumnMap) -> Result<(), SqlShimError> {
        if self.table.trim().is_empty() {
            return Err(SqlShimError::InvalidArgument("table name is empty".into()));
        }
        if cols.iter().any(|(name, _)| name.trim().is_empty()) {
            return Err(SqlShimError::InvalidArgument(format!(
                "{}: column name is empty",
                self.table
            )));
        }
        Ok(())
    }

    /// Append ` WHERE k1 = v1 AND k2 IS null ...` for every qualifier, if any.
    ///
    /// `= null` never matches a row, so the null marker always compares with `IS`.
    fn push_qualifiers(&self, sql: &mut String, where_cols: &ColumnMap) {
        for (i, (column, value)) in where_cols.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(column);
            let rendered = self.render(value);
            if rendered == NULL_MARKER {
                sql.push_str(" IS ");
            } else {
                sql.push_str(" = ");
            }
            sql.push_str(&rendered);
        }
    }
}
