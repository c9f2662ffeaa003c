use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The value a caller supplies to mean SQL `NULL`.
pub const NULL_MARKER: &str = "null";

/// The value a caller supplies to keep a column as a positional placeholder.
pub const PLACEHOLDER: &str = "?";

/// Column name to string value, as handed to the SQL builder and to prepared statements.
///
/// Callers render numbers and dates to strings themselves; [`NULL_MARKER`] stands for SQL
/// `NULL` and [`PLACEHOLDER`] keeps a column parameterised:
/// ```rust
/// use sql_shim::prelude::*;
///
/// let cols = ColumnMap::from([("id", "7"), ("name", "O'Brien")]);
/// assert_eq!(cols.sorted_keys(), vec!["id", "name"]);
/// ```
///
/// Insertion order is not kept. Every consumer that needs positions goes through
/// [`ColumnMap::sorted_keys`], so SQL generation and later value binding agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap(BTreeMap<String, String>);

impl ColumnMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column value, returning the previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(column.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column names in byte-wise lexicographic order.
    ///
    /// This is the canonical parameter order for statements prepared without an explicit one.
    /// Not locale-aware: `"B" < "a" < "b"`.
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// `(column, value)` pairs in the same order as [`ColumnMap::sorted_keys`].
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ColumnMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ColumnMap {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// SQL engine behaviour profile, selected once per connection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Standard SQL with no vendor extensions
    #[default]
    Generic,
    /// Oracle Database
    Oracle,
    /// MySQL / MariaDB
    #[value(name = "mysql")]
    MySql,
    /// Apache Derby
    Derby,
    /// Microsoft SQL Server
    #[value(name = "sqlserver")]
    SqlServer,
    /// `SQLite`
    Sqlite,
    /// `PostgreSQL`
    Postgres,
}

impl Dialect {
    /// Whether `SELECT ... FOR UPDATE` locks rows. `SQLite` has no row locks and SQL Server
    /// locks through table hints instead.
    #[must_use]
    pub fn supports_row_locks(self) -> bool {
        !matches!(self, Dialect::Sqlite | Dialect::SqlServer)
    }

    /// Whether `FOR UPDATE` takes a `NOWAIT` suffix.
    #[must_use]
    pub fn supports_nowait(self) -> bool {
        matches!(self, Dialect::Oracle)
    }

    /// Vendor code the driver reports when `FOR UPDATE NOWAIT` hits a held lock.
    #[must_use]
    pub fn default_lock_conflict_code(self) -> Option<i64> {
        match self {
            // ORA-00054: resource busy and acquire with NOWAIT specified
            Dialect::Oracle => Some(54),
            _ => None,
        }
    }

    /// Session statement that sets the date format, when the dialect has one.
    #[must_use]
    pub fn date_format_directive(self, format: &str) -> Option<String> {
        match self {
            Dialect::Oracle => Some(format!(
                "ALTER SESSION SET nls_date_format = {}",
                crate::encoder::quote(format)
            )),
            _ => None,
        }
    }
}

/// Whether the SQL builder runs values through the value encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    /// Quote and escape each value with [`crate::encoder::encode_value`].
    #[default]
    Encode,
    /// Embed values verbatim; the caller has already rendered SQL literals. The quoted
    /// markers `'null'` and `'?'` still become `null` and `?`.
    PreEncoded,
}

/// Shape a prepared statement's rows are meant to be reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultShape {
    /// One row map per database row
    #[default]
    Columns,
    /// Rows carry a structured (XML) document for the caller to unpack
    Xml,
}
