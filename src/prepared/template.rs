use serde::{Deserialize, Serialize};

use crate::types::ResultShape;

/// Instructions for creating a named prepared statement.
///
/// `param_columns`, when present, names the column whose value fills each `?` in `sql`, in
/// order. When absent, values are bound in byte-wise sorted order of their column names.
///
/// Templates are usually listed in the connection configuration:
/// ```rust
/// use sql_shim::prelude::*;
///
/// let template: PreparedStatementTemplate = serde_json::from_str(
///     r#"{"name": "by_id", "sql": "SELECT name FROM t WHERE id = ?", "params": ["id"]}"#,
/// ).unwrap();
/// assert_eq!(template.shape, ResultShape::Columns);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedStatementTemplate {
    pub name: String,
    pub sql: String,
    #[serde(default, rename = "params", skip_serializing_if = "Option::is_none")]
    pub param_columns: Option<Vec<String>>,
    #[serde(default)]
    pub shape: ResultShape,
}

impl PreparedStatementTemplate {
    #[must_use]
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
            param_columns: None,
            shape: ResultShape::default(),
        }
    }

    #[must_use]
    pub fn with_param_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_shape(mut self, shape: ResultShape) -> Self {
        self.shape = shape;
        self
    }
}
