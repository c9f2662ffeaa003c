use std::collections::HashMap;
use std::sync::Arc;

use super::row::{ResultRow, index_columns};
use crate::driver::Cursor;
use crate::types::ResultShape;

/// Rows returned by a query, tagged with the shape the statement declared.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// The rows returned by the query
    pub results: Vec<ResultRow>,
    /// The number of rows affected (for statements that do not return rows)
    pub rows_affected: usize,
    pub shape: ResultShape,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl QueryResult {
    #[must_use]
    pub fn with_capacity(capacity: usize, shape: ResultShape) -> QueryResult {
        QueryResult {
            results: Vec::with_capacity(capacity),
            shape,
            ..QueryResult::default()
        }
    }

    /// Result for a statement that changed rows instead of returning them.
    #[must_use]
    pub fn affected(rows_affected: usize, shape: ResultShape) -> QueryResult {
        QueryResult {
            rows_affected,
            shape,
            ..QueryResult::default()
        }
    }

    /// Drain a driver cursor into row maps.
    #[must_use]
    pub fn from_cursor(cursor: Cursor, shape: ResultShape) -> QueryResult {
        let (columns, rows) = cursor.into_parts();
        let mut result = QueryResult::with_capacity(rows.len(), shape);
        result.set_column_names(Arc::new(columns));
        for values in rows {
            result.add_row_values(values);
        }
        result
    }

    /// Set the column names for this result set (shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Some(Arc::new(index_columns(&column_names)));
        self.column_names = Some(column_names);
    }

    /// Add a row; ignored until column names are known.
    pub fn add_row_values(&mut self, values: Vec<Option<String>>) {
        if let (Some(column_names), Some(index)) = (&self.column_names, &self.column_index) {
            self.results.push(ResultRow {
                column_names: Arc::clone(column_names),
                values,
                column_index_cache: Arc::clone(index),
            });
            self.rows_affected += 1;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a ResultRow;
    type IntoIter = std::slice::Iter<'a, ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cursor_keeps_row_order_and_shape() {
        let cursor = Cursor::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Some("1".into()), None],
                vec![Some("2".into()), Some("x".into())],
            ],
        );
        let result = QueryResult::from_cursor(cursor, ResultShape::Xml);
        assert_eq!(result.len(), 2);
        assert_eq!(result.rows_affected, 2);
        assert_eq!(result.shape, ResultShape::Xml);
        assert_eq!(result.results[0].get("a"), Some("1"));
        assert_eq!(result.results[0].get("b"), None);
        assert_eq!(result.results[1].get("b"), Some("x"));
    }

    #[test]
    fn rows_without_columns_are_dropped() {
        let mut result = QueryResult::default();
        result.add_row_values(vec![Some("1".into())]);
        assert!(result.is_empty());
    }
}
