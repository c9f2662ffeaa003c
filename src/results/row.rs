use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A row from a query result
///
/// Values are the driver's string rendering of each column; SQL `NULL` is kept as `None`
/// and is reported as absent by the name-based accessors.
#[derive(Debug, Clone)]
pub struct ResultRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, positionally matching `column_names`
    pub values: Vec<Option<String>>,
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl ResultRow {
    /// Create a row, building its own column lookup.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Option<String>>) -> Self {
        let cache = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Value of `column_name`, or `None` if the column is unknown or `NULL` in this row.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&str> {
        self.get_column_index(column_name)
            .and_then(|idx| self.get_by_index(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Present `(column, value)` pairs in result column order, skipping `NULL`s.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.column_names
            .iter()
            .zip(self.values.iter())
            .filter_map(|(name, value)| value.as_deref().map(|v| (name.as_str(), v)))
    }

    /// Copy the present columns into a map keyed by column name.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

pub(super) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        // first occurrence wins for duplicate names (e.g. joins)
        index.entry(name.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ResultRow {
        ResultRow::new(
            Arc::new(vec!["id".into(), "name".into(), "gone".into()]),
            vec![Some("7".into()), Some("O'Brien".into()), None],
        )
    }

    #[test]
    fn nulls_are_absent() {
        let row = row();
        assert_eq!(row.get("id"), Some("7"));
        assert_eq!(row.get("gone"), None);
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.iter().count(), 2);
        assert!(!row.to_map().contains_key("gone"));
    }

    #[test]
    fn index_lookup_matches_position() {
        let row = row();
        assert_eq!(row.get_column_index("name"), Some(1));
        assert_eq!(row.get_by_index(1), Some("O'Brien"));
        assert_eq!(row.get_by_index(9), None);
    }
}
