use crate::error::SqlShimError;
use crate::types::ColumnMap;

use super::SqlBuilder;

impl SqlBuilder<'_> {
    /// `INSERT INTO table (c1,c2) VALUES (v1,v2)`.
    ///
    /// Names and values come out of one pass over the sorted columns, so the Nth name always
    /// lines up with the Nth value.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyColumns`] if `cols` is empty.
    pub fn insert(&self, cols: &ColumnMap) -> Result<String, SqlShimError> {
        self.check_names(cols)?;
        if cols.is_empty() {
            return Err(SqlShimError::EmptyColumns(format!("INSERT INTO {}", self.table)));
        }

        let mut names = String::new();
        let mut values = String::new();
        for (i, (column, value)) in cols.iter().enumerate() {
            if i > 0 {
                names.push(',');
                values.push(',');
            }
            names.push_str(column);
            values.push_str(&self.render(value));
        }
        Ok(format!(
            "INSERT INTO {} ({names}) VALUES ({values})",
            self.table
        ))
    }

    /// `UPDATE table SET c1 = v1,c2 = v2 WHERE ...`.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyColumns`] if `set_cols` is empty and
    /// [`SqlShimError::EmptyQualifier`] if `where_cols` is empty; an unqualified update would
    /// touch every row.
    pub fn update(
        &self,
        set_cols: &ColumnMap,
        where_cols: &ColumnMap,
    ) -> Result<String, SqlShimError> {
        self.check_names(set_cols)?;
        self.check_names(where_cols)?;
        if set_cols.is_empty() {
            return Err(SqlShimError::EmptyColumns(format!("UPDATE {}", self.table)));
        }
        if where_cols.is_empty() {
            return Err(SqlShimError::EmptyQualifier(format!("UPDATE {}", self.table)));
        }

        let mut sql = format!("UPDATE {} SET ", self.table);
        for (i, (column, value)) in set_cols.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(column);
            sql.push_str(" = ");
            sql.push_str(&self.render(value));
        }
        self.push_qualifiers(&mut sql, where_cols);
        Ok(sql)
    }

    /// `DELETE FROM table [WHERE ...]`. An empty `where_cols` deletes every row.
    ///
    /// # Errors
    /// Returns [`SqlShimError::InvalidArgument`] for a blank table or column name.
    pub fn delete(&self, where_cols: &ColumnMap) -> Result<String, SqlShimError> {
        self.check_names(where_cols)?;
        let mut sql = format!("DELETE FROM {}", self.table);
        self.push_qualifiers(&mut sql, where_cols);
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueMode;

    #[test]
    fn insert_lines_up_names_and_values() {
        let cols = ColumnMap::from([("name", "O'Brien"), ("id", "7")]);
        assert_eq!(
            SqlBuilder::new("t").insert(&cols).unwrap(),
            "INSERT INTO t (id,name) VALUES (7,'O''Brien')"
        );
    }

    #[test]
    fn prepared_insert_keeps_placeholders_and_constants() {
        let cols = ColumnMap::from([("b", "?"), ("a", "'fixed'"), ("c", "?")]);
        let sql = SqlBuilder::new("t")
            .mode(ValueMode::PreEncoded)
            .insert(&cols)
            .unwrap();
        assert_eq!(sql, "INSERT INTO t (a,b,c) VALUES ('fixed',?,?)");
    }

    #[test]
    fn insert_requires_columns() {
        let err = SqlBuilder::new("t").insert(&ColumnMap::new()).unwrap_err();
        assert!(matches!(err, SqlShimError::EmptyColumns(_)));
    }

    #[test]
    fn update_sets_and_qualifies() {
        let sql = SqlBuilder::new("t")
            .update(
                &ColumnMap::from([("name", "x"), ("n", "null")]),
                &ColumnMap::from([("id", "2")]),
            )
            .unwrap();
        assert_eq!(sql, "UPDATE t SET n = null,name = 'x' WHERE id = 2");
    }

    #[test]
    fn update_requires_both_clauses() {
        let builder = SqlBuilder::new("t");
        let some = ColumnMap::from([("a", "1")]);
        assert!(matches!(
            builder.update(&ColumnMap::new(), &some).unwrap_err(),
            SqlShimError::EmptyColumns(_)
        ));
        assert!(matches!(
            builder.update(&some, &ColumnMap::new()).unwrap_err(),
            SqlShimError::EmptyQualifier(_)
        ));
    }

    #[test]
    fn delete_without_qualifiers_targets_all_rows() {
        let builder = SqlBuilder::new("t");
        assert_eq!(builder.delete(&ColumnMap::new()).unwrap(), "DELETE FROM t");
        assert_eq!(
            builder.delete(&ColumnMap::from([("gone", "null")])).unwrap(),
            "DELETE FROM t WHERE gone IS null"
        );
    }
}
