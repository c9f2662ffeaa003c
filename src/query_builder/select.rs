use crate::error::SqlShimError;
use crate::types::{ColumnMap, Dialect};

use super::SqlBuilder;

impl SqlBuilder<'_> {
    /// `SELECT c1,c2 FROM table [WHERE ...]`. Only the keys of `select_cols` are used.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyProjection`] if `select_cols` is empty, or
    /// [`SqlShimError::InvalidArgument`] for a blank table or column name.
    pub fn select(
        &self,
        select_cols: &ColumnMap,
        where_cols: &ColumnMap,
    ) -> Result<String, SqlShimError> {
        self.check_names(select_cols)?;
        self.check_names(where_cols)?;
        if select_cols.is_empty() {
            return Err(SqlShimError::EmptyProjection(self.table.to_string()));
        }

        let mut sql = format!(
            "SELECT {} FROM {}",
            select_cols.sorted_keys().join(","),
            self.table
        );
        self.push_qualifiers(&mut sql, where_cols);
        Ok(sql)
    }

    /// `SELECT * FROM table WHERE ... FOR UPDATE`, plus `NOWAIT` where the dialect has it.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyQualifier`] if `where_cols` is empty; locking a whole table
    /// through this path is treated as a caller mistake. Returns
    /// [`SqlShimError::InvalidArgument`] for dialects without `FOR UPDATE` row locks.
    pub fn lock_for_update(
        &self,
        where_cols: &ColumnMap,
        dialect: Dialect,
    ) -> Result<String, SqlShimError> {
        self.check_names(where_cols)?;
        if where_cols.is_empty() {
            return Err(SqlShimError::EmptyQualifier(self.table.to_string()));
        }
        if !dialect.supports_row_locks() {
            return Err(SqlShimError::InvalidArgument(format!(
                "{}: {dialect:?} has no SELECT ... FOR UPDATE row locks",
                self.table
            )));
        }

        let mut sql = format!("SELECT * FROM {}", self.table);
        self.push_qualifiers(&mut sql, where_cols);
        sql.push_str(" FOR UPDATE");
        if dialect.supports_nowait() {
            sql.push_str(" NOWAIT");
        }
        Ok(sql)
    }
}
