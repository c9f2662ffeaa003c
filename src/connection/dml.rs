use super::session::Connection;
use crate::driver::{Driver, DriverConnection};
use crate::error::SqlShimError;
use crate::query_builder::SqlBuilder;
use crate::types::ColumnMap;

impl<D: Driver> Connection<D> {
    /// Insert one row; values are rendered per [`Connection::value_mode`].
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyColumns`] for an empty map and [`SqlShimError::Driver`]
    /// if the statement fails.
    pub fn insert(&mut self, table: &str, cols: &ColumnMap) -> Result<usize, SqlShimError> {
        let sql = SqlBuilder::new(table).mode(self.value_mode()).insert(cols)?;
        self.run_update("insert", &sql)
    }

    /// Update the rows matching `where_cols`.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyColumns`] or [`SqlShimError::EmptyQualifier`] for empty
    /// maps and [`SqlShimError::Driver`] if the statement fails.
    pub fn update(
        &mut self,
        table: &str,
        set_cols: &ColumnMap,
        where_cols: &ColumnMap,
    ) -> Result<usize, SqlShimError> {
        let sql = SqlBuilder::new(table)
            .mode(self.value_mode())
            .update(set_cols, where_cols)?;
        self.run_update("update", &sql)
    }

    /// Delete the rows matching `where_cols`; an empty map deletes every row.
    ///
    /// # Errors
    /// Returns [`SqlShimError::Driver`] if the statement fails.
    pub fn delete(&mut self, table: &str, where_cols: &ColumnMap) -> Result<usize, SqlShimError> {
        let sql = SqlBuilder::new(table)
            .mode(self.value_mode())
            .delete(where_cols)?;
        self.run_update("delete", &sql)
    }

    fn run_update(&mut self, what: &str, sql: &str) -> Result<usize, SqlShimError> {
        self.record_sql(sql);
        let count = self
            .handle_mut()?
            .execute(sql)
            .map_err(|err| Self::failed(what, sql, err))?;
        self.uncommitted_rows += count;
        Ok(count)
    }
}
