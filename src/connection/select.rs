use tracing::warn;

use super::session::Connection;
use crate::driver::{Driver, DriverConnection};
use crate::error::SqlShimError;
use crate::query_builder::SqlBuilder;
use crate::results::QueryResult;
use crate::types::{ColumnMap, ResultShape};

impl<D: Driver> Connection<D> {
    /// Select the columns named by `select_cols`' keys from rows matching `where_cols`.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyProjection`] if no columns are requested and
    /// [`SqlShimError::Driver`] if the query fails.
    pub fn select(
        &mut self,
        table: &str,
        select_cols: &ColumnMap,
        where_cols: &ColumnMap,
    ) -> Result<QueryResult, SqlShimError> {
        let sql = SqlBuilder::new(table)
            .mode(self.value_mode())
            .select(select_cols, where_cols)?;
        self.record_sql(&sql);
        let cursor = self
            .handle_mut()?
            .query(&sql)
            .map_err(|err| Self::failed("select", &sql, err))?;
        Ok(QueryResult::from_cursor(cursor, ResultShape::Columns))
    }

    /// Lock the rows matching `where_cols` with `SELECT ... FOR UPDATE` and return how many
    /// were locked. On dialects with `NOWAIT` a held lock fails immediately.
    ///
    /// # Errors
    /// Returns [`SqlShimError::RowLocked`] when the driver reports the configured lock-conflict
    /// code, [`SqlShimError::EmptyQualifier`] for an empty map,
    /// [`SqlShimError::InvalidArgument`] when the dialect has no row locks (`SQLite`), and
    /// [`SqlShimError::Driver`] for any other failure.
    pub fn lock_for_update(
        &mut self,
        table: &str,
        where_cols: &ColumnMap,
    ) -> Result<usize, SqlShimError> {
        let sql = SqlBuilder::new(table)
            .mode(self.value_mode())
            .lock_for_update(where_cols, self.dialect)?;
        self.record_sql(&sql);
        let conflict_code = self.lock_conflict_code();

        match self.handle_mut()?.query(&sql) {
            Ok(cursor) => Ok(cursor.count()),
            Err(err) if conflict_code.is_some() && err.code == conflict_code => {
                warn!(%table, "could not lock row: already locked");
                Err(SqlShimError::RowLocked {
                    table: table.to_string(),
                    source: err,
                })
            }
            Err(err) => Err(Self::failed("lock for update", &sql, err)),
        }
    }
}
