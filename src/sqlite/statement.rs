use std::sync::Arc;

use super::connection::{SharedSession, lock_session};
use super::query::build_cursor;
use crate::driver::{DriverStatement, StatementOutcome};
use crate::error::DriverError;

/// A statement prepared on a [`super::SqliteConnection`].
///
/// The compiled form lives in rusqlite's statement cache; this handle keeps the SQL and the
/// values bound so far.
pub struct SqliteStatement {
    session: SharedSession,
    sql: Arc<str>,
    values: Vec<Option<String>>,
}

impl SqliteStatement {
    pub(super) fn new(session: SharedSession, sql: &str, parameter_count: usize) -> Self {
        Self {
            session,
            sql: Arc::from(sql),
            values: vec![None; parameter_count],
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl DriverStatement for SqliteStatement {
    fn bind_at(&mut self, position: usize, value: Option<&str>) -> Result<(), DriverError> {
        let count = self.values.len();
        let slot = position
            .checked_sub(1)
            .and_then(|idx| self.values.get_mut(idx))
            .ok_or_else(|| {
                DriverError::new(format!(
                    "parameter index {position} out of range for {count} parameters"
                ))
            })?;
        *slot = value.map(str::to_string);
        Ok(())
    }

    fn execute(&mut self) -> Result<StatementOutcome, DriverError> {
        let session = lock_session(&self.session)?;
        session.begin_if_needed()?;
        let mut stmt = session.conn.prepare_cached(&self.sql)?;
        if stmt.column_count() > 0 {
            return Ok(StatementOutcome::Rows(build_cursor(&mut stmt, &self.values)?));
        }
        let affected = stmt.execute(rusqlite::params_from_iter(self.values.iter()))?;
        Ok(StatementOutcome::Updated(affected))
    }

    fn close(self) -> Result<(), DriverError> {
        Ok(())
    }
}
