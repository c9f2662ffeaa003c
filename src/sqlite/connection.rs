use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use super::query::build_cursor;
use super::statement::SqliteStatement;
use crate::driver::{Cursor, DriverConnection};
use crate::error::DriverError;
use crate::types::Dialect;

/// rusqlite connection plus the commit mode the shim asked for.
///
/// `SQLite` has no session-level autocommit switch: with autocommit off a `BEGIN` is issued
/// lazily before the first statement after each commit or rollback.
pub(super) struct Session {
    pub(super) conn: rusqlite::Connection,
    pub(super) autocommit: bool,
}

impl Session {
    pub(super) fn begin_if_needed(&self) -> Result<(), DriverError> {
        if !self.autocommit && self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}

pub(super) type SharedSession = Arc<Mutex<Session>>;

pub(super) fn lock_session(session: &SharedSession) -> Result<MutexGuard<'_, Session>, DriverError> {
    session
        .lock()
        .map_err(|_| DriverError::new("sqlite session lock poisoned"))
}

/// Live `SQLite` session. Prepared statements share it, so they stay valid for as long as
/// the connection is open.
pub struct SqliteConnection {
    session: SharedSession,
}

impl SqliteConnection {
    pub(super) fn new(conn: rusqlite::Connection) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                conn,
                autocommit: true,
            })),
        }
    }

    fn finish_tx(&mut self, sql: &str) -> Result<(), DriverError> {
        let session = lock_session(&self.session)?;
        if !session.conn.is_autocommit() {
            session.conn.execute_batch(sql)?;
        }
        Ok(())
    }
}

impl DriverConnection for SqliteConnection {
    type Stmt = SqliteStatement;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), DriverError> {
        let mut session = lock_session(&self.session)?;
        if autocommit && !session.conn.is_autocommit() {
            session.conn.execute_batch("COMMIT")?;
        }
        session.autocommit = autocommit;
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<usize, DriverError> {
        let session = lock_session(&self.session)?;
        session.begin_if_needed()?;
        Ok(session.conn.execute(sql, [])?)
    }

    fn query(&mut self, sql: &str) -> Result<Cursor, DriverError> {
        let session = lock_session(&self.session)?;
        session.begin_if_needed()?;
        let mut stmt = session.conn.prepare(sql)?;
        build_cursor(&mut stmt, &[])
    }

    fn prepare(&mut self, sql: &str) -> Result<SqliteStatement, DriverError> {
        let session = lock_session(&self.session)?;
        let stmt = session.conn.prepare_cached(sql)?;
        Ok(SqliteStatement::new(
            Arc::clone(&self.session),
            sql,
            stmt.parameter_count(),
        ))
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        self.finish_tx("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.finish_tx("ROLLBACK")
    }

    fn close(self) -> Result<(), DriverError> {
        let session = match Arc::try_unwrap(self.session) {
            Ok(session) => session,
            Err(shared) => {
                warn!(
                    handles = Arc::strong_count(&shared) - 1,
                    "sqlite session still held by statement handles; closes when they drop"
                );
                return Ok(());
            }
        };
        let session = session
            .into_inner()
            .map_err(|_| DriverError::new("sqlite session lock poisoned"))?;
        session.conn.close().map_err(|(_, err)| err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverStatement, StatementOutcome};

    fn memory() -> SqliteConnection {
        SqliteConnection::new(rusqlite::Connection::open_in_memory().unwrap())
    }

    #[test]
    fn close_with_live_statement_defers_to_the_last_handle() {
        let mut conn = memory();
        conn.execute("CREATE TABLE t (n INTEGER)").unwrap();
        let mut stmt = conn.prepare("INSERT INTO t (n) VALUES (?)").unwrap();

        conn.close().unwrap();

        stmt.bind_at(1, Some("3")).unwrap();
        assert!(matches!(stmt.execute().unwrap(), StatementOutcome::Updated(1)));
        stmt.close().unwrap();
    }

    #[test]
    fn manual_commit_opens_a_transaction_lazily() {
        let mut conn = memory();
        conn.set_autocommit(false).unwrap();
        conn.execute("CREATE TABLE t (n INTEGER)").unwrap();
        assert!(!lock_session(&conn.session).unwrap().conn.is_autocommit());
        conn.commit().unwrap();
        assert!(lock_session(&conn.session).unwrap().conn.is_autocommit());
    }
}
