use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::config::ConnectOptions;
use crate::driver::{Driver, DriverConnection};
use crate::error::{DriverError, SqlShimError};
use crate::prepared::PreparedStatement;
use crate::types::{Dialect, ValueMode};

pub(super) type StmtOf<D> = <<D as Driver>::Conn as DriverConnection>::Stmt;

/// Connection wrapper holding the live driver session, the parameters needed to reopen it,
/// and the prepared statements registered against it.
///
/// All state is plain mutable data: share a `Connection` across threads only behind a lock.
pub struct Connection<D: Driver> {
    pub(super) driver: D,
    pub(super) options: ConnectOptions,
    pub(super) handle: Option<D::Conn>,
    pub(super) dialect: Dialect,
    pub(super) uncommitted_rows: usize,
    pub(super) date_format: Option<String>,
    pub(super) last_sql: Option<String>,
    pub(super) statements: HashMap<String, PreparedStatement<StmtOf<D>>>,
}

impl<D: Driver> Connection<D> {
    /// Open a session, apply the configured date format, and register every statement listed
    /// in `options`.
    ///
    /// # Errors
    /// Returns [`SqlShimError::Driver`] if the session cannot be opened or configured, and any
    /// template validation error for the listed statements.
    pub fn connect(driver: D, mut options: ConnectOptions) -> Result<Self, SqlShimError> {
        let templates = std::mem::take(&mut options.statements);
        let date_format = options.date_format.take();

        let mut conn = Connection {
            driver,
            options,
            handle: None,
            dialect: Dialect::default(),
            uncommitted_rows: 0,
            date_format: None,
            last_sql: None,
            statements: HashMap::new(),
        };
        conn.open()?;

        if let Some(format) = date_format {
            conn.set_date_format(&format)?;
        }
        for template in templates {
            conn.prepare_statement(template)?;
        }
        Ok(conn)
    }

    fn open(&mut self) -> Result<(), SqlShimError> {
        let params = &self.options.params;
        let mut handle = self.driver.connect(params).map_err(|err| {
            error!(url = %params.url, "could not connect: {err}");
            err
        })?;
        if let Err(err) = handle.set_autocommit(self.options.autocommit) {
            error!(url = %params.url, "could not set autocommit: {err}");
            if let Err(close_err) = handle.close() {
                warn!("could not close half-open session: {close_err}");
            }
            return Err(err.into());
        }

        self.dialect = self
            .options
            .dialect
            .unwrap_or_else(|| handle.dialect());
        match &params.user {
            Some(user) => info!(url = %params.url, %user, "connected"),
            None => info!(url = %params.url, "connected"),
        }
        debug!(dialect = ?self.dialect, autocommit = self.options.autocommit, "session settings");
        self.handle = Some(handle);
        Ok(())
    }

    /// Re-establish the session from the remembered parameters, re-prepare every registered
    /// statement on it, and reissue the remembered date format.
    ///
    /// Any open session is released first and uncommitted work is lost. There is no retry:
    /// on failure the connection is left closed.
    ///
    /// # Errors
    /// Returns [`SqlShimError::Driver`] if reconnecting or re-preparing fails.
    pub fn reconnect(&mut self) -> Result<(), SqlShimError> {
        self.release();
        self.uncommitted_rows = 0;

        let reopened = self.open().and_then(|()| {
            self.reinstate_statements()?;
            if let Some(format) = self.date_format.clone() {
                self.apply_date_format(&format)?;
            }
            Ok(())
        });
        if let Err(err) = reopened {
            self.release();
            return Err(err);
        }
        Ok(())
    }

    /// Close every prepared statement, then the session. Failures are logged and skipped so
    /// teardown always completes. Registrations survive for a later [`Connection::reconnect`].
    pub fn close(&mut self) {
        if self.handle.is_none() {
            return;
        }
        self.release();
        info!(url = %self.options.params.url, "closed connection");
    }

    pub(super) fn release(&mut self) {
        self.close_statements();
        if let Some(handle) = self.handle.take()
            && let Err(err) = handle.close()
        {
            warn!(url = %self.options.params.url, "could not properly close connection: {err}");
        }
    }

    /// Remember `format` and apply it to the session where the dialect has a directive for it.
    ///
    /// # Errors
    /// Returns [`SqlShimError::InvalidArgument`] for a blank format and
    /// [`SqlShimError::Driver`] if the session rejects it.
    pub fn set_date_format(&mut self, format: &str) -> Result<(), SqlShimError> {
        if format.trim().is_empty() {
            return Err(SqlShimError::InvalidArgument("date format is empty".into()));
        }
        self.date_format = Some(format.to_string());
        self.apply_date_format(format)
    }

    fn apply_date_format(&mut self, format: &str) -> Result<(), SqlShimError> {
        let Some(directive) = self.dialect.date_format_directive(format) else {
            debug!(dialect = ?self.dialect, "no session date format directive; remembered {format}");
            return Ok(());
        };
        self.record_sql(&directive);
        self.handle_mut()?.execute(&directive).map_err(|err| {
            error!("could not set date format: {err}");
            SqlShimError::from(err)
        })?;
        Ok(())
    }

    pub(super) fn handle_mut(&mut self) -> Result<&mut D::Conn, SqlShimError> {
        self.handle.as_mut().ok_or_else(SqlShimError::closed)
    }

    pub(super) fn record_sql(&mut self, sql: &str) {
        debug!("sql: {sql}");
        self.last_sql = Some(sql.to_string());
    }

    /// Log and convert a failed statement.
    pub(super) fn failed(what: &str, sql: &str, err: DriverError) -> SqlShimError {
        error!("{what} failed: {err}; sql was: {sql}");
        err.into()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn autocommit(&self) -> bool {
        self.options.autocommit
    }

    /// How ad-hoc statements render values.
    #[must_use]
    pub fn value_mode(&self) -> ValueMode {
        self.options.value_mode
    }

    #[must_use]
    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    /// Rows changed since the last commit or rollback.
    #[must_use]
    pub fn uncommitted_rows(&self) -> usize {
        self.uncommitted_rows
    }

    /// SQL text of the most recent statement built or prepared.
    #[must_use]
    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    /// Driver code that means "row already locked" for this session.
    #[must_use]
    pub fn lock_conflict_code(&self) -> Option<i64> {
        self.options
            .lock_conflict_code
            .or_else(|| self.dialect.default_lock_conflict_code())
    }
}

impl<D: Driver> Drop for Connection<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: Driver> std::fmt::Debug for Connection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.statements.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Connection")
            .field("params", &self.options.params)
            .field("open", &self.handle.is_some())
            .field("dialect", &self.dialect)
            .field("uncommitted_rows", &self.uncommitted_rows)
            .field("statements", &names)
            .finish()
    }
}
