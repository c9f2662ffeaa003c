//! The boundary between the shim and a concrete database client.
//!
//! A driver only needs to open connections, run SQL text, prepare statements with 1-based
//! positional parameters, and hand rows back as strings. Everything else (SQL generation,
//! parameter ordering, the statement registry, reconnects) lives above this seam.

use crate::config::ConnectParams;
use crate::error::DriverError;
use crate::types::Dialect;

/// Opens connections from remembered parameters.
pub trait Driver {
    type Conn: DriverConnection;

    /// # Errors
    /// Returns [`DriverError`] if the database cannot be reached or refuses the login.
    fn connect(&self, params: &ConnectParams) -> Result<Self::Conn, DriverError>;
}

/// A live database session.
pub trait DriverConnection {
    type Stmt: DriverStatement;

    /// Dialect detected from the session's metadata.
    fn dialect(&self) -> Dialect;

    /// # Errors
    /// Returns [`DriverError`] if the session rejects the mode change.
    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), DriverError>;

    /// Run a statement that does not return rows; returns the update count.
    ///
    /// # Errors
    /// Returns [`DriverError`] on any execution failure.
    fn execute(&mut self, sql: &str) -> Result<usize, DriverError>;

    /// Run a row-producing statement.
    ///
    /// # Errors
    /// Returns [`DriverError`] on any execution failure.
    fn query(&mut self, sql: &str) -> Result<Cursor, DriverError>;

    /// # Errors
    /// Returns [`DriverError`] if the SQL cannot be prepared.
    fn prepare(&mut self, sql: &str) -> Result<Self::Stmt, DriverError>;

    /// # Errors
    /// Returns [`DriverError`] if the commit fails.
    fn commit(&mut self) -> Result<(), DriverError>;

    /// # Errors
    /// Returns [`DriverError`] if the rollback fails.
    fn rollback(&mut self) -> Result<(), DriverError>;

    /// Release the session.
    ///
    /// # Errors
    /// Returns [`DriverError`] if the session did not shut down cleanly; it is gone either way.
    fn close(self) -> Result<(), DriverError>;
}

/// A driver-native prepared statement.
pub trait DriverStatement {
    /// Bind `value` to 1-based `position`; `None` binds SQL `NULL`.
    ///
    /// # Errors
    /// Returns [`DriverError`] if the position is out of range for the statement.
    fn bind_at(&mut self, position: usize, value: Option<&str>) -> Result<(), DriverError>;

    /// Run with the currently bound values.
    ///
    /// # Errors
    /// Returns [`DriverError`] on any execution failure.
    fn execute(&mut self) -> Result<StatementOutcome, DriverError>;

    /// # Errors
    /// Returns [`DriverError`] if the driver fails to release the statement.
    fn close(self) -> Result<(), DriverError>;
}

/// What running a prepared statement produced.
#[derive(Debug)]
pub enum StatementOutcome {
    Updated(usize),
    Rows(Cursor),
}

/// Rows fetched from the driver, column names in result order.
///
/// Fully buffered: no driver resources stay open once a cursor exists.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Option<String>>>,
}

impl Cursor {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<Option<String>>>) {
        (self.columns, self.rows.collect())
    }
}

impl Iterator for Cursor {
    type Item = Vec<Option<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}
