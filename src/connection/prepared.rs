use tracing::{debug, error, info, warn};

use super::session::{Connection, StmtOf};
use crate::driver::{Driver, StatementOutcome};
use crate::error::SqlShimError;
use crate::prepared::{PreparedStatement, PreparedStatementTemplate};
use crate::results::QueryResult;
use crate::types::{ColumnMap, ResultShape};

impl<D: Driver> Connection<D> {
    /// Register a statement from a template and prepare it on the live session.
    ///
    /// Registering a name that already exists is a no-op, so startup paths can register
    /// unconditionally. Returns whether a new statement was created.
    ///
    /// # Errors
    /// Returns [`SqlShimError::ParameterCountMismatch`] for an invalid template and
    /// [`SqlShimError::Driver`] if the connection is closed or the driver cannot prepare it.
    pub fn prepare_statement(
        &mut self,
        template: PreparedStatementTemplate,
    ) -> Result<bool, SqlShimError> {
        if self.statements.contains_key(&template.name) {
            debug!(statement = %template.name, "already prepared");
            return Ok(false);
        }
        let stmt = PreparedStatement::from_template(template)?;
        self.register(stmt)?;
        Ok(true)
    }

    /// Register an `INSERT` built from `cols`, where `?` values become parameters and any
    /// other value is embedded as a SQL constant. Parameters bind in sorted column order.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyColumns`] if `cols` is empty and
    /// [`SqlShimError::Driver`] if the connection is closed or preparing fails.
    pub fn prepare_insert(
        &mut self,
        name: &str,
        table: &str,
        cols: &ColumnMap,
    ) -> Result<bool, SqlShimError> {
        if self.statements.contains_key(name) {
            debug!(statement = %name, "already prepared");
            return Ok(false);
        }
        let stmt = PreparedStatement::for_insert(name, table, cols)?;
        self.register(stmt)?;
        Ok(true)
    }

    fn register(&mut self, mut stmt: PreparedStatement<StmtOf<D>>) -> Result<(), SqlShimError> {
        self.record_sql(stmt.sql());
        let handle = self.handle.as_mut().ok_or_else(SqlShimError::closed)?;
        stmt.bind(handle).map_err(|err| {
            error!(statement = %stmt.name(), "could not prepare statement: {err}");
            SqlShimError::from(err)
        })?;
        info!(statement = %stmt.name(), "created prepared statement");
        self.statements.insert(stmt.name().to_string(), stmt);
        Ok(())
    }

    fn run_prepared(
        &mut self,
        name: &str,
        values: &ColumnMap,
    ) -> Result<(StatementOutcome, ResultShape), SqlShimError> {
        let stmt = self
            .statements
            .get_mut(name)
            .ok_or_else(|| SqlShimError::UnknownStatement(name.to_string()))?;
        let outcome = stmt.bind_and_run(values).map_err(|err| {
            error!(statement = %name, "could not execute prepared statement: {err}");
            err
        })?;
        debug!(statement = %name, "executed prepared statement");
        Ok((outcome, stmt.shape()))
    }

    /// Execute a registered statement and return the number of rows it changed, which is
    /// added to the uncommitted-row count. For a row-producing statement this is the number of
    /// rows returned, and nothing is added.
    ///
    /// # Errors
    /// Returns [`SqlShimError::UnknownStatement`] for an unregistered name,
    /// [`SqlShimError::ParameterCountMismatch`] when `values` has the wrong size, and
    /// [`SqlShimError::Driver`] if execution fails.
    pub fn execute_prepared(
        &mut self,
        name: &str,
        values: &ColumnMap,
    ) -> Result<usize, SqlShimError> {
        match self.run_prepared(name, values)? {
            (StatementOutcome::Updated(count), _) => {
                self.uncommitted_rows += count;
                Ok(count)
            }
            (StatementOutcome::Rows(cursor), _) => Ok(cursor.count()),
        }
    }

    /// Execute a registered statement and collect its rows, tagged with the statement's shape.
    ///
    /// # Errors
    /// Same as [`Connection::execute_prepared`].
    pub fn query_prepared(
        &mut self,
        name: &str,
        values: &ColumnMap,
    ) -> Result<QueryResult, SqlShimError> {
        match self.run_prepared(name, values)? {
            (StatementOutcome::Rows(cursor), shape) => Ok(QueryResult::from_cursor(cursor, shape)),
            (StatementOutcome::Updated(count), shape) => {
                self.uncommitted_rows += count;
                Ok(QueryResult::affected(count, shape))
            }
        }
    }

    /// Prepare a registered statement again on the current session.
    ///
    /// # Errors
    /// Returns [`SqlShimError::UnknownStatement`] for an unregistered name and
    /// [`SqlShimError::Driver`] if the connection is closed or preparing fails.
    pub fn reinstate_statement(&mut self, name: &str) -> Result<(), SqlShimError> {
        let handle = self.handle.as_mut().ok_or_else(SqlShimError::closed)?;
        let stmt = self
            .statements
            .get_mut(name)
            .ok_or_else(|| SqlShimError::UnknownStatement(name.to_string()))?;
        stmt.bind(handle).map_err(|err| {
            error!(statement = %name, "could not re-instate prepared statement: {err}");
            SqlShimError::from(err)
        })?;
        info!(statement = %name, "re-instated prepared statement");
        Ok(())
    }

    /// Prepare every registered statement on the current session.
    ///
    /// # Errors
    /// Stops at the first statement the driver rejects.
    pub fn reinstate_statements(&mut self) -> Result<(), SqlShimError> {
        let handle = self.handle.as_mut().ok_or_else(SqlShimError::closed)?;
        for (name, stmt) in &mut self.statements {
            stmt.bind(handle).map_err(|err| {
                error!(statement = %name, "could not re-instate prepared statement: {err}");
                SqlShimError::from(err)
            })?;
            info!(statement = %name, "re-instated prepared statement");
        }
        Ok(())
    }

    /// Release one statement's driver handle, keeping it registered.
    ///
    /// # Errors
    /// Returns [`SqlShimError::UnknownStatement`] for an unregistered name and
    /// [`SqlShimError::Driver`] if the driver reports a failure.
    pub fn close_statement(&mut self, name: &str) -> Result<(), SqlShimError> {
        let stmt = self
            .statements
            .get_mut(name)
            .ok_or_else(|| SqlShimError::UnknownStatement(name.to_string()))?;
        stmt.close().map_err(|err| {
            error!(statement = %name, "could not close prepared statement: {err}");
            SqlShimError::from(err)
        })?;
        info!(statement = %name, "closed prepared statement");
        Ok(())
    }

    /// Release every statement handle; failures are logged and skipped.
    pub fn close_statements(&mut self) {
        for (name, stmt) in &mut self.statements {
            if let Err(err) = stmt.close() {
                warn!(statement = %name, "could not close prepared statement: {err}");
            }
        }
    }

    /// Close and unregister a statement. Returns whether it was registered.
    pub fn remove_statement(&mut self, name: &str) -> bool {
        let Some(mut stmt) = self.statements.remove(name) else {
            return false;
        };
        if let Err(err) = stmt.close() {
            warn!(statement = %name, "could not close prepared statement: {err}");
        }
        info!(statement = %name, "removed prepared statement");
        true
    }

    #[must_use]
    pub fn statement(&self, name: &str) -> Option<&PreparedStatement<StmtOf<D>>> {
        self.statements.get(name)
    }

    /// Registered statement names, sorted.
    #[must_use]
    pub fn statement_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.statements.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
