use std::fmt;

use tracing::warn;

use super::PreparedStatementTemplate;
use crate::driver::{DriverConnection, DriverStatement, StatementOutcome};
use crate::error::{DriverError, SqlShimError};
use crate::placeholders::count_placeholders;
use crate::query_builder::SqlBuilder;
use crate::types::{ColumnMap, NULL_MARKER, ResultShape, ValueMode};

/// One parameterised statement: its template SQL, its parameter order, and the driver handle
/// it is currently prepared on.
///
/// The SQL and order outlive any connection; only the handle is replaced on reconnect.
pub struct PreparedStatement<S> {
    name: String,
    sql: String,
    param_columns: Option<Vec<String>>,
    shape: ResultShape,
    num_parameters: usize,
    handle: Option<S>,
}

impl<S> PreparedStatement<S> {
    /// Validate a template. An explicit parameter list must name exactly one column per
    /// placeholder; placeholders inside quoted literals do not count.
    ///
    /// # Errors
    /// Returns [`SqlShimError::ParameterCountMismatch`] on a count mismatch and
    /// [`SqlShimError::InvalidArgument`] for a blank name or SQL.
    pub fn from_template(template: PreparedStatementTemplate) -> Result<Self, SqlShimError> {
        let PreparedStatementTemplate {
            name,
            sql,
            param_columns,
            shape,
        } = template;
        check_not_blank("statement name", &name)?;
        check_not_blank("statement SQL", &sql)?;

        let num_parameters = count_placeholders(&sql);
        if let Some(columns) = &param_columns
            && columns.len() != num_parameters
        {
            return Err(SqlShimError::ParameterCountMismatch {
                name,
                expected: num_parameters,
                found: columns.len(),
            });
        }

        Ok(Self {
            name,
            sql,
            param_columns,
            shape,
            num_parameters,
            handle: None,
        })
    }

    /// Build an `INSERT` from a column map whose values are either `?` (bound later) or SQL
    /// constants embedded as given. Parameters bind in sorted column order.
    ///
    /// # Errors
    /// Returns [`SqlShimError::EmptyColumns`] if `cols` is empty and
    /// [`SqlShimError::InvalidArgument`] for a blank name.
    pub fn for_insert(
        name: impl Into<String>,
        table: &str,
        cols: &ColumnMap,
    ) -> Result<Self, SqlShimError> {
        let name = name.into();
        check_not_blank("statement name", &name)?;
        let sql = SqlBuilder::new(table)
            .mode(ValueMode::PreEncoded)
            .insert(cols)?;
        let num_parameters = count_placeholders(&sql);

        Ok(Self {
            name,
            sql,
            param_columns: None,
            shape: ResultShape::Columns,
            num_parameters,
            handle: None,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameterised SQL the statement is prepared from.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Explicit parameter order, or `None` when values bind in sorted key order.
    #[must_use]
    pub fn parameter_order(&self) -> Option<&[String]> {
        self.param_columns.as_deref()
    }

    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.num_parameters
    }

    #[must_use]
    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Whether a live driver handle is attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// Resolve `values` into positional order, without touching the driver.
    fn ordered_values<'v>(&self, values: &'v ColumnMap) -> Result<Vec<&'v str>, SqlShimError> {
        if values.len() != self.num_parameters {
            return Err(SqlShimError::ParameterCountMismatch {
                name: self.name.clone(),
                expected: self.num_parameters,
                found: values.len(),
            });
        }

        match &self.param_columns {
            Some(columns) => columns
                .iter()
                .map(|column| {
                    values.get(column).ok_or_else(|| {
                        SqlShimError::InvalidArgument(format!(
                            "prepared statement {}: no value for parameter column {column}",
                            self.name
                        ))
                    })
                })
                .collect(),
            None => Ok(values.iter().map(|(_, value)| value).collect()),
        }
    }
}

impl<S: DriverStatement> PreparedStatement<S> {
    /// Prepare on `conn`, replacing any handle from an earlier connection.
    ///
    /// # Errors
    /// Returns [`DriverError`] if the driver cannot prepare the SQL; the previous handle, if
    /// any, is kept in that case.
    pub fn bind<C>(&mut self, conn: &mut C) -> Result<(), DriverError>
    where
        C: DriverConnection<Stmt = S>,
    {
        let fresh = conn.prepare(&self.sql)?;
        if let Some(stale) = self.handle.replace(fresh)
            && let Err(err) = stale.close()
        {
            warn!(statement = %self.name, "could not release previous statement handle: {err}");
        }
        Ok(())
    }

    /// Bind `values` to their positions and execute.
    ///
    /// `values` must hold exactly one entry per parameter. The null marker binds SQL `NULL`.
    ///
    /// # Errors
    /// Returns [`SqlShimError::ParameterCountMismatch`] or [`SqlShimError::InvalidArgument`]
    /// before any bind happens, and [`SqlShimError::Driver`] if the statement is not bound or
    /// the driver fails.
    pub fn bind_and_run(&mut self, values: &ColumnMap) -> Result<StatementOutcome, SqlShimError> {
        let ordered = self.ordered_values(values)?;
        let handle = self.handle.as_mut().ok_or_else(|| {
            DriverError::new(format!(
                "prepared statement {} is not bound to a connection",
                self.name
            ))
        })?;

        for (idx, value) in ordered.into_iter().enumerate() {
            let value = (value != NULL_MARKER).then_some(value);
            handle.bind_at(idx + 1, value)?;
        }
        Ok(handle.execute()?)
    }

    /// Release the driver handle. Closing an unbound statement is a no-op.
    ///
    /// # Errors
    /// Returns [`DriverError`] if the driver reports a failure; the handle is dropped anyway.
    pub fn close(&mut self) -> Result<(), DriverError> {
        match self.handle.take() {
            Some(handle) => handle.close(),
            None => Ok(()),
        }
    }
}

impl<S> fmt::Debug for PreparedStatement<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("name", &self.name)
            .field("sql", &self.sql)
            .field("param_columns", &self.param_columns)
            .field("shape", &self.shape)
            .field("num_parameters", &self.num_parameters)
            .field("bound", &self.handle.is_some())
            .finish()
    }
}

fn check_not_blank(what: &str, value: &str) -> Result<(), SqlShimError> {
    if value.trim().is_empty() {
        Err(SqlShimError::InvalidArgument(format!("{what} is empty")))
    } else {
        Ok(())
    }
}
