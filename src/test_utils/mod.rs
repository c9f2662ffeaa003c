//! In-process driver for exercising the shim without a database.
//!
//! [`ScriptedDriver`] records every call it sees and can be told to fail or to return canned
//! rows. Clones share one script, so a test keeps a clone to inspect what happened after
//! handing the other to a [`crate::Connection`].

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ConnectParams;
use crate::driver::{Cursor, Driver, DriverConnection, DriverStatement, StatementOutcome};
use crate::error::DriverError;
use crate::placeholders::count_placeholders;
use crate::types::Dialect;

/// Canned rows returned for SQL containing `pattern`.
#[derive(Debug, Clone)]
struct Response {
    pattern: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Everything the scripted driver has been asked to do, plus what it was told to do next.
#[derive(Debug)]
pub struct ScriptState {
    pub dialect: Dialect,
    pub connects: usize,
    pub closes: usize,
    pub autocommit: Option<bool>,
    /// SQL passed to `execute`, in order.
    pub executed: Vec<String>,
    /// SQL passed to `query`, in order.
    pub queried: Vec<String>,
    /// SQL passed to `prepare`, in order.
    pub prepared: Vec<String>,
    /// Prepared statement runs with their bound values.
    pub runs: Vec<(String, Vec<Option<String>>)>,
    pub statements_closed: usize,
    pub commits: usize,
    pub rollbacks: usize,
    /// Update count reported for non-query statements.
    pub update_count: usize,
    fail_next_connect: Option<DriverError>,
    fail_statement_close: bool,
    failures: Vec<(String, DriverError)>,
    responses: Vec<Response>,
}

impl ScriptState {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            connects: 0,
            closes: 0,
            autocommit: None,
            executed: Vec::new(),
            queried: Vec::new(),
            prepared: Vec::new(),
            runs: Vec::new(),
            statements_closed: 0,
            commits: 0,
            rollbacks: 0,
            update_count: 1,
            fail_next_connect: None,
            fail_statement_close: false,
            failures: Vec::new(),
            responses: Vec::new(),
        }
    }

    fn check(&self, sql: &str) -> Result<(), DriverError> {
        match self.failures.iter().find(|(pattern, _)| sql.contains(pattern.as_str())) {
            Some((_, err)) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn rows_for(&self, sql: &str) -> Cursor {
        self.responses
            .iter()
            .rev()
            .find(|r| sql.contains(r.pattern.as_str()))
            .map(|r| Cursor::new(r.columns.clone(), r.rows.clone()))
            .unwrap_or_default()
    }
}

type SharedScript = Arc<Mutex<ScriptState>>;

fn lock(script: &SharedScript) -> MutexGuard<'_, ScriptState> {
    script.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn is_query(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    script: SharedScript,
}

impl ScriptedDriver {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            script: Arc::new(Mutex::new(ScriptState::new(dialect))),
        }
    }

    /// Inspect or adjust the shared script.
    pub fn state(&self) -> MutexGuard<'_, ScriptState> {
        lock(&self.script)
    }

    /// Make the next `connect` call fail with `err`.
    pub fn fail_next_connect(&self, err: DriverError) {
        self.state().fail_next_connect = Some(err);
    }

    /// Fail any execute, query, prepare or statement run whose SQL contains `pattern`.
    pub fn fail_when(&self, pattern: impl Into<String>, err: DriverError) {
        self.state().failures.push((pattern.into(), err));
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Make statement handles fail to close.
    pub fn fail_statement_close(&self, fail: bool) {
        self.state().fail_statement_close = fail;
    }

    /// Return `rows` for queries whose SQL contains `pattern`. Later responses win.
    pub fn respond_with<C, R>(&self, pattern: impl Into<String>, columns: C, rows: R)
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = Vec<Option<String>>>,
    {
        self.state().responses.push(Response {
            pattern: pattern.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.into_iter().collect(),
        });
    }
}

impl Driver for ScriptedDriver {
    type Conn = ScriptedConnection;

    fn connect(&self, _params: &ConnectParams) -> Result<ScriptedConnection, DriverError> {
        let mut state = self.state();
        if let Some(err) = state.fail_next_connect.take() {
            return Err(err);
        }
        state.connects += 1;
        Ok(ScriptedConnection {
            script: Arc::clone(&self.script),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedConnection {
    script: SharedScript,
}

impl DriverConnection for ScriptedConnection {
    type Stmt = ScriptedStatement;

    fn dialect(&self) -> Dialect {
        lock(&self.script).dialect
    }

    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), DriverError> {
        lock(&self.script).autocommit = Some(autocommit);
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<usize, DriverError> {
        let mut state = lock(&self.script);
        state.executed.push(sql.to_string());
        state.check(sql)?;
        Ok(state.update_count)
    }

    fn query(&mut self, sql: &str) -> Result<Cursor, DriverError> {
        let mut state = lock(&self.script);
        state.queried.push(sql.to_string());
        state.check(sql)?;
        Ok(state.rows_for(sql))
    }

    fn prepare(&mut self, sql: &str) -> Result<ScriptedStatement, DriverError> {
        let mut state = lock(&self.script);
        state.prepared.push(sql.to_string());
        state.check(sql)?;
        Ok(ScriptedStatement {
            script: Arc::clone(&self.script),
            sql: sql.to_string(),
            values: vec![None; count_placeholders(sql)],
        })
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        let mut state = lock(&self.script);
        state.commits += 1;
        state.check("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        let mut state = lock(&self.script);
        state.rollbacks += 1;
        state.check("ROLLBACK")
    }

    fn close(self) -> Result<(), DriverError> {
        lock(&self.script).closes += 1;
        Ok(())
    }
}

#[derive(Debug)]
pub struct ScriptedStatement {
    script: SharedScript,
    sql: String,
    values: Vec<Option<String>>,
}

impl DriverStatement for ScriptedStatement {
    fn bind_at(&mut self, position: usize, value: Option<&str>) -> Result<(), DriverError> {
        let slot = position
            .checked_sub(1)
            .and_then(|idx| self.values.get_mut(idx))
            .ok_or_else(|| DriverError::new(format!("invalid parameter index {position}")))?;
        *slot = value.map(str::to_string);
        Ok(())
    }

    fn execute(&mut self) -> Result<StatementOutcome, DriverError> {
        let mut state = lock(&self.script);
        state.runs.push((self.sql.clone(), self.values.clone()));
        state.check(&self.sql)?;
        if is_query(&self.sql) {
            Ok(StatementOutcome::Rows(state.rows_for(&self.sql)))
        } else {
            Ok(StatementOutcome::Updated(state.update_count))
        }
    }

    fn close(self) -> Result<(), DriverError> {
        let mut state = lock(&self.script);
        state.statements_closed += 1;
        if state.fail_statement_close {
            return Err(DriverError::new("statement close failed"));
        }
        Ok(())
    }
}
