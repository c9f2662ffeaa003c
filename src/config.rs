use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SqlShimError;
use crate::prepared::PreparedStatementTemplate;
use crate::types::{Dialect, ValueMode};

/// What a driver needs to (re)open a session. Opaque to the shim itself.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
    /// Driver-specific location, e.g. a file path for `SQLite`.
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ConnectParams {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
        }
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Options for opening a [`crate::Connection`].
///
/// ```rust
/// use sql_shim::prelude::*;
///
/// let options = ConnectOptions::from_json_str(r#"{
///     "url": "orders.db",
///     "autocommit": false,
///     "statements": [
///         {"name": "by_id", "sql": "SELECT * FROM orders WHERE id = ?", "params": ["id"]}
///     ]
/// }"#).unwrap();
/// assert!(!options.autocommit);
/// assert_eq!(options.statements.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectOptions {
    #[serde(flatten)]
    pub params: ConnectParams,
    /// When false, work accumulates until `commit`.
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    /// Overrides the dialect the driver reports.
    #[serde(default)]
    pub dialect: Option<Dialect>,
    /// How ad-hoc statements render values.
    #[serde(default)]
    pub value_mode: ValueMode,
    /// Session date format applied on connect and after every reconnect.
    #[serde(default)]
    pub date_format: Option<String>,
    /// Driver code meaning "row already locked"; defaults to the dialect's.
    #[serde(default)]
    pub lock_conflict_code: Option<i64>,
    /// Statements registered as soon as the connection opens.
    #[serde(default)]
    pub statements: Vec<PreparedStatementTemplate>,
}

fn default_autocommit() -> bool {
    true
}

impl ConnectOptions {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            params: ConnectParams::new(url),
            autocommit: true,
            dialect: None,
            value_mode: ValueMode::default(),
            date_format: None,
            lock_conflict_code: None,
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub fn builder(url: impl Into<String>) -> ConnectOptionsBuilder {
        ConnectOptionsBuilder::new(url)
    }

    /// Parse options from JSON.
    ///
    /// # Errors
    /// Returns [`SqlShimError::ConfigError`] if the JSON is malformed or has the wrong shape.
    pub fn from_json_str(json: &str) -> Result<Self, SqlShimError> {
        serde_json::from_str(json)
            .map_err(|e| SqlShimError::ConfigError(format!("invalid connection options: {e}")))
    }

    /// Read options from a JSON file.
    ///
    /// # Errors
    /// Returns [`SqlShimError::ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SqlShimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SqlShimError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }
}

/// Fluent builder for [`ConnectOptions`].
#[derive(Debug, Clone)]
pub struct ConnectOptionsBuilder {
    opts: ConnectOptions,
}

impl ConnectOptionsBuilder {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            opts: ConnectOptions::new(url),
        }
    }

    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.opts.params.user = Some(user.into());
        self.opts.params.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.opts.autocommit = autocommit;
        self
    }

    #[must_use]
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.opts.dialect = Some(dialect);
        self
    }

    #[must_use]
    pub fn value_mode(mut self, mode: ValueMode) -> Self {
        self.opts.value_mode = mode;
        self
    }

    #[must_use]
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.opts.date_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn lock_conflict_code(mut self, code: i64) -> Self {
        self.opts.lock_conflict_code = Some(code);
        self
    }

    #[must_use]
    pub fn statement(mut self, template: PreparedStatementTemplate) -> Self {
        self.opts.statements.push(template);
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectOptions {
        self.opts
    }
}
