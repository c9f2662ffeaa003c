use thiserror::Error;

/// Failure reported by the database driver, with its native code when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", .code.map(|c| format!(" (code {c})")).unwrap_or_default())]
pub struct DriverError {
    /// Vendor error code (e.g. Oracle `54`, SQLite extended result code).
    pub code: Option<i64>,
    pub message: String,
}

impl DriverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        let code = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => Some(i64::from(failure.extended_code)),
            _ => None,
        };
        DriverError {
            code,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SqlShimError {
    #[error("SELECT on {0} has no projected columns")]
    EmptyProjection(String),

    #[error("{0}: column list is empty")]
    EmptyColumns(String),

    #[error("{0}: qualifier list is empty")]
    EmptyQualifier(String),

    #[error("prepared statement {name}: expected {expected} parameters, found {found}")]
    ParameterCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("prepared statement {0} does not exist")]
    UnknownStatement(String),

    #[error("row in {table} is already locked")]
    RowLocked { table: String, source: DriverError },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SqlShimError {
    /// Native driver code carried by this error, if any.
    #[must_use]
    pub fn driver_code(&self) -> Option<i64> {
        match self {
            SqlShimError::Driver(err) | SqlShimError::RowLocked { source: err, .. } => err.code,
            _ => None,
        }
    }

    pub(crate) fn closed() -> Self {
        SqlShimError::Driver(DriverError::new("connection is closed"))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for SqlShimError {
    fn from(err: rusqlite::Error) -> Self {
        SqlShimError::Driver(err.into())
    }
}
