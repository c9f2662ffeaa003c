//! Synchronous access shim over a relational database.
//!
//! Callers describe rows as unordered column maps; the shim renders them into SQL text,
//! keeps a registry of named prepared statements that survives reconnects, and tracks how
//! much uncommitted work the session holds.
//!
//! ```rust,no_run
//! use sql_shim::prelude::*;
//! use sql_shim::sqlite::SqliteDriver;
//!
//! # fn main() -> Result<(), SqlShimError> {
//! let options = ConnectOptions::builder("people.db").autocommit(false).finish();
//! let mut conn = Connection::connect(SqliteDriver::new(), options)?;
//! conn.insert("people", &ColumnMap::from([("id", "1"), ("name", "O'Brien")]))?;
//! conn.commit()?;
//!
//! let rows = conn.select(
//!     "people",
//!     &ColumnMap::from([("name", "")]),
//!     &ColumnMap::from([("id", "1")]),
//! )?;
//! assert_eq!(rows.results[0].get("name"), Some("O'Brien"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod placeholders;
pub mod prelude;
pub mod prepared;
pub mod query_builder;
pub mod results;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConnectOptions, ConnectOptionsBuilder, ConnectParams};
pub use connection::Connection;
pub use driver::{Cursor, Driver, DriverConnection, DriverStatement, StatementOutcome};
pub use error::{DriverError, SqlShimError};
pub use prepared::{PreparedStatement, PreparedStatementTemplate};
pub use query_builder::SqlBuilder;
pub use results::{QueryResult, ResultRow};
pub use types::{ColumnMap, Dialect, NULL_MARKER, PLACEHOLDER, ResultShape, ValueMode};
