//! Convenient imports for common functionality.

pub use crate::config::{ConnectOptions, ConnectOptionsBuilder, ConnectParams};
pub use crate::connection::Connection;
pub use crate::driver::{Driver, DriverConnection, DriverStatement};
pub use crate::encoder::encode_value;
pub use crate::error::{DriverError, SqlShimError};
pub use crate::prepared::{PreparedStatement, PreparedStatementTemplate};
pub use crate::query_builder::SqlBuilder;
pub use crate::results::{QueryResult, ResultRow};
pub use crate::types::{ColumnMap, Dialect, ResultShape, ValueMode};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteDriver;
