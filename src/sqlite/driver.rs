use std::time::Duration;

use tracing::debug;

use super::connection::SqliteConnection;
use crate::config::ConnectParams;
use crate::driver::Driver;
use crate::error::DriverError;

const MEMORY_URL: &str = ":memory:";

/// Opens rusqlite sessions. The connect URL is a file path or `:memory:`.
#[derive(Debug, Clone)]
pub struct SqliteDriver {
    busy_timeout: Duration,
    wal: bool,
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            wal: true,
        }
    }
}

impl SqliteDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How long a statement waits on another writer before failing with `SQLITE_BUSY`.
    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Whether file databases are switched to WAL journaling on connect.
    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }
}

impl Driver for SqliteDriver {
    type Conn = SqliteConnection;

    fn connect(&self, params: &ConnectParams) -> Result<SqliteConnection, DriverError> {
        let conn = if params.url == MEMORY_URL {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open(&params.url)?
        };
        conn.busy_timeout(self.busy_timeout)?;
        if self.wal && params.url != MEMORY_URL {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        debug!(url = %params.url, wal = self.wal, "opened sqlite database");
        Ok(SqliteConnection::new(conn))
    }
}
