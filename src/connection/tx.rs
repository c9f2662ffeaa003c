use tracing::{debug, error};

use super::session::Connection;
use crate::driver::{Driver, DriverConnection};
use crate::error::SqlShimError;

impl<D: Driver> Connection<D> {
    /// Commit the session. The uncommitted-row count resets whether or not the commit succeeds.
    ///
    /// # Errors
    /// Returns [`SqlShimError::Driver`] if the connection is closed or the commit fails.
    pub fn commit(&mut self) -> Result<(), SqlShimError> {
        let pending = std::mem::take(&mut self.uncommitted_rows);
        self.handle_mut()?.commit().map_err(|err| {
            error!("could not commit transaction: {err}");
            SqlShimError::from(err)
        })?;
        debug!(rows = pending, "committed");
        Ok(())
    }

    /// Roll back the session. The uncommitted-row count resets whether or not it succeeds.
    ///
    /// # Errors
    /// Returns [`SqlShimError::Driver`] if the connection is closed or the rollback fails.
    pub fn rollback(&mut self) -> Result<(), SqlShimError> {
        let pending = std::mem::take(&mut self.uncommitted_rows);
        self.handle_mut()?.rollback().map_err(|err| {
            error!("could not roll back transaction: {err}");
            SqlShimError::from(err)
        })?;
        debug!(rows = pending, "rolled back");
        Ok(())
    }

    /// Commit once at least `limit` rows are pending. Returns whether a commit happened.
    ///
    /// # Errors
    /// Same as [`Connection::commit`].
    pub fn commit_if_threshold(&mut self, limit: usize) -> Result<bool, SqlShimError> {
        if self.uncommitted_rows < limit {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }
}
