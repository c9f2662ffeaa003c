//! `SQLite` driver built on rusqlite.
//!
//! - `driver`: opening sessions from [`crate::config::ConnectParams`]
//! - `connection`: the shared session and its transaction handling
//! - `statement`: prepared statements holding their bound values
//! - `query`: row extraction into a [`crate::driver::Cursor`]

mod connection;
mod driver;
mod query;
mod statement;

pub use connection::SqliteConnection;
pub use driver::SqliteDriver;
pub use statement::SqliteStatement;
