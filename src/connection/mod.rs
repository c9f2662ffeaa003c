//! A single database session plus the registry of named prepared statements bound to it.

mod dml;
mod prepared;
mod select;
mod session;
mod tx;

pub use session::Connection;
