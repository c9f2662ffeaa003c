mod result_set;
mod row;

pub use result_set::QueryResult;
pub use row::ResultRow;
