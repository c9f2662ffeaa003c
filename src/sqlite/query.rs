use rusqlite::types::Value;

use crate::driver::Cursor;
use crate::error::DriverError;

/// Render one column of a row as the shim's string form; `NULL` stays `None`.
///
/// # Errors
/// Returns [`DriverError`] if the column cannot be read.
pub(super) fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<Option<String>, DriverError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    })
}

/// Run `stmt` with `params` and buffer every row.
///
/// # Errors
/// Returns [`DriverError`] if the query or any column read fails.
pub(super) fn build_cursor(
    stmt: &mut rusqlite::Statement<'_>,
    params: &[Option<String>],
) -> Result<Cursor, DriverError> {
    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = columns.len();

    let mut rows_iter = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        let mut values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            values.push(extract_value(row, idx)?);
        }
        rows.push(values);
    }
    Ok(Cursor::new(columns, rows))
}
