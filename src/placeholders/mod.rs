mod scanner;

use scanner::scan_placeholders;

/// Number of positional `?` placeholders in `sql`.
///
/// Question marks inside single-quoted string constants are data, not parameters:
/// ```rust
/// use sql_shim::placeholders::count_placeholders;
///
/// assert_eq!(count_placeholders("SELECT a FROM t WHERE b = ? AND c = 'why?'"), 1);
/// ```
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    scan_placeholders(sql, |_| count += 1);
    count
}
