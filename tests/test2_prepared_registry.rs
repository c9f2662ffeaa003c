use sql_shim::prelude::*;
use sql_shim::test_utils::ScriptedDriver;

const BY_ID: &str = "SELECT name FROM people WHERE id = ?";
const RENAME: &str = "UPDATE people SET name = ? WHERE id = ?";

fn open(driver: &ScriptedDriver, options: ConnectOptions) -> Connection<ScriptedDriver> {
    Connection::connect(driver.clone(), options).unwrap()
}

fn manual_commit() -> ConnectOptions {
    ConnectOptions::builder("scripted").autocommit(false).finish()
}

fn rename_template() -> PreparedStatementTemplate {
    PreparedStatementTemplate::new("rename", RENAME).with_param_columns(["name", "id"])
}

#[test]
fn prepare_is_idempotent_per_name() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());

    assert!(conn.prepare_statement(rename_template())?);
    assert!(!conn.prepare_statement(PreparedStatementTemplate::new("rename", "DELETE FROM x"))?);
    assert_eq!(driver.state().prepared, vec![RENAME.to_string()]);
    assert_eq!(conn.statement("rename").map(PreparedStatement::sql), Some(RENAME));
    assert_eq!(driver.state().autocommit, Some(false));
    Ok(())
}

#[test]
fn statements_listed_in_options_are_registered_on_connect() {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let options = ConnectOptions::from_json_str(&format!(
        r#"{{"url": "scripted", "statements": [
            {{"name": "by_id", "sql": "{BY_ID}", "params": ["id"]}},
            {{"name": "rename", "sql": "{RENAME}", "params": ["name", "id"]}}
        ]}}"#
    ))
    .unwrap();
    let conn = open(&driver, options);
    assert_eq!(conn.statement_names(), vec!["by_id", "rename"]);
    assert!(conn.statement("by_id").is_some_and(PreparedStatement::is_bound));
}

#[test]
fn invalid_template_in_options_fails_connect() {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let options = ConnectOptions::builder("scripted")
        .statement(PreparedStatementTemplate::new("bad", BY_ID).with_param_columns(["id", "x"]))
        .finish();
    let err = Connection::connect(driver, options).unwrap_err();
    assert!(matches!(err, SqlShimError::ParameterCountMismatch { expected: 1, found: 2, .. }));
}

#[test]
fn execute_binds_in_declared_order_and_counts_rows() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    conn.prepare_statement(rename_template())?;

    let changed = conn.execute_prepared("rename", &ColumnMap::from([("id", "4"), ("name", "Zed")]))?;
    assert_eq!(changed, 1);
    assert_eq!(conn.uncommitted_rows(), 1);
    assert_eq!(
        driver.state().runs,
        vec![(
            RENAME.to_string(),
            vec![Some("Zed".to_string()), Some("4".to_string())]
        )]
    );
    Ok(())
}

#[test]
fn wrong_value_count_never_reaches_the_driver() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    conn.prepare_statement(rename_template())?;

    let err = conn
        .execute_prepared("rename", &ColumnMap::from([("id", "4")]))
        .unwrap_err();
    assert!(matches!(
        err,
        SqlShimError::ParameterCountMismatch { expected: 2, found: 1, .. }
    ));
    assert!(driver.state().runs.is_empty());
    assert_eq!(conn.uncommitted_rows(), 0);
    Ok(())
}

#[test]
fn unknown_statement_is_reported() {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    let err = conn.execute_prepared("nope", &ColumnMap::new()).unwrap_err();
    assert!(matches!(err, SqlShimError::UnknownStatement(name) if name == "nope"));
    assert!(matches!(
        conn.reinstate_statement("nope"),
        Err(SqlShimError::UnknownStatement(_))
    ));
}

#[test]
fn query_prepared_tags_rows_with_statement_shape() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    driver.respond_with(
        "FROM people",
        ["NAME"],
        [vec![Some("<person id=\"1\"/>".to_string())]],
    );
    let mut conn = open(&driver, manual_commit());
    conn.prepare_statement(
        PreparedStatementTemplate::new("doc", BY_ID)
            .with_param_columns(["id"])
            .with_shape(ResultShape::Xml),
    )?;

    let result = conn.query_prepared("doc", &ColumnMap::from([("id", "1")]))?;
    assert_eq!(result.shape, ResultShape::Xml);
    assert_eq!(result.len(), 1);
    assert_eq!(result.results[0].get("NAME"), Some("<person id=\"1\"/>"));
    assert_eq!(conn.uncommitted_rows(), 0);
    Ok(())
}

#[test]
fn prepared_insert_binds_sorted_keys() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    let cols = ColumnMap::from([("zeta", "?"), ("alpha", "?"), ("created", "CURRENT_TIMESTAMP")]);
    assert!(conn.prepare_insert("add", "things", &cols)?);
    assert_eq!(
        conn.last_sql(),
        Some("INSERT INTO things (alpha,created,zeta) VALUES (?,CURRENT_TIMESTAMP,?)")
    );

    conn.execute_prepared("add", &ColumnMap::from([("zeta", "null"), ("alpha", "a")]))?;
    assert_eq!(
        driver.state().runs[0].1,
        vec![Some("a".to_string()), None]
    );
    Ok(())
}

#[test]
fn reconnect_rebinds_statements_and_date_format() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Oracle);
    let options = ConnectOptions::builder("scripted")
        .autocommit(false)
        .date_format("YYYY-MM-DD")
        .finish();
    let mut conn = open(&driver, options);
    conn.prepare_statement(rename_template())?;
    conn.prepare_statement(PreparedStatementTemplate::new("by_id", BY_ID).with_param_columns(["id"]))?;
    conn.execute_prepared("rename", &ColumnMap::from([("id", "1"), ("name", "a")]))?;

    conn.reconnect()?;

    assert!(conn.is_open());
    assert_eq!(conn.uncommitted_rows(), 0);
    {
        let state = driver.state();
        assert_eq!(state.connects, 2);
        assert_eq!(state.closes, 1);
        assert_eq!(state.statements_closed, 2);
        assert_eq!(state.prepared.len(), 4);
        let directive = "ALTER SESSION SET nls_date_format = 'YYYY-MM-DD'";
        assert_eq!(state.executed, vec![directive.to_string(), directive.to_string()]);
    }
    assert_eq!(conn.date_format(), Some("YYYY-MM-DD"));
    assert!(conn.statement("by_id").is_some_and(PreparedStatement::is_bound));
    conn.execute_prepared("rename", &ColumnMap::from([("id", "1"), ("name", "b")]))?;
    Ok(())
}

#[test]
fn failed_reconnect_leaves_connection_closed() {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    driver.fail_next_connect(DriverError::with_code(12541, "no listener"));

    let err = conn.reconnect().unwrap_err();
    assert_eq!(err.driver_code(), Some(12541));
    assert!(!conn.is_open());
    assert!(conn.commit().is_err());

    conn.reconnect().unwrap();
    assert!(conn.is_open());
}

#[test]
fn close_keeps_going_past_statement_failures() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    conn.prepare_statement(rename_template())?;
    conn.prepare_statement(PreparedStatementTemplate::new("by_id", BY_ID).with_param_columns(["id"]))?;
    driver.fail_statement_close(true);

    conn.close();
    conn.close();

    assert!(!conn.is_open());
    assert_eq!(driver.state().statements_closed, 2);
    assert_eq!(driver.state().closes, 1);
    assert_eq!(conn.statement_names(), vec!["by_id", "rename"]);
    assert!(conn.prepare_statement(PreparedStatementTemplate::new("late", "DELETE FROM t")).is_err());
    Ok(())
}

#[test]
fn drop_closes_the_session() {
    let driver = ScriptedDriver::new(Dialect::Generic);
    {
        let _conn = open(&driver, manual_commit());
    }
    assert_eq!(driver.state().closes, 1);
}

#[test]
fn remove_statement_unregisters_it() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    conn.prepare_statement(rename_template())?;

    conn.close_statement("rename")?;
    assert!(conn.statement("rename").is_some_and(|s| !s.is_bound()));
    conn.reinstate_statement("rename")?;
    assert!(conn.statement("rename").is_some_and(PreparedStatement::is_bound));

    assert!(conn.remove_statement("rename"));
    assert!(!conn.remove_statement("rename"));
    assert!(conn.statement_names().is_empty());
    Ok(())
}

#[test]
fn commit_threshold_and_counter_reset() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());
    let row = ColumnMap::from([("id", "1")]);

    conn.insert("t", &row)?;
    conn.insert("t", &row)?;
    assert!(!conn.commit_if_threshold(3)?);
    conn.insert("t", &row)?;
    assert!(conn.commit_if_threshold(3)?);
    assert_eq!(conn.uncommitted_rows(), 0);
    assert_eq!(driver.state().commits, 1);

    driver.fail_when("ROLLBACK", DriverError::new("session gone"));
    conn.delete("t", &row)?;
    assert!(conn.rollback().is_err());
    assert_eq!(conn.uncommitted_rows(), 0);
    Ok(())
}

#[test]
fn ad_hoc_statements_record_their_sql() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let mut conn = open(&driver, manual_commit());

    conn.update(
        "people",
        &ColumnMap::from([("name", "O'Brien")]),
        &ColumnMap::from([("id", "2")]),
    )?;
    let sql = "UPDATE people SET name = 'O''Brien' WHERE id = 2";
    assert_eq!(conn.last_sql(), Some(sql));
    assert_eq!(driver.state().executed, vec![sql.to_string()]);

    driver.respond_with("FROM people", ["ID", "NAME"], [vec![Some("2".into()), None]]);
    let rows = conn.select(
        "people",
        &ColumnMap::from([("NAME", ""), ("ID", "")]),
        &ColumnMap::from([("name", "null")]),
    )?;
    assert_eq!(conn.last_sql(), Some("SELECT ID,NAME FROM people WHERE name IS null"));
    assert_eq!(rows.results[0].get("ID"), Some("2"));
    assert_eq!(rows.results[0].get("NAME"), None);
    Ok(())
}

#[test]
fn held_lock_maps_to_row_locked() {
    let driver = ScriptedDriver::new(Dialect::Oracle);
    driver.fail_when(
        "FOR UPDATE NOWAIT",
        DriverError::with_code(54, "ORA-00054: resource busy"),
    );
    let mut conn = open(&driver, manual_commit());

    let err = conn
        .lock_for_update("jobs", &ColumnMap::from([("id", "9")]))
        .unwrap_err();
    assert!(matches!(&err, SqlShimError::RowLocked { table, .. } if table == "jobs"));
    assert_eq!(err.driver_code(), Some(54));

    driver.clear_failures();
    driver.fail_when("FOR UPDATE", DriverError::with_code(942, "no such table"));
    let err = conn
        .lock_for_update("jobs", &ColumnMap::from([("id", "9")]))
        .unwrap_err();
    assert!(matches!(err, SqlShimError::Driver(_)));
}

#[test]
fn lock_returns_number_of_rows_locked() -> Result<(), SqlShimError> {
    let driver = ScriptedDriver::new(Dialect::MySql);
    driver.respond_with("FOR UPDATE", ["ID"], [vec![Some("9".into())], vec![Some("10".into())]]);
    let mut conn = open(&driver, manual_commit());
    assert_eq!(conn.lock_conflict_code(), None);

    let locked = conn.lock_for_update("jobs", &ColumnMap::from([("batch", "3")]))?;
    assert_eq!(locked, 2);
    assert_eq!(driver.state().queried, vec!["SELECT * FROM jobs WHERE batch = 3 FOR UPDATE"]);
    Ok(())
}

#[test]
fn configured_lock_code_overrides_dialect() {
    let driver = ScriptedDriver::new(Dialect::MySql);
    driver.fail_when("FOR UPDATE", DriverError::with_code(3572, "NOWAIT lock conflict"));
    let options = ConnectOptions::builder("scripted").lock_conflict_code(3572).finish();
    let mut conn = open(&driver, options);

    let err = conn
        .lock_for_update("jobs", &ColumnMap::from([("id", "1")]))
        .unwrap_err();
    assert!(matches!(err, SqlShimError::RowLocked { .. }));
}

#[test]
fn dialect_override_wins_over_detection() {
    let driver = ScriptedDriver::new(Dialect::Generic);
    let options = ConnectOptions::builder("scripted").dialect(Dialect::Oracle).finish();
    let conn = open(&driver, options);
    assert_eq!(conn.dialect(), Dialect::Oracle);
    assert_eq!(conn.lock_conflict_code(), Some(54));
}
