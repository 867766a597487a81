use odbc_cover::odbc::{sql_type, FetchOrientation};
use odbc_cover::{appendf, Error, FetchOutcome, OdbcSession, OdbcStatement};
use odbc_cover_test::{create_items_table, new_session};

#[test]
fn it_connects_and_pings() -> anyhow::Result<()> {
    let mut session = new_session()?;
    assert!(session.is_connected());
    session.ping()?;
    assert_eq!(session.last_error(), "");

    session.close();
    session.close();
    assert!(!session.is_connected());
    Ok(())
}

#[test]
fn it_reports_the_dbms_name() -> anyhow::Result<()> {
    let session = new_session()?;
    assert!(!session.dbms_name()?.is_empty());
    Ok(())
}

#[test]
fn it_fails_to_establish_unknown_data_sources() -> anyhow::Result<()> {
    let mut session = OdbcSession::new();
    let err = session
        .establish("odbc_cover_no_such_dsn", Some("nobody"), None)
        .unwrap_err();

    assert!(matches!(err, Error::Database(_)));
    assert!(!session.is_connected());
    assert!(!session.last_error().is_empty());
    Ok(())
}

#[test]
fn it_selects_rows_as_text() -> anyhow::Result<()> {
    let session = new_session()?;
    create_items_table(
        &session,
        "odbc_cover_select",
        &[(1, Some("one")), (2, None), (3, Some("three"))],
    )?;

    let mut stmt = OdbcStatement::new(&session);
    stmt.append("SELECT id, label FROM odbc_cover_select ORDER BY id");
    stmt.execute()?;

    assert_eq!(stmt.column_count(), 2);
    assert_eq!(stmt.column_id("ID"), Some(0));
    assert_eq!(stmt.column_id("Label"), Some(1));
    assert_eq!(stmt.column_type(0), Some(sql_type::INTEGER));
    assert_eq!(stmt.column_nullable(1), Some(true));

    let mut rows = Vec::new();
    while stmt.fetch_next()?.is_row() {
        rows.push((
            stmt.value_or(0, "").to_owned(),
            stmt.value_or("label", "<null>").to_owned(),
        ));
    }

    assert_eq!(
        rows,
        vec![
            ("1".to_owned(), "one".to_owned()),
            ("2".to_owned(), "<null>".to_owned()),
            ("3".to_owned(), "three".to_owned()),
        ]
    );
    assert_eq!(stmt.fetch_next()?, FetchOutcome::EndOfData);
    Ok(())
}

#[test]
fn it_trims_padded_character_data() -> anyhow::Result<()> {
    let session = new_session()?;
    let mut stmt = OdbcStatement::new(&session);

    stmt.execute_sql("SELECT CAST('ABC' AS CHAR(6)) AS padded")?;
    assert!(stmt.fetch_next()?.is_row());
    assert_eq!(stmt.value("padded"), Some("ABC"));
    Ok(())
}

#[test]
fn it_reads_values_longer_than_the_text_buffer() -> anyhow::Result<()> {
    let session = new_session()?;
    let long = "x".repeat(40);
    create_items_table(&session, "odbc_cover_long", &[(1, Some(long.as_str()))])?;

    let mut options = odbc_cover::OdbcConnectOptions::from_env()?;
    options.text_buffer_size(8);
    let mut small = OdbcSession::new();
    small.establish_with(&options)?;

    let mut stmt = OdbcStatement::new(&small);
    stmt.execute_sql("SELECT label FROM odbc_cover_long")?;
    assert!(stmt.fetch_next()?.is_row());
    assert_eq!(stmt.value(0), Some(long.as_str()));
    Ok(())
}

#[test]
fn it_scrolls_through_results_when_asked_to() -> anyhow::Result<()> {
    let session = new_session()?;
    create_items_table(
        &session,
        "odbc_cover_scroll",
        &[(1, Some("one")), (2, Some("two")), (3, Some("three"))],
    )?;

    let mut stmt = OdbcStatement::new(&session);
    stmt.set_scrollable(true)
        .execute_sql("SELECT id, label FROM odbc_cover_scroll ORDER BY id")?;

    assert!(stmt.fetch(FetchOrientation::Last)?.is_row());
    assert_eq!(stmt.value("label"), Some("three"));

    assert!(stmt.fetch(FetchOrientation::Prior)?.is_row());
    assert_eq!(stmt.value("label"), Some("two"));

    assert!(stmt.fetch(FetchOrientation::First)?.is_row());
    assert_eq!(stmt.value("label"), Some("one"));

    assert_eq!(stmt.fetch(FetchOrientation::Prior)?, FetchOutcome::EndOfData);
    assert_eq!(stmt.value(0), None);
    Ok(())
}

#[test]
fn it_rejects_positioned_fetches_on_forward_only_cursors() -> anyhow::Result<()> {
    let session = new_session()?;
    create_items_table(&session, "odbc_cover_forward", &[(1, Some("one"))])?;

    let mut stmt = OdbcStatement::new(&session);
    stmt.execute_sql("SELECT id, label FROM odbc_cover_forward")?;

    assert!(stmt.fetch(FetchOrientation::Last).is_err());
    assert!(!session.last_error().is_empty());
    Ok(())
}

#[test]
fn it_reads_long_values_on_scrollable_cursors() -> anyhow::Result<()> {
    let session = new_session()?;
    let long = "y".repeat(40);
    create_items_table(
        &session,
        "odbc_cover_long_scroll",
        &[(1, Some(long.as_str())), (2, None)],
    )?;

    let mut options = odbc_cover::OdbcConnectOptions::from_env()?;
    options.text_buffer_size(8);
    let mut small = OdbcSession::new();
    small.establish_with(&options)?;

    let mut stmt = OdbcStatement::new(&small);
    stmt.set_scrollable(true)
        .execute_sql("SELECT label FROM odbc_cover_long_scroll ORDER BY id")?;

    assert!(stmt.fetch(FetchOrientation::First)?.is_row());
    assert_eq!(stmt.value(0), Some(long.as_str()));

    assert!(stmt.fetch(FetchOrientation::Last)?.is_row());
    assert_eq!(stmt.row().map(|row| row.is_null(0)), Some(true));
    Ok(())
}

#[test]
fn it_builds_statements_with_formatted_text() -> anyhow::Result<()> {
    let session = new_session()?;
    create_items_table(&session, "odbc_cover_appendf", &[(7, Some("seven"))])?;

    let mut stmt = OdbcStatement::new(&session);
    appendf!(stmt, "SELECT label FROM {} WHERE id = {}", "odbc_cover_appendf", 7)?;
    stmt.execute()?;

    assert!(stmt.fetch_next()?.is_row());
    assert_eq!(stmt.value(0), Some("seven"));
    Ok(())
}

#[test]
fn it_reports_end_of_data_for_statements_without_results() -> anyhow::Result<()> {
    let session = new_session()?;
    create_items_table(&session, "odbc_cover_update", &[(1, Some("one"))])?;

    let mut stmt = OdbcStatement::new(&session);
    stmt.execute_sql("UPDATE odbc_cover_update SET label = 'uno' WHERE id = 1")?;

    assert_eq!(stmt.column_count(), 0);
    assert_eq!(stmt.fetch_next()?, FetchOutcome::EndOfData);
    Ok(())
}

#[test]
fn it_records_the_last_error() -> anyhow::Result<()> {
    let session = new_session()?;
    let mut stmt = OdbcStatement::new(&session);

    assert!(stmt.execute_sql("SELECT * FROM odbc_cover_missing_table").is_err());
    assert!(!session.last_error().is_empty());
    assert_eq!(stmt.column_count(), 0);

    stmt.execute_sql("SELECT 1")?;
    assert_eq!(session.last_error(), "");
    Ok(())
}

#[test]
fn it_refuses_statements_on_closed_sessions() -> anyhow::Result<()> {
    let mut session = new_session()?;
    session.close();

    let mut stmt = OdbcStatement::new(&session);
    assert!(matches!(
        stmt.execute_sql("SELECT 1"),
        Err(Error::StatementUnavailable)
    ));
    assert!(matches!(
        stmt.fetch(FetchOrientation::First),
        Err(Error::StatementUnavailable)
    ));
    Ok(())
}

#[test]
fn it_dumps_results() -> anyhow::Result<()> {
    let session = new_session()?;
    create_items_table(&session, "odbc_cover_dump", &[(1, Some("one")), (2, None)])?;

    let mut stmt = OdbcStatement::new(&session);
    stmt.execute_sql("SELECT id, label FROM odbc_cover_dump ORDER BY id")?;

    let mut out = Vec::new();
    stmt.dump_result(&mut out, true)?;
    let text = String::from_utf8(out)?;

    assert!(text.starts_with("Column Definitions:\n"));
    assert!(text.contains("Record 0\n"));
    assert!(text.contains("Record 1\n"));
    assert!(text.contains("NULL"));
    Ok(())
}
