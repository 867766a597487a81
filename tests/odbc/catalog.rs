use odbc_cover::odbc::sql_type;
use odbc_cover::{FetchOutcome, OdbcStatement};
use odbc_cover_test::{create_items_table, new_session};

#[test]
fn it_describes_table_columns_from_the_catalog() -> anyhow::Result<()> {
    let session = new_session()?;
    create_items_table(&session, "odbc_cover_catalog", &[])?;

    let mut stmt = OdbcStatement::new(&session);
    stmt.get_columns("odbc_cover_catalog", None, None)?;

    assert_eq!(stmt.column_count(), 2);

    let id = stmt.column_id("id").and_then(|i| stmt.column(i));
    let id = id.expect("id column");
    assert_eq!(id.sql_type(), sql_type::INTEGER);
    assert!(!id.nullable());

    let label = stmt.column_id("LABEL").and_then(|i| stmt.column(i));
    let label = label.expect("label column");
    assert_eq!(label.size(), 40);
    assert!(label.nullable());

    assert_eq!(stmt.fetch_next()?, FetchOutcome::EndOfData);
    Ok(())
}

#[test]
fn it_finds_no_columns_for_unknown_tables() -> anyhow::Result<()> {
    let session = new_session()?;
    let mut stmt = OdbcStatement::new(&session);

    stmt.get_columns("odbc_cover_no_such_table", None, None)?;
    assert_eq!(stmt.column_count(), 0);
    Ok(())
}
