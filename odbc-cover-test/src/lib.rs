use odbc_cover::{OdbcConnectOptions, OdbcSession, OdbcStatement};

pub fn setup_if_needed() {
    let _ = dotenvy::dotenv();
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Opens a session on the data source named by `DATABASE_URL`.
pub fn new_session() -> anyhow::Result<OdbcSession> {
    setup_if_needed();

    let options = OdbcConnectOptions::from_env()?;
    let mut session = OdbcSession::new();
    session.establish_with(&options)?;

    Ok(session)
}

/// Creates `table` as `(id INTEGER NOT NULL, label VARCHAR(40))` holding
/// `rows`, dropping any previous table of that name.
pub fn create_items_table(
    session: &OdbcSession,
    table: &str,
    rows: &[(i32, Option<&str>)],
) -> anyhow::Result<()> {
    let mut stmt = OdbcStatement::new(session);

    // The table may not exist yet.
    let _ = stmt.execute_sql(&format!("DROP TABLE {table}"));

    stmt.execute_sql(&format!(
        "CREATE TABLE {table} (id INTEGER NOT NULL, label VARCHAR(40))"
    ))?;

    for (id, label) in rows {
        stmt.clear();
        stmt.append("INSERT INTO ")
            .append(table)
            .append(" (id, label) VALUES (")
            .append(*id)
            .append(", ");
        match label {
            Some(label) => stmt.append('\'').append(*label).append('\''),
            None => stmt.append("NULL"),
        };
        stmt.append(')');
        stmt.execute()?;
    }

    Ok(())
}
