use super::{handle_mut, FetchOrientation, OdbcStatement, RawRow};
use crate::error::Error;
use crate::odbc::row::decode_cell;
use crate::odbc::type_info::sql_type;
use crate::odbc::OdbcColumn;

// Zero based positions within a row of the columns catalog.
const COLUMN_NAME: usize = 3;
const DATA_TYPE: usize = 4;
const COLUMN_SIZE: usize = 6;
const DECIMAL_DIGITS: usize = 8;
const NULLABLE: usize = 10;

impl OdbcStatement<'_> {
    /// Fills the column descriptors from the catalog description of `table`
    /// instead of from an executed query. `catalog` and `schema` narrow the
    /// search when given.
    ///
    /// No rows can be fetched afterwards. When reading the catalog fails part
    /// way, the columns read so far are kept and the error is returned.
    pub fn get_columns(
        &mut self,
        table: &str,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<(), Error> {
        self.columns.clear();
        self.row = None;

        let session = self.session;
        let handle = handle_mut(&mut self.handle, session)?;

        session.record(handle.open_columns(
            catalog.unwrap_or(""),
            schema.unwrap_or(""),
            table,
        ))?;

        let width = session.record(handle.num_result_cols())?;
        if usize::from(width) <= NULLABLE {
            handle.close_cursor();
            return session.record(Err(err_protocol!(
                "columns catalog has {} columns, expected at least {}",
                width,
                NULLABLE + 1
            )));
        }

        let mut columns = Vec::new();
        let outcome = loop {
            match session.record(handle.fetch(FetchOrientation::Next, width)) {
                Ok(Some(row)) => {
                    let ordinal = columns.len();
                    columns.push(describe_catalog_row(row, ordinal));
                }
                Ok(None) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        handle.close_cursor();

        log::debug!("read {} catalog columns of {}", columns.len(), table);
        self.columns = columns;
        outcome
    }
}

fn describe_catalog_row(mut row: RawRow, ordinal: usize) -> OdbcColumn {
    let number = |cell: Option<&Option<Vec<u8>>>| -> i64 {
        cell.and_then(Option::as_deref)
            .and_then(atoi::atoi::<i64>)
            .unwrap_or(0)
    };

    let sql_type = number(row.get(DATA_TYPE));
    let size = number(row.get(COLUMN_SIZE));
    let precision = number(row.get(DECIMAL_DIGITS));
    let nullable = number(row.get(NULLABLE));

    let name = row
        .get_mut(COLUMN_NAME)
        .and_then(Option::take)
        .map(decode_cell)
        .unwrap_or_default();

    OdbcColumn {
        name,
        sql_type: i16::try_from(sql_type).unwrap_or(sql_type::UNKNOWN),
        size: usize::try_from(size).unwrap_or(0),
        precision: i16::try_from(precision).unwrap_or(0),
        nullable: nullable == i64::from(sql_type::NULLABLE),
        ordinal,
    }
}
