use super::OdbcStatement;
use crate::error::Error;
use std::io::Write;

impl OdbcStatement<'_> {
    /// Writes the remaining rows of the result set to `out`, preceded by the
    /// column definitions when `show_schema` is set. Fetches until the end of
    /// data; NULL values are written as `NULL`.
    pub fn dump_result(&mut self, out: &mut impl Write, show_schema: bool) -> Result<(), Error> {
        if show_schema {
            writeln!(out, "Column Definitions:")?;
            for (index, column) in self.columns.iter().enumerate() {
                write!(out, " {:2}: {:<24} ", index, column.name())?;

                let precision = usize::try_from(column.precision()).unwrap_or(0);
                if precision > 0 && precision != column.size() {
                    write!(out, " Size:{:3}.{}", column.size(), precision)?;
                } else {
                    write!(out, " Size:{:5}", column.size())?;
                }

                write!(out, " Type:{}", column.type_name())?;
                if column.nullable() {
                    write!(out, " NULLABLE")?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }

        let mut record = 0;
        while self.fetch_next()?.is_row() {
            writeln!(out, "Record {}", record)?;
            record += 1;

            for (index, column) in self.columns.iter().enumerate() {
                writeln!(out, "  {}: {}", column.name(), self.value_or(index, "NULL"))?;
            }
        }

        out.flush()?;
        Ok(())
    }
}
