use crate::error::Error;
use crate::odbc::type_info::{type_name, DescribedType};
use crate::odbc::OdbcStatement;

/// Description of one result set column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdbcColumn {
    pub(crate) name: String,
    pub(crate) sql_type: i16,
    pub(crate) size: usize,
    pub(crate) precision: i16,
    pub(crate) nullable: bool,
    pub(crate) ordinal: usize,
}

impl OdbcColumn {
    pub(crate) fn described(
        name: String,
        ordinal: usize,
        described: DescribedType,
        nullable: bool,
    ) -> Self {
        OdbcColumn {
            name,
            sql_type: described.code,
            size: described.size,
            precision: described.decimal_digits,
            nullable,
            ordinal,
        }
    }

    /// Zero based position of the column.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// SQL type code, see [`sql_type`](crate::odbc::sql_type).
    pub fn sql_type(&self) -> i16 {
        self.sql_type
    }

    /// Display name of [`sql_type`](Self::sql_type).
    pub fn type_name(&self) -> &'static str {
        type_name(self.sql_type)
    }

    /// Column width; zero when the driver does not know it.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Decimal digits. Zero, or the same as the size, for columns it does not
    /// apply to.
    pub fn precision(&self) -> i16 {
        self.precision
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// A type that can be used to look up a column of the current result set:
/// a zero based index or a column name.
pub trait ColumnIndex<T: ?Sized> {
    fn index(&self, container: &T) -> Result<usize, Error>;
}

impl ColumnIndex<OdbcStatement<'_>> for usize {
    fn index(&self, statement: &OdbcStatement<'_>) -> Result<usize, Error> {
        let len = statement.column_count();
        if *self >= len {
            return Err(Error::ColumnIndexOutOfBounds { len, index: *self });
        }

        Ok(*self)
    }
}

impl ColumnIndex<OdbcStatement<'_>> for &'_ str {
    fn index(&self, statement: &OdbcStatement<'_>) -> Result<usize, Error> {
        statement
            .column_id(self)
            .ok_or_else(|| Error::ColumnNotFound((*self).into()))
    }
}
