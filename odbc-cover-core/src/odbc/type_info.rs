use odbc_api::DataType;

/// SQL type codes as reported by `SQLDescribeCol` and the `DATA_TYPE` column
/// of the columns catalog.
pub mod sql_type {
    pub const UNKNOWN: i16 = 0;
    pub const CHAR: i16 = 1;
    pub const NUMERIC: i16 = 2;
    pub const DECIMAL: i16 = 3;
    pub const INTEGER: i16 = 4;
    pub const SMALLINT: i16 = 5;
    pub const FLOAT: i16 = 6;
    pub const REAL: i16 = 7;
    pub const DOUBLE: i16 = 8;
    pub const DATETIME: i16 = 9;
    pub const VARCHAR: i16 = 12;
    pub const TYPE_DATE: i16 = 91;
    pub const TYPE_TIME: i16 = 92;
    pub const TYPE_TIMESTAMP: i16 = 93;
    pub const LONGVARCHAR: i16 = -1;
    pub const BINARY: i16 = -2;
    pub const VARBINARY: i16 = -3;
    pub const LONGVARBINARY: i16 = -4;
    pub const BIGINT: i16 = -5;
    pub const TINYINT: i16 = -6;
    pub const BIT: i16 = -7;
    pub const WCHAR: i16 = -8;
    pub const WVARCHAR: i16 = -9;
    pub const WLONGVARCHAR: i16 = -10;

    /// `NULLABLE` value meaning the column accepts NULL.
    pub const NULLABLE: i16 = 1;
}

/// Display name of a SQL type code. Codes outside the well-known set map to
/// `"UNKNOWN"`.
pub fn type_name(code: i16) -> &'static str {
    match code {
        sql_type::CHAR => "CHAR",
        sql_type::NUMERIC => "NUMERIC",
        sql_type::DECIMAL => "DECIMAL",
        sql_type::INTEGER => "INTEGER",
        sql_type::SMALLINT => "SMALLINT",
        sql_type::FLOAT => "FLOAT",
        sql_type::REAL => "REAL",
        sql_type::DOUBLE => "DOUBLE",
        sql_type::DATETIME => "DATETIME",
        sql_type::VARCHAR => "VARCHAR",
        sql_type::TYPE_DATE => "DATE",
        sql_type::TYPE_TIME => "TIME",
        sql_type::TYPE_TIMESTAMP => "TIMESTAMP",
        _ => "UNKNOWN",
    }
}

/// The driver's view of a column type, flattened to what `SQLDescribeCol`
/// reports: type code, column size and decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DescribedType {
    pub(crate) code: i16,
    pub(crate) size: usize,
    pub(crate) decimal_digits: i16,
}

impl From<DataType> for DescribedType {
    fn from(data_type: DataType) -> Self {
        let len = |length: Option<std::num::NonZeroUsize>| length.map_or(0, |l| l.get());
        let (code, size, decimal_digits) = match data_type {
            DataType::Unknown => (sql_type::UNKNOWN, 0, 0),
            DataType::Char { length } => (sql_type::CHAR, len(length), 0),
            DataType::WChar { length } => (sql_type::WCHAR, len(length), 0),
            DataType::Varchar { length } => (sql_type::VARCHAR, len(length), 0),
            DataType::WVarchar { length } => (sql_type::WVARCHAR, len(length), 0),
            DataType::LongVarchar { length } => (sql_type::LONGVARCHAR, len(length), 0),
            DataType::WLongVarchar { length } => (sql_type::WLONGVARCHAR, len(length), 0),
            DataType::Binary { length } => (sql_type::BINARY, len(length), 0),
            DataType::Varbinary { length } => (sql_type::VARBINARY, len(length), 0),
            DataType::LongVarbinary { length } => (sql_type::LONGVARBINARY, len(length), 0),
            DataType::Numeric { precision, scale } => (sql_type::NUMERIC, precision, scale),
            DataType::Decimal { precision, scale } => (sql_type::DECIMAL, precision, scale),
            DataType::Integer => (sql_type::INTEGER, 10, 0),
            DataType::SmallInt => (sql_type::SMALLINT, 5, 0),
            DataType::TinyInt => (sql_type::TINYINT, 3, 0),
            DataType::BigInt => (sql_type::BIGINT, 19, 0),
            DataType::Float { precision } => (sql_type::FLOAT, precision, 0),
            DataType::Real => (sql_type::REAL, 7, 0),
            DataType::Double => (sql_type::DOUBLE, 15, 0),
            DataType::Bit => (sql_type::BIT, 1, 0),
            DataType::Date => (sql_type::TYPE_DATE, 10, 0),
            DataType::Time { precision } => (sql_type::TYPE_TIME, time_size(8, precision), precision),
            DataType::Timestamp { precision } => (
                sql_type::TYPE_TIMESTAMP,
                time_size(19, precision),
                precision,
            ),
            DataType::Other {
                data_type,
                column_size,
                decimal_digits,
            } => (data_type.0, len(column_size), decimal_digits),
        };

        DescribedType {
            code,
            size,
            decimal_digits,
        }
    }
}

// Fractional seconds add a separator plus one character per digit.
fn time_size(base: usize, precision: i16) -> usize {
    match usize::try_from(precision) {
        Ok(0) | Err(_) => base,
        Ok(digits) => base + 1 + digits,
    }
}
