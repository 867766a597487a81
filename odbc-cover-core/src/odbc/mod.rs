//! Session and statement cover over ODBC (via `odbc-api`).
//!
//! ## Connection Strings
//!
//! [`OdbcSession::connect`] accepts a data source name or a standard ODBC
//! connection string:
//!
//! ```text
//! // DSN-based connection
//! MyDataSource
//! DSN=MyDataSource;UID=myuser;PWD=mypassword
//!
//! // Driver-based connection
//! Driver={ODBC Driver 17 for SQL Server};Server=localhost;Database=test
//! ```
//!
//! The `odbc:` prefix is optional:
//!
//! ```text
//! odbc:DSN=MyDataSource
//! ```
//!
//! ## Results
//!
//! Every value is read back as text, whatever its SQL type. Each fetch reads
//! the whole row; long values are read in several parts and never truncated.

mod column;
mod connection;
mod error;
mod options;
mod row;
mod statement;
mod type_info;

pub use column::{ColumnIndex, OdbcColumn};
pub use connection::{OdbcSession, LAST_ERROR_CAPACITY};
pub use error::OdbcDatabaseError;
pub use options::{
    OdbcConnectOptions, OdbcConnectTarget, DEFAULT_LOGIN_TIMEOUT, DEFAULT_TEXT_BUFFER_SIZE,
};
pub use row::OdbcRow;
pub use statement::{FetchOrientation, FetchOutcome, OdbcStatement, SqlFragment, APPENDF_MAX_LEN};
pub use type_info::{sql_type, type_name};
