#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = "A thin session/statement cover over ODBC.\n\nOpen an [`OdbcSession`], build SQL text on an [`OdbcStatement`], execute it and read each row back as text."]

pub use odbc_cover_core::error::{self, DatabaseError, Error, Result};

pub use odbc_cover_core::odbc;

pub use odbc_cover_core::odbc::{
    ColumnIndex, FetchOrientation, FetchOutcome, OdbcColumn, OdbcConnectOptions, OdbcRow,
    OdbcSession, OdbcStatement, SqlFragment,
};

#[doc(inline)]
pub use odbc_cover_core::appendf;

/// Convenience re-export of common traits.
pub mod prelude {
    pub use super::ColumnIndex;
    pub use super::SqlFragment;
}
