//! Types for working with errors produced by odbc-cover.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::io;

/// A specialized `Result` type for odbc-cover.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// Boxed source of a [`Error::Configuration`].
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// Represents all the ways a method can fail within odbc-cover.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error occurred while parsing a connection string.
    #[error("error with configuration: {0}")]
    Configuration(#[source] BoxDynError),

    /// Error returned from the driver manager or the driver.
    #[error("error returned from database: {0}")]
    Database(#[source] Box<dyn DatabaseError>),

    /// Error writing a result dump to its sink.
    #[error("error writing diagnostics: {0}")]
    Io(#[from] io::Error),

    /// The session holds no live connection.
    #[error("session is not connected")]
    NotConnected,

    /// The statement could not obtain a driver statement handle; every
    /// operation on it fails with this error.
    #[error("statement has no driver handle")]
    StatementUnavailable,

    /// A formatted append did not fit the scratch area; nothing was appended.
    #[error("formatted command text exceeds {limit} bytes")]
    CommandOverflow { limit: usize },

    /// Column index was out of bounds.
    #[error("column index out of bounds: the len is {len}, but the index is {index}")]
    ColumnIndexOutOfBounds { index: usize, len: usize },

    /// No column found for the given name.
    #[error("no column found for name: {0}")]
    ColumnNotFound(String),

    /// The driver handed back something the cover could not make sense of.
    #[error("encountered unexpected or invalid data: {0}")]
    Protocol(String),
}

impl StdError for Box<dyn DatabaseError> {}

impl Error {
    pub fn as_database_error(&self) -> Option<&(dyn DatabaseError + 'static)> {
        match self {
            Error::Database(err) => Some(&**err),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn config(err: impl StdError + Send + Sync + 'static) -> Self {
        Error::Configuration(err.into())
    }
}

/// An error that was returned from the driver.
pub trait DatabaseError: 'static + Send + Sync + StdError {
    /// The primary, human-readable error message.
    fn message(&self) -> &str;

    /// The (SQLSTATE) code for the error.
    fn code(&self) -> Option<Cow<'_, str>> {
        None
    }

    #[doc(hidden)]
    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static);
}

impl dyn DatabaseError {
    /// Downcast this generic database error to a specific database error type.
    #[inline]
    pub fn try_downcast_ref<E: DatabaseError>(&self) -> Option<&E> {
        self.as_error().downcast_ref()
    }
}

impl<E> From<E> for Error
where
    E: DatabaseError,
{
    #[inline]
    fn from(error: E) -> Self {
        Error::Database(Box::new(error))
    }
}

/// Format an error message as a `Protocol` error
macro_rules! err_protocol {
    ($expr:expr) => {
        $crate::error::Error::Protocol($expr.into())
    };

    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Protocol(format!($fmt, $($arg)*))
    };
}
