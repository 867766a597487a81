use crate::error::DatabaseError;
use odbc_api::Error as OdbcApiError;
use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// An error reported by the ODBC driver manager or driver.
#[derive(Debug)]
pub enum OdbcDatabaseError {
    /// Raised through `odbc-api`.
    Api(OdbcApiError),
    /// Read straight from the statement's diagnostic area after a raw call.
    Diagnostic {
        function: &'static str,
        state: String,
        native_error: i32,
        message: String,
    },
}

impl Display for OdbcDatabaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OdbcDatabaseError::Api(err) => Display::fmt(err, f),
            OdbcDatabaseError::Diagnostic {
                function,
                state,
                native_error,
                message,
            } => write!(
                f,
                "ODBC emitted an error calling '{function}': State: {state}, Native error: {native_error}, Message: {message}"
            ),
        }
    }
}

impl std::error::Error for OdbcDatabaseError {}

impl DatabaseError for OdbcDatabaseError {
    fn message(&self) -> &str {
        match self {
            OdbcDatabaseError::Api(_) => "ODBC error",
            OdbcDatabaseError::Diagnostic { message, .. } => message,
        }
    }
    fn code(&self) -> Option<Cow<'_, str>> {
        match self {
            OdbcDatabaseError::Api(OdbcApiError::Diagnostics { record, .. }) => {
                Some(Cow::Borrowed(record.state.as_str()))
            }
            OdbcDatabaseError::Api(_) => None,
            OdbcDatabaseError::Diagnostic { state, .. } => Some(Cow::Borrowed(state)),
        }
    }
    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }
}

impl From<OdbcApiError> for crate::error::Error {
    fn from(value: OdbcApiError) -> Self {
        crate::error::Error::Database(Box::new(OdbcDatabaseError::Api(value)))
    }
}
