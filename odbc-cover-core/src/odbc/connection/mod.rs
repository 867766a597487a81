use crate::error::Error;
use crate::logger::LogSettings;
use crate::odbc::options::{DEFAULT_LOGIN_TIMEOUT, DEFAULT_TEXT_BUFFER_SIZE};
use crate::odbc::OdbcConnectOptions;
use std::cell::RefCell;
use std::str::FromStr;

pub(crate) mod odbc_bridge;

use odbc_bridge::establish_connection;

/// Capacity of the last error slot, in bytes.
pub const LAST_ERROR_CAPACITY: usize = 512;

/// A session with an ODBC data source.
///
/// The session owns the connection handle. The environment handle is the
/// process wide one handed out by `odbc-api`, which outlives every session.
/// Dropping the session disconnects and frees the connection.
///
/// Besides returning errors, every driver call made through the session (or
/// through a statement bound to it) overwrites a single slot holding the text
/// of the latest failure, see [`last_error`](Self::last_error).
///
/// ODBC calls block the calling thread; a session must be used from one
/// thread at a time.
pub struct OdbcSession {
    conn: Option<odbc_api::Connection<'static>>,
    pub(crate) login_timeout: u32,
    pub(crate) text_buffer_size: usize,
    pub(crate) log_settings: LogSettings,
    last_error: RefCell<String>,
}

impl OdbcSession {
    /// An empty, unconnected session.
    pub fn new() -> Self {
        OdbcSession {
            conn: None,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            text_buffer_size: DEFAULT_TEXT_BUFFER_SIZE,
            log_settings: LogSettings::default(),
            last_error: RefCell::new(String::new()),
        }
    }

    /// Parses `url` into [`OdbcConnectOptions`] and establishes a new session.
    pub fn connect(url: &str) -> Result<Self, Error> {
        let options = OdbcConnectOptions::from_str(url)?;
        let mut session = Self::new();
        session.establish_with(&options)?;
        Ok(session)
    }

    /// Connects to the data source `dsn` and logs on.
    ///
    /// `username` and `password` may be omitted when not required or when
    /// the data source provides them. Any existing connection is closed
    /// first; on failure the session is left empty.
    ///
    /// The login timeout, text buffer size and log settings of the previous
    /// [`establish_with`](Self::establish_with) are kept.
    pub fn establish(
        &mut self,
        dsn: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), Error> {
        let options = self.options_for(dsn, username, password);
        self.establish_with(&options)
    }

    fn options_for(
        &self,
        dsn: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> OdbcConnectOptions {
        let mut options = OdbcConnectOptions::new(dsn);
        if let Some(username) = username {
            options.username(username);
        }
        if let Some(password) = password {
            options.password(password);
        }
        options
            .login_timeout(self.login_timeout)
            .text_buffer_size(self.text_buffer_size);
        options.log_settings = self.log_settings.clone();
        options
    }

    /// Establishes the session described by `options`. Any existing
    /// connection is closed first; on failure the session is left empty.
    pub fn establish_with(&mut self, options: &OdbcConnectOptions) -> Result<(), Error> {
        self.close();

        self.login_timeout = options.login_timeout;
        self.text_buffer_size = options.text_buffer_size;
        self.log_settings = options.log_settings.clone();

        log::debug!("establishing ODBC session: {:?}", options);
        let conn = self.record(establish_connection(options))?;
        self.conn = Some(conn);

        Ok(())
    }

    /// Disconnects and frees the connection, if any. Calling it on an empty
    /// session does nothing.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            log::debug!("closing ODBC session");
            drop(conn);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Text of the most recent failure, or an empty string when the latest
    /// driver call succeeded.
    ///
    /// The slot is overwritten by the next driver call made through this
    /// session or any statement bound to it, so read it right away.
    pub fn last_error(&self) -> String {
        self.last_error.borrow().clone()
    }

    /// Returns the name of the DBMS this session is talking to, as reported
    /// by the driver.
    pub fn dbms_name(&self) -> Result<String, Error> {
        let conn = self.connection()?;
        self.record(
            conn.database_management_system_name()
                .map_err(Error::from),
        )
    }

    /// Checks that the connection is still alive.
    pub fn ping(&self) -> Result<(), Error> {
        let conn = self.connection()?;
        self.record(conn.execute("SELECT 1", (), None).map(drop).map_err(Error::from))
    }

    pub(crate) fn connection(&self) -> Result<&odbc_api::Connection<'static>, Error> {
        self.conn.as_ref().ok_or(Error::NotConnected)
    }

    /// Passes `result` through, clearing the last error slot first and
    /// filling it in when `result` is a failure.
    pub(crate) fn record<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        let mut slot = self.last_error.borrow_mut();
        slot.clear();

        if let Err(err) = &result {
            let text = err.to_string();
            slot.push_str(truncate_at_boundary(&text, LAST_ERROR_CAPACITY));
        }

        result
    }
}

impl Default for OdbcSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OdbcSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for OdbcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdbcSession")
            .field("connected", &self.is_connected())
            .field("text_buffer_size", &self.text_buffer_size)
            .finish()
    }
}

fn truncate_at_boundary(text: &str, capacity: usize) -> &str {
    if text.len() <= capacity {
        return text;
    }
    let mut end = capacity;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
