use crate::error::Error;
use crate::logger::LogSettings;
use log::LevelFilter;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

mod parse;

/// Initial size of the buffer a cell is read into. Longer values grow the
/// buffer and are read again, they are never truncated.
pub const DEFAULT_TEXT_BUFFER_SIZE: usize = 8192;

/// Seconds the driver may spend logging in.
pub const DEFAULT_LOGIN_TIMEOUT: u32 = 5;

/// How the driver manager should reach the database.
#[derive(Clone, PartialEq, Eq)]
pub enum OdbcConnectTarget {
    /// A named data source plus credentials (`SQLConnect`).
    DataSource {
        dsn: String,
        username: Option<String>,
        password: Option<String>,
    },
    /// A complete connection string (`SQLDriverConnect`).
    ConnectionString(String),
}

impl Debug for OdbcConnectTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OdbcConnectTarget::DataSource { dsn, username, .. } => f
                .debug_struct("DataSource")
                .field("dsn", dsn)
                .field("username", username)
                .finish_non_exhaustive(),
            OdbcConnectTarget::ConnectionString(_) => {
                f.write_str("ConnectionString(<redacted>)")
            }
        }
    }
}

/// Options and flags which can be used to configure an ODBC session.
///
/// A value can be parsed from any of these forms:
///
/// ```text
/// MyDataSource
/// odbc:MyDataSource
/// DSN=MyDataSource;UID=myuser;PWD=mypassword
/// Driver={ODBC Driver 17 for SQL Server};Server=localhost;Database=test
/// ```
///
/// Strings made only of `DSN`, `UID` and `PWD` keys log on to the named data
/// source; anything else is handed to the driver manager as is.
#[derive(Clone)]
pub struct OdbcConnectOptions {
    pub(crate) target: OdbcConnectTarget,
    pub(crate) login_timeout: u32,
    pub(crate) text_buffer_size: usize,
    pub(crate) log_settings: LogSettings,
}

impl OdbcConnectOptions {
    /// Options for the data source named `dsn`, without credentials.
    pub fn new(dsn: &str) -> Self {
        Self::with_target(OdbcConnectTarget::DataSource {
            dsn: dsn.to_owned(),
            username: None,
            password: None,
        })
    }

    pub(crate) fn with_target(target: OdbcConnectTarget) -> Self {
        Self {
            target,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            text_buffer_size: DEFAULT_TEXT_BUFFER_SIZE,
            log_settings: LogSettings::default(),
        }
    }

    /// Reads the options from the `DATABASE_URL` environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let url = std::env::var("DATABASE_URL").map_err(Error::config)?;
        Self::from_str(&url)
    }

    pub fn target(&self) -> &OdbcConnectTarget {
        &self.target
    }

    /// Sets the user to log on as. Switches a connection string target over to
    /// a data source target only when it names one.
    pub fn username(&mut self, username: &str) -> &mut Self {
        if let OdbcConnectTarget::DataSource {
            username: current, ..
        } = &mut self.target
        {
            *current = Some(username.to_owned());
        }
        self
    }

    pub fn password(&mut self, password: &str) -> &mut Self {
        if let OdbcConnectTarget::DataSource {
            password: current, ..
        } = &mut self.target
        {
            *current = Some(password.to_owned());
        }
        self
    }

    /// Sets the login timeout, in seconds. Zero waits forever.
    pub fn login_timeout(&mut self, seconds: u32) -> &mut Self {
        self.login_timeout = seconds;
        self
    }

    /// Sets the initial size of the buffer cell values are read into.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    pub fn text_buffer_size(&mut self, size: usize) -> &mut Self {
        assert!(size > 0, "text_buffer_size must be greater than 0");
        self.text_buffer_size = size;
        self
    }

    /// Sets the level statements are logged at.
    pub fn log_statements(&mut self, level: LevelFilter) -> &mut Self {
        self.log_settings.log_statements(level);
        self
    }

    /// Sets the level statements slower than `duration` are logged at.
    pub fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) -> &mut Self {
        self.log_settings.log_slow_statements(level, duration);
        self
    }
}

impl Debug for OdbcConnectOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdbcConnectOptions")
            .field("target", &self.target)
            .field("login_timeout", &self.login_timeout)
            .field("text_buffer_size", &self.text_buffer_size)
            .finish()
    }
}

impl FromStr for OdbcConnectOptions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_target(s).map(Self::with_target)
    }
}
