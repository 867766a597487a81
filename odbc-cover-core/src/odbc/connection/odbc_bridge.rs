use crate::error::Error;
use crate::odbc::statement::{FetchOrientation, RawRow, StatementHandle};
use crate::odbc::type_info::DescribedType;
use crate::odbc::{OdbcColumn, OdbcConnectOptions, OdbcConnectTarget};
use odbc_api::handles::{AsStatementRef, Nullability, Statement, StatementImpl, StatementRef};
use odbc_api::{ConnectionOptions, Cursor, CursorImpl, Preallocated, ResultSetMetadata};

type OdbcConnection = odbc_api::Connection<'static>;

pub(crate) fn establish_connection(options: &OdbcConnectOptions) -> Result<OdbcConnection, Error> {
    // The environment is created once per process and shared by every session.
    let env = odbc_api::environment().map_err(|e| Error::Configuration(e.to_string().into()))?;

    let connection_options = ConnectionOptions {
        login_timeout_sec: Some(options.login_timeout),
        ..Default::default()
    };

    let conn = match &options.target {
        OdbcConnectTarget::DataSource {
            dsn,
            username,
            password,
        } => env.connect(
            dsn,
            username.as_deref().unwrap_or(""),
            password.as_deref().unwrap_or(""),
            connection_options,
        )?,
        OdbcConnectTarget::ConnectionString(conn_str) => {
            env.connect_with_connection_string(conn_str, connection_options)?
        }
    };

    Ok(conn)
}

/// Driver statement handle bound to a session's connection.
///
/// The handle is allocated up front and reused by every execution. A result
/// set stays open on it until the next execution or [`close_cursor`].
///
/// [`close_cursor`]: StatementHandle::close_cursor
pub(crate) struct OdbcHandle<'c> {
    statement: Preallocated<StatementImpl<'c>>,
    has_cursor: bool,
    scrollable: bool,
    applied_scrollable: bool,
    text_buffer_size: usize,
}

impl<'c> OdbcHandle<'c> {
    pub(crate) fn new(conn: &'c OdbcConnection, text_buffer_size: usize) -> Result<Self, Error> {
        Ok(OdbcHandle {
            statement: conn.preallocate()?,
            has_cursor: false,
            scrollable: false,
            applied_scrollable: false,
            text_buffer_size,
        })
    }

    fn hstmt(&mut self) -> odbc_api::sys::HStmt {
        self.statement.as_stmt_ref().as_sys()
    }

    /// Runs `f` against the open result set.
    #[allow(unsafe_code)]
    fn with_cursor<R>(
        &mut self,
        f: impl FnOnce(&mut CursorImpl<StatementRef<'_>>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        if !self.has_cursor {
            return Err(err_protocol!("no open result set"));
        }

        // SAFETY: `has_cursor` is only set while the statement is in cursor state.
        let mut cursor = unsafe { CursorImpl::new(self.statement.as_stmt_ref()) };
        let result = f(&mut cursor);
        cursor.into_stmt();
        result
    }

    fn apply_cursor_type(&mut self) -> Result<(), Error> {
        if self.scrollable != self.applied_scrollable {
            let scrollable = self.scrollable;
            raw::set_cursor_type(self.hstmt(), scrollable)?;
            self.applied_scrollable = scrollable;
        }
        Ok(())
    }
}

impl StatementHandle for OdbcHandle<'_> {
    fn set_scrollable(&mut self, scrollable: bool) {
        self.scrollable = scrollable;
    }

    fn exec_direct(&mut self, sql: &str) -> Result<bool, Error> {
        self.close_cursor();
        self.apply_cursor_type()?;

        self.has_cursor = match self.statement.execute(sql, ())? {
            Some(cursor) => {
                cursor.into_stmt();
                true
            }
            None => false,
        };
        Ok(self.has_cursor)
    }

    fn open_columns(&mut self, catalog: &str, schema: &str, table: &str) -> Result<(), Error> {
        self.close_cursor();
        self.apply_cursor_type()?;

        // Leave the cursor open on the handle; `close_cursor` ends it.
        self.statement.columns(catalog, schema, table, "")?.into_stmt();
        self.has_cursor = true;
        Ok(())
    }

    fn num_result_cols(&mut self) -> Result<u16, Error> {
        if !self.has_cursor {
            return Ok(0);
        }

        let count = self.with_cursor(|cursor| Ok(cursor.num_result_cols()?))?;
        u16::try_from(count).map_err(|_| err_protocol!("driver reported {} result columns", count))
    }

    fn describe_col(&mut self, index: u16) -> Result<OdbcColumn, Error> {
        let cd = self.with_cursor(|cursor| {
            let mut cd = odbc_api::ColumnDescription::default();
            cursor.describe_col(index, &mut cd)?;
            Ok(cd)
        })?;

        let nullable = matches!(cd.nullability, Nullability::Nullable);
        Ok(OdbcColumn::described(
            cd.name_to_string()
                .unwrap_or_else(|_| format!("col{}", index - 1)),
            usize::from(index - 1),
            DescribedType::from(cd.data_type),
            nullable,
        ))
    }

    fn fetch(
        &mut self,
        orientation: FetchOrientation,
        column_count: u16,
    ) -> Result<Option<RawRow>, Error> {
        if !self.has_cursor {
            return Ok(None);
        }

        let text_buffer_size = self.text_buffer_size;
        match orientation {
            FetchOrientation::Next => {
                self.with_cursor(|cursor| fetch_next(cursor, column_count, text_buffer_size))
            }
            positioned => {
                let hstmt = self.hstmt();
                raw::fetch_scroll(hstmt, positioned, column_count, text_buffer_size)
            }
        }
    }

    fn close_cursor(&mut self) {
        if self.has_cursor {
            self.has_cursor = false;
            // Fails only when no cursor is open, which is the state wanted.
            let _ = self.statement.as_stmt_ref().close_cursor();
        }
    }
}

fn fetch_next(
    cursor: &mut impl Cursor,
    column_count: u16,
    text_buffer_size: usize,
) -> Result<Option<RawRow>, Error> {
    let Some(mut row) = cursor.next_row()? else {
        return Ok(None);
    };

    let mut cells = Vec::with_capacity(usize::from(column_count));
    for col in 1..=column_count {
        // get_text grows the buffer and reads again until the value fits.
        let mut buf = Vec::with_capacity(text_buffer_size);
        let cell = row.get_text(col, &mut buf)?.then_some(buf);
        cells.push(cell);
    }

    Ok(Some(cells))
}

/// Raw calls without a safe `odbc-api` wrapper: cursor type selection and
/// positioned fetches.
#[allow(unsafe_code)]
mod raw {
    use crate::error::Error;
    use crate::odbc::statement::{FetchOrientation, RawRow};
    use crate::odbc::OdbcDatabaseError;
    use odbc_api::sys::{
        self, CDataType, HStmt, Handle, HandleType, Len, Pointer, SqlReturn, StatementAttribute,
        NO_TOTAL, NULL_DATA,
    };

    const CURSOR_FORWARD_ONLY: usize = 0;
    const CURSOR_STATIC: usize = 3;

    /// Selects a static (scrollable) or forward-only cursor for the next
    /// execution. Must be called while no cursor is open.
    pub(super) fn set_cursor_type(hstmt: HStmt, scrollable: bool) -> Result<(), Error> {
        let cursor_type = if scrollable {
            CURSOR_STATIC
        } else {
            CURSOR_FORWARD_ONLY
        };

        // SAFETY: integer valued attribute, passed by value in the pointer.
        let ret = unsafe {
            sys::SQLSetStmtAttr(
                hstmt,
                StatementAttribute::CursorType,
                cursor_type as Pointer,
                0,
            )
        };
        check(ret, hstmt, "SQLSetStmtAttr")
    }

    pub(super) fn fetch_scroll(
        hstmt: HStmt,
        orientation: FetchOrientation,
        column_count: u16,
        text_buffer_size: usize,
    ) -> Result<Option<RawRow>, Error> {
        let (sys_orientation, offset) = match orientation {
            FetchOrientation::Next => (sys::FetchOrientation::Next, 0),
            FetchOrientation::First => (sys::FetchOrientation::First, 0),
            FetchOrientation::Last => (sys::FetchOrientation::Last, 0),
            FetchOrientation::Prior => (sys::FetchOrientation::Prior, 0),
            FetchOrientation::Absolute(offset) => (sys::FetchOrientation::Absolute, offset),
            FetchOrientation::Relative(offset) => (sys::FetchOrientation::Relative, offset),
        };

        // SAFETY: `hstmt` is a live statement in cursor state and no buffers
        // are bound to it.
        let ret = unsafe { sys::SQLFetchScroll(hstmt, sys_orientation, offset) };
        if ret == SqlReturn::NO_DATA {
            return Ok(None);
        }
        check(ret, hstmt, "SQLFetchScroll")?;

        let mut cells = Vec::with_capacity(usize::from(column_count));
        for col in 1..=column_count {
            cells.push(get_text(hstmt, col, text_buffer_size)?);
        }

        Ok(Some(cells))
    }

    /// Reads a cell as character data. Starts with `initial` bytes and reads
    /// the remainder whenever the driver reports truncation.
    fn get_text(hstmt: HStmt, col: u16, initial: usize) -> Result<Option<Vec<u8>>, Error> {
        let mut value = Vec::new();
        // One extra byte for the terminating zero the driver always writes.
        let mut buf = vec![0u8; initial.max(1) + 1];

        loop {
            let mut indicator: Len = 0;
            // SAFETY: `buf` outlives the call and its length is passed along.
            let ret = unsafe {
                sys::SQLGetData(
                    hstmt,
                    col,
                    CDataType::Char,
                    buf.as_mut_ptr() as Pointer,
                    buf.len() as Len,
                    &mut indicator,
                )
            };

            if ret == SqlReturn::NO_DATA {
                // Every part has been read already.
                return Ok(Some(value));
            }
            check(ret, hstmt, "SQLGetData")?;

            if indicator == NULL_DATA {
                return Ok(None);
            }

            let capacity = buf.len() - 1;
            let truncated = ret == SqlReturn::SUCCESS_WITH_INFO
                && (indicator == NO_TOTAL || indicator as usize > capacity);

            if !truncated {
                let written = (indicator as usize).min(capacity);
                value.extend_from_slice(&buf[..written]);
                return Ok(Some(value));
            }

            value.extend_from_slice(&buf[..capacity]);
            let remaining = if indicator == NO_TOTAL {
                capacity * 2
            } else {
                indicator as usize - capacity
            };
            buf.resize(remaining + 1, 0);
        }
    }

    fn check(ret: SqlReturn, hstmt: HStmt, function: &'static str) -> Result<(), Error> {
        if ret == SqlReturn::SUCCESS || ret == SqlReturn::SUCCESS_WITH_INFO {
            return Ok(());
        }
        Err(diagnostic(hstmt, function).into())
    }

    fn diagnostic(hstmt: HStmt, function: &'static str) -> OdbcDatabaseError {
        let mut state = [0u8; 6];
        let mut native_error = 0;
        let mut message = vec![0u8; 512];
        let mut text_length = 0;

        // SAFETY: all out pointers reference live locals sized as passed.
        let ret = unsafe {
            sys::SQLGetDiagRec(
                HandleType::Stmt,
                hstmt as Handle,
                1,
                state.as_mut_ptr(),
                &mut native_error,
                message.as_mut_ptr(),
                message.len() as i16,
                &mut text_length,
            )
        };

        if ret != SqlReturn::SUCCESS && ret != SqlReturn::SUCCESS_WITH_INFO {
            return OdbcDatabaseError::Diagnostic {
                function,
                state: "HY000".to_owned(),
                native_error: 0,
                message: "no diagnostic record available".to_owned(),
            };
        }

        let text_length = usize::try_from(text_length)
            .unwrap_or(0)
            .min(message.len() - 1);
        OdbcDatabaseError::Diagnostic {
            function,
            state: String::from_utf8_lossy(&state[..5]).into_owned(),
            native_error,
            message: String::from_utf8_lossy(&message[..text_length]).into_owned(),
        }
    }
}
