use crate::error::Error;
use crate::logger::QueryLogger;
use crate::odbc::connection::odbc_bridge::OdbcHandle;
use crate::odbc::{ColumnIndex, OdbcColumn, OdbcRow, OdbcSession};
use std::fmt;

mod catalog;
mod command;
mod dump;

#[cfg(test)]
pub(crate) mod mock;

use command::CommandBuffer;
pub use command::{SqlFragment, APPENDF_MAX_LEN};

/// One fetched row as the driver returned it: raw character data per column,
/// `None` for NULL.
pub(crate) type RawRow = Vec<Option<Vec<u8>>>;

/// Which row a fetch should position the cursor on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrientation {
    #[default]
    Next,
    First,
    Last,
    Prior,
    /// 1-based row number; negative values count back from the end.
    Absolute(isize),
    /// Offset from the current row.
    Relative(isize),
}

/// What a successful fetch found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum FetchOutcome {
    /// A row is now current and its values can be read.
    Row,
    /// There are no more rows in the requested direction.
    EndOfData,
}

impl FetchOutcome {
    pub fn is_row(self) -> bool {
        matches!(self, FetchOutcome::Row)
    }
}

/// Driver side of a statement: executes text, describes and fetches.
pub(crate) trait StatementHandle {
    /// Selects a scrollable or forward-only cursor for later executions.
    fn set_scrollable(&mut self, scrollable: bool);

    /// Executes `sql` directly. Returns whether a result set is open.
    fn exec_direct(&mut self, sql: &str) -> Result<bool, Error>;

    /// Opens the catalog result set describing the columns of `table`. Empty
    /// `catalog` and `schema` match any.
    fn open_columns(&mut self, catalog: &str, schema: &str, table: &str) -> Result<(), Error>;

    /// Number of columns of the open result set; zero when none is open.
    fn num_result_cols(&mut self) -> Result<u16, Error>;

    /// Describes the 1-based column `index` of the open result set.
    fn describe_col(&mut self, index: u16) -> Result<OdbcColumn, Error>;

    /// Moves the cursor and reads `column_count` cells as text. `None` when
    /// no row lies in the requested direction.
    fn fetch(
        &mut self,
        orientation: FetchOrientation,
        column_count: u16,
    ) -> Result<Option<RawRow>, Error>;

    fn close_cursor(&mut self);
}

type BoxedHandle<'s> = Box<dyn StatementHandle + 's>;

/// A SQL statement bound to an [`OdbcSession`].
///
/// Command text is built up with [`append`](Self::append) and friends, then
/// run with [`execute`](Self::execute). After a successful execution the
/// result set columns are described and rows can be fetched one at a time;
/// values of the current row are read as text.
///
/// ```no_run
/// # fn main() -> odbc_cover_core::Result<()> {
/// use odbc_cover_core::odbc::{OdbcSession, OdbcStatement};
///
/// let session = OdbcSession::connect("DSN=test;UID=sa;PWD=secret")?;
/// let mut stmt = OdbcStatement::new(&session);
/// stmt.append("SELECT id, label FROM items WHERE id > ");
/// stmt.append(10);
/// stmt.execute()?;
///
/// while stmt.fetch_next()?.is_row() {
///     println!("{} {}", stmt.value_or(0, ""), stmt.value_or("label", "-"));
/// }
/// # Ok(())
/// # }
/// ```
pub struct OdbcStatement<'s> {
    session: &'s OdbcSession,
    handle: Option<BoxedHandle<'s>>,
    command: CommandBuffer,
    columns: Vec<OdbcColumn>,
    row: Option<OdbcRow>,
}

impl<'s> OdbcStatement<'s> {
    /// Creates a statement on `session`.
    ///
    /// When the session is not connected the statement is still created, but
    /// every operation on it fails with [`Error::StatementUnavailable`].
    pub fn new(session: &'s OdbcSession) -> Self {
        let allocated = session
            .connection()
            .and_then(|conn| OdbcHandle::new(conn, session.text_buffer_size));

        let handle = match session.record(allocated) {
            Ok(handle) => {
                let handle: BoxedHandle<'s> = Box::new(handle);
                Some(handle)
            }
            Err(err) => {
                log::warn!("statement created without a driver handle: {}", err);
                None
            }
        };

        Self::with_handle(session, handle)
    }

    pub(crate) fn with_handle(session: &'s OdbcSession, handle: Option<BoxedHandle<'s>>) -> Self {
        OdbcStatement {
            session,
            handle,
            command: CommandBuffer::default(),
            columns: Vec::new(),
            row: None,
        }
    }

    pub fn session(&self) -> &'s OdbcSession {
        self.session
    }

    /// Appends `fragment` to the command text, with no separator.
    pub fn append(&mut self, fragment: impl SqlFragment) -> &mut Self {
        self.command.push(fragment);
        self
    }

    /// Appends formatted text. See also the [`appendf!`](crate::appendf)
    /// macro.
    ///
    /// The expansion may be at most [`APPENDF_MAX_LEN`] bytes long; longer
    /// text appends nothing and fails with [`Error::CommandOverflow`].
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        self.command.push_fmt(args)
    }

    /// Empties the command text. Column descriptors and the current row are
    /// kept.
    pub fn clear(&mut self) {
        self.command.clear();
    }

    /// The command text accumulated so far.
    pub fn sql(&self) -> &str {
        self.command.as_str()
    }

    /// Asks for a scrollable cursor on later executions, so that
    /// [`fetch`](Self::fetch) accepts every [`FetchOrientation`]. Cursors are
    /// forward-only by default and only move with [`FetchOrientation::Next`].
    ///
    /// Has no effect on a statement without a driver handle.
    pub fn set_scrollable(&mut self, scrollable: bool) -> &mut Self {
        if let Some(handle) = self.handle.as_mut() {
            handle.set_scrollable(scrollable);
        }
        self
    }

    /// Replaces the command text with `sql` and executes it.
    pub fn execute_sql(&mut self, sql: &str) -> Result<(), Error> {
        self.clear();
        self.append(sql);
        self.execute()
    }

    /// Executes the accumulated command text and describes the columns of
    /// its result set, if it has one.
    ///
    /// Previous column descriptors and row values are discarded first. On
    /// failure no columns are described.
    pub fn execute(&mut self) -> Result<(), Error> {
        self.columns.clear();
        self.row = None;

        let session = self.session;
        let handle = handle_mut(&mut self.handle, session)?;

        let mut logger = QueryLogger::new(self.command.as_str(), session.log_settings.clone());
        let has_result_set = session.record(handle.exec_direct(self.command.as_str()))?;

        if has_result_set {
            self.collect_results_info()?;
        }
        logger.set_columns(self.columns.len());

        Ok(())
    }

    /// Describes every column of the open result set. Descriptors are only
    /// kept when all of them could be read.
    fn collect_results_info(&mut self) -> Result<(), Error> {
        let session = self.session;
        let handle = handle_mut(&mut self.handle, session)?;

        let count = session.record(handle.num_result_cols())?;
        let mut columns = Vec::with_capacity(usize::from(count));
        for index in 1..=count {
            columns.push(session.record(handle.describe_col(index))?);
        }

        self.columns = columns;
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[OdbcColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&OdbcColumn> {
        self.columns.get(index)
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.column(index).map(OdbcColumn::name)
    }

    pub fn column_type(&self, index: usize) -> Option<i16> {
        self.column(index).map(OdbcColumn::sql_type)
    }

    pub fn column_size(&self, index: usize) -> Option<usize> {
        self.column(index).map(OdbcColumn::size)
    }

    pub fn column_precision(&self, index: usize) -> Option<i16> {
        self.column(index).map(OdbcColumn::precision)
    }

    pub fn column_nullable(&self, index: usize) -> Option<bool> {
        self.column(index).map(OdbcColumn::nullable)
    }

    /// Position of the first column named `name`, compared case-insensitively.
    pub fn column_id(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Fetches the row `orientation` points at and makes it current.
    ///
    /// The previous row's values are released before the driver is asked,
    /// whatever the outcome. A statement without a result set always reports
    /// [`FetchOutcome::EndOfData`]. Positioned orientations need a cursor
    /// type the driver can scroll.
    pub fn fetch(&mut self, orientation: FetchOrientation) -> Result<FetchOutcome, Error> {
        self.row = None;

        let session = self.session;
        let handle = handle_mut(&mut self.handle, session)?;

        if self.columns.is_empty() {
            return Ok(FetchOutcome::EndOfData);
        }

        let column_count = u16::try_from(self.columns.len())
            .map_err(|_| err_protocol!("{} columns exceed the driver limit", self.columns.len()))?;

        match session.record(handle.fetch(orientation, column_count))? {
            None => Ok(FetchOutcome::EndOfData),
            Some(raw) => {
                if raw.len() != self.columns.len() {
                    return session.record(Err(err_protocol!(
                        "fetched {} cells for {} columns",
                        raw.len(),
                        self.columns.len()
                    )));
                }
                self.row = Some(OdbcRow::from_raw(raw));
                Ok(FetchOutcome::Row)
            }
        }
    }

    /// Fetches the next row.
    pub fn fetch_next(&mut self) -> Result<FetchOutcome, Error> {
        self.fetch(FetchOrientation::Next)
    }

    /// The current row, if a fetch found one.
    pub fn row(&self) -> Option<&OdbcRow> {
        self.row.as_ref()
    }

    /// Value of a column of the current row, by position or by name.
    ///
    /// `None` when there is no current row, no such column, or the value is
    /// NULL.
    pub fn value<I>(&self, index: I) -> Option<&str>
    where
        I: ColumnIndex<Self>,
    {
        let index = index.index(self).ok()?;
        self.row.as_ref()?.get(index)
    }

    /// Like [`value`](Self::value), falling back to `default`.
    pub fn value_or<'a, I>(&'a self, index: I, default: &'a str) -> &'a str
    where
        I: ColumnIndex<Self>,
    {
        self.value(index).unwrap_or(default)
    }
}

impl fmt::Debug for OdbcStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdbcStatement")
            .field("sql", &self.command.as_str())
            .field("columns", &self.columns)
            .field("has_handle", &self.handle.is_some())
            .finish()
    }
}

fn handle_mut<'a, 's>(
    handle: &'a mut Option<BoxedHandle<'s>>,
    session: &OdbcSession,
) -> Result<&'a mut (dyn StatementHandle + 's), Error> {
    match handle.as_deref_mut() {
        Some(handle) => Ok(handle),
        None => session.record(Err(Error::StatementUnavailable)),
    }
}

/// Appends formatted text to a statement's command.
///
/// Expands to a call to [`OdbcStatement::append_fmt`] and evaluates to its
/// result.
///
/// ```no_run
/// # fn main() -> odbc_cover_core::Result<()> {
/// # use odbc_cover_core::odbc::{OdbcSession, OdbcStatement};
/// # let session = OdbcSession::new();
/// let mut stmt = OdbcStatement::new(&session);
/// odbc_cover_core::appendf!(stmt, "SELECT * FROM {} WHERE id = {}", "items", 7)?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! appendf {
    ($stmt:expr, $($arg:tt)*) => {
        $stmt.append_fmt(::std::format_args!($($arg)*))
    };
}
