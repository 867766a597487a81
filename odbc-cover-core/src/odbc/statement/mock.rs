//! Scripted in-memory driver used by the statement tests.

use super::{FetchOrientation, RawRow, StatementHandle};
use crate::error::Error;
use crate::odbc::type_info::DescribedType;
use crate::odbc::{OdbcColumn, OdbcDatabaseError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// What the driver answers to one execution.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockResult {
    columns: Vec<(String, i16)>,
    rows: Vec<RawRow>,
    fail_execute: bool,
    fail_describe_at: Option<u16>,
    fail_fetch_at: Option<usize>,
}

impl MockResult {
    /// A statement without a result set.
    pub(crate) fn none() -> Self {
        Self::default()
    }

    pub(crate) fn new(columns: &[(&str, i16)]) -> Self {
        MockResult {
            columns: columns
                .iter()
                .map(|(name, ty)| ((*name).to_owned(), *ty))
                .collect(),
            ..Self::default()
        }
    }

    pub(crate) fn row(mut self, cells: &[Option<&str>]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|cell| cell.map(|text| text.as_bytes().to_vec()))
                .collect(),
        );
        self
    }

    pub(crate) fn fail_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    /// Fails describing the 1-based column `index`.
    pub(crate) fn fail_describe_at(mut self, index: u16) -> Self {
        self.fail_describe_at = Some(index);
        self
    }

    /// Fails the fetch call number `call`, counting from zero.
    pub(crate) fn fail_fetch_at(mut self, call: usize) -> Self {
        self.fail_fetch_at = Some(call);
        self
    }
}

struct OpenCursor {
    result: MockResult,
    // Row index, -1 before the first row and rows.len() after the last.
    position: isize,
    fetches: usize,
    scrollable: bool,
}

pub(crate) struct MockHandle {
    results: VecDeque<MockResult>,
    cursor: Option<OpenCursor>,
    scrollable: bool,
    executed: Rc<RefCell<Vec<String>>>,
}

impl MockHandle {
    /// A handle answering successive executions with `results`, in order.
    pub(crate) fn new(results: Vec<MockResult>) -> Self {
        MockHandle {
            results: results.into(),
            cursor: None,
            scrollable: false,
            executed: Rc::default(),
        }
    }

    /// Every text executed and every catalog request made, in order.
    pub(crate) fn executed(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.executed)
    }

    fn open(&mut self, result: MockResult) -> bool {
        let has_result_set = !result.columns.is_empty();
        self.cursor = has_result_set.then_some(OpenCursor {
            result,
            position: -1,
            fetches: 0,
            scrollable: self.scrollable,
        });
        has_result_set
    }

    fn cursor(&mut self) -> Result<&mut OpenCursor, Error> {
        self.cursor
            .as_mut()
            .ok_or_else(|| err_protocol!("no open result set"))
    }
}

fn diagnostic(function: &'static str, state: &str, message: &str) -> Error {
    OdbcDatabaseError::Diagnostic {
        function,
        state: state.to_owned(),
        native_error: 0,
        message: message.to_owned(),
    }
    .into()
}

impl StatementHandle for MockHandle {
    fn set_scrollable(&mut self, scrollable: bool) {
        self.scrollable = scrollable;
    }

    fn exec_direct(&mut self, sql: &str) -> Result<bool, Error> {
        self.cursor = None;
        self.executed.borrow_mut().push(sql.to_owned());

        let result = self
            .results
            .pop_front()
            .ok_or_else(|| err_protocol!("unscripted execution: {}", sql))?;

        if result.fail_execute {
            return Err(OdbcDatabaseError::Diagnostic {
                function: "SQLExecDirect",
                state: "42000".to_owned(),
                native_error: 102,
                message: "syntax error".to_owned(),
            }
            .into());
        }

        Ok(self.open(result))
    }

    fn open_columns(&mut self, catalog: &str, schema: &str, table: &str) -> Result<(), Error> {
        self.cursor = None;
        self.executed
            .borrow_mut()
            .push(format!("COLUMNS {catalog}.{schema}.{table}"));

        let result = self
            .results
            .pop_front()
            .ok_or_else(|| err_protocol!("unscripted catalog request for {}", table))?;

        if result.fail_execute {
            return Err(diagnostic("SQLColumns", "42S02", "table not found"));
        }

        self.open(result);
        Ok(())
    }

    fn num_result_cols(&mut self) -> Result<u16, Error> {
        Ok(self
            .cursor
            .as_ref()
            .map_or(0, |cursor| cursor.result.columns.len() as u16))
    }

    fn describe_col(&mut self, index: u16) -> Result<OdbcColumn, Error> {
        let cursor = self.cursor()?;
        if cursor.result.fail_describe_at == Some(index) {
            return Err(diagnostic("SQLDescribeCol", "07009", "invalid descriptor index"));
        }

        let (name, code) = cursor
            .result
            .columns
            .get(usize::from(index) - 1)
            .cloned()
            .ok_or_else(|| err_protocol!("no column {}", index))?;

        Ok(OdbcColumn::described(
            name,
            usize::from(index) - 1,
            DescribedType {
                code,
                size: 10,
                decimal_digits: 0,
            },
            true,
        ))
    }

    fn fetch(
        &mut self,
        orientation: FetchOrientation,
        column_count: u16,
    ) -> Result<Option<RawRow>, Error> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };

        let call = cursor.fetches;
        cursor.fetches += 1;
        if cursor.result.fail_fetch_at == Some(call) {
            return Err(diagnostic("SQLFetch", "08S01", "connection lost"));
        }

        // Forward-only cursors only move to the next row.
        if !cursor.scrollable && orientation != FetchOrientation::Next {
            return Err(diagnostic("SQLFetchScroll", "HY106", "Fetch type out of range"));
        }

        let len = cursor.result.rows.len() as isize;
        let target = match orientation {
            FetchOrientation::Next => cursor.position + 1,
            FetchOrientation::Prior => cursor.position - 1,
            FetchOrientation::First => 0,
            FetchOrientation::Last => len - 1,
            FetchOrientation::Absolute(n) if n > 0 => n - 1,
            FetchOrientation::Absolute(n) if n < 0 => len + n,
            FetchOrientation::Absolute(_) => -1,
            FetchOrientation::Relative(n) => cursor.position + n,
        };

        if target < 0 {
            cursor.position = -1;
            return Ok(None);
        }
        if target >= len {
            cursor.position = len;
            return Ok(None);
        }

        cursor.position = target;
        let row = &cursor.result.rows[target as usize];
        Ok(Some(
            row.iter()
                .take(usize::from(column_count))
                .cloned()
                .collect(),
        ))
    }

    fn close_cursor(&mut self) {
        self.cursor = None;
    }
}
