use crate::error::Error;
use std::fmt::{self, Write};

/// Longest expansion a formatted append accepts, in bytes. Longer text has
/// to go through [`append`](crate::odbc::OdbcStatement::append).
pub const APPENDF_MAX_LEN: usize = 7999;

/// Pending SQL command text.
#[derive(Debug, Default, Clone)]
pub(crate) struct CommandBuffer {
    text: String,
}

impl CommandBuffer {
    pub(crate) fn push(&mut self, fragment: impl SqlFragment) {
        fragment.write_to(&mut self.text);
    }

    /// Formats `args` into a bounded scratch area and appends the result.
    /// Nothing is appended when the expansion does not fit.
    pub(crate) fn push_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        let mut scratch = Scratch {
            text: String::new(),
            limit: APPENDF_MAX_LEN,
        };
        scratch.write_fmt(args).map_err(|_| Error::CommandOverflow {
            limit: APPENDF_MAX_LEN,
        })?;

        self.text.push_str(&scratch.text);
        Ok(())
    }

    /// Releases the text, capacity included.
    pub(crate) fn clear(&mut self) {
        self.text = String::new();
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }
}

struct Scratch {
    text: String,
    limit: usize,
}

impl Write for Scratch {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.text.len() + s.len() > self.limit {
            return Err(fmt::Error);
        }
        self.text.push_str(s);
        Ok(())
    }
}

/// A value that can be appended to a statement's command text.
///
/// Numbers are written in their canonical decimal form, without grouping or
/// locale specific separators.
pub trait SqlFragment {
    fn write_to(self, buf: &mut String);
}

impl SqlFragment for &str {
    fn write_to(self, buf: &mut String) {
        buf.push_str(self);
    }
}

impl SqlFragment for &String {
    fn write_to(self, buf: &mut String) {
        buf.push_str(self);
    }
}

impl SqlFragment for String {
    fn write_to(self, buf: &mut String) {
        buf.push_str(&self);
    }
}

impl SqlFragment for char {
    fn write_to(self, buf: &mut String) {
        buf.push(self);
    }
}

macro_rules! impl_sql_fragment_for_int {
    ($($ty:ty),*) => {
        $(
            impl SqlFragment for $ty {
                fn write_to(self, buf: &mut String) {
                    buf.push_str(itoa::Buffer::new().format(self));
                }
            }
        )*
    };
}

impl_sql_fragment_for_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_sql_fragment_for_float {
    ($($ty:ty),*) => {
        $(
            impl SqlFragment for $ty {
                fn write_to(self, buf: &mut String) {
                    // Display never fails writing into a String.
                    let _ = write!(buf, "{}", self);
                }
            }
        )*
    };
}

impl_sql_fragment_for_float!(f32, f64);
