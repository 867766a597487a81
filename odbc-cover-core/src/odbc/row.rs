/// Values of the current row, one per column, as text.
///
/// Character data is trimmed of trailing spaces, the padding drivers add to
/// fixed width columns. `None` marks a NULL cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OdbcRow {
    values: Vec<Option<String>>,
}

impl OdbcRow {
    pub(crate) fn from_raw(cells: Vec<Option<Vec<u8>>>) -> Self {
        let values = cells
            .into_iter()
            .map(|cell| cell.map(decode_cell))
            .collect();
        OdbcRow { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of column `index`; `None` when the cell is NULL or the index is
    /// out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index)?.as_deref()
    }

    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(None))
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }
}

pub(crate) fn decode_cell(mut bytes: Vec<u8>) -> String {
    let trimmed = bytes.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    bytes.truncate(trimmed);

    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
