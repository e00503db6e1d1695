use crate::sql::Position;
use serde::{Deserialize, Serialize};

/// Caret location in the editor buffer, as a byte offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    offset: usize,
}

impl Cursor {
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }

    /// Convert an editor position (zero-based line, character column) into a
    /// cursor over `sql`. Positions past the end of a line clamp to the line
    /// end; lines past the end of the buffer clamp to the buffer end.
    pub fn from_position(sql: &str, position: Position) -> Self {
        let mut line_start = 0;
        for _ in 0..position.line {
            match sql[line_start..].find('\n') {
                Some(idx) => line_start += idx + 1,
                None => return Self::new(sql.len()),
            }
        }
        let line = &sql[line_start..];
        let line_len = line.find('\n').unwrap_or(line.len());
        let column = line[..line_len]
            .char_indices()
            .nth(position.ch)
            .map_or(line_len, |(idx, _)| idx);
        Self::new(line_start + column)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl From<usize> for Cursor {
    fn from(offset: usize) -> Self {
        Self::new(offset)
    }
}
