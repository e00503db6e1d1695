use serde::{Deserialize, Serialize};

/// Zero-based editor position; `ch` counts characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Source range with both byte offsets and editor positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub from: Position,
    pub to: Position,
}

impl Span {
    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        let (start, from) = if self.start <= other.start {
            (self.start, self.from)
        } else {
            (other.start, other.from)
        };
        let (end, to) = if self.end >= other.end {
            (self.end, self.to)
        } else {
            (other.end, other.to)
        };
        Span { start, end, from, to }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}
