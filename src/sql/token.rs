//! Token model tying a `TokenKind` to its source text and position.
//!
//! A `Token` owns its text so that statements, lineage and lint results can
//! outlive the input buffer and cross the worker boundary. Offsets always refer
//! to the *original* SQL string supplied to the tokenizer.
use crate::sql::{keyword::Keyword, span::Position, span::Span, token_kind::TokenKind};
use serde::{Deserialize, Serialize};

/// A lexical token.
///
/// Invariants:
/// - `end >= start` and `value == sql[start..end]`
/// - `line` / `column` are zero-based, `column` counted in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    /// Set when the tokenizer closed a string, quoted identifier or block
    /// comment implicitly at end of input.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unterminated: bool,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        value: impl Into<String>,
        start: usize,
        line: usize,
        column: usize,
    ) -> Self {
        let value = value.into();
        Self {
            kind,
            end: start + value.len(),
            value,
            start,
            line,
            column,
            unterminated: false,
        }
    }

    /// Byte length of this token (`end - start`).
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the token's length is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// The structural keyword this token spells, if any.
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::from_lower(&self.value.to_ascii_lowercase()),
            _ => None,
        }
    }

    /// Returns true if this token represents a given keyword.
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.keyword() == Some(kw)
    }

    /// True if this token is the single punctuation character `c`.
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punctuation
            && self.value.len() == c.len_utf8()
            && self.value.starts_with(c)
    }

    /// True if the identifier is wrapped in quotes, backticks or brackets.
    pub fn is_quoted(&self) -> bool {
        self.kind == TokenKind::Identifier
            && self
                .value
                .chars()
                .next()
                .is_some_and(|c| matches!(c, '"' | '`' | '['))
    }

    /// Returns the identifier text, without quotes, if this token is an identifier.
    pub fn ident(&self) -> Option<&str> {
        if self.kind != TokenKind::Identifier {
            return None;
        }
        if !self.is_quoted() {
            return Some(&self.value);
        }
        let inner = &self.value[1..];
        let closing = match self.value.as_bytes()[0] {
            b'[' => ']',
            b => b as char,
        };
        Some(
            (!self.unterminated)
                .then(|| inner.strip_suffix(closing))
                .flatten()
                .unwrap_or(inner),
        )
    }

    /// Identifier or keyword text usable as a name (quotes stripped).
    pub fn name(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Identifier => self.ident(),
            TokenKind::Keyword => Some(&self.value),
            _ => None,
        }
    }

    /// Returns true if the cursor (byte offset) lies within this token's span.
    ///
    /// NOTE: End is exclusive, so `cursor == end` returns false.
    pub fn contains(&self, cursor: usize) -> bool {
        cursor >= self.start && cursor < self.end
    }

    /// True if the token ends exactly at, or spans, `cursor`.
    pub fn touches(&self, cursor: usize) -> bool {
        cursor > self.start && cursor <= self.end
    }

    /// Convenience: convert to a `(start, end)` tuple.
    pub const fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Position just past the last character of the token.
    pub fn end_position(&self) -> Position {
        match self.value.rfind('\n') {
            Some(idx) => Position::new(
                self.line + self.value.matches('\n').count(),
                self.value[idx + 1..].chars().count(),
            ),
            None => Position::new(self.line, self.column + self.value.chars().count()),
        }
    }

    pub fn source_span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
            from: self.start_position(),
            to: self.end_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{keyword::Keyword, token_kind::TokenKind};

    #[test]
    fn length_and_empty() {
        let t = Token::new(TokenKind::Punctuation, ",", 5, 0, 5);
        assert_eq!(t.len(), 1);
        assert_eq!(t.end, 6);
        assert!(!t.is_empty());
        assert!(t.is_punct(','));
        assert!(!t.is_punct('.'));
    }

    #[test]
    fn ident_access() {
        let t = Token::new(TokenKind::Identifier, "Users", 0, 0, 0);
        assert_eq!(t.ident(), Some("Users"));
        assert!(t.contains(2));
        assert!(!t.contains(5)); // end exclusive
        assert!(t.touches(5));
    }

    #[test]
    fn quoted_ident_access() {
        let t = Token::new(TokenKind::Identifier, "`my table`", 0, 0, 0);
        assert!(t.is_quoted());
        assert_eq!(t.ident(), Some("my table"));

        let t = Token::new(TokenKind::Identifier, "[dbo]", 0, 0, 0);
        assert_eq!(t.ident(), Some("dbo"));

        let mut t = Token::new(TokenKind::Identifier, "\"open", 0, 0, 0);
        t.unterminated = true;
        assert_eq!(t.ident(), Some("open"));
    }

    #[test]
    fn keyword_detection() {
        let t = Token::new(TokenKind::Keyword, "SELECT", 0, 0, 0);
        assert!(t.is_keyword(Keyword::Select));
        assert!(!t.is_keyword(Keyword::From));
        assert_eq!(t.keyword(), Some(Keyword::Select));
        assert_eq!(t.ident(), None);
    }

    #[test]
    fn short_keyword_forms_match() {
        let t = Token::new(TokenKind::Keyword, "TEMP", 0, 0, 0);
        assert!(t.is_keyword(Keyword::Temporary));
    }

    #[test]
    fn positions_across_lines() {
        let t = Token::new(TokenKind::Comment, "/* a\n bc */", 10, 2, 4);
        assert_eq!(t.start_position(), Position::new(2, 4));
        assert_eq!(t.end_position(), Position::new(3, 6));
        assert_eq!(t.span(), (10, 21));
    }
}
