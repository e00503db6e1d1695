//! Token kind definitions for the SQL tokenizer.
//!
//! Every byte of the input belongs to exactly one token, so whitespace and
//! comments are tokens too. They are grouped as *trivia* and skipped by most
//! consumers.

use serde::{Deserialize, Serialize};

/// Classification for a token produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// A word in the dialect's keyword list.
    #[display("keyword")]
    Keyword,
    /// Table / alias / column / generic identifier, bare or quoted.
    #[display("identifier")]
    Identifier,
    /// Arithmetic, comparison and other symbolic operators.
    #[display("operator")]
    Operator,
    /// String literal, including its quotes.
    #[display("string")]
    String,
    #[display("number")]
    Number,
    /// Line or block comment, including its delimiters.
    #[display("comment")]
    Comment,
    #[display("whitespace")]
    Whitespace,
    /// Structural punctuation: `,` `.` `;` and brackets.
    #[display("punctuation")]
    Punctuation,
}

impl TokenKind {
    /// True for tokens that carry no syntax (whitespace and comments).
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// True if this token names something (keyword or identifier).
    pub fn is_word(&self) -> bool {
        matches!(self, TokenKind::Keyword | TokenKind::Identifier)
    }
}
