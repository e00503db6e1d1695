//! Lenient SQL tokenization and statement splitting.
//!
//! This module groups the building blocks every other analysis stage works
//! on. Nothing here needs a complete or valid query: it runs against whatever
//! the user has typed so far.
//!
//! Modules:
//! - `dialect`    : Per-language keyword lists and quoting rules.
//! - `keyword`    : Structural keywords the splitter and lineage scans act on.
//! - `token_kind` : Classification of lexical atoms.
//! - `token`      : Token struct pairing a `TokenKind` with its text and position.
//! - `span`       : Byte ranges and editor positions.
//! - `tokenizer`  : Single pass O(n) tokenizer producing a gap-free `Vec<Token>`.
//! - `statement`  : Statement splitting and shallow clause detection.
//!
//! Design Principles:
//! 1. Accept incomplete / syntactically invalid SQL (robust for live editing).
//! 2. Preserve original text exactly; concatenated token values equal the input.
//! 3. Classify only the clauses downstream consumers act on.
//!
//! Example:
//! ```rust
//! use sqlbook::prelude::*;
//!
//! let tokens = tokenize("SELECT a FROM t1; SELECT b FROM t2", "presto");
//! let statements = simple_parse(&tokens);
//! assert_eq!(statements.len(), 2);
//! assert!(tokens.iter().any(|t| t.ident() == Some("t2")));
//! ```
//!
//! NOTE: This is **not** a full SQL parser. Syntax checking uses `sqlparser`
//! from the lint stage instead.

pub mod dialect;
pub mod keyword;
pub mod span;
pub mod statement;
pub mod token;
pub mod token_kind;
pub mod tokenizer;

pub use dialect::SqlDialect;
pub use keyword::Keyword;
pub use span::{Position, Span};
pub use statement::{
    Clause, ClauseKind, LineInfo, Statement, StatementKind, get_editor_lines, position_at,
    simple_parse,
};
pub use token::Token;
pub use token_kind::TokenKind;
pub use tokenizer::{RecoveryPolicy, TokenizeOptions, Tokenizer, tokenize};

/// Convenience prelude re-exporting the most commonly used items.
///
/// Import with:
/// `use sqlbook::prelude::*;`
pub mod prelude {
    pub use super::{Keyword, Statement, Token, TokenKind, simple_parse, tokenize};
}
