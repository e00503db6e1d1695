use crate::sql::{
    dialect::{DialectRules, SqlDialect},
    token::Token,
    token_kind::TokenKind,
};
use crate::*;

/// What to do with a string, quoted identifier or block comment that is still
/// open at end of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Close it at end of input and mark the token `unterminated`.
    #[default]
    ImplicitClose,
    /// Report `Error::Unterminated`.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub dialect: SqlDialect,
    pub recovery: RecoveryPolicy,
}

impl TokenizeOptions {
    pub fn for_language(language: &str) -> Self {
        SqlDialect::from_language(language).into()
    }

    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }
}

impl From<SqlDialect> for TokenizeOptions {
    fn from(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            recovery: RecoveryPolicy::default(),
        }
    }
}

/// Lenient SQL tokenizer producing a flat, gap-free stream of `Token`s.
///
/// Scope / Intent:
/// - Runs on every keystroke against incomplete, in-progress input.
/// - `language` picks keyword list and quoting rules; unknown names use ANSI.
///
/// Behavior:
/// - Whitespace and comments become tokens, so concatenating every token's
///   `value` reproduces `sql` exactly.
/// - Doubled quotes (`'it''s'`) never close a string; backslash escapes are
///   honoured only for dialects that use them.
/// - A word directly after `.` is always an identifier (`t.from` is a column).
/// - Unterminated strings / quoted identifiers / block comments are closed at
///   end of input and flagged `unterminated`.
///
/// Guarantees:
/// - Never panics and never fails; see [`Tokenizer`] for a strict variant.
///
/// Complexity:
/// - O(n) time, O(t) space where `t` is number of tokens.
pub fn tokenize(sql: &str, language: &str) -> Vec<Token> {
    Scanner::new(sql, SqlDialect::from_language(language)).run()
}

/// Tokenizer with an explicit [`RecoveryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    options: TokenizeOptions,
}

impl Tokenizer {
    pub fn new(options: TokenizeOptions) -> Self {
        Self { options }
    }

    pub fn tokenize(&self, sql: &str) -> Result<Vec<Token>> {
        let tokens = Scanner::new(sql, self.options.dialect).run();
        if self.options.recovery == RecoveryPolicy::Strict
            && let Some(open) = tokens.iter().find(|t| t.unterminated)
        {
            return Err(Error::Unterminated {
                kind: open.kind,
                offset: open.start,
            });
        }
        Ok(tokens)
    }
}

/// Multi-character operators, longest first.
const OPERATORS: [&str; 14] = [
    "->>", "<=>", "<=", ">=", "<>", "!=", "==", "||", "::", "->", "=>", "<<", ">>", "&&",
];

struct Scanner<'s> {
    src: &'s str,
    dialect: SqlDialect,
    rules: &'static DialectRules,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'s> Scanner<'s> {
    fn new(src: &'s str, dialect: SqlDialect) -> Self {
        Self {
            src,
            dialect,
            rules: dialect.rules(),
            pos: 0,
            line: 0,
            column: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            let (start, line, column) = (self.pos, self.line, self.column);
            let (kind, closed) = self.scan(c);
            let mut token = Token::new(kind, &self.src[start..self.pos], start, line, column);
            token.unterminated = !closed;
            self.tokens.push(token);
        }
        self.tokens
    }

    /// Consume one token starting at `c`; returns its kind and whether it was closed.
    fn scan(&mut self, c: char) -> (TokenKind, bool) {
        match c {
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                (TokenKind::Whitespace, true)
            }
            '-' if self.peek_nth(1) == Some('-') => {
                self.eat_while(|c| c != '\n');
                (TokenKind::Comment, true)
            }
            '#' if self.rules.hash_comments => {
                self.eat_while(|c| c != '\n');
                (TokenKind::Comment, true)
            }
            '/' if self.peek_nth(1) == Some('*') => (TokenKind::Comment, self.block_comment()),
            c if self.rules.identifier_quotes.contains(&c) => {
                (TokenKind::Identifier, self.quoted(c, false))
            }
            '[' if self.rules.bracket_identifiers => (TokenKind::Identifier, self.quoted(']', false)),
            c if self.rules.string_quotes.contains(&c) => {
                (TokenKind::String, self.quoted(c, self.rules.backslash_escapes))
            }
            c if c.is_ascii_digit() => (self.number(), true),
            '.' if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) && !self.after_name() => {
                (self.number(), true)
            }
            c if is_ident_start(c) => (self.word(), true),
            ',' | '.' | ';' | '(' | ')' | '[' | ']' | '{' | '}' => {
                self.bump();
                (TokenKind::Punctuation, true)
            }
            _ => {
                self.operator();
                (TokenKind::Operator, true)
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    /// `/* ... */`; returns false if input ends first.
    fn block_comment(&mut self) -> bool {
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                None => return false,
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return true;
                }
                Some(_) => {}
            }
        }
    }

    /// Quoted run opened by the current character and closed by `close`.
    /// A doubled `close` is an escaped literal; returns false if input ends first.
    fn quoted(&mut self, close: char, backslash_escapes: bool) -> bool {
        self.bump();
        loop {
            match self.bump() {
                None => return false,
                Some('\\') if backslash_escapes => {
                    if self.bump().is_none() {
                        return false;
                    }
                }
                Some(c) if c == close => {
                    if self.peek() == Some(close) {
                        self.bump();
                    } else {
                        return true;
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_nth(1) != Some('.') {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if signed {
                    self.bump();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }
        // `1d_sales` style names start with a digit in some dialects.
        if self.peek().is_some_and(is_ident_continue) {
            self.eat_while(is_ident_continue);
            return TokenKind::Identifier;
        }
        TokenKind::Number
    }

    fn word(&mut self) -> TokenKind {
        let start = self.pos;
        self.eat_while(is_ident_continue);
        if self.tokens.last().is_some_and(|t| t.is_punct('.')) {
            return TokenKind::Identifier;
        }
        let lower = self.src[start..self.pos].to_lowercase();
        if self.dialect.is_keyword(&lower) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    fn operator(&mut self) {
        let rest = &self.src[self.pos..];
        let width = OPERATORS
            .iter()
            .find(|op| rest.starts_with(*op))
            .map_or(1, |op| op.len());
        for _ in 0..width {
            self.bump();
        }
    }

    /// True if the previous token could be followed by a `.member` access.
    fn after_name(&self) -> bool {
        self.tokens.last().is_some_and(|t| {
            t.kind.is_word() || t.is_punct(')') || t.is_punct(']')
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::keyword::Keyword;
    use crate::sql::token_kind::TokenKind;
    use rstest::rstest;

    fn kinds(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens
            .iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.value.as_str()))
            .collect()
    }

    #[rstest]
    #[case("")]
    #[case("SELECT a, b FROM t")]
    #[case("select 'it''s' as s, \"col\" from `db`.`tbl` -- trailing\n")]
    #[case("select 'abc")]
    #[case("select /* open comment")]
    #[case("SELECT naïve, 'ünïcödé' FROM größe;\r\n\tSELECT 1.5e-3 <=> 2")]
    #[case("a->>'b' :: int || x != y <> z")]
    #[case("select \"unterminated ident")]
    #[case("select [bracket from x")]
    #[case("🙂 ? @var $1 %")]
    fn round_trips_exactly(#[case] sql: &str) {
        for dialect in SqlDialect::ALL {
            let tokens = tokenize(sql, dialect.name());
            let rebuilt: String = tokens.iter().map(|t| t.value.as_str()).collect();
            assert_eq!(rebuilt, sql, "round trip failed for {dialect}");
            let mut expected_start = 0;
            for t in &tokens {
                assert_eq!(t.start, expected_start, "gap before {t:?}");
                assert_eq!(&sql[t.start..t.end], t.value);
                expected_start = t.end;
            }
            assert_eq!(expected_start, sql.len());
        }
    }

    #[test]
    fn tokenizing_is_idempotent() {
        let sql = "with x as (select * from a) select x.id from x where x.v > 'q'";
        assert_eq!(tokenize(sql, "hive"), tokenize(sql, "hive"));
    }

    #[test]
    fn basic_select_sequence() {
        let toks = tokenize("SELECT a, b FROM t", "presto");
        assert!(toks.iter().any(|t| t.is_keyword(Keyword::Select)));
        assert!(toks.iter().any(|t| t.is_keyword(Keyword::From)));
        assert_eq!(
            kinds(&toks),
            vec![
                (TokenKind::Keyword, "SELECT"),
                (TokenKind::Identifier, "a"),
                (TokenKind::Punctuation, ","),
                (TokenKind::Identifier, "b"),
                (TokenKind::Keyword, "FROM"),
                (TokenKind::Identifier, "t"),
            ]
        );
    }

    #[test]
    fn preserves_case_for_identifiers() {
        let toks = tokenize("From MyTable", "presto");
        assert!(toks.iter().any(|t| t.is_keyword(Keyword::From)));
        assert!(toks.iter().any(|t| t.ident() == Some("MyTable")));
    }

    #[test]
    fn unterminated_string_covers_remainder() {
        let sql = "select 'abc";
        let toks = tokenize(sql, "presto");
        let last = toks.last().expect("tokens");
        assert_eq!(last.kind, TokenKind::String);
        assert_eq!(last.value, "'abc");
        assert!(last.unterminated);
        assert_eq!(last.end, sql.len());
    }

    #[test]
    fn unterminated_block_comment_is_flagged() {
        let toks = tokenize("select 1 /* never closed", "ansi");
        let last = toks.last().expect("tokens");
        assert_eq!(last.kind, TokenKind::Comment);
        assert!(last.unterminated);
    }

    #[test]
    fn doubled_quotes_do_not_close_strings() {
        let toks = tokenize("select 'it''s' from t", "presto");
        assert_eq!(kinds(&toks)[1], (TokenKind::String, "'it''s'"));
        assert!(toks.iter().all(|t| !t.unterminated));
    }

    #[test]
    fn backslash_escapes_follow_dialect() {
        let sql = r"select 'a\'b' x";
        let hive = tokenize(sql, "hive");
        assert_eq!(kinds(&hive)[1], (TokenKind::String, r"'a\'b'"));

        let presto = tokenize(sql, "presto");
        assert_eq!(kinds(&presto)[1], (TokenKind::String, r"'a\'"));
    }

    #[test]
    fn double_quotes_follow_dialect() {
        let hive = tokenize("select \"x\"", "hive");
        assert_eq!(kinds(&hive)[1].0, TokenKind::String);

        let presto = tokenize("select \"x\"", "presto");
        assert_eq!(kinds(&presto)[1].0, TokenKind::Identifier);
        assert_eq!(presto.last().and_then(Token::ident), Some("x"));
    }

    #[test]
    fn backtick_identifiers() {
        let toks = tokenize("select * from `my db`.`tbl`", "hive");
        let idents: Vec<_> = toks.iter().filter_map(Token::ident).collect();
        assert_eq!(idents, vec!["my db", "tbl"]);
    }

    #[test]
    fn hash_comments_only_where_supported() {
        let mysql = tokenize("select 1 # note", "mysql");
        assert_eq!(mysql.last().map(|t| t.kind), Some(TokenKind::Comment));

        let presto = tokenize("select 1 # note", "presto");
        assert!(presto.iter().any(|t| t.kind == TokenKind::Operator && t.value == "#"));
    }

    #[test]
    fn multi_character_operators() {
        let toks = tokenize("a <= b <> c != d || e :: f ->> g", "postgresql");
        let ops: Vec<_> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(ops, vec!["<=", "<>", "!=", "||", "::", "->>"]);
    }

    #[test]
    fn numbers() {
        let toks = tokenize("select 1, 2.5, .5, 1e10, 3E-2, 1d_table", "hive");
        let numbers: Vec<_> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(numbers, vec!["1", "2.5", ".5", "1e10", "3E-2"]);
        assert!(toks.iter().any(|t| t.ident() == Some("1d_table")));
    }

    #[test]
    fn words_after_dot_are_identifiers() {
        let toks = tokenize("select t.from, default.table", "presto");
        let significant = kinds(&toks);
        assert_eq!(significant[3], (TokenKind::Identifier, "from"));
        assert_eq!(significant[5], (TokenKind::Keyword, "default"));
        assert_eq!(significant[7], (TokenKind::Identifier, "table"));
    }

    #[rstest]
    #[case("x.  FROM t", "FROM")]
    #[case("select ex.\nfrom example ex", "from")]
    #[case("select ex. /* c */ where", "where")]
    fn keywords_after_dangling_dot_stay_keywords(#[case] sql: &str, #[case] keyword: &str) {
        let toks = tokenize(sql, "postgres");
        let token = toks
            .iter()
            .find(|t| t.value == keyword)
            .expect("keyword token");
        assert_eq!(token.kind, TokenKind::Keyword);
    }

    #[test]
    fn punctuation_tokens() {
        let toks = tokenize("(a.b,c);", "ansi");
        for p in ['(', '.', ',', ')', ';'] {
            assert!(toks.iter().any(|t| t.is_punct(p)), "missing {p}");
        }
    }

    #[test]
    fn incomplete_query_tokenization() {
        let toks = tokenize("SELECT ( FROM x", "ansi");
        assert!(toks.iter().any(|t| t.is_keyword(Keyword::Select)));
        assert!(toks.iter().any(|t| t.is_keyword(Keyword::From)));
        assert!(toks.iter().any(|t| t.ident() == Some("x")));
    }

    #[test]
    fn tracks_lines_and_columns() {
        let toks = tokenize("select a\n  from t", "ansi");
        let from = toks
            .iter()
            .find(|t| t.is_keyword(Keyword::From))
            .expect("from");
        assert_eq!((from.line, from.column), (1, 2));
        let t = toks.last().expect("t");
        assert_eq!((t.line, t.column, t.start), (1, 7, 16));
    }

    #[test]
    fn columns_count_characters() {
        let toks = tokenize("'ü' x", "ansi");
        let x = toks.last().expect("x");
        assert_eq!(x.column, 4);
        assert_eq!(x.start, 5);
    }

    #[test]
    fn strict_policy_reports_unterminated() {
        let strict = Tokenizer::new(
            TokenizeOptions::for_language("presto").with_recovery(RecoveryPolicy::Strict),
        );
        let err = strict.tokenize("select 'abc").expect_err("strict should fail");
        assert!(matches!(
            err,
            Error::Unterminated {
                kind: TokenKind::String,
                offset: 7
            }
        ));
        assert!(strict.tokenize("select 'abc'").is_ok());
    }

    #[test]
    fn implicit_close_policy_never_fails() {
        let lenient = Tokenizer::new(TokenizeOptions::for_language("presto"));
        let tokens = lenient.tokenize("select 'abc").expect("lenient tokenize");
        assert!(tokens.last().is_some_and(|t| t.unterminated));
    }
}
