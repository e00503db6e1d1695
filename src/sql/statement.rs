//! Statement splitting and shallow clause detection.
//!
//! `simple_parse` partitions a token stream into statements and marks the
//! clause sub-ranges (SELECT / FROM / JOIN / WHERE ...) that lineage,
//! linting and autocomplete work on. It never fails and never validates.

use crate::sql::{keyword::Keyword, span::Position, token::Token};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    #[display("select")]
    Select,
    #[display("with")]
    With,
    #[display("insert")]
    Insert,
    #[display("create")]
    Create,
    #[display("drop")]
    Drop,
    #[display("use")]
    Use,
    #[display("update")]
    Update,
    #[display("delete")]
    Delete,
    #[display("alter")]
    Alter,
    #[display("set")]
    Set,
    #[display("show")]
    Show,
    #[display("describe")]
    Describe,
    #[display("other")]
    Other,
    /// Only whitespace, comments or a bare `;`.
    #[display("empty")]
    Empty,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "camelCase")]
pub enum ClauseKind {
    #[display("WITH")]
    With,
    #[display("SELECT")]
    Select,
    #[display("FROM")]
    From,
    #[display("JOIN")]
    Join,
    #[display("ON")]
    On,
    #[display("WHERE")]
    Where,
    #[display("GROUP BY")]
    GroupBy,
    #[display("HAVING")]
    Having,
    #[display("ORDER BY")]
    OrderBy,
    #[display("LIMIT")]
    Limit,
    #[display("INSERT")]
    Insert,
    #[display("CREATE")]
    Create,
    #[display("DROP")]
    Drop,
    #[display("USE")]
    Use,
    #[display("UPDATE")]
    Update,
    #[display("SET")]
    Set,
    #[display("VALUES")]
    Values,
    #[display("DELETE")]
    Delete,
    /// UNION / INTERSECT / EXCEPT.
    #[display("set operation")]
    SetOperation,
}

impl ClauseKind {
    /// Clauses whose items are table names.
    pub fn lists_tables(self) -> bool {
        matches!(
            self,
            ClauseKind::From
                | ClauseKind::Join
                | ClauseKind::Insert
                | ClauseKind::Update
                | ClauseKind::Create
                | ClauseKind::Drop
        )
    }

    /// Clauses whose items are expressions over columns.
    pub fn lists_columns(self) -> bool {
        matches!(
            self,
            ClauseKind::Select
                | ClauseKind::On
                | ClauseKind::Where
                | ClauseKind::GroupBy
                | ClauseKind::Having
                | ClauseKind::OrderBy
                | ClauseKind::Set
        )
    }
}

/// Sub-range `tokens[start_token..end_token]` of a statement led by a clause keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub kind: ClauseKind,
    pub start_token: usize,
    pub end_token: usize,
    /// Parenthesis depth of the leading keyword.
    pub depth: usize,
    pub start: usize,
    pub end: usize,
}

impl Clause {
    pub fn contains(&self, offset: usize) -> bool {
        self.start < offset && offset <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub index: usize,
    pub kind: StatementKind,
    pub tokens: Vec<Token>,
    pub start: usize,
    pub end: usize,
    /// Ordered by start token, outer clause first on ties.
    pub clauses: Vec<Clause>,
}

impl Statement {
    pub fn new(index: usize, tokens: Vec<Token>) -> Self {
        let start = tokens.first().map_or(0, |t| t.start);
        let end = tokens.last().map_or(start, |t| t.end);
        Self {
            index,
            kind: classify(&tokens),
            clauses: build_clauses(&tokens),
            tokens,
            start,
            end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == StatementKind::Empty
    }

    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.value.as_str()).collect()
    }

    pub fn significant(&self) -> impl DoubleEndedIterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.is_trivia())
    }

    pub fn clauses_of(&self, kind: ClauseKind) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(move |c| c.kind == kind)
    }

    pub fn clause_tokens(&self, clause: &Clause) -> &[Token] {
        &self.tokens[clause.start_token..clause.end_token]
    }

    /// Innermost clause containing `offset`; the latest one wins between siblings.
    pub fn clause_at(&self, offset: usize) -> Option<&Clause> {
        self.clauses
            .iter()
            .filter(|c| c.contains(offset))
            .max_by_key(|c| (c.depth, c.start_token))
    }

    /// Editor lines spanned by significant tokens.
    pub fn line_range(&self) -> Option<(usize, usize)> {
        let first = self.significant().next()?;
        let last = self.significant().next_back()?;
        Some((first.line, last.end_position().line))
    }
}

/// Per editor line: the statement it belongs to and the clause active at the
/// end of its last significant token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineInfo {
    pub line: usize,
    pub statement_index: Option<usize>,
    pub clause: Option<ClauseKind>,
}

/// Split `tokens` into statements on `;`.
///
/// The terminating `;` stays with the statement it ends, leading trivia goes
/// to the next one and a trivia-only tail joins the last statement, so the
/// statements partition the input without gaps.
pub fn simple_parse(tokens: &[Token]) -> Vec<Statement> {
    let mut groups: Vec<Vec<Token>> = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        current.push(token.clone());
        if token.is_punct(';') {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        match groups.last_mut() {
            Some(last) if current.iter().all(Token::is_trivia) => last.extend(current),
            _ => groups.push(current),
        }
    }
    groups
        .into_iter()
        .enumerate()
        .map(|(index, tokens)| Statement::new(index, tokens))
        .collect()
}

pub fn get_editor_lines(statements: &[Statement]) -> Vec<LineInfo> {
    let Some(last_line) = statements
        .iter()
        .filter_map(|s| s.tokens.last())
        .map(|t| t.end_position().line)
        .max()
    else {
        return Vec::new();
    };

    let mut lines: Vec<LineInfo> = (0..=last_line)
        .map(|line| LineInfo {
            line,
            statement_index: None,
            clause: None,
        })
        .collect();
    // A later statement sharing a line with an earlier one owns it.
    for statement in statements {
        let Some((first, last)) = statement.line_range() else {
            continue;
        };
        let mut significant = statement.significant().peekable();
        let mut clause = None;
        for info in &mut lines[first..=last] {
            let mut latest = None;
            while let Some(token) = significant.next_if(|t| t.line <= info.line) {
                latest = Some(token);
            }
            if let Some(token) = latest {
                clause = statement.clause_at(token.end).map(|c| c.kind);
            }
            info.statement_index = Some(statement.index);
            info.clause = clause;
        }
    }
    lines
}

/// Editor position of a byte offset inside `statements`.
pub fn position_at(statements: &[Statement], offset: usize) -> Position {
    statements
        .iter()
        .flat_map(|s| &s.tokens)
        .find(|t| t.contains(offset))
        .and_then(|t| {
            let head = t.value.get(..offset - t.start)?;
            Some(match head.rfind('\n') {
                Some(idx) => Position::new(
                    t.line + head.matches('\n').count(),
                    head[idx + 1..].chars().count(),
                ),
                None => Position::new(t.line, t.column + head.chars().count()),
            })
        })
        .or_else(|| {
            statements
                .iter()
                .filter_map(|s| s.tokens.last())
                .next_back()
                .map(Token::end_position)
        })
        .unwrap_or_default()
}

fn classify(tokens: &[Token]) -> StatementKind {
    let Some(first) = tokens.iter().find(|t| !t.is_trivia() && !t.is_punct(';')) else {
        return StatementKind::Empty;
    };
    match first.keyword() {
        Some(Keyword::Select) => StatementKind::Select,
        Some(Keyword::With) => StatementKind::With,
        Some(Keyword::Insert) => StatementKind::Insert,
        Some(Keyword::Create) => StatementKind::Create,
        Some(Keyword::Drop) => StatementKind::Drop,
        Some(Keyword::Use) => StatementKind::Use,
        Some(Keyword::Update) => StatementKind::Update,
        Some(Keyword::Delete) => StatementKind::Delete,
        Some(Keyword::Alter) => StatementKind::Alter,
        Some(Keyword::Set) => StatementKind::Set,
        Some(Keyword::Show) => StatementKind::Show,
        Some(Keyword::Describe | Keyword::Explain) => StatementKind::Describe,
        _ => StatementKind::Other,
    }
}

struct OpenClause {
    kind: ClauseKind,
    start_token: usize,
    depth: usize,
}

/// Depth-tracking scan over significant tokens. A clause runs until the next
/// clause keyword at the same or a shallower depth, or until the `)` closing
/// its parenthesis level.
fn build_clauses(tokens: &[Token]) -> Vec<Clause> {
    let sig: Vec<usize> = (0..tokens.len()).filter(|&i| !tokens[i].is_trivia()).collect();
    let mut open: Vec<OpenClause> = Vec::new();
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut p = 0;

    while p < sig.len() {
        let i = sig[p];
        let token = &tokens[i];
        if token.is_punct('(') {
            depth += 1;
            p += 1;
            continue;
        }
        if token.is_punct(')') {
            if depth > 0 {
                close_from(&mut open, &mut clauses, tokens, depth, i);
                depth -= 1;
            }
            p += 1;
            continue;
        }

        let Some((kind, resume)) = clause_start(tokens, &sig, p, depth, &open) else {
            p += 1;
            continue;
        };
        close_from(&mut open, &mut clauses, tokens, depth, i);
        open.push(OpenClause {
            kind,
            start_token: i,
            depth,
        });
        p = resume;
    }
    close_from(&mut open, &mut clauses, tokens, 0, tokens.len());

    clauses.sort_by_key(|c: &Clause| (c.start_token, c.depth));
    clauses
}

/// Close every open clause at `depth` or deeper, ending before token `end_token`.
fn close_from(
    open: &mut Vec<OpenClause>,
    clauses: &mut Vec<Clause>,
    tokens: &[Token],
    depth: usize,
    end_token: usize,
) {
    while open.last().is_some_and(|o| o.depth >= depth) {
        let Some(o) = open.pop() else { break };
        let end_token = end_token.max(o.start_token + 1);
        clauses.push(Clause {
            kind: o.kind,
            start_token: o.start_token,
            end_token,
            depth: o.depth,
            start: tokens[o.start_token].start,
            end: tokens[end_token - 1].end,
        });
    }
}

/// Decide whether the significant token at `p` opens a clause. Returns the
/// clause kind and the next significant position to resume scanning from.
fn clause_start(
    tokens: &[Token],
    sig: &[usize],
    p: usize,
    depth: usize,
    open: &[OpenClause],
) -> Option<(ClauseKind, usize)> {
    let keyword = tokens[sig[p]].keyword()?;
    let next_keyword = |offset: usize| sig.get(p + offset).and_then(|&i| tokens[i].keyword());
    let leading = p == 0 || tokens[sig[p - 1]].is_punct('(');
    let open_here = open.iter().any(|o| o.depth == depth);
    let resume = p + 1;

    let kind = match keyword {
        Keyword::Select => return Some((ClauseKind::Select, resume)),
        Keyword::With if leading => return Some((ClauseKind::With, resume)),
        Keyword::From => ClauseKind::From,
        Keyword::Join => ClauseKind::Join,
        kw if kw.is_join_modifier() => {
            // LEFT [OUTER] JOIN, LEFT SEMI JOIN, NATURAL FULL OUTER JOIN ...
            let join_at = (1..=3).find(|&n| next_keyword(n) == Some(Keyword::Join))?;
            let words_between = (1..join_at).all(|n| {
                sig.get(p + n)
                    .is_some_and(|&i| tokens[i].kind.is_word())
            });
            if !words_between {
                return None;
            }
            return (depth == 0 || open_here).then_some((ClauseKind::Join, p + join_at + 1));
        }
        Keyword::On => ClauseKind::On,
        Keyword::Where => ClauseKind::Where,
        Keyword::Group if next_keyword(1) == Some(Keyword::By) => {
            return (depth == 0 || open_here).then_some((ClauseKind::GroupBy, p + 2));
        }
        Keyword::Order if next_keyword(1) == Some(Keyword::By) => {
            return (depth == 0 || open_here).then_some((ClauseKind::OrderBy, p + 2));
        }
        Keyword::Having => ClauseKind::Having,
        Keyword::Limit => ClauseKind::Limit,
        Keyword::Insert if depth == 0 => ClauseKind::Insert,
        Keyword::Values => ClauseKind::Values,
        Keyword::Union | Keyword::Intersect | Keyword::Except => ClauseKind::SetOperation,
        Keyword::Create if p == 0 => ClauseKind::Create,
        Keyword::Drop if p == 0 => ClauseKind::Drop,
        Keyword::Use if p == 0 => ClauseKind::Use,
        Keyword::Update if p == 0 => ClauseKind::Update,
        Keyword::Delete if p == 0 => ClauseKind::Delete,
        Keyword::Set if p == 0 => ClauseKind::Set,
        Keyword::Set if open.iter().any(|o| o.kind == ClauseKind::Update) => ClauseKind::Set,
        _ => return None,
    };
    // Inside parentheses only clause keywords of an open sub-query count,
    // which keeps `extract(year FROM d)` and `over (ORDER BY x)` out.
    (depth == 0 || open_here).then_some((kind, resume))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tokenizer::tokenize;
    use rstest::rstest;

    fn parse(sql: &str) -> Vec<Statement> {
        simple_parse(&tokenize(sql, "hive"))
    }

    fn clause_kinds(statement: &Statement) -> Vec<(ClauseKind, usize)> {
        statement.clauses.iter().map(|c| (c.kind, c.depth)).collect()
    }

    fn clause_text(statement: &Statement, clause: &Clause) -> String {
        statement
            .clause_tokens(clause)
            .iter()
            .map(|t| t.value.as_str())
            .collect::<String>()
            .trim()
            .to_string()
    }

    #[test]
    fn empty_input_has_no_statements() {
        assert!(parse("").is_empty());
    }

    #[rstest]
    #[case("select 1; select 2", 2)]
    #[case("select 1; select 2;", 2)]
    #[case("select 1;\n\n-- trailing\n", 1)]
    #[case("select ';' ; select 2", 2)]
    #[case("select 1 -- a;b\n; select 2", 2)]
    #[case(";;", 2)]
    fn splits_on_semicolons(#[case] sql: &str, #[case] count: usize) {
        let statements = parse(sql);
        assert_eq!(statements.len(), count);
        let rebuilt: String = statements.iter().map(Statement::text).collect();
        assert_eq!(rebuilt, sql);
        for pair in statements.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn semicolon_and_leading_trivia_placement() {
        let statements = parse("select 1;\n  select 2");
        assert_eq!(statements[0].text(), "select 1;");
        assert_eq!(statements[1].text(), "\n  select 2");
        assert_eq!(statements[1].index, 1);
    }

    #[rstest]
    #[case("select 1", StatementKind::Select)]
    #[case("  WITH x AS (select 1) select * from x", StatementKind::With)]
    #[case("insert into t values (1)", StatementKind::Insert)]
    #[case("create table t (a int)", StatementKind::Create)]
    #[case("drop table t", StatementKind::Drop)]
    #[case("use db", StatementKind::Use)]
    #[case("update t set a = 1", StatementKind::Update)]
    #[case("delete from t", StatementKind::Delete)]
    #[case("describe t", StatementKind::Describe)]
    #[case("msck repair table t", StatementKind::Other)]
    #[case("-- nothing\n", StatementKind::Empty)]
    fn classifies_statements(#[case] sql: &str, #[case] kind: StatementKind) {
        assert_eq!(parse(sql)[0].kind, kind);
    }

    #[test]
    fn select_clauses() {
        let sql = "select a, b from t1 left outer join t2 on t1.id = t2.id \
                   where a > 1 group by a order by b limit 10";
        let statement = &parse(sql)[0];
        assert_eq!(
            clause_kinds(statement),
            vec![
                (ClauseKind::Select, 0),
                (ClauseKind::From, 0),
                (ClauseKind::Join, 0),
                (ClauseKind::On, 0),
                (ClauseKind::Where, 0),
                (ClauseKind::GroupBy, 0),
                (ClauseKind::OrderBy, 0),
                (ClauseKind::Limit, 0),
            ]
        );
        let join = &statement.clauses[2];
        assert_eq!(clause_text(statement, join), "left outer join t2");
        let from = &statement.clauses[1];
        assert_eq!(clause_text(statement, from), "from t1");
    }

    #[test]
    fn subqueries_nest() {
        let sql = "select * from (select id from inner_t where x = 1) s where s.id > 0";
        let statement = &parse(sql)[0];
        assert_eq!(
            clause_kinds(statement),
            vec![
                (ClauseKind::Select, 0),
                (ClauseKind::From, 0),
                (ClauseKind::Select, 1),
                (ClauseKind::From, 1),
                (ClauseKind::Where, 1),
                (ClauseKind::Where, 0),
            ]
        );
        let inner_from = &statement.clauses[3];
        assert_eq!(clause_text(statement, inner_from), "from inner_t");
        let outer_from = &statement.clauses[1];
        assert!(clause_text(statement, outer_from).ends_with(") s"));
    }

    #[test]
    fn function_keywords_do_not_open_clauses() {
        let sql = "select extract(year from d), row_number() over (order by x) from t";
        let statement = &parse(sql)[0];
        assert_eq!(
            clause_kinds(statement),
            vec![(ClauseKind::Select, 0), (ClauseKind::From, 0)]
        );
    }

    #[test]
    fn join_modifier_needs_join() {
        let statement = &parse("select left(name, 3) from t")[0];
        assert!(statement.clauses_of(ClauseKind::Join).next().is_none());
    }

    #[test]
    fn dml_clauses() {
        let statement = &parse("update t set a = 1 where b = 2")[0];
        assert_eq!(
            clause_kinds(statement),
            vec![
                (ClauseKind::Update, 0),
                (ClauseKind::Set, 0),
                (ClauseKind::Where, 0),
            ]
        );

        let statement = &parse("insert overwrite table db.t select * from s")[0];
        assert_eq!(
            clause_kinds(statement),
            vec![
                (ClauseKind::Insert, 0),
                (ClauseKind::Select, 0),
                (ClauseKind::From, 0),
            ]
        );
    }

    #[test]
    fn with_and_set_operations() {
        let sql = "with x as (select a from t) select a from x union all select a from y";
        let statement = &parse(sql)[0];
        assert_eq!(
            clause_kinds(statement),
            vec![
                (ClauseKind::With, 0),
                (ClauseKind::Select, 1),
                (ClauseKind::From, 1),
                (ClauseKind::Select, 0),
                (ClauseKind::From, 0),
                (ClauseKind::SetOperation, 0),
                (ClauseKind::Select, 0),
                (ClauseKind::From, 0),
            ]
        );
    }

    #[test]
    fn clause_at_prefers_innermost() {
        let sql = "select * from (select id from inner_t) s";
        let statement = &parse(sql)[0];
        let inner = sql.find("inner_t").expect("inner_t") + 3;
        let clause = statement.clause_at(inner).expect("clause");
        assert_eq!((clause.kind, clause.depth), (ClauseKind::From, 1));

        let outer = sql.len();
        let clause = statement.clause_at(outer).expect("clause");
        assert_eq!((clause.kind, clause.depth), (ClauseKind::From, 0));

        let in_select = sql.find('*').expect("star") + 1;
        assert_eq!(
            statement.clause_at(in_select).map(|c| c.kind),
            Some(ClauseKind::Select)
        );
    }

    #[test]
    fn incomplete_statement_keeps_open_clause() {
        let sql = "select a from ";
        let statement = &parse(sql)[0];
        let clause = statement.clause_at(sql.len()).expect("clause");
        assert_eq!(clause.kind, ClauseKind::From);
    }

    #[test]
    fn editor_lines() {
        let sql = "select a\nfrom t;\n\nselect b\nwhere";
        let lines = get_editor_lines(&parse(sql));
        let summary: Vec<_> = lines
            .iter()
            .map(|l| (l.line, l.statement_index, l.clause))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, Some(0), Some(ClauseKind::Select)),
                (1, Some(0), Some(ClauseKind::From)),
                (2, None, None),
                (3, Some(1), Some(ClauseKind::Select)),
                (4, Some(1), Some(ClauseKind::Where)),
            ]
        );
    }

    #[test]
    fn editor_lines_share_a_line_with_the_later_statement() {
        let lines = get_editor_lines(&parse("select 1; select x\nfrom t"));
        assert_eq!(lines[0].statement_index, Some(1));
        assert_eq!(lines[0].clause, Some(ClauseKind::Select));
        assert_eq!(lines[1].clause, Some(ClauseKind::From));
    }

    #[test]
    fn editor_lines_scale_with_document_size() {
        let sql = (0..3000)
            .map(|i| format!("select c{i}\nfrom t{i};"))
            .collect::<Vec<_>>()
            .join("\n");
        let statements = parse(&sql);
        let started = std::time::Instant::now();
        let lines = get_editor_lines(&statements);
        let elapsed = started.elapsed();

        assert_eq!(lines.len(), 6000);
        assert_eq!(lines[5998].statement_index, Some(2999));
        assert_eq!(lines[5998].clause, Some(ClauseKind::Select));
        assert_eq!(lines[5999].clause, Some(ClauseKind::From));
        assert!(elapsed.as_millis() < 500, "took {elapsed:?}");
    }

    #[test]
    fn positions_from_offsets() {
        let sql = "select a\nfrom tbl";
        let statements = parse(sql);
        let offset = sql.find("tbl").expect("tbl") + 1;
        assert_eq!(position_at(&statements, offset), Position::new(1, 6));
        assert_eq!(position_at(&statements, sql.len()), Position::new(1, 8));
    }
}
