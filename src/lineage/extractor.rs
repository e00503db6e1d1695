use crate::sql::{ClauseKind, Keyword, Statement, StatementKind, Token, TokenKind};
use crate::*;

/// How items of a table-listing clause are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Items {
    /// `FROM a [AS] x, b y, (subquery) z`
    List,
    /// `JOIN a [AS] x`, `UPDATE a x`
    Aliased,
    /// `INSERT INTO a`, no alias
    Target,
}

impl Items {
    fn for_clause(kind: ClauseKind) -> Option<Self> {
        match kind {
            ClauseKind::From => Some(Items::List),
            ClauseKind::Join | ClauseKind::Update => Some(Items::Aliased),
            ClauseKind::Insert => Some(Items::Target),
            _ => None,
        }
    }
}

struct TableItem {
    parts: Vec<String>,
    alias: Option<String>,
    first: usize,
    last: usize,
}

/// Build the table-reference / alias map of a document.
///
/// Scans FROM and JOIN lists plus INSERT and UPDATE targets of every
/// statement for `[schema.]table [AS] alias`. Parenthesised sub-queries are
/// skipped as items (their own FROM clauses are scanned separately), names
/// bound by `WITH` are not tables, and unqualified names pick up the database
/// of the closest preceding `USE`.
pub fn find_table_reference_and_alias(statements: &[Statement]) -> LineageMap {
    let mut lineage = LineageMap::default();
    let mut database: Option<String> = None;

    for statement in statements {
        if statement.kind == StatementKind::Use {
            if let Some(target) = use_target(statement) {
                trace!("Statement {} switches database to {target}", statement.index);
                database = Some(target);
            }
            continue;
        }

        let ctes = cte_definitions(statement);
        let mut references: Vec<TableReference> = Vec::new();
        for clause in &statement.clauses {
            let Some(shape) = Items::for_clause(clause.kind) else {
                continue;
            };
            let sig: Vec<&Token> = statement
                .clause_tokens(clause)
                .iter()
                .filter(|t| !t.is_trivia())
                .collect();
            for item in table_items(&sig, shape) {
                let mut parts = item.parts;
                let Some(table) = parts.pop() else { continue };
                if parts.is_empty() && ctes.iter().any(|c| c.name.eq_ignore_ascii_case(&table)) {
                    continue;
                }
                let schema = if parts.is_empty() {
                    database.clone()
                } else {
                    Some(parts.join("."))
                };
                references.push(TableReference {
                    schema,
                    table,
                    alias: item.alias,
                    statement_index: statement.index,
                    span: sig[item.first].source_span().cover(sig[item.last].source_span()),
                });
            }
        }

        lineage
            .columns
            .extend(column_references(statement, &references));
        for reference in &references {
            lineage
                .aliases
                .insert(reference.scope_name().to_lowercase(), reference.clone());
        }
        lineage.references.extend(references);
        lineage.ctes.extend(ctes);
    }

    debug!(
        "Lineage: {} table references, {} column references",
        lineage.references.len(),
        lineage.columns.len()
    );
    lineage
}

/// Dialect keywords that may sit between a clause keyword and the first
/// table: `LEFT SEMI JOIN`, `FROM ONLY t`, `INSERT IGNORE INTO`.
const HEADER_WORDS: [&str; 4] = ["semi", "anti", "only", "ignore"];

/// Read a dotted name `a[.b[.c]]` starting at `sig[at]`.
///
/// The first part must be an identifier, a dialect keyword with no
/// structural meaning (`date`, `tables`), or a structural keyword directly
/// followed by `.` (`default.t`). Returns the parts with quotes stripped and
/// the position just past the name.
pub(crate) fn read_name(sig: &[&Token], at: usize) -> Option<(Vec<String>, usize)> {
    let first = sig.get(at)?;
    let qualifies = sig.get(at + 1).is_some_and(|t| t.is_punct('.'));
    let names = match first.kind {
        TokenKind::Identifier => true,
        TokenKind::Keyword => qualifies || first.keyword().is_none(),
        _ => false,
    };
    if !names {
        return None;
    }
    let mut parts = vec![first.name()?.to_string()];
    let mut p = at + 1;
    while sig.get(p).is_some_and(|t| t.is_punct('.')) {
        let Some(part) = sig.get(p + 1).filter(|t| t.kind.is_word()).and_then(|t| t.name()) else {
            break;
        };
        parts.push(part.to_string());
        p += 2;
    }
    Some((parts, p))
}

fn table_items(sig: &[&Token], shape: Items) -> Vec<TableItem> {
    // Clause header: FROM, LEFT OUTER JOIN, INSERT OVERWRITE TABLE, UPDATE ...
    let mut p = 0;
    while sig.get(p).is_some_and(|t| {
        let header = t.keyword().is_some()
            || (t.kind == TokenKind::Keyword
                && HEADER_WORDS.iter().any(|w| t.value.eq_ignore_ascii_case(w)));
        header && !sig.get(p + 1).is_some_and(|n| n.is_punct('.'))
    }) {
        p += 1;
    }

    let mut items = Vec::new();
    loop {
        if sig.get(p).is_some_and(|t| t.is_punct('(')) {
            p = skip_alias(sig, skip_group(sig, p));
        } else if let Some((parts, next)) = read_name(sig, p) {
            let first = p;
            p = next;
            if sig.get(p).is_some_and(|t| t.is_punct('.')) {
                // `db.` still being typed.
            } else if shape != Items::Target && sig.get(p).is_some_and(|t| t.is_punct('(')) {
                // Table-valued function such as `unnest(...)`.
                p = skip_alias(sig, skip_group(sig, p));
            } else {
                let (alias, next) = match shape {
                    Items::Target => (None, p),
                    _ => read_alias(sig, p),
                };
                items.push(TableItem {
                    parts,
                    alias,
                    first,
                    last: next - 1,
                });
                p = next;
            }
        }

        if shape != Items::List {
            break;
        }
        match next_top_level_comma(sig, p) {
            Some(comma) => p = comma + 1,
            None => break,
        }
    }
    items
}

fn read_alias(sig: &[&Token], p: usize) -> (Option<String>, usize) {
    let alias_at = |i: usize| {
        sig.get(i)
            .filter(|t| t.kind == TokenKind::Identifier)
            .and_then(|t| t.ident())
            .map(str::to_string)
    };
    if sig.get(p).is_some_and(|t| t.is_keyword(Keyword::As)) {
        return match alias_at(p + 1) {
            Some(alias) => (Some(alias), p + 2),
            None => (None, p + 1),
        };
    }
    match alias_at(p) {
        Some(alias) => (Some(alias), p + 1),
        None => (None, p),
    }
}

fn skip_alias(sig: &[&Token], p: usize) -> usize {
    let (_, next) = read_alias(sig, p);
    // Column list of a derived table alias: `AS t(a, b)`.
    if next > p && sig.get(next).is_some_and(|t| t.is_punct('(')) {
        return skip_group(sig, next);
    }
    next
}

/// Position just past the `)` matching the `(` at `sig[open]`.
fn skip_group(sig: &[&Token], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, t) in sig.iter().enumerate().skip(open) {
        if t.is_punct('(') {
            depth += 1;
        } else if t.is_punct(')') {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return i + 1;
            }
        }
    }
    sig.len()
}

fn next_top_level_comma(sig: &[&Token], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in sig.iter().enumerate().skip(from) {
        if t.is_punct('(') {
            depth += 1;
        } else if t.is_punct(')') {
            depth = depth.saturating_sub(1);
        } else if t.is_punct(',') && depth == 0 {
            return Some(i);
        }
    }
    None
}

fn use_target(statement: &Statement) -> Option<String> {
    let sig: Vec<&Token> = statement.significant().collect();
    let (parts, _) = read_name(&sig, 1)?;
    Some(parts.join("."))
}

/// Names bound by `WITH name [(cols)] AS (...) [, ...]`, at any depth.
fn cte_definitions(statement: &Statement) -> Vec<CteDefinition> {
    let mut ctes = Vec::new();
    for clause in statement.clauses_of(ClauseKind::With) {
        let sig: Vec<&Token> = statement
            .clause_tokens(clause)
            .iter()
            .filter(|t| !t.is_trivia())
            .collect();
        let mut depth = 0usize;
        let mut expect_name = true;
        for t in sig.iter().skip(1) {
            if t.is_punct('(') {
                depth += 1;
            } else if t.is_punct(')') {
                depth = depth.saturating_sub(1);
            } else if depth > 0 || t.is_keyword(Keyword::Recursive) {
                continue;
            } else if expect_name {
                expect_name = false;
                if let Some(name) = t.kind.is_word().then(|| t.name()).flatten() {
                    ctes.push(CteDefinition {
                        name: name.to_string(),
                        statement_index: statement.index,
                        span: t.source_span(),
                    });
                }
            } else if t.is_punct(',') {
                expect_name = true;
            }
        }
    }
    ctes
}

/// `q.col` patterns inside column-listing clauses whose qualifier names one
/// of the statement's table references.
fn column_references(statement: &Statement, references: &[TableReference]) -> Vec<ColumnReference> {
    let sig: Vec<&Token> = statement.significant().collect();
    let mut columns = Vec::new();
    for w in 0..sig.len().saturating_sub(2) {
        let (qualifier, dot, column) = (sig[w], sig[w + 1], sig[w + 2]);
        if !(qualifier.kind.is_word() && dot.is_punct('.') && column.kind == TokenKind::Identifier) {
            continue;
        }
        // Skip three-part names and function calls.
        if w > 0 && sig[w - 1].is_punct('.') {
            continue;
        }
        if sig
            .get(w + 3)
            .is_some_and(|t| t.is_punct('(') || t.is_punct('.'))
        {
            continue;
        }
        let (Some(q), Some(c)) = (qualifier.name(), column.ident()) else {
            continue;
        };
        let in_column_clause = statement
            .clause_at(qualifier.end)
            .is_some_and(|clause| clause.kind.lists_columns());
        let resolves = references
            .iter()
            .any(|r| r.scope_name().eq_ignore_ascii_case(q) || r.table.eq_ignore_ascii_case(q));
        if in_column_clause && resolves {
            columns.push(ColumnReference {
                qualifier: q.to_string(),
                column: c.to_string(),
                statement_index: statement.index,
                span: qualifier.source_span().cover(column.source_span()),
            });
        }
    }
    columns
}
