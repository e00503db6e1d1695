use super::extractor::read_name;
use crate::sql::{Keyword, Statement, StatementKind, Token, simple_parse, tokenize};
use indexmap::IndexSet;

/// Tables a script drops without re-creating them afterwards.
///
/// `DROP TABLE [IF EXISTS] name` marks a table; a later
/// `CREATE [OR REPLACE] [EXTERNAL|TEMPORARY] TABLE [IF NOT EXISTS] name` with
/// the same qualified name clears it. `USE db` qualifies unqualified names in
/// the statements that follow. Names are lower-cased with quotes stripped and
/// returned in first-drop order.
///
/// This is a keyword heuristic, not a parse; statements it does not
/// recognise are ignored.
pub fn get_dropped_tables(query: &str) -> Vec<String> {
    let statements = simple_parse(&tokenize(query, "hive"));
    dropped_tables(&statements).into_iter().collect()
}

pub fn dropped_tables(statements: &[Statement]) -> IndexSet<String> {
    let mut dropped = IndexSet::new();
    let mut database: Option<String> = None;

    for statement in statements {
        let sig: Vec<&Token> = statement
            .significant()
            .filter(|t| !t.is_punct(';'))
            .collect();
        match statement.kind {
            StatementKind::Use => {
                if let Some((parts, _)) = read_name(&sig, 1) {
                    database = Some(parts.join(".").to_lowercase());
                }
            }
            StatementKind::Drop => {
                if let Some(name) = drop_target(&sig) {
                    dropped.insert(qualify(name, database.as_deref()));
                }
            }
            StatementKind::Create => {
                if let Some(name) = create_target(&sig) {
                    dropped.shift_remove(&qualify(name, database.as_deref()));
                }
            }
            _ => {}
        }
    }
    dropped
}

fn drop_target(sig: &[&Token]) -> Option<String> {
    let mut p = 1;
    if !sig.get(p)?.is_keyword(Keyword::Table) {
        return None;
    }
    p += 1;
    if keywords_at(sig, p, &[Keyword::If, Keyword::Exists]) {
        p += 2;
    }
    name_at(sig, p)
}

fn create_target(sig: &[&Token]) -> Option<String> {
    let mut p = 1;
    // `or` is not a structural keyword, so match it by text.
    if sig.get(p).is_some_and(|t| t.value.eq_ignore_ascii_case("or"))
        && sig.get(p + 1).is_some_and(|t| t.is_keyword(Keyword::Replace))
    {
        p += 2;
    }
    if sig
        .get(p)
        .is_some_and(|t| t.is_keyword(Keyword::External) || t.is_keyword(Keyword::Temporary))
    {
        p += 1;
    }
    if !sig.get(p)?.is_keyword(Keyword::Table) {
        return None;
    }
    p += 1;
    if keywords_at(sig, p, &[Keyword::If, Keyword::Not, Keyword::Exists]) {
        p += 3;
    }
    name_at(sig, p)
}

fn keywords_at(sig: &[&Token], p: usize, keywords: &[Keyword]) -> bool {
    keywords
        .iter()
        .enumerate()
        .all(|(n, kw)| sig.get(p + n).is_some_and(|t| t.is_keyword(*kw)))
}

fn name_at(sig: &[&Token], p: usize) -> Option<String> {
    let (parts, _) = read_name(sig, p)?;
    Some(parts.join(".").to_lowercase())
}

fn qualify(name: String, database: Option<&str>) -> String {
    match database {
        Some(db) if !name.contains('.') => format!("{db}.{name}"),
        _ => name,
    }
}
