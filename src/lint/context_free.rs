use crate::sql::{ClauseKind, Keyword, Span, SqlDialect, Statement, StatementKind, Token, TokenKind};
use crate::*;
use itertools::Itertools;
use sqlparser::parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintOptions {
    /// Run the dialect parser over each statement.
    pub syntax_check: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self { syntax_check: true }
    }
}

impl From<&Config> for LintOptions {
    fn from(config: &Config) -> Self {
        Self {
            syntax_check: config.syntax_check,
        }
    }
}

/// Structural rules that need no schema knowledge.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFreeLinter {
    dialect: SqlDialect,
    options: LintOptions,
}

/// Keywords a select list or table list cannot end right before.
const AFTER_LIST: [Keyword; 6] = [
    Keyword::From,
    Keyword::Where,
    Keyword::Group,
    Keyword::Order,
    Keyword::Having,
    Keyword::Limit,
];

impl ContextFreeLinter {
    pub fn new(dialect: SqlDialect, options: LintOptions) -> Self {
        Self { dialect, options }
    }

    /// Every rule runs on every statement independently; results are not
    /// deduplicated and come back sorted by position.
    pub fn lint(&self, statements: &[Statement], lineage: &LineageMap) -> Vec<LintWarning> {
        let mut warnings = Vec::new();
        for statement in statements.iter().filter(|s| !s.is_empty()) {
            warnings.extend(unterminated(statement));
            warnings.extend(unbalanced_parentheses(statement));
            warnings.extend(trailing_commas(statement));
            warnings.extend(missing_where(statement));
            warnings.extend(duplicate_aliases(statement, lineage));
            if self.options.syntax_check {
                warnings.extend(self.syntax(statement));
            }
        }
        sort_warnings(&mut warnings);
        warnings
    }

    fn syntax(&self, statement: &Statement) -> Option<LintWarning> {
        if statement.tokens.iter().any(|t| t.unterminated) {
            return None;
        }
        let span = significant_span(statement)?;
        let error = check_syntax(self.dialect, &statement.text()).err()?;
        trace!("Statement {} rejected by parser: {error}", statement.index);
        Some(LintWarning::warning(
            LintRule::Syntax,
            span,
            format!("Syntax error: {error}"),
        ))
    }
}

pub fn get_context_free_linter_warnings(
    statements: &[Statement],
    language: &str,
    lineage: &LineageMap,
) -> Vec<LintWarning> {
    ContextFreeLinter::new(SqlDialect::from_language(language), LintOptions::default())
        .lint(statements, lineage)
}

/// Parse `sql` with the dialect's `sqlparser` grammar.
pub fn check_syntax(dialect: SqlDialect, sql: &str) -> Result {
    Parser::parse_sql(dialect.parser_dialect().as_ref(), sql)?;
    Ok(())
}

fn significant_span(statement: &Statement) -> Option<Span> {
    let first = statement.significant().next()?;
    let last = statement.significant().next_back()?;
    Some(first.source_span().cover(last.source_span()))
}

fn unterminated(statement: &Statement) -> impl Iterator<Item = LintWarning> + '_ {
    statement
        .tokens
        .iter()
        .filter(|t| t.unterminated)
        .map(|t| match t.kind {
            TokenKind::Comment => LintWarning::error(
                LintRule::UnterminatedComment,
                t.source_span(),
                "Unterminated block comment",
            ),
            TokenKind::Identifier => LintWarning::error(
                LintRule::UnterminatedString,
                t.source_span(),
                "Unterminated quoted identifier",
            ),
            _ => LintWarning::error(
                LintRule::UnterminatedString,
                t.source_span(),
                "Unterminated string literal",
            ),
        })
}

fn unbalanced_parentheses(statement: &Statement) -> Vec<LintWarning> {
    let mut open: Vec<&Token> = Vec::new();
    let mut warnings = Vec::new();
    for token in statement.significant() {
        if token.is_punct('(') {
            open.push(token);
        } else if token.is_punct(')') && open.pop().is_none() {
            warnings.push(LintWarning::error(
                LintRule::UnbalancedParentheses,
                token.source_span(),
                "Unmatched closing parenthesis",
            ));
        }
    }
    warnings.extend(open.into_iter().map(|token| {
        LintWarning::error(
            LintRule::UnbalancedParentheses,
            token.source_span(),
            "Unclosed parenthesis",
        )
    }));
    warnings
}

fn trailing_commas(statement: &Statement) -> Vec<LintWarning> {
    let sig: Vec<&Token> = statement
        .significant()
        .filter(|t| !t.is_punct(';'))
        .collect();
    sig.iter()
        .enumerate()
        .filter(|(_, t)| t.is_punct(','))
        .filter_map(|(i, comma)| {
            let message = match sig.get(i + 1) {
                None => "Trailing comma at end of statement".to_string(),
                Some(next) if next.is_punct(')') => "Trailing comma before ')'".to_string(),
                Some(next) => {
                    let keyword = next.keyword().filter(|kw| AFTER_LIST.contains(kw))?;
                    format!("Trailing comma before {}", keyword.as_str().to_uppercase())
                }
            };
            Some(LintWarning::error(
                LintRule::TrailingComma,
                comma.source_span(),
                message,
            ))
        })
        .collect()
}

fn missing_where(statement: &Statement) -> Option<LintWarning> {
    let verb = match statement.kind {
        StatementKind::Update => "UPDATE",
        StatementKind::Delete => "DELETE",
        _ => return None,
    };
    let has_where = statement
        .clauses_of(ClauseKind::Where)
        .any(|c| c.depth == 0);
    if has_where {
        return None;
    }
    let first = statement.significant().next()?;
    Some(LintWarning::warning(
        LintRule::MissingWhere,
        first.source_span(),
        format!("{verb} without WHERE affects every row"),
    ))
}

/// Aliases bound twice in the same query block. Sub-queries and the branches
/// of a set operation are separate blocks.
fn duplicate_aliases(statement: &Statement, lineage: &LineageMap) -> Vec<LintWarning> {
    let block_of = |reference: &TableReference| {
        let depth = statement
            .clause_at(reference.span.start + 1)
            .map_or(0, |c| c.depth);
        let select = statement
            .clauses_of(ClauseKind::Select)
            .filter(|c| c.depth == depth && c.start <= reference.span.start)
            .last()
            .map(|c| c.start);
        (depth, select)
    };

    lineage
        .references
        .iter()
        .filter(|r| r.statement_index == statement.index)
        .into_group_map_by(|r| (block_of(r), r.scope_name().to_lowercase()))
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .flat_map(|((_, alias), group)| {
            let first = group[0].qualified_name();
            group
                .into_iter()
                .skip(1)
                .map(move |r| {
                    LintWarning::error(
                        LintRule::DuplicateAlias,
                        r.span,
                        format!("Alias '{alias}' is already bound to {first}"),
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{simple_parse, tokenize};
    use rstest::rstest;

    fn lint_with(sql: &str, language: &str, options: LintOptions) -> Vec<LintWarning> {
        let statements = simple_parse(&tokenize(sql, language));
        let lineage = find_table_reference_and_alias(&statements);
        ContextFreeLinter::new(SqlDialect::from_language(language), options)
            .lint(&statements, &lineage)
    }

    fn rules(sql: &str) -> Vec<LintRule> {
        let options = LintOptions {
            syntax_check: false,
        };
        lint_with(sql, "hive", options)
            .into_iter()
            .map(|w| w.rule)
            .collect()
    }

    #[test]
    fn clean_query_has_no_warnings() {
        let sql = "select a, b from t where b = 1 order by a";
        assert!(lint_with(sql, "ansi", LintOptions::default()).is_empty());
    }

    #[rstest]
    #[case("select 'abc", LintRule::UnterminatedString)]
    #[case("select \"abc", LintRule::UnterminatedString)]
    #[case("select 1 /* abc", LintRule::UnterminatedComment)]
    fn unterminated_constructs(#[case] sql: &str, #[case] rule: LintRule) {
        let warnings = lint_with(sql, "presto", LintOptions::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].rule, rule);
        assert_eq!(warnings[0].severity, Severity::Error);
        assert_eq!(warnings[0].from.ch, sql.rfind(['\'', '"', '/']).expect("opener"));
    }

    #[rstest]
    #[case("select count(a from t", 1)]
    #[case("select a) from t", 1)]
    #[case("select ((a) from t where (b", 2)]
    #[case("select (a) from t", 0)]
    fn parentheses(#[case] sql: &str, #[case] count: usize) {
        let found = rules(sql)
            .into_iter()
            .filter(|r| *r == LintRule::UnbalancedParentheses)
            .count();
        assert_eq!(found, count);
    }

    #[rstest]
    #[case("select a, b, from t")]
    #[case("select a from t1, where x = 1")]
    #[case("select count(a,) from t")]
    #[case("select a,")]
    #[case("select a, b from t group by a, order by b;")]
    fn trailing_commas_are_errors(#[case] sql: &str) {
        assert_eq!(rules(sql), vec![LintRule::TrailingComma]);
    }

    #[test]
    fn trailing_comma_position() {
        let warnings = lint_with(
            "select a,\nfrom t",
            "hive",
            LintOptions {
                syntax_check: false,
            },
        );
        assert_eq!(warnings[0].from, crate::sql::Position::new(0, 8));
        assert_eq!(warnings[0].message, "Trailing comma before FROM");
    }

    #[rstest]
    #[case("delete from t", true)]
    #[case("update t set a = 1", true)]
    #[case("update t set a = (select max(b) from s where s.c = 1)", true)]
    #[case("delete from t where id = 1", false)]
    #[case("update t set a = 1 where id = 2", false)]
    #[case("select * from t", false)]
    fn missing_where_is_a_warning(#[case] sql: &str, #[case] expected: bool) {
        let warnings: Vec<_> = rules(sql)
            .into_iter()
            .filter(|r| *r == LintRule::MissingWhere)
            .collect();
        assert_eq!(!warnings.is_empty(), expected);
    }

    #[test]
    fn duplicate_aliases_in_one_block() {
        let sql = "select * from a x join b x on x.id = x.id";
        let warnings = lint_with(sql, "hive", LintOptions::default());
        let duplicates: Vec<_> = warnings
            .iter()
            .filter(|w| w.rule == LintRule::DuplicateAlias)
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].message, "Alias 'x' is already bound to a");
        assert_eq!(duplicates[0].from.ch, sql.find("b x").expect("b"));
    }

    #[rstest]
    #[case("select * from (select * from t) s join t on s.id = t.id")]
    #[case("select a from t union all select a from t")]
    #[case("insert into t select * from t")]
    #[case("select * from a x; select * from b x")]
    fn aliases_in_separate_blocks_are_fine(#[case] sql: &str) {
        assert!(!rules(sql).contains(&LintRule::DuplicateAlias));
    }

    #[test]
    fn syntax_errors_are_warnings() {
        let warnings = lint_with("select a b c from t", "ansi", LintOptions::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].rule, LintRule::Syntax);
        assert_eq!(warnings[0].severity, Severity::Warning);
        assert!(warnings[0].message.starts_with("Syntax error"));
    }

    #[test]
    fn syntax_check_can_be_disabled() {
        let options = LintOptions {
            syntax_check: false,
        };
        assert!(lint_with("select a b c from t", "ansi", options).is_empty());
    }

    #[test]
    fn rules_contribute_independently() {
        let warnings = lint_with("select a, from t where (b", "ansi", LintOptions::default());
        let found: Vec<_> = warnings.iter().map(|w| w.rule).collect();
        assert!(found.contains(&LintRule::TrailingComma));
        assert!(found.contains(&LintRule::UnbalancedParentheses));
        assert!(found.contains(&LintRule::Syntax));
        assert!(warnings.windows(2).all(|w| w[0].from <= w[1].from));
    }

    #[test]
    fn free_function_uses_language() {
        let statements = simple_parse(&tokenize("select `a` from t", "hive"));
        let lineage = find_table_reference_and_alias(&statements);
        let warnings = get_context_free_linter_warnings(&statements, "hive", &lineage);
        assert!(warnings.is_empty(), "{warnings:?}");
    }
}
