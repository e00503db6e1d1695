//! Context-aware completion at a cursor.
//!
//! The clause around the cursor decides what is offered: tables in table
//! lists, in-scope columns and aliases in expression clauses, the columns of
//! one table after `alias.`, keywords everywhere else. Table scopes come from
//! the [`LineageMap`](crate::LineageMap) the worker produced for the same text.

crate::reexport!(cursor);
crate::reexport!(ranking);
crate::reexport!(suggestion);

use crate::sql::{ClauseKind, Keyword, SqlDialect, Statement, Token, simple_parse, tokenize};
use crate::*;
use std::sync::Arc;

pub struct Autocompleter {
    catalog: Arc<Database>,
    max_suggestions: usize,
}

/// The word being completed and what precedes it.
struct Site<'a> {
    statement: &'a Statement,
    prefix: String,
    word_start: usize,
}

impl Autocompleter {
    pub fn new(catalog: Arc<Database>, config: &Config) -> Self {
        Self::with_limit(catalog, config.max_suggestions)
    }

    pub fn with_limit(catalog: Arc<Database>, max_suggestions: usize) -> Self {
        Self {
            catalog,
            max_suggestions,
        }
    }

    pub fn catalog(&self) -> &Arc<Database> {
        &self.catalog
    }

    /// Suggestions for `cursor` in `sql`, best first.
    pub async fn complete(
        &self,
        sql: &str,
        cursor: Cursor,
        lineage: &LineageMap,
        language: &str,
    ) -> Suggestions {
        let dialect = SqlDialect::from_language(language);
        let statements = simple_parse(&tokenize(sql, language));
        let Some(site) = Self::locate(&statements, cursor.offset()) else {
            return self.finish(Self::keywords(dialect), "", &CompletionContext::Keyword);
        };
        let context = Self::context(&site);
        debug!(
            "Completing {:?} in statement {} as {context:?}",
            site.prefix, site.statement.index
        );

        let candidates = match &context {
            CompletionContext::Table => self.tables().await,
            CompletionContext::Qualified(qualifier) => {
                self.qualified(site.statement.index, qualifier, lineage).await
            }
            CompletionContext::Column => {
                let mut candidates = self.columns_in_scope(site.statement.index, lineage).await;
                candidates.extend(Self::keywords(dialect));
                candidates
            }
            CompletionContext::Keyword => Self::keywords(dialect),
        };
        self.finish(candidates, &site.prefix, &context)
    }

    fn finish(&self, candidates: Suggestions, prefix: &str, context: &CompletionContext) -> Suggestions {
        rank(candidates, prefix, context, self.max_suggestions)
    }

    /// Statement under the cursor and the partial word ending at it. `None`
    /// when the cursor sits past a terminated statement (a fresh statement).
    fn locate(statements: &[Statement], offset: usize) -> Option<Site<'_>> {
        let statement = statements
            .iter()
            .rev()
            .find(|s| s.start <= offset && offset <= s.end)?;
        if statement
            .significant()
            .next_back()
            .is_some_and(|t| t.is_punct(';') && t.end <= offset)
        {
            return None;
        }

        let word = statement
            .tokens
            .iter()
            .find(|t| t.kind.is_word() && t.touches(offset));
        let (prefix, word_start) = match word {
            Some(token) => {
                let typed = token.value.get(..offset - token.start).unwrap_or_default();
                let typed = typed.trim_start_matches(['"', '`', '[']);
                (typed.to_string(), token.start)
            }
            None => (String::new(), offset),
        };
        Some(Site {
            statement,
            prefix,
            word_start,
        })
    }

    fn context(site: &Site<'_>) -> CompletionContext {
        let before: Vec<&Token> = site
            .statement
            .significant()
            .filter(|t| t.end <= site.word_start)
            .collect();
        let clause = site.statement.clause_at(site.word_start).map(|c| c.kind);

        match before.as_slice() {
            [.., qualifier, dot] if dot.is_punct('.') => {
                if let Some(name) = qualifier.name() {
                    return CompletionContext::Qualified(name.to_string());
                }
            }
            [.., prev] if starts_table_item(prev, clause) => return CompletionContext::Table,
            _ => {}
        }
        match clause {
            Some(kind) if kind.lists_columns() => CompletionContext::Column,
            _ => CompletionContext::Keyword,
        }
    }

    fn keywords(dialect: SqlDialect) -> Suggestions {
        dialect.keywords().map(Suggestion::keyword).collect()
    }

    async fn tables(&self) -> Suggestions {
        self.catalog
            .tables()
            .await
            .into_iter()
            .map(|(schema, name)| Suggestion::Table { schema, name })
            .collect()
    }

    /// `qualifier.`: columns of the table the qualifier names in this
    /// statement, else tables of the schema it names.
    async fn qualified(
        &self,
        statement_index: usize,
        qualifier: &str,
        lineage: &LineageMap,
    ) -> Suggestions {
        if let Some(reference) = lineage.resolve(statement_index, qualifier)
            && let Some(table) = self.resolve_table(reference).await
        {
            return column_suggestions(qualifier, &table);
        }
        self.catalog
            .tables_in(qualifier)
            .await
            .into_iter()
            .map(|name| Suggestion::Table {
                schema: qualifier.to_string(),
                name,
            })
            .collect()
    }

    async fn columns_in_scope(&self, statement_index: usize, lineage: &LineageMap) -> Suggestions {
        let mut out = Vec::new();
        for reference in lineage.statement_aliases(statement_index).values() {
            if let Some(table) = self.resolve_table(reference).await {
                out.extend(column_suggestions(reference.scope_name(), &table));
            }
            if let Some(alias) = &reference.alias {
                out.push(Suggestion::Alias {
                    alias: alias.clone(),
                    table: reference.qualified_name(),
                });
            }
        }
        out
    }

    /// Catalog entry for a reference. Unqualified names are searched across
    /// schemas in name order.
    async fn resolve_table(&self, reference: &TableReference) -> Option<TableSchema> {
        if let Some(schema) = &reference.schema {
            return self.catalog.table(schema, &reference.table).await;
        }
        for schema in self.catalog.schema_names().await {
            if let Some(table) = self.catalog.table(&schema, &reference.table).await {
                return Some(table);
            }
        }
        trace!("No catalog entry for {}", reference.table);
        None
    }
}

fn column_suggestions(scope: &str, table: &TableSchema) -> Suggestions {
    table
        .columns
        .iter()
        .map(|column| Suggestion::Column {
            table: scope.to_string(),
            name: column.name.clone(),
            data_type: column.data_type.clone(),
        })
        .collect()
}

/// True when the next word after `prev` is a table name.
fn starts_table_item(prev: &Token, clause: Option<ClauseKind>) -> bool {
    match prev.keyword() {
        Some(
            Keyword::From
            | Keyword::Join
            | Keyword::Into
            | Keyword::Update
            | Keyword::Table
            | Keyword::Overwrite,
        ) => true,
        Some(Keyword::Exists) => matches!(clause, Some(ClauseKind::Drop | ClauseKind::Create)),
        _ => {
            prev.is_punct(',')
                && matches!(clause, Some(ClauseKind::From | ClauseKind::Join))
        }
    }
}
