use crate::sql::Span;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A table named in a FROM / JOIN list or as an INSERT / UPDATE target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    /// Explicit qualifier, else the database of the closest preceding `USE`.
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
    pub statement_index: usize,
    pub span: Span,
}

impl TableReference {
    /// `schema.table`, or just `table` when unqualified.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }

    /// Name the table is visible under inside its statement.
    pub fn scope_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// `qualifier.column` seen in a column-listing clause, where the qualifier
/// names a table reference of the same statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReference {
    pub qualifier: String,
    pub column: String,
    pub statement_index: usize,
    pub span: Span,
}

/// Name bound by `WITH name AS (...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CteDefinition {
    pub name: String,
    pub statement_index: usize,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageMap {
    pub references: Vec<TableReference>,
    /// Lower-cased alias (or bare table name) to reference; later statements win.
    pub aliases: IndexMap<String, TableReference>,
    pub columns: Vec<ColumnReference>,
    pub ctes: Vec<CteDefinition>,
}

impl LineageMap {
    /// Alias scope of one statement, keyed by lower-cased scope name.
    pub fn statement_aliases(&self, statement_index: usize) -> IndexMap<String, &TableReference> {
        self.references
            .iter()
            .filter(|r| r.statement_index == statement_index)
            .map(|r| (r.scope_name().to_lowercase(), r))
            .collect()
    }

    /// Resolve an alias or table name as seen from `statement_index`, falling
    /// back to the document-wide alias map.
    pub fn resolve(&self, statement_index: usize, name: &str) -> Option<&TableReference> {
        let key = name.to_lowercase();
        self.references
            .iter()
            .rev()
            .filter(|r| r.statement_index == statement_index)
            .find(|r| r.scope_name().to_lowercase() == key || r.table.to_lowercase() == key)
            .or_else(|| self.aliases.get(&key))
    }

    pub fn is_cte(&self, statement_index: usize, name: &str) -> bool {
        self.ctes
            .iter()
            .any(|c| c.statement_index == statement_index && c.name.eq_ignore_ascii_case(name))
    }

    /// Distinct qualified table names in first-seen order.
    pub fn tables(&self) -> IndexSet<String> {
        self.references.iter().map(TableReference::qualified_name).collect()
    }
}
