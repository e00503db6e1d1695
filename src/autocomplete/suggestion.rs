use crate::*;
use serde::{Deserialize, Serialize};

/// An autocomplete suggestion. Variants represent different kinds of things that can be suggested while
/// the user types a SQL query: raw keywords, columns of tables in scope, tables and aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Suggestion {
    #[display("{keyword}")]
    Keyword { keyword: String },
    #[display("{table}.{name}::{data_type}")]
    Column {
        table: String,
        name: String,
        #[serde(rename = "dataType")]
        data_type: DataType,
    },
    #[display("{schema}.{name}")]
    Table { schema: String, name: String },
    #[display("{alias} -> {table}")]
    Alias { alias: String, table: String },
}
pub type Suggestions = Vec<Suggestion>;

/// Suggestion kinds, in the order a column context prefers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Column,
    Alias,
    Table,
    Keyword,
}

impl Suggestion {
    pub fn keyword(keyword: &str) -> Self {
        Suggestion::Keyword {
            keyword: keyword.to_uppercase(),
        }
    }

    /// Text inserted into the editor.
    pub fn label(&self) -> &str {
        match self {
            Suggestion::Keyword { keyword } => keyword,
            Suggestion::Column { name, .. } | Suggestion::Table { name, .. } => name,
            Suggestion::Alias { alias, .. } => alias,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Suggestion::Keyword { .. } => Category::Keyword,
            Suggestion::Column { .. } => Category::Column,
            Suggestion::Table { .. } => Category::Table,
            Suggestion::Alias { .. } => Category::Alias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let column = Suggestion::Column {
            table: "e".into(),
            name: "id".into(),
            data_type: DataType::BigInt,
        };
        let json = serde_json::to_value(&column).expect("serialize");
        assert_eq!(json["kind"], "column");
        assert_eq!(json["dataType"], "bigint");
        assert_eq!(column.to_string(), "e.id::bigint");
        assert_eq!(Suggestion::keyword("select").label(), "SELECT");
    }
}
