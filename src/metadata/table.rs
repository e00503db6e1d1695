use super::*;

#[derive(Debug, Default)]
pub struct Table {
    pub name: String,
    /// Keyed by lower-cased column name; iteration follows insertion order.
    pub columns: RwLock<IndexMap<String, Column>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: RwLock::new(IndexMap::new()),
        }
    }

    /// Construct a table with an explicit ordered list of (name, DataType) pairs.
    pub fn new_with_ordered(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = (impl Into<String>, DataType)>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: RwLock::new(Column::new_map(columns)),
        }
    }

    /// Columns in preserved order.
    pub async fn ordered_columns(&self) -> Vec<Column> {
        self.columns.read().await.values().cloned().collect()
    }

    pub async fn column(&self, name: &str) -> Option<Column> {
        self.columns.read().await.get(&name.to_lowercase()).cloned()
    }

    /// Insert or overwrite a column, keeping its original position on overwrite.
    pub async fn insert_column(&self, column: Column) {
        self.columns
            .write()
            .await
            .insert(column.name.to_lowercase(), column);
    }

    pub async fn snapshot(&self, schema: &str) -> TableSchema {
        TableSchema {
            schema: schema.to_string(),
            name: self.name.clone(),
            columns: self.ordered_columns().await,
        }
    }
}

/// Owned copy of a table's definition, as handed out by a `Metastore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub schema: String,
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}
