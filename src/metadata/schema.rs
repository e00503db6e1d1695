use super::*;

#[derive(Debug)]
pub struct Schema {
    pub name: String,
    /// Keyed by lower-cased table name.
    pub tables: Data<Table>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Data::new(HashMap::new()),
        }
    }

    pub async fn insert_table(&self, table: Table) {
        self.tables
            .write()
            .await
            .insert(table.name.to_lowercase(), table);
    }

    /// Table names, sorted.
    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .read()
            .await
            .values()
            .map(|t| t.name.clone())
            .collect();
        names.sort();
        names
    }
}
