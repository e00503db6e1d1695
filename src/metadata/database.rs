use super::*;

/// In-memory catalog: schemas → tables → columns.
///
/// Every level sits behind its own `RwLock`, so a catalog shared through an
/// `Arc` can be refreshed while completions read it. Lookups are
/// case-insensitive; the original spelling is kept for display.
#[derive(Debug)]
pub struct Database {
    pub name: String,
    /// Keyed by lower-cased schema name.
    pub schemas: Data<Schema>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: Data::new(HashMap::new()),
        }
    }

    /// Build a catalog from its JSON description:
    ///
    /// ```json
    /// {"name": "hive", "schemas": [{"name": "default", "tables": [
    ///     {"name": "events", "columns": [{"name": "id", "type": "bigint"}]}
    /// ]}]}
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let schemas = file
            .schemas
            .into_iter()
            .map(|schema| {
                let tables = schema
                    .tables
                    .into_iter()
                    .map(|table| {
                        let table = Table::new_with_ordered(
                            table.name,
                            table
                                .columns
                                .into_iter()
                                .map(|c| (c.name, DataType::parse(&c.data_type))),
                        );
                        (table.name.to_lowercase(), table)
                    })
                    .collect();
                let schema = Schema {
                    name: schema.name,
                    tables: Data::new(tables),
                };
                (schema.name.to_lowercase(), schema)
            })
            .collect();
        Ok(Self {
            name: file.name,
            schemas: Data::new(schemas),
        })
    }

    /// Add (or create) schema/table and insert the column.
    pub async fn insert_column(&self, schema_name: &str, table_name: &str, column: Column) {
        let mut schemas = self.schemas.write().await;
        let schema = schemas
            .entry(schema_name.to_lowercase())
            .or_insert_with(|| Schema::new(schema_name)); // Create/return schema
        let mut tables = schema.tables.write().await;
        tables
            .entry(table_name.to_lowercase())
            .or_insert_with(|| Table::new(table_name)) // Create/return table
            .insert_column(column)
            .await;
    }

    /// Add (or create) schema and insert the table.
    pub async fn insert_table(&self, schema_name: &str, table: Table) {
        let mut schemas = self.schemas.write().await;
        schemas
            .entry(schema_name.to_lowercase())
            .or_insert_with(|| Schema::new(schema_name))
            .insert_table(table)
            .await;
    }

    /// Insert (or overwrite) a schema.
    pub async fn insert_schema(&self, schema: Schema) {
        self.schemas
            .write()
            .await
            .insert(schema.name.to_lowercase(), schema);
    }

    pub async fn table(&self, schema_name: &str, table_name: &str) -> Option<TableSchema> {
        let schemas = self.schemas.read().await;
        let schema = schemas.get(&schema_name.to_lowercase())?;
        let tables = schema.tables.read().await;
        let table = tables.get(&table_name.to_lowercase())?;
        Some(table.snapshot(&schema.name).await)
    }

    pub async fn schema_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schemas
            .read()
            .await
            .values()
            .map(|s| s.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Every `(schema, table)` pair, sorted.
    pub async fn tables(&self) -> Vec<(String, String)> {
        let schemas = self.schemas.read().await;
        let mut pairs = Vec::new();
        for schema in schemas.values() {
            for table in schema.table_names().await {
                pairs.push((schema.name.clone(), table));
            }
        }
        pairs.sort();
        pairs
    }

    /// Tables of one schema, sorted; empty when the schema is unknown.
    pub async fn tables_in(&self, schema_name: &str) -> Vec<String> {
        match self.schemas.read().await.get(&schema_name.to_lowercase()) {
            Some(schema) => schema.table_names().await,
            None => Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    name: String,
    #[serde(default)]
    schemas: Vec<SchemaFile>,
}

#[derive(Deserialize)]
struct SchemaFile {
    name: String,
    #[serde(default)]
    tables: Vec<TableFile>,
}

#[derive(Deserialize)]
struct TableFile {
    name: String,
    #[serde(default)]
    columns: Vec<ColumnFile>,
}

#[derive(Deserialize)]
struct ColumnFile {
    name: String,
    #[serde(rename = "type")]
    data_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "name": "hive",
        "schemas": [
            {"name": "Default", "tables": [
                {"name": "Events", "columns": [
                    {"name": "id", "type": "bigint"},
                    {"name": "payload", "type": "map<string,string>"},
                    {"name": "created_at", "type": "timestamp"}
                ]}
            ]},
            {"name": "sales"}
        ]
    }"#;

    #[tokio::test]
    async fn loads_catalog_json() {
        let db = Database::from_json(CATALOG).expect("catalog");
        assert_eq!(db.name, "hive");
        assert_eq!(db.schema_names().await, vec!["Default", "sales"]);

        let events = db.table("default", "EVENTS").await.expect("events");
        assert_eq!(events.qualified_name(), "Default.Events");
        let names: Vec<_> = events.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "payload", "created_at"]);
        assert_eq!(events.column("ID").map(|c| &c.data_type), Some(&DataType::BigInt));
        assert!(db.table("sales", "events").await.is_none());
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        assert!(matches!(
            Database::from_json("{\"schemas\": []}"),
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn insert_creates_missing_levels() {
        let db = Database::new("test");
        db.insert_column("public", "users", Column::new("id", DataType::Integer))
            .await;
        db.insert_column("public", "users", Column::new("name", "text"))
            .await;
        db.insert_table(
            "public",
            Table::new_with_ordered("orders", [("id", DataType::BigInt)]),
        )
        .await;
        db.insert_schema(Schema::new("empty")).await;

        assert_eq!(
            db.tables().await,
            vec![
                ("public".to_string(), "orders".to_string()),
                ("public".to_string(), "users".to_string()),
            ]
        );
        assert_eq!(db.tables_in("PUBLIC").await, vec!["orders", "users"]);
        assert!(db.tables_in("missing").await.is_empty());

        let users = db.table("public", "users").await.expect("users");
        assert_eq!(users.columns[1], Column::new("name", DataType::String));
    }
}
