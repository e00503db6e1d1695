use super::*;
use async_trait::async_trait;
use sqlx::{PgPool, Row as _, postgres::PgPoolOptions};

const COLUMNS_QUERY: &str = "\
    SELECT table_schema, table_name, column_name, data_type \
    FROM information_schema.columns \
    WHERE table_schema NOT IN ('pg_catalog', 'information_schema') \
    ORDER BY table_schema, table_name, ordinal_position";

const TABLE_QUERY: &str = "\
    SELECT table_schema, table_name, column_name, data_type \
    FROM information_schema.columns \
    WHERE lower(table_schema) = lower($1) AND lower(table_name) = lower($2) \
    ORDER BY ordinal_position";

/// Metastore backed by a PostgreSQL `information_schema`.
#[derive(Debug, Clone)]
pub struct PgMetastore {
    pool: PgPool,
}

impl PgMetastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Snapshot every user table into an in-memory catalog.
    pub async fn load_database(&self, name: &str) -> Result<Database> {
        let rows = sqlx::query(COLUMNS_QUERY).fetch_all(&self.pool).await?;
        let database = Database::new(name);
        for row in &rows {
            let schema: String = row.try_get("table_schema")?;
            let table: String = row.try_get("table_name")?;
            let column: String = row.try_get("column_name")?;
            let data_type: String = row.try_get("data_type")?;
            database
                .insert_column(&schema, &table, Column::new(column, DataType::parse(&data_type)))
                .await;
        }
        info!("Loaded {} columns into catalog {name}", rows.len());
        Ok(database)
    }
}

#[async_trait]
impl Metastore for PgMetastore {
    async fn table(
        &self,
        _metastore_id: MetastoreId,
        schema: &str,
        table: &str,
    ) -> Result<Option<TableSchema>> {
        let rows = sqlx::query(TABLE_QUERY)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("column_name")?;
            let data_type: String = row.try_get("data_type")?;
            columns.push(Column::new(name, DataType::parse(&data_type)));
        }
        Ok(Some(TableSchema {
            schema: first.try_get("table_schema")?,
            name: first.try_get("table_name")?,
            columns,
        }))
    }
}
