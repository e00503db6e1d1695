use super::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Identifies one metastore (one catalog) among those a deployment knows.
pub type MetastoreId = u64;

/// Source of table definitions for schema-aware linting.
#[async_trait]
pub trait Metastore: Send + Sync {
    /// `Ok(None)` when the metastore is reachable but has no such table.
    async fn table(
        &self,
        metastore_id: MetastoreId,
        schema: &str,
        table: &str,
    ) -> Result<Option<TableSchema>>;
}

/// A single catalog answers for every metastore id.
#[async_trait]
impl Metastore for Database {
    async fn table(
        &self,
        _metastore_id: MetastoreId,
        schema: &str,
        table: &str,
    ) -> Result<Option<TableSchema>> {
        Ok(Database::table(self, schema, table).await)
    }
}

/// In-memory catalogs keyed by metastore id.
#[derive(Debug, Default)]
pub struct MetastoreRegistry {
    catalogs: RwLock<HashMap<MetastoreId, Arc<Database>>>,
}

impl MetastoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, metastore_id: MetastoreId, catalog: Arc<Database>) {
        debug!("Registering catalog {} as metastore {metastore_id}", catalog.name);
        self.catalogs.write().await.insert(metastore_id, catalog);
    }

    pub async fn catalog(&self, metastore_id: MetastoreId) -> Option<Arc<Database>> {
        self.catalogs.read().await.get(&metastore_id).cloned()
    }
}

#[async_trait]
impl Metastore for MetastoreRegistry {
    async fn table(
        &self,
        metastore_id: MetastoreId,
        schema: &str,
        table: &str,
    ) -> Result<Option<TableSchema>> {
        let catalog = self
            .catalog(metastore_id)
            .await
            .ok_or_else(|| Error::Metastore(format!("unknown metastore {metastore_id}")))?;
        Ok(catalog.table(schema, table).await)
    }
}
