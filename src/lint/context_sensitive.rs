use crate::*;
use moka::future::Cache;
use std::{sync::Arc, time::Duration};

type CacheKey = (MetastoreId, String, String);

/// Cross-checks a lineage map against a metastore.
///
/// Table lookups are cached per `(metastore, schema, table)`, misses
/// included. A failing metastore never fails the lint pass: the lookup is
/// logged and the reference produces no warnings (errors are not cached, so
/// the next pass retries).
pub struct SchemaLinter {
    metastore: Arc<dyn Metastore>,
    cache: Cache<CacheKey, Option<Arc<TableSchema>>>,
    default_schema: String,
}

impl SchemaLinter {
    pub fn new(metastore: Arc<dyn Metastore>, config: &Config) -> Self {
        Self::with_cache(
            metastore,
            config.schema_cache_capacity,
            config.schema_cache_ttl(),
            config.default_schema.clone(),
        )
    }

    pub fn with_cache(
        metastore: Arc<dyn Metastore>,
        capacity: u64,
        ttl: Duration,
        default_schema: impl Into<String>,
    ) -> Self {
        Self {
            metastore,
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            default_schema: default_schema.into(),
        }
    }

    pub async fn get_context_sensitive_warnings(
        &self,
        metastore_id: MetastoreId,
        lineage: &LineageMap,
    ) -> Vec<LintWarning> {
        let mut warnings = Vec::new();
        // Parallel to `lineage.references`; `None` when unknown or not looked up.
        let mut resolved: Vec<Option<Arc<TableSchema>>> =
            Vec::with_capacity(lineage.references.len());
        for reference in &lineage.references {
            let schema = reference
                .schema
                .as_deref()
                .unwrap_or(&self.default_schema);
            resolved.push(match self.lookup(metastore_id, schema, &reference.table).await {
                Ok(Some(table)) => Some(table),
                Ok(None) => {
                    warnings.push(LintWarning::error(
                        LintRule::UnknownTable,
                        reference.span,
                        format!("Table '{schema}.{}' does not exist", reference.table),
                    ));
                    None
                }
                Err(e) => {
                    warn!("Schema lookup for {schema}.{} failed: {e}", reference.table);
                    None
                }
            });
        }

        for column in &lineage.columns {
            let Some(table) = owner(lineage, column).and_then(|at| resolved[at].as_ref()) else {
                continue;
            };
            if table.column(&column.column).is_none() {
                warnings.push(LintWarning::warning(
                    LintRule::UnknownColumn,
                    column.span,
                    format!(
                        "Column '{}' not found in {}",
                        column.column,
                        table.qualified_name()
                    ),
                ));
            }
        }
        sort_warnings(&mut warnings);
        warnings
    }

    async fn lookup(
        &self,
        metastore_id: MetastoreId,
        schema: &str,
        table: &str,
    ) -> Result<Option<Arc<TableSchema>>> {
        let key = (metastore_id, schema.to_lowercase(), table.to_lowercase());
        let metastore = Arc::clone(&self.metastore);
        let (schema, table) = (schema.to_string(), table.to_string());
        self.cache
            .try_get_with(key, async move {
                trace!("Schema cache miss for {schema}.{table}");
                metastore
                    .table(metastore_id, &schema, &table)
                    .await
                    .map(|found| found.map(Arc::new))
            })
            .await
            .map_err(|e: Arc<Error>| Error::Metastore(e.to_string()))
    }
}

/// Index of the reference a column's qualifier names: an alias (or bare
/// table name) first, else the table name behind an alias.
fn owner(lineage: &LineageMap, column: &ColumnReference) -> Option<usize> {
    let in_statement = || {
        lineage
            .references
            .iter()
            .enumerate()
            .filter(|(_, r)| r.statement_index == column.statement_index)
    };
    in_statement()
        .find(|(_, r)| r.scope_name().eq_ignore_ascii_case(&column.qualifier))
        .or_else(|| {
            in_statement().find(|(_, r)| r.table.eq_ignore_ascii_case(&column.qualifier))
        })
        .map(|(at, _)| at)
}
