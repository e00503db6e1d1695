use crate::*;
use std::sync::Arc;

/// Editor-facing entry point: worker analysis followed by the caller-side
/// passes that need schema knowledge.
pub struct AnalysisService {
    dispatcher: Dispatcher,
    schema_linter: SchemaLinter,
    autocompleter: Autocompleter,
}

impl AnalysisService {
    pub fn new(config: &Config, metastore: Arc<dyn Metastore>, catalog: Arc<Database>) -> Self {
        Self {
            dispatcher: Dispatcher::new(config),
            schema_linter: SchemaLinter::new(metastore, config),
            autocompleter: Autocompleter::new(catalog, config),
        }
    }

    pub fn init(&self) -> Result {
        self.dispatcher.init()
    }

    pub async fn dispose(&self) {
        self.dispatcher.dispose().await;
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Context-free and schema warnings of `code`, merged and sorted by position.
    pub async fn lint(
        &self,
        code: &str,
        language: &str,
        metastore_id: MetastoreId,
    ) -> Result<Vec<LintWarning>> {
        let analysis = self
            .dispatcher
            .analyze_code(code, AnalysisMode::Lint, language)
            .await?;
        let mut warnings = analysis.context_free_linter_warnings.unwrap_or_default();
        warnings.extend(
            self.schema_linter
                .get_context_sensitive_warnings(metastore_id, &analysis.lineage)
                .await,
        );
        sort_warnings(&mut warnings);
        Ok(warnings)
    }

    pub async fn complete(&self, code: &str, cursor: Cursor, language: &str) -> Result<Suggestions> {
        let analysis = self
            .dispatcher
            .analyze_code(code, AnalysisMode::Autocomplete, language)
            .await?;
        Ok(self
            .autocompleter
            .complete(code, cursor, &analysis.lineage, language)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn service(catalog: Arc<Database>) -> AnalysisService {
        let service = AnalysisService::new(config(), catalog.clone(), catalog);
        service.init().expect("init");
        service
    }

    #[rstest]
    #[tokio::test]
    async fn lint_merges_both_passes(catalog: Arc<Database>) {
        let service = service(catalog);
        let sql = "select e.id, e.nope,\nfrom default.events e;\nselect * from default.ghosts";
        let warnings = service.lint(sql, "hive", 1).await.expect("lint");
        let rules: Vec<_> = warnings
            .iter()
            .filter(|w| w.rule != LintRule::Syntax)
            .map(|w| w.rule)
            .collect();
        assert_eq!(
            rules,
            vec![
                LintRule::UnknownColumn,
                LintRule::TrailingComma,
                LintRule::UnknownTable
            ]
        );
        assert!(warnings.windows(2).all(|w| (w[0].from, w[0].to) <= (w[1].from, w[1].to)));
        service.dispose().await;
    }

    #[rstest]
    #[tokio::test]
    async fn complete_uses_worker_lineage(catalog: Arc<Database>) {
        let service = service(catalog);
        let sql = "select e. from default.events e";
        let suggestions = service
            .complete(sql, Cursor::new(9), "hive")
            .await
            .expect("complete");
        let labels: Vec<_> = suggestions.iter().map(Suggestion::label).collect();
        assert_eq!(labels, vec!["id", "payload", "created_at"]);
        service.dispose().await;
    }

    #[rstest]
    #[tokio::test]
    async fn disposed_service_reports_it(catalog: Arc<Database>) {
        let service = service(catalog);
        service.dispose().await;
        assert!(matches!(
            service.lint("select 1", "hive", 1).await,
            Err(Error::WorkerNotRunning)
        ));
    }
}
