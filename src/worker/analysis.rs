use crate::sql::{SqlDialect, get_editor_lines, simple_parse, tokenize};
use crate::*;

/// Worker-side half of the protocol: pure, synchronous analysis of one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    options: LintOptions,
}

impl Analyzer {
    pub fn new(options: LintOptions) -> Self {
        Self { options }
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> CodeAnalysisResult {
        match request {
            AnalysisRequest::Autocomplete { code, language } => {
                let statements = simple_parse(&tokenize(code, language));
                CodeAnalysisResult {
                    lineage: find_table_reference_and_alias(&statements),
                    editor_lines: Some(get_editor_lines(&statements)),
                    context_free_linter_warnings: None,
                }
            }
            AnalysisRequest::Lint { code, language } => {
                let statements = simple_parse(&tokenize(code, language));
                let lineage = find_table_reference_and_alias(&statements);
                let linter =
                    ContextFreeLinter::new(SqlDialect::from_language(language), self.options);
                CodeAnalysisResult {
                    context_free_linter_warnings: Some(linter.lint(&statements, &lineage)),
                    lineage,
                    editor_lines: None,
                }
            }
        }
    }

    /// Decode one request message, analyze it and encode the response.
    pub fn handle(&self, message: &str) -> Result<String> {
        let WorkerRequest { id, request } = serde_json::from_str(message)?;
        trace!(
            "Worker analyzing {id} ({}, {} bytes)",
            request.mode(),
            request.code().len()
        );
        let response = WorkerResponse {
            code_analysis: self.analyze(&request),
            id,
        };
        Ok(serde_json::to_string(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQL: &str = "use db;\nselect a.x, from t a";

    #[test]
    fn autocomplete_skips_linting() {
        let request = AnalysisRequest::new(AnalysisMode::Autocomplete, SQL, "hive");
        let result = Analyzer::default().analyze(&request);
        assert!(result.context_free_linter_warnings.is_none());
        let lines = result.editor_lines.expect("editor lines");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].statement_index, Some(1));
        assert_eq!(result.lineage.tables().into_iter().collect::<Vec<_>>(), vec!["db.t"]);
    }

    #[test]
    fn lint_reports_context_free_warnings() {
        let request = AnalysisRequest::new(AnalysisMode::Lint, SQL, "hive");
        let result = Analyzer::default().analyze(&request);
        assert!(result.editor_lines.is_none());
        let warnings = result.context_free_linter_warnings.expect("warnings");
        assert!(warnings.iter().any(|w| w.rule == LintRule::TrailingComma));
        assert_eq!(result.lineage.references.len(), 1);
    }

    #[test]
    fn handles_json_messages() {
        let message = r#"{"id":"a1","mode":"lint","code":"select 1","language":"presto"}"#;
        let response: WorkerResponse =
            serde_json::from_str(&Analyzer::default().handle(message).expect("handle"))
                .expect("response");
        assert_eq!(response.id, "a1");
        assert_eq!(response.code_analysis.context_free_linter_warnings, Some(vec![]));

        assert!(matches!(
            Analyzer::default().handle("{\"id\": 3}"),
            Err(Error::Protocol(_))
        ));
    }
}
