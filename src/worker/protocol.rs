use crate::*;
use serde::{Deserialize, Serialize};

/// Correlates a worker response with the request that produced it.
pub type RequestId = String;

/// Which output the worker computes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Lineage plus editor lines.
    #[display("autocomplete")]
    Autocomplete,
    /// Lineage plus context-free warnings.
    #[display("lint")]
    Lint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnalysisRequest {
    Autocomplete { code: String, language: String },
    Lint { code: String, language: String },
}

impl AnalysisRequest {
    pub fn new(mode: AnalysisMode, code: impl Into<String>, language: impl Into<String>) -> Self {
        let (code, language) = (code.into(), language.into());
        match mode {
            AnalysisMode::Autocomplete => AnalysisRequest::Autocomplete { code, language },
            AnalysisMode::Lint => AnalysisRequest::Lint { code, language },
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        match self {
            AnalysisRequest::Autocomplete { .. } => AnalysisMode::Autocomplete,
            AnalysisRequest::Lint { .. } => AnalysisMode::Lint,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AnalysisRequest::Autocomplete { code, .. } | AnalysisRequest::Lint { code, .. } => code,
        }
    }
}

/// Message posted to the worker: `{"id", "mode", "code", "language"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub id: RequestId,
    #[serde(flatten)]
    pub request: AnalysisRequest,
}

/// Message posted back by the worker: `{"id", "codeAnalysis"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    pub id: RequestId,
    pub code_analysis: CodeAnalysisResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAnalysisResult {
    pub lineage: LineageMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_lines: Option<Vec<LineInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_free_linter_warnings: Option<Vec<LintWarning>>,
}
