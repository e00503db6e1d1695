use crate::sql::{Position, Span};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[display("error")]
    Error,
    #[display("warning")]
    Warning,
}

/// Rule that produced a warning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum LintRule {
    #[display("unterminated-string")]
    UnterminatedString,
    #[display("unterminated-comment")]
    UnterminatedComment,
    #[display("unbalanced-parentheses")]
    UnbalancedParentheses,
    #[display("trailing-comma")]
    TrailingComma,
    #[display("missing-where")]
    MissingWhere,
    #[display("duplicate-alias")]
    DuplicateAlias,
    #[display("syntax")]
    Syntax,
    #[display("unknown-table")]
    UnknownTable,
    #[display("unknown-column")]
    UnknownColumn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintWarning {
    pub from: Position,
    pub to: Position,
    pub severity: Severity,
    pub message: String,
    pub rule: LintRule,
}

impl LintWarning {
    pub fn error(rule: LintRule, span: Span, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Error, span, message)
    }

    pub fn warning(rule: LintRule, span: Span, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Warning, span, message)
    }

    fn new(rule: LintRule, severity: Severity, span: Span, message: impl Into<String>) -> Self {
        Self {
            from: span.from,
            to: span.to,
            severity,
            message: message.into(),
            rule,
        }
    }
}

/// Stable sort by position, for display.
pub fn sort_warnings(warnings: &mut [LintWarning]) {
    warnings.sort_by_key(|w| (w.from, w.to));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_for_the_editor() {
        let span = Span {
            start: 0,
            end: 3,
            from: Position::new(0, 0),
            to: Position::new(0, 3),
        };
        let warning = LintWarning::error(LintRule::TrailingComma, span, "Trailing comma");
        let json = serde_json::to_value(&warning).expect("serialize");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["rule"], "trailing-comma");
        assert_eq!(json["from"]["ch"], 0);
        assert_eq!(json["to"]["ch"], 3);
    }

    #[test]
    fn sorting_is_stable() {
        let at = |line, ch| Span {
            from: Position::new(line, ch),
            to: Position::new(line, ch + 1),
            ..Default::default()
        };
        let mut warnings = vec![
            LintWarning::warning(LintRule::Syntax, at(1, 0), "b"),
            LintWarning::error(LintRule::TrailingComma, at(0, 4), "a"),
            LintWarning::error(LintRule::DuplicateAlias, at(1, 0), "c"),
        ];
        sort_warnings(&mut warnings);
        let order: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
