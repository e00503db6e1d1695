use super::{Category, Suggestion};
use itertools::Itertools;

/// What the cursor is completing, derived from the surrounding clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Table lists: FROM, JOIN, INTO, UPDATE, DROP TABLE ...
    Table,
    /// Expression clauses: SELECT, WHERE, ON, GROUP BY, ORDER BY, HAVING, SET.
    Column,
    /// Right after `qualifier.`
    Qualified(String),
    Keyword,
}

impl CompletionContext {
    fn category_order(&self) -> &'static [Category] {
        match self {
            CompletionContext::Table => &[Category::Table, Category::Keyword],
            CompletionContext::Column => &[
                Category::Column,
                Category::Alias,
                Category::Keyword,
                Category::Table,
            ],
            CompletionContext::Qualified(_) => &[Category::Column, Category::Table],
            CompletionContext::Keyword => &[Category::Keyword],
        }
    }

    fn category_rank(&self, category: Category) -> usize {
        let order = self.category_order();
        order
            .iter()
            .position(|c| *c == category)
            .unwrap_or(order.len())
    }
}

/// 0 for a case-insensitive prefix match, 1 for a subsequence match.
pub(crate) fn match_tier(label: &str, prefix: &str) -> Option<u8> {
    if prefix.is_empty() {
        return Some(0);
    }
    let label = label.to_lowercase();
    let prefix = prefix.to_lowercase();
    if label.starts_with(&prefix) {
        return Some(0);
    }
    let mut chars = label.chars();
    prefix
        .chars()
        .all(|p| chars.any(|c| c == p))
        .then_some(1)
}

/// Filter by `prefix`, order and cap the candidates.
pub(crate) fn rank(
    candidates: Vec<Suggestion>,
    prefix: &str,
    context: &CompletionContext,
    limit: usize,
) -> Vec<Suggestion> {
    candidates
        .into_iter()
        .unique()
        .filter_map(|s| match_tier(s.label(), prefix).map(|tier| (tier, s)))
        .sorted_by_cached_key(|(tier, s)| {
            (
                *tier,
                context.category_rank(s.category()),
                s.label().len(),
                s.label().to_lowercase(),
            )
        })
        .map(|(_, s)| s)
        .take(limit)
        .collect()
}
