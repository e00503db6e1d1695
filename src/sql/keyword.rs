//! Structural SQL keywords.
//!
//! The tokenizer classifies words as keywords using a per-dialect word list
//! (see `dialect.rs`). This enum covers only the subset of those words that the
//! splitter, lineage extractor, linters and autocompleter reason about. Every
//! variant is present in every dialect's keyword list.
//!
//! Keywords are matched case-insensitively via `from_lower` on a pre-lower-cased
//! slice.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    Join,
    On,
    Using,
    As,
    Where,
    Group,
    By,
    Order,
    Having,
    Limit,
    Offset,
    Union,
    Except,
    Intersect,
    With,
    Recursive,
    Insert,
    Into,
    Overwrite,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Replace,
    Drop,
    Alter,
    Table,
    View,
    If,
    Not,
    Exists,
    External,
    Temporary,
    Use,
    Left,
    Right,
    Inner,
    Outer,
    Full,
    Cross,
    Natural,
    Lateral,
    Show,
    Describe,
    Explain,
}

impl Keyword {
    /// Keywords that end a table list (FROM / JOIN items).
    pub const TERMINATORS: [Self; 13] = [
        Keyword::Where,
        Keyword::Group,
        Keyword::Order,
        Keyword::Having,
        Keyword::Limit,
        Keyword::Offset,
        Keyword::Union,
        Keyword::Except,
        Keyword::Intersect,
        Keyword::On,
        Keyword::Using,
        Keyword::Set,
        Keyword::Values,
    ];

    /// Words that may precede `JOIN` as part of a join operator.
    pub const JOIN_MODIFIERS: [Self; 7] = [
        Keyword::Left,
        Keyword::Right,
        Keyword::Inner,
        Keyword::Outer,
        Keyword::Full,
        Keyword::Cross,
        Keyword::Natural,
    ];

    pub const ALL: [Self; 48] = [
        Keyword::Select,
        Keyword::From,
        Keyword::Join,
        Keyword::On,
        Keyword::Using,
        Keyword::As,
        Keyword::Where,
        Keyword::Group,
        Keyword::By,
        Keyword::Order,
        Keyword::Having,
        Keyword::Limit,
        Keyword::Offset,
        Keyword::Union,
        Keyword::Except,
        Keyword::Intersect,
        Keyword::With,
        Keyword::Recursive,
        Keyword::Insert,
        Keyword::Into,
        Keyword::Overwrite,
        Keyword::Values,
        Keyword::Update,
        Keyword::Set,
        Keyword::Delete,
        Keyword::Create,
        Keyword::Replace,
        Keyword::Drop,
        Keyword::Alter,
        Keyword::Table,
        Keyword::View,
        Keyword::If,
        Keyword::Not,
        Keyword::Exists,
        Keyword::External,
        Keyword::Temporary,
        Keyword::Use,
        Keyword::Left,
        Keyword::Right,
        Keyword::Inner,
        Keyword::Outer,
        Keyword::Full,
        Keyword::Cross,
        Keyword::Natural,
        Keyword::Lateral,
        Keyword::Show,
        Keyword::Describe,
        Keyword::Explain,
    ];

    /// Attempt to classify a *lower-cased* word slice into a `Keyword`.
    ///
    /// NOTE: The caller is responsible for lower-casing the input.
    pub fn from_lower(word: &str) -> Option<Self> {
        use Keyword::*;
        let kw = match word {
            "select" => Select,
            "from" => From,
            "join" => Join,
            "on" => On,
            "using" => Using,
            "as" => As,
            "where" => Where,
            "group" => Group,
            "by" => By,
            "order" => Order,
            "having" => Having,
            "limit" => Limit,
            "offset" => Offset,
            "union" => Union,
            "except" => Except,
            "intersect" => Intersect,
            "with" => With,
            "recursive" => Recursive,
            "insert" => Insert,
            "into" => Into,
            "overwrite" => Overwrite,
            "values" => Values,
            "update" => Update,
            "set" => Set,
            "delete" => Delete,
            "create" => Create,
            "replace" => Replace,
            "drop" => Drop,
            "alter" => Alter,
            "table" => Table,
            "view" => View,
            "if" => If,
            "not" => Not,
            "exists" => Exists,
            "external" => External,
            "temporary" | "temp" => Temporary,
            "use" => Use,
            "left" => Left,
            "right" => Right,
            "inner" => Inner,
            "outer" => Outer,
            "full" => Full,
            "cross" => Cross,
            "natural" => Natural,
            "lateral" => Lateral,
            "show" => Show,
            "describe" | "desc" => Describe,
            "explain" => Explain,
            _ => return None,
        };
        Some(kw)
    }

    /// Canonical lowercase string form of the keyword.
    pub const fn as_str(self) -> &'static str {
        use Keyword::*;
        match self {
            Select => "select",
            From => "from",
            Join => "join",
            On => "on",
            Using => "using",
            As => "as",
            Where => "where",
            Group => "group",
            By => "by",
            Order => "order",
            Having => "having",
            Limit => "limit",
            Offset => "offset",
            Union => "union",
            Except => "except",
            Intersect => "intersect",
            With => "with",
            Recursive => "recursive",
            Insert => "insert",
            Into => "into",
            Overwrite => "overwrite",
            Values => "values",
            Update => "update",
            Set => "set",
            Delete => "delete",
            Create => "create",
            Replace => "replace",
            Drop => "drop",
            Alter => "alter",
            Table => "table",
            View => "view",
            If => "if",
            Not => "not",
            Exists => "exists",
            External => "external",
            Temporary => "temporary",
            Use => "use",
            Left => "left",
            Right => "right",
            Inner => "inner",
            Outer => "outer",
            Full => "full",
            Cross => "cross",
            Natural => "natural",
            Lateral => "lateral",
            Show => "show",
            Describe => "describe",
            Explain => "explain",
        }
    }

    pub fn is_join_modifier(self) -> bool {
        Self::JOIN_MODIFIERS.contains(&self)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_keywords() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_lower(kw.as_str()), Some(kw), "{kw} should round trip");
        }
    }

    #[test]
    fn recognizes_short_forms() {
        assert_eq!(Keyword::from_lower("temp"), Some(Keyword::Temporary));
        assert_eq!(Keyword::from_lower("desc"), Some(Keyword::Describe));
    }

    #[test]
    fn rejects_unknown_words() {
        for w in ["foo", "bar", "users", "count", "random", "SELECT"] {
            assert!(
                Keyword::from_lower(w).is_none(),
                "{w} should NOT be recognized"
            );
        }
    }

    #[test]
    fn display_matches_as_str() {
        for kw in Keyword::ALL {
            assert_eq!(kw.to_string(), kw.as_str());
        }
    }

    #[test]
    fn join_modifiers() {
        assert!(Keyword::Left.is_join_modifier());
        assert!(Keyword::Natural.is_join_modifier());
        assert!(!Keyword::Join.is_join_modifier());
    }
}
