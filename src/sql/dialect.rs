//! SQL dialect lookup table.
//!
//! A dialect decides which words are keywords and how quoting works. Unknown
//! language names fall back to a generic ANSI-like rule set.

use crate::*;
use serde::{Deserialize, Serialize};
use sqlparser::dialect::{
    BigQueryDialect, GenericDialect, HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    SQLiteDialect, SnowflakeDialect,
};
use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
    sync::LazyLock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Ansi,
    Hive,
    SparkSql,
    Presto,
    Trino,
    MySql,
    PostgreSql,
    Sqlite,
    BigQuery,
    Snowflake,
    MsSql,
}

/// Lexical rules of a dialect.
#[derive(Debug)]
pub struct DialectRules {
    /// Characters opening (and closing) a quoted identifier.
    pub identifier_quotes: &'static [char],
    /// Characters opening (and closing) a string literal.
    pub string_quotes: &'static [char],
    /// `\` escapes the next character inside strings.
    pub backslash_escapes: bool,
    /// `#` starts a line comment.
    pub hash_comments: bool,
    /// `[name]` is a quoted identifier.
    pub bracket_identifiers: bool,
    /// Keywords on top of the ANSI list.
    pub extra_keywords: &'static [&'static str],
}

impl SqlDialect {
    pub const ALL: [Self; 11] = [
        SqlDialect::Ansi,
        SqlDialect::Hive,
        SqlDialect::SparkSql,
        SqlDialect::Presto,
        SqlDialect::Trino,
        SqlDialect::MySql,
        SqlDialect::PostgreSql,
        SqlDialect::Sqlite,
        SqlDialect::BigQuery,
        SqlDialect::Snowflake,
        SqlDialect::MsSql,
    ];

    /// Resolve an editor language name, falling back to ANSI for anything unknown.
    pub fn from_language(language: &str) -> Self {
        language.parse().unwrap_or_else(|_| {
            trace!("Unknown SQL language {language:?}, using ansi rules");
            SqlDialect::Ansi
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            SqlDialect::Ansi => "ansi",
            SqlDialect::Hive => "hive",
            SqlDialect::SparkSql => "sparksql",
            SqlDialect::Presto => "presto",
            SqlDialect::Trino => "trino",
            SqlDialect::MySql => "mysql",
            SqlDialect::PostgreSql => "postgresql",
            SqlDialect::Sqlite => "sqlite",
            SqlDialect::BigQuery => "bigquery",
            SqlDialect::Snowflake => "snowflake",
            SqlDialect::MsSql => "mssql",
        }
    }

    pub fn rules(self) -> &'static DialectRules {
        match self {
            SqlDialect::Ansi => &ANSI_RULES,
            SqlDialect::Hive => &HIVE_RULES,
            SqlDialect::SparkSql => &SPARK_RULES,
            SqlDialect::Presto | SqlDialect::Trino => &PRESTO_RULES,
            SqlDialect::MySql => &MYSQL_RULES,
            SqlDialect::PostgreSql => &POSTGRES_RULES,
            SqlDialect::Sqlite => &SQLITE_RULES,
            SqlDialect::BigQuery => &BIGQUERY_RULES,
            SqlDialect::Snowflake => &SNOWFLAKE_RULES,
            SqlDialect::MsSql => &MSSQL_RULES,
        }
    }

    /// Parser dialect used for syntax checking.
    pub fn parser_dialect(self) -> Box<dyn sqlparser::dialect::Dialect> {
        match self {
            SqlDialect::Hive | SqlDialect::SparkSql => Box::new(HiveDialect {}),
            SqlDialect::MySql => Box::new(MySqlDialect {}),
            SqlDialect::PostgreSql => Box::new(PostgreSqlDialect {}),
            SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
            SqlDialect::BigQuery => Box::new(BigQueryDialect {}),
            SqlDialect::Snowflake => Box::new(SnowflakeDialect {}),
            SqlDialect::MsSql => Box::new(MsSqlDialect {}),
            SqlDialect::Ansi | SqlDialect::Presto | SqlDialect::Trino => Box::new(GenericDialect {}),
        }
    }

    /// True if the *lower-cased* word is a keyword in this dialect.
    pub fn is_keyword(self, lower: &str) -> bool {
        KEYWORD_SETS
            .get(&self)
            .is_some_and(|set| set.contains(lower))
    }

    /// All keywords of this dialect, ANSI words first in their declared order.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        ANSI_KEYWORDS
            .iter()
            .chain(self.rules().extra_keywords.iter())
            .copied()
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ansi" | "sql" | "generic" => Ok(SqlDialect::Ansi),
            "hive" => Ok(SqlDialect::Hive),
            "sparksql" | "spark" => Ok(SqlDialect::SparkSql),
            "presto" => Ok(SqlDialect::Presto),
            "trino" => Ok(SqlDialect::Trino),
            "mysql" => Ok(SqlDialect::MySql),
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSql),
            "sqlite" => Ok(SqlDialect::Sqlite),
            "bigquery" => Ok(SqlDialect::BigQuery),
            "snowflake" => Ok(SqlDialect::Snowflake),
            "mssql" | "sqlserver" | "tsql" => Ok(SqlDialect::MsSql),
            _ => Err(format!("Unknown dialect: '{s}'")),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

static KEYWORD_SETS: LazyLock<HashMap<SqlDialect, HashSet<&'static str>>> = LazyLock::new(|| {
    SqlDialect::ALL
        .into_iter()
        .map(|dialect| (dialect, dialect.keywords().collect()))
        .collect()
});

/// Lower-cased ANSI keywords. Clause-leading words come first since the
/// autocompleter keeps this order for keyword suggestions.
pub const ANSI_KEYWORDS: &[&str] = &[
    "select", "from", "where", "join", "on", "group", "by", "order", "having", "limit",
    "as", "and", "or", "not", "in", "is", "null", "like", "between", "exists", "distinct",
    "case", "when", "then", "else", "end", "asc", "desc", "left", "right", "inner", "outer",
    "full", "cross", "natural", "using", "union", "intersect", "except", "all", "with",
    "recursive", "insert", "into", "overwrite", "values", "update", "set", "delete", "create",
    "replace", "drop", "alter", "table", "view", "if", "temporary", "temp", "external", "use",
    "offset", "lateral", "show", "describe", "explain", "database", "schema", "index",
    "primary", "key", "foreign", "references", "unique", "default", "check", "constraint",
    "truncate", "grant", "revoke", "cast", "true", "false", "over", "partition", "window",
    "rows", "range", "unbounded", "preceding", "following", "current", "row", "fetch",
    "first", "last", "next", "only", "nulls", "any", "some", "escape", "interval", "date",
    "time", "timestamp", "add", "column", "rename", "to", "for", "collate", "filter", "within",
];

static ANSI_RULES: DialectRules = DialectRules {
    identifier_quotes: &['"'],
    string_quotes: &['\''],
    backslash_escapes: false,
    hash_comments: false,
    bracket_identifiers: false,
    extra_keywords: &[],
};

static HIVE_RULES: DialectRules = DialectRules {
    identifier_quotes: &['`'],
    string_quotes: &['\'', '"'],
    backslash_escapes: true,
    hash_comments: false,
    bracket_identifiers: false,
    extra_keywords: &[
        "partitioned", "stored", "location", "tblproperties", "cluster", "clustered",
        "distribute", "sort", "sorted", "format", "serde", "serdeproperties", "msck", "repair",
        "directory", "local", "buckets", "skewed", "function", "macro", "load", "data",
        "inpath", "textfile", "orc", "parquet", "sequencefile", "rlike", "regexp", "semi",
        "anti", "map", "array", "struct", "string", "int", "bigint", "double", "boolean",
    ],
};

static SPARK_RULES: DialectRules = DialectRules {
    identifier_quotes: &['`'],
    string_quotes: &['\'', '"'],
    backslash_escapes: true,
    hash_comments: false,
    bracket_identifiers: false,
    extra_keywords: &[
        "partitioned", "stored", "location", "tblproperties", "cluster", "clustered",
        "distribute", "sort", "sorted", "format", "options", "cache", "uncache", "refresh",
        "function", "rlike", "regexp", "semi", "anti", "pivot", "unpivot", "map", "array",
        "struct", "string", "int", "bigint", "double", "boolean",
    ],
};

static PRESTO_RULES: DialectRules = DialectRules {
    identifier_quotes: &['"'],
    string_quotes: &['\''],
    backslash_escapes: false,
    hash_comments: false,
    bracket_identifiers: false,
    extra_keywords: &[
        "unnest", "ordinality", "tablesample", "bernoulli", "system", "array", "map", "try",
        "try_cast", "approx_distinct", "varchar", "bigint", "double", "boolean", "zone", "at",
        "catalogs", "schemas", "tables", "columns", "session",
    ],
};

static MYSQL_RULES: DialectRules = DialectRules {
    identifier_quotes: &['`'],
    string_quotes: &['\'', '"'],
    backslash_escapes: true,
    hash_comments: true,
    bracket_identifiers: false,
    extra_keywords: &[
        "engine", "auto_increment", "ignore", "duplicate", "straight_join", "regexp", "rlike",
        "unsigned", "charset", "character", "varchar", "int", "bigint", "tinyint", "datetime",
        "high_priority", "low_priority", "delayed", "sql_calc_found_rows",
    ],
};

static POSTGRES_RULES: DialectRules = DialectRules {
    identifier_quotes: &['"'],
    string_quotes: &['\''],
    backslash_escapes: false,
    hash_comments: false,
    bracket_identifiers: false,
    extra_keywords: &[
        "returning", "ilike", "similar", "serial", "bigserial", "conflict", "do", "nothing",
        "materialized", "concurrently", "only", "tablespace", "jsonb", "text", "uuid",
        "varchar", "integer", "bigint", "boolean", "array", "analyze", "vacuum",
    ],
};

static SQLITE_RULES: DialectRules = DialectRules {
    identifier_quotes: &['"', '`'],
    string_quotes: &['\''],
    backslash_escapes: false,
    hash_comments: false,
    bracket_identifiers: true,
    extra_keywords: &[
        "pragma", "autoincrement", "vacuum", "attach", "detach", "glob", "regexp", "abort",
        "fail", "rowid", "without", "integer", "text", "real", "blob",
    ],
};

static BIGQUERY_RULES: DialectRules = DialectRules {
    identifier_quotes: &['`'],
    string_quotes: &['\'', '"'],
    backslash_escapes: true,
    hash_comments: true,
    bracket_identifiers: false,
    extra_keywords: &[
        "struct", "array", "unnest", "qualify", "options", "cluster", "safe_cast", "int64",
        "float64", "string", "bytes", "bool", "numeric", "datetime", "geography", "declare",
    ],
};

static SNOWFLAKE_RULES: DialectRules = DialectRules {
    identifier_quotes: &['"'],
    string_quotes: &['\''],
    backslash_escapes: true,
    hash_comments: false,
    bracket_identifiers: false,
    extra_keywords: &[
        "qualify", "variant", "flatten", "warehouse", "stage", "copy", "clone", "pivot",
        "unpivot", "sample", "object", "array", "number", "varchar", "boolean",
    ],
};

static MSSQL_RULES: DialectRules = DialectRules {
    identifier_quotes: &['"'],
    string_quotes: &['\''],
    backslash_escapes: false,
    hash_comments: false,
    bracket_identifiers: true,
    extra_keywords: &[
        "top", "nolock", "go", "identity", "nvarchar", "output", "apply", "merge", "exec",
        "declare", "begin", "commit", "rollback", "tran", "transaction", "int", "bit",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hive", SqlDialect::Hive)]
    #[case("Presto", SqlDialect::Presto)]
    #[case("postgres", SqlDialect::PostgreSql)]
    #[case("sparksql", SqlDialect::SparkSql)]
    #[case("druid", SqlDialect::Ansi)]
    #[case("", SqlDialect::Ansi)]
    fn resolves_language_names(#[case] language: &str, #[case] expected: SqlDialect) {
        assert_eq!(SqlDialect::from_language(language), expected);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert!("druid".parse::<SqlDialect>().is_err());
        assert_eq!("mysql".parse::<SqlDialect>(), Ok(SqlDialect::MySql));
    }

    #[test]
    fn structural_keywords_are_keywords_everywhere() {
        for dialect in SqlDialect::ALL {
            for kw in Keyword::ALL {
                assert!(
                    dialect.is_keyword(kw.as_str()),
                    "{kw} must be a keyword in {dialect}"
                );
            }
        }
    }

    #[test]
    fn dialect_specific_keywords() {
        assert!(SqlDialect::Hive.is_keyword("tblproperties"));
        assert!(!SqlDialect::Presto.is_keyword("tblproperties"));
        assert!(SqlDialect::Presto.is_keyword("unnest"));
        assert!(!SqlDialect::Ansi.is_keyword("users"));
    }

    #[test]
    fn quoting_rules_differ() {
        assert_eq!(SqlDialect::Hive.rules().identifier_quotes, &['`']);
        assert!(SqlDialect::Hive.rules().string_quotes.contains(&'"'));
        assert_eq!(SqlDialect::Presto.rules().identifier_quotes, &['"']);
        assert!(SqlDialect::MySql.rules().hash_comments);
        assert!(SqlDialect::MsSql.rules().bracket_identifiers);
    }
}
