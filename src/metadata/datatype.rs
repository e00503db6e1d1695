use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Column type as reported by a metastore, normalised across engines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[display("boolean")]
    Boolean,
    #[display("tinyint")]
    TinyInt,
    #[display("smallint")]
    SmallInt,
    #[display("integer")]
    Integer,
    #[display("bigint")]
    BigInt,
    #[display("float")]
    Float,
    #[display("double")]
    Double,
    #[display("decimal({_0},{_1})")]
    Decimal(u32, u32),
    #[display("char{}", length(_0))]
    Char(Option<u32>),
    #[display("varchar{}", length(_0))]
    VarChar(Option<u32>),
    #[display("string")]
    String,
    #[display("date")]
    Date,
    #[display("time")]
    Time,
    #[display("timestamp")]
    Timestamp,
    #[display("timestamptz")]
    Timestamptz,
    #[display("binary")]
    Binary,
    #[display("json")]
    Json,
    #[display("uuid")]
    Uuid,
    #[display("array<{_0}>")]
    Array(Box<DataType>),
    #[display("map<{_0},{_1}>")]
    Map(Box<DataType>, Box<DataType>),
    /// Anything not recognised, kept verbatim.
    #[display("{_0}")]
    Other(std::string::String),
}

fn length(len: &Option<u32>) -> std::string::String {
    len.map(|n| format!("({n})")).unwrap_or_default()
}

impl DataType {
    /// Lenient parse of an engine type name (`VARCHAR(255)`, `array<string>`,
    /// `timestamp with time zone` ...). Never fails: unknown names become `Other`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();

        if let Some(inner) = generic_args(&lower, "array") {
            return DataType::Array(Box::new(DataType::parse(inner)));
        }
        if let Some(inner) = generic_args(&lower, "map") {
            if let Some((key, value)) = split_top_level(inner) {
                return DataType::Map(
                    Box::new(DataType::parse(key)),
                    Box::new(DataType::parse(value)),
                );
            }
        }

        let (base, args) = match lower.split_once('(') {
            Some((base, rest)) => (base.trim(), rest.trim_end_matches(')')),
            None => (lower.as_str(), ""),
        };
        let numbers: Vec<u32> = args
            .split(',')
            .filter_map(|n| n.trim().parse().ok())
            .collect();

        match base {
            "boolean" | "bool" => DataType::Boolean,
            "tinyint" | "int1" => DataType::TinyInt,
            "smallint" | "int2" => DataType::SmallInt,
            "int" | "integer" | "int4" | "serial" => DataType::Integer,
            "bigint" | "int8" | "long" | "bigserial" | "int64" => DataType::BigInt,
            "float" | "real" | "float4" => DataType::Float,
            "double" | "double precision" | "float8" | "float64" => DataType::Double,
            "decimal" | "numeric" | "number" => DataType::Decimal(
                numbers.first().copied().unwrap_or(38),
                numbers.get(1).copied().unwrap_or(0),
            ),
            "char" | "character" | "bpchar" => DataType::Char(numbers.first().copied()),
            "varchar" | "character varying" | "nvarchar" => {
                DataType::VarChar(numbers.first().copied())
            }
            "string" | "text" => DataType::String,
            "date" => DataType::Date,
            "time" | "time without time zone" => DataType::Time,
            "timestamp" | "timestamp without time zone" | "datetime" => DataType::Timestamp,
            "timestamptz" | "timestamp with time zone" => DataType::Timestamptz,
            "binary" | "varbinary" | "bytea" | "blob" | "bytes" => DataType::Binary,
            "json" | "jsonb" => DataType::Json,
            "uuid" => DataType::Uuid,
            _ => DataType::Other(trimmed.to_string()),
        }
    }
}

impl From<&str> for DataType {
    fn from(value: &str) -> Self {
        DataType::parse(value)
    }
}

/// `name<args>` → `args`.
fn generic_args<'a>(lower: &'a str, name: &str) -> Option<&'a str> {
    lower
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}

fn split_top_level(args: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((&args[..i], &args[i + 1..])),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BIGINT", DataType::BigInt)]
    #[case("int4", DataType::Integer)]
    #[case("character varying(255)", DataType::VarChar(Some(255)))]
    #[case("varchar", DataType::VarChar(None))]
    #[case("numeric(10, 2)", DataType::Decimal(10, 2))]
    #[case("timestamp with time zone", DataType::Timestamptz)]
    #[case("array<string>", DataType::Array(Box::new(DataType::String)))]
    #[case(
        "map<string,array<int>>",
        DataType::Map(
            Box::new(DataType::String),
            Box::new(DataType::Array(Box::new(DataType::Integer)))
        )
    )]
    #[case("geometry", DataType::Other("geometry".into()))]
    fn parses_engine_names(#[case] raw: &str, #[case] expected: DataType) {
        assert_eq!(DataType::parse(raw), expected);
    }

    #[test]
    fn display() {
        assert_eq!(DataType::VarChar(Some(10)).to_string(), "varchar(10)");
        assert_eq!(DataType::VarChar(None).to_string(), "varchar");
        assert_eq!(DataType::Decimal(10, 2).to_string(), "decimal(10,2)");
        assert_eq!(
            DataType::Map(Box::new(DataType::String), Box::new(DataType::BigInt)).to_string(),
            "map<string,bigint>"
        );
        assert_eq!(DataType::Other("Geometry".into()).to_string(), "Geometry");
    }
}
