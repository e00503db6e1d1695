use crate::sql::TokenKind;
use sqlparser::parser::ParserError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(ParserError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Unterminated {kind} starting at offset {offset}")]
    Unterminated { kind: TokenKind, offset: usize },

    #[error("Analysis worker is not running")]
    WorkerNotRunning,

    #[error("Analysis request {0} timed out")]
    Timeout(String),

    #[error("Analysis request {0} was cancelled")]
    Cancelled(String),

    #[error("Metastore error: {0}")]
    Metastore(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

impl From<ParserError> for Error {
    fn from(value: ParserError) -> Self {
        Error::InvalidQuery(value)
    }
}

impl From<confique::Error> for Error {
    fn from(value: confique::Error) -> Self {
        Error::Config(value.to_string())
    }
}
