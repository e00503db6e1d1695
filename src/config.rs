use crate::*;
use confique::Config as _;
use std::time::Duration;

#[derive(Debug, confique::Config)]
pub struct Config {
    /// Dialect used when a caller does not name one.
    #[config(env = "SQLBOOK_LANGUAGE", default = "presto")]
    pub language: String,
    /// Schema assumed for unqualified table references during schema checks.
    #[config(env = "SQLBOOK_DEFAULT_SCHEMA", default = "default")]
    pub default_schema: String,
    #[config(env = "SQLBOOK_MAX_SUGGESTIONS", default = 10)]
    pub max_suggestions: usize,
    #[config(env = "SQLBOOK_REQUEST_TIMEOUT_MS", default = 5000)]
    pub request_timeout_ms: u64,
    /// Upper bound on analysis requests awaiting a worker response.
    #[config(env = "SQLBOOK_MAX_PENDING_REQUESTS", default = 64)]
    pub max_pending_requests: usize,
    #[config(env = "SQLBOOK_SCHEMA_CACHE_CAPACITY", default = 1024)]
    pub schema_cache_capacity: u64,
    #[config(env = "SQLBOOK_SCHEMA_CACHE_TTL_SECS", default = 300)]
    pub schema_cache_ttl_secs: u64,
    /// Run the dialect parser over each statement as part of linting.
    #[config(env = "SQLBOOK_SYNTAX_CHECK", default = true)]
    pub syntax_check: bool,
    #[cfg(test)]
    #[config(env = "SQLBOOK_CONTAINER_RAMDISKED", default = true)]
    pub container_ramdisked: bool,
    #[cfg(test)]
    #[config(env = "SQLBOOK_CONTAINER_LOGS", default = false)]
    pub container_logs: bool,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn load() -> Result<Self> {
        Ok(Config::builder().env().load()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn schema_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.schema_cache_ttl_secs)
    }
}

#[cfg(test)]
pub fn config() -> &'static Config {
    use std::sync::OnceLock;
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(|| {
        Config::load()
            .expect("Failed to load one or more value configuration from the current environment")
    })
}
