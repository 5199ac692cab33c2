//! CoreSight configuration, loadable from TOML.

use std::path::Path;

use serde::Deserialize;

use cs_log_tools::IngestConfig;
use cs_search::EngineConfig;
use cs_store::DEFAULT_RESULT_LIMIT;

/// Config file read when `--config` is not given. Missing means defaults.
pub const DEFAULT_CONFIG_PATH: &str = "coresight.toml";

/// Database path that selects the in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Top-level configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreSightConfig {
    /// SQLite database path, or `:memory:`.
    pub database: String,
    /// Records per store commit during ingest.
    pub batch_size: usize,
    /// Most records a search reads from the store.
    pub result_limit: usize,
    /// Year given to syslog timestamps that carry none. Defaults to the
    /// current UTC year.
    pub assumed_year: Option<i32>,
    /// When false, lines no structured format recognizes count as errors.
    pub generic_fallback: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_json: bool,
}

impl Default for CoreSightConfig {
    fn default() -> Self {
        let ingest = IngestConfig::default();
        Self {
            database: "coresight.db".to_string(),
            batch_size: ingest.batch_size,
            result_limit: DEFAULT_RESULT_LIMIT,
            assumed_year: ingest.assumed_year,
            generic_fallback: ingest.generic_fallback,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl CoreSightConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// An explicit path must exist; otherwise [`DEFAULT_CONFIG_PATH`] is
    /// used when present and defaults when not.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            batch_size: self.batch_size,
            assumed_year: self.assumed_year,
            generic_fallback: self.generic_fallback,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            result_limit: self.result_limit,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database == IN_MEMORY
    }
}
