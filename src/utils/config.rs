use serde::Deserialize;
use config::{
    builder::{ConfigBuilder, DefaultState},
    Config as ConfigLib, ConfigError, Environment, File,
};
use crate::core::matching::matcher::DEFAULT_MATCH_THRESHOLD;
use crate::utils::error::{Result, BiometricError};

pub const DEFAULT_STORAGE_PATH: &str = "data/identities";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub matcher: MatcherConfig,
    pub enrollment: EnrollmentConfig,
    pub history: HistoryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    pub threshold: f64,
    pub verify_integrity: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentConfig {
    pub default_samples: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub default_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig {
                threshold: DEFAULT_MATCH_THRESHOLD,
                verify_integrity: true,
            },
            enrollment: EnrollmentConfig { default_samples: 3 },
            history: HistoryConfig { default_limit: 10 },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
            },
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        let config = Self::defaults()?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Override with environment variables (e.g., BIOAUTH_MATCHER__THRESHOLD)
            .add_source(
                Environment::with_prefix("BIOAUTH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )

            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Deployment defaults. Unlike `Config::default()`, which keeps identities
    /// in memory, a deployed binary persists them to RocksDB.
    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(ConfigLib::builder()
            .set_default("matcher.threshold", DEFAULT_MATCH_THRESHOLD)?
            .set_default("matcher.verify_integrity", true)?
            .set_default("enrollment.default_samples", 3)?
            .set_default("history.default_limit", 10)?
            .set_default("storage.backend", "rocksdb")?
            .set_default("storage.path", DEFAULT_STORAGE_PATH)?
            .set_default("logging.level", "info")?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.matcher.threshold > 0.0 && self.matcher.threshold <= 1.0) {
            return Err(BiometricError::Config("matcher.threshold must be in (0, 1]".into()));
        }

        if self.enrollment.default_samples == 0 {
            return Err(BiometricError::Config("enrollment.default_samples must be greater than 0".into()));
        }

        if self.history.default_limit == 0 {
            return Err(BiometricError::Config("history.default_limit must be greater than 0".into()));
        }

        if self.storage.backend == StorageBackend::Rocksdb
            && self.storage.path.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(BiometricError::Config("storage.path must be set for the rocksdb backend".into()));
        }

        Ok(())
    }
}

impl From<ConfigError> for BiometricError {
    fn from(error: ConfigError) -> Self {
        BiometricError::Config(error.to_string())
    }
}
