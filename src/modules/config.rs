use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::auth::password::PasswordHasher;
use crate::{CONFIG_FILE, DEFAULT_DATA_DIR, DEFAULT_HASH_ITERATIONS, LOG_FILE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application settings.
///
/// Resolved from, highest precedence first: command-line flags (and their
/// environment variables), a JSON config file, then built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the users, patients, doctors and counters slots
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/application.log`
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    /// PBKDF2 rounds for newly registered accounts
    pub hash_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_file: None,
            log_level: "info".to_string(),
            hash_iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl AppConfig {
    /// Load configuration from a JSON file that must exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like `load`, but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge defaults, the config file and command-line overrides
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match &overrides.config_file {
            Some(path) => Self::load(path)?,
            None => {
                let data_dir = overrides
                    .data_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
                Self::load_or_default(&data_dir.join(CONFIG_FILE))?
            }
        };

        if let Some(data_dir) = overrides.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(log_file) = overrides.log_file {
            config.log_file = Some(log_file);
        }
        if overrides.verbose {
            config.log_level = "debug".to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hash_iterations == 0 {
            return Err(ConfigError::Invalid(
                "hash_iterations must be at least 1".to_string(),
            ));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".to_string()));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(LOG_FILE))
    }

    pub fn hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.hash_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.log_path(), PathBuf::from("data").join("application.log"));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
        assert_eq!(config.hasher().iterations(), DEFAULT_HASH_ITERATIONS);
    }

    #[test]
    fn test_config_file_in_data_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "log_level": "warn", "hash_iterations": 5000 }"#,
        )
        .unwrap();

        let config = AppConfig::resolve(ConfigOverrides {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Warn);
        assert_eq!(config.hash_iterations, 5000);
    }

    #[test]
    fn test_overrides_win() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(
            &config_path,
            r#"{ "data_dir": "from-file", "log_level": "error" }"#,
        )
        .unwrap();

        let config = AppConfig::resolve(ConfigOverrides {
            data_dir: Some(dir.path().join("from-cli")),
            config_file: Some(config_path),
            log_file: Some(dir.path().join("app.log")),
            verbose: true,
        })
        .unwrap();

        assert_eq!(config.data_dir, dir.path().join("from-cli"));
        assert_eq!(config.log_path(), dir.path().join("app.log"));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::resolve(ConfigOverrides {
            config_file: Some(dir.path().join("missing.json")),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = AppConfig::default();
        config.hash_iterations = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.log_level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
