//! Configuration management for the dreamlog application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DREAMLOG_DIR`: Path to the data directory (defaults to ~/.local/share/dreamlog)
//! - `DREAMLOG_BRIDGE`: Optional SQLite database used as the primary storage bridge
//! - `DREAMLOG_LOG_FORMAT`: `text` or `json` (defaults to `text`)
//! - `DREAMLOG_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset (defaults to `info`)
//! - `HOME`: Used for expanding the default data directory path

use crate::constants::{
    DEFAULT_DATA_SUBDIR, DEFAULT_LOG_LEVEL, ENV_VAR_DREAMLOG_BRIDGE, ENV_VAR_DREAMLOG_DIR,
    ENV_VAR_DREAMLOG_LOG_FORMAT, ENV_VAR_DREAMLOG_LOG_LEVEL, ENV_VAR_HOME, LOG_FORMAT_JSON,
    LOG_FORMAT_TEXT, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for the dreamlog application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use dreamlog::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/path/to/data"),
///     bridge_db: None,
///     log_format: "text".to_string(),
///     log_level: "info".to_string(),
/// };
/// assert!(config.validate().is_ok());
/// ```
pub struct Config {
    /// Directory holding the built-in file store, one file per storage key.
    pub data_dir: PathBuf,

    /// SQLite database used as the primary storage bridge, when configured.
    pub bridge_db: Option<PathBuf>,

    /// Log output format, `text` or `json`.
    pub log_format: String,

    /// Default log filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &REDACTED_PLACEHOLDER)
            .field(
                "bridge_db",
                &self.bridge_db.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(""),
            bridge_db: None,
            log_format: LOG_FORMAT_TEXT.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Expands `~` and environment variable references in a path setting.
    fn expand_path(raw: &str) -> AppResult<PathBuf> {
        let expanded = shellexpand::full(raw)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - A path expansion fails
    /// - The data directory path is empty
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dreamlog::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Data lives in {}", config.data_dir.display()),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_DREAMLOG_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });
        let data_dir = Self::expand_path(&data_dir_str)?;

        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        let bridge_db = match env::var(ENV_VAR_DREAMLOG_BRIDGE) {
            Ok(raw) if !raw.trim().is_empty() => Some(Self::expand_path(raw.trim())?),
            _ => None,
        };

        let log_format = env::var(ENV_VAR_DREAMLOG_LOG_FORMAT)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|_| LOG_FORMAT_TEXT.to_string());

        let log_level = env::var(ENV_VAR_DREAMLOG_LOG_LEVEL)
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Config {
            data_dir,
            bridge_db,
            log_format,
            log_level,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Data directory path is empty"
    /// - "Data directory must be an absolute path"
    /// - "Bridge database must be an absolute path"
    /// - "Unsupported log format"
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        if let Some(bridge) = &self.bridge_db {
            if !bridge.is_absolute() {
                return Err(AppError::Config(
                    "Bridge database must be an absolute path".to_string(),
                ));
            }
        }

        if self.log_format != LOG_FORMAT_TEXT && self.log_format != LOG_FORMAT_JSON {
            return Err(AppError::Config(format!(
                "Unsupported log format '{}': expected '{}' or '{}'",
                self.log_format, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            )));
        }

        Ok(())
    }

    /// Whether logs should be emitted as JSON lines.
    pub fn json_logs(&self) -> bool {
        self.log_format == LOG_FORMAT_JSON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn setup() {
        env::remove_var(ENV_VAR_DREAMLOG_DIR);
        env::remove_var(ENV_VAR_DREAMLOG_BRIDGE);
        env::remove_var(ENV_VAR_DREAMLOG_LOG_FORMAT);
        env::remove_var(ENV_VAR_DREAMLOG_LOG_LEVEL);
    }

    #[test]
    fn test_debug_impl_redacts_paths() {
        let config = Config {
            data_dir: PathBuf::from("/home/username/private/dreams"),
            bridge_db: Some(PathBuf::from("/home/username/private/bridge.db")),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains(REDACTED_PLACEHOLDER));
        assert!(!debug_output.contains("/home/username/private/dreams"));
        assert!(!debug_output.contains("bridge.db"));
    }

    #[test]
    #[serial]
    fn test_load_defaults_to_home_subdir() {
        setup();
        let orig_home = env::var(ENV_VAR_HOME).ok();
        env::set_var(ENV_VAR_HOME, "/tmp/dreamlog-home");

        let config = Config::load().unwrap();

        match orig_home {
            Some(val) => env::set_var(ENV_VAR_HOME, val),
            None => env::remove_var(ENV_VAR_HOME),
        }

        assert_eq!(
            config.data_dir,
            PathBuf::from("/tmp/dreamlog-home/.local/share/dreamlog")
        );
        assert!(config.bridge_db.is_none());
        assert_eq!(config.log_format, LOG_FORMAT_TEXT);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    #[serial]
    fn test_load_with_custom_dir_and_bridge() {
        setup();
        let temp_dir = tempdir().unwrap();
        let dir_path = temp_dir.path().to_string_lossy().to_string();
        let bridge_path = temp_dir.path().join("bridge.db");

        env::set_var(ENV_VAR_DREAMLOG_DIR, &dir_path);
        env::set_var(ENV_VAR_DREAMLOG_BRIDGE, bridge_path.to_string_lossy().as_ref());
        env::set_var(ENV_VAR_DREAMLOG_LOG_FORMAT, "JSON");
        let config = Config::load().unwrap();
        setup();

        assert_eq!(config.data_dir, PathBuf::from(dir_path));
        assert_eq!(config.bridge_db, Some(bridge_path));
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_blank_bridge_is_ignored() {
        setup();
        env::set_var(ENV_VAR_DREAMLOG_DIR, "/tmp/dreamlog");
        env::set_var(ENV_VAR_DREAMLOG_BRIDGE, "   ");
        let config = Config::load().unwrap();
        setup();

        assert!(config.bridge_db.is_none());
    }

    #[test]
    fn test_validate_relative_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("relative/path"),
            ..Config::default()
        };

        match config.validate() {
            Err(AppError::Config(message)) => {
                assert!(message.contains("must be an absolute path"));
            }
            _ => panic!("Expected Config error about relative path"),
        }
    }

    #[test]
    fn test_validate_empty_data_dir() {
        let config = Config::default();

        match config.validate() {
            Err(AppError::Config(message)) => {
                assert!(message.contains("Data directory path is empty"));
            }
            _ => panic!("Expected Config error about empty data directory"),
        }
    }

    #[test]
    fn test_validate_unknown_log_format() {
        let config = Config {
            data_dir: PathBuf::from("/data"),
            log_format: "xml".to_string(),
            ..Config::default()
        };

        match config.validate() {
            Err(AppError::Config(message)) => assert!(message.contains("xml")),
            _ => panic!("Expected Config error about log format"),
        }
    }
}
