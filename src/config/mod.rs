use crate::error::{Result, RotologError};
use crate::logger::Level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Logger configuration, fixed at construction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Directory holding the active log file and its backups
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Base name of the active log file
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Maximum size of the active file in megabytes before it is rotated
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Number of rotated files to retain (0 keeps all)
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Days to retain rotated files (0 disables age limits)
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,

    /// Whether rotated files are gzip-compressed
    #[serde(default = "default_compress")]
    pub compress: bool,

    /// Minimum emitted level: debug, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Use local time for record timestamps and backup names (UTC otherwise)
    #[serde(default = "default_local_time")]
    pub local_time: bool,

    /// Attach a backtrace to error and fatal records
    #[serde(default = "default_stacktrace")]
    pub stacktrace: bool,

    /// Mirror every line to stderr
    #[serde(default)]
    pub console: bool,
}

// Default value functions for serde
fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_file() -> String {
    "myapp.log".to_string()
}

fn default_max_size_mb() -> u64 {
    100
}

fn default_max_backups() -> usize {
    7
}

fn default_max_age_days() -> u64 {
    7
}

fn default_compress() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_time() -> bool {
    true
}

fn default_stacktrace() -> bool {
    true
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_file: default_log_file(),
            max_size_mb: default_max_size_mb(),
            max_backups: default_max_backups(),
            max_age_days: default_max_age_days(),
            compress: default_compress(),
            log_level: default_log_level(),
            local_time: default_local_time(),
            stacktrace: default_stacktrace(),
            console: false,
        }
    }
}

impl LoggerConfig {
    /// Load a logger configuration from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<LoggerConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RotologError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut config = match extension {
            "toml" => Self::parse_toml(&contents)?,
            "json" => Self::parse_json(&contents)?,
            _ => {
                return Err(RotologError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        config.expand_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Parse TOML configuration. A `[logger]` table is accepted as well as top-level keys.
    fn parse_toml(contents: &str) -> Result<LoggerConfig> {
        #[derive(Deserialize)]
        struct ConfigFile {
            logger: Option<LoggerConfig>,
            #[serde(flatten)]
            top_level: LoggerConfig,
        }

        let config_file: ConfigFile = toml::from_str(contents)
            .map_err(|e| RotologError::InvalidConfig(format!("Failed to parse TOML: {}", e)))?;

        Ok(config_file.logger.unwrap_or(config_file.top_level))
    }

    /// Parse JSON configuration
    fn parse_json(contents: &str) -> Result<LoggerConfig> {
        serde_json::from_str(contents)
            .map_err(|e| RotologError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(RotologError::ConfigValidationError(
                "log_dir must not be empty".to_string(),
            ));
        }

        if self.log_file.is_empty() {
            return Err(RotologError::ConfigValidationError(
                "log_file must not be empty".to_string(),
            ));
        }

        if self.log_file.contains('/') || self.log_file.contains('\\') {
            return Err(RotologError::ConfigValidationError(format!(
                "log_file must be a bare file name, got: {}",
                self.log_file
            )));
        }

        Ok(())
    }

    /// Expand environment variables in path fields
    fn expand_env_vars(&mut self) {
        self.log_dir = PathBuf::from(Self::expand_env_in_string(&self.log_dir.to_string_lossy()));
        self.log_file = Self::expand_env_in_string(&self.log_file);
    }

    /// Expand `$VAR` and `${VAR}` references in a string
    fn expand_env_in_string(s: &str) -> String {
        let mut result = s.to_string();

        // Longest names first so `$LOG` does not eat the prefix of `$LOG_DIR`
        let mut vars: Vec<(String, String)> = std::env::vars().collect();
        vars.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        for (key, value) in vars {
            result = result.replace(&format!("${{{}}}", key), &value);
            result = result.replace(&format!("${}", key), &value);
        }

        result
    }

    /// Resolved minimum level. Unrecognized strings fall back to info.
    pub fn level(&self) -> Level {
        Level::from_config_str(&self.log_level)
    }

    /// Full path of the active log file
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }

    /// Maximum active file size in bytes
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    /// Retention age as a Duration
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days.saturating_mul(24 * 60 * 60))
    }
}
