//! Configuration management for catlog
//!
//! A [`LoggingConfig`] describes levels, disabled categories and the
//! destinations of a [`LoggingService`]. It is usually read from
//! `~/.catlog/config.toml`:
//!
//! ```toml
//! minimum_level = "info"
//! disabled = ["ui"]
//!
//! [levels]
//! net = "debug"
//!
//! [console]
//! enabled = true
//!
//! [file]
//! directory = "~/.catlog/logs"
//! max_file_count = 10
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::destination::{ConsoleDestination, FileDestination};
use crate::error::{Error, Result};
use crate::format::DefaultFormatter;
use crate::level::Level;
use crate::rotation::{
    RotationConfig, DEFAULT_DISK_QUOTA_BYTES, DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_ROLLING_FREQUENCY,
};
use crate::service::LoggingService;

/// Console destination settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub include_timestamp: bool,
    #[serde(default = "default_true")]
    pub include_category: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_timestamp: false,
            include_category: true,
        }
    }
}

/// File destination settings
///
/// A limit of `0` disables that limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    /// Directory holding the log files (`~` is expanded)
    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_rolling_frequency_secs")]
    pub rolling_frequency_secs: u64,

    #[serde(default = "default_max_file_count")]
    pub max_file_count: usize,

    #[serde(default = "default_disk_quota_bytes")]
    pub disk_quota_bytes: u64,

    /// Start a new file on every launch instead of continuing the newest one
    #[serde(default)]
    pub always_create_new: bool,

    #[serde(default = "default_true")]
    pub include_timestamp: bool,

    #[serde(default = "default_true")]
    pub include_category: bool,
}

fn default_true() -> bool {
    true
}

fn default_directory() -> String {
    default_logs_dir().to_string_lossy().into_owned()
}

fn default_prefix() -> String {
    crate::destination::DEFAULT_PREFIX.to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_rolling_frequency_secs() -> u64 {
    DEFAULT_ROLLING_FREQUENCY.as_secs()
}

fn default_max_file_count() -> usize {
    DEFAULT_MAX_FILE_COUNT
}

fn default_disk_quota_bytes() -> u64 {
    DEFAULT_DISK_QUOTA_BYTES
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            prefix: default_prefix(),
            max_file_size: default_max_file_size(),
            rolling_frequency_secs: default_rolling_frequency_secs(),
            max_file_count: default_max_file_count(),
            disk_quota_bytes: default_disk_quota_bytes(),
            always_create_new: false,
            include_timestamp: true,
            include_category: true,
        }
    }
}

impl FileConfig {
    /// Logs directory with `~` expanded
    pub fn directory(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.directory).into_owned())
    }

    /// Resolved rotation policy
    pub fn rotation_config(&self) -> RotationConfig {
        fn limit<T: PartialEq + Default>(value: T) -> Option<T> {
            (value != T::default()).then_some(value)
        }

        RotationConfig {
            max_file_size: limit(self.max_file_size),
            rolling_frequency: limit(self.rolling_frequency_secs).map(Duration::from_secs),
            max_file_count: limit(self.max_file_count),
            disk_quota_bytes: limit(self.disk_quota_bytes),
            always_create_new: self.always_create_new,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level applied to every category
    #[serde(default)]
    pub minimum_level: Level,

    /// Categories whose messages are dropped
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Per-category minimum levels, by category name
    #[serde(default)]
    pub levels: BTreeMap<String, Level>,

    #[serde(default)]
    pub console: ConsoleConfig,

    /// File destination; absent means no log files
    #[serde(default)]
    pub file: Option<FileConfig>,
}

impl LoggingConfig {
    /// Load configuration from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `path`, or return the default if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Check that every category name refers to a member of `C`
    pub fn validate<C: Category>(&self) -> Result<()> {
        let unknown = self
            .levels
            .keys()
            .chain(self.disabled.iter())
            .find(|name| C::from_name(name).is_none());

        match unknown {
            Some(name) => Err(Error::UnknownCategory(name.clone())),
            None => Ok(()),
        }
    }

    /// Apply levels and disabled categories to an existing service
    ///
    /// Nothing is changed when a category name is unknown.
    pub fn apply<C: Category>(&self, service: &LoggingService<C>) -> Result<()> {
        self.validate::<C>()?;

        service.set_minimum_level(self.minimum_level);
        for logger in service.loggers() {
            logger.set_enabled(true);
        }

        for (name, level) in &self.levels {
            if let Some(category) = C::from_name(name) {
                service.logger(category).set_minimum_level(*level);
            }
        }

        for name in &self.disabled {
            if let Some(category) = C::from_name(name) {
                service.logger(category).set_enabled(false);
            }
        }

        Ok(())
    }

    /// Build a service with the configured destinations and filters
    pub fn build_service<C: Category>(&self) -> Result<LoggingService<C>> {
        self.validate::<C>()?;

        let mut builder = LoggingService::<C>::builder();

        if self.console.enabled {
            builder = builder.destination(Arc::new(ConsoleDestination::with_formatter(
                DefaultFormatter::new(self.console.include_timestamp, self.console.include_category),
            )));
        }

        if let Some(file) = &self.file {
            let destination = FileDestination::builder(file.directory())
                .prefix(file.prefix.clone())
                .config(file.rotation_config())
                .formatter(DefaultFormatter::new(
                    file.include_timestamp,
                    file.include_category,
                ))
                .build()?;
            builder = builder.file_destination(Arc::new(destination));
        }

        let service = builder.build()?;
        self.apply(&service)?;
        Ok(service)
    }
}

/// Get the base configuration directory (~/.catlog)
/// Falls back to ./.catlog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".catlog"))
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine home directory, using current directory for config");
            PathBuf::from(".catlog")
        })
}

/// Get the path to the default config file
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the default logs directory
pub fn default_logs_dir() -> PathBuf {
    config_dir().join("logs")
}
