//! Resolver configuration read from a TOML document:
//! ```toml
//! [resolver]
//! power_rule = true
//! lookup_table = true
//! mellin_transform = true
//! strip_retry = true
//!
//! [logging]
//! level = "debug"      # error | warn | info | debug | trace | off
//! file = "resolver.log"
//! file_prefix = "resolver"  # when `file` is absent: resolver_YYYY-MM-DD_HH-MM-SS.txt
//! ```
//! Every key is optional, missing keys keep their default; unknown keys are ignored.
use crate::Utils::logger::{init_logger, timestamped_log_name};
use log::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    InvalidValue { key: String, expected: &'static str },
    UnknownLogLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read configuration: {}", e),
            ConfigError::Toml(e) => write!(f, "malformed configuration: {}", e),
            ConfigError::InvalidValue { key, expected } => {
                write!(f, "configuration key {} must be {}", key, expected)
            }
            ConfigError::UnknownLogLevel(level) => write!(f, "unknown log level '{}'", level),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Toml(e)
    }
}

/// Which resolver tiers run and where the log goes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub power_rule: bool,
    pub lookup_table: bool,
    pub mellin_transform: bool,
    /// retry a failed inversion with an unconstrained strip
    pub strip_retry: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            power_rule: true,
            lookup_table: true,
            mellin_transform: true,
            strip_retry: true,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

fn section<'a>(table: &'a Table, name: &str) -> Result<Option<&'a Table>, ConfigError> {
    match table.get(name) {
        None => Ok(None),
        Some(Value::Table(inner)) => Ok(Some(inner)),
        Some(_) => Err(ConfigError::InvalidValue {
            key: name.to_string(),
            expected: "a table",
        }),
    }
}

fn read_bool(table: &Table, section: &str, key: &str, target: &mut bool) -> Result<(), ConfigError> {
    match table.get(key) {
        None => Ok(()),
        Some(Value::Boolean(value)) => {
            *target = *value;
            Ok(())
        }
        Some(_) => Err(ConfigError::InvalidValue {
            key: format!("{}.{}", section, key),
            expected: "a boolean",
        }),
    }
}

fn read_string<'a>(table: &'a Table, section: &str, key: &str) -> Result<Option<&'a str>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ConfigError::InvalidValue {
            key: format!("{}.{}", section, key),
            expected: "a string",
        }),
    }
}

impl ResolverConfig {
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let table = document.parse::<Table>()?;
        let mut config = ResolverConfig::default();
        if let Some(resolver) = section(&table, "resolver")? {
            read_bool(resolver, "resolver", "power_rule", &mut config.power_rule)?;
            read_bool(resolver, "resolver", "lookup_table", &mut config.lookup_table)?;
            read_bool(resolver, "resolver", "mellin_transform", &mut config.mellin_transform)?;
            read_bool(resolver, "resolver", "strip_retry", &mut config.strip_retry)?;
        }
        if let Some(logging) = section(&table, "logging")? {
            if let Some(level) = read_string(logging, "logging", "level")? {
                config.log_level = LevelFilter::from_str(level)
                    .map_err(|_| ConfigError::UnknownLogLevel(level.to_string()))?;
            }
            let prefix = read_string(logging, "logging", "file_prefix")?;
            match (read_string(logging, "logging", "file")?, prefix) {
                (Some(file), _) => config.log_file = Some(PathBuf::from(file)),
                (None, Some(prefix)) => {
                    config.log_file = Some(PathBuf::from(timestamped_log_name(prefix)))
                }
                (None, None) => {}
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let document = fs::read_to_string(path)?;
        ResolverConfig::from_toml_str(&document)
    }

    /// Installs the logger described by the `[logging]` section.
    pub fn init_logging(&self) -> bool {
        init_logger(self.log_level, self.log_file.as_deref())
    }
}
