use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::unroll::{RewriteMode, UnrollOptions, DEFAULT_CLASS_MARKER, DEFAULT_INDEX_MARKER};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Run configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct UnrollConfig {
    /// Source DRDL file
    #[validate(custom(function = "validate_path"))]
    pub input: PathBuf,

    /// Destination DRDL file, written only after a successful rewrite
    #[validate(custom(function = "validate_path"))]
    pub output: PathBuf,

    /// Trailing column segment that marks a nested class
    #[validate(custom(function = "validate_class_marker"))]
    pub class_marker: String,

    /// Substring marking array-position columns
    #[validate(length(min = 1, message = "Index marker cannot be empty"))]
    pub index_marker: String,

    pub mode: RewriteMode,

    /// Prefix for the names of collapsed recursive tables
    pub collapsed_table_prefix: String,

    /// Fail on recursion shapes the collapser cannot handle
    pub strict_recursion: bool,

    /// Default log filter, overridden by RUST_LOG
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,
}

impl Default for UnrollConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("src.drdl"),
            output: PathBuf::from("dst.drdl"),
            class_marker: DEFAULT_CLASS_MARKER.to_string(),
            index_marker: DEFAULT_INDEX_MARKER.to_string(),
            mode: RewriteMode::default(),
            collapsed_table_prefix: String::new(),
            strict_recursion: false,
            log_level: "info".to_string(),
        }
    }
}

impl UnrollConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            input: env::var("DRDL_UNROLL_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.input),
            output: env::var("DRDL_UNROLL_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
            class_marker: env::var("DRDL_UNROLL_CLASS_MARKER").unwrap_or(defaults.class_marker),
            index_marker: env::var("DRDL_UNROLL_INDEX_MARKER").unwrap_or(defaults.index_marker),
            mode: parse_env_var("DRDL_UNROLL_MODE", "flatten")?,
            collapsed_table_prefix: env::var("DRDL_UNROLL_COLLAPSED_PREFIX")
                .unwrap_or(defaults.collapsed_table_prefix),
            strict_recursion: parse_env_var("DRDL_UNROLL_STRICT_RECURSION", "false")?,
            log_level: env::var("DRDL_UNROLL_LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation.
    ///
    /// The base is the `--config` file when one is given, the environment otherwise.
    /// Explicit flags override either.
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = match &cli.config_file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::from_env()?,
        };
        config.merge(cli);

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge explicitly given CLI values (CLI overrides environment and file)
    pub fn merge(&mut self, cli: CliConfig) {
        if let Some(input) = cli.input {
            self.input = input;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if let Some(class_marker) = cli.class_marker {
            self.class_marker = class_marker;
        }
        if let Some(index_marker) = cli.index_marker {
            self.index_marker = index_marker;
        }
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(prefix) = cli.collapsed_table_prefix {
            self.collapsed_table_prefix = prefix;
        }
        if let Some(strict) = cli.strict_recursion {
            self.strict_recursion = strict;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
    }

    /// The parameters the rewrite passes consume
    pub fn unroll_options(&self) -> UnrollOptions {
        UnrollOptions {
            class_marker: self.class_marker.clone(),
            index_marker: self.index_marker.clone(),
            mode: self.mode,
            collapsed_table_prefix: self.collapsed_table_prefix.clone(),
            strict_recursion: self.strict_recursion,
        }
    }
}

/// CLI configuration (parsed from command line arguments); `None` means not given
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub config_file: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub class_marker: Option<String>,
    pub index_marker: Option<String>,
    pub mode: Option<RewriteMode>,
    pub collapsed_table_prefix: Option<String>,
    pub strict_recursion: Option<bool>,
    pub log_level: Option<String>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

fn validate_path(path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("empty_path").with_message("Path cannot be empty".into()));
    }
    Ok(())
}

fn validate_class_marker(marker: &str) -> Result<(), ValidationError> {
    if marker.is_empty() {
        return Err(ValidationError::new("empty_marker")
            .with_message("Class marker cannot be empty".into()));
    }
    if marker.contains('.') {
        return Err(ValidationError::new("dotted_marker")
            .with_message("Class marker must be a single path segment".into()));
    }
    Ok(())
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    log::LevelFilter::from_str(level)
        .map(|_| ())
        .map_err(|_| ValidationError::new("log_level").with_message("Unknown log level".into()))
}
