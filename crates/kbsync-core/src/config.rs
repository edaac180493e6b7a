//! Configuration module for kbsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{SourceClassifier, SourceRule};

/// Environment variable that overrides `catalog.api_token`.
pub const API_TOKEN_ENV: &str = "KBSYNC_API_TOKEN";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for kbsync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub sync: SyncConfig,
    /// Ordered source classification rules; the first matching prefix wins.
    pub sources: Vec<SourceRule>,
    pub logging: LoggingConfig,
}

/// Remote catalog service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the catalog REST API.
    pub base_url: String,
    /// Bearer token. Usually supplied through `KBSYNC_API_TOKEN` instead.
    pub api_token: Option<String>,
    /// Sent as `Instill-User-Uid` when set.
    pub user_uid: Option<String>,
    /// Sent as `Instill-Requester-Uid` when set.
    pub requester_uid: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Retries after a throttled (429) response.
    pub max_retries: u32,
}

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for a whole run, in seconds.
    pub run_timeout_secs: u64,
    /// Maximum record creations in flight at once.
    pub create_concurrency: usize,
    /// Ask the catalog to start processing newly created records.
    pub trigger_processing: bool,
    /// Records requested per listing page.
    pub page_size: u32,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `text` or `json`.
    pub format: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/kbsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("kbsync")
            .join("config.yaml")
    }

    /// Apply environment overrides (currently only the API token).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.catalog.api_token = Some(token);
            }
        }
        self
    }

    /// Builds the source classifier described by the `sources` section.
    pub fn classifier(&self) -> SourceClassifier {
        SourceClassifier::new(self.sources.clone())
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            sync: SyncConfig::default(),
            sources: SourceClassifier::default().rules().to_vec(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.instill.tech".to_string(),
            api_token: None,
            user_uid: None,
            requester_uid: None,
            request_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            run_timeout_secs: 300,
            create_concurrency: 4,
            trigger_processing: true,
            page_size: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.run_timeout_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `logging.format`.
const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

fn positive(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError {
            field: field.into(),
            message: "must be greater than 0".into(),
        });
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- catalog ---
        let base = self.catalog.base_url.as_str();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            errors.push(ValidationError {
                field: "catalog.base_url".into(),
                message: format!("must be an http(s) URL, got '{base}'"),
            });
        }
        positive(
            &mut errors,
            "catalog.request_timeout_secs",
            self.catalog.request_timeout_secs,
        );

        // --- sync ---
        positive(&mut errors, "sync.run_timeout_secs", self.sync.run_timeout_secs);
        positive(
            &mut errors,
            "sync.create_concurrency",
            self.sync.create_concurrency as u64,
        );
        positive(&mut errors, "sync.page_size", u64::from(self.sync.page_size));

        // --- sources ---
        if self.sources.is_empty() {
            errors.push(ValidationError {
                field: "sources".into(),
                message: "at least one source rule is required".into(),
            });
        }
        for (i, rule) in self.sources.iter().enumerate() {
            if rule.tag.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("sources[{i}].tag"),
                    message: "must not be empty".into(),
                });
            }
            if rule.prefixes.is_empty() || rule.prefixes.iter().any(|p| p.is_empty()) {
                errors.push(ValidationError {
                    field: format!("sources[{i}].prefixes"),
                    message: "must contain only non-empty prefixes".into(),
                });
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid log level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }
        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            errors.push(ValidationError {
                field: "logging.format".into(),
                message: format!(
                    "invalid log format '{}', expected one of: {}",
                    self.logging.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Config`], starting from defaults.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pre-populated with [`Config::default`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- catalog ---

    pub fn catalog_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.catalog.base_url = url.into();
        self
    }

    pub fn catalog_api_token(mut self, token: impl Into<String>) -> Self {
        self.config.catalog.api_token = Some(token.into());
        self
    }

    pub fn catalog_user_uid(mut self, uid: impl Into<String>) -> Self {
        self.config.catalog.user_uid = Some(uid.into());
        self
    }

    pub fn catalog_requester_uid(mut self, uid: impl Into<String>) -> Self {
        self.config.catalog.requester_uid = Some(uid.into());
        self
    }

    pub fn catalog_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.catalog.request_timeout_secs = seconds;
        self
    }

    pub fn catalog_max_retries(mut self, n: u32) -> Self {
        self.config.catalog.max_retries = n;
        self
    }

    // --- sync ---

    pub fn sync_run_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.sync.run_timeout_secs = seconds;
        self
    }

    pub fn sync_create_concurrency(mut self, n: usize) -> Self {
        self.config.sync.create_concurrency = n;
        self
    }

    pub fn sync_trigger_processing(mut self, enabled: bool) -> Self {
        self.config.sync.trigger_processing = enabled;
        self
    }

    pub fn sync_page_size(mut self, n: u32) -> Self {
        self.config.sync.page_size = n;
        self
    }

    // --- sources ---

    pub fn sources(mut self, rules: Vec<SourceRule>) -> Self {
        self.config.sources = rules;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
