//! CLI subcommands

pub mod completions;
pub mod config;
pub mod plan;
pub mod sync;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use kbsync_artifact::provider::ArtifactCatalogService;
use kbsync_core::config::Config;
use kbsync_core::domain::ExtensionContentTyper;
use kbsync_sync::engine::SyncEngine;
use kbsync_sync::task::SyncRequest;

/// Reads a task file, or stdin when `input` is `-`
pub(crate) fn read_request(input: &str) -> Result<SyncRequest> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read task from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read task file '{input}'"))?
    };
    parse_request(&raw)
}

pub(crate) fn parse_request(raw: &str) -> Result<SyncRequest> {
    let request: SyncRequest = serde_json::from_str(raw).context("Invalid task JSON")?;
    if request.namespace.trim().is_empty() {
        bail!("Task is missing 'namespace'");
    }
    if request.catalog_id.trim().is_empty() {
        bail!("Task is missing 'catalog-id'");
    }
    Ok(request)
}

/// Loads and validates configuration, applying environment overrides
///
/// Defaults apply only when the file does not exist; a file that fails to
/// parse is an error.
pub(crate) fn load_config(config_path: &Path) -> Result<Config> {
    let config = if config_path.exists() {
        Config::load(config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?
    } else {
        Config::default()
    };
    let config = config.with_env_overrides();
    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!(
            "Invalid configuration ({}): {}",
            config_path.display(),
            details.join("; ")
        );
    }
    Ok(config)
}

/// Wires the artifact adapter and the default typer into a [`SyncEngine`]
pub(crate) fn build_engine(config: &Config) -> Result<SyncEngine> {
    let catalog = Arc::new(
        ArtifactCatalogService::from_config(config).context("Failed to create catalog client")?,
    );
    Ok(SyncEngine::new(
        catalog,
        Arc::new(ExtensionContentTyper),
        config.classifier(),
        config,
    ))
}
