//! Sync command - Reconcile a catalog with a task file
//!
//! Provides the `kbsync sync` CLI command which:
//! 1. Loads and validates configuration
//! 2. Reads the task (namespace, catalog, external files)
//! 3. Creates the artifact adapter and runs the SyncEngine
//! 4. Prints the task response (uploaded, updated, failed files)
//!
//! Per-file failures are part of a successful run and do not change the
//! exit status; only fatal errors do.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use kbsync_sync::executor::SyncOutcome;
use kbsync_sync::task::SyncResponse;

use crate::output::{format_duration, get_formatter, plural, OutputFormat, OutputFormatter};

/// Arguments for the sync subcommand
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Task file (JSON); `-` reads from stdin
    #[arg(short, long)]
    pub input: String,
}

impl SyncCommand {
    /// Runs the sync and displays the result
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);

        let config = super::load_config(config_path)?;
        info!(config_path = %config_path.display(), "Loaded configuration");

        let request = super::read_request(&self.input)?;
        let engine = super::build_engine(&config)?;

        formatter.info(&format!(
            "Syncing {} file{} into '{}'...",
            request.third_party_files.len(),
            plural(request.third_party_files.len()),
            request.catalog_id
        ));

        let outcome = engine.sync(&request).await.context("Sync failed")?;
        let response = SyncResponse::from(&outcome);

        if format.is_json() {
            let json =
                serde_json::to_value(&response).context("Failed to serialize sync response")?;
            formatter.print_json(&json);
        } else {
            print_summary(formatter.as_ref(), &outcome);
        }

        Ok(())
    }
}

fn print_summary(formatter: &dyn OutputFormatter, outcome: &SyncOutcome) {
    let uploaded = outcome.uploaded_records.len();
    let updated = outcome.updated_records.len();
    let failed = outcome.failures.len();

    if uploaded + updated + outcome.deleted == 0 && failed == 0 {
        formatter.success("Already up to date");
    } else {
        formatter.success(&format!(
            "Sync completed in {}",
            format_duration(outcome.duration_ms)
        ));
    }

    if uploaded > 0 {
        formatter.info(&format!("Uploaded: {} file{}", uploaded, plural(uploaded)));
    }
    if updated > 0 {
        formatter.info(&format!("Updated:  {} file{}", updated, plural(updated)));
    }
    if outcome.deleted > 0 {
        formatter.info(&format!(
            "Deleted:  {} record{}",
            outcome.deleted,
            plural(outcome.deleted)
        ));
    }
    if outcome.processing_triggered {
        formatter.info("Processing started for new records");
    }

    if failed > 0 {
        formatter.warn(&format!("{} file{} failed:", failed, plural(failed)));
        for failure in &outcome.failures {
            formatter.info(&format!(
                "  - {} ({}): {}",
                failure.file.name, failure.file.id, failure.message
            ));
        }
    }
}
