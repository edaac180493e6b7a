//! Plan command - Preview a sync without changing anything
//!
//! Lists the records that would be deleted or replaced and the files that
//! would be uploaded. A missing catalog is not created.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use kbsync_core::domain::CatalogRecord;
use kbsync_sync::differ::SyncPlan;

use crate::output::{get_formatter, plural, OutputFormat};

/// Arguments for the plan subcommand
#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Task file (JSON); `-` reads from stdin
    #[arg(short, long)]
    pub input: String,
}

impl PlanCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);

        let config = super::load_config(config_path)?;
        let request = super::read_request(&self.input)?;
        let engine = super::build_engine(&config)?;

        let plan = engine.plan(&request).await.context("Planning failed")?;

        if format.is_json() {
            formatter.print_json(&plan_to_json(&plan));
            return Ok(());
        }

        if plan.is_empty() {
            formatter.success("Already up to date");
            return Ok(());
        }

        formatter.success(&format!(
            "{} delete{}, {} create{}",
            plan.delete_count(),
            plural(plan.delete_count()),
            plan.create_count(),
            plural(plan.create_count())
        ));
        for record in &plan.to_delete {
            formatter.info(&format!("- {} ({})", record_label(record), record.uid));
        }
        for replacement in &plan.to_replace {
            formatter.info(&format!(
                "~ {} ({}) modified {}",
                replacement.file.name, replacement.record.uid, replacement.file.modified_time
            ));
        }
        for file in &plan.to_upload {
            formatter.info(&format!("+ {} ({})", file.name, file.id));
        }

        Ok(())
    }
}

fn record_label(record: &CatalogRecord) -> &str {
    record.external_id().unwrap_or(&record.display_name)
}

fn plan_to_json(plan: &SyncPlan) -> Value {
    json!({
        "to-delete": plan.to_delete.iter().map(|r| json!({
            "uid": r.uid.as_str(),
            "external-id": r.external_id(),
            "name": r.display_name,
        })).collect::<Vec<_>>(),
        "to-replace": plan.to_replace.iter().map(|r| json!({
            "uid": r.record.uid.as_str(),
            "external-id": r.file.id,
            "name": r.file.name,
            "modified-time": r.file.modified_time,
        })).collect::<Vec<_>>(),
        "to-upload": plan.to_upload.iter().map(|f| json!({
            "external-id": f.id,
            "name": f.name,
        })).collect::<Vec<_>>(),
    })
}
