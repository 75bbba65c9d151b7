//! One-off detail backfill.

use crate::cli::commands::helpers::build_orchestrator;
use crate::config::Settings;

pub async fn cmd_backfill(settings: &Settings) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(settings)?;
    orchestrator.backfill_missing_details().await?;
    Ok(())
}
