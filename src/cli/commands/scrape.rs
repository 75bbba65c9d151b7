//! One-off listing crawl.

use anyhow::bail;

use crate::cli::commands::helpers::build_orchestrator;
use crate::config::Settings;
use crate::models::PetitionStatus;

pub async fn cmd_scrape(settings: &Settings, status: &str) -> anyhow::Result<()> {
    let Some(status) = PetitionStatus::from_str(status) else {
        bail!("unknown status '{status}' (expected active, in_process or processed)");
    };

    let orchestrator = build_orchestrator(settings)?;
    orchestrator.scrape_by_status(status).await?;
    Ok(())
}
