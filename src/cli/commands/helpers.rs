//! Shared wiring for CLI commands.

use std::sync::Arc;

use tracing::warn;

use crate::config::Settings;
use crate::notify::{NotificationFanout, TelegramNotifier};
use crate::repository::SqliteStore;
use crate::scrapers::{Crawler, DetailEnricher, HttpFetcher};
use crate::services::ScrapeOrchestrator;

/// Build the full pipeline from settings. Without a bot token the pipeline
/// still crawls and enriches; only the broadcast step is absent.
pub fn build_orchestrator(settings: &Settings) -> anyhow::Result<ScrapeOrchestrator> {
    let fetcher = Arc::new(HttpFetcher::new(
        &settings.user_agent,
        settings.request_timeout(),
    )?);
    let store = Arc::new(SqliteStore::open(&settings.database)?);

    let fanout = match settings.bot_token.as_deref() {
        Some(token) => {
            let notifier = TelegramNotifier::new(token, settings.request_timeout())?;
            Some(NotificationFanout::new(
                Arc::new(notifier),
                store.clone(),
                settings.notify_delay.pacing(),
            ))
        }
        None => {
            warn!("no bot token configured; notifications disabled");
            None
        }
    };

    let crawler = Crawler::new(
        fetcher.clone(),
        &settings.base_url,
        settings.page_delay.pacing(),
    )?;

    Ok(ScrapeOrchestrator::new(
        crawler,
        DetailEnricher::new(fetcher),
        store,
        fanout,
        settings.tracked_status_label.clone(),
        settings.notify_delay.pacing(),
        settings.backfill_delay.pacing(),
    ))
}
