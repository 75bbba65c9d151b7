//! Runtime settings.
//!
//! Settings come from an optional TOML file with serde defaults filling the
//! gaps, then a small set of environment variables override the file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::scrapers::Pacing;

fn default_base_url() -> String {
    "https://petition.president.gov.ua".to_string()
}

fn default_database() -> String {
    "petwatch.db".to_string()
}

fn default_user_agent() -> String {
    format!("petwatch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_tracked_status_label() -> String {
    "Триває збір підписів".to_string()
}

/// A randomized delay window, in whole seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DelayWindow {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DelayWindow {
    const fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::seconds(self.min_secs, self.max_secs)
    }
}

fn default_page_delay() -> DelayWindow {
    DelayWindow::new(3, 10)
}

fn default_notify_delay() -> DelayWindow {
    DelayWindow::new(5, 10)
}

fn default_backfill_delay() -> DelayWindow {
    DelayWindow::new(30, 60)
}

/// Schedule for the long-running watch loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Minutes between crawls of the collecting-signatures listing.
    pub active_every_mins: u64,
    /// Hours between crawls of the under-consideration listing.
    pub in_process_every_hours: u64,
    /// Hours between crawls of the answered listing.
    pub processed_every_hours: u64,
    /// Random extra delay added when a job fires, in minutes.
    pub jitter_mins: u64,
    /// UTC hours within which the frequent crawl runs.
    pub active_hour_start: u32,
    pub active_hour_end: u32,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            active_every_mins: 60,
            in_process_every_hours: 24,
            processed_every_hours: 72,
            jitter_mins: 15,
            active_hour_start: 6,
            active_hour_end: 18,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// Delivery channel credential. Absent means notifications are off.
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Stored status label equivalent to the `active` listing filter.
    #[serde(default = "default_tracked_status_label")]
    pub tracked_status_label: String,
    #[serde(default = "default_page_delay")]
    pub page_delay: DelayWindow,
    #[serde(default = "default_notify_delay")]
    pub notify_delay: DelayWindow,
    #[serde(default = "default_backfill_delay")]
    pub backfill_delay: DelayWindow,
    #[serde(default)]
    pub watch: WatchSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            database: default_database(),
            bot_token: None,
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            tracked_status_label: default_tracked_status_label(),
            page_delay: default_page_delay(),
            notify_delay: default_notify_delay(),
            backfill_delay: default_backfill_delay(),
            watch: WatchSettings::default(),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

impl Settings {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };

        if let Some(base_url) = env_non_empty("PETWATCH_BASE_URL") {
            tracing::debug!(%base_url, "using base URL from environment");
            settings.base_url = base_url;
        }
        if let Some(database) = env_non_empty("PETWATCH_DATABASE") {
            tracing::debug!(%database, "using database path from environment");
            settings.database = database;
        }
        if let Some(token) = env_non_empty("BOT_TOKEN") {
            settings.bot_token = Some(token);
        }

        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
