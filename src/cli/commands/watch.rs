//! Foreground recurring crawl schedule.
//!
//! Three jobs share one pipeline: the collecting-signatures listing is
//! crawled frequently within a configured hour window, the other listings
//! on multi-hour intervals. Each trigger is delayed by a random jitter so
//! repeated runs never hit the site at a fixed phase.

use std::time::{Duration, Instant};

use chrono::{Timelike, Utc};
use tracing::{error, info};

use crate::cli::commands::helpers::build_orchestrator;
use crate::config::Settings;
use crate::models::PetitionStatus;
use crate::scrapers::Pacing;

const TICK: Duration = Duration::from_secs(60);

struct Job {
    status: PetitionStatus,
    interval: Duration,
    next_due: Instant,
    /// Inclusive UTC hour window; `None` means always eligible.
    hour_window: Option<(u32, u32)>,
}

impl Job {
    fn new(status: PetitionStatus, interval: Duration, hour_window: Option<(u32, u32)>) -> Self {
        Self {
            status,
            interval,
            next_due: Instant::now(),
            hour_window,
        }
    }

    fn eligible_at(&self, hour: u32) -> bool {
        match self.hour_window {
            Some((start, end)) => hour >= start && hour <= end,
            None => true,
        }
    }
}

pub async fn cmd_watch(settings: &Settings) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(settings)?;
    let watch = &settings.watch;
    let jitter = Pacing::seconds(0, watch.jitter_mins * 60);

    let mut jobs = vec![
        Job::new(
            PetitionStatus::Active,
            Duration::from_secs(watch.active_every_mins * 60),
            Some((watch.active_hour_start, watch.active_hour_end)),
        ),
        Job::new(
            PetitionStatus::InProcess,
            Duration::from_secs(watch.in_process_every_hours * 3600),
            None,
        ),
        Job::new(
            PetitionStatus::Processed,
            Duration::from_secs(watch.processed_every_hours * 3600),
            None,
        ),
    ];

    info!(
        active_every_mins = watch.active_every_mins,
        in_process_every_hours = watch.in_process_every_hours,
        processed_every_hours = watch.processed_every_hours,
        "watch schedule started"
    );

    loop {
        let hour = Utc::now().hour();
        for job in &mut jobs {
            if Instant::now() < job.next_due {
                continue;
            }
            // An out-of-window job stays due and fires at the window's
            // next opening.
            if !job.eligible_at(hour) {
                continue;
            }

            jitter.wait().await;
            if let Err(err) = orchestrator.scrape_by_status(job.status).await {
                error!(
                    status = job.status.as_str(),
                    error = %err,
                    "scheduled crawl failed"
                );
            }
            job.next_due = Instant::now() + job.interval;
        }

        tokio::time::sleep(TICK).await;
    }
}
