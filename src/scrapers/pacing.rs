//! Randomized politeness pacing between outbound requests.
//!
//! The pacing IS the rate-limiting mechanism: all crawl, enrich and notify
//! work runs sequentially with a uniformly distributed delay drawn from a
//! bounded window before each follow-up request.

use std::time::Duration;

use rand::Rng;

/// A bounded randomized delay window.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    window: Option<(Duration, Duration)>,
}

impl Pacing {
    /// Delay uniformly distributed in `[min, max]`.
    pub fn window(min: Duration, max: Duration) -> Self {
        Self {
            window: Some((min, max.max(min))),
        }
    }

    /// Convenience constructor for second-granularity windows.
    pub fn seconds(min_secs: u64, max_secs: u64) -> Self {
        Self::window(
            Duration::from_secs(min_secs),
            Duration::from_secs(max_secs),
        )
    }

    /// No delay. For tests and dry runs only.
    pub fn none() -> Self {
        Self { window: None }
    }

    /// Suspend for one randomized interval.
    pub async fn wait(&self) {
        if let Some(delay) = self.pick() {
            tokio::time::sleep(delay).await;
        }
    }

    fn pick(&self) -> Option<Duration> {
        let (min, max) = self.window?;
        let span = (max - min).as_millis() as u64;
        let jitter = if span == 0 {
            0
        } else {
            rand::rng().random_range(0..=span)
        };
        Some(min + Duration::from_millis(jitter))
    }
}
