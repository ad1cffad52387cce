use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::harvest::CycleSummary;

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub interval: Duration,
}

impl Default for ScheduleConfig {
    /// Every 2 hours.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl ScheduleConfig {
    pub fn every_hours(hours: u64) -> Self {
        Self {
            interval: Duration::from_secs(hours.max(1) * 60 * 60),
        }
    }
}

/// Runs a harvest cycle immediately and then at a fixed interval.
///
/// Each cycle runs on its own task, so a failing or panicking cycle is logged
/// and the loop carries on. Only cancellation ends the loop.
pub struct Scheduler {
    config: ScheduleConfig,
}

impl Scheduler {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// Returns the number of cycles started.
    pub async fn run<F, Fut>(&self, cancel: CancellationToken, mut cycle: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<CycleSummary, AppError>> + Send + 'static,
    {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "Scheduler started"
        );
        let mut cycles = 0u64;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            cycles += 1;

            match tokio::spawn(cycle()).await {
                Ok(Ok(summary)) if summary.is_success() => {
                    info!(cycle = cycles, saved = summary.saved, "Scheduled cycle completed");
                }
                Ok(Ok(summary)) => {
                    warn!(
                        cycle = cycles,
                        unscraped = summary.unscraped.len(),
                        "Scheduled cycle extracted no jobs"
                    );
                }
                Ok(Err(e)) => {
                    error!(cycle = cycles, error = %e, "Scheduled cycle failed");
                }
                Err(e) => {
                    error!(cycle = cycles, error = %e, "Scheduled cycle panicked");
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.config.interval) => {}
                () = cancel.cancelled() => break,
            }
        }

        info!(cycles, "Scheduler stopped");
        cycles
    }
}
