use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::GarbageCollector;

/// Periodic driver of [`GarbageCollector::sweep`].
///
/// GC is time-driven: nothing else wakes due tasks.
pub struct GcSweeper {
    gc: Arc<GarbageCollector>,
    period: Duration,
}

impl GcSweeper {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

    pub fn new(gc: Arc<GarbageCollector>) -> Self {
        Self {
            gc,
            period: Self::DEFAULT_PERIOD,
        }
    }

    /// Zero is raised to one millisecond.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// Sweep on every tick until `token` is cancelled.
    ///
    /// A sweep in progress is finished before the loop stops.
    pub async fn run(self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(period_ms = self.period.as_millis() as u64, "gc sweeper started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.gc.sweep(SystemTime::now()).await;
                    if report.attempted > 0 {
                        info!(
                            attempted = report.attempted,
                            done = report.done,
                            retried = report.retried,
                            permanently_failed = report.permanently_failed,
                            "gc sweep finished"
                        );
                    }
                }
            }
        }
        debug!("gc sweeper stopped");
    }

    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(token))
    }
}
