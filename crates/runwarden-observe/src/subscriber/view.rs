use std::borrow::Borrow;

use runwarden_model::{Event, EventKind};
use tracing::{debug, error, info, trace, warn};

pub trait View {
    fn as_run(&self) -> &str;
    fn as_workflow(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn attempt(&self) -> u32;
    fn delay_ms(&self) -> u64;
    fn kind(&self) -> EventKind;
}

impl<T> View for T
where
    T: Borrow<Event>,
{
    #[inline]
    fn as_run(&self) -> &str {
        self.borrow().run.as_ref().map_or("unknown", |r| r.as_str())
    }
    #[inline]
    fn as_workflow(&self) -> &str {
        self.borrow()
            .workflow
            .as_ref()
            .map_or("unknown", |w| w.as_str())
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn attempt(&self) -> u32 {
        self.borrow().attempt.unwrap_or(0)
    }
    #[inline]
    fn delay_ms(&self) -> u64 {
        self.borrow().delay_ms.unwrap_or(0)
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // admission
        EventKind::RunAdmitted => "run admitted",
        EventKind::RunQueued => "run queued; waiting for a free slot",
        EventKind::RunRejected => "run rejected; waiting queue is full",
        EventKind::RunPromoted => "queued run promoted to running",
        EventKind::RunCompleted => "run released its slots",
        EventKind::QueuedRunCancelled => "queued run cancelled",

        // retention
        EventKind::RetentionEvicted => "run record evicted by retention",
        EventKind::RetentionDeferred => "run record eviction deferred until gc settles",

        // gc
        EventKind::GcScheduled => "gc scheduled",
        EventKind::GcAttemptFailed => "gc attempt failed",
        EventKind::GcRetryScheduled => "gc retry scheduled",
        EventKind::GcDone => "gc finished; resources reclaimed",
        EventKind::GcPermanentlyFailed => "gc exhausted its attempts; manual intervention required",
        EventKind::GcRecovered => "gc task rebuilt from run record",

        // config
        EventKind::ConfigWarning => "configuration warning",
        EventKind::WorkersDefaulted => "worker pool size not configured; using default",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        // admission
        EventKind::RunAdmitted | EventKind::RunPromoted => {
            info!(run = e.as_run(), workflow = e.as_workflow(), "{msg}")
        }
        EventKind::RunQueued => debug!(run = e.as_run(), workflow = e.as_workflow(), "{msg}"),
        EventKind::RunRejected => {
            warn!(run = e.as_run(), workflow = e.as_workflow(), reason = e.as_reason(), "{msg}")
        }
        EventKind::RunCompleted => trace!(run = e.as_run(), workflow = e.as_workflow(), "{msg}"),
        EventKind::QueuedRunCancelled => {
            debug!(run = e.as_run(), workflow = e.as_workflow(), "{msg}")
        }

        // retention
        EventKind::RetentionEvicted | EventKind::RetentionDeferred => {
            debug!(run = e.as_run(), workflow = e.as_workflow(), "{msg}")
        }

        // gc
        EventKind::GcScheduled => {
            debug!(run = e.as_run(), delay_ms = e.delay_ms(), "{msg}")
        }
        EventKind::GcAttemptFailed => warn!(
            run = e.as_run(),
            attempt = e.attempt(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::GcRetryScheduled => debug!(
            run = e.as_run(),
            attempt = e.attempt(),
            delay_ms = e.delay_ms(),
            "{msg}"
        ),
        EventKind::GcDone => info!(run = e.as_run(), attempt = e.attempt(), "{msg}"),
        EventKind::GcPermanentlyFailed => error!(
            run = e.as_run(),
            workflow = e.as_workflow(),
            attempt = e.attempt(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::GcRecovered => debug!(run = e.as_run(), delay_ms = e.delay_ms(), "{msg}"),

        // config
        EventKind::ConfigWarning => warn!(reason = e.as_reason(), "{msg}"),
        EventKind::WorkersDefaulted => info!(reason = e.as_reason(), "{msg}"),
    }
}
