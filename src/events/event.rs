//! # Runtime events emitted by the supervisor, dispatcher, and telemetry jobs.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Lifecycle events**: process-group and per-process transitions
//!   (master/manager/worker start, worker stop, shutdown).
//! - **Telemetry events**: heartbeat and stat-report tick outcomes.
//! - **Config-sync events**: per-file sync outcomes.
//! - **Coordination events**: payload dispatch and scheduler transitions.
//!
//! The [`Event`] struct carries optional metadata such as the worker index,
//! adapter name, logical filename, and a failure reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Process lifecycle ===
    /// Listener bound and the worker group is starting.
    ///
    /// Sets: `at`, `seq`.
    GroupStarted,

    /// Master process started (titles set, pid files persisted).
    ///
    /// Sets: `at`, `seq`.
    MasterStarted,

    /// Manager process started.
    ///
    /// Sets: `at`, `seq`.
    ManagerStarted,

    /// A worker started and got its role assigned.
    ///
    /// Sets: `worker`, `reason` (role label), `at`, `seq`.
    WorkerStarted,

    /// A worker stopped.
    ///
    /// Sets: `worker`, `at`, `seq`.
    WorkerStopped,

    /// Shutdown requested (OS signal observed).
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All workers stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some workers did not stop in time.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,

    // === Registration / telemetry ===
    /// A keep-alive registration for one adapter identity succeeded.
    ///
    /// Sets: `adapter`, `at`, `seq`.
    RegistrationSent,

    /// A keep-alive registration for one adapter identity failed.
    ///
    /// Sets: `adapter`, `reason`, `at`, `seq`.
    RegistrationFailed,

    /// One stat submission succeeded.
    ///
    /// Sets: `at`, `seq`.
    StatReported,

    /// One stat submission failed.
    ///
    /// Sets: `reason`, `at`, `seq`.
    StatFailed,

    // === Config sync ===
    /// A remote config file was fetched and written locally.
    ///
    /// Sets: `file`, `at`, `seq`.
    ConfigWritten,

    /// A config entry was skipped (empty remote content).
    ///
    /// Sets: `file`, `reason`, `at`, `seq`.
    ConfigSkipped,

    /// A config entry failed (fetch or local write).
    ///
    /// Sets: `file`, `reason`, `at`, `seq`.
    ConfigFailed,

    // === Coordination ===
    /// The startup payload was handed to the designated worker's inbox.
    ///
    /// Sets: `worker` (target index), `at`, `seq`.
    PayloadDispatched,

    /// The telemetry scheduler entered the Running state.
    ///
    /// Sets: `worker` (hosting worker index, when known), `at`, `seq`.
    SchedulerStarted,

    /// The telemetry scheduler was stopped; both timers cancelled.
    ///
    /// Sets: `at`, `seq`.
    SchedulerStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker index, if applicable.
    pub worker: Option<u32>,
    /// Adapter identity name (registration events).
    pub adapter: Option<Arc<str>>,
    /// Logical filename (config-sync events).
    pub file: Option<Arc<str>>,
    /// Human-readable reason (errors, skip reasons, role labels).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            adapter: None,
            file: None,
            reason: None,
        }
    }

    /// Attaches a worker index.
    #[inline]
    pub fn with_worker(mut self, worker: u32) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches an adapter identity name.
    #[inline]
    pub fn with_adapter(mut self, adapter: impl Into<Arc<str>>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Attaches a logical filename.
    #[inline]
    pub fn with_file(mut self, file: impl Into<Arc<str>>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::MasterStarted);
        let b = Event::now(EventKind::ManagerStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::now(EventKind::RegistrationFailed)
            .with_adapter("AdminAdapter")
            .with_reason("connection refused");
        assert_eq!(ev.adapter.as_deref(), Some("AdminAdapter"));
        assert_eq!(ev.reason.as_deref(), Some("connection refused"));
        assert!(ev.worker.is_none());
    }
}
