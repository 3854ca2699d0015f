//! # Simple logging subscriber for operators, debugging, and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format. This is
//! the default operator-visible channel: steady-state tick failures show up
//! here as warnings without affecting request-serving availability.
//!
//! ## Output format
//! ```text
//! [master-started]
//! [worker-started] worker=0 role=event
//! [registration-failed] adapter=AdminAdapter err="connection refused"
//! [stat-reported]
//! [config-written] file=a.conf
//! [payload-dispatched] worker=0
//! [scheduler-started]
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Prints human-readable event descriptions to stdout. Implement a custom
/// [`Subscribe`] for structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new stdout log writer.
    pub fn new() -> Self {
        Self
    }
}

fn opt(v: &Option<std::sync::Arc<str>>) -> &str {
    v.as_deref().unwrap_or("-")
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::GroupStarted => println!("[group-started]"),
            EventKind::MasterStarted => println!("[master-started]"),
            EventKind::ManagerStarted => println!("[manager-started]"),
            EventKind::WorkerStarted => {
                println!(
                    "[worker-started] worker={} role={}",
                    e.worker.unwrap_or_default(),
                    opt(&e.reason)
                );
            }
            EventKind::WorkerStopped => {
                println!("[worker-stopped] worker={}", e.worker.unwrap_or_default());
            }
            EventKind::RegistrationSent => {
                println!("[registration-sent] adapter={}", opt(&e.adapter));
            }
            EventKind::RegistrationFailed => {
                println!(
                    "[registration-failed] adapter={} err={:?}",
                    opt(&e.adapter),
                    opt(&e.reason)
                );
            }
            EventKind::StatReported => println!("[stat-reported]"),
            EventKind::StatFailed => {
                println!("[stat-failed] err={:?}", opt(&e.reason));
            }
            EventKind::ConfigWritten => {
                println!("[config-written] file={}", opt(&e.file));
            }
            EventKind::ConfigSkipped => {
                println!(
                    "[config-skipped] file={} reason={}",
                    opt(&e.file),
                    opt(&e.reason)
                );
            }
            EventKind::ConfigFailed => {
                println!(
                    "[config-failed] file={} err={:?}",
                    opt(&e.file),
                    opt(&e.reason)
                );
            }
            EventKind::PayloadDispatched => {
                println!(
                    "[payload-dispatched] worker={}",
                    e.worker.unwrap_or_default()
                );
            }
            EventKind::SchedulerStarted => println!("[scheduler-started]"),
            EventKind::SchedulerStopped => println!("[scheduler-stopped]"),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace]"),
            EventKind::GraceExceeded => println!("[grace-exceeded]"),
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
