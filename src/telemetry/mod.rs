//! Telemetry core: startup payload, one-shot dispatch, recurring jobs.
//!
//! This module owns the hand-off-then-run pipeline:
//! ```text
//! worker 0 starts ──► StartupPayload::from_config()
//!                        │
//!                        ▼
//!                  TaskDispatcher::dispatch()      (exactly once per boot)
//!                        │
//!                        ▼  (inbox channel)
//!               designated worker's task handler
//!                        │
//!                        ▼
//!                  TelemetryScheduler::start()     (heartbeat + stat jobs)
//! ```
//!
//! - [`StartupPayload`] — immutable parameter bundle, built once, consumed once
//! - [`TaskDispatcher`] — exactly-once channel into the designated worker
//! - [`TelemetryScheduler`] — Idle → Running → Stopped job owner

mod dispatch;
mod payload;
mod scheduler;

pub use dispatch::{PayloadInbox, TaskDispatcher};
pub use payload::{ReportSettings, StartupPayload, ADMIN_ADAPTER};
pub(crate) use scheduler::keep_alive_once;
pub use scheduler::{TelemetryScheduler, HEARTBEAT_INTERVAL};
