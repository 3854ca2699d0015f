//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor hooks,
//! the task dispatcher, the telemetry jobs, and config sync.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` lifecycle hooks, `TaskDispatcher`,
//!   `TelemetryScheduler` jobs, `ConfigSync`.
//! - **Consumer**: the supervisor's listener, which fans events out to the
//!   [`SubscriberSet`](crate::subscribers::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
