//! # Event subscribers for the host runtime.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery
//! for handling runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Publishers ── publish(Event) ──► Bus ──► Supervisor listener
//!                                              │
//!                                              ▼
//!                                        SubscriberSet
//!                                   ┌─────────┼─────────┐
//!                                   ▼         ▼         ▼
//!                               LogWriter  Metrics   Custom ...
//! ```
//!
//! - [`Subscribe`] — contract for event handlers
//! - [`SubscriberSet`] — non-blocking fan-out with per-subscriber queues
//! - [`LogWriter`] — stdout operator log

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
