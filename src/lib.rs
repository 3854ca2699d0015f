//! # herald
//!
//! **Herald** is the runtime host for a long-lived network service process:
//! it starts a worker group, registers the service with a remote node
//! registry, keeps that registration alive via periodic heartbeats, reports
//! usage statistics, and refreshes local configuration files from a remote
//! configuration store.
//!
//! The crate owns the **process-coordination and telemetry-dispatch**
//! subsystem; the request listener/proxy machinery and the wire protocols
//! are external collaborators driven through trait seams.
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Supervisor (process-group orchestrator)                         │
//! │  - Bus (broadcast events)  - SubscriberSet (operator fan-out)    │
//! │  - lifecycle hooks: master/manager/worker start, worker stop,    │
//! │    one-shot task received/finished, connection no-ops            │
//! └────┬──────────────────┬──────────────────────┬───────────────────┘
//!      │ master start     │ worker 0 start       │ worker i start
//!      ▼                  ▼                      ▼
//!  pid files +       StartupPayload          ProcessRole
//!  one-shot          │ TaskDispatcher        (event / task worker)
//!  keep-alive +      │ (exactly once per boot)
//!  ConfigSync        ▼
//!             designated worker inbox
//!                    │
//!                    ▼
//!          TelemetryScheduler (Idle → Running → Stopped)
//!            ├─ heartbeat job: keep-alive ×2 every 10 s
//!            └─ stat job: one submission per report interval
//! ```
//!
//! ## Guarantees
//! - The startup payload reaches exactly one worker, exactly once per boot.
//! - The telemetry jobs never run in more than one worker concurrently.
//! - Config and pid files are written with atomic replace; one file's
//!   failure never aborts its siblings.
//! - A failed heartbeat or stat tick is reported and the timer keeps going.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use herald::{HostConfig, LogWriter, Subscribe, Supervisor};
//! # use herald::{NodeRegistry, StatReporter, ConfigStore};
//! # fn seams() -> (Arc<dyn NodeRegistry>, Arc<dyn StatReporter>, Arc<dyn ConfigStore>) {
//! #     unimplemented!()
//! # }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = HostConfig::from_yaml("herald.yaml")?;
//!     let (registry, stats, store) = seams();
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = Supervisor::new(cfg, subs, registry, stats, store);
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod remote;
mod subscribers;
mod telemetry;

// ---- Public re-exports ----

pub use config::{ClientConfig, HostConfig, ServerConfig};
pub use core::{ProcessRole, Supervisor};
pub use error::{HostError, RemoteError};
pub use events::{Bus, Event, EventKind};
pub use remote::{
    ConfigFileSpec, ConfigStore, ConfigSync, NodeRegistry, RegistrationDescriptor, ServiceIdentity,
    SocketMode, StatReporter, StatSubmission, SyncEntry, SyncOutcome, SyncReport,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use telemetry::{
    PayloadInbox, ReportSettings, StartupPayload, TaskDispatcher, TelemetryScheduler,
    ADMIN_ADAPTER, HEARTBEAT_INTERVAL,
};
