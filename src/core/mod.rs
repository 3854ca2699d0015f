//! Runtime core: process-group orchestration and lifecycle.
//!
//! The only public API from this module is [`Supervisor`] (plus the
//! [`ProcessRole`] it assigns), which orchestrates the worker group,
//! the lifecycle hooks, and graceful shutdown.
//!
//! Internal modules:
//! - [`supervisor`]: lifecycle hooks, worker loops, shutdown driving;
//! - [`role`]: deterministic process-role assignment;
//! - [`process`]: process titles and atomic pid files;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod process;
mod role;
mod shutdown;
mod supervisor;

pub use role::ProcessRole;
pub use supervisor::Supervisor;
