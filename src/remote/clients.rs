//! # Remote-service seams.
//!
//! The wire encoding of the registry, stat, and config protocols is owned by
//! an external collaborator. This module defines the async traits that the
//! coordination runtime drives calls through, plus the value types those
//! calls carry.
//!
//! ## Contract
//! - All methods return explicit `Result<_, RemoteError>` values; callers at
//!   the tick (or per-file) boundary decide to log-and-continue. No
//!   swallow-and-log inside implementations.
//! - Calls may block on network I/O; callers bound them with
//!   `tokio::time::timeout` so a stalled remote cannot stall the worker's
//!   event loop.
//! - Registration and stat calls are idempotent and safe to abandon
//!   mid-flight.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::remote::RegistrationDescriptor;

/// Identity of this service instance as presented to the remote registry.
///
/// Immutable after process start; one value per adapter identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceIdentity {
    /// Application name.
    pub application: String,
    /// Server name.
    pub server_name: String,
    /// Adapter name this identity registers under.
    pub adapter: String,
    /// Master process id.
    pub pid: u32,
}

/// Socket mode used when talking to the stat service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketMode {
    /// Short-lived connection per call.
    Transient,
    /// Long-lived connection reused across calls.
    Persistent,
}

impl SocketMode {
    /// Wire code understood by the platform (`2` = persistent).
    pub fn code(&self) -> u8 {
        match self {
            SocketMode::Transient => 1,
            SocketMode::Persistent => 2,
        }
    }
}

/// One statistics submission to the remote stat service.
#[derive(Clone, Debug)]
pub struct StatSubmission {
    /// Locator address used to resolve the stat service.
    pub locator: String,
    /// Socket mode for the stat connection.
    pub socket_mode: SocketMode,
    /// Logical name of the stat service.
    pub stat_service: String,
    /// Name of this service, tagging the submitted data.
    pub server_name: String,
    /// Reporting interval, also bounding the call.
    pub report_interval: std::time::Duration,
}

/// Remote node registry: keep-alive registration calls.
#[async_trait]
pub trait NodeRegistry: Send + Sync + 'static {
    /// Registers `identity` as alive with the registry endpoint described
    /// by `descriptor` (host, port, object name).
    async fn keep_alive(
        &self,
        descriptor: &RegistrationDescriptor,
        identity: &ServiceIdentity,
    ) -> Result<(), RemoteError>;
}

/// Remote statistics collection service.
#[async_trait]
pub trait StatReporter: Send + Sync + 'static {
    /// Submits one round of usage statistics.
    async fn submit(&self, submission: &StatSubmission) -> Result<(), RemoteError>;
}

/// Remote configuration store.
#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// Fetches the content of one logical config file under (app, server).
    ///
    /// An empty string signals "nothing to write".
    async fn fetch(&self, app: &str, server: &str, filename: &str)
        -> Result<String, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_mode_wire_codes() {
        assert_eq!(SocketMode::Transient.code(), 1);
        assert_eq!(SocketMode::Persistent.code(), 2);
    }
}
