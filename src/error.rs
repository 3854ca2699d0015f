//! Error types used by the host runtime and its remote-call seams.
//!
//! This module defines two main error enums:
//!
//! - [`HostError`] — errors raised by the coordination runtime itself
//!   (descriptor parsing, dispatch misuse, scheduler misuse, local writes).
//! - [`RemoteError`] — failures of calls into the remote registry, stat
//!   service, or config store.
//!
//! `RemoteError` values are always consumed at the tick (or per-file)
//! boundary: the caller logs them through the event bus and continues.
//! `HostError` values indicate configuration or integration defects and
//! propagate to the immediate caller.
//!
//! Both types provide `as_label` for stable snake_case identifiers in
//! logs and reports.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by the coordination runtime.
///
/// These indicate defects that must be visible at startup (bad descriptor
/// string, dispatch to a worker that is not there, scheduler misuse) or an
/// isolated local persistence failure.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HostError {
    /// The node descriptor string could not be parsed.
    #[error("malformed node descriptor: {detail}")]
    MalformedDescriptor {
        /// What was missing or unreadable.
        detail: String,
    },

    /// The designated worker's inbox was not attached at dispatch time.
    #[error("no recipient for startup payload: worker {index} is not running")]
    NoRecipient {
        /// Target worker index.
        index: u32,
    },

    /// A second dispatch was attempted within the same boot.
    #[error("startup payload already dispatched this boot")]
    DuplicateDispatch,

    /// `start` was called while the scheduler was already running.
    #[error("telemetry scheduler already running")]
    AlreadyRunning,

    /// A local file write failed (pid file or synced config file).
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Target path of the failed write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be read or parsed.
    #[error("failed to load config {path}: {detail}")]
    ConfigLoad {
        /// Path of the configuration file.
        path: PathBuf,
        /// Read or parse failure message.
        detail: String,
    },

    /// The listener could not bind its configured address.
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        /// The host:port that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Shutdown grace period was exceeded; some workers remained stuck.
    #[error("shutdown grace {grace:?} exceeded; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },

    /// A remote call failed; carried here when a batch report needs one
    /// error type per entry (config sync).
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl HostError {
    /// Returns a short stable label (snake_case) for use in logs/reports.
    pub fn as_label(&self) -> &'static str {
        match self {
            HostError::MalformedDescriptor { .. } => "malformed_descriptor",
            HostError::NoRecipient { .. } => "no_recipient",
            HostError::DuplicateDispatch => "duplicate_dispatch",
            HostError::AlreadyRunning => "already_running",
            HostError::FileWrite { .. } => "file_write",
            HostError::ConfigLoad { .. } => "config_load",
            HostError::Bind { .. } => "listener_bind",
            HostError::GraceExceeded { .. } => "grace_exceeded",
            HostError::Remote(e) => e.as_label(),
        }
    }
}

/// Failures of calls into a remote service (registry, stat, config store).
///
/// Always non-fatal to the runtime: the tick or batch entry that issued the
/// call reports the failure and moves on.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The remote endpoint rejected the call or the transport failed.
    #[error("remote call to {target} failed: {detail}")]
    Call {
        /// Logical name of the remote endpoint.
        target: String,
        /// Transport- or service-level failure message.
        detail: String,
    },

    /// The call did not complete within its bounded timeout.
    #[error("remote call to {target} timed out after {timeout:?}")]
    Timeout {
        /// Logical name of the remote endpoint.
        target: String,
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl RemoteError {
    /// Returns a short stable label (snake_case) for use in logs/reports.
    pub fn as_label(&self) -> &'static str {
        match self {
            RemoteError::Call { .. } => "remote_call_failed",
            RemoteError::Timeout { .. } => "remote_call_timeout",
        }
    }

    /// Convenience constructor for a failed call.
    pub fn call(target: impl Into<String>, detail: impl Into<String>) -> Self {
        RemoteError::Call {
            target: target.into(),
            detail: detail.into(),
        }
    }

    /// Convenience constructor for a timed-out call.
    pub fn timeout(target: impl Into<String>, timeout: Duration) -> Self {
        RemoteError::Timeout {
            target: target.into(),
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let e = HostError::MalformedDescriptor {
            detail: "missing @".into(),
        };
        assert_eq!(e.as_label(), "malformed_descriptor");

        let e = HostError::AlreadyRunning;
        assert_eq!(e.as_label(), "already_running");

        let e = HostError::from(RemoteError::call("tarsnode", "refused"));
        assert_eq!(e.as_label(), "remote_call_failed");
    }

    #[test]
    fn test_timeout_message_names_target() {
        let e = RemoteError::timeout("tarsstat", Duration::from_millis(250));
        let msg = e.to_string();
        assert!(msg.contains("tarsstat"));
        assert!(msg.contains("250ms"));
    }
}
