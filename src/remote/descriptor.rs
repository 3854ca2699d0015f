//! # Node descriptor parsing.
//!
//! A registration descriptor is configured as a single locator-style string:
//!
//! ```text
//! tars.tarsnode.ServerObj@tcp -h 127.0.0.1 -p 2345 -t 10000
//! ```
//!
//! [`RegistrationDescriptor::parse`] turns it into structured connection
//! parameters for the remote registry. Parsing is deterministic and total
//! for well-formed input; a missing `@` separator or any missing `-h`/`-p`/
//! `-t` flag fails with [`HostError::MalformedDescriptor`] — a partially
//! populated descriptor is never handed downstream.
//!
//! ## Rules
//! - Flag order is not guaranteed; tokens are whitespace-separated.
//! - `port` is kept as a string; numeric validation is the caller's concern.
//! - `timeout` is parsed to milliseconds because the scheduler needs a
//!   [`Duration`] bound for registry calls.

use std::time::Duration;

use crate::error::HostError;

/// Parsed connection parameters for the remote node registry.
///
/// Immutable once parsed; recomputed only if configuration is reloaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationDescriptor {
    /// Object name (substring before `@`).
    pub object_name: String,
    /// Transport mode token (after `@`, e.g. `tcp` or `udp`).
    pub mode: String,
    /// Registry host (`-h`).
    pub host: String,
    /// Registry port (`-p`), kept in string form.
    pub port: String,
    /// Call timeout in milliseconds (`-t`).
    pub timeout_ms: u64,
}

impl RegistrationDescriptor {
    /// Parses a descriptor string of the form
    /// `<objectName>@<mode> -h <host> -p <port> -t <timeoutMillis>`.
    ///
    /// Pure function: no side effects, no I/O.
    pub fn parse(descriptor: &str) -> Result<Self, HostError> {
        let malformed = |detail: &str| HostError::MalformedDescriptor {
            detail: detail.to_string(),
        };

        let mut tokens = descriptor.split_whitespace();
        let head = tokens.next().ok_or_else(|| malformed("empty descriptor"))?;
        let (object_name, mode) = head
            .split_once('@')
            .ok_or_else(|| malformed("missing '@' separator"))?;
        if object_name.is_empty() {
            return Err(malformed("empty object name before '@'"));
        }
        if mode.is_empty() {
            return Err(malformed("empty mode after '@'"));
        }

        let mut host = None;
        let mut port = None;
        let mut timeout = None;
        while let Some(flag) = tokens.next() {
            let value = tokens
                .next()
                .ok_or_else(|| malformed(&format!("flag '{flag}' has no value")))?;
            match flag {
                "-h" => host = Some(value.to_string()),
                "-p" => port = Some(value.to_string()),
                "-t" => timeout = Some(value.to_string()),
                // Unknown flags are tolerated so descriptor extensions do
                // not break older hosts.
                _ => {}
            }
        }

        let host = host.ok_or_else(|| malformed("missing '-h' flag"))?;
        let port = port.ok_or_else(|| malformed("missing '-p' flag"))?;
        let timeout = timeout.ok_or_else(|| malformed("missing '-t' flag"))?;
        let timeout_ms: u64 = timeout
            .parse()
            .map_err(|_| malformed(&format!("non-numeric '-t' value '{timeout}'")))?;

        Ok(Self {
            object_name: object_name.to_string(),
            mode: mode.to_string(),
            host,
            port,
            timeout_ms,
        })
    }

    /// The registry call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
