//! # Startup payload: everything the telemetry jobs need, in one value.
//!
//! [`StartupPayload`] is constructed once by the initiating process at
//! worker-spawn time, transmitted exactly once to the designated worker,
//! and then owned by the scheduler for the lifetime of its Running state —
//! the jobs never capture loose variables.

use std::time::Duration;

use crate::config::HostConfig;
use crate::error::HostError;
use crate::remote::{RegistrationDescriptor, ServiceIdentity, SocketMode, StatSubmission};

/// Fixed secondary registration identity: the administration adapter.
pub const ADMIN_ADAPTER: &str = "AdminAdapter";

/// One-shot bundle of startup parameters for the telemetry scheduler.
///
/// Consumed by [`TelemetryScheduler::start`](crate::telemetry::TelemetryScheduler::start)
/// and discarded after delivery; it has no further identity once consumed.
#[derive(Clone, Debug)]
pub struct StartupPayload {
    /// Application name.
    pub application: String,
    /// Server name.
    pub server_name: String,
    /// Master process id, reported with every registration.
    pub master_pid: u32,
    /// Primary adapter name.
    pub adapter: String,
    /// Parsed registry connection parameters.
    pub descriptor: RegistrationDescriptor,
    /// Client-reporting settings for the stat job.
    pub report: ReportSettings,
}

/// Client-side reporting settings embedded in the payload.
#[derive(Clone, Debug)]
pub struct ReportSettings {
    /// Locator address of the remote registry/directory service.
    pub locator: String,
    /// Logical name of the stat collection service.
    pub stat_service: String,
    /// Interval between stat submissions.
    pub interval: Duration,
}

impl StartupPayload {
    /// Builds the payload from static configuration, parsing the node
    /// descriptor string on the way.
    ///
    /// Fails with [`HostError::MalformedDescriptor`] on a bad descriptor —
    /// a configuration defect that must be visible at startup.
    pub fn from_config(cfg: &HostConfig, master_pid: u32) -> Result<Self, HostError> {
        let descriptor = RegistrationDescriptor::parse(&cfg.server.node)?;
        Ok(Self {
            application: cfg.server.app.clone(),
            server_name: cfg.server.server.clone(),
            master_pid,
            adapter: cfg.server.primary_adapter().unwrap_or_default().to_string(),
            descriptor,
            report: ReportSettings {
                locator: cfg.client.locator.clone(),
                stat_service: cfg.client.stat.clone(),
                interval: cfg.client.report_interval(),
            },
        })
    }

    /// Identity registered under the primary service adapter.
    pub fn primary_identity(&self) -> ServiceIdentity {
        ServiceIdentity {
            application: self.application.clone(),
            server_name: self.server_name.clone(),
            adapter: self.adapter.clone(),
            pid: self.master_pid,
        }
    }

    /// Identity registered under the fixed administration adapter.
    pub fn admin_identity(&self) -> ServiceIdentity {
        ServiceIdentity {
            application: self.application.clone(),
            server_name: self.server_name.clone(),
            adapter: ADMIN_ADAPTER.to_string(),
            pid: self.master_pid,
        }
    }

    /// `"{app}.{server}"`, the same joined identity
    /// [`ServerConfig::service_name`](crate::ServerConfig::service_name)
    /// produces for titles.
    pub fn service_name(&self) -> String {
        format!("{}.{}", self.application, self.server_name)
    }

    /// The stat submission issued on every stat-report tick.
    pub fn stat_submission(&self) -> StatSubmission {
        StatSubmission {
            locator: self.report.locator.clone(),
            socket_mode: SocketMode::Persistent,
            stat_service: self.report.stat_service.clone(),
            server_name: self.service_name(),
            report_interval: self.report.interval,
        }
    }
}
