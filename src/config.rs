//! # Host configuration.
//!
//! [`HostConfig`] is built once at process start and passed by reference
//! into each component's constructor — there is no ambient global state.
//! It mirrors the static server/client configuration of the deployment
//! platform: identity, listen address, worker counts, the node descriptor
//! string, adapters, client reporting settings, and the config-sync paths.
//!
//! Configuration is plain data: `serde` derive with a YAML loader for
//! deployments, `Default` for tests and embedding.
//!
//! # Example
//! ```
//! use herald::HostConfig;
//!
//! let mut cfg = HostConfig::default();
//! cfg.server.app = "shop".into();
//! cfg.server.server = "orders".into();
//! cfg.server.worker_num = 4;
//!
//! assert_eq!(cfg.server.service_name(), "shop.orders");
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Top-level host configuration: server side plus client-reporting side.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Server identity, listen address, workers, paths.
    pub server: ServerConfig,
    /// Client settings used for stat reporting and config fetches.
    pub client: ClientConfig,
}

impl HostConfig {
    /// Loads configuration from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| HostError::ConfigLoad {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        serde_yaml::from_str(&raw).map_err(|e| HostError::ConfigLoad {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }
}

/// Server-side static configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Application name (first half of the service identity).
    pub app: String,
    /// Server name (second half of the service identity).
    pub server: String,
    /// Listen host for the external request listener.
    pub listen_host: String,
    /// Listen port for the external request listener.
    pub listen_port: u16,
    /// Number of event-worker processes.
    pub worker_num: u32,
    /// Number of task-worker processes.
    pub task_worker_num: u32,
    /// Wire protocol name served by the listener (informational here).
    pub protocol_name: String,
    /// Transport type served by the listener (informational here).
    pub serv_type: String,
    /// Node registry descriptor string, e.g.
    /// `tars.tarsnode.ServerObj@tcp -h 127.0.0.1 -p 2345 -t 10000`.
    pub node: String,
    /// Adapter names; the first one is the primary registration identity.
    pub adapters: Vec<String>,
    /// Base path the service was deployed under.
    pub base_path: PathBuf,
    /// Data path for runtime state; relative pid-file paths resolve here.
    pub data_path: PathBuf,
    /// Path of the master pid file (relative means under `data_path`).
    pub master_pid_file: PathBuf,
    /// Path of the manager pid file (relative means under `data_path`).
    pub manager_pid_file: PathBuf,
    /// Maximum time to wait for graceful shutdown before force-terminating,
    /// in milliseconds.
    pub shutdown_grace_ms: u64,
    /// Subdirectory (under `base_path`) that synced config files land in.
    pub config_save_dir: PathBuf,
    /// Logical filenames to sync from the remote config store.
    /// Blank entries are tolerated and filtered out before use.
    pub config_files: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app: String::new(),
            server: String::new(),
            listen_host: "0.0.0.0".into(),
            listen_port: 8088,
            worker_num: 4,
            task_worker_num: 1,
            protocol_name: "tars".into(),
            serv_type: "tcp".into(),
            node: String::new(),
            adapters: Vec::new(),
            base_path: PathBuf::from("."),
            data_path: PathBuf::from("."),
            master_pid_file: PathBuf::from("master.pid"),
            manager_pid_file: PathBuf::from("manager.pid"),
            shutdown_grace_ms: 30_000,
            config_save_dir: PathBuf::from("conf"),
            config_files: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `"{app}.{server}"`, used for process titles and stat tagging.
    pub fn service_name(&self) -> String {
        format!("{}.{}", self.app, self.server)
    }

    /// The primary adapter name, if any adapter is configured.
    pub fn primary_adapter(&self) -> Option<&str> {
        self.adapters.first().map(String::as_str)
    }

    /// Total size of the worker group (event workers + task workers).
    pub fn total_workers(&self) -> u32 {
        self.worker_num + self.task_worker_num
    }

    /// The shutdown grace window as a [`Duration`].
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Resolved master pid-file path.
    pub fn master_pid_path(&self) -> PathBuf {
        self.runtime_path(&self.master_pid_file)
    }

    /// Resolved manager pid-file path.
    pub fn manager_pid_path(&self) -> PathBuf {
        self.runtime_path(&self.manager_pid_file)
    }

    fn runtime_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_path.join(path)
        }
    }
}

/// Client-side settings: where to report stats and fetch config from.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Locator address of the remote registry/directory service.
    pub locator: String,
    /// Module name this client reports under.
    pub module_name: String,
    /// Logical name of the stat collection service.
    pub stat: String,
    /// Interval between stat submissions, in milliseconds.
    pub report_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            locator: String::new(),
            module_name: String::new(),
            stat: String::new(),
            report_interval_ms: 60_000,
        }
    }
}

impl ClientConfig {
    /// The stat report interval as a [`Duration`].
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_joins_app_and_server() {
        let mut cfg = ServerConfig::default();
        cfg.app = "shop".into();
        cfg.server = "orders".into();
        assert_eq!(cfg.service_name(), "shop.orders");
    }

    #[test]
    fn test_relative_pid_files_resolve_under_data_path() {
        let mut cfg = ServerConfig::default();
        cfg.data_path = PathBuf::from("/var/run/orders");
        assert_eq!(cfg.master_pid_path(), PathBuf::from("/var/run/orders/master.pid"));
        assert_eq!(cfg.manager_pid_path(), PathBuf::from("/var/run/orders/manager.pid"));

        cfg.master_pid_file = PathBuf::from("/tmp/override.pid");
        assert_eq!(cfg.master_pid_path(), PathBuf::from("/tmp/override.pid"));
    }

    #[test]
    fn test_yaml_round_trip_defaults_missing_fields() {
        let yaml = r#"
server:
  app: shop
  server: orders
  node: "tars.tarsnode.ServerObj@tcp -h 127.0.0.1 -p 2345 -t 10000"
  adapters: ["shop.orders.objAdapter"]
client:
  locator: "tars.tarsregistry.QueryObj@tcp -h 127.0.0.1 -p 17890"
  stat: "tars.tarsstat.StatObj"
"#;
        let cfg: HostConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.server.app, "shop");
        assert_eq!(cfg.server.worker_num, 4);
        assert_eq!(cfg.server.primary_adapter(), Some("shop.orders.objAdapter"));
        assert_eq!(cfg.client.report_interval(), Duration::from_millis(60_000));
    }
}
