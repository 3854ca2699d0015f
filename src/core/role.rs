//! # Process roles inside the group.
//!
//! Every process in the group gets a deterministic role: one master, one
//! manager, and a pool of workers split into event workers (request
//! handling) and task workers (long-lived background work). The role is a
//! pure function of (worker index, configured event-worker count) — no
//! stored state beyond the computed label used for process naming.

/// Role of one process in the group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessRole {
    /// Group leader: pid files, initial registration, config sync.
    Master,
    /// Supervises the worker pool; no coordination duty here.
    Manager,
    /// Handles requests on the event loop.
    EventWorker,
    /// Entitled to long-lived background work (the telemetry jobs).
    TaskWorker,
}

impl ProcessRole {
    /// Derives the role of a worker from its index.
    ///
    /// Indices at or above the event-worker count are task workers.
    pub fn for_worker(index: u32, worker_num: u32) -> Self {
        if index >= worker_num {
            ProcessRole::TaskWorker
        } else {
            ProcessRole::EventWorker
        }
    }

    /// Short label used in process titles and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessRole::Master => "master",
            ProcessRole::Manager => "manager",
            ProcessRole::EventWorker => "event worker",
            ProcessRole::TaskWorker => "task worker",
        }
    }

    /// Full process title, `"{app}.{server}: {role} process"`.
    pub fn title(&self, app: &str, server: &str) -> String {
        format!("{app}.{server}: {} process", self.label())
    }
}
