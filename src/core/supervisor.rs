//! # Supervisor: process-group orchestration and lifecycle hooks.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the remote
//! seams, the one-shot [`TaskDispatcher`], and the [`TelemetryScheduler`].
//! It binds the listener, spawns the worker group, and implements the
//! lifecycle hooks the external listener/proxy collaborator drives.
//!
//! ## Lifecycle wiring
//! ```text
//! run():
//!   bind listener ──► GroupStarted
//!   on_master_start():
//!     set title ─► write master/manager pid files (atomic replace)
//!     one-shot keep-alive (primary + AdminAdapter)
//!     ConfigSync over the configured filename list
//!   on_manager_start(): set title
//!   spawn worker 0..N+M:
//!     on_worker_start(i):
//!       role = EventWorker (i < worker_num) | TaskWorker (i >= worker_num)
//!       i == 0: attach inbox, build StartupPayload, dispatch (exactly once)
//!     designated worker: inbox.recv() ──► on_task_received(payload)
//!                                              └─► TelemetryScheduler::start
//!   drive shutdown:
//!     signal ─► ShutdownRequested ─► cancel workers ─► grace window
//! ```
//!
//! ## Rules
//! - Hooks with no coordination duty here (connection open/close, data
//!   received) are pass-through no-ops for the request-handling
//!   collaborator.
//! - Remote-call failures at master start are reported and do not abort the
//!   boot; a malformed node descriptor does (configuration defect).
//! - Only the master writes pid files; only ConfigSync writes config files.

use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::HostConfig;
use crate::core::process::{set_process_title, write_pid_file};
use crate::core::role::ProcessRole;
use crate::core::shutdown;
use crate::error::HostError;
use crate::events::{Bus, Event, EventKind};
use crate::remote::{ConfigFileSpec, ConfigStore, ConfigSync, NodeRegistry, StatReporter, SyncReport};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::telemetry::{
    keep_alive_once, PayloadInbox, StartupPayload, TaskDispatcher, TelemetryScheduler,
};

/// Worker index that receives the startup payload, by convention.
const DESIGNATED_WORKER: u32 = 0;

/// Coordinates the process group: roles, pid files, one-shot dispatch, and
/// the telemetry scheduler, with event delivery via [`SubscriberSet`].
pub struct Supervisor {
    /// Static host configuration, built once at process start.
    pub cfg: HostConfig,
    /// Event bus shared with all components.
    pub bus: Bus,

    // Taken by the listener task on run(); the task owns the set and
    // flushes it when the bus closes.
    subs: Mutex<Option<SubscriberSet>>,
    registry: Arc<dyn NodeRegistry>,
    dispatcher: TaskDispatcher,
    scheduler: TelemetryScheduler,
    sync: ConfigSync,
    pid: u32,
}

impl Supervisor {
    /// Creates a new supervisor over the given remote seams and subscribers.
    pub fn new(
        cfg: HostConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
        registry: Arc<dyn NodeRegistry>,
        stats: Arc<dyn StatReporter>,
        store: Arc<dyn ConfigStore>,
    ) -> Arc<Self> {
        let bus = Bus::new(1024);
        let subs = Mutex::new(Some(SubscriberSet::new(subscribers)));
        let dispatcher = TaskDispatcher::new(DESIGNATED_WORKER, bus.clone());
        let scheduler = TelemetryScheduler::new(registry.clone(), stats, bus.clone());
        let sync = ConfigSync::new(store, bus.clone());

        Arc::new(Self {
            cfg,
            bus,
            subs,
            registry,
            dispatcher,
            scheduler,
            sync,
            pid: std::process::id(),
        })
    }

    /// Runs the process group until all workers exit or a termination
    /// signal arrives (graceful shutdown, possibly ending in
    /// [`HostError::GraceExceeded`]).
    pub async fn run(self: Arc<Self>) -> Result<(), HostError> {
        let addr = format!(
            "{}:{}",
            self.cfg.server.listen_host, self.cfg.server.listen_port
        );
        // The request path belongs to the external proxy collaborator; the
        // supervisor only claims the address for the group's lifetime.
        let _listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| HostError::Bind { addr, source })?;
        self.bus.publish(Event::now(EventKind::GroupStarted));
        self.subscriber_listener();

        self.on_master_start().await?;
        self.on_manager_start();

        let token = CancellationToken::new();
        let mut set = JoinSet::new();
        for worker_id in 0..self.cfg.server.total_workers() {
            let sup = Arc::clone(&self);
            let child = token.child_token();
            set.spawn(worker_loop(sup, worker_id, child));
        }

        self.drive_shutdown(&mut set, &token).await
    }

    /// Master-start hook: title, pid files, immediate registration, config
    /// sync.
    ///
    /// The one-shot keep-alive is an "I am alive now" signal independent of
    /// the recurring heartbeat job; its failures are reported, not fatal.
    pub async fn on_master_start(&self) -> Result<(), HostError> {
        let server = &self.cfg.server;
        set_process_title(&ProcessRole::Master.title(&server.app, &server.server));

        write_pid_file(&server.master_pid_path(), self.pid)?;
        write_pid_file(&server.manager_pid_path(), self.pid)?;

        let payload = StartupPayload::from_config(&self.cfg, self.pid)?;
        for identity in [payload.primary_identity(), payload.admin_identity()] {
            keep_alive_once(
                self.registry.as_ref(),
                &self.bus,
                &payload.descriptor,
                &identity,
            )
            .await;
        }

        self.bus.publish(Event::now(EventKind::MasterStarted));
        self.sync_config().await;
        Ok(())
    }

    /// Manager-start hook: sets the process title. No other behavior.
    pub fn on_manager_start(&self) {
        let server = &self.cfg.server;
        set_process_title(&ProcessRole::Manager.title(&server.app, &server.server));
        self.bus.publish(Event::now(EventKind::ManagerStarted));
    }

    /// Worker-start hook: role assignment, title, and — for the designated
    /// worker — payload construction and one-shot dispatch.
    ///
    /// Returns the payload inbox for the designated worker (`None` for all
    /// others); the caller receives on it and feeds
    /// [`Supervisor::on_task_received`].
    pub fn on_worker_start(&self, worker_id: u32) -> Result<Option<PayloadInbox>, HostError> {
        let server = &self.cfg.server;
        let role = ProcessRole::for_worker(worker_id, server.worker_num);
        set_process_title(&role.title(&server.app, &server.server));
        self.bus.publish(
            Event::now(EventKind::WorkerStarted)
                .with_worker(worker_id)
                .with_reason(role.label()),
        );

        let inbox = self.dispatcher.attach(worker_id);
        if worker_id == self.dispatcher.target() {
            let payload = StartupPayload::from_config(&self.cfg, self.pid)?;
            self.dispatcher.dispatch(payload)?;
        }
        Ok(inbox)
    }

    /// One-shot task hook: the designated worker received the payload and
    /// starts the recurring jobs.
    pub fn on_task_received(&self, payload: StartupPayload) -> Result<(), HostError> {
        self.scheduler.start(payload)
    }

    /// One-shot task completion hook. Nothing to coordinate here.
    pub fn on_task_finished(&self) {}

    /// Worker-stop hook: stops the scheduler if this worker slot ran it.
    pub fn on_worker_stop(&self, worker_id: u32) {
        if worker_id == self.dispatcher.target() {
            self.scheduler.stop();
        }
        self.bus
            .publish(Event::now(EventKind::WorkerStopped).with_worker(worker_id));
    }

    /// Connection-open hook: pass-through for the request collaborator.
    pub fn on_connection_open(&self, _fd: u64) {}

    /// Data-received hook: pass-through for the request collaborator.
    pub fn on_data_received(&self, _fd: u64, _data: &[u8]) {}

    /// Connection-close hook: pass-through for the request collaborator.
    pub fn on_connection_close(&self, _fd: u64) {}

    /// True while the telemetry jobs are armed (in this process).
    pub fn scheduler_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Pulls the configured remote config files to their local paths.
    pub async fn sync_config(&self) -> SyncReport {
        let server = &self.cfg.server;
        let specs = ConfigFileSpec::from_list(
            &server.config_files,
            &server.base_path,
            &server.config_save_dir,
        );
        self.sync.sync(&server.app, &server.server, specs).await
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget). When the bus closes, queued events are flushed
    /// before the subscriber workers exit.
    fn subscriber_listener(&self) {
        let Some(set) = self.subs.lock().expect("subscriber set lock poisoned").take() else {
            return;
        };
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        });
    }

    /// Waits until either all workers finish or a shutdown signal is
    /// received; then waits out the grace window.
    async fn drive_shutdown(
        &self,
        set: &mut JoinSet<()>,
        token: &CancellationToken,
    ) -> Result<(), HostError> {
        tokio::select! {
            _ = shutdown::wait_for_shutdown_signal() => {
                self.bus.publish(Event::now(EventKind::ShutdownRequested));
                token.cancel();
                self.wait_all_with_grace(set).await
            }
            _ = async { while set.join_next().await.is_some() {} } => {
                Ok(())
            }
        }
    }

    /// Waits for all workers to finish within the configured grace period.
    async fn wait_all_with_grace(&self, set: &mut JoinSet<()>) -> Result<(), HostError> {
        let grace = self.cfg.server.grace();
        let done = async { while set.join_next().await.is_some() {} };

        match tokio::time::timeout(grace, done).await {
            Ok(_) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                Err(HostError::GraceExceeded { grace })
            }
        }
    }
}

/// One worker slot: start hook, optional payload wait, stop hook.
///
/// The designated worker parks on its inbox; receiving the payload starts
/// the scheduler in this slot. Every worker parks until cancellation so the
/// stop hook runs on the way out.
async fn worker_loop(sup: Arc<Supervisor>, worker_id: u32, token: CancellationToken) {
    let inbox = match sup.on_worker_start(worker_id) {
        Ok(inbox) => inbox,
        Err(e) => {
            eprintln!("[herald] worker {worker_id} start failed: {e}");
            return;
        }
    };

    match inbox {
        Some(mut inbox) => {
            tokio::select! {
                _ = token.cancelled() => {}
                payload = inbox.recv() => {
                    if let Some(payload) = payload {
                        if let Err(e) = sup.on_task_received(payload) {
                            eprintln!("[herald] scheduler start failed: {e}");
                        }
                        sup.on_task_finished();
                    }
                    token.cancelled().await;
                }
            }
        }
        None => token.cancelled().await,
    }

    sup.on_worker_stop(worker_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::remote::{RegistrationDescriptor, ServiceIdentity, StatSubmission};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeRegistry {
        calls: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl NodeRegistry for FakeRegistry {
        async fn keep_alive(
            &self,
            _descriptor: &RegistrationDescriptor,
            identity: &ServiceIdentity,
        ) -> Result<(), RemoteError> {
            self.calls.lock().unwrap().push(identity.adapter.clone());
            Ok(())
        }
    }

    struct FakeStats;

    #[async_trait]
    impl StatReporter for FakeStats {
        async fn submit(&self, _submission: &StatSubmission) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    struct FakeStore;

    #[async_trait]
    impl ConfigStore for FakeStore {
        async fn fetch(
            &self,
            _app: &str,
            _server: &str,
            filename: &str,
        ) -> Result<String, RemoteError> {
            match filename {
                "a.conf" => Ok("x=1".into()),
                _ => Ok(String::new()),
            }
        }
    }

    fn config(dir: &std::path::Path) -> HostConfig {
        let mut cfg = HostConfig::default();
        cfg.server.app = "shop".into();
        cfg.server.server = "orders".into();
        cfg.server.worker_num = 4;
        cfg.server.task_worker_num = 1;
        cfg.server.node = "tars.tarsnode.ServerObj@tcp -h 127.0.0.1 -p 2345 -t 10000".into();
        cfg.server.adapters = vec!["shop.orders.objAdapter".into()];
        cfg.server.base_path = dir.to_path_buf();
        cfg.server.config_save_dir = "".into();
        // Default pid-file names stay relative and resolve under data_path.
        cfg.server.data_path = dir.to_path_buf();
        cfg.server.config_files = vec!["".into(), "a.conf".into(), "b.conf".into()];
        cfg.client.locator = "tars.tarsregistry.QueryObj@tcp -h 127.0.0.1 -p 17890".into();
        cfg.client.stat = "tars.tarsstat.StatObj".into();
        cfg
    }

    fn supervisor(dir: &std::path::Path, registry: Arc<FakeRegistry>) -> Arc<Supervisor> {
        Supervisor::new(
            config(dir),
            Vec::new(),
            registry,
            Arc::new(FakeStats),
            Arc::new(FakeStore),
        )
    }

    #[tokio::test]
    async fn test_master_start_pid_files_registration_and_sync() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FakeRegistry::new();
        let sup = supervisor(dir.path(), registry.clone());

        sup.on_master_start().await.unwrap();

        let pid = std::process::id().to_string();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("master.pid")).unwrap(),
            pid
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("manager.pid")).unwrap(),
            pid
        );
        assert_eq!(
            *registry.calls.lock().unwrap(),
            vec!["shop.orders.objAdapter", "AdminAdapter"]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.conf")).unwrap(),
            "x=1"
        );
        assert!(!dir.path().join("b.conf").exists());
    }

    #[tokio::test]
    async fn test_master_start_fails_fast_on_bad_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.server.node = "garbage".into();
        let sup = Supervisor::new(
            cfg,
            Vec::new(),
            FakeRegistry::new(),
            Arc::new(FakeStats),
            Arc::new(FakeStore),
        );

        let err = sup.on_master_start().await.unwrap_err();
        assert_eq!(err.as_label(), "malformed_descriptor");
    }

    #[tokio::test]
    async fn test_designated_worker_gets_payload_and_starts_scheduler_once() {
        let dir = tempfile::tempdir().unwrap();
        let sup = supervisor(dir.path(), FakeRegistry::new());

        // Non-designated workers get no inbox and trigger no dispatch.
        assert!(sup.on_worker_start(2).unwrap().is_none());

        let mut inbox = sup.on_worker_start(0).unwrap().expect("inbox for worker 0");
        let payload = inbox.recv().await.unwrap();
        assert_eq!(payload.application, "shop");

        sup.on_task_received(payload.clone()).unwrap();
        assert!(sup.scheduler_running());

        // A second start in the same boot is a programmer error.
        let err = sup.on_task_received(payload).unwrap_err();
        assert_eq!(err.as_label(), "already_running");
    }

    #[tokio::test]
    async fn test_subscribers_receive_bus_events() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Seen(Arc<AtomicUsize>);

        #[async_trait]
        impl Subscribe for Seen {
            async fn on_event(&self, _e: &Event) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            fn name(&self) -> &'static str {
                "seen"
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let sup = Supervisor::new(
            config(dir.path()),
            vec![Arc::new(Seen(seen.clone()))],
            FakeRegistry::new(),
            Arc::new(FakeStats),
            Arc::new(FakeStore),
        );

        sup.subscriber_listener();
        sup.on_manager_start();
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_worker_restart_cannot_redispatch() {
        let dir = tempfile::tempdir().unwrap();
        let sup = supervisor(dir.path(), FakeRegistry::new());

        let _inbox = sup.on_worker_start(0).unwrap().expect("inbox");
        // The same slot starting again in this boot must not re-send.
        let err = sup.on_worker_start(0).unwrap_err();
        assert_eq!(err.as_label(), "duplicate_dispatch");
    }

    #[tokio::test]
    async fn test_worker_stop_stops_the_scheduler() {
        let dir = tempfile::tempdir().unwrap();
        let sup = supervisor(dir.path(), FakeRegistry::new());

        let mut inbox = sup.on_worker_start(0).unwrap().expect("inbox");
        let payload = inbox.recv().await.unwrap();
        sup.on_task_received(payload).unwrap();
        assert!(sup.scheduler_running());

        sup.on_worker_stop(3);
        assert!(sup.scheduler_running(), "other workers do not stop it");
        sup.on_worker_stop(0);
        assert!(!sup.scheduler_running());
    }
}
