//! # Telemetry scheduler: the two recurring background jobs.
//!
//! [`TelemetryScheduler`] owns the heartbeat and stat-report jobs once
//! started. It runs in exactly one worker — the one that received the
//! [`StartupPayload`] — and never in more than one process concurrently.
//!
//! ## State machine
//! ```text
//! {Idle} ── start(payload) ──► {Running(heartbeat, stat)} ── stop() ──► {Stopped}
//!
//! start while Running  → AlreadyRunning (programmer error)
//! start after stop     → new logical run
//! ```
//!
//! ## Jobs
//! - **Heartbeat**, fixed 10 s interval: two keep-alive registry calls per
//!   tick — primary adapter identity, then the fixed administration
//!   adapter identity — against the endpoint from the embedded descriptor,
//!   each bounded by the descriptor's timeout.
//! - **Stat report**, interval from the embedded client settings: one
//!   submission per tick, bounded by the report interval.
//!
//! ## Rules
//! - A failure on either call of a tick is published to the bus and the
//!   timer keeps going; the next tick proceeds independently.
//! - The two jobs tick independently and may interleave; no ordering is
//!   guaranteed between them.
//! - The first tick fires one full interval after `start`, never before.
//! - `stop` cancels both timers; no tick begins after it returns. A remote
//!   call already in flight may be abandoned (calls are idempotent).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{HostError, RemoteError};
use crate::events::{Bus, Event, EventKind};
use crate::remote::{NodeRegistry, RegistrationDescriptor, ServiceIdentity, StatReporter};
use crate::telemetry::StartupPayload;

/// Fixed interval between heartbeat ticks.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(10_000);

enum State {
    Idle,
    Running { token: CancellationToken },
    Stopped,
}

/// Drives the heartbeat and stat-report jobs for one service instance.
pub struct TelemetryScheduler {
    registry: Arc<dyn NodeRegistry>,
    stats: Arc<dyn StatReporter>,
    bus: Bus,
    state: Mutex<State>,
}

impl TelemetryScheduler {
    /// Creates an idle scheduler over the given remote seams.
    pub fn new(registry: Arc<dyn NodeRegistry>, stats: Arc<dyn StatReporter>, bus: Bus) -> Self {
        Self {
            registry,
            stats,
            bus,
            state: Mutex::new(State::Idle),
        }
    }

    /// Arms both timers and enters the Running state.
    ///
    /// The payload is consumed here: the jobs own it for the lifetime of
    /// the run instead of capturing loose variables.
    ///
    /// # Errors
    /// [`HostError::AlreadyRunning`] if called while Running — a
    /// programmer-level misuse that should not occur in correct operation.
    pub fn start(&self, payload: StartupPayload) -> Result<(), HostError> {
        let mut state = self.state.lock().expect("scheduler state lock poisoned");
        if matches!(*state, State::Running { .. }) {
            return Err(HostError::AlreadyRunning);
        }

        let token = CancellationToken::new();

        tokio::spawn(heartbeat_job(
            Arc::clone(&self.registry),
            self.bus.clone(),
            payload.clone(),
            token.child_token(),
        ));
        tokio::spawn(stat_job(
            Arc::clone(&self.stats),
            self.bus.clone(),
            payload,
            token.child_token(),
        ));

        *state = State::Running { token };
        self.bus.publish(Event::now(EventKind::SchedulerStarted));
        Ok(())
    }

    /// Cancels both timers. No tick begins after this returns.
    ///
    /// Idempotent; stopping an idle scheduler just moves it to Stopped.
    pub fn stop(&self) {
        let mut state = self.state.lock().expect("scheduler state lock poisoned");
        if let State::Running { token } = &*state {
            token.cancel();
            self.bus.publish(Event::now(EventKind::SchedulerStopped));
        }
        *state = State::Stopped;
    }

    /// True while the jobs are armed.
    pub fn is_running(&self) -> bool {
        matches!(
            *self.state.lock().expect("scheduler state lock poisoned"),
            State::Running { .. }
        )
    }
}

/// Heartbeat job: two registration calls per tick, failures isolated.
async fn heartbeat_job(
    registry: Arc<dyn NodeRegistry>,
    bus: Bus,
    payload: StartupPayload,
    token: CancellationToken,
) {
    let mut ticker = time::interval_at(
        Instant::now() + HEARTBEAT_INTERVAL,
        HEARTBEAT_INTERVAL,
    );

    loop {
        // Cancellation outranks a due tick: once stop() has run, the tick
        // that was pending alongside it must not begin.
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if token.is_cancelled() {
            break;
        }

        for identity in [payload.primary_identity(), payload.admin_identity()] {
            keep_alive_once(registry.as_ref(), &bus, &payload.descriptor, &identity).await;
        }
    }
}

/// Issues one bounded keep-alive call and publishes its outcome.
///
/// Shared with the supervisor's one-shot master-start registration so both
/// paths bound and report registry calls the same way.
pub(crate) async fn keep_alive_once(
    registry: &dyn NodeRegistry,
    bus: &Bus,
    descriptor: &RegistrationDescriptor,
    identity: &ServiceIdentity,
) {
    let bound = descriptor.timeout();
    let call = registry.keep_alive(descriptor, identity);
    let outcome = match time::timeout(bound, call).await {
        Ok(res) => res,
        Err(_) => Err(RemoteError::timeout(descriptor.object_name.clone(), bound)),
    };

    let ev = match outcome {
        Ok(()) => Event::now(EventKind::RegistrationSent),
        Err(e) => Event::now(EventKind::RegistrationFailed).with_reason(e.to_string()),
    };
    bus.publish(ev.with_adapter(identity.adapter.as_str()));
}

/// Stat-report job: one submission per tick, failures isolated.
async fn stat_job(
    stats: Arc<dyn StatReporter>,
    bus: Bus,
    payload: StartupPayload,
    token: CancellationToken,
) {
    let interval = payload.report.interval;
    if interval.is_zero() {
        // Reporting disabled; nothing to arm.
        return;
    }
    let submission = payload.stat_submission();
    let mut ticker = time::interval_at(Instant::now() + interval, interval);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if token.is_cancelled() {
            break;
        }

        let outcome = match time::timeout(interval, stats.submit(&submission)).await {
            Ok(res) => res,
            Err(_) => Err(RemoteError::timeout(submission.stat_service.clone(), interval)),
        };
        let ev = match outcome {
            Ok(()) => Event::now(EventKind::StatReported),
            Err(e) => Event::now(EventKind::StatFailed).with_reason(e.to_string()),
        };
        bus.publish(ev);
    }
}
