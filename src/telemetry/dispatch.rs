//! # One-shot payload dispatch to the designated worker.
//!
//! [`TaskDispatcher`] hands the [`StartupPayload`] from the spawning context
//! to exactly one worker, exactly once per process-group boot. The original
//! same-process callback plus framework task queue is modeled as an explicit
//! message-passing channel into the designated worker's inbox; no shared
//! mutable state crosses the boundary.
//!
//! ## Rules
//! - **At-most-once**: a boot-scoped flag guards `dispatch`; a duplicate
//!   attempt is rejected with [`HostError::DuplicateDispatch`] instead of
//!   silently duplicating the recurring jobs.
//! - **Single recipient**: only the worker whose index matches the
//!   dispatcher's target can attach the inbox; the payload is never
//!   broadcast.
//! - **Recipient must be up**: dispatching before the inbox is attached
//!   fails with [`HostError::NoRecipient`] and does **not** consume the
//!   once flag — callers are expected to dispatch from a callback that
//!   fires after the target worker has started.
//! - **Fire-and-forget**: the sender never blocks on scheduler startup and
//!   receives no acknowledgement.
//! - If the recipient died after attaching, the attempt fails with
//!   `NoRecipient` but the once flag stays consumed: the at-most-once
//!   guarantee wins over redelivery (no automatic re-dispatch on worker
//!   restart).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::error::HostError;
use crate::events::{Bus, Event, EventKind};
use crate::telemetry::StartupPayload;

/// Receiving end of the dispatcher, held by the designated worker.
pub type PayloadInbox = mpsc::Receiver<StartupPayload>;

/// Exactly-once hand-off of the startup payload to one designated worker.
pub struct TaskDispatcher {
    target: u32,
    tx: mpsc::Sender<StartupPayload>,
    inbox: Mutex<Option<PayloadInbox>>,
    attached: AtomicBool,
    dispatched: AtomicBool,
    bus: Bus,
}

impl TaskDispatcher {
    /// Creates a dispatcher bound to the given target worker index
    /// (index 0 by convention).
    pub fn new(target: u32, bus: Bus) -> Self {
        // Capacity 1: there is exactly one payload per boot.
        let (tx, rx) = mpsc::channel(1);
        Self {
            target,
            tx,
            inbox: Mutex::new(Some(rx)),
            attached: AtomicBool::new(false),
            dispatched: AtomicBool::new(false),
            bus,
        }
    }

    /// The worker index this dispatcher delivers to.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Hands the inbox to the worker with the given index.
    ///
    /// Returns `None` for every other worker, and for repeated calls —
    /// there is a single inbox per boot.
    pub fn attach(&self, worker_index: u32) -> Option<PayloadInbox> {
        if worker_index != self.target {
            return None;
        }
        let rx = self.inbox.lock().expect("inbox lock poisoned").take()?;
        self.attached.store(true, Ordering::Release);
        Some(rx)
    }

    /// Delivers the payload to the designated worker's inbox.
    ///
    /// See the module docs for the exact failure semantics.
    pub fn dispatch(&self, payload: StartupPayload) -> Result<(), HostError> {
        if !self.attached.load(Ordering::Acquire) {
            return Err(HostError::NoRecipient { index: self.target });
        }
        if self.dispatched.swap(true, Ordering::AcqRel) {
            return Err(HostError::DuplicateDispatch);
        }
        match self.tx.try_send(payload) {
            Ok(()) => {
                self.bus
                    .publish(Event::now(EventKind::PayloadDispatched).with_worker(self.target));
                Ok(())
            }
            // Receiver dropped after attach: the designated worker is gone.
            // The once flag stays consumed (at-most-once).
            Err(mpsc::error::TrySendError::Closed(_))
            | Err(mpsc::error::TrySendError::Full(_)) => {
                Err(HostError::NoRecipient { index: self.target })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;

    fn payload() -> StartupPayload {
        let mut cfg = HostConfig::default();
        cfg.server.app = "shop".into();
        cfg.server.server = "orders".into();
        cfg.server.node = "Obj@tcp -h 127.0.0.1 -p 1 -t 1000".into();
        cfg.server.adapters = vec!["shop.orders.objAdapter".into()];
        StartupPayload::from_config(&cfg, 1).unwrap()
    }

    fn dispatcher() -> TaskDispatcher {
        TaskDispatcher::new(0, Bus::new(8))
    }

    #[tokio::test]
    async fn test_delivers_exactly_once_to_target() {
        let d = dispatcher();
        let mut inbox = d.attach(0).unwrap();

        d.dispatch(payload()).unwrap();
        let received = inbox.recv().await.unwrap();
        assert_eq!(received.application, "shop");

        let err = d.dispatch(payload()).unwrap_err();
        assert_eq!(err.as_label(), "duplicate_dispatch");
    }

    #[test]
    fn test_only_target_worker_can_attach() {
        let d = dispatcher();
        assert!(d.attach(1).is_none());
        assert!(d.attach(3).is_none());
        assert!(d.attach(0).is_some());
        // Single inbox per boot.
        assert!(d.attach(0).is_none());
    }

    #[test]
    fn test_dispatch_before_attach_is_no_recipient() {
        let d = dispatcher();
        let err = d.dispatch(payload()).unwrap_err();
        assert!(matches!(err, HostError::NoRecipient { index: 0 }));

        // The failed attempt did not consume the once flag.
        let _inbox = d.attach(0).unwrap();
        d.dispatch(payload()).unwrap();
    }

    #[test]
    fn test_dead_recipient_does_not_reopen_the_boot() {
        let d = dispatcher();
        let inbox = d.attach(0).unwrap();
        drop(inbox);

        let err = d.dispatch(payload()).unwrap_err();
        assert!(matches!(err, HostError::NoRecipient { .. }));
        // At-most-once wins: the flag stays consumed.
        let err = d.dispatch(payload()).unwrap_err();
        assert_eq!(err.as_label(), "duplicate_dispatch");
    }
}
