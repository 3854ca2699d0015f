//! Remote-facing pieces: descriptor parsing, service seams, config sync.
//!
//! The wire protocols themselves live in an external collaborator; this
//! module owns everything the coordination runtime needs to drive calls
//! into them:
//! - [`RegistrationDescriptor`] — parsed registry connection parameters;
//! - [`NodeRegistry`], [`StatReporter`], [`ConfigStore`] — async seams
//!   implemented by the protocol layer (and by fakes in tests);
//! - [`ConfigSync`] — batch pull-and-persist with per-item isolation.

mod clients;
mod descriptor;
mod sync;

pub use clients::{ConfigStore, NodeRegistry, ServiceIdentity, SocketMode, StatReporter, StatSubmission};
pub use descriptor::RegistrationDescriptor;
pub(crate) use sync::write_atomic;
pub use sync::{ConfigFileSpec, ConfigSync, SyncEntry, SyncOutcome, SyncReport};
