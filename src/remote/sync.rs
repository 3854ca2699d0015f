//! # Config sync: pull remote config files and persist them locally.
//!
//! [`ConfigSync`] fetches a set of named configuration blobs from the remote
//! [`ConfigStore`] and writes them to resolved local paths. Failure handling
//! is per entry: one file's fetch or write failure never aborts the batch.
//!
//! ## Flow
//! ```text
//! sync(app, server, specs)
//!   ├─ app or server empty ──► report { configured: false }   (no-op)
//!   └─ for each spec, in order:
//!        fetch(app, server, filename)
//!          ├─ Err(e)        ──► Failed(e), continue
//!          ├─ Ok("")        ──► Skipped("empty content"), continue
//!          └─ Ok(content)   ──► atomic write (scratch + rename)
//!                                 ├─ Ok  ──► Written
//!                                 └─ Err ──► Failed(FileWrite)
//! ```
//!
//! ## Rules
//! - Writes are all-or-nothing per file: scratch file in the target
//!   directory, then atomic rename; a failed write leaves any previous file
//!   untouched.
//! - Blank filename entries are filtered out when specs are built.
//! - Re-running with identical remote content produces byte-identical files
//!   (the write is not skipped merely because content is unchanged).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::HostError;
use crate::events::{Bus, Event, EventKind};
use crate::remote::ConfigStore;

/// One config file to sync: logical name plus resolved local target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigFileSpec {
    /// Logical filename known to the remote store.
    pub filename: String,
    /// Resolved local path the content is written to.
    pub target: PathBuf,
}

impl ConfigFileSpec {
    /// Resolves one logical filename to a local target path.
    ///
    /// Absolute filenames are used verbatim; relative ones land under
    /// `base_path/save_dir/`.
    pub fn resolve(filename: &str, base_path: &Path, save_dir: &Path) -> Self {
        let logical = Path::new(filename);
        let target = if logical.is_absolute() {
            logical.to_path_buf()
        } else {
            base_path.join(save_dir).join(logical)
        };
        Self {
            filename: filename.to_string(),
            target,
        }
    }

    /// Builds specs from a configured filename list, dropping blank entries.
    pub fn from_list(filenames: &[String], base_path: &Path, save_dir: &Path) -> Vec<Self> {
        filenames
            .iter()
            .filter(|f| !f.trim().is_empty())
            .map(|f| Self::resolve(f, base_path, save_dir))
            .collect()
    }
}

/// Outcome of one sync entry.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Content fetched and written to the target path.
    Written,
    /// Nothing written; the reason says why (e.g. empty remote content).
    Skipped {
        /// Why the entry produced no write.
        reason: String,
    },
    /// The fetch or the local write failed; siblings were still attempted.
    Failed(HostError),
}

/// One entry of a [`SyncReport`].
#[derive(Debug)]
pub struct SyncEntry {
    /// The spec this entry is about.
    pub spec: ConfigFileSpec,
    /// What happened to it.
    pub outcome: SyncOutcome,
}

/// Batch report returned by [`ConfigSync::sync`].
///
/// The batch call itself never fails as a whole due to an individual file.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// False when `app`/`server` were empty and the batch was a no-op.
    pub configured: bool,
    /// Per-spec outcomes, in list order.
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    /// Number of entries written.
    pub fn written(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SyncOutcome::Written))
            .count()
    }

    /// Number of entries that failed.
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SyncOutcome::Failed(_)))
            .count()
    }
}

/// Pulls remote config files and persists them with per-item isolation.
pub struct ConfigSync {
    store: Arc<dyn ConfigStore>,
    bus: Bus,
}

impl ConfigSync {
    /// Creates a new config sync over the given store.
    pub fn new(store: Arc<dyn ConfigStore>, bus: Bus) -> Self {
        Self { store, bus }
    }

    /// Syncs the given specs under (app, server), in list order.
    ///
    /// Empty `app` or `server` means sync is not configured: the whole batch
    /// is a no-op, not an error.
    pub async fn sync(&self, app: &str, server: &str, specs: Vec<ConfigFileSpec>) -> SyncReport {
        if app.is_empty() || server.is_empty() {
            return SyncReport::default();
        }

        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            let outcome = self.sync_one(app, server, &spec).await;
            self.publish(&spec, &outcome);
            entries.push(SyncEntry { spec, outcome });
        }

        SyncReport {
            configured: true,
            entries,
        }
    }

    async fn sync_one(&self, app: &str, server: &str, spec: &ConfigFileSpec) -> SyncOutcome {
        let content = match self.store.fetch(app, server, &spec.filename).await {
            Ok(content) => content,
            Err(e) => return SyncOutcome::Failed(e.into()),
        };
        if content.is_empty() {
            return SyncOutcome::Skipped {
                reason: "empty content".into(),
            };
        }
        match write_atomic(&spec.target, content.as_bytes()) {
            Ok(()) => SyncOutcome::Written,
            Err(e) => SyncOutcome::Failed(e),
        }
    }

    fn publish(&self, spec: &ConfigFileSpec, outcome: &SyncOutcome) {
        let ev = match outcome {
            SyncOutcome::Written => Event::now(EventKind::ConfigWritten),
            SyncOutcome::Skipped { reason } => {
                Event::now(EventKind::ConfigSkipped).with_reason(reason.as_str())
            }
            SyncOutcome::Failed(e) => {
                Event::now(EventKind::ConfigFailed).with_reason(e.to_string())
            }
        };
        self.bus.publish(ev.with_file(spec.filename.as_str()));
    }
}

/// Writes `content` to `path` atomically: scratch file in the same
/// directory, then rename. Readers never observe partial content; a failure
/// leaves any previous file untouched.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), HostError> {
    let file_err = |source: std::io::Error| HostError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    // The scratch file must share a filesystem with the target or the
    // rename is not atomic (and fails outright across mounts). A bare
    // filename has an empty parent and means the working directory.
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new("."))).map_err(file_err)?;

    tmp.write_all(content).map_err(file_err)?;
    tmp.flush().map_err(file_err)?;
    tmp.persist(path).map_err(|e| file_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Config store backed by a fixed map; missing keys fail the fetch.
    struct MapStore {
        files: HashMap<&'static str, &'static str>,
        fetches: AtomicUsize,
    }

    impl MapStore {
        fn new(files: &[(&'static str, &'static str)]) -> Arc<Self> {
            Arc::new(Self {
                files: files.iter().copied().collect(),
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ConfigStore for MapStore {
        async fn fetch(
            &self,
            _app: &str,
            _server: &str,
            filename: &str,
        ) -> Result<String, RemoteError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(filename)
                .map(|s| s.to_string())
                .ok_or_else(|| RemoteError::call("tarsconfig", format!("no such file {filename}")))
        }
    }

    fn sync_over(store: Arc<dyn ConfigStore>) -> ConfigSync {
        ConfigSync::new(store, Bus::new(16))
    }

    #[test]
    fn test_resolve_absolute_is_verbatim() {
        let spec =
            ConfigFileSpec::resolve("/etc/orders/a.conf", Path::new("/base"), Path::new("conf"));
        assert_eq!(spec.target, PathBuf::from("/etc/orders/a.conf"));
    }

    #[test]
    fn test_resolve_relative_joins_base_and_save_dir() {
        let spec = ConfigFileSpec::resolve("a.conf", Path::new("/base"), Path::new("conf"));
        assert_eq!(spec.target, PathBuf::from("/base/conf/a.conf"));
    }

    #[test]
    fn test_blank_entries_are_filtered() {
        let names = vec!["".into(), "a.conf".into(), "  ".into(), "b.conf".into()];
        let specs = ConfigFileSpec::from_list(&names, Path::new("/base"), Path::new("conf"));
        let files: Vec<_> = specs.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(files, vec!["a.conf", "b.conf"]);
    }

    #[tokio::test]
    async fn test_unconfigured_sync_is_a_noop() {
        let store = MapStore::new(&[("a.conf", "x=1")]);
        let sync = sync_over(store.clone());
        let specs = vec![ConfigFileSpec::resolve(
            "a.conf",
            Path::new("/tmp"),
            Path::new("conf"),
        )];

        let report = sync.sync("", "orders", specs).await;
        assert!(!report.configured);
        assert!(report.entries.is_empty());
        assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_boot_scenario_shop_orders() {
        // filenames = ["", "a.conf", "b.conf"], fetch(a)="x=1", fetch(b)="".
        let dir = tempfile::tempdir().unwrap();
        let store = MapStore::new(&[("a.conf", "x=1"), ("b.conf", "")]);
        let sync = sync_over(store.clone());

        let names = vec!["".into(), "a.conf".into(), "b.conf".into()];
        let specs = ConfigFileSpec::from_list(&names, dir.path(), Path::new(""));
        let report = sync.sync("shop", "orders", specs).await;

        assert_eq!(report.entries.len(), 2, "blank entry never attempted");
        assert_eq!(report.written(), 1);
        assert!(matches!(
            report.entries[1].outcome,
            SyncOutcome::Skipped { .. }
        ));
        let written = std::fs::read_to_string(dir.path().join("a.conf")).unwrap();
        assert_eq!(written, "x=1");
        assert!(!dir.path().join("b.conf").exists());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let store = MapStore::new(&[("a.conf", "x=1"), ("c.conf", "y=2")]);
        let sync = sync_over(store.clone());

        let names = vec!["a.conf".into(), "missing.conf".into(), "c.conf".into()];
        let specs = ConfigFileSpec::from_list(&names, dir.path(), Path::new(""));
        let report = sync.sync("shop", "orders", specs).await;

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.written(), 2);
        assert_eq!(report.failed(), 1);
        assert!(dir.path().join("a.conf").exists());
        assert!(dir.path().join("c.conf").exists());
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let store = MapStore::new(&[("a.conf", "x=1\ny=2\n")]);
        let sync = sync_over(store.clone());
        let names = vec!["a.conf".into()];

        let specs = ConfigFileSpec::from_list(&names, dir.path(), Path::new(""));
        sync.sync("shop", "orders", specs).await;
        let first = std::fs::read(dir.path().join("a.conf")).unwrap();

        let specs = ConfigFileSpec::from_list(&names, dir.path(), Path::new(""));
        let report = sync.sync("shop", "orders", specs).await;
        let second = std::fs::read(dir.path().join("a.conf")).unwrap();

        assert_eq!(report.written(), 1, "write not skipped on unchanged content");
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_atomic_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.conf");
        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_atomic_bare_filename_lands_in_working_dir() {
        // A bare relative path must not stage its scratch file on another
        // filesystem (e.g. a tmpfs /tmp), where the final rename would fail.
        let name = format!("herald-write-atomic-{}.tmp", std::process::id());
        let path = PathBuf::from(&name);
        write_atomic(&path, b"42").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "42");
        std::fs::remove_file(&path).unwrap();
    }
}
