//! # Local process plumbing: titles and pid files.
//!
//! Pid files are the only cross-process-visible state the supervisor
//! writes; they use the same atomic-replace discipline as synced config
//! files so readers never observe partial content. Each restart overwrites
//! the prior value.

use std::path::Path;

use crate::error::HostError;
use crate::remote::write_atomic;

/// Sets the title this process shows in `ps`/`top`.
///
/// Best effort: platforms without a title mechanism ignore the call.
#[cfg(unix)]
pub fn set_process_title(title: &str) {
    use std::ffi::CString;

    // PR_SET_NAME caps the name at 15 bytes plus NUL.
    let truncated: String = title.chars().take(15).collect();
    if let Ok(name) = CString::new(truncated) {
        // SAFETY: prctl(PR_SET_NAME) reads a NUL-terminated string and has
        // no other memory effects.
        unsafe {
            libc::prctl(libc::PR_SET_NAME, name.as_ptr() as libc::c_ulong, 0, 0, 0);
        }
    }
}

/// Sets the title this process shows in `ps`/`top`.
///
/// Best effort: platforms without a title mechanism ignore the call.
#[cfg(not(unix))]
pub fn set_process_title(_title: &str) {}

/// Persists a process id to a well-known file, atomically replacing any
/// previous value.
pub fn write_pid_file(path: &Path, pid: u32) -> Result<(), HostError> {
    write_atomic(path, pid.to_string().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_file_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.pid");

        write_pid_file(&path, 100).unwrap();
        write_pid_file(&path, 200).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "200");
    }

    #[test]
    fn test_set_process_title_does_not_panic() {
        set_process_title("shop.orders: master process");
    }
}
