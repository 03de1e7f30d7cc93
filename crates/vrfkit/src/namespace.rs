//! Network namespace switch primitive.
//!
//! Network namespace membership is a property of a *thread*, not of the
//! process. [`enter`] and [`enter_path`] move the calling thread into a
//! namespace and leave it there: there is no "leave" operation, the thread
//! stays in the namespace until it enters another one or exits.
//!
//! Code that must not disturb the calling thread should go through
//! [`Executor`](crate::Executor), which performs the switch on a one-shot
//! worker thread.
//!
//! # Example
//!
//! ```ignore
//! use vrfkit::namespace;
//!
//! // Keep a handle to a namespace, e.g. to hand its fd to the kernel
//! let ns = namespace::open("6f1c0a4e-2d7b-4c61-9a51-0d8e3f2b7c11")?;
//! println!("fd {}", ns.as_raw_fd());
//!
//! // Switch the current thread (affects everything that runs on it later)
//! namespace::enter("swns")?;
//! ```

use std::fmt;
use std::fs::File;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::config::{NETNS_RUN_DIR, NamespaceConfig};
use crate::error::{Error, Result};

/// Per-thread namespace link in procfs.
const THREAD_NETNS: &str = "/proc/thread-self/ns/net";

/// Open a named namespace from [`NETNS_RUN_DIR`].
///
/// Shorthand for the system layout; with a custom
/// [`NamespaceConfig::run_dir`] use
/// `open_path(config.namespace_path(name))`.
pub fn open(name: &str) -> Result<NamespaceFd> {
    open_path(PathBuf::from(NETNS_RUN_DIR).join(name))
}

/// Open a namespace file by path and return its file descriptor.
///
/// A missing file is reported as [`Error::NamespaceNotFound`]: the
/// namespace has not been provisioned yet or has been deleted.
pub fn open_path<P: AsRef<Path>>(path: P) -> Result<NamespaceFd> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::NamespaceNotFound {
                name: display_name(path),
            }
        } else {
            Error::from_io(e, format!("open namespace '{}'", path.display()))
        }
    })?;
    Ok(NamespaceFd {
        file,
        path: path.to_path_buf(),
    })
}

/// A handle to an open namespace file.
///
/// The descriptor is closed when the handle is dropped.
#[derive(Debug)]
pub struct NamespaceFd {
    file: File,
    path: PathBuf,
}

impl NamespaceFd {
    /// Get the raw file descriptor.
    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Path the namespace was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the calling thread into this namespace.
    pub fn enter(&self) -> Result<()> {
        // SAFETY: the fd is owned by `self.file` and stays open for the
        // duration of the call; CLONE_NEWNET restricts the switch to the
        // network namespace of the calling thread.
        let ret = unsafe { libc::setns(self.file.as_raw_fd(), libc::CLONE_NEWNET) };
        if ret < 0 {
            let err = Error::last_os_error("setns");
            error!(
                namespace = %self.path.display(),
                errno = err.errno(),
                "unable to set namespace for the thread"
            );
            return Err(err);
        }
        debug!(namespace = %self.path.display(), "thread entered namespace");
        Ok(())
    }
}

impl AsRawFd for NamespaceFd {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl AsFd for NamespaceFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

/// Move the calling thread into a named namespace from [`NETNS_RUN_DIR`].
///
/// Shorthand for the system layout; see [`open`].
pub fn enter(name: &str) -> Result<()> {
    enter_path(PathBuf::from(NETNS_RUN_DIR).join(name))
}

/// Move the calling thread into the namespace at `path`.
///
/// The switch is performed unconditionally, even when the thread already
/// is in that namespace. The namespace file is closed before returning.
pub fn enter_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let ns = open_path(path.as_ref()).inspect_err(|e| {
        error!(namespace = %path.as_ref().display(), "cannot enter namespace: {}", e);
    })?;
    ns.enter()
}

/// Move the calling thread into the management (out-of-band) namespace.
pub fn enter_oobm(config: &NamespaceConfig) -> Result<()> {
    enter_path(config.oobm_namespace_path())
}

/// Check if a named namespace exists in [`NETNS_RUN_DIR`].
///
/// Use [`exists_in`] with [`NamespaceConfig::namespace_dir`] for a custom
/// layout.
pub fn exists(name: &str) -> bool {
    exists_in(Path::new(NETNS_RUN_DIR), name)
}

/// Check if a named namespace exists in `dir`.
pub fn exists_in(dir: &Path, name: &str) -> bool {
    dir.join(name).exists()
}

/// List all named network namespaces in [`NETNS_RUN_DIR`].
///
/// Use [`list_in`] with [`NamespaceConfig::namespace_dir`] for a custom
/// layout.
pub fn list() -> Result<Vec<String>> {
    list_in(Path::new(NETNS_RUN_DIR))
}

/// List the named network namespaces in `dir`, sorted by name.
pub fn list_in(dir: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            // No namespaces directory means no namespaces
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    names.sort();
    Ok(names)
}

/// Identity of a network namespace, as reported by procfs
/// (e.g. `net:[4026531840]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceId(String);

impl NamespaceId {
    /// The raw procfs link target.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the calling thread's network namespace.
pub fn current() -> Result<NamespaceId> {
    let target = std::fs::read_link(THREAD_NETNS)
        .map_err(|e| Error::from_io(e, format!("readlink {}", THREAD_NETNS)))?;
    Ok(NamespaceId(target.to_string_lossy().into_owned()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netns_run_dir() {
        assert_eq!(NETNS_RUN_DIR, "/var/run/netns");
    }

    #[test]
    fn test_list_namespaces() {
        // This should not fail even if the directory doesn't exist
        let result = list();
        assert!(result.is_ok());
    }

    #[test]
    fn test_list_in_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("red"), b"").unwrap();
        std::fs::write(dir.path().join("blue"), b"").unwrap();

        assert_eq!(list_in(dir.path()).unwrap(), vec!["blue", "red"]);
        assert!(exists_in(dir.path(), "red"));
        assert!(!exists_in(dir.path(), "green"));
    }

    #[test]
    fn test_list_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("netns");
        assert!(list_in(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_exists_nonexistent() {
        assert!(!exists("definitely_does_not_exist_12345"));
    }

    #[test]
    fn test_open_missing_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_path(dir.path().join("blue")).unwrap_err();
        assert!(matches!(err, Error::NamespaceNotFound { ref name } if name == "blue"));
    }

    #[test]
    fn test_enter_regular_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blue");
        std::fs::write(&path, b"").unwrap();

        let before = current().unwrap();
        // setns() rejects descriptors that are not namespace files.
        let err = enter_path(&path).unwrap_err();
        assert!(err.errno().is_some());
        assert_eq!(current().unwrap(), before);
    }

    #[test]
    fn test_current_identity() {
        let id = current().unwrap();
        assert!(id.as_str().starts_with("net:["));
        assert_eq!(id, current().unwrap());
    }

    #[test]
    fn test_enter_oobm_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = NamespaceConfig::new().oobm_path(dir.path().join("net"));

        let err = enter_oobm(&config).unwrap_err();
        assert!(matches!(err, Error::NamespaceNotFound { ref name } if name == "net"));
    }

    #[test]
    fn test_enter_oobm_not_a_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net");
        std::fs::write(&path, b"").unwrap();
        let config = NamespaceConfig::new().oobm_path(&path);

        let before = current().unwrap();
        let err = enter_oobm(&config).unwrap_err();
        assert!(err.errno().is_some());
        assert_eq!(current().unwrap(), before);
    }
}
