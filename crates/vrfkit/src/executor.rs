//! Namespace-isolated execution of namespace-sensitive operations.
//!
//! Socket creation and interface name/index resolution depend on the network
//! namespace of the thread that performs them. The [`Executor`] runs such
//! operations in a target namespace without ever changing the namespace of
//! the calling thread:
//!
//! - for the default namespace the operation runs inline, on the caller's
//!   thread (the caller is expected to live there already);
//! - for any other namespace a one-shot worker thread is spawned, enters the
//!   namespace, performs the operation and exits. The caller joins it and
//!   gets its result back.
//!
//! # Example
//!
//! ```ignore
//! use vrfkit::{Executor, NsOperation, NsOutcome, SocketParams};
//!
//! let executor = Executor::default();
//! let socket = executor.create_socket(
//!     "6f1c0a4e-2d7b-4c61-9a51-0d8e3f2b7c11",
//!     SocketParams::new(libc::AF_INET, libc::SOCK_DGRAM, 0),
//! )?;
//!
//! match executor.execute(NsOperation::IfNameToIndex("eth1".into()), "swns")? {
//!     NsOutcome::IfIndex(Some(index)) => println!("eth1 is {}", index),
//!     _ => println!("eth1 not found"),
//! }
//! ```

use std::os::fd::{FromRawFd, OwnedFd};
use std::thread;

use tracing::{debug, debug_span, error};

use crate::config::NamespaceConfig;
use crate::error::{Error, Result};
use crate::{ifname, namespace};

/// Name given to namespace worker threads.
const WORKER_THREAD_NAME: &str = "vrfkit-netns";

/// Parameters of a `socket(2)` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketParams {
    /// Address family (`AF_INET`, `AF_INET6`, `AF_NETLINK`, ...).
    pub family: i32,
    /// Socket type (`SOCK_DGRAM`, `SOCK_RAW`, ...), flags may be or-ed in.
    pub socket_type: i32,
    /// Protocol number, 0 for the family default.
    pub protocol: i32,
}

impl SocketParams {
    /// Create socket parameters.
    pub fn new(family: i32, socket_type: i32, protocol: i32) -> Self {
        Self {
            family,
            socket_type,
            protocol,
        }
    }
}

/// Create a socket in the calling thread's namespace.
pub fn create_socket(params: SocketParams) -> Result<OwnedFd> {
    // SAFETY: socket(2) has no memory-safety preconditions.
    let fd = unsafe { libc::socket(params.family, params.socket_type, params.protocol) };
    if fd < 0 {
        let err = Error::last_os_error("socket");
        error!(?params, errno = err.errno(), "socket creation failed");
        return Err(err);
    }
    // SAFETY: fd was just returned by socket(2) and is owned by nobody else.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// A namespace-sensitive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsOperation {
    /// Open a socket.
    CreateSocket(SocketParams),
    /// Resolve an interface index to its name.
    IfIndexToName(u32),
    /// Resolve an interface name to its index.
    IfNameToIndex(String),
}

impl NsOperation {
    /// Perform the operation in the calling thread's namespace.
    pub fn perform(self) -> Result<NsOutcome> {
        match self {
            Self::CreateSocket(params) => create_socket(params).map(NsOutcome::Socket),
            Self::IfIndexToName(index) => Ok(NsOutcome::IfName(ifname::index_to_name(index))),
            Self::IfNameToIndex(name) => Ok(NsOutcome::IfIndex(ifname::name_to_index(&name))),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::CreateSocket(_) => "create-socket",
            Self::IfIndexToName(_) => "ifindex-to-name",
            Self::IfNameToIndex(_) => "ifname-to-index",
        }
    }
}

/// Result of an [`NsOperation`].
///
/// Unresolved names and indexes are `None`; callers must not read them as
/// valid values.
#[derive(Debug)]
pub enum NsOutcome {
    /// The opened socket.
    Socket(OwnedFd),
    /// Interface name for the requested index.
    IfName(Option<String>),
    /// Interface index for the requested name.
    IfIndex(Option<u32>),
}

/// Runs operations inside network namespaces without leaking the switch to
/// the calling thread.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: NamespaceConfig,
}

impl Executor {
    /// Create an executor for the given namespace layout.
    pub fn new(config: NamespaceConfig) -> Self {
        Self { config }
    }

    /// The namespace layout this executor works with.
    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    /// Run `f` inside `namespace`.
    ///
    /// `f` runs inline for the default namespace. For any other namespace it
    /// runs on a worker thread that first enters the namespace; the worker
    /// is joined before this returns, and the tracing dispatcher of the
    /// caller is installed on it.
    pub fn run_in<T, F>(&self, namespace: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send,
        T: Send,
    {
        let span = debug_span!("netns", namespace = %namespace);

        if self.config.is_default_namespace(namespace) {
            return span.in_scope(f);
        }

        let path = self.config.namespace_path(namespace);
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());

        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name(WORKER_THREAD_NAME.to_string())
                .spawn_scoped(scope, move || {
                    tracing::dispatcher::with_default(&dispatch, || {
                        let _entered = span.enter();
                        namespace::enter_path(&path)?;
                        f()
                    })
                })
                .map_err(|e| {
                    error!(namespace, "thread create failed: {}", e);
                    Error::Worker(format!("cannot spawn worker thread: {e}"))
                })?;

            worker.join().map_err(|_| {
                error!(namespace, "namespace worker panicked");
                Error::Worker(format!("worker for namespace '{namespace}' panicked"))
            })?
        })
    }

    /// Execute `op` inside `namespace`.
    pub fn execute(&self, op: NsOperation, namespace: &str) -> Result<NsOutcome> {
        debug!(namespace, op = op.label(), "executing namespace operation");
        self.run_in(namespace, move || op.perform())
    }

    /// Open a socket inside `namespace`.
    pub fn create_socket(&self, namespace: &str, params: SocketParams) -> Result<OwnedFd> {
        let fd = self.run_in(namespace, move || create_socket(params))?;
        debug!(namespace, ?fd, "socket created");
        Ok(fd)
    }

    /// Resolve an interface name to its index inside `namespace`.
    pub fn if_nametoindex(&self, namespace: &str, name: &str) -> Result<Option<u32>> {
        self.run_in(namespace, || Ok(ifname::name_to_index(name)))
    }

    /// Resolve an interface index to its name inside `namespace`.
    pub fn if_indextoname(&self, namespace: &str, index: u32) -> Result<Option<String>> {
        self.run_in(namespace, move || Ok(ifname::index_to_name(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsRawFd;

    fn executor_in(dir: &std::path::Path) -> Executor {
        Executor::new(NamespaceConfig::new().run_dir(dir))
    }

    #[test]
    fn test_default_namespace_runs_inline() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_in(dir.path());
        let caller = thread::current().id();

        let ran_on = executor
            .run_in("swns", || Ok(thread::current().id()))
            .unwrap();
        assert_eq!(ran_on, caller);
    }

    #[test]
    fn test_default_namespace_operations() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_in(dir.path());

        let index = executor.if_nametoindex("swns", "lo").unwrap();
        assert!(index.is_some());
        let name = executor.if_indextoname("swns", index.unwrap()).unwrap();
        assert_eq!(name.as_deref(), Some("lo"));

        assert_eq!(executor.if_nametoindex("swns", "nonexistent0").unwrap(), None);
    }

    #[test]
    fn test_execute_create_socket_inline() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_in(dir.path());

        let op = NsOperation::CreateSocket(SocketParams::new(libc::AF_INET, libc::SOCK_DGRAM, 0));
        match executor.execute(op, "swns").unwrap() {
            NsOutcome::Socket(fd) => assert!(fd.as_raw_fd() >= 0),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_create_socket_failure_is_error() {
        let err = create_socket(SocketParams::new(-1, libc::SOCK_DGRAM, 0)).unwrap_err();
        assert!(err.errno().is_some());
    }

    #[test]
    fn test_missing_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_in(dir.path());

        let err = executor
            .execute(NsOperation::IfIndexToName(1), "blue")
            .unwrap_err();
        assert!(matches!(err, Error::NamespaceNotFound { ref name } if name == "blue"));
    }

    #[test]
    fn test_failed_switch_leaves_caller_namespace() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where a namespace is expected: setns() fails in the worker.
        std::fs::write(dir.path().join("blue"), b"").unwrap();
        let executor = executor_in(dir.path());

        let before = namespace::current().unwrap();
        let result = executor.execute(NsOperation::IfNameToIndex("lo".into()), "blue");
        assert!(result.is_err());
        assert_eq!(namespace::current().unwrap(), before);
    }

    #[test]
    fn test_closure_skipped_when_switch_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blue"), b"").unwrap();
        let executor = executor_in(dir.path());

        // The closure never runs because entering fails, which proves the
        // non-default path goes through namespace::enter first.
        let ran = std::sync::atomic::AtomicBool::new(false);
        let result = executor.run_in("blue", || {
            ran.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });
        assert!(result.is_err());
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
