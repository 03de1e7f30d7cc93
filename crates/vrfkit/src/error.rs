//! Error types for namespace and VRF operations.

use std::io;

/// Result type for vrfkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving VRFs or operating inside namespaces.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error without a more specific classification.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A system call failed.
    #[error("{operation}: {message} (errno {errno})")]
    Syscall {
        /// The operation that failed (e.g. "setns", "bind").
        operation: String,
        /// The errno value reported by the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// The namespace file does not exist (not provisioned yet, or deleted).
    #[error("namespace not found: {name}")]
    NamespaceNotFound {
        /// The namespace name that was not found.
        name: String,
    },

    /// A record or column is missing from the configuration database.
    #[error("not configured: {what}")]
    NotConfigured {
        /// Description of what was looked up.
        what: String,
    },

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was not found.
        name: String,
    },

    /// Invalid interface name.
    #[error("invalid interface name: {0}")]
    InvalidInterfaceName(String),

    /// Invalid IP address or prefix.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The namespace worker thread could not be spawned or panicked.
    #[error("namespace worker: {0}")]
    Worker(String),
}

impl Error {
    /// Create a syscall error from an errno value with operation context.
    pub fn from_errno(errno: i32, operation: impl Into<String>) -> Self {
        let errno = errno.abs();
        let message = io::Error::from_raw_os_error(errno).to_string();
        Self::Syscall {
            operation: operation.into(),
            errno,
            message,
        }
    }

    /// Create a syscall error from `errno` of the calling thread.
    pub fn last_os_error(operation: impl Into<String>) -> Self {
        Self::from_io(io::Error::last_os_error(), operation)
    }

    /// Wrap an I/O error with operation context.
    ///
    /// Errors without an OS error code are kept as [`Error::Io`].
    pub fn from_io(err: io::Error, operation: impl Into<String>) -> Self {
        match err.raw_os_error() {
            Some(errno) => Self::from_errno(errno, operation),
            None => Self::Io(err),
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, missing records).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Syscall { errno, .. } => {
                matches!(*errno, libc::ENOENT | libc::ENODEV)
            }
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            Self::NamespaceNotFound { .. }
            | Self::NotConfigured { .. }
            | Self::InterfaceNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Syscall { errno, .. } => matches!(*errno, libc::EPERM | libc::EACCES),
            Self::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Check if this is an "address already in use" error (EADDRINUSE).
    pub fn is_address_in_use(&self) -> bool {
        self.errno() == Some(libc::EADDRINUSE)
    }

    /// Get the errno value if this error came from a system call.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Syscall { errno, .. } => Some(*errno),
            Self::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}
