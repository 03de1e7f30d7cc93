//! Common test utilities for integration tests.
//!
//! Provides `TestNamespace` for isolated network namespace testing
//! and helper macros for conditional test execution.

use std::io;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

use vrfkit::{Error, Executor, NamespaceConfig, Result};

/// Global counter for unique namespace names.
static NAMESPACE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a unique namespace name for this test.
fn unique_ns_name(prefix: &str) -> String {
    let id = NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    format!("vrfkit-test-{}-{}-{}", prefix, pid, id)
}

fn command_failed(what: String) -> Error {
    Error::Io(io::Error::other(what))
}

/// A test network namespace with automatic cleanup.
///
/// The namespace is created with `ip netns add` and deleted when the struct
/// is dropped.
pub struct TestNamespace {
    name: String,
}

impl TestNamespace {
    /// Create a new test namespace with a unique name.
    pub fn new(prefix: &str) -> Result<Self> {
        Self::named(&unique_ns_name(prefix))
    }

    /// Create a test namespace with an exact name (e.g. a VRF UUID).
    pub fn named(name: &str) -> Result<Self> {
        let status = Command::new("ip")
            .args(["netns", "add", name])
            .status()
            .map_err(Error::Io)?;

        if !status.success() {
            return Err(command_failed(format!("failed to create namespace: {}", name)));
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Get the namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run a command in the namespace and return its output.
    pub fn exec(&self, cmd: &str, args: &[&str]) -> Result<String> {
        let output = Command::new("ip")
            .args(["netns", "exec", &self.name, cmd])
            .args(args)
            .output()
            .map_err(Error::Io)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(command_failed(format!(
                "command failed: {} {:?}: {}",
                cmd, args, stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether an interface exists in this namespace.
    pub fn has_link(&self, name: &str) -> bool {
        self.exec("ip", &["link", "show", name]).is_ok()
    }

    /// Add a dummy interface in this namespace using ip command.
    pub fn add_dummy(&self, name: &str) -> Result<()> {
        self.exec("ip", &["link", "add", name, "type", "dummy"])?;
        Ok(())
    }
}

impl Drop for TestNamespace {
    fn drop(&mut self) {
        let _ = Command::new("ip")
            .args(["netns", "del", &self.name])
            .status();
    }
}

/// Executor over the system namespace directory.
pub fn system_executor() -> Executor {
    Executor::new(NamespaceConfig::default())
}

/// Check if running as root.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Skip the test if not running as root.
///
/// Use this at the beginning of integration tests that require root privileges.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ns_name() {
        let name1 = unique_ns_name("test");
        let name2 = unique_ns_name("test");
        assert_ne!(name1, name2);
        assert!(name1.starts_with("vrfkit-test-test-"));
    }
}
