//! Namespace layout and naming conventions.
//!
//! The defaults match a switch where every daemon runs inside the `swns`
//! namespace and each non-default VRF is backed by a namespace named after
//! the VRF record's UUID.
//!
//! # Example
//!
//! ```
//! use vrfkit::NamespaceConfig;
//!
//! let config = NamespaceConfig::new()
//!     .run_dir("/run/netns")
//!     .default_namespace("swns");
//!
//! assert!(config.is_default_namespace("swns"));
//! assert_eq!(
//!     config.namespace_path("blue"),
//!     std::path::PathBuf::from("/run/netns/blue")
//! );
//! ```

use std::path::{Path, PathBuf};

/// The runtime directory where named network namespaces are stored.
pub const NETNS_RUN_DIR: &str = "/var/run/netns";

/// Namespace the switch daemons run in.
pub const SWITCH_NAMESPACE: &str = "swns";

/// Name of the VRF backed by the switch namespace.
pub const DEFAULT_VRF_NAME: &str = "vrf_default";

/// Status key set once a VRF's namespace has been provisioned.
pub const VRF_STATUS_KEY: &str = "namespace_ready";

/// Value of [`VRF_STATUS_KEY`] for a provisioned VRF.
pub const VRF_STATUS_VALUE: &str = "true";

/// Namespace file of the init process (management / out-of-band network).
pub const OOBM_NAMESPACE_PATH: &str = "/proc/1/ns/net";

/// Namespace naming and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceConfig {
    run_dir: PathBuf,
    default_namespace: String,
    default_vrf: String,
    ready_key: String,
    ready_value: String,
    oobm_path: PathBuf,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            run_dir: PathBuf::from(NETNS_RUN_DIR),
            default_namespace: SWITCH_NAMESPACE.to_string(),
            default_vrf: DEFAULT_VRF_NAME.to_string(),
            ready_key: VRF_STATUS_KEY.to_string(),
            ready_value: VRF_STATUS_VALUE.to_string(),
            oobm_path: PathBuf::from(OOBM_NAMESPACE_PATH),
        }
    }
}

impl NamespaceConfig {
    /// Create a configuration with the standard switch layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory holding named namespace files.
    pub fn run_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.run_dir = dir.into();
        self
    }

    /// Set the name of the default namespace.
    pub fn default_namespace(mut self, name: impl Into<String>) -> Self {
        self.default_namespace = name.into();
        self
    }

    /// Set the name of the default VRF.
    pub fn default_vrf(mut self, name: impl Into<String>) -> Self {
        self.default_vrf = name.into();
        self
    }

    /// Set the status key/value pair that marks a VRF as ready.
    pub fn ready_status(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ready_key = key.into();
        self.ready_value = value.into();
        self
    }

    /// Set the namespace file used for the management network.
    pub fn oobm_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.oobm_path = path.into();
        self
    }

    /// Directory holding named namespace files.
    pub fn namespace_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Name of the default namespace.
    pub fn default_namespace_name(&self) -> &str {
        &self.default_namespace
    }

    /// Name of the default VRF.
    pub fn default_vrf_name(&self) -> &str {
        &self.default_vrf
    }

    /// Status key/value pair that marks a VRF as ready.
    pub fn ready_key_value(&self) -> (&str, &str) {
        (&self.ready_key, &self.ready_value)
    }

    /// Namespace file of the management network.
    pub fn oobm_namespace_path(&self) -> &Path {
        &self.oobm_path
    }

    /// Path of a named namespace file.
    pub fn namespace_path(&self, name: &str) -> PathBuf {
        self.run_dir.join(name)
    }

    /// Whether `name` is the default namespace.
    pub fn is_default_namespace(&self, name: &str) -> bool {
        name == self.default_namespace
    }

    /// Whether `name` refers to the default VRF, either by VRF name or by
    /// the name of its namespace.
    pub fn is_default_vrf_name(&self, name: &str) -> bool {
        name == self.default_vrf || name == self.default_namespace
    }
}
