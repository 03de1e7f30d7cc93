//! VRF to namespace resolution.
//!
//! Every VRF except the default one is backed by a network namespace named
//! after the UUID of its configuration record. The default VRF (table id 0,
//! or its reserved name) lives in the switch namespace and needs no
//! database query.
//!
//! # Example
//!
//! ```ignore
//! use vrfkit::{MemoryStore, NamespaceConfig, SocketParams, VrfResolver};
//!
//! let resolver = VrfResolver::new(store, NamespaceConfig::default());
//!
//! if resolver.is_ready("red") {
//!     let fd = resolver.create_socket(
//!         "red",
//!         SocketParams::new(libc::AF_INET, libc::SOCK_DGRAM, 0),
//!     )?;
//!     // ...
//!     resolver.close_socket("red", fd)?;
//! }
//! ```

use std::fmt;
use std::os::fd::{AsRawFd, OwnedFd};

use tracing::{debug, error};
use uuid::Uuid;

use crate::config::NamespaceConfig;
use crate::error::{Error, Result};
use crate::executor::{Executor, SocketParams};
use crate::overlap::{self, AddressFamily};
use crate::source::{self, Protocol, ProtocolSource};
use crate::store::{ConfigStore, VrfRecord};
use crate::{migrate, namespace};

/// Reference to a VRF by one of its identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VrfRef<'a> {
    /// VRF name.
    Name(&'a str),
    /// Kernel routing table id.
    TableId(i64),
    /// UUID of the VRF record.
    Uuid(Uuid),
}

impl<'a> From<&'a str> for VrfRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for VrfRef<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for VrfRef<'_> {
    fn from(table_id: i64) -> Self {
        Self::TableId(table_id)
    }
}

impl From<Uuid> for VrfRef<'_> {
    fn from(uuid: Uuid) -> Self {
        Self::Uuid(uuid)
    }
}

impl fmt::Display for VrfRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "vrf '{}'", name),
            Self::TableId(id) => write!(f, "vrf with table id {}", id),
            Self::Uuid(uuid) => write!(f, "vrf {}", uuid),
        }
    }
}

/// Resolves VRFs to namespaces and runs namespace-scoped operations on
/// their behalf.
#[derive(Debug, Clone)]
pub struct VrfResolver<S> {
    store: S,
    executor: Executor,
}

impl<S: ConfigStore> VrfResolver<S> {
    /// Create a resolver over `store` using the given namespace layout.
    pub fn new(store: S, config: NamespaceConfig) -> Self {
        Self::with_executor(store, Executor::new(config))
    }

    /// Create a resolver sharing an existing executor.
    pub fn with_executor(store: S, executor: Executor) -> Self {
        Self { store, executor }
    }

    /// The underlying configuration store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The executor namespace-scoped operations go through.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// The namespace layout.
    pub fn config(&self) -> &NamespaceConfig {
        self.executor.config()
    }

    /// Find the configuration record of a VRF.
    pub fn lookup<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> Option<&VrfRecord> {
        match vrf.into() {
            VrfRef::Name(name) => self.store.vrfs().find(|v| v.name == name),
            VrfRef::TableId(id) => self.store.vrfs().find(|v| v.table_id == Some(id)),
            VrfRef::Uuid(uuid) => self.store.vrf_by_uuid(&uuid),
        }
    }

    /// The record of the default VRF.
    pub fn default_vrf(&self) -> Option<&VrfRecord> {
        self.lookup(self.config().default_vrf_name())
    }

    /// Whether `vrf` denotes the default VRF.
    pub fn is_default<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> bool {
        match vrf.into() {
            VrfRef::TableId(id) => id == 0,
            VrfRef::Name(name) => self.config().is_default_vrf_name(name),
            VrfRef::Uuid(uuid) => self
                .store
                .vrf_by_uuid(&uuid)
                .is_some_and(|v| self.config().is_default_vrf_name(&v.name)),
        }
    }

    /// Name of the namespace backing `vrf`.
    pub fn namespace<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> Result<String> {
        let vrf = vrf.into();
        if self.is_default(vrf) {
            return Ok(self.config().default_namespace_name().to_string());
        }
        Ok(self.require(vrf)?.uuid.to_string())
    }

    /// UUID of the record of `vrf`.
    pub fn uuid<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> Result<Uuid> {
        Ok(self.record(vrf.into())?.uuid)
    }

    /// Routing table id of `vrf`.
    pub fn table_id<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> Result<i64> {
        let vrf = vrf.into();
        if self.is_default(vrf) {
            return Ok(0);
        }
        self.require(vrf)?.table_id.ok_or_else(|| {
            error!(%vrf, "vrf has no table id");
            Error::NotConfigured {
                what: format!("table id of {vrf}"),
            }
        })
    }

    /// Name of `vrf`.
    pub fn name<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> Result<String> {
        let vrf = vrf.into();
        if let VrfRef::Name(name) = vrf {
            if self.config().is_default_vrf_name(name) {
                return Ok(self.config().default_vrf_name().to_string());
            }
        }
        if let VrfRef::TableId(0) = vrf {
            return Ok(self.config().default_vrf_name().to_string());
        }
        Ok(self.require(vrf)?.name.clone())
    }

    /// Open a socket inside the namespace of `vrf`.
    ///
    /// Non-default VRFs always go through a worker thread; the calling
    /// thread's namespace is never changed.
    pub fn create_socket<'a>(
        &self,
        vrf: impl Into<VrfRef<'a>>,
        params: SocketParams,
    ) -> Result<OwnedFd> {
        let ns = self.namespace(vrf)?;
        self.executor.create_socket(&ns, params)
    }

    /// Close a socket opened with [`create_socket`](Self::create_socket).
    pub fn close_socket<'a>(&self, vrf: impl Into<VrfRef<'a>>, fd: OwnedFd) -> Result<()> {
        let ns = self.namespace(vrf)?;
        debug!(namespace = %ns, fd = fd.as_raw_fd(), "closing socket");
        drop(fd);
        Ok(())
    }

    /// Resolve an interface name to its index inside `vrf`.
    ///
    /// `Ok(None)` means the interface does not exist there.
    pub fn ifname_to_index<'a>(
        &self,
        vrf: impl Into<VrfRef<'a>>,
        ifname: &str,
    ) -> Result<Option<u32>> {
        let ns = self.namespace(vrf)?;
        self.executor.if_nametoindex(&ns, ifname)
    }

    /// Resolve an interface index to its name inside `vrf`.
    ///
    /// `Ok(None)` means no interface has that index there.
    pub fn ifindex_to_name<'a>(
        &self,
        vrf: impl Into<VrfRef<'a>>,
        index: u32,
    ) -> Result<Option<String>> {
        let ns = self.namespace(vrf)?;
        self.executor.if_indextoname(&ns, index)
    }

    /// Whether the namespace of `vrf` has been provisioned.
    ///
    /// A VRF record may exist before its namespace does; the record's
    /// status map carries the ready flag once it has been created.
    pub fn is_ready<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> bool {
        let vrf = vrf.into();
        if self.is_default(vrf) {
            return true;
        }
        let (key, value) = self.config().ready_key_value();
        self.lookup(vrf)
            .and_then(|v| v.status.get(key))
            .is_some_and(|s| s == value)
    }

    /// Move the calling thread into the namespace of `vrf`.
    ///
    /// The switch persists for the remaining lifetime of the thread; the
    /// caller owns the thread for as long as the switch matters.
    pub fn setns<'a>(&self, vrf: impl Into<VrfRef<'a>>) -> Result<()> {
        let vrf = vrf.into();
        let ns = self.namespace(vrf).inspect_err(|_| {
            error!(%vrf, "unable to find namespace");
        })?;
        namespace::enter_path(self.config().namespace_path(&ns))
    }

    /// Move interface `ifname` from one VRF to another.
    pub fn move_interface<'a, 'b>(
        &self,
        from: impl Into<VrfRef<'a>>,
        to: impl Into<VrfRef<'b>>,
        ifname: &str,
    ) -> Result<()> {
        let from = self.namespace(from)?;
        let to = self.namespace(to)?;
        migrate::move_interface(&self.executor, &from, &to, ifname)
    }

    /// Check whether `candidate` overlaps an address configured on `vrf`.
    ///
    /// See [`overlap::is_overlapping`].
    pub fn is_overlapping<'a>(
        &self,
        vrf: impl Into<VrfRef<'a>>,
        candidate: &str,
        ifname: &str,
        family: AddressFamily,
        secondary: bool,
    ) -> Result<bool> {
        let record = self.record(vrf.into())?;
        overlap::is_overlapping(candidate, ifname, family, secondary, record)
    }

    /// Configured source of `protocol` on `vrf`.
    pub fn protocol_source<'a>(
        &self,
        vrf: impl Into<VrfRef<'a>>,
        protocol: Protocol,
    ) -> Result<ProtocolSource> {
        Ok(source::resolve(protocol, self.record(vrf.into())?))
    }

    /// Concrete source address of `protocol` on `vrf`, if any.
    pub fn protocol_source_address<'a>(
        &self,
        vrf: impl Into<VrfRef<'a>>,
        protocol: Protocol,
    ) -> Result<Option<String>> {
        source::resolve_address(protocol, self.record(vrf.into())?)
    }

    /// Record of `vrf`, mapping default identities to the default record.
    fn record(&self, vrf: VrfRef<'_>) -> Result<&VrfRecord> {
        if self.is_default(vrf) {
            return self.default_vrf().ok_or_else(|| not_configured(vrf));
        }
        self.require(vrf)
    }

    fn require(&self, vrf: VrfRef<'_>) -> Result<&VrfRecord> {
        self.lookup(vrf).ok_or_else(|| not_configured(vrf))
    }
}

fn not_configured(vrf: VrfRef<'_>) -> Error {
    error!(%vrf, "vrf not found in configuration");
    Error::NotConfigured {
        what: vrf.to_string(),
    }
}
