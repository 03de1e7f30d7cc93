//! Read-only view of the configuration database.
//!
//! The database itself lives outside this crate. Resolution code only needs
//! to list VRF records with their attached ports, so the store is a small
//! trait; [`MemoryStore`] implements it over an owned snapshot.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A queryable set of VRF records.
pub trait ConfigStore {
    /// Iterate over all VRF records.
    fn vrfs(&self) -> impl Iterator<Item = &VrfRecord> + '_;

    /// Find a VRF record by its UUID.
    fn vrf_by_uuid(&self, uuid: &Uuid) -> Option<&VrfRecord> {
        self.vrfs().find(|v| v.uuid == *uuid)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn vrfs(&self) -> impl Iterator<Item = &VrfRecord> + '_ {
        (**self).vrfs()
    }
}

/// A VRF row.
///
/// The UUID names the backing namespace, so snapshots must always carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VrfRecord {
    pub uuid: Uuid,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Kernel routing table; unset until the VRF has been provisioned.
    #[cfg_attr(feature = "serde", serde(default))]
    pub table_id: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ports: Vec<PortRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: BTreeMap<String, String>,
    /// Per-protocol source IP overrides, keyed by protocol name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_ip: BTreeMap<String, String>,
    /// Per-protocol source interface overrides, keyed by protocol name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_interface: BTreeMap<String, String>,
}

impl Default for VrfRecord {
    fn default() -> Self {
        Self {
            uuid: Uuid::nil(),
            name: String::new(),
            table_id: None,
            ports: Vec::new(),
            status: BTreeMap::new(),
            source_ip: BTreeMap::new(),
            source_interface: BTreeMap::new(),
        }
    }
}

impl VrfRecord {
    /// Create a record with the given identity.
    pub fn new(name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            uuid,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the routing table.
    pub fn table_id(mut self, table_id: i64) -> Self {
        self.table_id = Some(table_id);
        self
    }

    /// Attach a port.
    pub fn port(mut self, port: PortRecord) -> Self {
        self.ports.push(port);
        self
    }

    /// Set a status entry.
    pub fn status(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.status.insert(key.into(), value.into());
        self
    }

    /// Set a protocol source IP override.
    pub fn source_ip(mut self, protocol: impl Into<String>, ip: impl Into<String>) -> Self {
        self.source_ip.insert(protocol.into(), ip.into());
        self
    }

    /// Set a protocol source interface override.
    pub fn source_interface(
        mut self,
        protocol: impl Into<String>,
        ifname: impl Into<String>,
    ) -> Self {
        self.source_interface.insert(protocol.into(), ifname.into());
        self
    }

    /// Find an attached port by exact name.
    pub fn find_port(&self, name: &str) -> Option<&PortRecord> {
        self.ports.iter().find(|p| p.name == name)
    }
}

/// A port row: an interface with its layer 3 configuration.
///
/// Addresses are strings in `addr[/prefix]` form, as stored in the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PortRecord {
    pub name: String,
    pub ip4_address: Option<String>,
    pub ip4_address_secondary: Vec<String>,
    pub ip6_address: Option<String>,
    pub ip6_address_secondary: Vec<String>,
}

impl PortRecord {
    /// Create a port without addresses.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the primary IPv4 address.
    pub fn ip4(mut self, addr: impl Into<String>) -> Self {
        self.ip4_address = Some(addr.into());
        self
    }

    /// Add a secondary IPv4 address.
    pub fn ip4_secondary(mut self, addr: impl Into<String>) -> Self {
        self.ip4_address_secondary.push(addr.into());
        self
    }

    /// Set the primary IPv6 address.
    pub fn ip6(mut self, addr: impl Into<String>) -> Self {
        self.ip6_address = Some(addr.into());
        self
    }

    /// Add a secondary IPv6 address.
    pub fn ip6_secondary(mut self, addr: impl Into<String>) -> Self {
        self.ip6_address_secondary.push(addr.into());
        self
    }
}

/// An in-memory store holding a snapshot of VRF records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemoryStore {
    #[cfg_attr(feature = "serde", serde(default))]
    pub vrfs: Vec<VrfRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a VRF record.
    pub fn with_vrf(mut self, vrf: VrfRecord) -> Self {
        self.vrfs.push(vrf);
        self
    }
}

impl ConfigStore for MemoryStore {
    fn vrfs(&self) -> impl Iterator<Item = &VrfRecord> + '_ {
        self.vrfs.iter()
    }
}
