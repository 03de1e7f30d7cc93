//! VRF and network namespace utilities for switch control plane daemons.
//!
//! Each non-default VRF of the switch is backed by a Linux network
//! namespace. This crate resolves VRFs to their namespaces, runs
//! namespace-sensitive operations (socket creation, interface name/index
//! lookups, interface migration) without disturbing the namespace of the
//! calling thread, and checks address configuration for duplicates and
//! overlapping subnets.
//!
//! # Features
//!
//! - `serde` - Serialize/deserialize configuration records
//! - `integration` - Build the privileged integration tests
//!
//! # Example
//!
//! ```ignore
//! use vrfkit::{AddressFamily, MemoryStore, NamespaceConfig, Protocol, VrfResolver};
//!
//! let resolver = VrfResolver::new(store, NamespaceConfig::default());
//!
//! // Namespace of a VRF, by name, table id or UUID
//! let ns = resolver.namespace("red")?;
//!
//! // Interface lookup inside the VRF's namespace
//! if let Some(index) = resolver.ifname_to_index("red", "1")? {
//!     println!("{} has index {} in {}", "1", index, ns);
//! }
//!
//! // Address conflicts
//! if resolver.is_overlapping("red", "10.0.0.1/24", "2", AddressFamily::Ipv4, false)? {
//!     eprintln!("address overlaps an existing subnet");
//! }
//!
//! // Source address of a management protocol
//! let source = resolver.protocol_source("red", Protocol::Tacacs)?;
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing`. Install a subscriber in the consuming
//! daemon; namespace worker threads inherit the caller's dispatcher.

pub mod config;
pub mod error;
pub mod executor;
pub mod ifname;
pub mod migrate;
pub mod namespace;
pub mod netlink;
pub mod overlap;
pub mod source;
pub mod store;
pub mod vrf;

// Re-export common types at crate root for convenience
pub use config::NamespaceConfig;
pub use error::{Error, Result};
pub use executor::{Executor, NsOperation, NsOutcome, SocketParams};
pub use overlap::{AddressFamily, PrefixedAddr};
pub use source::{Protocol, ProtocolSource};
pub use store::{ConfigStore, MemoryStore, PortRecord, VrfRecord};
pub use vrf::{VrfRef, VrfResolver};
