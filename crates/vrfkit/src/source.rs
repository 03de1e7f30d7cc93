//! Protocol source selection.
//!
//! Management protocols (TFTP, TACACS+, RADIUS) can be told which source
//! address to use per VRF, either directly as an IP or indirectly through an
//! interface. Overrides are stored per protocol and in a wildcard `all`
//! bucket:
//!
//! 1. source IP of the protocol;
//! 2. source interface of the protocol;
//! 3. the same two for `all`;
//! 4. unset.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::{PortRecord, VrfRecord};

/// A protocol with configurable source address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tftp,
    Tacacs,
    Radius,
    /// Wildcard bucket applying to every protocol.
    All,
}

impl Protocol {
    /// Key of the protocol in the source override maps.
    pub fn key(self) -> &'static str {
        match self {
            Self::Tftp => "tftp",
            Self::Tacacs => "tacacs",
            Self::Radius => "radius",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tftp" => Ok(Self::Tftp),
            "tacacs" | "tacacs+" => Ok(Self::Tacacs),
            "radius" => Ok(Self::Radius),
            "all" => Ok(Self::All),
            _ => Err(Error::NotConfigured {
                what: format!("source protocol '{s}'"),
            }),
        }
    }
}

/// Configured source of a protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolSource {
    /// Source IP address.
    Ip(String),
    /// Source interface name.
    Interface(String),
    /// Nothing configured.
    Unset,
}

impl ProtocolSource {
    /// Whether a source is configured.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

/// Source configured for exactly `protocol`, ignoring the `all` bucket.
pub fn configured(protocol: Protocol, vrf: &VrfRecord) -> ProtocolSource {
    let key = protocol.key();

    if let Some(ip) = vrf.source_ip.get(key).filter(|ip| !ip.is_empty()) {
        return ProtocolSource::Ip(ip.clone());
    }
    if let Some(ifname) = vrf.source_interface.get(key) {
        return ProtocolSource::Interface(ifname.clone());
    }
    ProtocolSource::Unset
}

/// Resolve the source of `protocol` on `vrf`, falling back to the `all`
/// bucket.
pub fn resolve(protocol: Protocol, vrf: &VrfRecord) -> ProtocolSource {
    match configured(protocol, vrf) {
        ProtocolSource::Unset if protocol != Protocol::All => configured(Protocol::All, vrf),
        source => source,
    }
}

/// IPv4 host address of an interface on `vrf`: its primary address, or the
/// numerically lowest secondary one.
pub fn interface_address(vrf: &VrfRecord, ifname: &str) -> Option<Ipv4Addr> {
    let port = vrf.find_port(ifname)?;

    if let Some(addr) = port.ip4_address.as_deref().and_then(|a| host(a, port)) {
        return Some(addr);
    }
    port.ip4_address_secondary
        .iter()
        .filter_map(|a| host(a, port))
        .min()
}

/// Resolve `protocol` to a concrete source address.
///
/// An interface source is replaced by the address configured on it;
/// `Ok(None)` means no source is configured.
pub fn resolve_address(protocol: Protocol, vrf: &VrfRecord) -> Result<Option<String>> {
    match resolve(protocol, vrf) {
        ProtocolSource::Ip(ip) => Ok(Some(ip)),
        ProtocolSource::Interface(ifname) => match interface_address(vrf, &ifname) {
            Some(addr) => {
                debug!(%protocol, ifname = %ifname, %addr, "using interface address as source");
                Ok(Some(addr.to_string()))
            }
            None => Err(Error::NotConfigured {
                what: format!("IPv4 address on source interface '{ifname}'"),
            }),
        },
        ProtocolSource::Unset => Ok(None),
    }
}

fn host(addr: &str, port: &PortRecord) -> Option<Ipv4Addr> {
    let host = addr.split_once('/').map_or(addr, |(a, _)| a);
    host.trim()
        .parse::<Ipv4Addr>()
        .inspect_err(|_| warn!(port = %port.name, addr, "ignoring malformed IPv4 address"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn vrf() -> VrfRecord {
        VrfRecord::new("red", Uuid::nil())
    }

    #[test]
    fn test_protocol_keys() {
        assert_eq!("TACACS".parse::<Protocol>().unwrap(), Protocol::Tacacs);
        assert_eq!("tacacs+".parse::<Protocol>().unwrap(), Protocol::Tacacs);
        assert_eq!(Protocol::Radius.to_string(), "radius");
        assert!("snmp".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_falls_back_to_all_ip() {
        let vrf = vrf().source_ip("all", "1.1.1.1");
        assert_eq!(
            resolve(Protocol::Tacacs, &vrf),
            ProtocolSource::Ip("1.1.1.1".into())
        );
    }

    #[test]
    fn test_ip_outranks_interface() {
        let vrf = vrf()
            .source_ip("tftp", "10.0.0.1")
            .source_interface("tftp", "1");
        assert_eq!(
            resolve(Protocol::Tftp, &vrf),
            ProtocolSource::Ip("10.0.0.1".into())
        );
    }

    #[test]
    fn test_protocol_interface_outranks_all_ip() {
        let vrf = vrf()
            .source_interface("radius", "2")
            .source_ip("all", "1.1.1.1");
        assert_eq!(
            resolve(Protocol::Radius, &vrf),
            ProtocolSource::Interface("2".into())
        );
    }

    #[test]
    fn test_empty_ip_is_unset() {
        let vrf = vrf().source_ip("tftp", "").source_interface("all", "3");
        assert_eq!(configured(Protocol::Tftp, &vrf), ProtocolSource::Unset);
        assert_eq!(
            resolve(Protocol::Tftp, &vrf),
            ProtocolSource::Interface("3".into())
        );
    }

    #[test]
    fn test_nothing_configured() {
        let vrf = vrf().source_ip("radius", "10.0.0.1");
        assert_eq!(resolve(Protocol::Tacacs, &vrf), ProtocolSource::Unset);
        assert!(!resolve(Protocol::All, &vrf).is_set());
    }

    #[test]
    fn test_interface_address_prefers_primary() {
        let vrf = vrf().port(
            PortRecord::new("1")
                .ip4("10.0.0.1/24")
                .ip4_secondary("9.0.0.1/24"),
        );
        assert_eq!(interface_address(&vrf, "1"), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_interface_address_lowest_secondary() {
        let vrf = vrf().port(
            PortRecord::new("1")
                .ip4_secondary("10.0.0.20/24")
                .ip4_secondary("10.0.0.3/24")
                .ip4_secondary("9.255.0.1/8"),
        );
        assert_eq!(interface_address(&vrf, "1"), Some(Ipv4Addr::new(9, 255, 0, 1)));
        assert_eq!(interface_address(&vrf, "2"), None);
    }

    #[test]
    fn test_resolve_address() {
        let vrf = vrf()
            .port(PortRecord::new("1").ip4("10.0.0.1/24"))
            .port(PortRecord::new("2"))
            .source_interface("tftp", "1")
            .source_interface("radius", "2")
            .source_ip("tacacs", "192.0.2.1");

        assert_eq!(
            resolve_address(Protocol::Tftp, &vrf).unwrap().as_deref(),
            Some("10.0.0.1")
        );
        assert_eq!(
            resolve_address(Protocol::Tacacs, &vrf).unwrap().as_deref(),
            Some("192.0.2.1")
        );
        assert!(resolve_address(Protocol::Radius, &vrf).is_err());
        assert_eq!(resolve_address(Protocol::All, &vrf).unwrap(), None);
    }
}
