//! Duplicate and overlapping address detection.
//!
//! Before an address is configured on an interface it is compared with
//! every address already configured on the VRF's ports. Two addresses
//! overlap when they are equal under the *shorter* of their two prefixes.
//!
//! Per port the primary address is checked first, then the secondaries,
//! and the first match decides:
//!
//! - a match with the primary of another interface is a conflict;
//! - a match with the primary of the same interface is a reconfiguration
//!   (no conflict) for a primary candidate, and a conflict for a secondary
//!   one;
//! - a match with any secondary address is a conflict.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::store::{PortRecord, VrfRecord};

/// Address family of a candidate address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Address width in bits.
    pub fn width(self) -> u8 {
        match self {
            Self::Ipv4 => 32,
            Self::Ipv6 => 128,
        }
    }

    /// Map an `AF_*` constant.
    pub fn from_af(af: i32) -> Option<Self> {
        match af {
            libc::AF_INET => Some(Self::Ipv4),
            libc::AF_INET6 => Some(Self::Ipv6),
            _ => None,
        }
    }

    /// Family of an address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::Ipv4,
            IpAddr::V6(_) => Self::Ipv6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4 => write!(f, "inet"),
            Self::Ipv6 => write!(f, "inet6"),
        }
    }
}

/// An address with its prefix length (`addr[/prefix]`).
///
/// A bare address is a host address with a full-width prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixedAddr {
    addr: IpAddr,
    prefix: u8,
}

impl PrefixedAddr {
    /// Parse `addr[/prefix]` as an address of `family`.
    pub fn parse(s: &str, family: AddressFamily) -> Result<Self> {
        let (addr_str, prefix_str) = match s.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (s, None),
        };

        let addr: IpAddr = addr_str
            .trim()
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("{s}: not an IP address")))?;
        if AddressFamily::of(&addr) != family {
            return Err(Error::InvalidAddress(format!("{s}: not an {family} address")));
        }

        let prefix = match prefix_str {
            Some(p) => p
                .trim()
                .parse::<u8>()
                .map_err(|_| Error::InvalidAddress(format!("{s}: invalid prefix length")))?,
            None => family.width(),
        };
        if prefix > family.width() {
            return Err(Error::InvalidAddress(format!(
                "{s}: prefix length {prefix} exceeds {}",
                family.width()
            )));
        }

        Ok(Self { addr, prefix })
    }

    /// The address part.
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length.
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The address with all bits past `prefix` cleared.
    pub fn masked(&self, prefix: u8) -> IpAddr {
        match self.addr {
            IpAddr::V4(a) => IpAddr::V4(mask_ipv4(a, prefix)),
            IpAddr::V6(a) => IpAddr::V6(mask_ipv6(a, prefix)),
        }
    }

    /// Whether both addresses are equal under the shorter of the two
    /// prefixes.
    pub fn overlaps(&self, other: &PrefixedAddr) -> bool {
        let prefix = self.prefix.min(other.prefix);
        self.masked(prefix) == other.masked(prefix)
    }
}

impl fmt::Display for PrefixedAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// Mask an IPv4 address (host order) to `prefix` bits.
fn mask_ipv4(addr: Ipv4Addr, prefix: u8) -> Ipv4Addr {
    let mask = u32::MAX
        .checked_shl(32 - u32::from(prefix.min(32)))
        .unwrap_or(0);
    Ipv4Addr::from(u32::from(addr) & mask)
}

/// Mask an IPv6 address to `prefix` bits, one 64-bit half at a time.
fn mask_ipv6(addr: Ipv6Addr, prefix: u8) -> Ipv6Addr {
    let bits = u128::from(addr);
    let high = (bits >> 64) as u64;
    let low = bits as u64;
    let prefix = u32::from(prefix.min(128));

    let (high, low) = if prefix <= 64 {
        (high & u64::MAX.checked_shl(64 - prefix).unwrap_or(0), 0)
    } else {
        (high, low & (u64::MAX << (128 - prefix)))
    };

    Ipv6Addr::from((u128::from(high) << 64) | u128::from(low))
}

/// Outcome of comparing a candidate with one port.
enum Verdict {
    Conflict,
    Reconfigure,
}

/// Check whether `candidate`, to be configured on `ifname`, duplicates or
/// overlaps an address already configured on `vrf`.
///
/// `secondary` tells whether the candidate is a secondary address. Stored
/// addresses that cannot be parsed are skipped.
pub fn is_overlapping(
    candidate: &str,
    ifname: &str,
    family: AddressFamily,
    secondary: bool,
    vrf: &VrfRecord,
) -> Result<bool> {
    let candidate = PrefixedAddr::parse(candidate, family)?;

    for port in &vrf.ports {
        match check_port(&candidate, ifname, family, secondary, port) {
            Some(Verdict::Conflict) => {
                trace!(%candidate, ifname, port = %port.name, vrf = %vrf.name, "address overlaps");
                return Ok(true);
            }
            Some(Verdict::Reconfigure) => {
                trace!(%candidate, ifname, "address already configured on interface");
                return Ok(false);
            }
            None => {}
        }
    }

    Ok(false)
}

fn check_port(
    candidate: &PrefixedAddr,
    ifname: &str,
    family: AddressFamily,
    secondary: bool,
    port: &PortRecord,
) -> Option<Verdict> {
    let (primary, secondaries) = match family {
        AddressFamily::Ipv4 => (&port.ip4_address, &port.ip4_address_secondary),
        AddressFamily::Ipv6 => (&port.ip6_address, &port.ip6_address_secondary),
    };

    if let Some(primary) = primary.as_deref().and_then(|a| stored(a, family, port)) {
        if candidate.overlaps(&primary) {
            // Port names are matched by prefix
            if port.name.starts_with(ifname) && !secondary {
                return Some(Verdict::Reconfigure);
            }
            return Some(Verdict::Conflict);
        }
    }

    secondaries
        .iter()
        .filter_map(|a| stored(a, family, port))
        .any(|a| candidate.overlaps(&a))
        .then_some(Verdict::Conflict)
}

fn stored(addr: &str, family: AddressFamily, port: &PortRecord) -> Option<PrefixedAddr> {
    PrefixedAddr::parse(addr, family)
        .inspect_err(|e| warn!(port = %port.name, "ignoring configured address: {}", e))
        .ok()
}
