//! vrfctl source command.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use vrfkit::{Protocol, ProtocolSource};

use super::{Resolver, VrfArg};
use crate::output::{OutputOptions, Printable, print_one};

/// Configured and resolved source of a protocol.
struct SourceInfo {
    protocol: Protocol,
    source: ProtocolSource,
    address: Option<String>,
}

impl Printable for SourceInfo {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match &self.source {
            ProtocolSource::Ip(ip) => writeln!(w, "{} source ip {}", self.protocol, ip),
            ProtocolSource::Interface(ifname) => match &self.address {
                Some(addr) => writeln!(
                    w,
                    "{} source interface {} ({})",
                    self.protocol, ifname, addr
                ),
                None => writeln!(w, "{} source interface {}", self.protocol, ifname),
            },
            ProtocolSource::Unset => writeln!(w, "{} source unset", self.protocol),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let (kind, value) = match &self.source {
            ProtocolSource::Ip(ip) => ("ip", Some(ip)),
            ProtocolSource::Interface(ifname) => ("interface", Some(ifname)),
            ProtocolSource::Unset => ("unset", None),
        };
        serde_json::json!({
            "protocol": self.protocol.key(),
            "type": kind,
            "value": value,
            "address": self.address,
        })
    }
}

#[derive(Args)]
pub struct SourceCmd {
    /// VRF name, table id or UUID.
    vrf: VrfArg,

    /// Protocol (tftp, tacacs, radius, all).
    protocol: String,
}

impl SourceCmd {
    pub fn run(&self, resolver: &Resolver, opts: &OutputOptions) -> Result<()> {
        let protocol: Protocol = self.protocol.parse()?;
        let vrf = self.vrf.vrf_ref();

        let source = resolver.protocol_source(vrf, protocol)?;
        // An interface without an IPv4 address still reports its name
        let address = resolver.protocol_source_address(vrf, protocol).ok().flatten();

        print_one(
            &SourceInfo {
                protocol,
                source,
                address,
            },
            opts,
        )?;
        Ok(())
    }
}
