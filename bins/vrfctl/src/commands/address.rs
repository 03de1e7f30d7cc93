//! vrfctl overlap command.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use vrfkit::AddressFamily;

use super::{Resolver, VrfArg};
use crate::output::{OutputOptions, Printable, print_one};

/// Result of an overlap check.
struct OverlapReport {
    address: String,
    ifname: String,
    secondary: bool,
    overlapping: bool,
}

impl Printable for OverlapReport {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let kind = if self.secondary { "secondary " } else { "" };
        if self.overlapping {
            writeln!(
                w,
                "{}{} on {}: overlaps an existing address",
                kind, self.address, self.ifname
            )
        } else {
            writeln!(w, "{}{} on {}: ok", kind, self.address, self.ifname)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "address": self.address,
            "ifname": self.ifname,
            "secondary": self.secondary,
            "overlapping": self.overlapping,
        })
    }
}

#[derive(Args)]
pub struct OverlapCmd {
    /// VRF name, table id or UUID.
    vrf: VrfArg,

    /// Interface the address would be configured on.
    ifname: String,

    /// Address with optional prefix length (e.g. 10.0.0.1/24).
    address: String,

    /// Check as a secondary address.
    #[arg(long)]
    secondary: bool,

    /// The address is IPv6.
    #[arg(short = '6')]
    ipv6: bool,
}

impl OverlapCmd {
    pub fn run(&self, resolver: &Resolver, opts: &OutputOptions) -> Result<()> {
        let family = if self.ipv6 {
            AddressFamily::Ipv6
        } else {
            AddressFamily::Ipv4
        };
        let overlapping = resolver.is_overlapping(
            self.vrf.vrf_ref(),
            &self.address,
            &self.ifname,
            family,
            self.secondary,
        )?;

        let report = OverlapReport {
            address: self.address.clone(),
            ifname: self.ifname.clone(),
            secondary: self.secondary,
            overlapping,
        };
        print_one(&report, opts)?;
        Ok(())
    }
}
