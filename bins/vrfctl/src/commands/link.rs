//! vrfctl ifindex, ifname and move commands.

use std::io::{self, Write};

use anyhow::{Result, bail};
use clap::Args;

use super::{Resolver, VrfArg};
use crate::output::{OutputOptions, Printable, print_one};

/// An interface resolved inside a VRF.
struct Interface {
    vrf: String,
    name: String,
    index: u32,
}

impl Printable for Interface {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}: {} vrf {}", self.index, self.name, self.vrf)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "vrf": self.vrf,
            "ifname": self.name,
            "ifindex": self.index,
        })
    }
}

#[derive(Args)]
pub struct IfindexCmd {
    /// VRF name, table id or UUID.
    vrf: VrfArg,

    /// Interface name.
    ifname: String,
}

impl IfindexCmd {
    pub fn run(&self, resolver: &Resolver, opts: &OutputOptions) -> Result<()> {
        let Some(index) = resolver.ifname_to_index(self.vrf.vrf_ref(), &self.ifname)? else {
            bail!("interface \"{}\" not found in vrf {}", self.ifname, self.vrf);
        };
        let iface = Interface {
            vrf: self.vrf.to_string(),
            name: self.ifname.clone(),
            index,
        };
        print_one(&iface, opts)?;
        Ok(())
    }
}

#[derive(Args)]
pub struct IfnameCmd {
    /// VRF name, table id or UUID.
    vrf: VrfArg,

    /// Interface index.
    index: u32,
}

impl IfnameCmd {
    pub fn run(&self, resolver: &Resolver, opts: &OutputOptions) -> Result<()> {
        let Some(name) = resolver.ifindex_to_name(self.vrf.vrf_ref(), self.index)? else {
            bail!("no interface with index {} in vrf {}", self.index, self.vrf);
        };
        let iface = Interface {
            vrf: self.vrf.to_string(),
            name,
            index: self.index,
        };
        print_one(&iface, opts)?;
        Ok(())
    }
}

#[derive(Args)]
pub struct MoveCmd {
    /// VRF the interface is in.
    from: VrfArg,

    /// VRF to move the interface to.
    to: VrfArg,

    /// Interface name.
    ifname: String,
}

impl MoveCmd {
    pub fn run(&self, resolver: &Resolver) -> Result<()> {
        resolver.move_interface(self.from.vrf_ref(), self.to.vrf_ref(), &self.ifname)?;
        Ok(())
    }
}
