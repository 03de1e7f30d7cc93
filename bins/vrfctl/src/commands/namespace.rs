//! vrfctl namespace, ready and list commands.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use vrfkit::{ConfigStore, namespace};

use super::{Resolver, VrfArg};
use crate::output::{OutputOptions, Printable, print_all, print_one};

/// Namespace backing a VRF.
struct NamespaceInfo {
    vrf: String,
    namespace: String,
    provisioned: bool,
    ready: bool,
}

impl Printable for NamespaceInfo {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "{} netns {}", self.vrf, self.namespace)?;
        if !self.provisioned {
            write!(w, " (missing)")?;
        }
        if !self.ready {
            write!(w, " (not ready)")?;
        }
        writeln!(w)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "vrf": self.vrf,
            "namespace": self.namespace,
            "provisioned": self.provisioned,
            "ready": self.ready,
        })
    }
}

fn namespace_info(resolver: &Resolver, vrf: &VrfArg) -> Result<NamespaceInfo> {
    let vrf = vrf.vrf_ref();
    let namespace = resolver.namespace(vrf)?;
    Ok(NamespaceInfo {
        vrf: resolver.name(vrf)?,
        provisioned: namespace::exists_in(resolver.config().namespace_dir(), &namespace),
        ready: resolver.is_ready(vrf),
        namespace,
    })
}

#[derive(Args)]
pub struct NamespaceCmd {
    /// VRF name, table id or UUID.
    vrf: VrfArg,
}

impl NamespaceCmd {
    pub fn run(&self, resolver: &Resolver, opts: &OutputOptions) -> Result<()> {
        let info = namespace_info(resolver, &self.vrf)?;
        print_one(&info, opts)?;
        Ok(())
    }
}

/// Readiness of a VRF.
struct Readiness {
    vrf: String,
    ready: bool,
}

impl Printable for Readiness {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let state = if self.ready { "ready" } else { "not ready" };
        writeln!(w, "{} {}", self.vrf, state)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "vrf": self.vrf, "ready": self.ready })
    }
}

#[derive(Args)]
pub struct ReadyCmd {
    /// VRF name, table id or UUID.
    vrf: VrfArg,
}

impl ReadyCmd {
    pub fn run(&self, resolver: &Resolver, opts: &OutputOptions) -> Result<()> {
        let readiness = Readiness {
            vrf: self.vrf.to_string(),
            ready: resolver.is_ready(self.vrf.vrf_ref()),
        };
        print_one(&readiness, opts)?;
        Ok(())
    }
}

/// A namespace found on the system.
struct NamespaceEntry {
    name: String,
    vrf: Option<String>,
}

impl Printable for NamespaceEntry {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match &self.vrf {
            Some(vrf) => writeln!(w, "{} (vrf: {})", self.name, vrf),
            None => writeln!(w, "{}", self.name),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "name": self.name, "vrf": self.vrf })
    }
}

#[derive(Args)]
pub struct ListCmd {}

impl ListCmd {
    pub fn run(&self, resolver: &Resolver, opts: &OutputOptions) -> Result<()> {
        let config = resolver.config();
        let entries: Vec<NamespaceEntry> = namespace::list_in(config.namespace_dir())?
            .into_iter()
            .map(|name| {
                let vrf = if config.is_default_namespace(&name) {
                    Some(config.default_vrf_name().to_string())
                } else {
                    resolver
                        .store()
                        .vrfs()
                        .find(|v| v.uuid.to_string() == name)
                        .map(|v| v.name.clone())
                };
                NamespaceEntry { name, vrf }
            })
            .collect();

        print_all(&entries, opts)?;
        Ok(())
    }
}
