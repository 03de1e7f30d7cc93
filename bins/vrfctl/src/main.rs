//! vrfctl command - inspect VRF namespaces, interfaces and address conflicts.

mod commands;
mod output;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use vrfkit::config::{NETNS_RUN_DIR, SWITCH_NAMESPACE};
use vrfkit::{MemoryStore, NamespaceConfig, VrfResolver};

use output::{OutputFormat, OutputOptions};

#[derive(Parser)]
#[command(name = "vrfctl", version, about = "VRF namespace inspection tool")]
struct Cli {
    /// Configuration database snapshot (JSON).
    #[arg(long, value_name = "FILE")]
    db: PathBuf,

    /// Directory holding named network namespaces.
    #[arg(long, value_name = "DIR", default_value = NETNS_RUN_DIR)]
    netns_dir: PathBuf,

    /// Namespace of the default VRF.
    #[arg(long, value_name = "NAME", default_value = SWITCH_NAMESPACE)]
    default_namespace: String,

    /// Output JSON.
    #[arg(short = 'j', long)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the namespace backing a VRF.
    #[command(visible_alias = "ns")]
    Namespace(commands::namespace::NamespaceCmd),

    /// Check whether a VRF's namespace is ready.
    Ready(commands::namespace::ReadyCmd),

    /// List namespaces and the VRFs they back.
    #[command(visible_alias = "ls")]
    List(commands::namespace::ListCmd),

    /// Resolve an interface name to its index inside a VRF.
    Ifindex(commands::link::IfindexCmd),

    /// Resolve an interface index to its name inside a VRF.
    Ifname(commands::link::IfnameCmd),

    /// Move an interface from one VRF to another.
    Move(commands::link::MoveCmd),

    /// Check an address for overlap with the VRF's configured addresses.
    Overlap(commands::address::OverlapCmd),

    /// Show the source address used by a protocol.
    Source(commands::source::SourceCmd),
}

fn load_store(path: &Path) -> anyhow::Result<MemoryStore> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let opts = OutputOptions {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        pretty: cli.pretty,
    };

    let config = NamespaceConfig::new()
        .run_dir(cli.netns_dir)
        .default_namespace(cli.default_namespace);
    let resolver = VrfResolver::new(load_store(&cli.db)?, config);

    match cli.command {
        Command::Namespace(cmd) => cmd.run(&resolver, &opts),
        Command::Ready(cmd) => cmd.run(&resolver, &opts),
        Command::List(cmd) => cmd.run(&resolver, &opts),
        Command::Ifindex(cmd) => cmd.run(&resolver, &opts),
        Command::Ifname(cmd) => cmd.run(&resolver, &opts),
        Command::Move(cmd) => cmd.run(&resolver),
        Command::Overlap(cmd) => cmd.run(&resolver, &opts),
        Command::Source(cmd) => cmd.run(&resolver, &opts),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
