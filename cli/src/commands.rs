pub mod capture;
pub mod discover;
pub mod interfaces;
pub mod topology;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lanscope_common::config::DEFAULT_OUTPUT_DIR;
use lanscope_common::error;
use lanscope_common::network::target::TargetSpec;

#[derive(Parser)]
#[command(name = "lanscope")]
#[command(about = "LAN discovery, packet capture and topology mapping.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Reduce output: -q hides decorations, -qq prints only results
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Skip the MAC vendor lookup
    #[arg(long, global = true)]
    pub no_vendor: bool,

    /// Directory for scan results, summaries and reports
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover live hosts with ARP
    #[command(alias = "d")]
    Discover(DiscoverArgs),
    /// Capture and classify live traffic
    #[command(alias = "c")]
    Capture(CaptureArgs),
    /// Build a topology graph and report from saved scan results
    #[command(alias = "t")]
    Topology(TopologyArgs),
    /// List interfaces usable for capture
    #[command(alias = "i")]
    Interfaces,
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// `lan`, a CIDR block, a single IPv4 address or a comma-separated list
    pub target: Option<TargetSpec>,

    /// Resolve a domain name and probe each of its addresses
    #[arg(long, conflicts_with = "target")]
    pub domain: Option<String>,

    /// Seconds to wait for replies in each probe round
    #[arg(long, default_value_t = 3)]
    pub timeout: u64,

    /// Retransmission rounds for silent hosts
    #[arg(long, default_value_t = 1)]
    pub retries: u32,

    /// Interface to probe from instead of the routed one
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Where to save the device list
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CaptureArgs {
    /// Device to capture on, the backend default when omitted
    #[arg(short, long)]
    pub interface: Option<String>,

    /// BPF filter expression
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop after this many frames, 0 for unlimited
    #[arg(short, long, default_value_t = 0)]
    pub count: u64,

    /// Stop after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Export the captured frames as pcap
    #[arg(long)]
    pub pcap: Option<PathBuf>,

    /// Where to save the session summary
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Session log file, `<output-dir>/sniff_logs.txt` when omitted
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct TopologyArgs {
    /// Scan results to load, the newest in the output directory when omitted
    pub scan: Option<PathBuf>,

    /// Where to write the Graphviz graph
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Where to write the text report
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Raw sockets and live capture both need root.
pub fn ensure_root(action: &str) -> bool {
    if is_root::is_root() {
        return true;
    }
    error!("{action} requires root privileges, try again with sudo");
    false
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
