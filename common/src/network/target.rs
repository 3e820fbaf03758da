//! # Discovery Target Model
//!
//! Defines what a sweep is pointed at.
//!
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A single host, held as a `/32` block.
//! * The local LAN, detected through the host's default route.
//!
//! Whether a string is a block or a host is decided by the presence of the
//! `/` delimiter. Domain names never reach this layer, they are resolved to
//! hosts beforehand.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::TargetError;
use crate::network::range::{self, Ipv4Range};

/// One validated IPv4 block handed to the discovery engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoveryTarget {
    network: Ipv4Network,
}

impl DiscoveryTarget {
    pub fn host(addr: Ipv4Addr) -> Self {
        Self {
            network: Ipv4Network::from(addr),
        }
    }

    pub fn from_network(network: Ipv4Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Ipv4Network {
        self.network
    }

    pub fn is_single_host(&self) -> bool {
        self.network.prefix() == 32
    }

    /// This target cut down to what `link` can reach, `None` when nothing is.
    pub fn on_link(&self, link: Ipv4Network) -> Option<Self> {
        range::on_link(self.network, link).map(Self::from_network)
    }

    /// Every address that receives a probe, see [`range::usable_hosts`].
    pub fn probe_range(&self) -> Ipv4Range {
        range::usable_hosts(self.network)
    }
}

impl fmt::Display for DiscoveryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.ip(), self.network.prefix())
    }
}

impl FromStr for DiscoveryTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        match s.split_once('/') {
            Some((ip_str, prefix_str)) => parse_cidr(ip_str, prefix_str),
            None => parse_host(s),
        }
    }
}

fn parse_host(s: &str) -> Result<DiscoveryTarget, TargetError> {
    s.parse::<Ipv4Addr>()
        .map(DiscoveryTarget::host)
        .map_err(|_| TargetError::InvalidAddress(s.to_string()))
}

fn parse_cidr(ip_str: &str, prefix_str: &str) -> Result<DiscoveryTarget, TargetError> {
    let addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|_| TargetError::InvalidAddress(ip_str.to_string()))?;

    let prefix = prefix_str
        .parse::<u8>()
        .ok()
        .filter(|prefix| *prefix <= 32)
        .ok_or_else(|| TargetError::InvalidPrefix(prefix_str.to_string()))?;

    let network = Ipv4Network::new(addr, prefix)
        .map_err(|_| TargetError::InvalidPrefix(prefix_str.to_string()))?;

    Ok(DiscoveryTarget { network })
}

/// What the user asked to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// The subnet bound to the default-route interface.
    Lan,
    /// One or more explicit blocks, scanned independently.
    Explicit(Vec<DiscoveryTarget>),
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    /// Accepts `lan` (case-insensitive), a single block/host, or a
    /// comma-separated list such as `10.0.0.5, 192.168.1.0/24`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("lan") {
            return Ok(TargetSpec::Lan);
        }

        let targets = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(DiscoveryTarget::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if targets.is_empty() {
            return Err(TargetError::Empty);
        }

        Ok(TargetSpec::Explicit(targets))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
