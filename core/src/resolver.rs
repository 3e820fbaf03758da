//! Host network configuration and name resolution, behind a trait so the
//! discovery engine can be driven by a fake in tests.

use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use pnet::ipnetwork::Ipv4Network;

use lanscope_common::{
    error::ResolveError,
    network::{interface, range},
};

#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Subnet bound to the interface carrying the default route.
    fn gateway_subnet(&self) -> Result<Ipv4Network, ResolveError>;

    /// Forward lookup of `name`. Any failure yields an empty list.
    async fn resolve_domain(&self, name: &str) -> Vec<Ipv4Addr>;

    /// IPv4 addresses bound to this host.
    fn local_addresses(&self) -> Vec<Ipv4Addr>;
}

/// Resolver backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl AddressResolver for SystemResolver {
    fn gateway_subnet(&self) -> Result<Ipv4Network, ResolveError> {
        let (intf, net) = interface::default_route_network()
            .or_else(interface::get_lan_network)
            .ok_or(ResolveError::NotFound)?;

        let subnet = subnet_of(net)?;
        tracing::debug!("default route through {} on {subnet}", intf.name);
        Ok(subnet)
    }

    async fn resolve_domain(&self, name: &str) -> Vec<Ipv4Addr> {
        match tokio::net::lookup_host((name, 0)).await {
            Ok(addrs) => dedup_v4(addrs.map(|addr| addr.ip())),
            Err(e) => {
                tracing::debug!("lookup of {name} failed: {e}");
                Vec::new()
            }
        }
    }

    fn local_addresses(&self) -> Vec<Ipv4Addr> {
        interface::local_ipv4_addrs()
    }
}

/// Network address of `net` with the prefix recomputed from its netmask.
fn subnet_of(net: Ipv4Network) -> Result<Ipv4Network, ResolveError> {
    let prefix = range::netmask_to_prefix(net.mask());
    Ipv4Network::new(net.network(), prefix).map_err(|_| ResolveError::NotFound)
}

/// Keeps IPv4 answers only, first occurrence wins.
fn dedup_v4(addrs: impl Iterator<Item = IpAddr>) -> Vec<Ipv4Addr> {
    let mut out: Vec<Ipv4Addr> = Vec::new();
    for addr in addrs {
        if let IpAddr::V4(v4) = addr
            && !out.contains(&v4)
        {
            out.push(v4);
        }
    }
    out
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
