use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

/// Inclusive span of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            0
        } else {
            (end - start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let addr: u32 = addr.into();
        u32::from(self.start_addr) <= addr && addr <= u32::from(self.end_addr)
    }
}

/// The part of `target` that lies on `link`.
///
/// CIDR blocks either nest or do not overlap at all, so the result is the
/// narrower of the two, or `None` when they are disjoint.
pub fn on_link(target: Ipv4Network, link: Ipv4Network) -> Option<Ipv4Network> {
    if target.prefix() >= link.prefix() && link.contains(target.network()) {
        return Some(target);
    }
    if link.prefix() >= target.prefix() && target.contains(link.network()) {
        return Ipv4Network::new(link.network(), link.prefix()).ok();
    }
    None
}

/// Addresses that receive a probe for a CIDR block.
///
/// Prefixes up to `/30` skip the network and broadcast addresses. `/31`
/// (point-to-point) and `/32` (single host) probe every address they hold.
pub fn usable_hosts(network: Ipv4Network) -> Ipv4Range {
    let net_u32: u32 = network.network().into();
    let broadcast_u32: u32 = network.broadcast().into();

    if network.prefix() >= 31 {
        return Ipv4Range::new(network.network(), network.broadcast());
    }

    Ipv4Range::new(
        Ipv4Addr::from(net_u32 + 1),
        Ipv4Addr::from(broadcast_u32 - 1),
    )
}

/// Converts a dotted netmask into a prefix length by counting its set bits.
pub fn netmask_to_prefix(netmask: Ipv4Addr) -> u8 {
    u32::from(netmask).count_ones() as u8
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
