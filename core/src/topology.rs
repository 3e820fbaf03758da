//! Star-shaped **topology graph** of a discovered device list.
//!
//! One node is chosen as the gateway with a simple heuristic: the `.1`
//! address of the first device's /24 if it was discovered, otherwise the
//! first device. This can pick a host that is not the real router when the
//! router lives elsewhere in the subnet. Roles of all other nodes depend on
//! that choice, so the heuristic is kept as is.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;
use lanscope_common::{error::TopologyError, network::device::Device};

use crate::resolver::AddressResolver;

pub mod dot;
pub mod report;

const VM_KEYWORDS: [&str; 3] = ["vmware", "virtualbox", "hyper-v"];
const HARDWARE_KEYWORDS: [&str; 6] = ["apple", "samsung", "google", "intel", "hp", "dell"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Gateway,
    Local,
    Device,
    Vm,
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Gateway => "gateway",
            Role::Local => "local",
            Role::Device => "device",
            Role::Vm => "vm",
            Role::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyNode {
    pub id: Ipv4Addr,
    pub role: Role,
    pub label: String,
    pub mac: MacAddr,
    pub vendor: Option<String>,
}

/// Undirected link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: Ipv4Addr,
    pub b: Ipv4Addr,
}

/// Star graph: every node except the gateway has exactly one edge, to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    gateway: usize,
    nodes: Vec<TopologyNode>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn gateway(&self) -> &TopologyNode {
        &self.nodes[self.gateway]
    }

    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: Ipv4Addr) -> Option<&TopologyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn count(&self, role: Role) -> usize {
        self.nodes.iter().filter(|node| node.role == role).count()
    }
}

pub struct TopologyGraphBuilder {
    local_addrs: Vec<Ipv4Addr>,
}

impl TopologyGraphBuilder {
    pub fn new(local_addrs: Vec<Ipv4Addr>) -> Self {
        Self { local_addrs }
    }

    pub fn from_resolver(resolver: &impl AddressResolver) -> Self {
        Self::new(resolver.local_addresses())
    }

    pub fn build(&self, devices: &[Device]) -> Result<Graph, TopologyError> {
        let gateway = detect_gateway(devices).ok_or(TopologyError::EmptyInput)?;

        let mut nodes: Vec<TopologyNode> = Vec::with_capacity(devices.len());
        let mut index: HashMap<Ipv4Addr, usize> = HashMap::new();

        for device in devices {
            let node = if device.ip == gateway {
                TopologyNode {
                    id: device.ip,
                    role: Role::Gateway,
                    label: format!("Gateway\n{}", device.ip),
                    mac: device.mac,
                    vendor: device.vendor.clone(),
                }
            } else {
                TopologyNode {
                    id: device.ip,
                    role: classify_role(device, &self.local_addrs),
                    label: device_label(device),
                    mac: device.mac,
                    vendor: device.vendor.clone(),
                }
            };

            match index.get(&device.ip) {
                Some(&at) => nodes[at] = node,
                None => {
                    index.insert(device.ip, nodes.len());
                    nodes.push(node);
                }
            }
        }

        let edges = nodes
            .iter()
            .filter(|node| node.id != gateway)
            .map(|node| Edge {
                a: gateway,
                b: node.id,
            })
            .collect();

        Ok(Graph {
            gateway: index[&gateway],
            nodes,
            edges,
        })
    }
}

/// `<first three octets of the first device>.1` when discovered, else the first device.
pub fn detect_gateway(devices: &[Device]) -> Option<Ipv4Addr> {
    let first = devices.first()?.ip;
    let [a, b, c, _] = first.octets();
    let candidate = Ipv4Addr::new(a, b, c, 1);

    if devices.iter().any(|device| device.ip == candidate) {
        Some(candidate)
    } else {
        Some(first)
    }
}

/// Role of a non-gateway device. The first matching rule wins.
pub fn classify_role(device: &Device, local_addrs: &[Ipv4Addr]) -> Role {
    if local_addrs.contains(&device.ip) {
        return Role::Local;
    }

    let vendor = device.vendor_or_unknown().to_lowercase();
    if VM_KEYWORDS.iter().any(|kw| vendor.contains(kw)) {
        Role::Vm
    } else if HARDWARE_KEYWORDS.iter().any(|kw| vendor.contains(kw)) {
        Role::Device
    } else {
        Role::Unknown
    }
}

fn device_label(device: &Device) -> String {
    let mac = device.mac.to_string();
    let prefix: String = mac.chars().take(8).collect();
    format!("{}\n{}\n{prefix}...", device.ip, device.vendor_or_unknown())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
