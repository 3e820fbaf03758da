use std::fmt::Write;

use serde::{Deserialize, Serialize};

use lanscope_common::utils::format;

use super::classifier::Protocol;

/// Per-protocol frame counters of one capture session.
///
/// Counters only ever grow. Their sum is the number of classified frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolStats {
    #[serde(rename = "TCP")]
    tcp: u64,
    #[serde(rename = "UDP")]
    udp: u64,
    #[serde(rename = "ICMP")]
    icmp: u64,
    #[serde(rename = "Other")]
    other: u64,
}

impl ProtocolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, protocol: Protocol) {
        *self.slot(protocol) += 1;
    }

    pub fn get(&self, protocol: Protocol) -> u64 {
        match protocol {
            Protocol::Tcp => self.tcp,
            Protocol::Udp => self.udp,
            Protocol::Icmp => self.icmp,
            Protocol::Other => self.other,
        }
    }

    pub fn total(&self) -> u64 {
        self.tcp + self.udp + self.icmp + self.other
    }

    pub fn iter(&self) -> impl Iterator<Item = (Protocol, u64)> + '_ {
        Protocol::ALL.into_iter().map(|protocol| (protocol, self.get(protocol)))
    }

    /// Share of `protocol` in percent. An empty session reports zero everywhere.
    pub fn percentage(&self, protocol: Protocol) -> f64 {
        format::percentage(self.get(protocol), self.total())
    }

    /// Multi-line statistics table.
    pub fn render(&self) -> String {
        let mut out = format!("Packet Statistics (Total: {})", self.total());
        for (protocol, count) in self.iter() {
            let _ = write!(
                out,
                "\n{:6}: {count:4} packets ({:5.1}%)",
                protocol,
                self.percentage(protocol)
            );
        }
        out
    }

    fn slot(&mut self, protocol: Protocol) -> &mut u64 {
        match protocol {
            Protocol::Tcp => &mut self.tcp,
            Protocol::Udp => &mut self.udp,
            Protocol::Icmp => &mut self.icmp,
            Protocol::Other => &mut self.other,
        }
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
