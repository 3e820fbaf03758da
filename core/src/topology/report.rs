use std::fmt::Write;
use std::net::Ipv4Addr;

use chrono::{DateTime, Local};
use serde::Serialize;

use lanscope_common::network::device::Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpRange {
    pub first: Ipv4Addr,
    pub last: Ipv4Addr,
}

/// Aggregate figures over a device list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub total_devices: usize,
    /// Vendor and device count, in order of first appearance.
    pub vendor_distribution: Vec<(String, usize)>,
    pub ip_range: Option<IpRange>,
}

impl NetworkStats {
    pub fn from_devices(devices: &[Device]) -> Self {
        let mut vendor_distribution: Vec<(String, usize)> = Vec::new();
        for device in devices {
            let vendor = device.vendor_or_unknown();
            match vendor_distribution.iter_mut().find(|(v, _)| v == vendor) {
                Some((_, count)) => *count += 1,
                None => vendor_distribution.push((vendor.to_string(), 1)),
            }
        }

        let mut ips: Vec<Ipv4Addr> = devices.iter().map(|d| d.ip).collect();
        ips.sort();
        let ip_range = match (ips.first(), ips.last()) {
            (Some(&first), Some(&last)) => Some(IpRange { first, last }),
            _ => None,
        };

        Self {
            total_devices: devices.len(),
            vendor_distribution,
            ip_range,
        }
    }
}

/// Plain-text network report with device details and vendor distribution.
pub fn render_report(devices: &[Device], generated: DateTime<Local>) -> String {
    let stats = NetworkStats::from_devices(devices);
    let mut out = String::new();

    let _ = writeln!(out, "NETWORK TOPOLOGY REPORT\n{}", "=".repeat(27));
    let _ = writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Total Devices: {}", stats.total_devices);
    if let Some(range) = stats.ip_range {
        let _ = writeln!(out, "IP Range: {} - {}", range.first, range.last);
    }

    let _ = writeln!(out, "\nDEVICE DETAILS:\n{}", "-".repeat(17));
    for device in devices {
        let _ = writeln!(
            out,
            "IP: {} | MAC: {} | Vendor: {}",
            device.ip,
            device.mac,
            device.vendor_or_unknown()
        );
    }

    let _ = writeln!(out, "\nVENDOR DISTRIBUTION:\n{}", "-".repeat(22));
    for (vendor, count) in &stats.vendor_distribution {
        let _ = writeln!(out, "{vendor}: {count} device(s)");
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
