use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use lanscope_protocols::{
    dns,
    frame::{DecodedFrame, Transport},
    http,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
    #[serde(rename = "ICMP")]
    Icmp,
    Other,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [Protocol::Tcp, Protocol::Udp, Protocol::Icmp, Protocol::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Other => "Other",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub protocol: Protocol,
    pub summary: String,
}

/// Human name of an ICMP type, empty when not one of the common ones.
pub fn icmp_type_name(icmp_type: u8) -> &'static str {
    match icmp_type {
        0 => "Echo Reply",
        3 => "Dest Unreachable",
        8 => "Echo Request",
        11 => "Time Exceeded",
        _ => "",
    }
}

/// Maps a decoded frame to exactly one protocol and a one-line summary.
///
/// Pure: the same frame always yields the same classification. Payloads
/// that fail the HTTP or DNS sub-parses only lose their tag.
pub fn classify(frame: &DecodedFrame<'_>) -> Classification {
    match frame {
        DecodedFrame::NonIp { len } => Classification {
            protocol: Protocol::Other,
            summary: format!("Unknown Packet ({len} bytes)"),
        },
        DecodedFrame::Ipv4 {
            src,
            dst,
            transport,
        } => classify_ipv4(*src, *dst, transport),
    }
}

fn classify_ipv4(src: Ipv4Addr, dst: Ipv4Addr, transport: &Transport<'_>) -> Classification {
    match transport {
        Transport::Tcp {
            src_port,
            dst_port,
            payload,
        } => {
            let mut summary = format!("TCP {src}:{src_port} -> {dst}:{dst_port}");
            let on_port = |port: u16| *src_port == port || *dst_port == port;

            if on_port(http::HTTP_PORT)
                && !payload.is_empty()
                && let Some(line) = http::request_line(payload)
            {
                summary.push_str(" [HTTP] ");
                summary.push_str(&line);
            }
            if on_port(http::HTTPS_PORT) {
                summary.push_str(" [HTTPS]");
            }

            Classification {
                protocol: Protocol::Tcp,
                summary,
            }
        }
        Transport::Udp {
            src_port,
            dst_port,
            payload,
        } => {
            let mut summary = format!("UDP {src}:{src_port} -> {dst}:{dst_port}");
            if dns::message(*src_port, *dst_port, payload).is_some() {
                summary.push_str(" [DNS Query]");
            }

            Classification {
                protocol: Protocol::Udp,
                summary,
            }
        }
        Transport::Icmp { icmp_type } => Classification {
            protocol: Protocol::Icmp,
            summary: format!(
                "ICMP {src} -> {dst} Type: {icmp_type} ({})",
                icmp_type_name(*icmp_type)
            ),
        },
        Transport::Other { .. } => Classification {
            protocol: Protocol::Other,
            summary: format!("{src} -> {dst} (Other Protocol)"),
        },
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
