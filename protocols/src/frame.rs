use std::net::Ipv4Addr;

use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;

use crate::ETH_HDR_LEN;

const VLAN_TAG_LEN: usize = 4;
const SLL_HDR_LEN: usize = 16;
const IPV4_MIN_HDR_LEN: usize = 20;
const TCP_MIN_HDR_LEN: usize = 20;
const UDP_HDR_LEN: usize = 8;
const ICMP_MIN_LEN: usize = 4;

/// Link-layer framing of captured bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkKind {
    #[default]
    Ethernet,
    /// Linux cooked capture, as produced by the `any` pseudo-device.
    LinuxSll,
    /// Bare IP packets with no link header.
    RawIp,
}

/// A captured frame decoded once, down to the first transport header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame<'a> {
    /// No IPv4 header could be found. Carries the full frame length.
    NonIp { len: usize },
    Ipv4 {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        transport: Transport<'a>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport<'a> {
    Tcp {
        src_port: u16,
        dst_port: u16,
        payload: &'a [u8],
    },
    Udp {
        src_port: u16,
        dst_port: u16,
        payload: &'a [u8],
    },
    Icmp {
        icmp_type: u8,
    },
    Other {
        protocol: IpNextHeaderProtocol,
    },
}

pub fn decode(link: LinkKind, frame: &[u8]) -> DecodedFrame<'_> {
    let non_ip = DecodedFrame::NonIp { len: frame.len() };

    let Some(offset) = network_offset(link, frame) else {
        return non_ip;
    };

    frame
        .get(offset..)
        .and_then(decode_ipv4)
        .unwrap_or(non_ip)
}

/// Offset of an IPv4 header inside `frame`, if the link header announces one.
fn network_offset(link: LinkKind, frame: &[u8]) -> Option<usize> {
    match link {
        LinkKind::RawIp => Some(0),
        LinkKind::LinuxSll => {
            let proto = frame.get(SLL_HDR_LEN - 2..SLL_HDR_LEN)?;
            (EtherType(u16::from_be_bytes([proto[0], proto[1]])) == EtherTypes::Ipv4)
                .then_some(SLL_HDR_LEN)
        }
        LinkKind::Ethernet => {
            let eth = EthernetPacket::new(frame)?;
            match eth.get_ethertype() {
                EtherTypes::Ipv4 => Some(ETH_HDR_LEN),
                EtherTypes::Vlan => {
                    let inner = frame.get(ETH_HDR_LEN + 2..ETH_HDR_LEN + VLAN_TAG_LEN)?;
                    (EtherType(u16::from_be_bytes([inner[0], inner[1]])) == EtherTypes::Ipv4)
                        .then_some(ETH_HDR_LEN + VLAN_TAG_LEN)
                }
                _ => None,
            }
        }
    }
}

fn decode_ipv4(bytes: &[u8]) -> Option<DecodedFrame<'_>> {
    let ip = Ipv4Packet::new(bytes)?;
    if ip.get_version() != 4 {
        return None;
    }

    let header_len = usize::from(ip.get_header_length()) * 4;
    if header_len < IPV4_MIN_HDR_LEN || header_len > bytes.len() {
        return None;
    }

    // Ethernet pads short frames, the IP total length marks the real end.
    let total_len = usize::from(ip.get_total_length()).clamp(header_len, bytes.len());
    let body = &bytes[header_len..total_len];
    let protocol = ip.get_next_level_protocol();

    let transport = if ip.get_fragment_offset() != 0 {
        Transport::Other { protocol }
    } else {
        decode_transport(protocol, body).unwrap_or(Transport::Other { protocol })
    };

    Some(DecodedFrame::Ipv4 {
        src: ip.get_source(),
        dst: ip.get_destination(),
        transport,
    })
}

fn decode_transport(protocol: IpNextHeaderProtocol, body: &[u8]) -> Option<Transport<'_>> {
    match protocol {
        IpNextHeaderProtocols::Tcp => {
            let tcp = TcpPacket::new(body)?;
            let data_offset = usize::from(tcp.get_data_offset()) * 4;
            if data_offset < TCP_MIN_HDR_LEN {
                return None;
            }
            Some(Transport::Tcp {
                src_port: tcp.get_source(),
                dst_port: tcp.get_destination(),
                payload: body.get(data_offset..).unwrap_or_default(),
            })
        }
        IpNextHeaderProtocols::Udp => {
            let udp = UdpPacket::new(body)?;
            Some(Transport::Udp {
                src_port: udp.get_source(),
                dst_port: udp.get_destination(),
                payload: &body[UDP_HDR_LEN..],
            })
        }
        IpNextHeaderProtocols::Icmp => {
            if body.len() < ICMP_MIN_LEN {
                return None;
            }
            let icmp = IcmpPacket::new(body)?;
            Some(Transport::Icmp {
                icmp_type: icmp.get_icmp_type().0,
            })
        }
        _ => None,
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
