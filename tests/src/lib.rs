//! Fakes shared by the cross-crate scenario tests.
//!
//! Nothing here touches a real interface: ARP probes are answered by a fake
//! `DataLinkSender`, host configuration comes from [`FakeResolver`] and
//! captured traffic is built in memory.

use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pnet::datalink::{DataLinkSender, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::packet::MutablePacket;
use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
use pnet::packet::icmp::{IcmpType, MutableIcmpPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use pnet::util::MacAddr;
use tokio::sync::mpsc;

use lanscope_common::error::ResolveError;
use lanscope_core::discovery::{EthernetHandle, LinkLayer};
use lanscope_core::resolver::AddressResolver;
use lanscope_protocols::arp::{self, ProbeSource};

const ETH_HDR_LEN: usize = 14;
const SLL_HDR_LEN: usize = 16;
const IPV4_HDR_LEN: usize = 20;
const TCP_HDR_LEN: usize = 20;
const UDP_HDR_LEN: usize = 8;
const ICMP_HDR_LEN: usize = 8;

pub fn mac(last: u8) -> MacAddr {
    MacAddr::new(0xaa, 0xbb, 0xcc, 0x00, 0x00, last)
}

pub fn interface(name: &str, index: u32, net: &str) -> NetworkInterface {
    NetworkInterface {
        name: name.to_string(),
        description: String::new(),
        index,
        mac: Some(MacAddr::new(0x02, 0, 0, 0, 0, index as u8)),
        ips: vec![IpNetwork::V4(net.parse().unwrap())],
        flags: 0,
    }
}

/// Simulated segment: which addresses answer ARP and with which MACs.
///
/// An address listed with several MACs answers once per MAC, in order.
#[derive(Clone, Default)]
pub struct FakeLink {
    hosts: Arc<HashMap<Ipv4Addr, Vec<MacAddr>>>,
    probed: Arc<Mutex<Vec<Ipv4Addr>>>,
    opened: Arc<Mutex<Vec<String>>>,
}

impl FakeLink {
    pub fn new(hosts: impl IntoIterator<Item = (Ipv4Addr, Vec<MacAddr>)>) -> Self {
        Self {
            hosts: Arc::new(hosts.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every address a request was sent for, retransmissions included.
    pub fn probed(&self) -> Vec<Ipv4Addr> {
        self.probed.lock().unwrap().clone()
    }

    /// Names of the interfaces a channel was opened on.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl LinkLayer for FakeLink {
    fn open(&self, intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
        self.opened.lock().unwrap().push(intf.name.clone());

        let addr = intf
            .ips
            .iter()
            .find_map(|ip| match ip {
                IpNetwork::V4(v4) => Some(v4.ip()),
                IpNetwork::V6(_) => None,
            })
            .ok_or_else(|| anyhow::anyhow!("{} has no IPv4 address", intf.name))?;
        let requester = ProbeSource {
            mac: intf.mac.unwrap_or_else(MacAddr::zero),
            addr,
        };

        let (queue, rx) = mpsc::unbounded_channel();
        let sender = ArpResponder {
            hosts: self.hosts.clone(),
            probed: self.probed.clone(),
            requester,
            queue,
        };
        Ok(EthernetHandle::new(Box::new(sender), rx))
    }
}

struct ArpResponder {
    hosts: Arc<HashMap<Ipv4Addr, Vec<MacAddr>>>,
    probed: Arc<Mutex<Vec<Ipv4Addr>>>,
    requester: ProbeSource,
    queue: mpsc::UnboundedSender<Vec<u8>>,
}

impl DataLinkSender for ArpResponder {
    fn build_and_send(
        &mut self,
        _num_packets: usize,
        _packet_size: usize,
        _func: &mut dyn FnMut(&mut [u8]),
    ) -> Option<io::Result<()>> {
        Some(Ok(()))
    }

    fn send_to(&mut self, packet: &[u8], _dst: Option<NetworkInterface>) -> Option<io::Result<()>> {
        let addr = arp::requested_addr(packet)?;
        self.probed.lock().unwrap().push(addr);
        for mac in self.hosts.get(&addr).into_iter().flatten() {
            if let Ok(reply) = arp::create_reply(addr, *mac, self.requester) {
                let _ = self.queue.send(reply);
            }
        }
        Some(Ok(()))
    }
}

/// Resolver with a fixed view of the host.
#[derive(Clone, Default)]
pub struct FakeResolver {
    pub subnet: Option<Ipv4Network>,
    pub domains: HashMap<String, Vec<Ipv4Addr>>,
    pub locals: Vec<Ipv4Addr>,
}

#[async_trait]
impl AddressResolver for FakeResolver {
    fn gateway_subnet(&self) -> Result<Ipv4Network, ResolveError> {
        self.subnet.ok_or(ResolveError::NotFound)
    }

    async fn resolve_domain(&self, name: &str) -> Vec<Ipv4Addr> {
        self.domains.get(name).cloned().unwrap_or_default()
    }

    fn local_addresses(&self) -> Vec<Ipv4Addr> {
        self.locals.clone()
    }
}

fn ipv4_frame(src: Ipv4Addr, dst: Ipv4Addr, protocol: IpNextHeaderProtocol, body: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_HDR_LEN + IPV4_HDR_LEN + body.len()];

    let mut eth = MutableEthernetPacket::new(&mut frame).unwrap();
    eth.set_source(mac(0x10));
    eth.set_destination(mac(0x20));
    eth.set_ethertype(EtherTypes::Ipv4);

    let mut ip = MutableIpv4Packet::new(&mut frame[ETH_HDR_LEN..]).unwrap();
    ip.set_version(4);
    ip.set_header_length(5);
    ip.set_total_length((IPV4_HDR_LEN + body.len()) as u16);
    ip.set_ttl(64);
    ip.set_next_level_protocol(protocol);
    ip.set_source(src);
    ip.set_destination(dst);
    ip.payload_mut().copy_from_slice(body);
    frame
}

pub fn tcp_frame(src: Ipv4Addr, dst: Ipv4Addr, ports: (u16, u16), payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0u8; TCP_HDR_LEN + payload.len()];
    let mut tcp = MutableTcpPacket::new(&mut body).unwrap();
    tcp.set_source(ports.0);
    tcp.set_destination(ports.1);
    tcp.set_data_offset(5);
    tcp.payload_mut().copy_from_slice(payload);
    ipv4_frame(src, dst, IpNextHeaderProtocols::Tcp, &body)
}

pub fn udp_frame(src: Ipv4Addr, dst: Ipv4Addr, ports: (u16, u16), payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0u8; UDP_HDR_LEN + payload.len()];
    let mut udp = MutableUdpPacket::new(&mut body).unwrap();
    udp.set_source(ports.0);
    udp.set_destination(ports.1);
    udp.set_length((UDP_HDR_LEN + payload.len()) as u16);
    udp.payload_mut().copy_from_slice(payload);
    ipv4_frame(src, dst, IpNextHeaderProtocols::Udp, &body)
}

pub fn icmp_frame(src: Ipv4Addr, dst: Ipv4Addr, icmp_type: u8) -> Vec<u8> {
    let mut body = vec![0u8; ICMP_HDR_LEN];
    let mut icmp = MutableIcmpPacket::new(&mut body).unwrap();
    icmp.set_icmp_type(IcmpType(icmp_type));
    ipv4_frame(src, dst, IpNextHeaderProtocols::Icmp, &body)
}

/// IPv4 datagram carrying a protocol other than TCP, UDP or ICMP.
pub fn gre_frame(src: Ipv4Addr, dst: Ipv4Addr) -> Vec<u8> {
    ipv4_frame(src, dst, IpNextHeaderProtocols::Gre, &[0u8; 4])
}

/// ARP request, a frame without an IPv4 header.
pub fn arp_frame() -> Vec<u8> {
    let source = ProbeSource {
        mac: mac(0x10),
        addr: Ipv4Addr::new(10, 0, 0, 5),
    };
    arp::create_request(source, Ipv4Addr::new(10, 0, 0, 1)).unwrap()
}

/// Re-wraps an Ethernet frame under a Linux cooked-capture header, as the `any` device delivers it.
pub fn sll_frame(ethernet: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; SLL_HDR_LEN];
    // packet type 0 (to us), ARPHRD_ETHER, 6-byte address
    frame[2..4].copy_from_slice(&1u16.to_be_bytes());
    frame[4..6].copy_from_slice(&6u16.to_be_bytes());
    frame[6..12].copy_from_slice(&ethernet[6..12]);
    frame[14..16].copy_from_slice(&ethernet[12..14]);
    frame.extend_from_slice(&ethernet[ETH_HDR_LEN..]);
    frame
}
