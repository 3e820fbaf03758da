//! Active **address-resolution discovery** of hosts on directly attached networks.
//!
//! The engine picks the local interface that owns a target block, opens a
//! Layer 2 channel on it and hands the probing over to [`ArpProber`].
//! Host configuration comes from an injected [`AddressResolver`] and raw
//! channels from an injected [`LinkLayer`], so the whole flow can run
//! against fakes.
//!
//! Probing requires **root privileges** on a real interface.

use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::Ipv4Network;

use lanscope_common::{
    config::DiscoveryConfig,
    network::{
        device::Device,
        interface,
        mac::{OuiVendorLookup, VendorLookup},
        target::DiscoveryTarget,
    },
    signal::StopSignal,
    utils::interface::NetworkInterfaceExtension,
};
use lanscope_protocols::arp::ProbeSource;

use crate::resolver::AddressResolver;

pub mod channel;
pub mod prober;

pub use channel::EthernetHandle;
pub use prober::ArpProber;

/// Opens raw Ethernet channels.
pub trait LinkLayer: Send + Sync {
    fn open(&self, intf: &NetworkInterface) -> anyhow::Result<EthernetHandle>;
}

/// Channels opened through the operating system's datalink layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatalinkLayer;

impl LinkLayer for DatalinkLayer {
    fn open(&self, intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
        channel::start_capture(intf)
    }
}

/// Outcome of a domain scan: what the name resolved to and who answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainScan {
    pub addresses: Vec<Ipv4Addr>,
    pub devices: Vec<Device>,
}

pub struct DiscoveryEngine<R: AddressResolver> {
    resolver: R,
    link: Box<dyn LinkLayer>,
    vendors: Box<dyn VendorLookup>,
    interfaces: Vec<NetworkInterface>,
    config: DiscoveryConfig,
    stop: StopSignal,
}

impl<R: AddressResolver> DiscoveryEngine<R> {
    pub fn new(resolver: R, config: DiscoveryConfig) -> Self {
        Self {
            resolver,
            link: Box::new(DatalinkLayer),
            vendors: Box::new(OuiVendorLookup),
            interfaces: datalink::interfaces(),
            config,
            stop: StopSignal::new(),
        }
    }

    pub fn with_link(mut self, link: impl LinkLayer + 'static) -> Self {
        self.link = Box::new(link);
        self
    }

    pub fn with_vendors(mut self, vendors: impl VendorLookup + 'static) -> Self {
        self.vendors = Box::new(vendors);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<NetworkInterface>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Probes every host implied by `target` that sits on the chosen link.
    ///
    /// Returns one device per answering address, ordered by address. A block
    /// wider than the interface's own network is cut down to that network,
    /// since ARP never crosses it. A target that no local interface can reach
    /// yields an empty list. Only failing to open the channel is an error.
    pub async fn scan(&self, target: &DiscoveryTarget) -> anyhow::Result<Vec<Device>> {
        let Some((intf, own_net)) = self.select_interface(target.network()) else {
            tracing::warn!("{target} is not on a directly attached network");
            return Ok(Vec::new());
        };
        let Some(mac) = intf.mac else {
            tracing::warn!("{} has no hardware address, cannot probe {target}", intf.name);
            return Ok(Vec::new());
        };

        let Some(sweep) = target.on_link(own_net) else {
            tracing::warn!("{target} does not overlap {own_net} on {}", intf.name);
            return Ok(Vec::new());
        };
        if sweep != *target {
            tracing::info!("{target} is wider than the link, sweeping {sweep} only");
        }

        let probes: Vec<Ipv4Addr> = sweep.probe_range().to_iter().collect();
        tracing::info!("Probing {} hosts of {sweep} on {}", probes.len(), intf.name);

        let handle = self.link.open(&intf)?;
        let source = ProbeSource {
            mac,
            addr: own_net.ip(),
        };
        let mut prober = ArpProber::new(handle, source, &self.config, self.stop.clone());
        let answers = prober.probe(&probes).await;

        Ok(answers
            .into_iter()
            .map(|(ip, mac)| self.make_device(ip, mac))
            .collect())
    }

    /// Scans each target on its own and concatenates the results in target order.
    pub async fn scan_all(&self, targets: &[DiscoveryTarget]) -> anyhow::Result<Vec<Device>> {
        let mut devices = Vec::new();
        for target in targets {
            if self.stop.is_stopped() {
                break;
            }
            devices.extend(self.scan(target).await?);
        }
        Ok(devices)
    }

    /// Scans the subnet of the default-route interface.
    ///
    /// An undetectable local network is logged and yields an empty list.
    pub async fn scan_lan(&self) -> anyhow::Result<Vec<Device>> {
        match self.resolver.gateway_subnet() {
            Ok(subnet) => self.scan(&DiscoveryTarget::from_network(subnet)).await,
            Err(e) => {
                tracing::warn!("could not detect local network: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Resolves `name` and scans every address as a single host.
    pub async fn scan_domain(&self, name: &str) -> anyhow::Result<DomainScan> {
        let addresses = self.resolver.resolve_domain(name).await;
        if addresses.is_empty() {
            tracing::warn!("{name} did not resolve to any IPv4 address");
            return Ok(DomainScan::default());
        }

        let targets: Vec<DiscoveryTarget> =
            addresses.iter().copied().map(DiscoveryTarget::host).collect();
        let devices = self.scan_all(&targets).await?;
        Ok(DomainScan { addresses, devices })
    }

    fn make_device(&self, ip: Ipv4Addr, mac: pnet::util::MacAddr) -> Device {
        let device = Device::new(ip, mac);
        match self.vendors.vendor(mac) {
            Some(vendor) => device.with_vendor(vendor),
            None => device,
        }
    }

    /// Interface owning `target`, or whose own address lies inside it.
    fn select_interface(&self, target: Ipv4Network) -> Option<(NetworkInterface, Ipv4Network)> {
        let name = self.config.interface.as_deref();
        interface::find_interface_for(&self.interfaces, target.network(), name).or_else(|| {
            self.interfaces
                .iter()
                .filter(|intf| name.is_none_or(|name| intf.name == name))
                .find_map(|intf| {
                    let own = intf.get_ipv4_range()?;
                    target.contains(own.ip()).then(|| (intf.clone(), own))
                })
        })
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
