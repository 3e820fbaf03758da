use std::collections::{BTreeSet, HashMap};
use std::net::Ipv4Addr;
use std::time::Duration;

use lanscope_common::config::DiscoveryConfig;
use lanscope_common::network::mac::{NoVendorLookup, VendorLookup};
use lanscope_common::network::target::DiscoveryTarget;
use lanscope_common::signal::StopSignal;
use lanscope_core::discovery::DiscoveryEngine;
use lanscope_integration_tests::{FakeLink, FakeResolver, interface, mac};
use pnet::util::MacAddr;

fn config(retries: u32) -> DiscoveryConfig {
    DiscoveryConfig {
        timeout: Duration::from_millis(150),
        retries,
        interface: None,
    }
}

fn engine(resolver: FakeResolver, link: FakeLink, retries: u32) -> DiscoveryEngine<FakeResolver> {
    DiscoveryEngine::new(resolver, config(retries))
        .with_link(link)
        .with_vendors(NoVendorLookup)
        .with_interfaces(vec![
            interface("eth0", 1, "192.168.1.100/24"),
            interface("eth1", 2, "10.0.0.2/8"),
        ])
}

fn lan(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, last)
}

struct FixedVendor;

impl VendorLookup for FixedVendor {
    fn vendor(&self, mac: MacAddr) -> Option<String> {
        (mac.5 % 2 == 1).then(|| "Raspberry Pi Trading Ltd".to_string())
    }
}

#[tokio::test]
async fn slash_30_probes_only_usable_hosts() {
    let link = FakeLink::new([
        (lan(0), vec![mac(0)]),
        (lan(1), vec![mac(1)]),
        (lan(2), vec![mac(2)]),
        (lan(3), vec![mac(3)]),
    ]);
    let engine = engine(FakeResolver::default(), link.clone(), 1);

    let target: DiscoveryTarget = "192.168.1.0/30".parse().unwrap();
    let devices = engine.scan(&target).await.unwrap();

    let probed: BTreeSet<Ipv4Addr> = link.probed().into_iter().collect();
    assert_eq!(probed, BTreeSet::from([lan(1), lan(2)]));
    let ips: Vec<Ipv4Addr> = devices.iter().map(|d| d.ip).collect();
    assert_eq!(ips, [lan(1), lan(2)]);
    assert_eq!(link.opened(), ["eth0"]);
}

#[tokio::test]
async fn slash_31_and_32_probe_every_address() {
    let link = FakeLink::new([(lan(4), vec![mac(4)]), (lan(5), vec![mac(5)])]);
    let engine = engine(FakeResolver::default(), link.clone(), 0);

    let pair: DiscoveryTarget = "192.168.1.4/31".parse().unwrap();
    assert_eq!(engine.scan(&pair).await.unwrap().len(), 2);

    let single: DiscoveryTarget = "192.168.1.5".parse().unwrap();
    let devices = engine.scan(&single).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].mac, mac(5));
}

#[tokio::test]
async fn silent_hosts_are_retried_then_given_up() {
    let link = FakeLink::new([(lan(1), vec![mac(1)])]);
    let engine = engine(FakeResolver::default(), link.clone(), 2);

    let target: DiscoveryTarget = "192.168.1.0/30".parse().unwrap();
    let devices = engine.scan(&target).await.unwrap();

    assert_eq!(devices.len(), 1);
    let probed = link.probed();
    assert_eq!(probed.iter().filter(|a| **a == lan(1)).count(), 1);
    assert_eq!(probed.iter().filter(|a| **a == lan(2)).count(), 3);
}

#[tokio::test]
async fn duplicate_replies_keep_the_last_mac() {
    let link = FakeLink::new([(lan(7), vec![mac(1), mac(2)])]);
    let engine = engine(FakeResolver::default(), link, 0);

    let devices = engine.scan(&DiscoveryTarget::host(lan(7))).await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].mac, mac(2));
}

#[tokio::test]
async fn scan_lan_uses_the_resolved_subnet() {
    let resolver = FakeResolver {
        subnet: Some("192.168.1.0/24".parse().unwrap()),
        ..FakeResolver::default()
    };
    let link = FakeLink::new([(lan(50), vec![mac(50)]), (lan(1), vec![mac(1)])]);
    let engine = engine(resolver, link.clone(), 0);

    let devices = engine.scan_lan().await.unwrap();

    let ips: Vec<Ipv4Addr> = devices.iter().map(|d| d.ip).collect();
    assert_eq!(ips, [lan(1), lan(50)]);
    assert_eq!(link.probed().len(), 254);
}

#[tokio::test]
async fn wide_block_is_swept_only_on_the_link() {
    let off_link = Ipv4Addr::new(192, 168, 2, 9);
    let link = FakeLink::new([(lan(9), vec![mac(9)]), (off_link, vec![mac(10)])]);
    let engine = engine(FakeResolver::default(), link.clone(), 0);

    let target: DiscoveryTarget = "192.168.0.0/16".parse().unwrap();
    let devices = engine.scan(&target).await.unwrap();

    let ips: Vec<Ipv4Addr> = devices.iter().map(|d| d.ip).collect();
    assert_eq!(ips, [lan(9)]);
    let probed = link.probed();
    assert_eq!(probed.len(), 254);
    assert!(probed.iter().all(|addr| addr.octets()[..3] == [192, 168, 1]));
    assert_eq!(link.opened(), ["eth0"]);
}

#[tokio::test]
async fn whole_address_space_collapses_to_the_link() {
    let link = FakeLink::new([(lan(1), vec![mac(1)])]);
    let engine = engine(FakeResolver::default(), link.clone(), 0);

    let everything: DiscoveryTarget = "0.0.0.0/0".parse().unwrap();
    let devices = engine.scan(&everything).await.unwrap();

    assert_eq!(devices.len(), 1);
    let probed: BTreeSet<Ipv4Addr> = link.probed().into_iter().collect();
    assert_eq!(probed.len(), 254);
    assert_eq!(probed.first(), Some(&lan(1)));
    assert_eq!(probed.last(), Some(&lan(254)));
}

#[tokio::test]
async fn undetected_lan_is_empty_and_opens_nothing() {
    let link = FakeLink::new([(lan(1), vec![mac(1)])]);
    let engine = engine(FakeResolver::default(), link.clone(), 0);

    assert!(engine.scan_lan().await.unwrap().is_empty());
    assert!(link.opened().is_empty());
}

#[tokio::test]
async fn domain_scan_probes_each_address_as_a_host() {
    let far = Ipv4Addr::new(10, 1, 2, 3);
    let resolver = FakeResolver {
        domains: HashMap::from([("printer.lan".to_string(), vec![lan(20), far])]),
        ..FakeResolver::default()
    };
    let link = FakeLink::new([(lan(20), vec![mac(20)]), (far, vec![mac(30)])]);
    let engine = engine(resolver, link.clone(), 0);

    let scan = engine.scan_domain("printer.lan").await.unwrap();

    assert_eq!(scan.addresses, [lan(20), far]);
    let ips: Vec<Ipv4Addr> = scan.devices.iter().map(|d| d.ip).collect();
    assert_eq!(ips, [lan(20), far]);
    assert_eq!(link.opened(), ["eth0", "eth1"]);
    assert_eq!(link.probed(), [lan(20), far]);
}

#[tokio::test]
async fn unresolved_domain_is_not_an_error() {
    let link = FakeLink::default();
    let engine = engine(FakeResolver::default(), link.clone(), 0);

    let scan = engine.scan_domain("nowhere.invalid").await.unwrap();

    assert!(scan.addresses.is_empty());
    assert!(scan.devices.is_empty());
    assert!(link.opened().is_empty());
}

#[tokio::test]
async fn explicit_targets_concatenate_in_order() {
    let link = FakeLink::new([(lan(9), vec![mac(9)]), (lan(3), vec![mac(3)])]);
    let engine = engine(FakeResolver::default(), link, 0);

    let targets: Vec<DiscoveryTarget> = vec![
        DiscoveryTarget::host(lan(9)),
        "172.16.0.0/30".parse().unwrap(),
        DiscoveryTarget::host(lan(3)),
    ];
    let devices = engine.scan_all(&targets).await.unwrap();

    let ips: Vec<Ipv4Addr> = devices.iter().map(|d| d.ip).collect();
    assert_eq!(ips, [lan(9), lan(3)]);
}

#[tokio::test]
async fn stopped_engine_probes_nothing() {
    let link = FakeLink::new([(lan(1), vec![mac(1)])]);
    let stop = StopSignal::new();
    stop.stop();
    let engine = engine(FakeResolver::default(), link.clone(), 0).with_stop_signal(stop);

    let devices = engine
        .scan_all(&[DiscoveryTarget::host(lan(1))])
        .await
        .unwrap();

    assert!(devices.is_empty());
    assert!(link.probed().is_empty());
}

#[tokio::test]
async fn vendors_are_attached_to_devices() {
    let link = FakeLink::new([(lan(1), vec![mac(1)]), (lan(2), vec![mac(2)])]);
    let engine = engine(FakeResolver::default(), link, 0).with_vendors(FixedVendor);

    let target: DiscoveryTarget = "192.168.1.0/30".parse().unwrap();
    let devices = engine.scan(&target).await.unwrap();

    assert_eq!(devices[0].vendor.as_deref(), Some("Raspberry Pi Trading Ltd"));
    assert_eq!(devices[1].vendor, None);
}
