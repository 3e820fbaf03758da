use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::Local;
use lanscope_common::artifact;
use lanscope_common::config::DiscoveryConfig;
use lanscope_common::error::TopologyError;
use lanscope_common::network::device::Device;
use lanscope_common::network::mac::NoVendorLookup;
use lanscope_common::network::target::DiscoveryTarget;
use lanscope_core::discovery::DiscoveryEngine;
use lanscope_core::topology::report::{self, NetworkStats};
use lanscope_core::topology::{Role, TopologyGraphBuilder};
use lanscope_integration_tests::{FakeLink, FakeResolver, interface, mac};

fn lan(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, last)
}

#[test]
fn empty_device_list_is_rejected() {
    let result = TopologyGraphBuilder::new(Vec::new()).build(&[]);
    assert!(matches!(result, Err(TopologyError::EmptyInput)));
}

#[test]
fn dot_one_is_the_gateway() {
    let devices = vec![
        Device::new(lan(1), mac(1)).with_vendor("Netgear"),
        Device::new(lan(50), mac(50)).with_vendor("VMware, Inc."),
    ];

    let graph = TopologyGraphBuilder::new(Vec::new()).build(&devices).unwrap();

    assert_eq!(graph.gateway().id, lan(1));
    assert_eq!(graph.gateway().role, Role::Gateway);
    assert_eq!(graph.node(lan(50)).unwrap().role, Role::Vm);
    assert_eq!(graph.edges().len(), 1);
    assert_eq!((graph.edges()[0].a, graph.edges()[0].b), (lan(1), lan(50)));
}

#[test]
fn first_device_is_the_gateway_without_a_dot_one() {
    let devices = vec![
        Device::new(lan(20), mac(20)),
        Device::new(lan(30), mac(30)),
        Device::new(lan(40), mac(40)),
    ];

    let graph = TopologyGraphBuilder::new(vec![lan(40)]).build(&devices).unwrap();

    assert_eq!(graph.gateway().id, lan(20));
    assert_eq!(graph.node(lan(40)).unwrap().role, Role::Local);
    assert_eq!(graph.node(lan(30)).unwrap().role, Role::Unknown);
    assert!(graph.edges().iter().all(|e| e.a == lan(20) && e.b != lan(20)));
}

#[test]
fn repeated_addresses_become_one_node() {
    let devices = vec![
        Device::new(lan(1), mac(1)),
        Device::new(lan(7), mac(7)),
        Device::new(lan(7), mac(8)).with_vendor("Apple, Inc."),
    ];

    let graph = TopologyGraphBuilder::new(Vec::new()).build(&devices).unwrap();

    assert_eq!(graph.nodes().len(), 2);
    assert_eq!(graph.edges().len(), 1);
    let node = graph.node(lan(7)).unwrap();
    assert_eq!(node.mac, mac(8));
    assert_eq!(node.role, Role::Device);
}

#[tokio::test]
async fn discovery_results_feed_the_topology() {
    let link = FakeLink::new([
        (lan(1), vec![mac(1)]),
        (lan(23), vec![mac(23)]),
        (lan(42), vec![mac(42)]),
    ]);
    let engine = DiscoveryEngine::new(
        FakeResolver::default(),
        DiscoveryConfig {
            timeout: Duration::from_millis(100),
            retries: 0,
            interface: None,
        },
    )
    .with_link(link)
    .with_vendors(NoVendorLookup)
    .with_interfaces(vec![interface("eth0", 1, "192.168.1.100/24")]);

    let target: DiscoveryTarget = "192.168.1.0/26".parse().unwrap();
    let devices = engine.scan(&target).await.unwrap();
    assert_eq!(devices.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = artifact::timestamped_path(dir.path(), "scan_results", "json");
    artifact::save_devices(&path, &devices).unwrap();
    assert_eq!(artifact::latest_scan_results(dir.path()), Some(path.clone()));

    let loaded = artifact::load_devices(&path).unwrap();
    assert_eq!(loaded, devices);

    let graph = TopologyGraphBuilder::new(vec![lan(100)]).build(&loaded).unwrap();
    let dot = graph.to_dot();
    assert!(dot.starts_with("graph topology {"));
    assert!(dot.contains("\"192.168.1.1\" -- \"192.168.1.23\";"));
    assert!(dot.contains("\"192.168.1.1\" -- \"192.168.1.42\";"));

    let stats = NetworkStats::from_devices(&loaded);
    assert_eq!(stats.total_devices, 3);
    assert_eq!(stats.vendor_distribution, [("Unknown".to_string(), 3)]);

    let text = report::render_report(&loaded, Local::now());
    assert!(text.contains("NETWORK TOPOLOGY REPORT"));
    assert!(text.contains("DEVICE DETAILS"));
    assert!(text.contains("VENDOR DISTRIBUTION"));
    assert!(text.contains("192.168.1.42"));
}
