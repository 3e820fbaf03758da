use std::net::Ipv4Addr;

use dns_parser::{Builder, QueryClass, QueryType};
use lanscope_common::config::CaptureConfig;
use lanscope_common::signal::StopSignal;
use lanscope_core::capture::{
    CaptureObserver, CaptureSession, Classification, MemorySource, Protocol, ProtocolStats,
    SessionSummary, StopReason, classify, write_pcap,
};
use lanscope_core::capture::source::DLT_LINUX_SLL;
use lanscope_integration_tests::{
    arp_frame, gre_frame, icmp_frame, sll_frame, tcp_frame, udp_frame,
};
use lanscope_protocols::frame::{self, LinkKind};

const HOST: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);
const ROUTER: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

fn classify_bytes(bytes: &[u8]) -> Classification {
    classify(&frame::decode(LinkKind::Ethernet, bytes))
}

fn dns_query() -> Vec<u8> {
    let mut builder = Builder::new_query(7, true);
    builder.add_question("example.com", false, QueryType::A, QueryClass::IN);
    builder.build().unwrap_or_else(|truncated| truncated)
}

fn mixed_traffic() -> Vec<Vec<u8>> {
    vec![
        tcp_frame(HOST, ROUTER, (51000, 80), b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n"),
        tcp_frame(HOST, ROUTER, (51001, 443), &[0x16, 0x03, 0x01]),
        udp_frame(HOST, ROUTER, (40000, 53), &dns_query()),
        udp_frame(HOST, ROUTER, (40001, 9999), b"noise"),
        icmp_frame(Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(8, 8, 8, 8), 8),
        gre_frame(HOST, ROUTER),
        arp_frame(),
    ]
}

#[derive(Default)]
struct Recorder {
    frames: Vec<(u64, Classification)>,
    snapshots: Vec<u64>,
    stopped: Option<StopReason>,
}

impl CaptureObserver for Recorder {
    fn on_frame(&mut self, number: u64, classification: &Classification) {
        self.frames.push((number, classification.clone()));
    }

    fn on_snapshot(&mut self, stats: &ProtocolStats) {
        self.snapshots.push(stats.total());
    }

    fn on_stop(&mut self, report: &lanscope_core::capture::CaptureReport) {
        self.stopped = Some(report.reason);
    }
}

#[test]
fn http_request_is_tagged() {
    let c = classify_bytes(&tcp_frame(HOST, ROUTER, (51000, 80), b"GET / HTTP/1.1\r\n"));

    assert_eq!(c.protocol, Protocol::Tcp);
    assert!(c.summary.contains("[HTTP] GET /"), "{}", c.summary);
}

#[test]
fn echo_request_is_named() {
    let c = classify_bytes(&icmp_frame(
        Ipv4Addr::new(10, 0, 0, 2),
        Ipv4Addr::new(8, 8, 8, 8),
        8,
    ));

    assert_eq!(c.protocol, Protocol::Icmp);
    assert!(c.summary.contains("Echo Request"), "{}", c.summary);
}

#[test]
fn classification_is_idempotent() {
    for bytes in mixed_traffic() {
        assert_eq!(classify_bytes(&bytes), classify_bytes(&bytes));
    }
}

#[test]
fn every_frame_gets_exactly_one_protocol() {
    let protocols: Vec<Protocol> = mixed_traffic()
        .iter()
        .map(|bytes| classify_bytes(bytes).protocol)
        .collect();

    assert_eq!(
        protocols,
        [
            Protocol::Tcp,
            Protocol::Tcp,
            Protocol::Udp,
            Protocol::Udp,
            Protocol::Icmp,
            Protocol::Other,
            Protocol::Other,
        ]
    );
}

#[test]
fn application_tags_follow_ports_and_payloads() {
    let summaries: Vec<String> = mixed_traffic()
        .iter()
        .map(|bytes| classify_bytes(bytes).summary)
        .collect();

    assert!(summaries[0].ends_with("[HTTP] GET /index.html HTTP/1.1"));
    assert!(summaries[1].ends_with("[HTTPS]"));
    assert!(summaries[2].ends_with("[DNS Query]"));
    assert!(!summaries[3].contains('['));
    assert_eq!(summaries[5], "10.0.0.5 -> 10.0.0.1 (Other Protocol)");
    assert_eq!(summaries[6], "Unknown Packet (60 bytes)");
}

#[test]
fn session_counts_every_frame_once() {
    let traffic: Vec<Vec<u8>> = mixed_traffic().into_iter().cycle().take(23).collect();
    let mut source = MemorySource::new("fake0", traffic);
    let mut session = CaptureSession::new(CaptureConfig::default());
    let mut recorder = Recorder::default();

    let report = session
        .run(&mut source, &StopSignal::new(), &mut recorder)
        .unwrap();

    assert_eq!(report.reason, StopReason::SourceExhausted);
    assert_eq!(report.total_packets, 23);
    assert_eq!(report.stats.total(), report.total_packets);
    assert_eq!(report.stats.iter().map(|(_, n)| n).sum::<u64>(), 23);
    assert_eq!(recorder.snapshots, [10, 20]);
    assert_eq!(recorder.stopped, Some(StopReason::SourceExhausted));

    let numbers: Vec<u64> = recorder.frames.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, (1..=23).collect::<Vec<u64>>());
    assert_eq!(session.retained().len(), 23);
}

#[test]
fn cooked_capture_frames_are_classified() {
    let traffic: Vec<Vec<u8>> = mixed_traffic().iter().map(|f| sll_frame(f)).collect();
    let mut source = MemorySource::new("any", traffic).with_datalink(DLT_LINUX_SLL);
    let mut session = CaptureSession::new(CaptureConfig::default());
    let mut recorder = Recorder::default();

    let report = session
        .run(&mut source, &StopSignal::new(), &mut recorder)
        .unwrap();

    assert_eq!(report.datalink, DLT_LINUX_SLL);
    assert_eq!(report.total_packets, 7);
    assert_eq!(report.stats.get(Protocol::Tcp), 2);
    assert_eq!(report.stats.get(Protocol::Udp), 2);
    assert_eq!(report.stats.get(Protocol::Icmp), 1);
    assert_eq!(report.stats.get(Protocol::Other), 2);
    assert!(recorder.frames[0].1.summary.contains("[HTTP] GET /index.html"));
}

#[test]
fn count_limit_stops_the_session() {
    let mut source = MemorySource::new("fake0", mixed_traffic());
    let mut session = CaptureSession::new(CaptureConfig {
        count: 3,
        ..CaptureConfig::default()
    });

    let report = session
        .run(&mut source, &StopSignal::new(), &mut Recorder::default())
        .unwrap();

    assert_eq!(report.reason, StopReason::CountReached);
    assert_eq!(report.total_packets, 3);
    assert_eq!(report.stats.get(Protocol::Tcp), 2);
    assert_eq!(report.stats.get(Protocol::Udp), 1);
    assert_eq!(source.remaining(), 4);
}

#[test]
fn restarting_resets_the_counters() {
    let mut session = CaptureSession::new(CaptureConfig::default());
    let stop = StopSignal::new();

    let mut first = MemorySource::new("fake0", mixed_traffic());
    session.run(&mut first, &stop, &mut Recorder::default()).unwrap();
    let mut second = MemorySource::new("fake0", vec![arp_frame()]);
    let report = session.run(&mut second, &stop, &mut Recorder::default()).unwrap();

    assert_eq!(report.total_packets, 1);
    assert_eq!(report.stats.get(Protocol::Other), 1);
    assert_eq!(session.retained().len(), 1);
}

#[test]
fn summary_and_pcap_are_written_after_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new("fake0", mixed_traffic());
    let mut session = CaptureSession::new(CaptureConfig {
        retain_limit: 5,
        ..CaptureConfig::default()
    });
    let report = session
        .run(&mut source, &StopSignal::new(), &mut Recorder::default())
        .unwrap();
    assert_eq!(session.retained().len(), 5);

    let pcap_path = dir.path().join("captures").join("session.pcap");
    write_pcap(&pcap_path, report.datalink, session.retained()).unwrap();
    assert!(pcap_path.exists());

    let log_file = dir.path().join("sniff_logs.txt");
    let summary_path = dir.path().join("capture_summary.json");
    SessionSummary::from_report(&report, Some(&log_file))
        .save(&summary_path)
        .unwrap();

    let json = std::fs::read_to_string(&summary_path).unwrap();
    assert!(json.contains("\"total_packets\": 7"));
    assert!(json.contains("\"TCP\": 2"));
    assert!(json.contains("sniff_logs.txt"));
}
