use std::{
    collections::{BTreeMap, HashSet},
    net::Ipv4Addr,
    time::Duration,
};

use pnet::util::MacAddr;

use lanscope_common::{config::DiscoveryConfig, signal::StopSignal};
use lanscope_protocols::arp::{self, ProbeSource};

use super::channel::EthernetHandle;

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    /// The reply window elapsed with probes still unanswered.
    Expired,
    /// Every probed address answered.
    Complete,
    Stopped,
    /// The reader side of the channel went away.
    Closed,
}

/// Sends ARP requests over an [`EthernetHandle`] and gathers the replies.
///
/// A sweep is a first round over every target followed by up to `retries`
/// rounds that only retransmit to addresses that stayed silent. Each round
/// waits at most `timeout` for replies.
pub struct ArpProber {
    handle: EthernetHandle,
    source: ProbeSource,
    timeout: Duration,
    retries: u32,
    stop: StopSignal,
}

impl ArpProber {
    pub fn new(
        handle: EthernetHandle,
        source: ProbeSource,
        config: &DiscoveryConfig,
        stop: StopSignal,
    ) -> Self {
        Self {
            handle,
            source,
            timeout: config.timeout,
            retries: config.retries,
            stop,
        }
    }

    /// Replies keyed by sender address, in address order.
    ///
    /// Only replies from probed addresses are kept. A second reply for the
    /// same address replaces the first.
    pub async fn probe(&mut self, targets: &[Ipv4Addr]) -> BTreeMap<Ipv4Addr, MacAddr> {
        let wanted: HashSet<Ipv4Addr> = targets.iter().copied().collect();
        let mut answers: BTreeMap<Ipv4Addr, MacAddr> = BTreeMap::new();

        for round in 0..=self.retries {
            let pending: Vec<Ipv4Addr> = targets
                .iter()
                .copied()
                .filter(|addr| !answers.contains_key(addr))
                .collect();

            if pending.is_empty() || self.stop.is_stopped() {
                break;
            }
            if round > 0 {
                tracing::debug!("retransmitting {} unanswered probes (round {round})", pending.len());
            }

            self.send_batch(&pending);

            match self.collect(&wanted, &mut answers).await {
                RoundEnd::Expired => continue,
                RoundEnd::Complete | RoundEnd::Stopped | RoundEnd::Closed => break,
            }
        }

        answers
    }

    /// Each request is built right before it is sent, never the whole batch up front.
    fn send_batch(&mut self, pending: &[Ipv4Addr]) {
        let mut failed = 0usize;
        for &addr in pending {
            let packet = match arp::create_request(self.source, addr) {
                Ok(packet) => packet,
                Err(e) => {
                    tracing::error!("Failed to build ARP request for {addr}: {e}");
                    return;
                }
            };
            if let Some(Err(_)) = self.handle.tx.send_to(&packet, None) {
                failed += 1;
            }
        }
        if failed > 0 {
            tracing::debug!("{failed} of {} probes failed to send", pending.len());
        }
    }

    async fn collect(
        &mut self,
        wanted: &HashSet<Ipv4Addr>,
        answers: &mut BTreeMap<Ipv4Addr, MacAddr>,
    ) -> RoundEnd {
        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);
        let mut stop_poll = tokio::time::interval(STOP_POLL_INTERVAL);

        loop {
            tokio::select! {
                frame = self.handle.rx.recv() => {
                    let Some(bytes) = frame else {
                        return RoundEnd::Closed;
                    };
                    record_reply(&bytes, wanted, answers);
                    if answers.len() == wanted.len() {
                        // Late duplicates already queued still overwrite.
                        while let Ok(bytes) = self.handle.rx.try_recv() {
                            record_reply(&bytes, wanted, answers);
                        }
                        return RoundEnd::Complete;
                    }
                }

                _ = &mut deadline => {
                    return RoundEnd::Expired;
                }

                _ = stop_poll.tick() => {
                    if self.stop.is_stopped() {
                        return RoundEnd::Stopped;
                    }
                }
            }
        }
    }
}

fn record_reply(
    bytes: &[u8],
    wanted: &HashSet<Ipv4Addr>,
    answers: &mut BTreeMap<Ipv4Addr, MacAddr>,
) {
    let Some((addr, mac)) = arp::parse_reply(bytes) else {
        return;
    };
    if !wanted.contains(&addr) {
        return;
    }
    if let Some(previous) = answers.insert(addr, mac)
        && previous != mac
    {
        tracing::debug!("{addr} moved from {previous} to {mac}");
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

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::datalink::{DataLinkSender, NetworkInterface};
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Answers ARP requests for known hosts by pushing replies into the handle's queue.
    struct FakeSender {
        hosts: HashMap<Ipv4Addr, Vec<MacAddr>>,
        silent_once: HashSet<Ipv4Addr>,
        requester: ProbeSource,
        queue: mpsc::UnboundedSender<Vec<u8>>,
        sent: Arc<Mutex<Vec<Ipv4Addr>>>,
    }

    impl DataLinkSender for FakeSender {
        fn build_and_send(
            &mut self,
            _num_packets: usize,
            _packet_size: usize,
            _func: &mut dyn FnMut(&mut [u8]),
        ) -> Option<io::Result<()>> {
            Some(Ok(()))
        }

        fn send_to(
            &mut self,
            packet: &[u8],
            _dst: Option<NetworkInterface>,
        ) -> Option<io::Result<()>> {
            let addr = arp::requested_addr(packet)?;
            self.sent.lock().unwrap().push(addr);
            if self.silent_once.remove(&addr) {
                return Some(Ok(()));
            }
            for mac in self.hosts.get(&addr).into_iter().flatten() {
                let reply = arp::create_reply(addr, *mac, self.requester).unwrap();
                let _ = self.queue.send(reply);
            }
            Some(Ok(()))
        }
    }

    fn source() -> ProbeSource {
        ProbeSource {
            mac: MacAddr::new(0x02, 0, 0, 0, 0, 0x01),
            addr: Ipv4Addr::new(192, 168, 1, 100),
        }
    }

    fn config(retries: u32) -> DiscoveryConfig {
        DiscoveryConfig {
            timeout: Duration::from_millis(150),
            retries,
            interface: None,
        }
    }

    fn prober(
        hosts: HashMap<Ipv4Addr, Vec<MacAddr>>,
        silent_once: HashSet<Ipv4Addr>,
        retries: u32,
    ) -> (ArpProber, Arc<Mutex<Vec<Ipv4Addr>>>) {
        let (queue, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let tx = FakeSender {
            hosts,
            silent_once,
            requester: source(),
            queue,
            sent: sent.clone(),
        };
        let handle = EthernetHandle::new(Box::new(tx), rx);
        (ArpProber::new(handle, source(), &config(retries), StopSignal::new()), sent)
    }

    fn ip(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 1, last)
    }

    fn mac(last: u8) -> MacAddr {
        MacAddr::new(0xaa, 0xbb, 0xcc, 0, 0, last)
    }

    #[tokio::test]
    async fn collects_replies_from_probed_hosts() {
        let hosts = HashMap::from([(ip(1), vec![mac(1)]), (ip(2), vec![mac(2)])]);
        let (mut prober, sent) = prober(hosts, HashSet::new(), 1);

        let answers = prober.probe(&[ip(1), ip(2), ip(3)]).await;

        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get(&ip(1)), Some(&mac(1)));
        assert_eq!(answers.get(&ip(2)), Some(&mac(2)));
        // .3 never answers, so it is probed again in the retry round
        let sent = sent.lock().unwrap();
        assert_eq!(sent.iter().filter(|a| **a == ip(3)).count(), 2);
        assert_eq!(sent.iter().filter(|a| **a == ip(1)).count(), 1);
    }

    #[tokio::test]
    async fn duplicate_replies_keep_last_mac() {
        let hosts = HashMap::from([(ip(7), vec![mac(1), mac(9)])]);
        let (mut prober, _) = prober(hosts, HashSet::new(), 0);

        let answers = prober.probe(&[ip(7)]).await;
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(&ip(7)), Some(&mac(9)));
    }

    #[tokio::test]
    async fn retry_round_recovers_lost_probe() {
        let hosts = HashMap::from([(ip(5), vec![mac(5)])]);
        let (mut prober, sent) = prober(hosts, HashSet::from([ip(5)]), 1);

        let answers = prober.probe(&[ip(5)]).await;
        assert_eq!(answers.get(&ip(5)), Some(&mac(5)));
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn no_retries_means_single_round() {
        let hosts = HashMap::from([(ip(5), vec![mac(5)])]);
        let (mut prober, sent) = prober(hosts, HashSet::from([ip(5)]), 0);

        assert!(prober.probe(&[ip(5)]).await.is_empty());
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stopped_prober_sends_nothing() {
        let hosts = HashMap::from([(ip(1), vec![mac(1)])]);
        let (mut prober, sent) = prober(hosts, HashSet::new(), 1);
        prober.stop.stop();

        assert!(prober.probe(&[ip(1)]).await.is_empty());
        assert!(sent.lock().unwrap().is_empty());
    }
}
