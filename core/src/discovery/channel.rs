use std::time::Duration;

use anyhow::{Context, bail};
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tokio::sync::mpsc;

const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Layer 2 send half plus a queue fed by a reader thread.
pub struct EthernetHandle {
    pub tx: Box<dyn DataLinkSender>,
    pub rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl EthernetHandle {
    /// Wraps an already opened sender and a queue of received frames.
    pub fn new(tx: Box<dyn DataLinkSender>, rx: mpsc::UnboundedReceiver<Vec<u8>>) -> Self {
        Self { tx, rx }
    }
}

/// Opens an Ethernet channel on `intf` and starts forwarding received frames.
pub fn start_capture(intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
    let (tx, rx) = open_eth_channel(intf, &get_config(), datalink::channel)?;
    Ok(EthernetHandle::new(tx, spawn_reader(rx)))
}

fn spawn_reader(mut rx: Box<dyn DataLinkReceiver>) -> mpsc::UnboundedReceiver<Vec<u8>> {
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while !queue_tx.is_closed() {
            if let Ok(frame) = rx.next()
                && queue_tx.send(frame.to_vec()).is_err()
            {
                break;
            }
        }
    });
    queue_rx
}

fn open_eth_channel<F>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
) -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)>
where
    F: FnOnce(&NetworkInterface, Config) -> std::io::Result<Channel>,
{
    let ch: Channel = channel_opener(intf, *cfg)
        .with_context(|| format!("opening on {}", intf.name))?;
    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => bail!("non-ethernet channel for {}", intf.name),
    }
}

fn get_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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
