//! Where captured frames come from.
//!
//! [`PcapSource`] reads a live interface through libpcap. Anything else that
//! yields frames (replay files, test fixtures) implements [`FrameSource`].

use std::collections::VecDeque;
use std::net::IpAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pcap::{Active, Capture, Device, Linktype};

use lanscope_common::{config::CaptureConfig, error::CaptureError};
use lanscope_protocols::frame::LinkKind;

/// libpcap datalink numbers the decoder understands.
pub const DLT_EN10MB: i32 = 1;
pub const DLT_RAW: i32 = 12;
pub const DLT_LINUX_SLL: i32 = 113;

/// One captured frame, borrowed from the source until the next read.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub data: &'a [u8],
    /// Capture time since the Unix epoch.
    pub timestamp: Duration,
    /// Length on the wire, may exceed `data.len()` when truncated by the snaplen.
    pub orig_len: u32,
}

#[derive(Debug)]
pub enum NextFrame<'a> {
    Frame(RawFrame<'a>),
    /// Nothing arrived within the read timeout.
    Idle,
    /// The source has no more frames and never will.
    Exhausted,
}

pub trait FrameSource {
    fn next_frame(&mut self) -> Result<NextFrame<'_>, CaptureError>;

    /// libpcap datalink type of the produced frames.
    fn datalink(&self) -> i32;

    fn interface(&self) -> &str;

    /// Frames the kernel dropped so far, when the backend reports it.
    fn dropped(&mut self) -> Option<u32> {
        None
    }
}

pub fn link_kind(datalink: i32) -> LinkKind {
    match datalink {
        DLT_LINUX_SLL => LinkKind::LinuxSll,
        DLT_RAW | 14 | 101 => LinkKind::RawIp,
        _ => LinkKind::Ethernet,
    }
}

/// A capture-capable device as reported by libpcap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureInterface {
    pub name: String,
    pub description: Option<String>,
    pub addresses: Vec<IpAddr>,
}

pub fn capture_interfaces() -> Result<Vec<CaptureInterface>, CaptureError> {
    let devices = Device::list().map_err(|e| backend_error("any", e))?;
    Ok(devices
        .into_iter()
        .map(|device| CaptureInterface {
            addresses: device.addresses.iter().map(|a| a.addr).collect(),
            name: device.name,
            description: device.desc,
        })
        .collect())
}

/// Compiles `filter` without touching any interface.
pub fn validate_filter(filter: &str) -> Result<(), CaptureError> {
    let dead = Capture::dead(Linktype::ETHERNET).map_err(|e| CaptureError::Io(e.to_string()))?;
    dead.compile(filter, true)
        .map(|_| ())
        .map_err(|e| CaptureError::InvalidFilter {
            filter: filter.to_string(),
            reason: e.to_string(),
        })
}

pub struct PcapSource {
    cap: Capture<Active>,
    interface: String,
    datalink: i32,
}

impl PcapSource {
    /// Opens a live capture as described by `config`.
    ///
    /// The filter is compiled before the interface is opened.
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        if let Some(filter) = &config.filter {
            validate_filter(filter)?;
        }

        let device = find_device(config.interface.as_deref())?;
        let interface = device.name.clone();

        let mut cap = Capture::from_device(device)
            .map_err(|e| backend_error(&interface, e))?
            .promisc(config.promisc)
            .snaplen(config.snaplen)
            .timeout(config.read_timeout_ms)
            .open()
            .map_err(|e| backend_error(&interface, e))?;

        if let Some(filter) = &config.filter {
            cap.filter(filter, true)
                .map_err(|e| CaptureError::InvalidFilter {
                    filter: filter.clone(),
                    reason: e.to_string(),
                })?;
        }

        let datalink = cap.get_datalink().0;
        tracing::debug!("opened {interface} with datalink {datalink}");

        Ok(Self {
            cap,
            interface,
            datalink,
        })
    }
}

impl FrameSource for PcapSource {
    fn next_frame(&mut self) -> Result<NextFrame<'_>, CaptureError> {
        match self.cap.next_packet() {
            Ok(packet) => Ok(NextFrame::Frame(RawFrame {
                timestamp: from_timeval(&packet.header.ts),
                orig_len: packet.header.len,
                data: packet.data,
            })),
            Err(pcap::Error::TimeoutExpired) => Ok(NextFrame::Idle),
            Err(pcap::Error::NoMorePackets) => Ok(NextFrame::Exhausted),
            Err(e) => Err(CaptureError::Io(e.to_string())),
        }
    }

    fn datalink(&self) -> i32 {
        self.datalink
    }

    fn interface(&self) -> &str {
        &self.interface
    }

    fn dropped(&mut self) -> Option<u32> {
        self.cap.stats().ok().map(|stat| stat.dropped)
    }
}

/// Frames held in memory, handed out in order.
pub struct MemorySource {
    frames: VecDeque<Vec<u8>>,
    current: Vec<u8>,
    interface: String,
    datalink: i32,
    started: SystemTime,
}

impl MemorySource {
    pub fn new(interface: impl Into<String>, frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            current: Vec::new(),
            interface: interface.into(),
            datalink: DLT_EN10MB,
            started: SystemTime::now(),
        }
    }

    pub fn with_datalink(mut self, datalink: i32) -> Self {
        self.datalink = datalink;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<NextFrame<'_>, CaptureError> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(NextFrame::Exhausted);
        };
        self.current = frame;
        Ok(NextFrame::Frame(RawFrame {
            data: &self.current,
            timestamp: self
                .started
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
            orig_len: self.current.len() as u32,
        }))
    }

    fn datalink(&self) -> i32 {
        self.datalink
    }

    fn interface(&self) -> &str {
        &self.interface
    }
}

fn find_device(name: Option<&str>) -> Result<Device, CaptureError> {
    match name {
        Some(name) => Device::list()
            .map_err(|e| backend_error(name, e))?
            .into_iter()
            .find(|device| device.name == name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(name.to_string())),
        None => Device::lookup()
            .map_err(|e| backend_error("default", e))?
            .ok_or_else(|| CaptureError::InterfaceNotFound("default".to_string())),
    }
}

/// Sorts libpcap failures into the capture error taxonomy by their message.
fn backend_error(interface: &str, e: pcap::Error) -> CaptureError {
    let message = e.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("permission") || lowered.contains("not permitted") {
        CaptureError::PermissionDenied(interface.to_string())
    } else if lowered.contains("no such device") {
        CaptureError::InterfaceNotFound(interface.to_string())
    } else {
        CaptureError::Io(message)
    }
}

fn from_timeval(ts: &libc::timeval) -> Duration {
    let secs = u64::try_from(ts.tv_sec).unwrap_or_default();
    let micros = u64::try_from(ts.tv_usec).unwrap_or_default();
    Duration::from_secs(secs) + Duration::from_micros(micros)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
