use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub struct Config {
    /// Reduces terminal output. `1` hides decorations, `2` prints only results.
    pub quiet: u8,
    /// Skips the OUI lookup when building devices.
    pub no_vendor: bool,
    /// Directory receiving scan results, summaries, captures and reports.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiet: 0,
            no_vendor: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Parameters of one address-resolution sweep.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// How long each probe round waits for replies.
    pub timeout: Duration,
    /// Number of retransmission rounds for unanswered probes.
    pub retries: u32,
    /// Forces the interface used for probing instead of routing lookup.
    pub interface: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            retries: 1,
            interface: None,
        }
    }
}

/// Parameters of one live capture session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// `None` selects the backend's default device.
    pub interface: Option<String>,
    /// BPF expression, compiled before capture starts.
    pub filter: Option<String>,
    /// Stop after this many frames. `0` means unlimited.
    pub count: u64,
    /// Stop after this much wall time.
    pub timeout: Option<Duration>,
    pub snaplen: i32,
    pub promisc: bool,
    /// Backend read timeout, bounds how late a stop request is noticed.
    pub read_timeout_ms: i32,
    /// Maximum number of raw frames retained for pcap export.
    pub retain_limit: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: None,
            filter: None,
            count: 0,
            timeout: None,
            snaplen: 65535,
            promisc: true,
            read_timeout_ms: 100,
            retain_limit: 10_000,
        }
    }
}
