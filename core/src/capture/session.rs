use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use lanscope_common::{config::CaptureConfig, error::CaptureError, signal::StopSignal};
use lanscope_protocols::frame;

use super::{
    classifier::{self, Classification},
    source::{self, FrameSource, NextFrame, PcapSource, RawFrame},
    stats::ProtocolStats,
};

/// A statistics snapshot is handed to the observer every this many frames.
pub const SNAPSHOT_INTERVAL: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CountReached,
    TimedOut,
    Cancelled,
    /// The source ran dry, e.g. a replay reached its end.
    SourceExhausted,
    /// The backend failed mid-capture, see [`CaptureReport::error`].
    Failed,
}

/// A raw frame kept for pcap export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedFrame {
    pub data: Vec<u8>,
    pub timestamp: Duration,
    pub orig_len: u32,
}

impl From<&RawFrame<'_>> for RetainedFrame {
    fn from(frame: &RawFrame<'_>) -> Self {
        Self {
            data: frame.data.to_vec(),
            timestamp: frame.timestamp,
            orig_len: frame.orig_len,
        }
    }
}

/// Outcome of one finished session.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub interface: String,
    pub datalink: i32,
    pub reason: StopReason,
    pub stats: ProtocolStats,
    pub total_packets: u64,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    /// Kernel drops reported by the backend. A statistic, not a failure.
    pub dropped: Option<u32>,
    /// Fatal backend error that ended the session early.
    pub error: Option<String>,
}

/// Receives progress of a running session on the capture thread.
pub trait CaptureObserver {
    fn on_frame(&mut self, _number: u64, _classification: &Classification) {}

    fn on_snapshot(&mut self, _stats: &ProtocolStats) {}

    fn on_stop(&mut self, _report: &CaptureReport) {}
}

pub struct NoopObserver;

impl CaptureObserver for NoopObserver {}

/// One capture run, from start to stop, owning its counters.
///
/// `Idle -> Running -> Stopping -> Idle`. Every start resets the counters
/// and the retained frames. Reaching the frame count, the timeout or a stop
/// request all end the session normally.
pub struct CaptureSession {
    config: CaptureConfig,
    state: SessionState,
    stats: ProtocolStats,
    packet_count: u64,
    retained: Vec<RetainedFrame>,
}

impl CaptureSession {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            stats: ProtocolStats::new(),
            packet_count: 0,
            retained: Vec::new(),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &ProtocolStats {
        &self.stats
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    /// Frames kept for export, at most `retain_limit` of them.
    pub fn retained(&self) -> &[RetainedFrame] {
        &self.retained
    }

    /// Opens the configured live interface and captures until a stop condition.
    pub fn capture_live(
        &mut self,
        stop: &StopSignal,
        observer: &mut dyn CaptureObserver,
    ) -> Result<CaptureReport, CaptureError> {
        if self.state != SessionState::Idle {
            return Err(CaptureError::AlreadyRunning);
        }
        let mut source = PcapSource::open(&self.config)?;
        self.run(&mut source, stop, observer)
    }

    /// Classifies frames from `source` until a stop condition.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        stop: &StopSignal,
        observer: &mut dyn CaptureObserver,
    ) -> Result<CaptureReport, CaptureError> {
        if self.state != SessionState::Idle {
            return Err(CaptureError::AlreadyRunning);
        }
        self.start();

        let started_at = Local::now();
        let clock = Instant::now();
        let link = source::link_kind(source.datalink());
        let interface = source.interface().to_string();

        tracing::info!(
            "Capture started on {interface} (filter: {}, count: {}, timeout: {})",
            self.config.filter.as_deref().unwrap_or("none"),
            match self.config.count {
                0 => "unlimited".to_string(),
                n => n.to_string(),
            },
            self.config
                .timeout
                .map(|t| format!("{}s", t.as_secs()))
                .unwrap_or_else(|| "none".to_string()),
        );

        let mut error = None;
        let reason = loop {
            if stop.is_stopped() {
                break StopReason::Cancelled;
            }
            if self.config.timeout.is_some_and(|limit| clock.elapsed() >= limit) {
                break StopReason::TimedOut;
            }

            match source.next_frame() {
                Ok(NextFrame::Frame(raw)) => {
                    let decoded = frame::decode(link, raw.data);
                    let classification = classifier::classify(&decoded);
                    self.record(&raw, classification, observer);

                    if self.config.count > 0 && self.packet_count >= self.config.count {
                        break StopReason::CountReached;
                    }
                }
                Ok(NextFrame::Idle) => continue,
                Ok(NextFrame::Exhausted) => break StopReason::SourceExhausted,
                Err(e) => {
                    tracing::error!("Capture on {interface} failed: {e}");
                    error = Some(e.to_string());
                    break StopReason::Failed;
                }
            }
        };

        self.state = SessionState::Stopping;

        let dropped = source.dropped();
        if let Some(n) = dropped.filter(|n| *n > 0) {
            tracing::warn!("Kernel dropped {n} packets on {interface}");
        }

        let report = CaptureReport {
            interface,
            datalink: source.datalink(),
            reason,
            stats: self.stats,
            total_packets: self.packet_count,
            started_at,
            elapsed: clock.elapsed(),
            dropped,
            error,
        };
        self.log_final(&report);
        observer.on_stop(&report);

        self.state = SessionState::Idle;
        Ok(report)
    }

    fn start(&mut self) {
        self.state = SessionState::Running;
        self.stats = ProtocolStats::new();
        self.packet_count = 0;
        self.retained.clear();
    }

    fn record(
        &mut self,
        raw: &RawFrame<'_>,
        classification: Classification,
        observer: &mut dyn CaptureObserver,
    ) {
        self.packet_count += 1;
        self.stats.record(classification.protocol);
        tracing::info!("Packet #{}: {}", self.packet_count, classification.summary);

        if self.retained.len() < self.config.retain_limit {
            self.retained.push(RetainedFrame::from(raw));
        } else if self.packet_count == self.config.retain_limit as u64 + 1 {
            tracing::debug!("retention limit of {} frames reached", self.config.retain_limit);
        }

        observer.on_frame(self.packet_count, &classification);
        if self.packet_count % SNAPSHOT_INTERVAL == 0 {
            observer.on_snapshot(&self.stats);
        }
    }

    fn log_final(&self, report: &CaptureReport) {
        tracing::info!(
            "Capture stopped on {} after {} packets ({:?})",
            report.interface,
            report.total_packets,
            report.reason
        );
        for (protocol, count) in report.stats.iter() {
            tracing::info!(
                "{protocol}: {count} packets ({:.1}%)",
                report.stats.percentage(protocol)
            );
        }
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
