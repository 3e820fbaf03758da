use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use colored::*;

use crate::commands::{CaptureArgs, ensure_root};
use crate::terminal::print;
use lanscope_common::config::{CaptureConfig, Config};
use lanscope_common::signal::StopSignal;
use lanscope_common::utils::format::{format_bytes, format_duration};
use lanscope_common::{artifact, success, warn};
use lanscope_core::capture::{
    CaptureObserver, CaptureReport, CaptureSession, ProtocolStats, SessionSummary, StopReason,
    write_pcap,
};

pub const DEFAULT_LOG_FILE: &str = "sniff_logs.txt";

pub fn log_file_path(args: &CaptureArgs, output_dir: &Path) -> PathBuf {
    args.log_file
        .clone()
        .unwrap_or_else(|| output_dir.join(DEFAULT_LOG_FILE))
}

/// Prints the running statistics table on the capture thread.
struct StatsPrinter {
    quiet: u8,
}

impl CaptureObserver for StatsPrinter {
    fn on_snapshot(&mut self, stats: &ProtocolStats) {
        if self.quiet == 0 {
            print::block(&stats.render());
        }
    }

    fn on_stop(&mut self, report: &CaptureReport) {
        print::header("capture finished", self.quiet);
        print::block(&report.stats.render());
    }
}

pub async fn capture(args: CaptureArgs, cfg: &Config, log_file: PathBuf) -> anyhow::Result<()> {
    if !ensure_root("Capture") {
        return Ok(());
    }

    let capture_cfg = CaptureConfig {
        interface: args.interface.clone(),
        filter: args.filter.clone(),
        count: args.count,
        timeout: args.timeout.map(Duration::from_secs),
        ..CaptureConfig::default()
    };

    let stop = StopSignal::new();
    let ctrl_c_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_stop.stop();
        }
    });

    let quiet = cfg.quiet;
    let (session, report) = tokio::task::spawn_blocking(move || {
        let mut session = CaptureSession::new(capture_cfg);
        let mut printer = StatsPrinter { quiet };
        let report = session.capture_live(&stop, &mut printer);
        (session, report)
    })
    .await
    .context("capture thread panicked")?;
    let report = report?;

    print_outcome(&report, cfg);

    if let Some(pcap_path) = &args.pcap {
        let retained = session.retained();
        write_pcap(pcap_path, report.datalink, retained)?;
        let bytes: u64 = retained.iter().map(|frame| frame.data.len() as u64).sum();
        success!(
            "{} frames ({}) written to {}",
            retained.len(),
            format_bytes(bytes),
            pcap_path.display()
        );
    }

    let summary_path = args.summary.unwrap_or_else(|| {
        artifact::timestamped_path(&cfg.output_dir, "capture_summary", "json")
    });
    SessionSummary::from_report(&report, Some(&log_file)).save(&summary_path)?;
    success!("Session summary saved to {}", summary_path.display());
    print::rule();
    Ok(())
}

fn print_outcome(report: &CaptureReport, cfg: &Config) {
    let reason = match report.reason {
        StopReason::CountReached => "frame count reached",
        StopReason::TimedOut => "timeout reached",
        StopReason::Cancelled => "stopped by user",
        StopReason::SourceExhausted => "source exhausted",
        StopReason::Failed => "capture failed",
    };
    if let Some(error) = &report.error {
        warn!("Capture on {} ended early: {error}", report.interface);
    }
    if cfg.quiet > 1 {
        return;
    }
    print::field("Interface", &report.interface);
    print::field("Packets", report.total_packets.to_string().bold());
    print::field("Duration", format_duration(report.elapsed));
    print::field("Stopped", reason);
}
