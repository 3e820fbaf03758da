use std::fs;
use std::path::{Path, PathBuf};

use pcap::{Capture, Linktype, Packet, PacketHeader};
use serde::{Deserialize, Serialize};

use lanscope_common::{artifact, error::CaptureError};

use super::session::{CaptureReport, RetainedFrame};
use super::stats::ProtocolStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub timestamp: String,
    pub interface: String,
    pub total_packets: u64,
    pub log_file: Option<String>,
}

/// Persisted summary of a finished capture session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_info: SessionInfo,
    pub protocol_statistics: ProtocolStats,
}

impl SessionSummary {
    pub fn from_report(report: &CaptureReport, log_file: Option<&Path>) -> Self {
        Self {
            session_info: SessionInfo {
                timestamp: report.started_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
                interface: report.interface.clone(),
                total_packets: report.total_packets,
                log_file: log_file.map(|p| p.display().to_string()),
            },
            protocol_statistics: report.stats,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CaptureError> {
        artifact::write_json_atomic(path, self).map_err(|e| CaptureError::Export {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Writes `frames` as a pcap file, replacing `path` only once complete.
pub fn write_pcap(path: &Path, datalink: i32, frames: &[RetainedFrame]) -> Result<(), CaptureError> {
    let export_err = |reason: String| CaptureError::Export {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| export_err(e.to_string()))?;
    }

    let tmp = tmp_path(path);
    let dead = Capture::dead(Linktype(datalink)).map_err(|e| export_err(e.to_string()))?;
    let mut savefile = dead.savefile(&tmp).map_err(|e| export_err(e.to_string()))?;

    for frame in frames {
        let header = PacketHeader {
            ts: to_timeval(frame),
            caplen: frame.data.len() as u32,
            len: frame.orig_len,
        };
        savefile.write(&Packet::new(&header, &frame.data));
    }
    savefile.flush().map_err(|e| export_err(e.to_string()))?;
    drop(savefile);

    fs::rename(&tmp, path).map_err(|e| export_err(e.to_string()))?;
    tracing::debug!("wrote {} frames to {}", frames.len(), path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn to_timeval(frame: &RetainedFrame) -> libc::timeval {
    libc::timeval {
        tv_sec: frame.timestamp.as_secs() as _,
        tv_usec: frame.timestamp.subsec_micros() as _,
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
