//! Live **packet capture and classification**.
//!
//! A [`CaptureSession`] pulls frames from a [`FrameSource`], decodes each one
//! once into a tagged frame, classifies it and folds the result into its
//! [`ProtocolStats`]. Classification runs on the capture thread for every
//! frame, so it only inspects header fields and short payload prefixes.

pub mod classifier;
pub mod export;
pub mod session;
pub mod source;
pub mod stats;

pub use classifier::{Classification, Protocol, classify};
pub use export::{SessionSummary, write_pcap};
pub use session::{
    CaptureObserver, CaptureReport, CaptureSession, NoopObserver, SessionState, StopReason,
};
pub use source::{CaptureInterface, FrameSource, MemorySource, PcapSource, capture_interfaces};
pub use stats::ProtocolStats;
