//! # lanscope common
//!
//! Models and helpers shared by every lanscope crate: the discovered [`Device`](network::device::Device),
//! scan targets and IPv4 range math, the error taxonomy, configuration structs,
//! artifact persistence and the logging macros used across the workspace.

pub mod artifact;
pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod signal;
pub mod utils;

pub use tracing;
