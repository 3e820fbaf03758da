//! Wire formats used by lanscope.
//!
//! Construction of the link-layer probes sent during discovery, and the
//! one-pass decoding of captured frames into a tagged representation that
//! the classifier matches on.

pub mod arp;
pub mod dns;
pub mod ethernet;
pub mod frame;
pub mod http;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;
pub const MIN_ETH_FRAME_NO_FCS: usize = 60;
