//! Error taxonomy shared across the workspace.
//!
//! Configuration problems are rejected before any I/O happens. Resolution
//! failures are only surfaced by the gateway lookup; domain lookups return
//! empty results instead.

use std::path::PathBuf;

use thiserror::Error;

/// A discovery target that failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("target is empty")]
    Empty,
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix '{0}', expected 0-32")]
    InvalidPrefix(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no default route with a bound IPv4 address")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("insufficient privileges to capture on '{0}'")]
    PermissionDenied(String),
    #[error("interface '{0}' does not exist")]
    InterfaceNotFound(String),
    #[error("invalid capture filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("a capture session is already running")]
    AlreadyRunning,
    #[error("capture I/O failure: {0}")]
    Io(String),
    #[error("failed to export capture to {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("cannot build a topology from an empty device list")]
    EmptyInput,
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
