//! Error taxonomy for the visualization session.
//!
//! Every variant is fatal at startup: analysis runs once, backend
//! initialization runs once, and nothing in the per-tick path can fail
//! after the session invariants are established.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while building a visualization session
#[derive(Debug, Error)]
pub enum VisError {
    /// Audio file missing, unreadable, or unparsable
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Audio file decoded to zero sample frames
    #[error("{} contains no audio samples", .0.display())]
    EmptyTrack(PathBuf),

    /// Invalid configuration (zero bars, zero bar pitch, ...)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Audio device or output stream failure
    #[error("audio backend: {0}")]
    AudioBackend(String),

    /// GPU adapter, device, or surface failure
    #[error("render backend: {0}")]
    RenderBackend(String),
}
