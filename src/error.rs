//! Error types for the sync pipeline
//!
//! Each stage reports a typed error; only the dispatcher and the transport
//! worker turn them into log lines.

use std::io;
use thiserror::Error;

use crate::types::LightId;

/// Per-light data that cannot be converted
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("degenerate direction vector ({x}, {y}, {z}) cannot be normalized")]
    DegenerateInput { x: f64, y: f64, z: f64 },

    #[error("non-finite {field}")]
    NonFinite { field: &'static str },

    #[error("negative intensity {0}")]
    NegativeIntensity(f64),
}

/// Failures reading from the host document
#[derive(Debug, Error)]
pub enum HostError {
    #[error("light {0} is not in the light table")]
    MissingLight(LightId),

    #[error("light {id} could not be read: {reason}")]
    Unreadable { id: LightId, reason: String },
}

/// Reason a single light was left out of a snapshot
#[derive(Debug, Error)]
pub enum LightError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("light {id}: {source}")]
    Conversion {
        id: LightId,
        #[source]
        source: ConversionError,
    },
}

/// Reasons a whole pipeline run is abandoned
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no active document")]
    HostUnavailable,

    #[error("pipeline panicked: {0}")]
    Unexpected(String),
}

/// Delivery failures; always dropped after logging
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("delivery timed out after {0:?}")]
    Timeout(std::time::Duration),
}
