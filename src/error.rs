//! Canonical error types for frame handling.
//!
//! - [`FrameError`]: a frame or header that cannot be interpreted. Raised by
//!   validation and header parsing; the frame should be discarded. Whether
//!   the connection survives is decided by the caller.
//! - [`EncodeError`]: the byte sink failed part-way through a frame. The
//!   frame counts as unsent in full; retrying means encoding it again from
//!   the start.
//!
//! Connection failures are not represented here: a
//! [`SocketSupplier`](crate::balancer::SocketSupplier) hands back its
//! connector's own error unchanged.

use std::io;

use thiserror::Error;

/// Errors raised while interpreting an inbound frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The body is shorter than the variant's fixed fields.
    #[error("incomplete frame: body has {have} bytes, need at least {need}")]
    IncompleteFrame {
        /// Fixed-field length required by the frame type.
        need: usize,
        /// Bytes actually present in the body.
        have: usize,
    },

    /// Fewer bytes than a frame header were supplied.
    #[error("incomplete frame header: have {have} bytes, need {need}")]
    IncompleteHeader {
        /// Bytes currently available.
        have: usize,
        /// Bytes required for a complete header.
        need: usize,
    },

    /// The header names a frame type outside the supported family.
    #[error("unknown frame type: {0:#04x}")]
    UnknownFrameType(u8),
}

impl From<FrameError> for io::Error {
    fn from(error: FrameError) -> Self { io::Error::new(io::ErrorKind::InvalidData, error) }
}

/// The underlying sink failed while a frame was being written.
///
/// `written` counts the bytes the sink accepted before failing. They are
/// reported for diagnostics only: the peer has seen a truncated frame.
#[derive(Debug, Error)]
#[error("frame write failed after {written} bytes: {source}")]
pub struct EncodeError {
    /// Bytes accepted by the sink before the failure.
    pub written: usize,
    /// Error returned by the sink.
    #[source]
    pub source: io::Error,
}

impl EncodeError {
    /// Return the I/O error kind reported by the sink.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind { self.source.kind() }
}

impl From<EncodeError> for io::Error {
    fn from(error: EncodeError) -> Self { error.source }
}

/// Result alias for frame interpretation.
pub type Result<T> = std::result::Result<T, FrameError>;
