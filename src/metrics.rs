//! Metric helpers for `rsocket-wire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking frames passing through [`FrameCodec`](crate::codec::FrameCodec).
pub const FRAMES_PROCESSED: &str = "rsocket_frames_processed_total";
/// Name of the counter tracking connection attempts made by a
/// [`SocketSupplier`](crate::balancer::SocketSupplier).
pub const CONNECT_ATTEMPTS: &str = "rsocket_connect_attempts_total";
/// Name of the counter tracking error occurrences.
pub const ERRORS_TOTAL: &str = "rsocket_errors_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames decoded from the peer.
    Inbound,
    /// Frames encoded for the peer.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only read by recorders"))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Outcome of a connection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The connector produced a connection.
    Success,
    /// The connector returned an error.
    Failure,
}

impl Outcome {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only read by recorders"))]
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Record a processed frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a connection attempt and its outcome.
pub fn inc_connect_attempts(outcome: Outcome) {
    #[cfg(feature = "metrics")]
    counter!(CONNECT_ATTEMPTS, "outcome" => outcome.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record an error occurrence.
pub fn inc_errors() {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL).increment(1);
}
