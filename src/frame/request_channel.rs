//! Request-channel frames.

use std::fmt;

use super::{
    body::{FrameParts, PayloadFrame, fmt_payload},
    header::{FrameFlags, FrameType, StreamId},
};
use crate::{
    buffer::{PoolHandle, global_pool},
    byte_order::write_network_u32,
};

/// Opens a bidirectional stream, granting the responder an initial credit.
///
/// The body starts with a 4-byte big-endian `initialRequestN`, followed by
/// the optional metadata block and data.
///
/// # Examples
///
/// ```
/// use rsocket_wire::frame::{FrameFlags, PayloadFrame, RequestChannel, StreamId};
///
/// let frame = RequestChannel::new(StreamId::new(3), 42, b"x", b"", FrameFlags::empty());
/// assert_eq!(frame.initial_request_n(), 42);
/// assert!(!frame.flags().contains(FrameFlags::METADATA));
/// assert_eq!(frame.data(), b"x");
/// ```
#[derive(Debug)]
pub struct RequestChannel(FrameParts);

impl RequestChannel {
    /// Length of the fixed `initialRequestN` field.
    pub const FIXED_LEN: usize = FrameType::RequestChannel.fixed_len();

    /// Build a frame in a buffer from the process-wide pool.
    #[must_use]
    pub fn new(
        stream_id: StreamId,
        initial_request_n: u32,
        data: &[u8],
        metadata: &[u8],
        flags: FrameFlags,
    ) -> Self {
        Self::new_in(
            &global_pool(),
            stream_id,
            initial_request_n,
            data,
            metadata,
            flags,
        )
    }

    /// Build a frame in a buffer borrowed from `pool`.
    #[must_use]
    pub fn new_in(
        pool: &PoolHandle,
        stream_id: StreamId,
        initial_request_n: u32,
        data: &[u8],
        metadata: &[u8],
        flags: FrameFlags,
    ) -> Self {
        Self(FrameParts::build(
            pool,
            stream_id,
            FrameType::RequestChannel,
            &write_network_u32(initial_request_n),
            data,
            metadata,
            flags,
        ))
    }

    pub(crate) fn from_parts(parts: FrameParts) -> Self { Self(parts) }

    /// Return the credit granted to the responder.
    ///
    /// Frames are validated on construction and decode, so the field is
    /// always present; a truncated body would read as `0`.
    #[must_use]
    pub fn initial_request_n(&self) -> u32 { self.0.fixed_u32(0).unwrap_or_default() }
}

impl PayloadFrame for RequestChannel {
    fn parts(&self) -> &FrameParts { &self.0 }
}

impl fmt::Display for RequestChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestChannel{")?;
        fmt_payload(&self.0, f)?;
        write!(f, ",initial_request_n={}}}", self.initial_request_n())
    }
}
