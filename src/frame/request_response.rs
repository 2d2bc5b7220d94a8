//! Request-response frames.

use std::fmt;

use super::{
    body::{FrameParts, PayloadFrame, fmt_payload},
    header::{FrameFlags, FrameType, StreamId},
};
use crate::buffer::{PoolHandle, global_pool};

/// Request that expects exactly one response.
///
/// Shares the fire-and-forget layout: no fixed fields, then optional
/// metadata and data.
///
/// # Examples
///
/// ```
/// use rsocket_wire::frame::{FrameFlags, PayloadFrame, RequestResponse, StreamId};
///
/// let frame = RequestResponse::new(StreamId::new(1), b"ping", b"", FrameFlags::empty());
/// assert_eq!(frame.metadata(), None);
/// assert_eq!(frame.size(), 6 + 4);
/// ```
#[derive(Debug)]
pub struct RequestResponse(FrameParts);

impl RequestResponse {
    /// Length of the fixed fields preceding the metadata block.
    pub const FIXED_LEN: usize = FrameType::RequestResponse.fixed_len();

    /// Build a frame in a buffer from the process-wide pool.
    #[must_use]
    pub fn new(stream_id: StreamId, data: &[u8], metadata: &[u8], flags: FrameFlags) -> Self {
        Self::new_in(&global_pool(), stream_id, data, metadata, flags)
    }

    /// Build a frame in a buffer borrowed from `pool`.
    #[must_use]
    pub fn new_in(
        pool: &PoolHandle,
        stream_id: StreamId,
        data: &[u8],
        metadata: &[u8],
        flags: FrameFlags,
    ) -> Self {
        Self(FrameParts::build(
            pool,
            stream_id,
            FrameType::RequestResponse,
            &[],
            data,
            metadata,
            flags,
        ))
    }

    pub(crate) fn from_parts(parts: FrameParts) -> Self { Self(parts) }
}

impl PayloadFrame for RequestResponse {
    fn parts(&self) -> &FrameParts { &self.0 }
}

impl fmt::Display for RequestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestResponse{")?;
        fmt_payload(&self.0, f)?;
        f.write_str("}")
    }
}
