//! Request-stream frames.

use std::fmt;

use super::{
    body::{FrameParts, PayloadFrame, fmt_payload},
    header::{FrameFlags, FrameType, StreamId},
};
use crate::{
    buffer::{PoolHandle, global_pool},
    byte_order::write_network_u32,
};

/// Request for a finite or infinite stream of responses.
///
/// Same body layout as [`RequestChannel`](super::RequestChannel).
#[derive(Debug)]
pub struct RequestStream(FrameParts);

impl RequestStream {
    /// Length of the fixed `initialRequestN` field.
    pub const FIXED_LEN: usize = FrameType::RequestStream.fixed_len();

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
            FrameType::RequestStream,
            &write_network_u32(initial_request_n),
            data,
            metadata,
            flags,
        ))
    }

    pub(crate) fn from_parts(parts: FrameParts) -> Self { Self(parts) }

    /// Return the number of responses initially requested.
    #[must_use]
    pub fn initial_request_n(&self) -> u32 { self.0.fixed_u32(0).unwrap_or_default() }
}

impl PayloadFrame for RequestStream {
    fn parts(&self) -> &FrameParts { &self.0 }
}

impl fmt::Display for RequestStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestStream{")?;
        fmt_payload(&self.0, f)?;
        write!(f, ",initial_request_n={}}}", self.initial_request_n())
    }
}
