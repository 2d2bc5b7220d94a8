//! Fire-and-forget request frames.

use std::fmt;

use super::{
    body::{FrameParts, PayloadFrame, fmt_payload},
    header::{FrameFlags, FrameType, StreamId},
};
use crate::buffer::{PoolHandle, global_pool};

/// Request that expects no response.
///
/// Carries no fixed fields: the body is an optional metadata block followed
/// by data.
///
/// # Examples
///
/// ```
/// use rsocket_wire::frame::{FireAndForget, FrameFlags, PayloadFrame, StreamId};
///
/// let frame = FireAndForget::new(StreamId::new(7), b"hello", b"world", FrameFlags::empty());
/// assert!(frame.flags().contains(FrameFlags::METADATA));
/// assert_eq!(frame.metadata(), Some(&b"world"[..]));
/// assert_eq!(frame.data(), b"hello");
/// ```
#[derive(Debug)]
pub struct FireAndForget(FrameParts);

impl FireAndForget {
    /// Length of the fixed fields preceding the metadata block.
    pub const FIXED_LEN: usize = FrameType::RequestFnf.fixed_len();

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
            FrameType::RequestFnf,
            &[],
            data,
            metadata,
            flags,
        ))
    }

    pub(crate) fn from_parts(parts: FrameParts) -> Self { Self(parts) }
}

impl PayloadFrame for FireAndForget {
    fn parts(&self) -> &FrameParts { &self.0 }
}

impl fmt::Display for FireAndForget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FireAndForget{")?;
        fmt_payload(&self.0, f)?;
        f.write_str("}")
    }
}
