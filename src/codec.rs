//! Stream framing for RSocket over byte-stream transports.
//!
//! On TCP every frame is preceded by its length as a 24-bit big-endian
//! integer. [`FrameCodec`] splits an inbound byte stream on that prefix and
//! decodes each frame in place; the resulting [`Frame`] borrows the received
//! buffer instead of copying it. Outbound frames are written straight into
//! the destination buffer behind their length prefix.
//!
//! Protocol violations surface as [`io::Error`] with kind
//! [`InvalidData`](io::ErrorKind::InvalidData) so the codec composes with
//! `tokio_util`'s [`Framed`](tokio_util::codec::Framed).

use std::io;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    byte_order::{U24_MAX, decode_u24, encode_u24},
    frame::{Frame, HEADER_LEN, PayloadFrame},
    metrics::{self, Direction},
};

/// Size of the frame length prefix.
pub const LENGTH_HEADER_SIZE: usize = 3;

/// Largest frame the 24-bit length prefix can describe.
pub const MAX_FRAME_LENGTH: usize = U24_MAX as usize;

/// Length-prefixed RSocket frame codec.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use rsocket_wire::{
///     codec::FrameCodec,
///     frame::{FireAndForget, Frame, FrameFlags, PayloadFrame, StreamId},
/// };
/// use tokio_util::codec::{Decoder, Encoder};
///
/// let mut codec = FrameCodec::default();
/// let mut wire = BytesMut::new();
/// let frame = FireAndForget::new(StreamId::new(1), b"hi", b"", FrameFlags::empty());
/// codec.encode(Frame::from(frame), &mut wire).expect("encode");
/// assert_eq!(&wire[..3], &[0, 0, 8]);
///
/// let decoded = codec.decode(&mut wire).expect("decode").expect("complete frame");
/// assert_eq!(decoded.data(), b"hi");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FrameCodec {
    max_frame_length: usize,
}

impl FrameCodec {
    /// Construct a codec accepting frames up to `max_frame_length` bytes.
    ///
    /// The limit is clamped to `HEADER_LEN..=MAX_FRAME_LENGTH`.
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: max_frame_length.clamp(HEADER_LEN, MAX_FRAME_LENGTH),
        }
    }

    /// Return the maximum frame length accepted by this codec.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.max_frame_length }

    fn oversized(&self, size: usize) -> io::Error {
        metrics::inc_errors();
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "frame of {size} bytes exceeds maximum of {}",
                self.max_frame_length
            ),
        )
    }
}

impl Default for FrameCodec {
    fn default() -> Self { Self::new(MAX_FRAME_LENGTH) }
}

/// Read the declared frame length, if the prefix is complete.
fn peek_length(src: &[u8]) -> Option<usize> {
    let prefix = src.get(..LENGTH_HEADER_SIZE)?;
    <[u8; LENGTH_HEADER_SIZE]>::try_from(prefix)
        .ok()
        .map(|bytes| decode_u24(bytes) as usize)
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(len) = peek_length(src) else {
            return Ok(None);
        };
        if len > self.max_frame_length {
            return Err(self.oversized(len));
        }
        let total = LENGTH_HEADER_SIZE + len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }
        src.advance(LENGTH_HEADER_SIZE);
        let raw = src.split_to(len).freeze();
        match Frame::from_bytes(raw) {
            Ok(frame) => {
                tracing::trace!(frame = %frame.header(), "decoded frame");
                metrics::inc_frames(Direction::Inbound);
                Ok(Some(frame))
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding malformed frame");
                metrics::inc_errors();
                Err(e.into())
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        // Clean close: no data remaining at frame boundary
        if src.is_empty() {
            return Ok(None);
        }
        let message = match peek_length(src) {
            Some(expected) => format!(
                "connection closed mid-frame: received {} of {expected} bytes",
                src.len() - LENGTH_HEADER_SIZE
            ),
            None => format!(
                "connection closed mid-header: received {} of {LENGTH_HEADER_SIZE} length bytes",
                src.len()
            ),
        };
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, message))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let size = item.size();
        if size > self.max_frame_length {
            return Err(self.oversized(size));
        }
        dst.reserve(LENGTH_HEADER_SIZE + size);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "size was checked against MAX_FRAME_LENGTH"
        )]
        dst.put_slice(&encode_u24(size as u32));
        item.write_to(&mut dst.writer())?;
        tracing::trace!(frame = %item.header(), size, "encoded frame");
        metrics::inc_frames(Direction::Outbound);
        Ok(())
    }
}
