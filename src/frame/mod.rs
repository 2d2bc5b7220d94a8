//! Frame model and codec.
//!
//! Every frame is a fixed [`FrameHeader`] followed by a body. Payload frames
//! share one body layout parameterised by the frame type's fixed-field
//! length, so encoding, sizing, validation and zero-copy slicing are written
//! once in [`body`] and reused by each variant.

pub mod body;
pub mod fire_and_forget;
pub mod header;
pub mod request_channel;
pub mod request_response;
pub mod request_stream;

use std::fmt;

pub use body::{FrameParts, METADATA_LEN_SIZE, PayloadFrame};
use bytes::Bytes;
pub use fire_and_forget::FireAndForget;
pub use header::{FrameFlags, FrameHeader, FrameType, HEADER_LEN, StreamId};
pub use request_channel::RequestChannel;
pub use request_response::RequestResponse;
pub use request_stream::RequestStream;

use crate::error::Result;

/// Any frame handled by this crate.
///
/// Values are always valid: constructors write the fixed fields
/// unconditionally and [`Frame::decode`] validates before returning.
#[derive(Debug)]
pub enum Frame {
    /// See [`RequestResponse`].
    RequestResponse(RequestResponse),
    /// See [`FireAndForget`].
    FireAndForget(FireAndForget),
    /// See [`RequestStream`].
    RequestStream(RequestStream),
    /// See [`RequestChannel`].
    RequestChannel(RequestChannel),
}

impl Frame {
    /// Interpret a received `body` according to `header`.
    ///
    /// The body is kept as-is; metadata and data accessors return views into
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::IncompleteFrame`](crate::error::FrameError) if
    /// the body is shorter than the frame type's fixed fields.
    pub fn decode(header: FrameHeader, body: Bytes) -> Result<Self> {
        let parts = FrameParts::shared(header, body);
        parts.validate()?;
        Ok(match header.frame_type() {
            FrameType::RequestResponse => Self::RequestResponse(RequestResponse::from_parts(parts)),
            FrameType::RequestFnf => Self::FireAndForget(FireAndForget::from_parts(parts)),
            FrameType::RequestStream => Self::RequestStream(RequestStream::from_parts(parts)),
            FrameType::RequestChannel => Self::RequestChannel(RequestChannel::from_parts(parts)),
        })
    }

    /// Split `frame` into header and body and decode it.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use rsocket_wire::frame::{Frame, FrameType, PayloadFrame};
    ///
    /// let raw = Bytes::from_static(&[0, 0, 0, 9, 0x14, 0x00, b'h', b'i']);
    /// let frame = Frame::from_bytes(raw).expect("valid frame");
    /// assert_eq!(frame.frame_type(), FrameType::RequestFnf);
    /// assert_eq!(frame.stream_id().get(), 9);
    /// assert_eq!(frame.data(), b"hi");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the header is truncated or names an unsupported
    /// type, or if the body fails validation.
    pub fn from_bytes(mut frame: Bytes) -> Result<Self> {
        let header = FrameHeader::decode(&frame)?;
        let body = frame.split_off(HEADER_LEN);
        Self::decode(header, body)
    }

    /// Return the frame type.
    #[must_use]
    pub fn frame_type(&self) -> FrameType { self.header().frame_type() }
}

impl PayloadFrame for Frame {
    fn parts(&self) -> &FrameParts {
        match self {
            Self::RequestResponse(frame) => frame.parts(),
            Self::FireAndForget(frame) => frame.parts(),
            Self::RequestStream(frame) => frame.parts(),
            Self::RequestChannel(frame) => frame.parts(),
        }
    }
}

impl From<RequestResponse> for Frame {
    fn from(frame: RequestResponse) -> Self { Self::RequestResponse(frame) }
}

impl From<FireAndForget> for Frame {
    fn from(frame: FireAndForget) -> Self { Self::FireAndForget(frame) }
}

impl From<RequestStream> for Frame {
    fn from(frame: RequestStream) -> Self { Self::RequestStream(frame) }
}

impl From<RequestChannel> for Frame {
    fn from(frame: RequestChannel) -> Self { Self::RequestChannel(frame) }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestResponse(frame) => frame.fmt(f),
            Self::FireAndForget(frame) => frame.fmt(f),
            Self::RequestStream(frame) => frame.fmt(f),
            Self::RequestChannel(frame) => frame.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests;
