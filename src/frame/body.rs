//! Layout shared by every payload-carrying frame.
//!
//! A body is laid out as:
//!
//! ```text
//! [fixed fields: k bytes][metadata length: u24][metadata][data ...]
//! ```
//!
//! `k` comes from [`FrameType::fixed_len`]. The metadata length and block are
//! present iff the header carries [`FrameFlags::METADATA`]. Data has no
//! length prefix and runs to the end of the frame.

use std::{
    borrow::Cow,
    fmt,
    io::{self, Write},
};

use bytes::Bytes;

use super::header::{FrameFlags, FrameHeader, FrameType, HEADER_LEN, StreamId};
use crate::{
    buffer::{ByteBuffer, PoolHandle},
    byte_order::{decode_u24, encode_u24, read_network_u32},
    error::{EncodeError, FrameError, Result},
};

/// Size of the metadata length prefix.
pub const METADATA_LEN_SIZE: usize = 3;

/// Storage behind a frame body.
#[derive(Debug)]
enum BodyBuf {
    /// Outbound body written into a pooled buffer.
    Pooled(ByteBuffer),
    /// Inbound body sliced from a received frame.
    Shared(Bytes),
}

impl BodyBuf {
    fn as_slice(&self) -> &[u8] {
        match self {
            Self::Pooled(buf) => buf.bytes(),
            Self::Shared(bytes) => bytes,
        }
    }
}

/// Header plus body of one frame.
#[derive(Debug)]
pub struct FrameParts {
    header: FrameHeader,
    body: BodyBuf,
}

impl FrameParts {
    /// Build an outbound frame body in a buffer borrowed from `pool`.
    ///
    /// `fixed` is written first, then the metadata block if `metadata` is
    /// non-empty, then `data`. The metadata flag is derived from `metadata`
    /// and overrides whatever the caller passed in `flags`.
    pub(crate) fn build(
        pool: &PoolHandle,
        stream_id: StreamId,
        frame_type: FrameType,
        fixed: &[u8],
        data: &[u8],
        metadata: &[u8],
        mut flags: FrameFlags,
    ) -> Self {
        debug_assert_eq!(fixed.len(), frame_type.fixed_len());
        flags.remove(FrameFlags::METADATA);
        let mut body = ByteBuffer::acquire(pool);
        body.write(fixed);
        if !metadata.is_empty() {
            flags.insert(FrameFlags::METADATA);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "metadata shorter than 2^24 bytes is a caller precondition"
            )]
            body.write_u24(metadata.len() as u32);
            body.write(metadata);
        }
        body.write(data);
        Self {
            header: FrameHeader::new(stream_id, frame_type, flags),
            body: BodyBuf::Pooled(body),
        }
    }

    /// Wrap a received body without copying it.
    pub(crate) fn shared(header: FrameHeader, body: Bytes) -> Self {
        Self {
            header,
            body: BodyBuf::Shared(body),
        }
    }

    /// Return the frame header.
    #[must_use]
    pub fn header(&self) -> &FrameHeader { &self.header }

    /// Return the raw body bytes following the header.
    #[must_use]
    pub fn body(&self) -> &[u8] { self.body.as_slice() }

    fn fixed_len(&self) -> usize { self.header.frame_type().fixed_len() }

    /// Return the fixed fields at the start of the body, clamped to the body
    /// length.
    pub(crate) fn fixed(&self) -> &[u8] {
        let body = self.body();
        &body[..self.fixed_len().min(body.len())]
    }

    /// Read a big-endian `u32` from the fixed fields at `offset`.
    pub(crate) fn fixed_u32(&self, offset: usize) -> Option<u32> {
        let bytes = self.fixed().get(offset..offset + 4)?;
        <[u8; 4]>::try_from(bytes).ok().map(read_network_u32)
    }

    /// Byte range of the metadata block within the body.
    ///
    /// Truncated bodies are clamped rather than rejected so that accessors
    /// never panic on unvalidated input.
    fn metadata_range(&self) -> (usize, usize) {
        let body = self.body();
        let k = self.fixed_len();
        let start = (k + METADATA_LEN_SIZE).min(body.len());
        let declared = body
            .get(k..k + METADATA_LEN_SIZE)
            .and_then(|prefix| <[u8; METADATA_LEN_SIZE]>::try_from(prefix).ok())
            .map_or(0, decode_u24);
        let end = start.saturating_add(declared as usize).min(body.len());
        (start, end)
    }

    fn has_metadata(&self) -> bool { self.header.flags().contains(FrameFlags::METADATA) }

    /// Return the metadata block, or `None` when the metadata flag is clear.
    #[must_use]
    pub fn metadata(&self) -> Option<&[u8]> {
        if !self.has_metadata() {
            return None;
        }
        let (start, end) = self.metadata_range();
        Some(&self.body()[start..end])
    }

    /// Return every byte after the metadata block (or after the fixed fields
    /// when there is no metadata).
    #[must_use]
    pub fn data(&self) -> &[u8] {
        let body = self.body();
        let start = if self.has_metadata() {
            self.metadata_range().1
        } else {
            self.fixed_len().min(body.len())
        };
        &body[start..]
    }

    /// Check that the body holds the frame type's fixed fields.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::IncompleteFrame`] when the body is shorter than
    /// [`FrameType::fixed_len`].
    pub fn validate(&self) -> Result<()> {
        let need = self.fixed_len();
        let have = self.body().len();
        if have < need {
            return Err(FrameError::IncompleteFrame { need, have });
        }
        Ok(())
    }

    /// Number of bytes [`write_to`](Self::write_to) will produce.
    #[must_use]
    pub fn size(&self) -> usize {
        let metadata = self
            .metadata()
            .map_or(0, |metadata| METADATA_LEN_SIZE + metadata.len());
        HEADER_LEN + self.fixed().len() + metadata + self.data().len()
    }

    /// Write the complete frame to `sink`.
    ///
    /// Writes the header, the fixed fields, the metadata block (when the
    /// metadata flag is set) and the data, in that order, returning the total
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if `sink` fails. The error carries the number
    /// of bytes written before the failure.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        sink: &mut W,
    ) -> std::result::Result<usize, EncodeError> {
        let mut written = 0;
        write_segment(sink, &self.header.encode(), &mut written)?;
        write_segment(sink, self.fixed(), &mut written)?;
        if let Some(metadata) = self.metadata() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "metadata views never exceed the 24-bit length they were sliced with"
            )]
            let prefix = encode_u24(metadata.len() as u32);
            write_segment(sink, &prefix, &mut written)?;
            write_segment(sink, metadata, &mut written)?;
        }
        write_segment(sink, self.data(), &mut written)?;
        Ok(written)
    }
}

/// Write all of `buf`, counting accepted bytes into `written`.
fn write_segment<W: Write + ?Sized>(
    sink: &mut W,
    mut buf: &[u8],
    written: &mut usize,
) -> std::result::Result<(), EncodeError> {
    while !buf.is_empty() {
        match sink.write(buf) {
            Ok(0) => {
                return Err(EncodeError {
                    written: *written,
                    source: io::Error::from(io::ErrorKind::WriteZero),
                });
            }
            Ok(n) => {
                *written += n;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => {
                return Err(EncodeError {
                    written: *written,
                    source,
                });
            }
        }
    }
    Ok(())
}

/// Operations common to every payload-carrying frame.
///
/// Implementors only expose their [`FrameParts`]; the encode, size,
/// validation and slicing logic lives in one place and is driven by the
/// frame type's fixed-field length.
pub trait PayloadFrame {
    /// Return the underlying header and body.
    fn parts(&self) -> &FrameParts;

    /// Return the frame header.
    fn header(&self) -> &FrameHeader { self.parts().header() }

    /// Return the stream id.
    fn stream_id(&self) -> StreamId { self.header().stream_id() }

    /// Return the header flags.
    fn flags(&self) -> FrameFlags { self.header().flags() }

    /// Return the metadata block, or `None` if the frame carries none.
    fn metadata(&self) -> Option<&[u8]> { self.parts().metadata() }

    /// Return the data block.
    fn data(&self) -> &[u8] { self.parts().data() }

    /// Return the metadata interpreted as UTF-8, replacing invalid
    /// sequences.
    fn metadata_utf8(&self) -> Option<Cow<'_, str>> {
        self.metadata().map(String::from_utf8_lossy)
    }

    /// Return the data interpreted as UTF-8, replacing invalid sequences.
    fn data_utf8(&self) -> Cow<'_, str> { String::from_utf8_lossy(self.data()) }

    /// Number of bytes [`write_to`](Self::write_to) will produce.
    fn size(&self) -> usize { self.parts().size() }

    /// Check the body holds the fixed fields for this frame type.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::IncompleteFrame`] for a truncated body.
    fn validate(&self) -> Result<()> { self.parts().validate() }

    /// Write the whole frame to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] with the partial byte count if `sink` fails.
    fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> std::result::Result<usize, EncodeError>
    where
        Self: Sized,
    {
        self.parts().write_to(sink)
    }
}

/// Format the fields every frame shares, for `Display` implementations.
pub(crate) fn fmt_payload(parts: &FrameParts, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let metadata = parts
        .metadata()
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    write!(
        f,
        "{},data={},metadata={}",
        parts.header(),
        String::from_utf8_lossy(parts.data()),
        metadata
    )
}
