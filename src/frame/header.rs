//! Fixed-size frame header shared by every frame type.
//!
//! Wire layout (`HEADER_LEN` bytes):
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0..4  | stream id, big-endian, bit 31 reserved (always 0) |
//! | 4..6  | big-endian `u16`: frame type in the top 6 bits, flags in the low 10 |

use std::{fmt, ops};

use derive_more::{Display, Into};

use crate::{
    byte_order::{read_network_u16, read_network_u32, write_network_u16, write_network_u32},
    error::{FrameError, Result},
};

/// Length in bytes of every frame header.
pub const HEADER_LEN: usize = 6;

const STREAM_ID_MASK: u32 = 0x7FFF_FFFF;
const FRAME_TYPE_SHIFT: u16 = 10;
const FLAGS_MASK: u16 = 0x03FF;

/// Identifier multiplexing logical streams over one connection.
///
/// The caller's value is kept as given. Only the low 31 bits reach the wire:
/// [`FrameHeader::encode`] writes the reserved top bit as `0`. Stream `0`
/// addresses the connection itself.
///
/// # Examples
///
/// ```
/// use rsocket_wire::frame::StreamId;
/// let id = StreamId::new(7);
/// assert_eq!(id.get(), 7);
/// assert_eq!(StreamId::new(0x8000_0001).get(), 0x8000_0001);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Into)]
#[display("{_0}")]
pub struct StreamId(u32);

impl StreamId {
    /// Stream id reserved for connection-level frames.
    pub const CONNECTION: Self = Self(0);

    /// Create a stream id.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the numeric identifier.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Report whether this id addresses the connection rather than a stream.
    #[must_use]
    pub const fn is_connection(self) -> bool { self.0 == 0 }
}

impl From<u32> for StreamId {
    fn from(value: u32) -> Self { Self::new(value) }
}

/// Frame types handled by this crate.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Single request expecting a single response.
    RequestResponse = 0x04,
    /// Single request expecting no response.
    RequestFnf = 0x05,
    /// Single request expecting a stream of responses.
    RequestStream = 0x06,
    /// Bidirectional stream opened with an initial credit.
    RequestChannel = 0x07,
}

impl FrameType {
    /// Return the on-wire type code.
    #[must_use]
    pub const fn code(self) -> u8 { self as u8 }

    /// Length of the fixed fields at the start of this type's body.
    ///
    /// Streaming requests carry a 4-byte `initialRequestN`; the others carry
    /// no fixed fields.
    #[must_use]
    pub const fn fixed_len(self) -> usize {
        match self {
            Self::RequestResponse | Self::RequestFnf => 0,
            Self::RequestStream | Self::RequestChannel => 4,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::RequestResponse => "REQUEST_RESPONSE",
            Self::RequestFnf => "REQUEST_FNF",
            Self::RequestStream => "REQUEST_STREAM",
            Self::RequestChannel => "REQUEST_CHANNEL",
        }
    }
}

impl TryFrom<u8> for FrameType {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x04 => Ok(Self::RequestResponse),
            0x05 => Ok(Self::RequestFnf),
            0x06 => Ok(Self::RequestStream),
            0x07 => Ok(Self::RequestChannel),
            other => Err(FrameError::UnknownFrameType(other)),
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Ten-bit flag field carried in every header.
///
/// # Examples
///
/// ```
/// use rsocket_wire::frame::FrameFlags;
/// let flags = FrameFlags::METADATA | FrameFlags::FOLLOWS;
/// assert!(flags.contains(FrameFlags::METADATA));
/// assert!(!flags.contains(FrameFlags::COMPLETE));
/// assert_eq!(flags.bits(), 0x180);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrameFlags(u16);

impl FrameFlags {
    /// Receiver may ignore the frame if it does not understand it.
    pub const IGNORE: Self = Self(0x200);
    /// A length-prefixed metadata block precedes the data.
    pub const METADATA: Self = Self(0x100);
    /// More fragments of this frame follow.
    pub const FOLLOWS: Self = Self(0x80);
    /// Stream completion.
    pub const COMPLETE: Self = Self(0x40);
    /// Frame carries a payload element.
    pub const NEXT: Self = Self(0x20);

    /// No flags set.
    #[must_use]
    pub const fn empty() -> Self { Self(0) }

    /// Build flags from raw bits, dropping anything outside the 10-bit field.
    #[must_use]
    pub const fn from_bits_truncate(bits: u16) -> Self { Self(bits & FLAGS_MASK) }

    /// Return the raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u16 { self.0 }

    /// Report whether every bit in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    /// Set every bit in `other`.
    pub fn insert(&mut self, other: Self) { self.0 |= other.0; }

    /// Clear every bit in `other`.
    pub fn remove(&mut self, other: Self) { self.0 &= !other.0; }
}

impl ops::BitOr for FrameFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl ops::BitOrAssign for FrameFlags {
    fn bitor_assign(&mut self, rhs: Self) { self.insert(rhs); }
}

impl fmt::Debug for FrameFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(FrameFlags, &str); 5] = [
            (FrameFlags::IGNORE, "I"),
            (FrameFlags::METADATA, "M"),
            (FrameFlags::FOLLOWS, "F"),
            (FrameFlags::COMPLETE, "C"),
            (FrameFlags::NEXT, "N"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&set.join("|"))
        }
    }
}

impl fmt::Display for FrameFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

/// Immutable header prefix of a frame.
///
/// # Examples
///
/// ```
/// use rsocket_wire::frame::{FrameFlags, FrameHeader, FrameType, StreamId};
///
/// let header = FrameHeader::new(StreamId::new(1), FrameType::RequestFnf, FrameFlags::METADATA);
/// let bytes = header.encode();
/// assert_eq!(bytes, [0, 0, 0, 1, 0x15, 0x00]);
/// assert_eq!(FrameHeader::decode(&bytes).expect("valid header"), header);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    stream_id: StreamId,
    frame_type: FrameType,
    flags: FrameFlags,
}

impl FrameHeader {
    /// Create a header.
    #[must_use]
    pub const fn new(stream_id: StreamId, frame_type: FrameType, flags: FrameFlags) -> Self {
        Self {
            stream_id,
            frame_type,
            flags,
        }
    }

    /// Return the stream this frame belongs to.
    #[must_use]
    pub const fn stream_id(&self) -> StreamId { self.stream_id }

    /// Return the frame type.
    #[must_use]
    pub const fn frame_type(&self) -> FrameType { self.frame_type }

    /// Return the flag set.
    #[must_use]
    pub const fn flags(&self) -> FrameFlags { self.flags }

    /// Serialise the header into its wire representation.
    ///
    /// The reserved top bit of the stream id is written as `0`.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let [s0, s1, s2, s3] = write_network_u32(self.stream_id.get() & STREAM_ID_MASK);
        let type_and_flags =
            (u16::from(self.frame_type.code()) << FRAME_TYPE_SHIFT) | self.flags.bits();
        let [t0, t1] = write_network_u16(type_and_flags);
        [s0, s1, s2, s3, t0, t1]
    }

    /// Parse a header from the first [`HEADER_LEN`] bytes of `src`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::IncompleteHeader`] if `src` is too short and
    /// [`FrameError::UnknownFrameType`] if the type code is not supported.
    pub fn decode(src: &[u8]) -> Result<Self> {
        let (stream_bytes, type_bytes) = match src.get(..HEADER_LEN) {
            Some([s0, s1, s2, s3, t0, t1]) => ([*s0, *s1, *s2, *s3], [*t0, *t1]),
            _ => {
                return Err(FrameError::IncompleteHeader {
                    have: src.len(),
                    need: HEADER_LEN,
                });
            }
        };
        let type_and_flags = read_network_u16(type_bytes);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shifting a u16 right by 10 leaves at most 6 significant bits"
        )]
        let code = (type_and_flags >> FRAME_TYPE_SHIFT) as u8;
        Ok(Self {
            stream_id: StreamId::new(read_network_u32(stream_bytes) & STREAM_ID_MASK),
            frame_type: FrameType::try_from(code)?,
            flags: FrameFlags::from_bits_truncate(type_and_flags),
        })
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stream_id={},type={},flags={}",
            self.stream_id, self.frame_type, self.flags
        )
    }
}
