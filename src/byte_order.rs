//! Helpers for explicit network byte-order conversions.
//!
//! These helpers keep Clippy expectations scoped to the conversion points so
//! frame code can remain explicit about wire endianness without repeating
//! lint annotations. The 24-bit helpers back the metadata and frame length
//! prefixes, which have no native integer type.

/// Largest value representable by a 24-bit length prefix.
pub const U24_MAX: u32 = 0x00FF_FFFF;

/// Serialise a `u16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use rsocket_wire::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x1234), [0x12, 0x34]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use rsocket_wire::byte_order::read_network_u16;
///
/// assert_eq!(read_network_u16([0x12, 0x34]), 0x1234);
/// ```
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u16::from_be_bytes(bytes)
}

/// Serialise the low 24 bits of `value` in network byte order.
///
/// Callers must ensure `value <= U24_MAX`; higher bits are discarded
/// without any check.
///
/// # Examples
///
/// ```
/// use rsocket_wire::byte_order::encode_u24;
///
/// assert_eq!(encode_u24(0x12_3456), [0x12, 0x34, 0x56]);
/// assert_eq!(encode_u24(0x0100_0001), [0x00, 0x00, 0x01]);
/// ```
#[must_use]
pub fn encode_u24(value: u32) -> [u8; 3] {
    let [_, hi, mid, lo] = write_network_u32(value);
    [hi, mid, lo]
}

/// Parse a network-order 24-bit unsigned integer.
///
/// # Examples
///
/// ```
/// use rsocket_wire::byte_order::decode_u24;
///
/// assert_eq!(decode_u24([0x12, 0x34, 0x56]), 0x12_3456);
/// ```
#[must_use]
pub fn decode_u24(bytes: [u8; 3]) -> u32 {
    let [hi, mid, lo] = bytes;
    read_network_u32([0, hi, mid, lo])
}

/// Serialise a `u32` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use rsocket_wire::byte_order::write_network_u32;
///
/// assert_eq!(write_network_u32(0x1234_5678), [0x12, 0x34, 0x56, 0x78]);
/// ```
#[must_use]
pub fn write_network_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use rsocket_wire::byte_order::read_network_u32;
///
/// assert_eq!(read_network_u32([0x12, 0x34, 0x56, 0x78]), 0x1234_5678);
/// ```
#[must_use]
pub fn read_network_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u32::from_be_bytes(bytes)
}
