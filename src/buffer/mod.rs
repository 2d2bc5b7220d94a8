//! Pooled, growable byte buffers used as frame bodies.
//!
//! Outbound frames write their body into a [`ByteBuffer`] acquired from a
//! [`BufferPool`]. The frame owns the buffer exclusively until it is dropped,
//! at which point the storage is cleared and handed back to the pool. Release
//! happens on every exit path, including encode failures, because it is tied
//! to `Drop` rather than to a successful send.

pub mod pool;

use std::{fmt, mem};

use bytes::{BufMut, BytesMut};
pub use pool::{BufferPool, PoolConfig, PoolHandle, SharedBufferPool, global_pool};

use crate::byte_order::{encode_u24, write_network_u32};

/// Append-only byte buffer borrowed from a [`BufferPool`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use rsocket_wire::buffer::{ByteBuffer, PoolHandle, SharedBufferPool};
///
/// let pool: PoolHandle = Arc::new(SharedBufferPool::default());
/// let mut buf = ByteBuffer::acquire(&pool);
/// buf.write_u24(5);
/// buf.write(b"hello");
/// assert_eq!(buf.bytes(), b"\x00\x00\x05hello");
/// ```
pub struct ByteBuffer {
    buf: BytesMut,
    pool: PoolHandle,
}

impl ByteBuffer {
    /// Borrow an empty buffer from `pool`.
    #[must_use]
    pub fn acquire(pool: &PoolHandle) -> Self {
        Self {
            buf: pool.acquire(),
            pool: PoolHandle::clone(pool),
        }
    }

    /// Append `bytes` to the buffer.
    pub fn write(&mut self, bytes: &[u8]) { self.buf.extend_from_slice(bytes); }

    /// Append a single byte.
    pub fn write_byte(&mut self, byte: u8) { self.buf.put_u8(byte); }

    /// Append the low 24 bits of `value` in network byte order.
    ///
    /// Values above [`U24_MAX`](crate::byte_order::U24_MAX) are truncated.
    pub fn write_u24(&mut self, value: u32) { self.buf.put_slice(&encode_u24(value)); }

    /// Append `value` in network byte order.
    pub fn write_u32(&mut self, value: u32) { self.buf.put_slice(&write_network_u32(value)); }

    /// View the bytes written so far.
    #[must_use]
    pub fn bytes(&self) -> &[u8] { &self.buf }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Report whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }
}

impl Drop for ByteBuffer {
    fn drop(&mut self) { self.pool.release(mem::take(&mut self.buf)); }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish_non_exhaustive()
    }
}
