//! Buffer pool capability and the default shared implementation.

#[cfg(not(loom))]
use std::sync::Mutex;
use std::{
    fmt,
    sync::{Arc, OnceLock, PoisonError},
};

use bytes::BytesMut;
#[cfg(loom)]
use loom::sync::Mutex;

/// Source of reusable frame buffers.
///
/// Implementations must tolerate concurrent callers: frames for different
/// streams and connections acquire and release buffers independently.
pub trait BufferPool: Send + Sync {
    /// Hand out an empty buffer.
    fn acquire(&self) -> BytesMut;

    /// Take back a buffer the caller no longer needs. The contents are
    /// discarded.
    fn release(&self, buf: BytesMut);
}

/// Shared handle to a [`BufferPool`].
pub type PoolHandle = Arc<dyn BufferPool>;

/// Sizing for [`SharedBufferPool`].
///
/// # Default Values
/// - `initial_capacity`: 256 bytes
/// - `max_retained`: 64 buffers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Capacity reserved for freshly allocated buffers.
    pub initial_capacity: usize,
    /// Upper bound on idle buffers kept for reuse. Zero disables reuse.
    pub max_retained: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            max_retained: 64,
        }
    }
}

/// Mutex-guarded free list of [`BytesMut`] buffers.
///
/// # Examples
///
/// ```
/// use rsocket_wire::buffer::{BufferPool, SharedBufferPool};
///
/// let pool = SharedBufferPool::default();
/// let mut buf = pool.acquire();
/// buf.extend_from_slice(b"frame");
/// pool.release(buf);
/// assert_eq!(pool.retained(), 1);
/// assert!(pool.acquire().is_empty());
/// ```
pub struct SharedBufferPool {
    free: Mutex<Vec<BytesMut>>,
    config: PoolConfig,
}

impl SharedBufferPool {
    /// Create an empty pool using `config`.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(config.max_retained)),
            config,
        }
    }

    /// Number of idle buffers currently held for reuse.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Return the configuration this pool was built with.
    #[must_use]
    pub fn config(&self) -> PoolConfig { self.config }
}

impl fmt::Debug for SharedBufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBufferPool")
            .field("retained", &self.retained())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for SharedBufferPool {
    fn default() -> Self { Self::new(PoolConfig::default()) }
}

impl BufferPool for SharedBufferPool {
    fn acquire(&self) -> BytesMut {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        reused.unwrap_or_else(|| BytesMut::with_capacity(self.config.initial_capacity))
    }

    fn release(&self, mut buf: BytesMut) {
        buf.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.config.max_retained {
            free.push(buf);
        }
    }
}

/// Process-wide pool used by the frame constructors that take no explicit
/// pool. Created on first use and never torn down.
#[must_use]
pub fn global_pool() -> PoolHandle {
    static GLOBAL: OnceLock<PoolHandle> = OnceLock::new();
    PoolHandle::clone(GLOBAL.get_or_init(|| Arc::new(SharedBufferPool::default())))
}
