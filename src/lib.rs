#![doc(html_root_url = "https://docs.rs/rsocket-wire/latest")]
//! Public API for the `rsocket-wire` library.
//!
//! This crate provides the wire-level building blocks of an RSocket client:
//! a zero-copy frame model with exact size accounting, a length-prefixed
//! stream codec, pooled frame buffers, and a time-decayed outcome estimator
//! that scores candidate endpoints for load balancing.

pub mod balancer;
pub mod buffer;
pub mod byte_order;
pub mod codec;
pub mod error;
pub mod frame;
pub mod metrics;

pub use balancer::{Connector, Ewma, EwmaConfig, SocketSupplier, TcpConnector, WeightedConnection};
pub use buffer::{BufferPool, ByteBuffer, PoolConfig, SharedBufferPool};
pub use codec::FrameCodec;
pub use error::{EncodeError, FrameError};
pub use frame::{
    FireAndForget,
    Frame,
    FrameFlags,
    FrameHeader,
    FrameType,
    PayloadFrame,
    RequestChannel,
    RequestResponse,
    RequestStream,
    StreamId,
};
pub use crate::metrics::Direction;
