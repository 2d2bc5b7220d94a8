//! Client-side load-balancing primitives.
//!
//! A [`SocketSupplier`] pairs an endpoint with a [`Connector`] and an
//! [`Ewma`] of the endpoint's recent call outcomes. Connection attempts made
//! through the supplier, and call outcomes later reported by the
//! [`WeightedConnection`] it hands out, feed that estimate: a success is
//! recorded as `1.0` and a failure as `0.0`. A balancer polls
//! [`SocketSupplier::availability`] on each candidate; selection itself is
//! left to the caller.
//!
//! Scores live in `[0, 1]`. Endpoints that have not been heard from for a
//! while drift towards `1`.

pub mod ewma;
pub mod supplier;
pub mod tcp;

pub use ewma::{EPSILON, Ewma, EwmaConfig, STALE_PENALTY};
pub use supplier::{Connector, OutcomeReporter, ReporterHandle, SocketSupplier, WeightedConnection};
pub use tcp::{TCP_SCHEME, TcpConnectError, TcpConnector};
