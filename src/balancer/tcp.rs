//! TCP [`Connector`] producing framed RSocket connections.

use std::{io, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use super::supplier::Connector;
use crate::codec::{FrameCodec, MAX_FRAME_LENGTH};

/// URI scheme accepted by [`TcpConnector`].
pub const TCP_SCHEME: &str = "tcp://";

/// Errors raised while opening a TCP connection.
#[derive(Debug, Error)]
pub enum TcpConnectError {
    /// The endpoint is not of the form `tcp://host:port`.
    #[error("invalid endpoint {endpoint:?}: expected tcp://host:port")]
    InvalidEndpoint {
        /// Endpoint as supplied.
        endpoint: String,
    },

    /// Resolving or connecting failed.
    #[error("failed to connect to {endpoint}: {source}")]
    Io {
        /// Endpoint being connected.
        endpoint: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// The connect timeout elapsed first.
    #[error("connection to {endpoint} timed out after {timeout:?}")]
    Timeout {
        /// Endpoint being connected.
        endpoint: String,
        /// Configured timeout.
        timeout: Duration,
    },
}

/// Opens TCP connections framed with [`FrameCodec`].
///
/// # Default Values
/// - `nodelay`: `true`
/// - `connect_timeout`: none
/// - `max_frame_length`: [`MAX_FRAME_LENGTH`]
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use rsocket_wire::balancer::TcpConnector;
///
/// let connector = TcpConnector::default()
///     .connect_timeout(Duration::from_secs(2))
///     .max_frame_length(64 * 1024);
/// assert_eq!(connector.timeout(), Some(Duration::from_secs(2)));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TcpConnector {
    nodelay: bool,
    connect_timeout: Option<Duration>,
    max_frame_length: usize,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self {
            nodelay: true,
            connect_timeout: None,
            max_frame_length: MAX_FRAME_LENGTH,
        }
    }
}

impl TcpConnector {
    /// Set `TCP_NODELAY` on new sockets.
    #[must_use]
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Abandon connection attempts that take longer than `timeout`.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Limit the size of frames accepted and sent on new connections.
    #[must_use]
    pub fn max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// Return the configured connect timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> { self.connect_timeout }
}

/// Strip the scheme from `endpoint`, leaving `host:port`.
fn socket_address(endpoint: &str) -> Result<&str, TcpConnectError> {
    let invalid = || TcpConnectError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
    };
    let address = endpoint.strip_prefix(TCP_SCHEME).ok_or_else(invalid)?;
    match address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(address),
        _ => Err(invalid()),
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Connection = Framed<TcpStream, FrameCodec>;
    type Error = TcpConnectError;

    async fn connect(&self, endpoint: &str) -> Result<Self::Connection, Self::Error> {
        let address = socket_address(endpoint)?;
        let io_error = |source: io::Error| TcpConnectError::Io {
            endpoint: endpoint.to_owned(),
            source,
        };
        let attempt = TcpStream::connect(address);
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, attempt).await.map_err(|_| {
                TcpConnectError::Timeout {
                    endpoint: endpoint.to_owned(),
                    timeout,
                }
            })?,
            None => attempt.await,
        }
        .map_err(io_error)?;
        stream.set_nodelay(self.nodelay).map_err(io_error)?;
        Ok(Framed::new(stream, FrameCodec::new(self.max_frame_length)))
    }
}
