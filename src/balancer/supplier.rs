//! Connection factory bound to an outcome estimate.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use async_trait::async_trait;
use futures::{Sink, Stream};

use super::ewma::{Ewma, EwmaConfig};
use crate::metrics::{self, Outcome};

/// Builds connections to an endpoint.
///
/// Timeouts and cancellation of a connection attempt are the connector's
/// responsibility; callers see whatever the connector returns.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connection produced on success.
    type Connection: Send;
    /// Error produced on failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a new connection to `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Self::Connection, Self::Error>;
}

/// Sink for per-call outcomes observed on a connection.
pub trait OutcomeReporter: Send + Sync {
    /// Record one call outcome.
    fn report(&self, success: bool);
}

/// Shared handle to an [`OutcomeReporter`].
pub type ReporterHandle = Arc<dyn OutcomeReporter>;

/// Binds an endpoint and a [`Connector`] to an [`Ewma`] of call outcomes.
///
/// A load balancer keeps one supplier per candidate endpoint, opens
/// connections through [`create`](Self::create), and compares candidates by
/// [`availability`](Self::availability). Successes are recorded as `1.0`
/// and failures as `0.0`.
///
/// # Examples
///
/// ```
/// use rsocket_wire::balancer::{SocketSupplier, TcpConnector};
///
/// let supplier = SocketSupplier::new("tcp://127.0.0.1:7878", TcpConnector::default());
/// assert_eq!(supplier.endpoint(), "tcp://127.0.0.1:7878");
/// // The estimate starts at the configured seed.
/// assert_eq!(supplier.availability(), 1.0);
/// ```
pub struct SocketSupplier<C> {
    endpoint: String,
    connector: C,
    estimator: Arc<Ewma>,
}

impl<C: Connector> SocketSupplier<C> {
    /// Create a supplier using the default [`EwmaConfig`].
    #[must_use]
    pub fn new(endpoint: impl Into<String>, connector: C) -> Self {
        Self::with_config(endpoint, connector, EwmaConfig::default())
    }

    /// Create a supplier whose estimator is built from `config`.
    #[must_use]
    pub fn with_config(endpoint: impl Into<String>, connector: C, config: EwmaConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            connector,
            estimator: Arc::new(Ewma::new(config)),
        }
    }

    /// Open a connection through the connector.
    ///
    /// A success records `1.0` and a failure records `0.0`. The estimator is
    /// not locked while the connector runs, so concurrent
    /// [`availability`](Self::availability) calls are never blocked by a
    /// pending connect.
    ///
    /// # Errors
    ///
    /// Returns the connector's error unchanged.
    pub async fn create(&self) -> Result<WeightedConnection<C::Connection>, C::Error> {
        match self.connector.connect(&self.endpoint).await {
            Ok(connection) => {
                self.estimator.report(true);
                metrics::inc_connect_attempts(Outcome::Success);
                tracing::debug!(endpoint = %self.endpoint, "connected");
                Ok(WeightedConnection::new(connection, self.reporter()))
            }
            Err(error) => {
                self.estimator.report(false);
                metrics::inc_connect_attempts(Outcome::Failure);
                metrics::inc_errors();
                tracing::warn!(endpoint = %self.endpoint, %error, "connect failed");
                Err(error)
            }
        }
    }
}

impl<C> SocketSupplier<C> {
    /// Current clamped estimate in `[0, 1]`.
    ///
    /// Reading an estimate that has gone stale applies the bump described on
    /// [`Ewma::value`] and restamps it.
    #[must_use]
    pub fn availability(&self) -> f64 { self.estimator.value() }

    /// Return the endpoint this supplier connects to.
    #[must_use]
    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// Return the connector.
    #[must_use]
    pub fn connector(&self) -> &C { &self.connector }

    /// Handle for reporting call outcomes into this supplier's estimate.
    #[must_use]
    pub fn reporter(&self) -> ReporterHandle { Arc::clone(&self.estimator) as ReporterHandle }
}

/// Formats as `SocketSupplier{endpoint=.., v=..}`.
///
/// The value comes from [`SocketSupplier::availability`], so formatting a
/// stale supplier applies the stale bump.
impl<C> fmt::Display for SocketSupplier<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SocketSupplier{{endpoint={}, v={:.2}}}",
            self.endpoint,
            self.availability()
        )
    }
}

impl<C> fmt::Debug for SocketSupplier<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketSupplier")
            .field("endpoint", &self.endpoint)
            .field("estimator", &self.estimator)
            .finish_non_exhaustive()
    }
}

/// Connection that feeds call outcomes back to its supplier.
///
/// As a [`Stream`] of `Result`s, every `Ok` item counts as a success and
/// every `Err` as a failure. As a [`Sink`], errors count as failures.
/// Arbitrary futures can be measured with [`observe`](Self::observe).
pub struct WeightedConnection<T> {
    inner: T,
    reporter: ReporterHandle,
}

impl<T> WeightedConnection<T> {
    /// Wrap `inner`, reporting outcomes to `reporter`.
    #[must_use]
    pub fn new(inner: T, reporter: ReporterHandle) -> Self { Self { inner, reporter } }

    /// Return a reference to the wrapped connection.
    #[must_use]
    pub fn get_ref(&self) -> &T { &self.inner }

    /// Return a mutable reference to the wrapped connection.
    ///
    /// Calls made through this reference are not reported.
    pub fn get_mut(&mut self) -> &mut T { &mut self.inner }

    /// Unwrap the connection, detaching it from the supplier.
    #[must_use]
    pub fn into_inner(self) -> T { self.inner }

    /// Record one call outcome.
    pub fn report(&self, success: bool) { self.reporter.report(success); }

    /// Await `call` and report whether it succeeded.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `call`.
    pub async fn observe<F, R, E>(&self, call: F) -> Result<R, E>
    where
        F: Future<Output = Result<R, E>>,
    {
        let result = call.await;
        self.report(result.is_ok());
        result
    }

    fn record<R, E>(&self, result: Result<R, E>) -> Result<R, E> {
        if result.is_err() {
            self.report(false);
        }
        result
    }
}

impl<T: fmt::Debug> fmt::Debug for WeightedConnection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedConnection")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<T, I, E> Stream for WeightedConnection<T>
where
    T: Stream<Item = Result<I, E>> + Unpin,
{
    type Item = Result<I, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = Pin::new(&mut this.inner).poll_next(cx);
        if let Poll::Ready(Some(result)) = &item {
            this.report(result.is_ok());
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.inner.size_hint() }
}

impl<T, Item> Sink<Item> for WeightedConnection<T>
where
    T: Sink<Item> + Unpin,
{
    type Error = T::Error;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner)
            .poll_ready(cx)
            .map(|result| this.record(result))
    }

    fn start_send(self: Pin<&mut Self>, item: Item) -> Result<(), Self::Error> {
        let this = self.get_mut();
        let result = Pin::new(&mut this.inner).start_send(item);
        this.record(result)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner)
            .poll_flush(cx)
            .map(|result| this.record(result))
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner)
            .poll_close(cx)
            .map(|result| this.record(result))
    }
}
