//! Time-decayed moving average of a bounded outcome signal.
//!
//! Each observation is blended into the running value with a weight that
//! depends on how long ago the previous observation arrived:
//!
//! ```text
//! w     = exp(-elapsed / tau)
//! value = value * w + x * (1 - w)
//! ```
//!
//! so a long silence lets a single new sample dominate, while a burst of
//! samples at the same instant leaves the value untouched. An estimate that
//! has not been refreshed for longer than `tau` is pushed towards `1` when
//! read.

#[cfg(not(loom))]
use std::sync::Mutex;
use std::{fmt, sync::PoisonError, time::Duration};

#[cfg(loom)]
use loom::sync::Mutex;
use tokio::time::Instant;

use super::supplier::OutcomeReporter;

/// Values within this distance of `0` or `1` are reported as exactly `0` or
/// `1`.
pub const EPSILON: f64 = 1e-4;

/// Amount added to a stale estimate when it is read.
pub const STALE_PENALTY: f64 = 0.5;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Configuration for [`Ewma`].
///
/// `events` observations spread evenly over `window` decay the weight of
/// older history to `1 / events`.
///
/// # Default Values
/// - `events`: 5
/// - `window`: 1 second
/// - `seed`: 1.0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EwmaConfig {
    /// Number of events expected within `window`.
    pub events: u32,
    /// Period over which `events` observations are expected.
    pub window: Duration,
    /// Initial value of the estimate.
    pub seed: f64,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            events: 5,
            window: Duration::from_secs(1),
            seed: 1.0,
        }
    }
}

impl EwmaConfig {
    /// Clamp the configuration to values that yield a finite, positive `tau`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use rsocket_wire::balancer::EwmaConfig;
    ///
    /// let cfg = EwmaConfig {
    ///     events: 1,
    ///     window: Duration::ZERO,
    ///     seed: 3.0,
    /// }
    /// .normalized();
    /// assert_eq!(cfg.events, 2);
    /// assert_eq!(cfg.window, Duration::from_micros(1));
    /// assert!((cfg.seed - 1.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.events = self.events.max(2);
        self.window = self.window.max(Duration::from_micros(1));
        self.seed = if self.seed.is_nan() {
            1.0
        } else {
            self.seed.clamp(0.0, 1.0)
        };
        self
    }

    /// Decay time constant in microseconds: `window / ln(events)`.
    #[must_use]
    pub fn tau_micros(&self) -> f64 {
        let cfg = self.normalized();
        cfg.window.as_secs_f64() * MICROS_PER_SECOND / f64::from(cfg.events).ln()
    }
}

#[derive(Clone, Copy, Debug)]
struct EwmaState {
    value: f64,
    stamp: Instant,
}

/// Exponentially weighted moving average over `[0, 1]`.
///
/// All reads and writes go through one mutex, so a reader sees either the
/// value before an update or after it. [`value`](Self::value) performs its
/// staleness check and any resulting bump within a single critical section.
///
/// # Examples
///
/// ```
/// use rsocket_wire::balancer::{Ewma, EwmaConfig};
///
/// let ewma = Ewma::new(EwmaConfig {
///     seed: 0.0,
///     ..EwmaConfig::default()
/// });
/// ewma.insert(0.0);
/// assert_eq!(ewma.value(), 0.0);
/// ```
pub struct Ewma {
    tau: f64,
    state: Mutex<EwmaState>,
}

impl Ewma {
    /// Create an estimator holding `config.seed`, stamped now.
    #[must_use]
    pub fn new(config: EwmaConfig) -> Self { Self::new_at(config, Instant::now()) }

    pub(crate) fn new_at(config: EwmaConfig, now: Instant) -> Self {
        let config = config.normalized();
        Self {
            tau: config.tau_micros(),
            state: Mutex::new(EwmaState {
                value: config.seed,
                stamp: now,
            }),
        }
    }

    /// Return the decay time constant.
    #[must_use]
    pub fn tau(&self) -> Duration { Duration::from_secs_f64(self.tau / MICROS_PER_SECOND) }

    /// Blend observation `x` into the estimate. `x` is clamped into `[0, 1]`.
    pub fn insert(&self, x: f64) { self.insert_at(x, Instant::now()); }

    pub(crate) fn insert_at(&self, x: f64, now: Instant) {
        let x = x.clamp(0.0, 1.0);
        let mut state = self.lock();
        let elapsed = micros_between(state.stamp, now);
        let w = if elapsed <= 0.0 {
            1.0
        } else {
            (-elapsed / self.tau).exp()
        };
        state.value = (state.value * w + x * (1.0 - w)).clamp(0.0, 1.0);
        state.stamp = now;
    }

    /// Replace the estimate with `x`, clamped into `[0, 1]`.
    pub fn reset(&self, x: f64) { self.reset_at(x, Instant::now()); }

    pub(crate) fn reset_at(&self, x: f64, now: Instant) {
        let mut state = self.lock();
        state.value = x.clamp(0.0, 1.0);
        state.stamp = now;
    }

    /// Return the current estimate.
    ///
    /// If nothing has touched the estimate for longer than `tau` it is first
    /// raised by [`STALE_PENALTY`] (capped at `1`) and restamped. The result
    /// is snapped to `0` or `1` when within [`EPSILON`] of either bound.
    #[must_use]
    pub fn value(&self) -> f64 { self.value_at(Instant::now()) }

    pub(crate) fn value_at(&self, now: Instant) -> f64 {
        let (value, stale) = {
            let mut state = self.lock();
            let stale = micros_between(state.stamp, now) > self.tau;
            let previous = state.value;
            if stale {
                state.value = (state.value + STALE_PENALTY).min(1.0);
                state.stamp = now;
            }
            (state.value, stale.then_some(previous))
        };
        if let Some(previous) = stale {
            tracing::debug!(previous, value, "raised stale estimate");
        }
        snap(value)
    }

    fn lock(&self) -> impl std::ops::DerefMut<Target = EwmaState> + '_ {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutcomeReporter for Ewma {
    /// Successes count as `1.0` and failures as `0.0`.
    fn report(&self, success: bool) { self.insert(if success { 1.0 } else { 0.0 }); }
}

impl fmt::Debug for Ewma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.lock();
        f.debug_struct("Ewma")
            .field("tau", &self.tau())
            .field("value", &state.value)
            .finish_non_exhaustive()
    }
}

fn micros_between(earlier: Instant, later: Instant) -> f64 {
    later.saturating_duration_since(earlier).as_secs_f64() * MICROS_PER_SECOND
}

fn snap(value: f64) -> f64 {
    if value < EPSILON {
        0.0
    } else if value > 1.0 - EPSILON {
        1.0
    } else {
        value
    }
}
