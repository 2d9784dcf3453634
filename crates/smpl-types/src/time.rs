//! # smpl-types::time
//!
//! Defines the representation of simulated time. Per the reference `smpl`
//! semantics, time is a nonnegative real rather than a fixed-point duration,
//! so this wraps `f64` directly instead of the integer-nanosecond counters a
//! network-delay-modeling engine would want.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// A point in simulated time, monotonically nondecreasing for the lifetime
/// of a `Simulator` run. Never NaN and never negative; both are asserted at
/// construction, not handled as a recoverable error, since they can only
/// arise from a logic bug in the kernel itself (caller-supplied deltas are
/// validated separately by `Simulator::schedule`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimTime(f64);

/// The start of simulated time; what the clock is reset to by `init`.
pub const SIM_EPOCH: SimTime = SimTime(0.0);

impl SimTime {
    /// Constructs a `SimTime`, asserting the invariants that should hold for
    /// any value that ever reaches the event list or the clock.
    pub fn new(value: f64) -> Self {
        debug_assert!(value.is_finite(), "SimTime must be finite, got {value}");
        debug_assert!(value >= 0.0, "SimTime must be nonnegative, got {value}");
        Self(value)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Returns `self + dt`, asserting `dt` is itself a valid nonnegative delta.
    /// Use `Simulator::schedule`'s own validation for caller-supplied deltas;
    /// this is for internal arithmetic once a delta is already known-good.
    pub fn advance(self, dt: f64) -> Self {
        Self::new(self.0 + dt)
    }

    /// The elapsed time since an earlier point, for statistics integrals.
    /// Panics if `earlier` is later than `self`, which would mean the clock
    /// went backwards.
    pub fn since(self, earlier: SimTime) -> f64 {
        let delta = self.0 - earlier.0;
        debug_assert!(delta >= 0.0, "clock went backwards: {} before {}", self.0, earlier.0);
        delta
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;
    fn add(self, dt: f64) -> SimTime {
        self.advance(dt)
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .partial_cmp(&other.0)
            .expect("SimTime values are never NaN")
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for SimTime {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}
