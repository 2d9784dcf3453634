//! # smpl-types::id
//!
//! Defines the identifier type handed back to callers by `facility()`.
//! It is a distinct newtype (rather than a bare `u64`) so a `FacilityId`
//! can never be silently confused with some other caller-side counter.

use std::fmt;

/// A unique identifier for a facility created by `Simulator::facility`.
///
/// Invariant: facility ids are allocated contiguously from 0, in creation
/// order, for the lifetime of a `Simulator` run (reset by `init`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FacilityId(pub u64);

impl FacilityId {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// The raw index into a contiguous, zero-based facility table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "facility#{}", self.0)
    }
}
