//! # smpl-types::errors
//!
//! Defines the error type returned by the kernel's public operations.
//! Every variant carries the data needed to format a useful diagnostic
//! without a second lookup against the simulator's state.

use crate::id::FacilityId;
use thiserror::Error;

/// Errors surfaced synchronously by `Simulator`'s public operations.
///
/// `NoSuchPending` (invariant 5 of the data model) has no variant here: this
/// kernel never places a pending retry event in the event list (the
/// "preferred" design from the spec's own Design Notes), so there is no
/// lookup that can fail that way. See `DESIGN.md` for the rationale.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The caller violated an input precondition: a negative time-to-event,
    /// or a facility created with zero servers.
    #[error("bad argument: {reason}")]
    BadArg { reason: String },

    /// `request`, `release`, or `status` was called with an id that no
    /// `facility()` call ever returned (or one from a run since discarded
    /// by `init`).
    #[error("no such facility: {0}")]
    NoSuchFacility(FacilityId),

    /// `release` was called for a (facility, token) pair where the token
    /// does not currently hold a server on that facility.
    #[error("release() called on facility {facility} for a token that does not hold a server there")]
    NotHeld { facility: FacilityId },

    /// `request` would return `QUEUED`, but no event is currently in flight
    /// (the call happened outside a `cause()`-driven dispatch), so there is
    /// no `(code, token)` pair to replay once the facility frees up.
    #[error("request() on facility {0} would queue, but no event is in flight (called outside dispatch)")]
    RequestOutsideDispatch(FacilityId),
}

impl SimError {
    pub fn bad_arg(reason: impl Into<String>) -> Self {
        SimError::BadArg { reason: reason.into() }
    }
}
