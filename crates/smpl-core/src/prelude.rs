//! # smpl-core::prelude
//!
//! A convenience module re-exporting the types a consumer of this crate
//! needs to schedule events and arbitrate facilities, without having to
//! know which module each one lives in.

pub use crate::{
    events::Fired,
    facility::{FacilityStatus, RequestOutcome},
    sim::Simulator,
};

pub use smpl_types::{
    self,
    errors::SimError,
    id::FacilityId,
    time::{SimTime, SIM_EPOCH},
};
