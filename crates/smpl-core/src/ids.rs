//! # smpl-core::ids
//!
//! Provides the monotonic allocator for facility ids.

use smpl_types::id::FacilityId;

/// Hands out facility ids in creation order, starting from 0. Reset by
/// `Simulator::init` along with everything else.
#[derive(Debug, Default)]
pub struct FacilityIdGen {
    next: u64,
}

impl FacilityIdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> FacilityId {
        let id = FacilityId(self.next);
        self.next = self.next.checked_add(1).expect("FacilityId overflow");
        id
    }
}
