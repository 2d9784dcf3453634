//! # smpl-core::sim
//!
//! This file contains the `Simulator` struct, the kernel's single public
//! entry point. It holds the master clock, the future-event list, the
//! facility table, and the `in_flight` event needed to make `request()`
//! able to replay "the event the caller is currently handling" once a
//! blocked facility frees up. `cause()` is the only operation that ever
//! advances the clock.

use std::fmt;

use crate::{
    events::EventList,
    facility::{Facility, ReleaseOutcome},
    ids::FacilityIdGen,
    prelude::*,
};

/// The discrete-event simulation kernel: future-event list, facility table,
/// clock, and the bookkeeping that ties `request`/`release` back into the
/// event list.
///
/// `Token` is the caller-supplied, opaque handle identifying a simulated
/// process. The kernel only ever compares tokens for equality; it never
/// dereferences or hashes them (per the spec's Design Notes), so a bare
/// `Copy + Eq` bound is all that's required.
pub struct Simulator<Token> {
    name: String,
    clock: SimTime,
    events: EventList<Token>,
    facilities: Vec<Facility<Token>>,
    facility_ids: FacilityIdGen,
    /// The most recently popped event, read by `request()` to learn the
    /// `code` to replay if it must queue the caller. Cleared by `init`.
    in_flight: Option<Fired<Token>>,
}

impl<Token: Copy + Eq + fmt::Debug> Simulator<Token> {
    /// Creates a simulator ready to run, equivalent to calling `init` on a
    /// freshly allocated value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clock: SIM_EPOCH,
            events: EventList::new(),
            facilities: Vec::new(),
            facility_ids: FacilityIdGen::new(),
            in_flight: None,
        }
    }

    /// Resets the clock to 0, empties the event list, discards all
    /// facilities, and clears `in_flight`. A simulator is reusable across
    /// runs by calling this instead of constructing a new one.
    pub fn init(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.clock = SIM_EPOCH;
        self.events = EventList::new();
        self.facilities = Vec::new();
        self.facility_ids = FacilityIdGen::new();
        self.in_flight = None;
        tracing::info!(run = %self.name, "simulator reset");
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current simulated time.
    pub fn time(&self) -> f64 {
        self.clock.as_f64()
    }

    /// Schedules an event to fire at `self.time() + dt`. `dt` must be
    /// nonnegative.
    pub fn schedule(&mut self, code: i64, dt: f64, token: Token) -> Result<(), SimError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::bad_arg(format!(
                "time-to-event must be a finite, nonnegative real, got {dt}"
            )));
        }
        let time = self.clock.advance(dt);
        tracing::trace!(code, ?token, %time, "event scheduled");
        self.events.insert(code, token, time);
        Ok(())
    }

    /// Advances the clock to the earliest pending event, removes it from
    /// the event list, and returns its `(code, token)`. Returns `None` if
    /// the event list has nothing left to fire — the clock is left
    /// unchanged in that case.
    pub fn cause(&mut self) -> Option<Fired<Token>> {
        let (time, fired) = self.events.pop_min()?;
        assert!(time >= self.clock, "simulated time went backwards");
        self.clock = time;
        self.in_flight = Some(fired);
        tracing::debug!(code = fired.code, token = ?fired.token, %time, "event caused");
        Some(fired)
    }

    /// Creates a new facility with `server_count` servers, returning its
    /// id. `server_count` must be at least 1.
    pub fn facility(&mut self, name: impl Into<String>, server_count: usize) -> Result<FacilityId, SimError> {
        if server_count == 0 {
            return Err(SimError::bad_arg("facility must have at least one server"));
        }
        let name = name.into();
        let id = self.facility_ids.next_id();
        tracing::debug!(%id, %name, server_count, "facility created");
        self.facilities.push(Facility::new(name, server_count, self.clock));
        Ok(id)
    }

    /// Reads a facility's current occupancy without mutating anything.
    pub fn status(&self, id: FacilityId) -> Result<FacilityStatus, SimError> {
        self.facilities
            .get(id.index())
            .map(Facility::status)
            .ok_or(SimError::NoSuchFacility(id))
    }

    /// Time-weighted integral of the number of busy servers on `id`, from
    /// its creation to the current clock.
    pub fn busy_time_integral(&self, id: FacilityId) -> Result<f64, SimError> {
        self.facilities
            .get(id.index())
            .map(Facility::busy_time_integral)
            .ok_or(SimError::NoSuchFacility(id))
    }

    /// Time-weighted integral of the queue length on `id`, from its
    /// creation to the current clock.
    pub fn queue_length_integral(&self, id: FacilityId) -> Result<f64, SimError> {
        self.facilities
            .get(id.index())
            .map(Facility::queue_length_integral)
            .ok_or(SimError::NoSuchFacility(id))
    }

    /// §4.3: reserves an idle server for `token`, or queues it behind the
    /// facility's other waiters in priority order.
    ///
    /// If no server is idle and no event is currently in flight (i.e. this
    /// was called outside a `cause()`-driven dispatch), there is no
    /// `(code, token)` pair to replay once the facility frees up, so this
    /// fails with `RequestOutsideDispatch` rather than silently queueing
    /// something that can never fire again.
    pub fn request(&mut self, id: FacilityId, token: Token, priority: i64) -> Result<RequestOutcome, SimError> {
        let now = self.clock;
        let in_flight_code = self.in_flight.map(|fired| fired.code);

        let facility = self
            .facilities
            .get_mut(id.index())
            .ok_or(SimError::NoSuchFacility(id))?;

        let would_queue = !facility.holds(token) && facility.status().idle_servers == 0;
        if would_queue && in_flight_code.is_none() {
            return Err(SimError::RequestOutsideDispatch(id));
        }

        // Unused when a server is idle (RequestOutcome::Reserved doesn't
        // read it); the dispatch-context check above guarantees it's
        // `Some` whenever the QUEUED branch is actually taken.
        let code = in_flight_code.unwrap_or_default();
        let outcome = facility.request(token, priority, code, now);
        tracing::debug!(%id, ?token, priority, ?outcome, "facility request");
        Ok(outcome)
    }

    /// §4.4: frees the server `token` holds on facility `id`. If a waiter
    /// is queued, it is atomically promoted into the freed slot and its
    /// pending event is re-scheduled to fire at the current clock, ordered
    /// after any events already queued for this instant (invariant 2: a
    /// freshly-inserted event with the current `insert_seq` always sorts
    /// after earlier insertions at the same time).
    pub fn release(&mut self, id: FacilityId, token: Token) -> Result<(), SimError> {
        let now = self.clock;
        let facility = self
            .facilities
            .get_mut(id.index())
            .ok_or(SimError::NoSuchFacility(id))?;

        match facility.release(token, now) {
            ReleaseOutcome::NotHeld => Err(SimError::NotHeld { facility: id }),
            ReleaseOutcome::Released { promoted } => {
                if let Some(promoted) = promoted {
                    tracing::warn!(%id, token = ?promoted.token, "waiter promoted, re-firing at current clock");
                    self.events.insert(promoted.code, promoted.token, now);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_resets_everything() {
        let mut sim: Simulator<&'static str> = Simulator::new("run-a");
        sim.schedule(1, 1.0, "x").unwrap();
        let id = sim.facility("F", 1).unwrap();
        sim.request(id, "y", 0).unwrap_err(); // outside dispatch, nothing reserved

        sim.init("run-b");
        assert_eq!(sim.name(), "run-b");
        assert_eq!(sim.time(), 0.0);
        assert!(sim.cause().is_none());
        assert!(matches!(sim.status(id), Err(SimError::NoSuchFacility(_))));
    }

    #[test]
    fn empty_event_list_causes_nothing() {
        let mut sim: Simulator<()> = Simulator::new("run");
        assert!(sim.cause().is_none());
        sim.schedule(1, 0.0, ()).unwrap();
        assert!(sim.cause().is_some());
        assert!(sim.cause().is_none());
    }

    #[test]
    fn negative_dt_is_rejected() {
        let mut sim: Simulator<()> = Simulator::new("run");
        assert!(matches!(sim.schedule(1, -1.0, ()), Err(SimError::BadArg { .. })));
    }

    #[test]
    fn zero_server_facility_is_rejected() {
        let mut sim: Simulator<()> = Simulator::new("run");
        assert!(matches!(sim.facility("F", 0), Err(SimError::BadArg { .. })));
    }

    #[test]
    fn request_outside_dispatch_fails_only_when_it_would_queue() {
        let mut sim: Simulator<&'static str> = Simulator::new("run");
        let id = sim.facility("F", 1).unwrap();
        // Idle server available: fine even with no in-flight event.
        assert_eq!(sim.request(id, "t1", 0).unwrap(), RequestOutcome::Reserved);
        // Now the facility is full; requesting again outside dispatch
        // would have to queue, which needs an in-flight event to replay.
        assert!(matches!(
            sim.request(id, "t2", 0),
            Err(SimError::RequestOutsideDispatch(_))
        ));
    }
}
