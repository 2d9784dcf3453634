//! # smpl-core::facility
//!
//! Defines `Facility`, a multi-server semaphore with priority queueing, and
//! the statistics it accumulates. This is the arbitration half of the
//! request/release protocol (§4.3, §4.4 of the spec); the other half —
//! reaching into and re-injecting into the event list — lives in
//! `Simulator`, which is the only thing that knows how to translate a
//! `Facility`'s decisions into event-list operations.

use crate::prelude::*;

/// Outcome of a `request()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The caller was handed a server immediately.
    Reserved,
    /// No server was free; the caller was queued and must wait for its
    /// event to re-fire once a `release()` promotes it.
    Queued,
}

/// Read-only snapshot of a facility's server/queue occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilityStatus {
    pub idle_servers: usize,
    pub busy_servers: usize,
    pub queue_length: usize,
}

/// A server slot currently held by a token.
#[derive(Debug, Clone, Copy)]
struct Occupant<Token> {
    token: Token,
    #[allow(dead_code)] // kept for parity with the spec's data model / future diagnostics
    priority: i64,
    #[allow(dead_code)]
    acquired_at: SimTime,
}

/// A waiter on the facility's queue. This record *is* the pending event
/// (the spec's "preferred" design, see `DESIGN.md`): there is nothing else
/// to look up when it is promoted, so invariant 5 holds by construction
/// rather than by a runtime check.
#[derive(Debug, Clone, Copy)]
struct Waiter<Token> {
    token: Token,
    priority: i64,
    enqueue_seq: u64,
    /// The `code` of the event that will re-fire once this waiter is
    /// promoted by a `release()`.
    code: i64,
}

/// What a successful `release()` hands back to `Simulator` so it can
/// re-inject the promoted waiter's event into the event list.
pub struct Promoted<Token> {
    pub code: i64,
    pub token: Token,
}

/// Outcome of a `release()` call against a single facility.
pub enum ReleaseOutcome<Token> {
    /// The token did not hold a server on this facility.
    NotHeld,
    /// The release succeeded; if a waiter was promoted, it must be
    /// re-scheduled at the current clock by the caller.
    Released { promoted: Option<Promoted<Token>> },
}

/// Lazily-accumulated time integrals and counters, updated at every
/// transition per the pattern in spec.md §9: accumulate the delta since the
/// last change *before* applying the new count.
#[derive(Debug, Clone)]
struct Stats {
    busy_time_integral: f64,
    queue_length_integral: f64,
    release_count: Vec<u64>,
    last_change_time: SimTime,
    busy_count: usize,
    queue_count: usize,
}

impl Stats {
    fn new(server_count: usize, now: SimTime) -> Self {
        Self {
            busy_time_integral: 0.0,
            queue_length_integral: 0.0,
            release_count: vec![0; server_count],
            last_change_time: now,
            busy_count: 0,
            queue_count: 0,
        }
    }

    /// Accumulates the integrals for the interval `[last_change_time, now]`
    /// at the *current* (pre-transition) counts, then advances the
    /// watermark. Call this before mutating `busy_count`/`queue_count`.
    fn touch(&mut self, now: SimTime) {
        let dt = now.since(self.last_change_time);
        self.busy_time_integral += self.busy_count as f64 * dt;
        self.queue_length_integral += self.queue_count as f64 * dt;
        self.last_change_time = now;
    }
}

/// A named multi-server semaphore with priority queueing.
pub struct Facility<Token> {
    pub name: String,
    servers: Vec<Option<Occupant<Token>>>,
    queue: Vec<Waiter<Token>>,
    stats: Stats,
    next_enqueue_seq: u64,
}

impl<Token: Copy + Eq> Facility<Token> {
    /// `server_count` must be >= 1; the caller (`Simulator::facility`) is
    /// responsible for validating that and returning `SimError::BadArg`.
    pub fn new(name: impl Into<String>, server_count: usize, now: SimTime) -> Self {
        debug_assert!(server_count >= 1, "facility must have at least one server");
        Self {
            name: name.into(),
            servers: vec![None; server_count],
            queue: Vec::new(),
            stats: Stats::new(server_count, now),
            next_enqueue_seq: 0,
        }
    }

    pub fn status(&self) -> FacilityStatus {
        let busy = self.stats.busy_count;
        FacilityStatus {
            idle_servers: self.servers.len() - busy,
            busy_servers: busy,
            queue_length: self.queue.len(),
        }
    }

    /// Whether `token` currently occupies a server slot on this facility.
    /// Used by `Simulator::request` to predict whether a call would queue
    /// (and therefore needs an in-flight event to replay) before actually
    /// mutating anything.
    pub fn holds(&self, token: Token) -> bool {
        self.servers.iter().any(|occ| matches!(occ, Some(o) if o.token == token))
    }

    /// §4.3 step 1: if any server is idle, reserve the lowest-indexed one.
    /// §4.3 step 2: otherwise enqueue the waiter in priority order.
    ///
    /// If `token` already occupies a slot on this facility, the request is
    /// confirmed as `Reserved` immediately rather than re-evaluated against
    /// the idle/queue branches. This is what makes `release`'s atomic
    /// transfer (§4.4) observable as `RESERVED` on the promoted waiter's
    /// replayed request, per scenario S2: the slot is already `token`'s by
    /// the time its retried event calls `request()` again, so there is
    /// nothing left to arbitrate. See `DESIGN.md` for the resulting
    /// divergence from a literal reading of invariant 4, which the spec's
    /// own Open Questions flags as implementer's choice.
    pub fn request(&mut self, token: Token, priority: i64, code: i64, now: SimTime) -> RequestOutcome {
        if self.holds(token) {
            return RequestOutcome::Reserved;
        }

        if let Some(slot) = self.servers.iter().position(Option::is_none) {
            self.stats.touch(now);
            self.servers[slot] = Some(Occupant { token, priority, acquired_at: now });
            self.stats.busy_count += 1;
            return RequestOutcome::Reserved;
        }

        self.stats.touch(now);
        let enqueue_seq = self.next_enqueue_seq;
        self.next_enqueue_seq = self.next_enqueue_seq.checked_add(1).expect("enqueue sequence overflow");
        let waiter = Waiter { token, priority, enqueue_seq, code };
        // Descending priority, FIFO within a priority: insert just before
        // the first existing waiter with strictly lower priority.
        let pos = self
            .queue
            .iter()
            .position(|w| w.priority < priority)
            .unwrap_or(self.queue.len());
        self.queue.insert(pos, waiter);
        self.stats.queue_count += 1;
        RequestOutcome::Queued
    }

    /// §4.4: free the lowest-indexed server slot held by `token`, then
    /// promote the highest-priority waiter (if any) into that slot.
    pub fn release(&mut self, token: Token, now: SimTime) -> ReleaseOutcome<Token> {
        let Some(slot) = self
            .servers
            .iter()
            .position(|occ| matches!(occ, Some(o) if o.token == token))
        else {
            return ReleaseOutcome::NotHeld;
        };

        self.stats.touch(now);
        self.servers[slot] = None;
        self.stats.busy_count -= 1;
        self.stats.release_count[slot] += 1;

        if self.queue.is_empty() {
            return ReleaseOutcome::Released { promoted: None };
        }

        let head = self.queue.remove(0);
        self.stats.touch(now);
        self.stats.queue_count -= 1;

        // Atomic transfer (§4.4 rationale): the slot just freed is handed
        // straight to the promoted waiter rather than left idle for a race
        // with some other token's intervening `cause()`.
        self.servers[slot] = Some(Occupant {
            token: head.token,
            priority: head.priority,
            acquired_at: now,
        });
        self.stats.busy_count += 1;

        ReleaseOutcome::Released {
            promoted: Some(Promoted { code: head.code, token: head.token }),
        }
    }

    pub fn busy_time_integral(&self) -> f64 {
        self.stats.busy_time_integral
    }

    pub fn queue_length_integral(&self) -> f64 {
        self.stats.queue_length_integral
    }

    pub fn release_count(&self, slot: usize) -> u64 {
        self.stats.release_count[slot]
    }
}
