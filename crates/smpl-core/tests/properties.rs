//! Property tests for the invariants listed in SPEC_FULL.md §8, run over
//! randomly generated schedules rather than the fixed S1-S6 traces in
//! `scenarios.rs`.

use proptest::prelude::*;
use smpl_core::{RequestOutcome, Simulator};

/// Invariant 1: successive `cause()` times are non-decreasing, for any
/// interleaving of `schedule` calls with nonnegative deltas.
proptest! {
    #[test]
    fn cause_times_are_non_decreasing(deltas in prop::collection::vec(0.0f64..50.0, 0..40)) {
        let mut sim: Simulator<u32> = Simulator::new("prop-causal");
        for (i, dt) in deltas.iter().enumerate() {
            sim.schedule(1, *dt, i as u32).unwrap();
        }

        let mut last = 0.0f64;
        while let Some(_fired) = sim.cause() {
            let now = sim.time();
            prop_assert!(now >= last, "clock went backwards: {} then {}", last, now);
            last = now;
        }
    }
}

/// Invariant 3: releasing immediately after a `RESERVED` return restores the
/// facility's occupancy/queue shape, and only the (monotonically growing)
/// statistics integrals and event list are allowed to differ.
proptest! {
    #[test]
    fn reserve_then_release_round_trips_status(server_count in 1usize..5, priority in -10i64..10) {
        let mut sim: Simulator<u32> = Simulator::new("prop-roundtrip");
        let f = sim.facility("F", server_count).unwrap();
        sim.schedule(1, 0.0, 0u32).unwrap();
        sim.cause().unwrap();

        let before = sim.status(f).unwrap();
        let outcome = sim.request(f, 1, priority).unwrap();
        prop_assert_eq!(outcome, RequestOutcome::Reserved, "a single request on an empty facility always reserves");
        sim.release(f, 1).unwrap();
        let after = sim.status(f).unwrap();

        prop_assert_eq!(before, after);
    }
}

/// Invariant 4 & 5: with no further requests, queued waiters are released in
/// descending-priority order, and FIFO among equal priorities.
proptest! {
    #[test]
    fn priority_then_fifo_ordering_holds(
        priorities in prop::collection::vec(-5i64..5, 2..8),
    ) {
        let mut sim: Simulator<usize> = Simulator::new("prop-priority");
        let f = sim.facility("F", 1).unwrap();

        for (token, _) in priorities.iter().enumerate() {
            sim.schedule(1, 0.0, token).unwrap();
        }

        let mut enqueue_order = Vec::new();
        for token in 0..priorities.len() {
            let fired = sim.cause().unwrap();
            let priority = priorities[fired.token];
            let outcome = sim.request(f, fired.token, priority).unwrap();
            if outcome == RequestOutcome::Queued {
                enqueue_order.push(fired.token);
            }
            prop_assert_eq!(fired.token, token);
        }

        // The first token reserved the only server; release it and record
        // the promotion order for everyone still queued.
        sim.release(f, 0).unwrap();
        let mut promotion_order = Vec::new();
        while let Some(fired) = sim.cause() {
            promotion_order.push(fired.token);
            sim.request(f, fired.token, priorities[fired.token]).unwrap();
            sim.release(f, fired.token).unwrap();
        }

        // Expected order: sort the waiters that queued by (-priority, enqueue index).
        let mut expected: Vec<usize> = enqueue_order.clone();
        expected.sort_by_key(|&token| {
            let enqueue_index = enqueue_order.iter().position(|&t| t == token).unwrap();
            (std::cmp::Reverse(priorities[token]), enqueue_index)
        });

        prop_assert_eq!(promotion_order, expected);
    }
}

/// Invariant 6: the busy-time integral accumulated incrementally by the
/// facility equals the integral computed independently from the trace of
/// (time, busy-count) samples recorded alongside it.
proptest! {
    #[test]
    fn busy_time_integral_matches_independent_trace(
        hold_durations in prop::collection::vec(0.1f64..5.0, 1..6),
    ) {
        let mut sim: Simulator<usize> = Simulator::new("prop-stats");
        let f = sim.facility("F", 1).unwrap();

        let mut trace: Vec<(f64, usize)> = vec![(0.0, 0)];
        for (token, hold) in hold_durations.iter().enumerate() {
            sim.schedule(1, 0.0, token).unwrap();
            let fired = sim.cause().unwrap();
            sim.request(f, fired.token, 0).unwrap();
            trace.push((sim.time(), 1));

            sim.schedule(2, *hold, token).unwrap();
            let fired = sim.cause().unwrap();
            sim.release(f, fired.token).unwrap();
            trace.push((sim.time(), 0));
        }

        let mut independent = 0.0f64;
        for window in trace.windows(2) {
            let (t0, count) = window[0];
            let (t1, _) = window[1];
            independent += count as f64 * (t1 - t0);
        }

        let reported = sim.busy_time_integral(f).unwrap();
        prop_assert!(
            (reported - independent).abs() < 1e-9,
            "reported {} independent {}",
            reported,
            independent
        );
    }
}
