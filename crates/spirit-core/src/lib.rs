pub mod geometry;
pub mod input;
pub mod sim_trait;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::sim_trait::Simulation;
    use crate::time::TickClock;

    /// Run `n` ticks with the same input, returning all accumulated events.
    pub fn run_ticks<S: Simulation>(
        sim: &mut S,
        input: &S::Input,
        n: usize,
        dt: f32,
    ) -> Vec<S::Event> {
        let mut clock = TickClock::with_dt(dt);
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.update(clock, input));
            clock = clock.advanced();
        }
        all_events
    }

    /// Assert that the simulation's serialized state differs from `before`.
    pub fn assert_state_changed<S: Simulation>(sim: &S, before: &[u8]) {
        let after = sim.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Simulation state should have changed after operation"
        );
    }

    // ================================================================
    // Simulation Contract Tests
    // ================================================================
    // Generic checks every Simulation implementation must pass. Crates call
    // them from their own #[cfg(test)] modules with a concrete instance.

    /// serialize_state() must return non-empty bytes.
    pub fn contract_state_is_serializable<S: Simulation>(sim: &S) {
        let state = sim.serialize_state();
        assert!(
            !state.is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// update() with dt>0 must change the state (timers at minimum).
    pub fn contract_update_advances_time<S: Simulation>(sim: &mut S, idle: &S::Input) {
        let before = sim.serialize_state();
        sim.update(TickClock::with_dt(0.1), idle);
        let after = sim.serialize_state();
        assert_ne!(before, after, "update(dt>0) must advance simulation state");
    }

    /// Non-finite or non-positive deltas must leave the state untouched.
    pub fn contract_invalid_dt_is_noop<S: Simulation>(sim: &mut S, idle: &S::Input) {
        let before = sim.serialize_state();
        sim.update(TickClock::with_dt(f32::NAN), idle);
        sim.update(TickClock::with_dt(0.0), idle);
        sim.update(TickClock::with_dt(-1.0), idle);
        let after = sim.serialize_state();
        assert_eq!(before, after, "Invalid deltas must not change state");
    }

    /// serialize_state → apply_state roundtrip must be stable.
    pub fn contract_state_roundtrip_preserves<S: Simulation>(sim: &mut S) {
        let state_a = sim.serialize_state();
        sim.apply_state(&state_a);
        let state_b = sim.serialize_state();
        assert_eq!(
            state_a, state_b,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// Garbage state data must be ignored.
    pub fn contract_garbage_state_ignored<S: Simulation>(sim: &mut S) {
        let before = sim.serialize_state();
        sim.apply_state(&[0xFF, 0xFE, 0x00, 0x01, 0xAB, 0xCD]);
        let truncated = &before[..before.len() / 2];
        sim.apply_state(truncated);
        assert_eq!(
            before,
            sim.serialize_state(),
            "Malformed state must not replace the current state"
        );
    }

    /// pause() must freeze state, resume() must unfreeze it.
    pub fn contract_pause_stops_updates<S: Simulation>(sim: &mut S, idle: &S::Input) {
        sim.pause();
        let before = sim.serialize_state();
        sim.update(TickClock::with_dt(0.1), idle);
        let during_pause = sim.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        sim.resume();
        sim.update(TickClock::with_dt(0.1), idle);
        let after_resume = sim.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// Running update() long enough must reach is_complete().
    pub fn contract_eventually_completes<S: Simulation>(
        sim: &mut S,
        idle: &S::Input,
        max_ticks: usize,
    ) {
        let mut clock = TickClock::with_dt(1.0);
        for _ in 0..max_ticks {
            sim.update(clock, idle);
            if sim.is_complete() {
                return;
            }
            clock = clock.advanced();
        }
        assert!(
            sim.is_complete(),
            "Simulation must complete after {max_ticks} ticks of 1s each"
        );
    }
}
