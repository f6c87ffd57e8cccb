use crate::time::TickClock;

/// Core trait for a steppable simulation driven by an external loop.
///
/// The caller owns the clock and input polling; the simulation only advances
/// its own state and reports what happened.
pub trait Simulation {
    /// Abstract input consumed each tick.
    type Input;
    /// Events emitted for presentation collaborators (audio, HUD).
    type Event;

    /// Advance one tick. Returns the events raised during the tick.
    fn update(&mut self, clock: TickClock, input: &Self::Input) -> Vec<Self::Event>;

    /// Serialize the authoritative state for presentation or replay tooling.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the state with a previously serialized one. Malformed data is
    /// ignored.
    fn apply_state(&mut self, state: &[u8]);

    /// Intended tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Freeze the simulation; `update` becomes a no-op.
    fn pause(&mut self);

    fn resume(&mut self);

    /// Whether the simulation has reached a terminal state.
    fn is_complete(&self) -> bool;
}

/// Generates the 5 boilerplate `Simulation` methods:
/// `serialize_state`, `apply_state`, `pause`, `resume`, `is_complete`.
///
/// Requires the implementing struct to have `state: $StateType` and `paused: bool` fields,
/// and `$StateType` to have a `complete: bool` field.
#[macro_export]
macro_rules! spirit_sim_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("simulation state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            if let Ok(s) = rmp_serde::from_slice::<$StateType>(state) {
                self.state = s;
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_complete(&self) -> bool {
            self.state.complete
        }
    };
}
