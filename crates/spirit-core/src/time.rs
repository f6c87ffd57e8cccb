use serde::{Deserialize, Serialize};

/// Orchestrator-owned simulation clock, passed by value into each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickClock {
    /// Seconds covered by the current tick.
    pub dt: f32,
    /// Seconds elapsed before the current tick began.
    pub total: f64,
    /// Index of the current tick.
    pub tick: u64,
}

impl TickClock {
    /// Clock for a fixed tick rate in Hz.
    pub fn fixed(hz: f32) -> Self {
        Self {
            dt: 1.0 / hz,
            total: 0.0,
            tick: 0,
        }
    }

    pub fn with_dt(dt: f32) -> Self {
        Self {
            dt,
            total: 0.0,
            tick: 0,
        }
    }

    /// Clock for the next tick, keeping the same delta.
    pub fn advanced(self) -> Self {
        self.advanced_by(self.dt)
    }

    /// Clock for the next tick with a new delta (variable frame time).
    pub fn advanced_by(self, next_dt: f32) -> Self {
        Self {
            dt: next_dt,
            total: self.total + f64::from(self.dt),
            tick: self.tick + 1,
        }
    }

    /// Whether the delta is usable for integration.
    pub fn is_valid(&self) -> bool {
        self.dt.is_finite() && self.dt > 0.0
    }
}
