use serde::{Deserialize, Serialize};

/// Directional intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveIntent {
    Left,
    Right,
    #[default]
    None,
}

impl MoveIntent {
    /// -1 (left), 0, +1 (right).
    pub fn sign(self) -> f32 {
        match self {
            MoveIntent::Left => -1.0,
            MoveIntent::Right => 1.0,
            MoveIntent::None => 0.0,
        }
    }
}

/// Facing direction along the X axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Left,
    Right,
    Idle,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
            Facing::Idle => 0.0,
        }
    }

    /// Opposite direction. `Idle` has no opposite and stays `Idle`.
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
            Facing::Idle => Facing::Idle,
        }
    }
}

impl From<MoveIntent> for Facing {
    fn from(intent: MoveIntent) -> Self {
        match intent {
            MoveIntent::Left => Facing::Left,
            MoveIntent::Right => Facing::Right,
            MoveIntent::None => Facing::Idle,
        }
    }
}

/// Abstract, device-independent input for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub movement: MoveIntent,
    pub jump_held: bool,
    pub jump_pressed: bool,
    pub possess_pressed: bool,
    pub depossess_pressed: bool,
}

impl FrameInput {
    /// Fold a newer poll into this pending input.
    ///
    /// Continuous values (movement, jump held) take the latest poll; one-shot
    /// triggers stay set once seen so a press between two ticks is not lost.
    pub fn merge(&mut self, newer: &FrameInput) {
        self.movement = newer.movement;
        self.jump_held = newer.jump_held;
        self.jump_pressed |= newer.jump_pressed;
        self.possess_pressed |= newer.possess_pressed;
        self.depossess_pressed |= newer.depossess_pressed;
    }

    /// The input seen by substep `index` of a tick: one-shot triggers fire on
    /// the first substep only.
    pub fn for_substep(&self, index: u32) -> FrameInput {
        if index == 0 {
            *self
        } else {
            FrameInput {
                jump_pressed: false,
                possess_pressed: false,
                depossess_pressed: false,
                ..*self
            }
        }
    }
}
