use serde::{Deserialize, Serialize};

use spirit_core::geometry::Rect;
use spirit_core::input::MoveIntent;

use crate::collision::{self, CollisionFlags};
use crate::tile::TileGrid;

/// Position (bottom-center anchor) and velocity of a moving entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Body {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// World bounds for the given local bounds.
    pub fn bounds(&self, local: &Rect) -> Rect {
        local.translated(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.vx.is_finite() && self.vy.is_finite()
    }
}

/// Instantaneous horizontal velocity: full speed toward the intent, or zero.
pub fn horizontal_velocity(intent: MoveIntent, move_speed: f32) -> f32 {
    intent.sign() * move_speed
}

/// Integrate gravity, clamping the fall speed.
pub fn apply_gravity(vy: f32, gravity: f32, max_fall_speed: f32, dt: f32) -> f32 {
    (vy + gravity * dt).min(max_fall_speed)
}

/// Upward velocity while a jump is held `jump_time` seconds in.
///
/// Starts at `launch` and falls off toward zero at `max_jump_time`; `power`
/// below 1 keeps most of the lift early in the jump.
pub fn jump_velocity(launch: f32, jump_time: f32, max_jump_time: f32, power: f32) -> f32 {
    let progress = (jump_time / max_jump_time).clamp(0.0, 1.0);
    launch * (1.0 - progress.powf(power))
}

/// Move `body` by its velocity over `dt` against the grid.
///
/// Velocity on a blocked axis is zeroed so the next step starts at rest
/// against the obstacle.
pub fn move_and_collide(
    body: &mut Body,
    local: &Rect,
    grid: &TileGrid,
    dt: f32,
) -> CollisionFlags {
    let sweep = collision::resolve(grid, body.x, body.y, local, body.vx * dt, body.vy * dt);
    body.x = sweep.x;
    body.y = sweep.y;

    let flags = sweep.flags;
    if (flags.blocked_left && body.vx < 0.0) || (flags.blocked_right && body.vx > 0.0) {
        body.vx = 0.0;
    }
    if (flags.on_ground && body.vy > 0.0) || (flags.hit_ceiling && body.vy < 0.0) {
        body.vy = 0.0;
    }
    flags
}

/// Number of equal substeps for a tick of `dt` seconds.
pub fn substeps_for(dt: f32, max_step: f32, max_substeps: u32) -> u32 {
    if !(dt.is_finite() && dt > 0.0 && max_step.is_finite() && max_step > 0.0) {
        return 1;
    }
    let steps = (dt / max_step).ceil();
    if steps >= max_substeps as f32 {
        max_substeps.max(1)
    } else {
        (steps as u32).max(1)
    }
}
