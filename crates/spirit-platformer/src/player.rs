use serde::{Deserialize, Serialize};

use spirit_core::geometry::Rect;
use spirit_core::input::{Facing, FrameInput, MoveIntent};

use crate::collision::CollisionFlags;
use crate::config::PhysicsConfig;
use crate::physics::{self, Body};
use crate::possession::EnemyId;
use crate::tile::TileGrid;

/// Movement state. Possessing is tracked separately, see
/// [`Player::is_possessing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Grounded,
    Airborne,
    Dead,
}

/// Logical animation tag for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAnimation {
    Idle,
    Run,
    Jump,
    Celebrate,
    Die,
    /// The spirit is inside a host; the host's own animation is shown.
    Possessing,
}

/// Back-reference to the possessed host plus where the player left its own
/// body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Possession {
    pub enemy: EnemyId,
    /// Host bounds, used for collision while possessing.
    pub host_bounds: Rect,
    pub free_x: f32,
    pub free_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    local_bounds: Rect,
    alive: bool,
    on_ground: bool,
    flags: CollisionFlags,
    facing: Facing,
    /// Seconds into the current jump; zero when not jumping.
    jump_time: f32,
    score: u32,
    possession: Option<Possession>,
    /// Intent seen by the most recent update.
    movement: MoveIntent,
    celebrating: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, physics: &PhysicsConfig) -> Self {
        Self {
            body: Body::at(x, y),
            local_bounds: Rect::anchored_bottom_center(physics.player_width, physics.player_height),
            alive: true,
            on_ground: false,
            flags: CollisionFlags::default(),
            facing: Facing::Right,
            jump_time: 0.0,
            score: 0,
            possession: None,
            movement: MoveIntent::None,
            celebrating: false,
        }
    }

    /// Advance one (sub)step.
    ///
    /// A dead player ignores input but still falls and collides so the body
    /// settles where it died.
    pub fn update(&mut self, input: &FrameInput, grid: &TileGrid, cfg: &PhysicsConfig, dt: f32) {
        if !self.alive {
            self.movement = MoveIntent::None;
            self.jump_time = 0.0;
            self.body.vx = 0.0;
            self.body.vy = physics::apply_gravity(self.body.vy, cfg.gravity, cfg.max_fall_speed, dt);
            let local = self.active_bounds();
            self.flags = physics::move_and_collide(&mut self.body, &local, grid, dt);
            self.on_ground = self.flags.on_ground;
            return;
        }

        // A celebrating player stands still at the exit.
        self.movement = if self.celebrating {
            MoveIntent::None
        } else {
            input.movement
        };
        if self.movement != MoveIntent::None {
            self.facing = self.movement.into();
        }

        self.body.vx = physics::horizontal_velocity(self.movement, cfg.move_speed);
        self.body.vy = physics::apply_gravity(self.body.vy, cfg.gravity, cfg.max_fall_speed, dt);
        if !self.celebrating {
            self.body.vy = self.do_jump(input, cfg, dt);
        }

        let local = self.active_bounds();
        self.flags = physics::move_and_collide(&mut self.body, &local, grid, dt);
        self.on_ground = self.flags.on_ground;
        if self.flags.hit_ceiling {
            self.jump_time = 0.0;
        }
    }

    /// Variable-height jump: lift decays while held, ends on release, at the
    /// hold limit, or against a ceiling.
    fn do_jump(&mut self, input: &FrameInput, cfg: &PhysicsConfig, dt: f32) -> f32 {
        let mut vy = self.body.vy;
        let starting = input.jump_pressed && self.on_ground && self.jump_time == 0.0;
        let continuing = input.jump_held && self.jump_time > 0.0;

        if starting || continuing {
            self.jump_time += dt;
            if self.jump_time <= cfg.max_jump_time {
                vy = physics::jump_velocity(
                    cfg.jump_launch_velocity,
                    self.jump_time,
                    cfg.max_jump_time,
                    cfg.jump_control_power,
                );
            } else {
                self.jump_time = 0.0;
            }
        } else {
            self.jump_time = 0.0;
        }
        vy
    }

    /// Bounds used for collision: the player's own, or the host's while
    /// possessing.
    pub fn active_bounds(&self) -> Rect {
        match &self.possession {
            Some(p) => p.host_bounds,
            None => self.local_bounds,
        }
    }

    /// World bounds of the active body.
    pub fn bounding_rect(&self) -> Rect {
        self.body.bounds(&self.active_bounds())
    }

    pub fn state(&self) -> PlayerState {
        if !self.alive {
            PlayerState::Dead
        } else if self.on_ground {
            PlayerState::Grounded
        } else {
            PlayerState::Airborne
        }
    }

    pub fn animation(&self) -> PlayerAnimation {
        if !self.alive {
            PlayerAnimation::Die
        } else if self.celebrating {
            PlayerAnimation::Celebrate
        } else if self.possession.is_some() {
            PlayerAnimation::Possessing
        } else if !self.on_ground {
            PlayerAnimation::Jump
        } else if self.body.vx != 0.0 {
            PlayerAnimation::Run
        } else {
            PlayerAnimation::Idle
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn is_jumping(&self) -> bool {
        self.jump_time > 0.0
    }

    pub fn is_possessing(&self) -> bool {
        self.possession.is_some()
    }

    pub fn possessed_enemy(&self) -> Option<EnemyId> {
        self.possession.map(|p| p.enemy)
    }

    pub fn possession(&self) -> Option<&Possession> {
        self.possession.as_ref()
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn movement(&self) -> MoveIntent {
        self.movement
    }

    pub fn flags(&self) -> CollisionFlags {
        self.flags
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Mark the player dead. The caller releases any host first.
    pub fn on_killed(&mut self) {
        debug_assert!(
            self.possession.is_none(),
            "player killed while still holding a host"
        );
        self.alive = false;
        self.celebrating = false;
        self.jump_time = 0.0;
    }

    pub fn on_reached_exit(&mut self) {
        self.celebrating = true;
        self.jump_time = 0.0;
    }

    /// Respawn at `(x, y)`. The score is kept.
    pub fn reset(&mut self, x: f32, y: f32) {
        self.body = Body::at(x, y);
        self.alive = true;
        self.on_ground = false;
        self.flags = CollisionFlags::default();
        self.jump_time = 0.0;
        self.possession = None;
        self.movement = MoveIntent::None;
        self.celebrating = false;
    }

    /// Move the spirit into a host at `(host_x, host_y)`, remembering where
    /// the player's own body stood.
    pub(crate) fn enter_host(&mut self, enemy: EnemyId, host_x: f32, host_y: f32, host_bounds: Rect) {
        self.possession = Some(Possession {
            enemy,
            host_bounds,
            free_x: self.body.x,
            free_y: self.body.y,
        });
        self.body = Body::at(host_x, host_y);
        self.jump_time = 0.0;
    }

    /// Leave the host and return to the saved free-roam position at rest.
    /// Returns the host that was vacated.
    pub(crate) fn leave_host(&mut self) -> Option<EnemyId> {
        let possession = self.possession.take()?;
        self.body = Body::at(possession.free_x, possession.free_y);
        self.jump_time = 0.0;
        self.on_ground = false;
        self.flags = CollisionFlags::default();
        Some(possession.enemy)
    }
}
