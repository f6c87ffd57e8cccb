use std::str::FromStr;

use serde::{Deserialize, Serialize};

use spirit_core::geometry::Rect;
use spirit_core::input::{Facing, MoveIntent};

use crate::collision;
use crate::config::EnemyConfig;
use crate::tile::{Tile, TileGrid};

/// Cosmetic monster variant. Behavior is identical; only the animation set
/// differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterType {
    Sushi,
    Lantern,
    Sandals,
}

impl MonsterType {
    pub const ALL: [MonsterType; 3] = [MonsterType::Sushi, MonsterType::Lantern, MonsterType::Sandals];

    /// Sprite-set directory name.
    pub fn name(self) -> &'static str {
        match self {
            MonsterType::Sushi => "Sushi",
            MonsterType::Lantern => "Lantern",
            MonsterType::Sandals => "Sandals",
        }
    }

    pub fn animation_set(self) -> AnimationSet {
        AnimationSet {
            sprite_set: self,
            has_jump: self == MonsterType::Lantern,
        }
    }
}

/// Unrecognized sprite-set name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMonster(pub String);

impl std::fmt::Display for UnknownMonster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown monster sprite set: {:?}", self.0)
    }
}

impl std::error::Error for UnknownMonster {}

impl FromStr for MonsterType {
    type Err = UnknownMonster;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MonsterType::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMonster(s.to_string()))
    }
}

/// Animation clips available to one monster variant, resolved at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSet {
    pub sprite_set: MonsterType,
    /// Whether the variant has an airborne clip for possessed jumps.
    pub has_jump: bool,
}

impl AnimationSet {
    /// Asset path of a clip, e.g. `Sprites/Lantern/Evil/Jump`.
    pub fn clip_path(&self, animation: EnemyAnimation) -> Option<String> {
        let clip = match animation {
            EnemyAnimation::Idle => "Good/Idle",
            EnemyAnimation::Run => "Good/Run",
            EnemyAnimation::EvilIdle => "Evil/Idle",
            EnemyAnimation::EvilRun => "Evil/Run",
            EnemyAnimation::EvilJump if self.has_jump => "Evil/Jump",
            EnemyAnimation::EvilJump | EnemyAnimation::Dead => return None,
        };
        Some(format!("Sprites/{}/{clip}", self.sprite_set.name()))
    }
}

/// Patrol state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PatrolState {
    Walking,
    /// Paused at a wall or ledge; turns around when `remaining` hits zero.
    Waiting { remaining: f32 },
}

/// Logical animation tag for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyAnimation {
    Idle,
    Run,
    EvilIdle,
    EvilRun,
    EvilJump,
    Dead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    x: f32,
    y: f32,
    local_bounds: Rect,
    monster: MonsterType,
    animations: AnimationSet,
    facing: Facing,
    patrol: PatrolState,
    possessed: bool,
    dead: bool,
    nearest: bool,
    /// Grounding of the controlling player's body, while possessed.
    host_on_ground: bool,
}

impl Enemy {
    pub fn new(monster: MonsterType, x: f32, y: f32, cfg: &EnemyConfig) -> Self {
        Self {
            x,
            y,
            local_bounds: Rect::anchored_bottom_center(cfg.width, cfg.height),
            monster,
            animations: monster.animation_set(),
            facing: Facing::Left,
            patrol: PatrolState::Walking,
            possessed: false,
            dead: false,
            nearest: false,
            host_on_ground: true,
        }
    }

    /// Advance the patrol. Suspended while possessed; dead enemies never move.
    pub fn update(&mut self, grid: &TileGrid, cfg: &EnemyConfig, dt: f32) {
        if self.dead || self.possessed {
            return;
        }
        match self.patrol {
            PatrolState::Waiting { remaining } => {
                let remaining = (remaining - dt).max(0.0);
                if remaining <= 0.0 {
                    self.facing = self.facing.flipped();
                    self.patrol = PatrolState::Walking;
                    tracing::debug!(monster = ?self.monster, x = self.x, facing = ?self.facing, "enemy turned around");
                } else {
                    self.patrol = PatrolState::Waiting { remaining };
                }
            },
            PatrolState::Walking => {
                if self.blocked_ahead(grid) {
                    self.patrol = PatrolState::Waiting {
                        remaining: cfg.max_wait_secs,
                    };
                } else {
                    self.x += self.facing.sign() * cfg.move_speed * dt;
                }
            },
        }
    }

    /// Wall at foot level or a drop below the cell holding the leading edge.
    fn blocked_ahead(&self, grid: &TileGrid) -> bool {
        let probe_x = self.x + self.local_bounds.width / 2.0 * self.facing.sign();
        let column = grid.column_at(probe_x);
        let row = grid.row_at(self.y);
        grid.classify(column, row - 1) == Tile::Impassable
            || grid.classify(column, row) == Tile::Passable
    }

    /// Mirror the controlling player's body. Facing follows the intent and is
    /// `Idle` without one.
    pub fn follow(&mut self, x: f32, y: f32, intent: MoveIntent, host_on_ground: bool) {
        self.x = x;
        self.y = y;
        self.facing = intent.into();
        self.host_on_ground = host_on_ground;
    }

    pub(crate) fn set_possessed(&mut self) {
        self.possessed = true;
        self.nearest = false;
    }

    /// Hand control back. With `kill_host` the body is left inert; otherwise it
    /// drops onto the floor below and resumes patrol from a pause.
    pub(crate) fn release(&mut self, grid: &TileGrid, cfg: &EnemyConfig, kill_host: bool) {
        self.possessed = false;
        self.host_on_ground = true;
        if kill_host {
            self.dead = true;
            return;
        }
        let drop = collision::resolve(grid, self.x, self.y, &self.local_bounds, 0.0, grid.pixel_height());
        self.y = drop.y;
        if self.facing == Facing::Idle {
            self.facing = Facing::Left;
        }
        self.patrol = PatrolState::Waiting {
            remaining: cfg.max_wait_secs,
        };
    }

    pub(crate) fn set_nearest(&mut self, nearest: bool) {
        self.nearest = nearest && !self.dead;
    }

    /// Animation tag. `frozen` is set while the level is not running (player
    /// dead, exit reached, or out of time).
    pub fn animation(&self, frozen: bool) -> EnemyAnimation {
        if self.dead {
            return EnemyAnimation::Dead;
        }
        let evil = self.nearest || self.possessed;
        if self.possessed && !self.host_on_ground && self.animations.has_jump {
            return EnemyAnimation::EvilJump;
        }
        let still = frozen
            || matches!(self.patrol, PatrolState::Waiting { .. })
            || self.facing == Facing::Idle;
        match (evil, still) {
            (true, true) => EnemyAnimation::EvilIdle,
            (true, false) => EnemyAnimation::EvilRun,
            (false, true) => EnemyAnimation::Idle,
            (false, false) => EnemyAnimation::Run,
        }
    }

    /// Highlight glow drawn behind the nearest possessable enemy.
    pub fn glow(&self) -> bool {
        self.nearest && !self.dead
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn local_bounds(&self) -> Rect {
        self.local_bounds
    }

    pub fn bounding_rect(&self) -> Rect {
        self.local_bounds.translated(self.x, self.y)
    }

    pub fn monster(&self) -> MonsterType {
        self.monster
    }

    pub fn animation_set(&self) -> AnimationSet {
        self.animations
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn patrol(&self) -> PatrolState {
        self.patrol
    }

    pub fn is_possessed(&self) -> bool {
        self.possessed
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_nearest(&self) -> bool {
        self.nearest
    }

    /// Patrolling and touchable: neither dead nor possessed.
    pub fn is_active(&self) -> bool {
        !self.dead && !self.possessed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::grid_from_rows;

    /// 1/64 s steps: every timing below is exact in binary floating point.
    const DT: f32 = 1.0 / 64.0;

    /// Eight 32-unit floor tiles (256 units) between walls, floor on row 3.
    fn walled_platform() -> TileGrid {
        grid_from_rows(
            &["..........", "..........", "#........#", "##########"],
            32.0,
            32.0,
        )
    }

    /// The same 256-unit floor with drops on both sides.
    fn ledge_platform() -> TileGrid {
        grid_from_rows(
            &["..........", "..........", "..........", ".########."],
            32.0,
            32.0,
        )
    }

    fn enemy_at(x: f32) -> (Enemy, EnemyConfig) {
        let cfg = EnemyConfig::default();
        (Enemy::new(MonsterType::Sushi, x, 96.0, &cfg), cfg)
    }

    /// Steps at which the enemy started waiting and at which it turned.
    fn trace_patrol(grid: &TileGrid, enemy: &mut Enemy, cfg: &EnemyConfig, steps: usize) -> (Vec<usize>, Vec<usize>) {
        let mut waits = Vec::new();
        let mut turns = Vec::new();
        for step in 0..steps {
            let before = enemy.patrol();
            let facing = enemy.facing();
            enemy.update(grid, cfg, DT);
            if before == PatrolState::Walking && enemy.patrol() != PatrolState::Walking {
                waits.push(step);
            }
            if enemy.facing() != facing {
                turns.push(step);
            }
        }
        (waits, turns)
    }

    #[test]
    fn monster_names_parse() {
        assert_eq!("Lantern".parse::<MonsterType>().unwrap(), MonsterType::Lantern);
        assert_eq!("sushi".parse::<MonsterType>().unwrap(), MonsterType::Sushi);
        let err = "Goblin".parse::<MonsterType>().unwrap_err();
        assert_eq!(err, UnknownMonster("Goblin".into()));
    }

    #[test]
    fn only_lantern_has_jump_clip() {
        assert!(MonsterType::Lantern.animation_set().has_jump);
        assert!(!MonsterType::Sushi.animation_set().has_jump);
        let set = MonsterType::Sandals.animation_set();
        assert_eq!(
            set.clip_path(EnemyAnimation::EvilRun).as_deref(),
            Some("Sprites/Sandals/Evil/Run")
        );
        assert_eq!(set.clip_path(EnemyAnimation::EvilJump), None);
    }

    #[test]
    fn walks_left_first() {
        let grid = walled_platform();
        let (mut enemy, cfg) = enemy_at(160.0);
        enemy.update(&grid, &cfg, DT);
        assert_eq!(enemy.x(), 159.0);
        assert_eq!(enemy.animation(false), EnemyAnimation::Run);
    }

    #[test]
    fn waits_exactly_configured_time_at_wall() {
        let grid = walled_platform();
        let (mut enemy, cfg) = enemy_at(160.0);
        let (waits, turns) = trace_patrol(&grid, &mut enemy, &cfg, 600);
        assert!(!waits.is_empty() && !turns.is_empty());
        // Half a second of countdown at 64 steps per second.
        assert_eq!(turns[0] - waits[0], 32);
    }

    #[test]
    fn stops_once_leading_edge_reaches_wall() {
        let grid = walled_platform();
        let (mut enemy, cfg) = enemy_at(160.0);
        while enemy.patrol() == PatrolState::Walking {
            enemy.update(&grid, &cfg, DT);
        }
        // Wall column 0 ends at x = 32 and the half width is 13, so the probe
        // first lands in the wall at x = 44.
        assert_eq!(enemy.x(), 44.0);
        assert_eq!(enemy.animation(false), EnemyAnimation::Idle);
    }

    #[test]
    fn patrol_oscillates_forever_between_walls() {
        let grid = walled_platform();
        let (mut enemy, cfg) = enemy_at(160.0);
        let (waits, turns) = trace_patrol(&grid, &mut enemy, &cfg, 64 * 60);
        assert!(turns.len() > 10);
        for pair in turns.windows(2).skip(1) {
            assert_eq!(
                pair[1] - pair[0],
                turns[2] - turns[1],
                "every leg after the first must take the same time"
            );
        }
        for (&wait, &turn) in waits.iter().zip(&turns) {
            assert_eq!(turn - wait, 32);
        }
        assert!(enemy.x() > 32.0 && enemy.x() < 288.0);
    }

    #[test]
    fn turns_at_ledges() {
        let grid = ledge_platform();
        let cfg = EnemyConfig::default();
        // Centered on the 256-unit floor spanning x = 32..288.
        let mut enemy = Enemy::new(MonsterType::Sandals, 160.0, 96.0, &cfg);
        let (waits, turns) = trace_patrol(&grid, &mut enemy, &cfg, 64 * 10);
        // 116 one-unit steps from 160 before the probe leaves the floor at 44.
        assert_eq!(waits[0], 116);
        assert_eq!(turns[0], 148);
        assert_eq!(enemy.y(), 96.0);
        assert!(waits.len() >= 2);
        for wait in &waits {
            assert!(*wait < 64 * 10);
        }
        assert!(enemy.x() >= 18.0 && enemy.x() <= 302.0);
    }

    #[test]
    fn patrol_on_one_way_platforms() {
        let grid = grid_from_rows(
            &["..........", "..........", "..........", ".--------."],
            32.0,
            32.0,
        );
        let (mut enemy, cfg) = enemy_at(160.0);
        for _ in 0..64 {
            enemy.update(&grid, &cfg, DT);
        }
        assert_eq!(enemy.patrol(), PatrolState::Walking);
        assert_eq!(enemy.x(), 96.0);
    }

    #[test]
    fn possessed_enemy_follows_instead_of_patrolling() {
        let grid = walled_platform();
        let (mut enemy, cfg) = enemy_at(160.0);
        enemy.set_possessed();
        enemy.update(&grid, &cfg, DT);
        assert_eq!(enemy.x(), 160.0, "patrol suspended while possessed");

        enemy.follow(200.0, 90.0, MoveIntent::Right, false);
        assert_eq!((enemy.x(), enemy.y()), (200.0, 90.0));
        assert_eq!(enemy.facing(), Facing::Right);
        assert_eq!(enemy.animation(false), EnemyAnimation::EvilRun);

        enemy.follow(200.0, 96.0, MoveIntent::None, true);
        assert_eq!(enemy.facing(), Facing::Idle);
        assert_eq!(enemy.animation(false), EnemyAnimation::EvilIdle);
    }

    #[test]
    fn lantern_jumps_when_host_airborne() {
        let cfg = EnemyConfig::default();
        let mut lantern = Enemy::new(MonsterType::Lantern, 100.0, 96.0, &cfg);
        lantern.set_possessed();
        lantern.follow(100.0, 60.0, MoveIntent::Left, false);
        assert_eq!(lantern.animation(false), EnemyAnimation::EvilJump);

        let mut sushi = Enemy::new(MonsterType::Sushi, 100.0, 96.0, &cfg);
        sushi.set_possessed();
        sushi.follow(100.0, 60.0, MoveIntent::Left, false);
        assert_eq!(sushi.animation(false), EnemyAnimation::EvilRun);
    }

    #[test]
    fn release_kills_host() {
        let grid = walled_platform();
        let (mut enemy, cfg) = enemy_at(160.0);
        enemy.set_possessed();
        enemy.release(&grid, &cfg, true);
        assert!(enemy.is_dead());
        assert!(!enemy.is_possessed());
        enemy.update(&grid, &cfg, DT);
        assert_eq!(enemy.x(), 160.0);
        assert_eq!(enemy.animation(false), EnemyAnimation::Dead);
        enemy.set_nearest(true);
        assert!(!enemy.glow(), "dead bodies are never highlighted");
    }

    #[test]
    fn release_resumes_patrol_from_waiting() {
        let grid = walled_platform();
        let (mut enemy, cfg) = enemy_at(160.0);
        enemy.set_possessed();
        enemy.follow(128.0, 50.0, MoveIntent::None, false);
        enemy.release(&grid, &cfg, false);
        assert!(!enemy.is_dead());
        assert_eq!(enemy.y(), 96.0, "host drops back onto the floor");
        assert_eq!(enemy.facing(), Facing::Left);
        assert_eq!(
            enemy.patrol(),
            PatrolState::Waiting {
                remaining: cfg.max_wait_secs
            }
        );
    }

    #[test]
    fn frozen_level_shows_idle() {
        let (mut enemy, _) = enemy_at(160.0);
        assert_eq!(enemy.animation(true), EnemyAnimation::Idle);
        enemy.set_nearest(true);
        assert_eq!(enemy.animation(true), EnemyAnimation::EvilIdle);
        assert_eq!(enemy.animation(false), EnemyAnimation::EvilRun);
        assert!(enemy.glow());
    }
}
