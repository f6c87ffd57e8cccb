pub mod campaign;
pub mod collision;
pub mod config;
pub mod enemy;
pub mod level_gen;
pub mod physics;
pub mod player;
pub mod possession;
pub mod scoring;
pub mod tag;
pub mod tile;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use spirit_core::geometry::Rect;
use spirit_core::input::{Facing, FrameInput};
use spirit_core::sim_trait::Simulation;
use spirit_core::spirit_sim_boilerplate;
use spirit_core::time::TickClock;

use config::PlatformerConfig;
use enemy::{Enemy, EnemyAnimation, MonsterType};
use player::{Player, PlayerAnimation};
use possession::{EnemyId, PossessionOutcome};
use tag::{Tag, TagTier};
use tile::{GridError, TileGrid};

/// What a spawn record places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    PlayerStart,
    Exit,
    Enemy(MonsterType),
    /// A tag with a fixed tier, or a random one when `None`.
    Tag(Option<TagTier>),
}

/// Entity placed at a grid cell when the level loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub kind: SpawnKind,
    pub column: u32,
    pub row: u32,
}

/// Parsed level description: tiles plus spawn list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub grid: TileGrid,
    pub spawns: Vec<Spawn>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    Grid(GridError),
    MissingStart,
    DuplicateStart,
    MissingExit,
    DuplicateExit,
    SpawnOutOfBounds { column: u32, row: u32 },
    /// A level source has no level at this index.
    UnknownLevel(usize),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "invalid tile grid: {e}"),
            Self::MissingStart => write!(f, "level has no player start"),
            Self::DuplicateStart => write!(f, "level has more than one player start"),
            Self::MissingExit => write!(f, "level has no exit"),
            Self::DuplicateExit => write!(f, "level has more than one exit"),
            Self::SpawnOutOfBounds { column, row } => {
                write!(f, "spawn at ({column}, {row}) is outside the grid")
            },
            Self::UnknownLevel(index) => write!(f, "no level at index {index}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for LevelError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    Enemy(EnemyId),
    TimeExpired,
    /// Hazard or fall signal raised outside the core.
    External,
}

/// Notifications for audio and HUD collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    TagCollected { tier: TagTier, points: u32 },
    PlayerKilled { cause: KillCause },
    ExitReached,
    Possessed(EnemyId),
    Released(EnemyId),
    TimeBonus { seconds: f32, points: u32 },
    LevelComplete,
}

/// Serializable level state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Uncollected tags; collected ones are removed.
    pub tags: Vec<Tag>,
    pub time_remaining: f32,
    /// Simulated seconds since load, drives tag bounce.
    pub elapsed: f64,
    pub reached_exit: bool,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub animation: PlayerAnimation,
    pub possessing: Option<EnemyId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub monster: MonsterType,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub animation: EnemyAnimation,
    /// Highlight hint for the nearest possessable enemy.
    pub glow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagView {
    pub x: f32,
    pub y: f32,
    pub tier: TagTier,
}

/// Everything the presentation layer draws for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub tags: Vec<TagView>,
    pub score: u32,
    pub time_remaining: f32,
    pub reached_exit: bool,
    pub player_alive: bool,
    pub complete: bool,
}

/// One loaded level: grid, entities and rules, advanced one tick at a time.
pub struct Level {
    grid: TileGrid,
    config: PlatformerConfig,
    start: (f32, f32),
    /// Center of the exit cell; the player must stand over it.
    exit: (f32, f32),
    state: LevelState,
    paused: bool,
}

impl Level {
    pub fn new(data: LevelData, config: PlatformerConfig, seed: u64) -> Result<Self, LevelError> {
        let LevelData { grid, spawns } = data;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut start = None;
        let mut exit = None;
        let mut enemies = Vec::new();
        let mut tags = Vec::new();

        for spawn in &spawns {
            let (column, row) = (spawn.column as i32, spawn.row as i32);
            if !grid.contains_cell(column, row) {
                return Err(LevelError::SpawnOutOfBounds {
                    column: spawn.column,
                    row: spawn.row,
                });
            }
            match spawn.kind {
                SpawnKind::PlayerStart => {
                    if start.replace(grid.cell_bottom_center(column, row)).is_some() {
                        return Err(LevelError::DuplicateStart);
                    }
                },
                SpawnKind::Exit => {
                    if exit.replace(grid.cell_center(column, row)).is_some() {
                        return Err(LevelError::DuplicateExit);
                    }
                },
                SpawnKind::Enemy(monster) => {
                    let (x, y) = grid.cell_bottom_center(column, row);
                    enemies.push(Enemy::new(monster, x, y, &config.enemy));
                },
                SpawnKind::Tag(tier) => {
                    let (x, y) = grid.cell_center(column, row);
                    let tier = tier.unwrap_or_else(|| TagTier::random(&mut rng));
                    tags.push(Tag::new(x, y, tier));
                },
            }
        }

        let start = start.ok_or(LevelError::MissingStart)?;
        let exit = exit.ok_or(LevelError::MissingExit)?;

        tracing::info!(
            width = grid.width(),
            height = grid.height(),
            enemies = enemies.len(),
            tags = tags.len(),
            "level loaded"
        );

        let state = LevelState {
            player: Player::new(start.0, start.1, &config.physics),
            enemies,
            tags,
            time_remaining: config.rules.time_limit_secs,
            elapsed: 0.0,
            reached_exit: false,
            complete: false,
        };

        Ok(Self {
            grid,
            config,
            start,
            exit,
            state,
            paused: false,
        })
    }

    pub fn state(&self) -> &LevelState {
        &self.state
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.state.enemies
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.state.enemies.get(id.0)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.state.tags
    }

    pub fn start_position(&self) -> (f32, f32) {
        self.start
    }

    pub fn exit_position(&self) -> (f32, f32) {
        self.exit
    }

    pub fn score(&self) -> u32 {
        self.state.player.score()
    }

    pub fn time_remaining(&self) -> f32 {
        self.state.time_remaining
    }

    pub fn reached_exit(&self) -> bool {
        self.state.reached_exit
    }

    pub fn player_alive(&self) -> bool {
        self.state.player.is_alive()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Player input and enemy patrols only run while the player is alive,
    /// short of the exit, and on the clock.
    pub fn is_running(&self) -> bool {
        self.state.player.is_alive() && !self.state.reached_exit && self.state.time_remaining > 0.0
    }

    /// Kill the player from an outside signal (hazard, fall).
    pub fn kill_player(&mut self, cause: KillCause) -> Vec<LevelEvent> {
        let mut events = Vec::new();
        self.kill(cause, &mut events);
        events
    }

    fn kill(&mut self, cause: KillCause, events: &mut Vec<LevelEvent>) {
        if !self.state.player.is_alive() {
            return;
        }
        self.release_host(events);
        self.state.player.on_killed();
        tracing::info!(?cause, "player killed");
        events.push(LevelEvent::PlayerKilled { cause });
    }

    /// Respawn at the level start. Score and clock are kept.
    pub fn start_new_life(&mut self) -> Vec<LevelEvent> {
        let mut events = Vec::new();
        self.release_host(&mut events);
        let (x, y) = self.start;
        self.state.player.reset(x, y);
        tracing::info!("player respawned");
        events
    }

    fn release_host(&mut self, events: &mut Vec<LevelEvent>) {
        if !self.state.player.is_possessing() {
            return;
        }
        let outcome = possession::release(
            &mut self.state.player,
            &mut self.state.enemies,
            &self.grid,
            &self.config.possession,
            &self.config.enemy,
        );
        if let PossessionOutcome::Released(id) = outcome {
            events.push(LevelEvent::Released(id));
        }
    }

    /// One physics substep in fixed order: player, host mirroring, enemies,
    /// tags, then contact and exit checks.
    fn step(&mut self, input: &FrameInput, dt: f32, events: &mut Vec<LevelEvent>) {
        let running = self.is_running();
        let input = if running { *input } else { FrameInput::default() };

        self.state.player.update(&input, &self.grid, &self.config.physics, dt);
        possession::sync_host(&self.state.player, &mut self.state.enemies);

        if running {
            for enemy in &mut self.state.enemies {
                enemy.update(&self.grid, &self.config.enemy, dt);
            }
        }

        self.state.elapsed += f64::from(dt);
        for tag in &mut self.state.tags {
            tag.update(self.state.elapsed, &self.config.tags, self.grid.tile_height());
        }

        if running {
            self.collect_tags(events);
            self.check_enemy_contact(events);
            self.check_exit(events);
        }
    }

    fn collect_tags(&mut self, events: &mut Vec<LevelEvent>) {
        let bounds = self.state.player.bounding_rect();
        let tile_width = self.grid.tile_width();
        let multiplier = self.config.tags.point_multiplier;
        let player = &mut self.state.player;
        self.state.tags.retain_mut(|tag| {
            if !tag.touches(&bounds, tile_width) {
                return true;
            }
            tag.collected = true;
            let points = scoring::tag_points(tag.tier, multiplier);
            player.award(points);
            events.push(LevelEvent::TagCollected {
                tier: tag.tier,
                points,
            });
            false
        });
    }

    fn check_enemy_contact(&mut self, events: &mut Vec<LevelEvent>) {
        if !self.config.rules.enemy_contact_kills || self.state.player.is_possessing() {
            return;
        }
        let bounds = self.state.player.bounding_rect();
        let hit = self
            .state
            .enemies
            .iter()
            .position(|enemy| enemy.is_active() && enemy.bounding_rect().intersects(&bounds));
        if let Some(index) = hit {
            self.kill(KillCause::Enemy(EnemyId(index)), events);
        }
    }

    fn check_exit(&mut self, events: &mut Vec<LevelEvent>) {
        let player = &self.state.player;
        let (ex, ey) = self.exit;
        if player.is_alive() && player.is_on_ground() && player.bounding_rect().contains_point(ex, ey) {
            self.state.reached_exit = true;
            self.state.player.on_reached_exit();
            tracing::info!(score = self.score(), time_left = self.state.time_remaining, "exit reached");
            events.push(LevelEvent::ExitReached);
        }
    }

    fn drain_time_bonus(&mut self, dt: f32, events: &mut Vec<LevelEvent>) {
        let rules = &self.config.rules;
        let bonus = scoring::time_bonus(
            self.state.time_remaining,
            dt,
            rules.bonus_drain_rate,
            rules.points_per_second,
        );
        if bonus.seconds > 0.0 {
            self.state.time_remaining = (self.state.time_remaining - bonus.seconds).max(0.0);
            self.state.player.award(bonus.points);
            events.push(LevelEvent::TimeBonus {
                seconds: bonus.seconds,
                points: bonus.points,
            });
        }
    }

    fn complete(&mut self, events: &mut Vec<LevelEvent>) {
        self.state.complete = true;
        tracing::info!(score = self.score(), reached_exit = self.state.reached_exit, "level complete");
        events.push(LevelEvent::LevelComplete);
    }

    /// Possession commands run once per tick, after every position update.
    /// Depossess wins when both are pressed.
    fn apply_possession_commands(&mut self, input: &FrameInput, events: &mut Vec<LevelEvent>) {
        if !self.is_running() {
            return;
        }
        let outcome = if input.depossess_pressed {
            possession::release(
                &mut self.state.player,
                &mut self.state.enemies,
                &self.grid,
                &self.config.possession,
                &self.config.enemy,
            )
        } else if input.possess_pressed {
            possession::possess(
                &mut self.state.player,
                &mut self.state.enemies,
                self.config.possession.radius,
            )
        } else {
            return;
        };
        match outcome {
            PossessionOutcome::Possessed(id) => events.push(LevelEvent::Possessed(id)),
            PossessionOutcome::Released(id) => events.push(LevelEvent::Released(id)),
            PossessionOutcome::Ignored(_) => {},
        }
    }

    /// Presentation view of the current state.
    pub fn snapshot(&self) -> LevelSnapshot {
        let frozen = !self.is_running();
        let player = &self.state.player;
        LevelSnapshot {
            player: PlayerView {
                x: player.body.x,
                y: player.body.y,
                facing: player.facing(),
                animation: player.animation(),
                possessing: player.possessed_enemy(),
            },
            enemies: self
                .state
                .enemies
                .iter()
                .enumerate()
                .map(|(index, enemy)| EnemyView {
                    id: EnemyId(index),
                    monster: enemy.monster(),
                    x: enemy.x(),
                    y: enemy.y(),
                    facing: enemy.facing(),
                    animation: enemy.animation(frozen),
                    glow: enemy.glow(),
                })
                .collect(),
            tags: self
                .state
                .tags
                .iter()
                .map(|tag| {
                    let (x, y) = tag.position();
                    TagView { x, y, tier: tag.tier }
                })
                .collect(),
            score: self.score(),
            time_remaining: self.state.time_remaining,
            reached_exit: self.state.reached_exit,
            player_alive: player.is_alive(),
            complete: self.state.complete,
        }
    }

    /// World bounds of the whole grid.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.grid.pixel_width(), self.grid.pixel_height())
    }
}

impl Simulation for Level {
    type Input = FrameInput;
    type Event = LevelEvent;

    fn update(&mut self, clock: TickClock, input: &FrameInput) -> Vec<LevelEvent> {
        if self.paused || self.state.complete || !clock.is_valid() {
            return Vec::new();
        }
        let dt = clock.dt;
        let mut events = Vec::new();

        if self.state.reached_exit {
            self.drain_time_bonus(dt, &mut events);
        } else if self.state.player.is_alive() {
            self.state.time_remaining = (self.state.time_remaining - dt).max(0.0);
        }

        let cfg = &self.config.physics;
        let substeps = physics::substeps_for(dt, cfg.max_step_secs, cfg.max_substeps);
        let sub_dt = dt / substeps as f32;
        for index in 0..substeps {
            self.step(&input.for_substep(index), sub_dt, &mut events);
        }

        if self.state.time_remaining <= 0.0 {
            if !self.state.reached_exit {
                self.kill(KillCause::TimeExpired, &mut events);
            }
            self.complete(&mut events);
        } else {
            possession::mark_nearest(
                &self.state.player,
                &mut self.state.enemies,
                self.config.possession.radius,
            );
            self.apply_possession_commands(input, &mut events);
        }

        debug_assert!(possession::invariant_holds(&self.state.player, &self.state.enemies));
        events
    }

    spirit_sim_boilerplate!(state_type: LevelState);
}
