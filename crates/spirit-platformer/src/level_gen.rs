use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::campaign::LevelSource;
use crate::config::GenerationConfig;
use crate::enemy::MonsterType;
use crate::tag::TagTier;
use crate::tile::{Tile, TileGrid};
use crate::{LevelData, LevelError, Spawn, SpawnKind};

/// Narrowest chunk every pattern fits in.
const MIN_CHUNK_WIDTH: u32 = 10;
/// Lowest level every pattern fits in.
const MIN_HEIGHT: u32 = 9;
/// Solid rows at the bottom of the level.
const FLOOR_ROWS: u32 = 2;

/// Grid plus spawn list under construction.
struct Builder {
    grid: TileGrid,
    spawns: Vec<Spawn>,
}

impl Builder {
    fn solid(&mut self, column: u32, row: u32) {
        self.grid.set(column, row, Tile::Impassable);
    }

    fn spawn(&mut self, kind: SpawnKind, column: u32, row: u32) {
        self.spawns.push(Spawn { kind, column, row });
    }

    fn tag(&mut self, rng: &mut StdRng, column: u32, row: u32) {
        self.spawn(SpawnKind::Tag(Some(TagTier::random(rng))), column, row);
    }

    fn enemy(&mut self, rng: &mut StdRng, column: u32, row: u32) {
        let monster = MonsterType::ALL[rng.random_range(0..MonsterType::ALL.len())];
        self.spawn(SpawnKind::Enemy(monster), column, row);
    }
}

/// Generate a deterministic level from a seed.
///
/// Layout: a flat start chunk, `config.chunks` random chunks, then a flat exit
/// chunk. Standing row is the one just above the floor.
pub fn generate_level(seed: u64, config: &GenerationConfig) -> Result<LevelData, LevelError> {
    let chunk_width = config.chunk_width.max(MIN_CHUNK_WIDTH);
    let height = config.height.max(MIN_HEIGHT);
    let width = chunk_width * (config.chunks + 2);
    let grid = TileGrid::filled(
        width,
        height,
        config.tile_width,
        config.tile_height,
        Tile::Passable,
    )?;
    let mut level = Builder {
        grid,
        spawns: Vec::new(),
    };
    let mut rng = StdRng::seed_from_u64(seed);

    for row in height - FLOOR_ROWS..height {
        for column in 0..width {
            level.solid(column, row);
        }
    }

    let ground = height - FLOOR_ROWS - 1;
    level.spawn(SpawnKind::PlayerStart, 1, ground);

    for chunk_idx in 1..=config.chunks {
        generate_chunk(&mut level, &mut rng, chunk_idx * chunk_width, chunk_width, ground);
    }

    level.spawn(SpawnKind::Exit, width - 3, ground);

    tracing::debug!(seed, width, height, spawns = level.spawns.len(), "level generated");
    Ok(LevelData {
        grid: level.grid,
        spawns: level.spawns,
    })
}

fn generate_chunk(level: &mut Builder, rng: &mut StdRng, base_x: u32, chunk_width: u32, ground: u32) {
    let pattern = rng.random_range(0u8..5);

    match pattern {
        0 => {
            // Pit through the floor, with a tag over the gap
            let pit_start = base_x + rng.random_range(3..chunk_width - 5);
            let pit_width = rng.random_range(2..4);
            for column in pit_start..pit_start + pit_width {
                for row in ground + 1..=ground + FLOOR_ROWS {
                    level.grid.set(column, row, Tile::Passable);
                }
            }
            level.tag(rng, pit_start + pit_width / 2, ground - 2);
        },
        1 => {
            // Raised one-way platforms with tags on top
            let plat_row = ground - rng.random_range(2u32..5);
            let plat_start = base_x + rng.random_range(1..4);
            let plat_len = rng.random_range(3..6);
            for column in plat_start..plat_start + plat_len {
                level.grid.set(column, plat_row, Tile::Platform);
            }
            level.tag(rng, plat_start + 1, plat_row - 1);
            level.tag(rng, plat_start + plat_len - 1, plat_row - 1);
        },
        2 => {
            // Staircase going up, tag on the top step
            for step in 0..4u32 {
                let column = base_x + 1 + step * 2;
                for row in ground - step..=ground {
                    level.solid(column, row);
                    level.solid(column + 1, row);
                }
            }
            level.tag(rng, base_x + 7, ground - 4);
        },
        3 => {
            // Patrol arena between two low walls
            let left = base_x + 1;
            let right = base_x + chunk_width - 2;
            level.solid(left, ground);
            level.solid(right, ground);
            level.enemy(rng, (left + right) / 2, ground);
            level.tag(rng, (left + right) / 2, ground - 3);
        },
        _ => {
            // Solid ledge with an enemy patrolling its top
            let ledge_row = ground - 2;
            let ledge_start = base_x + rng.random_range(2..4);
            let ledge_len = rng.random_range(4..7);
            for column in ledge_start..ledge_start + ledge_len {
                level.solid(column, ledge_row);
            }
            level.enemy(rng, ledge_start + ledge_len / 2, ledge_row - 1);
            level.tag(rng, ledge_start, ground);
        },
    }
}

/// Campaign of generated levels; level `i` uses `seed + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLevels {
    pub seed: u64,
    pub config: GenerationConfig,
}

impl GeneratedLevels {
    pub fn new(seed: u64, config: GenerationConfig) -> Self {
        Self { seed, config }
    }
}

impl LevelSource for GeneratedLevels {
    fn level_count(&self) -> usize {
        self.config.campaign_length as usize
    }

    fn load(&self, index: usize) -> Result<LevelData, LevelError> {
        if index >= self.level_count() {
            return Err(LevelError::UnknownLevel(index));
        }
        generate_level(self.seed.wrapping_add(index as u64), &self.config)
    }
}
