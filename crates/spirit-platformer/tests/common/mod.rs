use spirit_core::geometry::Rect;
use spirit_core::input::{FrameInput, MoveIntent};
use spirit_core::sim_trait::Simulation;
use spirit_core::time::TickClock;

use spirit_platformer::config::PlatformerConfig;
use spirit_platformer::enemy::MonsterType;
use spirit_platformer::tag::TagTier;
use spirit_platformer::tile::{Tile, TileGrid};
use spirit_platformer::{Level, LevelData, Spawn, SpawnKind};

pub const TILE: f32 = 32.0;
pub const DT: f32 = 1.0 / 60.0;

/// Grid from ASCII rows with square `TILE` cells: `#` impassable, `-`
/// platform, anything else passable.
pub fn grid(rows: &[&str]) -> TileGrid {
    let width = rows.first().map_or(0, |r| r.len()) as u32;
    let tiles = rows
        .iter()
        .flat_map(|row| row.chars())
        .map(|c| match c {
            '#' => Tile::Impassable,
            '-' => Tile::Platform,
            _ => Tile::Passable,
        })
        .collect();
    TileGrid::new(width, rows.len() as u32, TILE, TILE, tiles).unwrap()
}

/// Level data from ASCII rows. Spawns: `P` start, `X` exit, `S`/`L`/`D`
/// enemies, `1`-`3` fixed tags, `T` random tag.
pub fn level_data(rows: &[&str]) -> LevelData {
    let mut spawns = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        for (column, c) in line.chars().enumerate() {
            let kind = match c {
                'P' => SpawnKind::PlayerStart,
                'X' => SpawnKind::Exit,
                'S' => SpawnKind::Enemy(MonsterType::Sushi),
                'L' => SpawnKind::Enemy(MonsterType::Lantern),
                'D' => SpawnKind::Enemy(MonsterType::Sandals),
                '1' => SpawnKind::Tag(Some(TagTier::One)),
                '2' => SpawnKind::Tag(Some(TagTier::Two)),
                '3' => SpawnKind::Tag(Some(TagTier::Three)),
                'T' => SpawnKind::Tag(None),
                _ => continue,
            };
            spawns.push(Spawn {
                kind,
                column: column as u32,
                row: row as u32,
            });
        }
    }
    LevelData {
        grid: grid(rows),
        spawns,
    }
}

pub fn level(rows: &[&str], config: PlatformerConfig, seed: u64) -> Level {
    Level::new(level_data(rows), config, seed).unwrap()
}

pub fn moving(movement: MoveIntent) -> FrameInput {
    FrameInput {
        movement,
        ..Default::default()
    }
}

/// One 60 Hz tick.
pub fn tick<S: Simulation>(sim: &mut S, input: &S::Input) -> Vec<S::Event> {
    sim.update(TickClock::with_dt(DT), input)
}

/// True if `rect`, shrunk by a hair, overlaps any impassable cell.
pub fn overlaps_solid(grid: &TileGrid, rect: &Rect) -> bool {
    let inner = Rect::new(rect.left + 0.01, rect.top + 0.01, rect.width - 0.02, rect.height - 0.02);
    let (c0, c1) = (grid.column_at(inner.left), grid.column_at(inner.right()));
    let (r0, r1) = (grid.row_at(inner.top), grid.row_at(inner.bottom()));
    (r0..=r1).any(|row| {
        (c0..=c1).any(|column| {
            grid.contains_cell(column, row)
                && grid.classify(column, row) == Tile::Impassable
                && grid.cell_bounds(column, row).intersects(&inner)
        })
    })
}
