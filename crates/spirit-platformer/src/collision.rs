use serde::{Deserialize, Serialize};

use spirit_core::geometry::Rect;

use crate::tile::{Tile, TileGrid};

/// Distance within which an edge counts as touching a tile boundary.
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Per-axis contact results of one sweep. Recomputed on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFlags {
    /// Stopped by a floor or platform while moving down (or resting on one).
    pub on_ground: bool,
    /// Stopped by an impassable tile while moving up.
    pub hit_ceiling: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
    /// The supporting surface is a one-way platform.
    pub on_platform: bool,
}

/// Corrected anchor position plus contact flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub x: f32,
    pub y: f32,
    pub flags: CollisionFlags,
}

/// Move an entity anchored at `(x, y)` with local bounds `local` by
/// `(dx, dy)` against the grid.
///
/// Horizontal displacement is resolved first at the starting height, then
/// vertical displacement using the corrected x. Each axis sweeps every cell
/// between the start and the proposed end, and the first blocking cell in the
/// direction of travel decides the correction, so fast movers stop flush
/// instead of tunneling or ending up embedded.
pub fn resolve(grid: &TileGrid, x: f32, y: f32, local: &Rect, dx: f32, dy: f32) -> Sweep {
    let dx = if dx.is_finite() { dx } else { 0.0 };
    let dy = if dy.is_finite() { dy } else { 0.0 };
    let mut flags = CollisionFlags::default();

    let bounds = local.translated(x, y);
    let mut new_x = x + dx;
    if dx > 0.0 {
        if let Some(wall) = sweep_right(grid, &bounds, dx) {
            new_x = wall - local.right();
            flags.blocked_right = true;
        }
    } else if dx < 0.0 {
        if let Some(wall) = sweep_left(grid, &bounds, dx) {
            new_x = wall - local.left;
            flags.blocked_left = true;
        }
    } else {
        flags.blocked_right = sweep_right(grid, &bounds, 0.0).is_some();
        flags.blocked_left = sweep_left(grid, &bounds, 0.0).is_some();
    }

    let bounds = local.translated(new_x, y);
    let mut new_y = y + dy;
    if dy < 0.0 {
        if let Some(ceiling) = sweep_up(grid, &bounds, dy) {
            new_y = ceiling - local.top;
            flags.hit_ceiling = true;
        }
    } else if let Some((floor, tile)) = sweep_down(grid, &bounds, dy) {
        new_y = floor - local.bottom();
        flags.on_ground = true;
        flags.on_platform = tile == Tile::Platform;
    }

    debug_assert!(
        new_x.is_finite() && new_y.is_finite(),
        "collision produced a non-finite position ({new_x}, {new_y})"
    );

    Sweep {
        x: new_x,
        y: new_y,
        flags,
    }
}

/// Inclusive range of rows a rectangle strictly overlaps.
fn row_span(grid: &TileGrid, rect: &Rect) -> (i32, i32) {
    (
        grid.row_at(rect.top + CONTACT_EPSILON),
        grid.row_at(rect.bottom() - CONTACT_EPSILON),
    )
}

/// Inclusive range of columns a rectangle strictly overlaps.
fn column_span(grid: &TileGrid, rect: &Rect) -> (i32, i32) {
    (
        grid.column_at(rect.left + CONTACT_EPSILON),
        grid.column_at(rect.right() - CONTACT_EPSILON),
    )
}

fn column_blocks(grid: &TileGrid, column: i32, rows: (i32, i32)) -> bool {
    (rows.0..=rows.1).any(|row| grid.classify(column, row) == Tile::Impassable)
}

/// Left edge of the first impassable column the right edge would run into.
fn sweep_right(grid: &TileGrid, bounds: &Rect, dx: f32) -> Option<f32> {
    let tw = grid.tile_width();
    let right = bounds.right();
    let rows = row_span(grid, bounds);
    let first = ((right - CONTACT_EPSILON) / tw).ceil() as i32;
    // Column `width` is the side wall, so the sweep always terminates there.
    let last = (((right + dx) / tw).floor() as i32).min(grid.width() as i32);
    (first..=last)
        .find(|&column| column_blocks(grid, column, rows))
        .map(|column| column as f32 * tw)
}

/// Right edge of the first impassable column the left edge would run into.
fn sweep_left(grid: &TileGrid, bounds: &Rect, dx: f32) -> Option<f32> {
    let tw = grid.tile_width();
    let left = bounds.left;
    let rows = row_span(grid, bounds);
    let first = ((left + CONTACT_EPSILON) / tw).floor() as i32 - 1;
    let last = ((((left + dx) / tw).ceil() as i32) - 1).max(-1);
    (last..=first)
        .rev()
        .find(|&column| column_blocks(grid, column, rows))
        .map(|column| (column + 1) as f32 * tw)
}

/// Top edge of the first floor or platform row below the feet, with the
/// tile that stopped the fall. Only rows whose top is at or below the feet at
/// the start of the sweep are considered, which makes platforms one-way.
fn sweep_down(grid: &TileGrid, bounds: &Rect, dy: f32) -> Option<(f32, Tile)> {
    let th = grid.tile_height();
    let bottom = bounds.bottom();
    let (first_col, last_col) = column_span(grid, bounds);
    let first = ((bottom - CONTACT_EPSILON) / th).ceil() as i32;
    let last = (((bottom + dy) / th).floor() as i32).min(grid.height() as i32);

    for row in first..=last {
        let mut hit = None;
        for column in first_col..=last_col {
            match grid.classify(column, row) {
                Tile::Impassable => {
                    hit = Some(Tile::Impassable);
                    break;
                },
                Tile::Platform => hit = hit.or(Some(Tile::Platform)),
                Tile::Passable => {},
            }
        }
        if let Some(tile) = hit {
            return Some((row as f32 * th, tile));
        }
    }
    None
}

/// Bottom edge of the first impassable row above the head.
fn sweep_up(grid: &TileGrid, bounds: &Rect, dy: f32) -> Option<f32> {
    let th = grid.tile_height();
    let top = bounds.top;
    let (first_col, last_col) = column_span(grid, bounds);
    let first = ((top + CONTACT_EPSILON) / th).floor() as i32 - 1;
    // Rows above the grid are open sky.
    let last = ((((top + dy) / th).ceil() as i32) - 1).max(0);

    (last..=first)
        .rev()
        .find(|&row| {
            (first_col..=last_col).any(|column| grid.classify(column, row) == Tile::Impassable)
        })
        .map(|row| (row + 1) as f32 * th)
}
