use serde::{Deserialize, Serialize};

use spirit_core::geometry::Rect;

/// Collision classification of a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    /// Does not block anything.
    #[default]
    Passable,
    /// Blocks from every side.
    Impassable,
    /// One-way: passable from below and the sides, solid when landed on from
    /// above.
    Platform,
}

/// Error building a [`TileGrid`].
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// `tiles.len()` does not equal `width * height`.
    SizeMismatch { expected: usize, actual: usize },
    /// Zero columns/rows or a non-positive cell size.
    InvalidDimensions,
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "tile grid expects {expected} cells, got {actual}")
            },
            Self::InvalidDimensions => write!(f, "tile grid dimensions must be positive"),
        }
    }
}

impl std::error::Error for GridError {}

/// Immutable-per-level grid of tile classifications.
///
/// Row 0 is the top row; rows grow downward like world y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Width in tiles.
    width: u32,
    /// Height in tiles.
    height: u32,
    /// Cell width in world units.
    tile_width: f32,
    /// Cell height in world units.
    tile_height: f32,
    /// Tile data stored row-major (row * width + column).
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(
        width: u32,
        height: u32,
        tile_width: f32,
        tile_height: f32,
        tiles: Vec<Tile>,
    ) -> Result<Self, GridError> {
        if width == 0
            || height == 0
            || !(tile_width.is_finite() && tile_width > 0.0)
            || !(tile_height.is_finite() && tile_height > 0.0)
        {
            return Err(GridError::InvalidDimensions);
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            tiles,
        })
    }

    /// Grid with every cell set to `tile`.
    pub fn filled(
        width: u32,
        height: u32,
        tile_width: f32,
        tile_height: f32,
        tile: Tile,
    ) -> Result<Self, GridError> {
        Self::new(
            width,
            height,
            tile_width,
            tile_height,
            vec![tile; width as usize * height as usize],
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_width
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_height
    }

    /// Collision class of a cell. Columns outside the grid are walls, rows
    /// above the grid are open sky, rows below the grid are solid floor.
    pub fn classify(&self, column: i32, row: i32) -> Tile {
        if column < 0 || column >= self.width as i32 {
            return Tile::Impassable;
        }
        if row < 0 {
            return Tile::Passable;
        }
        if row >= self.height as i32 {
            return Tile::Impassable;
        }
        self.tiles[row as usize * self.width as usize + column as usize]
    }

    /// Overwrite an in-bounds cell. Used while building a level, before the
    /// grid is handed to a `Level`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, column: u32, row: u32, tile: Tile) {
        if column < self.width && row < self.height {
            self.tiles[row as usize * self.width as usize + column as usize] = tile;
        }
    }

    /// World rectangle covered by a cell.
    pub fn cell_bounds(&self, column: i32, row: i32) -> Rect {
        Rect::new(
            column as f32 * self.tile_width,
            row as f32 * self.tile_height,
            self.tile_width,
            self.tile_height,
        )
    }

    /// Column containing world x.
    pub fn column_at(&self, x: f32) -> i32 {
        (x / self.tile_width).floor() as i32
    }

    /// Row containing world y.
    pub fn row_at(&self, y: f32) -> i32 {
        (y / self.tile_height).floor() as i32
    }

    /// Bottom-center world point of a cell, where grounded entities spawn.
    pub fn cell_bottom_center(&self, column: i32, row: i32) -> (f32, f32) {
        let bounds = self.cell_bounds(column, row);
        (bounds.center_x(), bounds.bottom())
    }

    /// Center world point of a cell.
    pub fn cell_center(&self, column: i32, row: i32) -> (f32, f32) {
        let bounds = self.cell_bounds(column, row);
        (bounds.center_x(), bounds.center_y())
    }

    pub fn contains_cell(&self, column: i32, row: i32) -> bool {
        column >= 0 && row >= 0 && column < self.width as i32 && row < self.height as i32
    }
}
