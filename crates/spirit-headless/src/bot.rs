use spirit_core::input::{FrameInput, MoveIntent};
use spirit_core::sim_trait::Simulation;
use spirit_platformer::Level;
use spirit_platformer::tile::Tile;

/// Frames a jump button stays held.
const JUMP_HOLD_FRAMES: u32 = 20;
/// Frames spent riding a host before letting go.
const RIDE_FRAMES: u32 = 180;

/// Scripted player: runs right, jumps at walls and ledges, possesses any
/// enemy that glows and lets go after a while.
#[derive(Debug, Default)]
pub struct Bot {
    jump_frames: u32,
    ride_frames: u32,
}

impl Bot {
    /// Input for the next tick and whether to press continue.
    pub fn decide(&mut self, level: &Level) -> (FrameInput, bool) {
        if level.is_complete() || !level.player_alive() {
            *self = Self::default();
            return (FrameInput::default(), true);
        }

        let player = level.player();
        let mut input = FrameInput {
            movement: MoveIntent::Right,
            ..Default::default()
        };

        if player.is_on_ground() && (player.flags().blocked_right || ledge_ahead(level)) {
            input.jump_pressed = true;
            self.jump_frames = JUMP_HOLD_FRAMES;
        }
        if self.jump_frames > 0 {
            input.jump_held = true;
            self.jump_frames -= 1;
        }

        if player.is_possessing() {
            self.ride_frames += 1;
            if self.ride_frames >= RIDE_FRAMES {
                input.depossess_pressed = true;
                self.ride_frames = 0;
            }
        } else if level.enemies().iter().any(|e| e.glow()) {
            input.possess_pressed = true;
        }

        (input, false)
    }
}

/// No floor under the cell just ahead of the player's feet.
fn ledge_ahead(level: &Level) -> bool {
    let grid = level.grid();
    let rect = level.player().bounding_rect();
    let column = grid.column_at(rect.right() + grid.tile_width() / 2.0);
    let row = grid.row_at(rect.bottom() + 1.0);
    grid.classify(column, row) == Tile::Passable
}
