use rand::Rng;
use serde::{Deserialize, Serialize};

use spirit_core::geometry::{Circle, Rect};

use crate::config::TagConfig;

/// Spirit tag value tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagTier {
    One,
    Two,
    Three,
}

impl TagTier {
    pub const ALL: [TagTier; 3] = [TagTier::One, TagTier::Two, TagTier::Three];

    /// Base point value before the tag multiplier.
    pub fn value(self) -> u32 {
        match self {
            TagTier::One => 10,
            TagTier::Two => 20,
            TagTier::Three => 30,
        }
    }

    /// Uniform draw over the three tiers.
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.random_range(1..=3) {
            1 => TagTier::One,
            2 => TagTier::Two,
            _ => TagTier::Three,
        }
    }
}

/// Collectible tag bobbing above its spawn cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub base_x: f32,
    pub base_y: f32,
    pub tier: TagTier,
    /// Vertical bounce offset from the base position.
    pub bounce: f32,
    pub collected: bool,
}

impl Tag {
    pub fn new(base_x: f32, base_y: f32, tier: TagTier) -> Self {
        Self {
            base_x,
            base_y,
            tier,
            bounce: 0.0,
            collected: false,
        }
    }

    /// Bounce phase comes from absolute level time and the tag's x position,
    /// so neighbouring tags bob in a wave.
    pub fn update(&mut self, total_secs: f64, cfg: &TagConfig, tile_height: f32) {
        let t = total_secs * f64::from(cfg.bounce_rate) + f64::from(self.base_x * cfg.bounce_sync);
        self.bounce = t.sin() as f32 * cfg.bounce_height * tile_height;
    }

    pub fn position(&self) -> (f32, f32) {
        (self.base_x, self.base_y + self.bounce)
    }

    pub fn bounding_circle(&self, tile_width: f32) -> Circle {
        let (x, y) = self.position();
        Circle::new(x, y, tile_width / 3.0)
    }

    pub fn touches(&self, rect: &Rect, tile_width: f32) -> bool {
        !self.collected && self.bounding_circle(tile_width).intersects(rect)
    }
}
