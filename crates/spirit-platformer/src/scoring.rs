use crate::tag::TagTier;

/// Points for collecting a tag.
pub fn tag_points(tier: TagTier, multiplier: u32) -> u32 {
    tier.value().saturating_mul(multiplier)
}

/// One tick of the end-of-level time bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBonus {
    /// Whole clock seconds converted this tick.
    pub seconds: f32,
    pub points: u32,
}

/// Convert up to `dt * drain_rate` clock seconds (rounded, at least one) into
/// points, never more than the whole seconds left on the clock.
pub fn time_bonus(time_remaining: f32, dt: f32, drain_rate: f32, points_per_second: u32) -> TimeBonus {
    let available = time_remaining.max(0.0).ceil();
    let seconds = (dt * drain_rate).round().max(1.0).min(available);
    TimeBonus {
        seconds,
        points: (seconds as u32).saturating_mul(points_per_second),
    }
}
