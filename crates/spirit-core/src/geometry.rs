use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units. Screen convention: y grows downward,
/// so `top < bottom()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Local bounds for an entity anchored at its bottom-center (feet).
    pub fn anchored_bottom_center(width: f32, height: f32) -> Self {
        Self::new(-width / 2.0, -height, width, height)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// Move a local rectangle to world space at anchor `(x, y)`.
    pub fn translated(&self, x: f32, y: f32) -> Self {
        Self::new(self.left + x, self.top + y, self.width, self.height)
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// Circle used for pickup bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Whether the circle and rectangle overlap, using the rectangle point
    /// closest to the circle's center.
    pub fn intersects(&self, rect: &Rect) -> bool {
        let nearest_x = self.x.clamp(rect.left, rect.right());
        let nearest_y = self.y.clamp(rect.top, rect.bottom());
        let dx = self.x - nearest_x;
        let dy = self.y - nearest_y;
        dx * dx + dy * dy < self.radius * self.radius
    }
}

/// Euclidean distance between two points.
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_bounds_sit_above_feet() {
        let local = Rect::anchored_bottom_center(20.0, 40.0);
        let world = local.translated(100.0, 64.0);
        assert_eq!(world.left, 90.0);
        assert_eq!(world.right(), 110.0);
        assert_eq!(world.bottom(), 64.0);
        assert_eq!(world.top, 24.0);
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(9.5, 5.0, 10.0, 10.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn circle_hits_rect_corner_only_when_close() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(Circle::new(12.0, 12.0, 3.0).intersects(&rect));
        assert!(!Circle::new(13.0, 13.0, 3.0).intersects(&rect));
        assert!(Circle::new(5.0, 5.0, 1.0).intersects(&rect));
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance(3.0, 4.0, 0.0, 0.0), 5.0);
    }
}
