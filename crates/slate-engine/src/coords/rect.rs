use super::Vec2;

/// Axis-aligned rectangle, origin at the top-left in a y-down space.
///
/// A negative width or height only means something to
/// `DrawingContext::draw_scaled_sub_image`, which turns it into a mirror.
/// Everywhere else such a rectangle is empty.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { origin: Vec2::new(x, y), size: Vec2::new(w, h) }
    }

    /// Bounding box of `points`; the default rect when there are none.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut iter = points.iter();
        let Some(&first) = iter.next() else {
            return Self::default();
        };
        let (lo, hi) = iter.fold((first, first), |(lo, hi), p| {
            (
                Vec2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Vec2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        });
        Self { origin: lo, size: hi - lo }
    }

    /// Bottom-right corner.
    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    /// Top-left, top-right, bottom-right, bottom-left. Used as a polygon
    /// these wind clockwise on screen.
    pub fn corners(self) -> [Vec2; 4] {
        let (lo, hi) = (self.origin, self.max());
        [lo, Vec2::new(hi.x, lo.y), hi, Vec2::new(lo.x, hi.y)]
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// `origin <= p < max` on both axes. Empty rectangles contain nothing.
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let hi = self.max();
        p.x >= self.origin.x && p.y >= self.origin.y && p.x < hi.x && p.y < hi.y
    }
}
