use crate::math::Vec2;

/// Axis-aligned extent in map units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Square extent of `size_px` pixels centred on `center`.
    pub fn around(center: Vec2, resolution: f64, size_px: u32) -> Self {
        let half = resolution * f64::from(size_px) / 2.0;
        Aabb2::new([center.x - half, center.y - half], [center.x + half, center.y + half])
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut b = Aabb2::new([first.x, first.y], [first.x, first.y]);
        for p in it {
            b.min[0] = b.min[0].min(p.x);
            b.min[1] = b.min[1].min(p.y);
            b.max[0] = b.max[0].max(p.x);
            b.max[1] = b.max[1].max(p.y);
        }
        Some(b)
    }

    pub fn expand(self, by: f64) -> Self {
        Aabb2::new(
            [self.min[0] - by, self.min[1] - by],
            [self.max[0] + by, self.max[1] + by],
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.y >= self.min[1] && p.y <= self.max[1]
    }
}
