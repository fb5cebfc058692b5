use foundation::bounds::Aabb2;
use foundation::math::{Vec2, distance_to_segment};
use serde::{Deserialize, Serialize};

/// Feature geometry in map units, GeoJSON-shaped on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Vec2),
    MultiPoint(Vec<Vec2>),
    LineString(Vec<Vec2>),
    MultiLineString(Vec<Vec<Vec2>>),
    /// Outer ring first, then holes.
    Polygon(Vec<Vec<Vec2>>),
    MultiPolygon(Vec<Vec<Vec<Vec2>>>),
}

impl Geometry {
    pub fn bounds(&self) -> Option<Aabb2> {
        match self {
            Geometry::Point(p) => Aabb2::from_points(std::iter::once(p)),
            Geometry::MultiPoint(pts) | Geometry::LineString(pts) => Aabb2::from_points(pts),
            Geometry::MultiLineString(parts) | Geometry::Polygon(parts) => {
                Aabb2::from_points(parts.iter().flatten())
            }
            Geometry::MultiPolygon(polys) => Aabb2::from_points(polys.iter().flatten().flatten()),
        }
    }

    /// Distance from `p` to this geometry; zero when `p` lies inside an area.
    ///
    /// Returns `None` for geometries without any vertex.
    pub fn distance_to(&self, p: Vec2) -> Option<f64> {
        match self {
            Geometry::Point(q) => Some(p.distance(*q)),
            Geometry::MultiPoint(pts) => min_distance(pts.iter().map(|q| p.distance(*q))),
            Geometry::LineString(line) => line_distance(p, line),
            Geometry::MultiLineString(lines) => {
                min_distance(lines.iter().filter_map(|l| line_distance(p, l)))
            }
            Geometry::Polygon(rings) => polygon_distance(p, rings),
            Geometry::MultiPolygon(polys) => {
                min_distance(polys.iter().filter_map(|rings| polygon_distance(p, rings)))
            }
        }
    }
}

fn min_distance(it: impl Iterator<Item = f64>) -> Option<f64> {
    it.fold(None, |best, d| match best {
        Some(b) if b <= d => Some(b),
        _ => Some(d),
    })
}

fn line_distance(p: Vec2, line: &[Vec2]) -> Option<f64> {
    match line {
        [] => None,
        [only] => Some(p.distance(*only)),
        _ => min_distance(line.windows(2).map(|w| distance_to_segment(p, w[0], w[1]))),
    }
}

fn polygon_distance(p: Vec2, rings: &[Vec<Vec2>]) -> Option<f64> {
    let outer = rings.first()?;
    let inside_outer = ring_contains(outer, p);
    let in_hole = rings[1..].iter().any(|hole| ring_contains(hole, p));
    if inside_outer && !in_hole {
        return Some(0.0);
    }
    // Rings are treated as closed even when the closing vertex is omitted.
    min_distance(rings.iter().filter_map(|ring| {
        let first = *ring.first()?;
        let edge = line_distance(p, ring)?;
        let closing = ring.last().map(|last| distance_to_segment(p, *last, first));
        Some(closing.map_or(edge, |c| c.min(edge)))
    }))
}

/// Even-odd point-in-ring test.
pub fn ring_contains(ring: &[Vec2], p: Vec2) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
