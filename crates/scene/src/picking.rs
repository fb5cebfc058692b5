use foundation::math::Vec2;

use crate::feature::FeatureRecord;
use crate::world::{LocalLayerRole, LocalScene};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    /// Hit radius in screen pixels.
    pub tolerance_px: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self { tolerance_px: 10.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub layer_id: String,
    pub distance: f64,
    pub feature: FeatureRecord,
}

/// Local hits partitioned by the layer role they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalHits {
    pub search_results: Vec<PickHit>,
    pub vector: Vec<PickHit>,
}

impl LocalHits {
    pub fn is_empty(&self) -> bool {
        self.search_results.is_empty() && self.vector.is_empty()
    }

    pub fn len(&self) -> usize {
        self.search_results.len() + self.vector.len()
    }
}

/// Pixel-tolerance hit test over client-held vector layers.
///
/// `resolution` is map units per pixel of the current view, so the hit radius in
/// map units is `tolerance_px * resolution`.
///
/// Ordering contract:
/// - Hits follow layer order, then feature order within the layer.
///
/// Notes:
/// - Hidden layers are never hit.
/// - `Vector` layers must be flagged queryable; the search-results layer always is.
/// - Features without geometry are ignored.
pub fn pick_features(
    scene: &LocalScene,
    coordinate: Vec2,
    resolution: f64,
    opts: PickOptions,
) -> LocalHits {
    let mut out = LocalHits::default();
    let tolerance = opts.tolerance_px.max(0.0) * resolution;
    if !coordinate.is_finite() || !tolerance.is_finite() {
        return out;
    }

    for layer in scene.layers() {
        if !layer.visible {
            continue;
        }
        let bucket = match layer.role {
            LocalLayerRole::SearchResults => &mut out.search_results,
            LocalLayerRole::Vector if layer.queryable => &mut out.vector,
            LocalLayerRole::Vector => continue,
        };

        for feature in &layer.features {
            let Some(geom) = &feature.geometry else {
                continue;
            };
            let Some(bounds) = geom.bounds() else {
                continue;
            };
            if !bounds.expand(tolerance).contains(coordinate) {
                continue;
            }
            let Some(distance) = geom.distance_to(coordinate) else {
                continue;
            };
            if distance <= tolerance {
                bucket.push(PickHit {
                    layer_id: layer.id.clone(),
                    distance,
                    feature: feature.clone(),
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, pick_features};
    use crate::feature::FeatureRecord;
    use crate::geometry::Geometry;
    use crate::world::{LocalLayer, LocalLayerRole, LocalScene};
    use foundation::math::Vec2;

    fn point(id: &str, x: f64, y: f64) -> FeatureRecord {
        FeatureRecord {
            id: Some(id.to_string()),
            geometry: Some(Geometry::Point(Vec2::new(x, y))),
            ..Default::default()
        }
    }

    #[test]
    fn tolerance_scales_with_resolution() {
        let mut scene = LocalScene::new();
        scene.insert(
            LocalLayer::new("pois", LocalLayerRole::Vector)
                .queryable(true)
                .with_features(vec![point("near", 15.0, 0.0)]),
        );

        // 10px at 1 unit/px does not reach 15 units away.
        let hits = pick_features(&scene, Vec2::new(0.0, 0.0), 1.0, PickOptions::default());
        assert!(hits.is_empty());

        // At 2 units/px the radius is 20 units.
        let hits = pick_features(&scene, Vec2::new(0.0, 0.0), 2.0, PickOptions::default());
        assert_eq!(hits.vector.len(), 1);
        assert_eq!(hits.vector[0].distance, 15.0);
    }

    #[test]
    fn partitions_by_role_and_skips_hidden_and_unqueryable() {
        let mut scene = LocalScene::new();
        scene.insert(
            LocalLayer::new("search", LocalLayerRole::SearchResults)
                .with_features(vec![point("s1", 1.0, 1.0)]),
        );
        scene.insert(
            LocalLayer::new("plain", LocalLayerRole::Vector)
                .with_features(vec![point("p", 0.0, 0.0)]),
        );
        scene.insert(
            LocalLayer::new("hidden", LocalLayerRole::Vector)
                .queryable(true)
                .with_features(vec![point("h", 0.0, 0.0)]),
        );
        scene.set_visible("hidden", false);
        scene.insert(
            LocalLayer::new("pois", LocalLayerRole::Vector)
                .queryable(true)
                .with_features(vec![point("a", 2.0, 0.0), point("b", 0.0, 3.0)]),
        );

        let hits = pick_features(&scene, Vec2::new(0.0, 0.0), 1.0, PickOptions::default());
        assert_eq!(hits.search_results.len(), 1);
        assert_eq!(hits.search_results[0].layer_id, "search");

        let ids: Vec<&str> = hits
            .vector
            .iter()
            .filter_map(|h| h.feature.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn polygon_interior_hits_at_zero_distance() {
        let ring = vec![
            Vec2::new(-100.0, -100.0),
            Vec2::new(100.0, -100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(-100.0, 100.0),
        ];
        let mut scene = LocalScene::new();
        scene.insert(
            LocalLayer::new("areas", LocalLayerRole::Vector)
                .queryable(true)
                .with_features(vec![FeatureRecord {
                    geometry: Some(Geometry::Polygon(vec![ring])),
                    ..Default::default()
                }]),
        );
        let hits = pick_features(&scene, Vec2::new(0.0, 0.0), 1.0, PickOptions::default());
        assert_eq!(hits.vector.len(), 1);
        assert_eq!(hits.vector[0].distance, 0.0);
    }
}
