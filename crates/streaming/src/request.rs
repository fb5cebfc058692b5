use foundation::math::Vec2;
use layers::{LayerDescriptor, LayerId, QueryTargets, ServerDialect, resolve_query_targets};
use serde::{Deserialize, Serialize};

use crate::config::{DialectTuning, QueryConfig};

/// Where the user pointed, in the current view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    /// Map coordinate in `crs` units.
    pub coordinate: Vec2,
    /// Map units per pixel.
    pub resolution: f64,
    /// Reference system code, e.g. `EPSG:3857`.
    pub crs: String,
}

impl QueryPoint {
    pub fn new(coordinate: Vec2, resolution: f64, crs: impl Into<String>) -> Self {
        Self {
            coordinate,
            resolution,
            crs: crs.into(),
        }
    }
}

/// One remote feature-info query, built fresh per point event.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub layer_id: LayerId,
    /// Service endpoint; may already carry query parameters.
    pub url: String,
    pub version: String,
    pub point: QueryPoint,
    pub targets: QueryTargets,
    pub info_format: String,
    pub feature_count: u32,
    pub dialect: Option<ServerDialect>,
    pub tuning: Option<DialectTuning>,
    /// `point.crs` is configured as north/east.
    pub north_east_axes: bool,
}

impl QueryRequest {
    pub fn query_layers(&self) -> String {
        self.targets.query_layers.join(",")
    }
}

/// Builds the query for `layer`, or `None` when it has nothing to query.
pub fn build_query(
    layer: &LayerDescriptor,
    point: &QueryPoint,
    config: &QueryConfig,
) -> Option<QueryRequest> {
    let targets = resolve_query_targets(layer)?;
    let info_format = layer
        .info_format
        .clone()
        .unwrap_or_else(|| config.info_format.clone());

    Some(QueryRequest {
        layer_id: layer.id.clone(),
        url: layer.url.clone(),
        version: layer.version.clone(),
        point: point.clone(),
        targets,
        info_format,
        feature_count: config.feature_count,
        dialect: layer.server_dialect.clone(),
        tuning: config.tuning_for(layer.server_dialect.as_ref()).cloned(),
        north_east_axes: config.is_north_east(&point.crs),
    })
}

/// Builds queries for `layers` in order, dropping the ones with nothing to query.
pub fn build_queries<'a>(
    layers: impl IntoIterator<Item = &'a LayerDescriptor>,
    point: &QueryPoint,
    config: &QueryConfig,
) -> Vec<QueryRequest> {
    layers
        .into_iter()
        .filter_map(|layer| build_query(layer, point, config))
        .collect()
}
