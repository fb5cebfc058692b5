use std::collections::BTreeMap;

use layers::ServerDialect;
use serde::{Deserialize, Serialize};

/// Extra request parameters for one server dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectTuning {
    /// Sent as `FI_POINT_TOLERANCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_tolerance_px: Option<u32>,
    /// Sent as `FI_LINE_TOLERANCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_tolerance_px: Option<u32>,
    /// Sent as `FI_POLYGON_TOLERANCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon_tolerance_px: Option<u32>,
    /// Sends `WITH_GEOMETRY=TRUE`.
    #[serde(default)]
    pub with_geometry: bool,
    /// Free-form parameters appended after the ones above.
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,
}

impl DialectTuning {
    /// QGIS Server needs enlarged tolerances and asks for geometry explicitly.
    pub fn qgis() -> Self {
        Self {
            point_tolerance_px: Some(16),
            line_tolerance_px: Some(8),
            polygon_tolerance_px: Some(4),
            with_geometry: true,
            extra_params: BTreeMap::new(),
        }
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let tolerances = [
            ("FI_POINT_TOLERANCE", self.point_tolerance_px),
            ("FI_LINE_TOLERANCE", self.line_tolerance_px),
            ("FI_POLYGON_TOLERANCE", self.polygon_tolerance_px),
        ];
        for (key, value) in tolerances {
            if let Some(px) = value {
                out.push((key.to_string(), px.to_string()));
            }
        }
        if self.with_geometry {
            out.push(("WITH_GEOMETRY".to_string(), "TRUE".to_string()));
        }
        out.extend(self.extra_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

/// Configuration for remote feature-info queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    /// Upper bound on features per response (`FEATURE_COUNT`).
    #[serde(default = "default_feature_count")]
    pub feature_count: u32,

    /// Encoding requested when a layer does not override it.
    #[serde(default = "default_info_format")]
    pub info_format: String,

    /// Per-request timeout; a request still pending after it becomes a failure.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Tuning keyed by server dialect. Unknown dialects get no extra parameters.
    #[serde(default = "default_dialects")]
    pub dialects: BTreeMap<ServerDialect, DialectTuning>,

    /// CRS codes whose WMS 1.3.0 axis order is north/east; their `BBOX`
    /// is sent latitude first.
    #[serde(default = "default_north_east_crs")]
    pub north_east_crs: Vec<String>,
}

fn default_feature_count() -> u32 {
    100
}

fn default_info_format() -> String {
    "application/json".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_dialects() -> BTreeMap<ServerDialect, DialectTuning> {
    BTreeMap::from([(ServerDialect::qgis(), DialectTuning::qgis())])
}

fn default_north_east_crs() -> Vec<String> {
    ["EPSG:4326", "EPSG:4258", "EPSG:3035"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            feature_count: default_feature_count(),
            info_format: default_info_format(),
            request_timeout_ms: default_request_timeout_ms(),
            dialects: default_dialects(),
            north_east_crs: default_north_east_crs(),
        }
    }
}

impl QueryConfig {
    pub fn tuning_for(&self, dialect: Option<&ServerDialect>) -> Option<&DialectTuning> {
        dialect.and_then(|d| self.dialects.get(d))
    }

    pub fn is_north_east(&self, crs: &str) -> bool {
        self.north_east_crs.iter().any(|c| c.eq_ignore_ascii_case(crs))
    }
}
