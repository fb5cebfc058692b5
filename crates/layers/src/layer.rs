use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server implementation a layer is served by, e.g. `qgis` or `geoserver`.
///
/// Used to look up dialect-specific request tuning; compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ServerDialect(String);

impl ServerDialect {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    pub fn qgis() -> Self {
        Self::new("qgis")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ServerDialect {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<ServerDialect> for String {
    fn from(d: ServerDialect) -> Self {
        d.0
    }
}

/// Zoom window a layer is shown in: `min_zoom < zoom <= max_zoom`.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
}

impl ZoomRange {
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom: Some(min_zoom),
            max_zoom: Some(max_zoom),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, zoom: f64) -> bool {
        let above_min = self.min_zoom.is_none_or(|min| min < zoom);
        let below_max = self.max_zoom.is_none_or(|max| zoom <= max);
        above_min && below_max
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubLayerInfo {
    #[serde(default)]
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_template: Option<String>,
    /// Only sub-layers explicitly flagged queryable are ever queried.
    #[serde(default)]
    pub queryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl SubLayerInfo {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            queryable: true,
            ..Default::default()
        }
    }

    pub fn with_detail_template(mut self, template: impl Into<String>) -> Self {
        self.detail_template = Some(template.into());
        self
    }

    pub fn queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }
}

/// A remote map-service layer as the registry currently knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub id: LayerId,
    #[serde(default)]
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_template: Option<String>,
    /// Service endpoint; query parameters already on it are preserved.
    pub url: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub queryable: bool,
    #[serde(flatten)]
    pub zoom: ZoomRange,
    /// Present for group layers; keyed by sub-layer id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_layers: Option<BTreeMap<String, SubLayerInfo>>,
    /// Live `LAYERS` parameter: comma-separated ids currently turned on.
    #[serde(default)]
    pub active_sublayers: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_dialect: Option<ServerDialect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_format: Option<String>,
}

fn default_version() -> String {
    "1.3.0".to_string()
}

fn default_true() -> bool {
    true
}

impl LayerDescriptor {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(id),
            caption: String::new(),
            detail_template: None,
            url: url.into(),
            version: default_version(),
            visible: true,
            queryable: true,
            zoom: ZoomRange::unbounded(),
            sub_layers: None,
            active_sublayers: String::new(),
            server_dialect: None,
            info_format: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_zoom(mut self, zoom: ZoomRange) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_active(mut self, active: impl Into<String>) -> Self {
        self.active_sublayers = active.into();
        self
    }

    pub fn with_sub_layer(mut self, id: impl Into<String>, info: SubLayerInfo) -> Self {
        self.sub_layers
            .get_or_insert_with(BTreeMap::new)
            .insert(id.into(), info);
        self
    }

    pub fn with_dialect(mut self, dialect: ServerDialect) -> Self {
        self.server_dialect = Some(dialect);
        self
    }

    pub fn sub_layer(&self, id: &str) -> Option<&SubLayerInfo> {
        self.sub_layers.as_ref().and_then(|m| m.get(id))
    }

    /// Ids currently turned on, in parameter order.
    pub fn active_ids(&self) -> Vec<String> {
        parse_layer_list(&self.active_sublayers)
    }
}

/// Splits a comma-separated layer list, dropping blanks.
pub fn parse_layer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
