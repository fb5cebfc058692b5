use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// Normalized feature produced by response decoding or local picking.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, rename = "properties")]
    pub attributes: Map<String, Value>,
}

impl FeatureRecord {
    pub fn new(
        id: Option<String>,
        geometry: Option<Geometry>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            id,
            geometry,
            attributes,
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
