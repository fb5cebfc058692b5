use serde::{Deserialize, Serialize};

use crate::feature::FeatureRecord;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocalLayerRole {
    /// The ephemeral layer holding the latest search results.
    SearchResults,
    #[default]
    Vector,
}

/// Vector data already resident on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalLayer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub queryable: bool,
    #[serde(default)]
    pub role: LocalLayerRole,
    #[serde(default)]
    pub features: Vec<FeatureRecord>,
}

fn default_true() -> bool {
    true
}

impl LocalLayer {
    pub fn new(id: impl Into<String>, role: LocalLayerRole) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            visible: true,
            queryable: false,
            role,
            features: Vec::new(),
        }
    }

    pub fn queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }

    pub fn with_features(mut self, features: Vec<FeatureRecord>) -> Self {
        self.features = features;
        self
    }
}

/// Ordered set of client-side vector layers, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalScene {
    #[serde(default)]
    layers: Vec<LocalLayer>,
}

impl LocalScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `layer`, replacing any layer with the same id in place.
    pub fn insert(&mut self, layer: LocalLayer) {
        match self.layers.iter_mut().find(|l| l.id == layer.id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<LocalLayer> {
        let idx = self.layers.iter().position(|l| l.id == id)?;
        Some(self.layers.remove(idx))
    }

    pub fn layer(&self, id: &str) -> Option<&LocalLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut LocalLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn layers(&self) -> &[LocalLayer] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
