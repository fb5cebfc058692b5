use parking_lot::RwLock;

use crate::layer::{LayerDescriptor, LayerId};

/// Read access to the live set of remote layers.
///
/// The query engine only ever reads; the layer control surface mutates.
pub trait LayerRegistry: Send + Sync {
    /// Current layers in draw order.
    fn snapshot(&self) -> Vec<LayerDescriptor>;
}

impl LayerRegistry for Vec<LayerDescriptor> {
    fn snapshot(&self) -> Vec<LayerDescriptor> {
        self.clone()
    }
}

/// Registry shared between the layer control surface and queries.
#[derive(Debug, Default)]
pub struct InMemoryLayerRegistry {
    layers: RwLock<Vec<LayerDescriptor>>,
}

impl InMemoryLayerRegistry {
    pub fn new(layers: Vec<LayerDescriptor>) -> Self {
        Self {
            layers: RwLock::new(layers),
        }
    }

    pub fn get(&self, id: &LayerId) -> Option<LayerDescriptor> {
        self.layers.read().iter().find(|l| &l.id == id).cloned()
    }

    /// Inserts or replaces by id; a new layer goes on top.
    pub fn upsert(&self, layer: LayerDescriptor) {
        let mut layers = self.layers.write();
        match layers.iter_mut().find(|l| l.id == layer.id) {
            Some(existing) => *existing = layer,
            None => layers.push(layer),
        }
    }

    pub fn remove(&self, id: &LayerId) -> Option<LayerDescriptor> {
        let mut layers = self.layers.write();
        let idx = layers.iter().position(|l| &l.id == id)?;
        Some(layers.remove(idx))
    }

    /// Returns `false` if no layer has `id`.
    pub fn set_visible(&self, id: &LayerId, visible: bool) -> bool {
        self.update(id, |l| l.visible = visible)
    }

    /// Replaces the live `LAYERS` value of a layer.
    pub fn set_active_sublayers(&self, id: &LayerId, active: &str) -> bool {
        self.update(id, |l| l.active_sublayers = active.to_string())
    }

    pub fn len(&self) -> usize {
        self.layers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.read().is_empty()
    }

    fn update(&self, id: &LayerId, f: impl FnOnce(&mut LayerDescriptor)) -> bool {
        let mut layers = self.layers.write();
        match layers.iter_mut().find(|l| &l.id == id) {
            Some(layer) => {
                f(layer);
                true
            }
            None => false,
        }
    }
}

impl LayerRegistry for InMemoryLayerRegistry {
    fn snapshot(&self) -> Vec<LayerDescriptor> {
        self.layers.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryLayerRegistry, LayerRegistry};
    use crate::layer::{LayerDescriptor, LayerId};

    #[test]
    fn runtime_toggles_show_up_in_snapshots() {
        let registry = InMemoryLayerRegistry::new(vec![
            LayerDescriptor::new("a", "https://a.example/wms").with_active("x,y"),
        ]);
        let id = LayerId::new("a");

        assert!(registry.set_active_sublayers(&id, "y"));
        assert!(registry.set_visible(&id, false));
        assert!(!registry.set_visible(&LayerId::new("missing"), true));

        let snap = registry.snapshot();
        assert_eq!(snap[0].active_ids(), vec!["y"]);
        assert!(!snap[0].visible);
    }

    #[test]
    fn upsert_and_remove() {
        let registry = InMemoryLayerRegistry::default();
        registry.upsert(LayerDescriptor::new("a", "u1"));
        registry.upsert(LayerDescriptor::new("b", "u2"));
        registry.upsert(LayerDescriptor::new("a", "u3"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&LayerId::new("a")).expect("a").url, "u3");
        assert!(registry.remove(&LayerId::new("b")).is_some());
        assert_eq!(registry.len(), 1);
    }
}
