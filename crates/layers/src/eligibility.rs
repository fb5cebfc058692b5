use crate::layer::LayerDescriptor;

impl LayerDescriptor {
    /// Whether this layer takes part in a point query at `zoom`.
    pub fn is_eligible(&self, zoom: f64) -> bool {
        self.visible && self.queryable && self.zoom.contains(zoom)
    }
}

/// Layers queryable right now, in registry order.
///
/// Evaluated per query: visibility and zoom change between clicks.
pub fn eligible_layers(layers: &[LayerDescriptor], zoom: f64) -> Vec<&LayerDescriptor> {
    layers.iter().filter(|l| l.is_eligible(zoom)).collect()
}
