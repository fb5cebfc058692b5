use crate::layer::LayerDescriptor;

/// What a single layer query should ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTargets {
    /// Active ids, sent as `LAYERS`.
    pub layers: Vec<String>,
    /// Style reference per entry of `layers`; empty when unknown.
    pub styles: Vec<String>,
    /// Ids to query, sent as `QUERY_LAYERS`. Never empty.
    pub query_layers: Vec<String>,
}

/// Resolves the sub-layers of `layer` that should be queried right now.
///
/// Reads the live active list. For group layers only active ids whose
/// `SubLayerInfo` is flagged queryable are kept; active ids missing from the
/// map are not queryable. A plain layer queries its whole active list.
///
/// Returns `None` when nothing is left to query.
pub fn resolve_query_targets(layer: &LayerDescriptor) -> Option<QueryTargets> {
    let active = layer.active_ids();

    let query_layers: Vec<String> = match &layer.sub_layers {
        Some(infos) => active
            .iter()
            .filter(|id| infos.get(id.as_str()).is_some_and(|info| info.queryable))
            .cloned()
            .collect(),
        None => active.clone(),
    };
    if query_layers.is_empty() {
        return None;
    }

    let styles = active
        .iter()
        .map(|id| {
            layer
                .sub_layer(id)
                .and_then(|info| info.style.clone())
                .unwrap_or_default()
        })
        .collect();

    Some(QueryTargets {
        layers: active,
        styles,
        query_layers,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve_query_targets;
    use crate::layer::{LayerDescriptor, SubLayerInfo};
    use pretty_assertions::assert_eq;

    fn group() -> LayerDescriptor {
        let mut rivers = SubLayerInfo::new("Rivers");
        rivers.style = Some("blue".to_string());
        LayerDescriptor::new("hydro", "https://a.example/wms")
            .with_sub_layer("roads", SubLayerInfo::new("Roads"))
            .with_sub_layer("rivers", rivers)
            .with_sub_layer("labels", SubLayerInfo::new("Labels").queryable(false))
    }

    #[test]
    fn keeps_only_active_queryable_sub_layers() {
        let layer = group().with_active("labels,rivers,unknown");
        let targets = resolve_query_targets(&layer).expect("targets");
        assert_eq!(targets.layers, vec!["labels", "rivers", "unknown"]);
        assert_eq!(targets.styles, vec!["", "blue", ""]);
        assert_eq!(targets.query_layers, vec!["rivers"]);
    }

    #[test]
    fn nothing_queryable_means_no_targets() {
        assert!(resolve_query_targets(&group().with_active("labels")).is_none());
        assert!(resolve_query_targets(&group().with_active("")).is_none());
    }

    #[test]
    fn plain_layer_queries_whole_active_list() {
        let layer = LayerDescriptor::new("ortho", "https://a.example/wms").with_active("a,b");
        let targets = resolve_query_targets(&layer).expect("targets");
        assert_eq!(targets.query_layers, vec!["a", "b"]);
        assert!(resolve_query_targets(&LayerDescriptor::new("empty", "x")).is_none());
    }
}
