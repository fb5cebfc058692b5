//! Sub-layer attribution from feature identifiers.
//!
//! Feature-info responses do not say which member of a group layer a feature
//! came from. Servers name features `<sublayer>.<n>`, optionally with a
//! `<namespace>:` prefix, so the id prefix is matched against the group's
//! configured sub-layer ids.

use layers::LayerDescriptor;
use scene::FeatureRecord;

use crate::config::AttributionMode;

/// Drops a leading `namespace:` from an id.
pub fn strip_namespace(id: &str) -> &str {
    id.rsplit_once(':').map_or(id, |(_, local)| local)
}

/// Sub-layer key encoded in a feature id: the part before the first `.`.
pub fn candidate_key(feature_id: &str) -> &str {
    feature_id.split_once('.').map_or(feature_id, |(key, _)| key)
}

/// Finds the sub-layer id whose local name equals the candidate's.
///
/// Namespace prefixes are ignored on both sides. The first match in
/// iteration order wins.
pub fn match_sublayer<'a>(
    candidate: &str,
    sub_layer_ids: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let wanted = strip_namespace(candidate);
    sub_layer_ids
        .into_iter()
        .find(|id| strip_namespace(id) == wanted)
}

/// Display metadata resolved for a set of features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    /// Matched sub-layer, `None` when falling back to the parent.
    pub sub_layer_id: Option<String>,
    pub caption: String,
    pub detail_template: Option<String>,
}

/// Resolves the sub-layer `feature` belongs to within `layer`.
///
/// Falls back to the parent layer's caption and template, then to
/// `unnamed_caption` with no template.
pub fn attribute_feature(
    layer: &LayerDescriptor,
    feature: &FeatureRecord,
    unnamed_caption: &str,
) -> Attribution {
    let matched = feature.id.as_deref().and_then(|id| {
        let infos = layer.sub_layers.as_ref()?;
        let key = match_sublayer(candidate_key(id), infos.keys().map(String::as_str))?;
        infos.get(key).map(|info| (key, info))
    });

    if let Some((key, info)) = matched {
        if !info.caption.is_empty() {
            return Attribution {
                sub_layer_id: Some(key.to_string()),
                caption: info.caption.clone(),
                detail_template: info.detail_template.clone(),
            };
        }
    }

    if layer.caption.is_empty() {
        Attribution {
            sub_layer_id: None,
            caption: unnamed_caption.to_string(),
            detail_template: None,
        }
    } else {
        Attribution {
            sub_layer_id: None,
            caption: layer.caption.clone(),
            detail_template: layer.detail_template.clone(),
        }
    }
}

/// Features of one remote response sharing one attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedBatch {
    pub attribution: Attribution,
    pub features: Vec<FeatureRecord>,
}

/// Splits a response batch into attributed runs.
///
/// In `PerBatch` mode the first feature decides for all of them. An empty
/// batch yields nothing.
pub fn attribute_batch(
    layer: &LayerDescriptor,
    features: Vec<FeatureRecord>,
    mode: AttributionMode,
    unnamed_caption: &str,
) -> Vec<AttributedBatch> {
    let Some(first) = features.first() else {
        return Vec::new();
    };

    match mode {
        AttributionMode::PerBatch => {
            let attribution = attribute_feature(layer, first, unnamed_caption);
            vec![AttributedBatch {
                attribution,
                features,
            }]
        }
        AttributionMode::PerFeature => {
            let mut runs: Vec<AttributedBatch> = Vec::new();
            for feature in features {
                let attribution = attribute_feature(layer, &feature, unnamed_caption);
                match runs.last_mut() {
                    Some(run) if run.attribution == attribution => run.features.push(feature),
                    _ => runs.push(AttributedBatch {
                        attribution,
                        features: vec![feature],
                    }),
                }
            }
            runs
        }
    }
}
