use layers::LayerId;
use scene::FeatureRecord;
use scene::picking::{LocalHits, PickHit};
use serde::Serialize;

use crate::attribution::AttributedBatch;
use crate::config::IdentifyConfig;

/// Where a result group came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultKind {
    RemoteQuery,
    SearchResult,
    LocalQueryable,
}

/// One captioned group of features handed to callers. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGroupResult {
    #[serde(rename = "type")]
    kind: ResultKind,
    features: Vec<FeatureRecord>,
    num_hits: usize,
    display_name: String,
    detail_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_layer_id: Option<String>,
}

impl FeatureGroupResult {
    /// Returns `None` for an empty feature list.
    pub fn new(
        kind: ResultKind,
        features: Vec<FeatureRecord>,
        display_name: impl Into<String>,
        detail_template: Option<String>,
    ) -> Option<Self> {
        if features.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            num_hits: features.len(),
            features,
            display_name: display_name.into(),
            detail_template,
            layer_id: None,
            sub_layer_id: None,
        })
    }

    pub fn with_source(mut self, layer_id: Option<String>, sub_layer_id: Option<String>) -> Self {
        self.layer_id = layer_id;
        self.sub_layer_id = sub_layer_id;
        self
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn features(&self) -> &[FeatureRecord] {
        &self.features
    }

    pub fn num_hits(&self) -> usize {
        self.num_hits
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn detail_template(&self) -> Option<&str> {
        self.detail_template.as_deref()
    }

    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }

    pub fn sub_layer_id(&self) -> Option<&str> {
        self.sub_layer_id.as_deref()
    }
}

fn local_group(
    kind: ResultKind,
    hits: Vec<PickHit>,
    caption: &str,
) -> Option<FeatureGroupResult> {
    let layer_id = match hits.split_first() {
        Some((first, rest)) if rest.iter().all(|h| h.layer_id == first.layer_id) => {
            Some(first.layer_id.clone())
        }
        _ => None,
    };
    let features = hits.into_iter().map(|h| h.feature).collect();
    FeatureGroupResult::new(kind, features, caption, None).map(|g| g.with_source(layer_id, None))
}

/// Orders everything into the delivered result list.
///
/// Remote groups come first in the order given (query order), then the
/// search-result hits, then other local hits. Empty groups are dropped.
pub fn aggregate(
    remote: impl IntoIterator<Item = (LayerId, AttributedBatch)>,
    local: LocalHits,
    config: &IdentifyConfig,
) -> Vec<FeatureGroupResult> {
    let mut groups: Vec<FeatureGroupResult> = remote
        .into_iter()
        .filter_map(|(layer_id, batch)| {
            let AttributedBatch {
                attribution,
                features,
            } = batch;
            FeatureGroupResult::new(
                ResultKind::RemoteQuery,
                features,
                attribution.caption,
                attribution.detail_template,
            )
            .map(|g| g.with_source(Some(layer_id.0), attribution.sub_layer_id))
        })
        .collect();

    groups.extend(local_group(
        ResultKind::SearchResult,
        local.search_results,
        &config.search_results_caption,
    ));
    groups.extend(local_group(
        ResultKind::LocalQueryable,
        local.vector,
        &config.local_features_caption,
    ));
    groups
}
