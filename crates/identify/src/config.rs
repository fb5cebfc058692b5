use serde::{Deserialize, Serialize};
use streaming::QueryConfig;

/// How features of one remote batch are assigned to sub-layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributionMode {
    /// The first feature of a batch decides for the whole batch.
    #[default]
    PerBatch,
    /// Each feature is resolved on its own; consecutive runs form groups.
    PerFeature,
}

/// Configuration for the identify pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyConfig {
    #[serde(default)]
    pub query: QueryConfig,

    /// Local hit radius in screen pixels.
    #[serde(default = "default_hit_tolerance_px")]
    pub hit_tolerance_px: f64,

    #[serde(default)]
    pub attribution: AttributionMode,

    /// Caption used when neither sub-layer nor parent layer has one.
    #[serde(default = "default_unnamed_caption")]
    pub unnamed_caption: String,

    #[serde(default = "default_search_results_caption")]
    pub search_results_caption: String,

    #[serde(default = "default_local_features_caption")]
    pub local_features_caption: String,
}

fn default_hit_tolerance_px() -> f64 {
    10.0
}

fn default_unnamed_caption() -> String {
    "Unnamed dataset".to_string()
}

fn default_search_results_caption() -> String {
    "Search results".to_string()
}

fn default_local_features_caption() -> String {
    "Vector features".to_string()
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            query: QueryConfig::default(),
            hit_tolerance_px: default_hit_tolerance_px(),
            attribution: AttributionMode::default(),
            unnamed_caption: default_unnamed_caption(),
            search_results_caption: default_search_results_caption(),
            local_features_caption: default_local_features_caption(),
        }
    }
}
