//! File loading and environment overrides for the `identify` binary.

use std::fs;
use std::path::{Path, PathBuf};

use identify::IdentifyConfig;
use layers::LayerDescriptor;
use scene::LocalScene;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a JSON array of layer descriptors.
pub fn load_layers(path: &Path) -> Result<Vec<LayerDescriptor>, LoadError> {
    load_json(path)
}

pub fn load_scene(path: &Path) -> Result<LocalScene, LoadError> {
    load_json(path)
}

/// Reads `path` if given, else the defaults.
pub fn load_config(path: Option<&Path>) -> Result<IdentifyConfig, LoadError> {
    match path {
        Some(path) => load_json(path),
        None => Ok(IdentifyConfig::default()),
    }
}

fn var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Applies `IDENTIFY_*` overrides; unparseable values are ignored.
pub fn apply_env_overrides(config: &mut IdentifyConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(count) = var(&lookup, "IDENTIFY_FEATURE_COUNT") {
        config.query.feature_count = count;
    }
    if let Some(ms) = var(&lookup, "IDENTIFY_TIMEOUT_MS") {
        config.query.request_timeout_ms = ms;
    }
    if let Some(format) = lookup("IDENTIFY_INFO_FORMAT").filter(|v| !v.trim().is_empty()) {
        config.query.info_format = format.trim().to_string();
    }
    if let Some(px) = var(&lookup, "IDENTIFY_HIT_TOLERANCE_PX") {
        config.hit_tolerance_px = px;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::{LoadError, apply_env_overrides, load_config, load_layers, load_scene};
    use identify::IdentifyConfig;

    fn temp_json(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(body.as_bytes()).expect("write");
        file
    }

    #[test]
    fn env_overrides_replace_parsed_values_only() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("IDENTIFY_FEATURE_COUNT", "25"),
            ("IDENTIFY_TIMEOUT_MS", "not-a-number"),
            ("IDENTIFY_INFO_FORMAT", "application/vnd.ogc.gml"),
            ("IDENTIFY_HIT_TOLERANCE_PX", " 4.5 "),
        ]);
        let mut cfg = IdentifyConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.query.feature_count, 25);
        assert_eq!(cfg.query.request_timeout_ms, 10_000);
        assert_eq!(cfg.query.info_format, "application/vnd.ogc.gml");
        assert_eq!(cfg.hit_tolerance_px, 4.5);
    }

    #[test]
    fn loads_layer_and_scene_files() {
        let layers = temp_json(
            r#"[{
                "id": "city",
                "caption": "City",
                "url": "https://city.test/wms",
                "minZoom": 5,
                "subLayers": {"parks": {"caption": "Parks", "queryable": true}},
                "activeSublayers": "parks"
            }]"#,
        );
        let loaded = load_layers(layers.path()).expect("layers");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].zoom.min_zoom, Some(5.0));
        assert_eq!(loaded[0].active_ids(), vec!["parks".to_string()]);

        let scene = temp_json(
            r#"{"layers": [{"id": "search", "role": "searchResults", "features": [
                {"id": "a", "geometry": {"type": "Point", "coordinates": [1, 2]}, "properties": {}}
            ]}]}"#,
        );
        let scene = load_scene(scene.path()).expect("scene");
        assert_eq!(scene.layers()[0].features.len(), 1);
    }

    #[test]
    fn missing_and_malformed_files_report_path() {
        assert!(matches!(
            load_layers(std::path::Path::new("/nonexistent/layers.json")),
            Err(LoadError::Io { .. })
        ));
        let bad = temp_json("{ nope");
        let err = load_config(Some(bad.path())).expect_err("malformed");
        assert!(err.to_string().contains("invalid JSON"));
        assert_eq!(load_config(None).expect("default"), IdentifyConfig::default());
    }
}
