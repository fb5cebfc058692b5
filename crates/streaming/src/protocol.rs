//! WMS `GetFeatureInfo` wire encoding.
//!
//! The query asks the server to render a 101x101 px map centred on the click
//! and report the features under its centre pixel.

use foundation::bounds::Aabb2;
use reqwest::Url;

use crate::request::QueryRequest;
use crate::transport::TransportError;

/// Width and height of the virtual map sent with every query.
pub const QUERY_SIZE_PX: u32 = 101;

fn is_wms_130(version: &str) -> bool {
    version.starts_with("1.3")
}

fn format_bbox(bbox: &Aabb2, swap: bool) -> String {
    let [minx, miny] = bbox.min;
    let [maxx, maxy] = bbox.max;
    if swap {
        format!("{miny},{minx},{maxy},{maxx}")
    } else {
        format!("{minx},{miny},{maxx},{maxy}")
    }
}

/// Request parameters in emission order, dialect tuning last.
pub fn get_feature_info_params(req: &QueryRequest) -> Vec<(String, String)> {
    let wms_130 = is_wms_130(&req.version);
    let bbox = Aabb2::around(req.point.coordinate, req.point.resolution, QUERY_SIZE_PX);
    let center = (QUERY_SIZE_PX / 2).to_string();
    let (crs_key, i_key, j_key) = if wms_130 {
        ("CRS", "I", "J")
    } else {
        ("SRS", "X", "Y")
    };

    let mut params: Vec<(String, String)> = [
        ("SERVICE", "WMS".to_string()),
        ("REQUEST", "GetFeatureInfo".to_string()),
        ("VERSION", req.version.clone()),
        ("FORMAT", "image/png".to_string()),
        ("TRANSPARENT", "true".to_string()),
        ("LAYERS", req.targets.layers.join(",")),
        ("STYLES", req.targets.styles.join(",")),
        ("QUERY_LAYERS", req.query_layers()),
        ("INFO_FORMAT", req.info_format.clone()),
        ("FEATURE_COUNT", req.feature_count.to_string()),
        ("WIDTH", QUERY_SIZE_PX.to_string()),
        ("HEIGHT", QUERY_SIZE_PX.to_string()),
        (crs_key, req.point.crs.clone()),
        ("BBOX", format_bbox(&bbox, wms_130 && req.north_east_axes)),
        (i_key, center.clone()),
        (j_key, center),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    if let Some(tuning) = &req.tuning {
        params.extend(tuning.params());
    }
    params
}

/// Full request URL: base parameters the request does not set are kept.
pub fn get_feature_info_url(req: &QueryRequest) -> Result<Url, TransportError> {
    let mut url = Url::parse(&req.url).map_err(|e| TransportError::InvalidUrl {
        url: req.url.clone(),
        reason: e.to_string(),
    })?;

    let params = get_feature_info_params(req);
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(p, _)| p.eq_ignore_ascii_case(k)))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept.iter().chain(params.iter()));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{get_feature_info_params, get_feature_info_url};
    use crate::config::{DialectTuning, QueryConfig};
    use crate::request::{QueryPoint, QueryRequest, build_query};
    use foundation::math::Vec2;
    use layers::{LayerDescriptor, ServerDialect};
    use pretty_assertions::assert_eq;

    fn request(url: &str, version: &str, crs: &str) -> QueryRequest {
        let mut layer = LayerDescriptor::new("l", url).with_active("roads,rivers");
        layer.version = version.to_string();
        let point = QueryPoint::new(Vec2::new(1000.0, 2000.0), 2.0, crs);
        build_query(&layer, &point, &QueryConfig::default()).expect("request")
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn wms_130_parameters() {
        let req = request("https://x.test/wms", "1.3.0", "EPSG:3857");
        let params = get_feature_info_params(&req);
        assert_eq!(param(&params, "REQUEST"), Some("GetFeatureInfo"));
        assert_eq!(param(&params, "QUERY_LAYERS"), Some("roads,rivers"));
        assert_eq!(param(&params, "LAYERS"), Some("roads,rivers"));
        assert_eq!(param(&params, "STYLES"), Some(","));
        assert_eq!(param(&params, "FEATURE_COUNT"), Some("100"));
        assert_eq!(param(&params, "CRS"), Some("EPSG:3857"));
        assert_eq!(param(&params, "BBOX"), Some("899,1899,1101,2101"));
        assert_eq!(param(&params, "I"), Some("50"));
        assert_eq!(param(&params, "J"), Some("50"));
        assert_eq!(param(&params, "SRS"), None);
    }

    #[test]
    fn wms_111_uses_srs_and_xy() {
        let req = request("https://x.test/wms", "1.1.1", "EPSG:4326");
        let params = get_feature_info_params(&req);
        assert_eq!(param(&params, "SRS"), Some("EPSG:4326"));
        assert_eq!(param(&params, "X"), Some("50"));
        assert_eq!(param(&params, "BBOX"), Some("899,1899,1101,2101"));
    }

    #[test]
    fn wms_130_geographic_crs_swaps_bbox() {
        let req = request("https://x.test/wms", "1.3.0", "EPSG:4326");
        let params = get_feature_info_params(&req);
        assert_eq!(param(&params, "BBOX"), Some("1899,899,2101,1101"));
    }

    #[test]
    fn configured_north_east_crs_swaps_bbox() {
        let layer = LayerDescriptor::new("l", "https://x.test/wms").with_active("roads");
        let point = QueryPoint::new(Vec2::new(1000.0, 2000.0), 2.0, "EPSG:3006");
        let config = QueryConfig {
            north_east_crs: vec!["EPSG:3006".to_string()],
            ..QueryConfig::default()
        };
        let req = build_query(&layer, &point, &config).expect("request");
        let params = get_feature_info_params(&req);
        assert_eq!(param(&params, "BBOX"), Some("1899,899,2101,1101"));

        let req = build_query(&layer, &point, &QueryConfig::default()).expect("request");
        let params = get_feature_info_params(&req);
        assert_eq!(param(&params, "BBOX"), Some("899,1899,1101,2101"));
    }

    #[test]
    fn dialect_params_are_appended() {
        let mut req = request("https://x.test/wms", "1.3.0", "EPSG:3857");
        req.dialect = Some(ServerDialect::qgis());
        req.tuning = Some(DialectTuning::qgis());
        let params = get_feature_info_params(&req);
        assert_eq!(param(&params, "FI_POINT_TOLERANCE"), Some("16"));
        assert_eq!(param(&params, "WITH_GEOMETRY"), Some("TRUE"));
        assert_eq!(params.last().map(|(k, _)| k.as_str()), Some("WITH_GEOMETRY"));
    }

    #[test]
    fn base_url_parameters_survive_unless_overridden() {
        let base = "https://x.test/ows?map=/srv/a.map&version=1.1.1";
        let req = request(base, "1.3.0", "EPSG:3857");
        let url = get_feature_info_url(&req).expect("url");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("map".to_string(), "/srv/a.map".to_string()));
        assert!(!pairs.iter().any(|(k, _)| k == "version"));
        assert_eq!(param(&pairs, "VERSION"), Some("1.3.0"));
        assert_eq!(param(&pairs, "QUERY_LAYERS"), Some("roads,rivers"));
        assert_eq!(url.host_str(), Some("x.test"));
        assert_eq!(url.path(), "/ows");
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        let req = request("not a url", "1.3.0", "EPSG:3857");
        assert!(get_feature_info_url(&req).is_err());
    }
}
