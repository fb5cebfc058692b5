use foundation::math::Vec2;
use scene::{FeatureRecord, Geometry};
use serde_json::Value;

use crate::error::ParseError;

/// Decodes a GeoJSON FeatureCollection (or a single Feature).
///
/// Numeric ids are kept as their decimal string. A null geometry is allowed;
/// a GeometryCollection is not modelled and decodes as no geometry.
pub fn decode_geojson(body: &[u8]) -> Result<Vec<FeatureRecord>, ParseError> {
    let value: Value = serde_json::from_slice(body)?;
    decode_geojson_value(&value)
}

pub fn decode_geojson_value(value: &Value) -> Result<Vec<FeatureRecord>, ParseError> {
    let obj = value.as_object().ok_or(ParseError::NotAFeatureCollection)?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(ParseError::NotAFeatureCollection)?;

    match ty {
        "FeatureCollection" => {
            let features_val = obj
                .get("features")
                .and_then(|v| v.as_array())
                .ok_or(ParseError::NotAFeatureCollection)?;
            features_val
                .iter()
                .enumerate()
                .map(|(index, feat)| decode_feature(index, feat))
                .collect()
        }
        "Feature" => Ok(vec![decode_feature(0, value)?]),
        _ => Err(ParseError::NotAFeatureCollection),
    }
}

fn decode_feature(index: usize, value: &Value) -> Result<FeatureRecord, ParseError> {
    let invalid = |reason: String| ParseError::InvalidFeature { index, reason };

    let feat_obj = value
        .as_object()
        .ok_or_else(|| invalid("feature must be an object".to_string()))?;
    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("feature missing type".to_string()))?;
    if feat_type != "Feature" {
        return Err(invalid(format!("unexpected feature type: {feat_type}")));
    }

    let id = match feat_obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let attributes = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let geometry = match feat_obj.get("geometry") {
        None | Some(Value::Null) => None,
        Some(g) => parse_geometry(g).map_err(invalid)?,
    };

    Ok(FeatureRecord::new(id, geometry, attributes))
}

fn parse_geometry(value: &Value) -> Result<Option<Geometry>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    if ty == "GeometryCollection" {
        return Ok(None);
    }

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    let geometry = match ty {
        "Point" => Geometry::Point(parse_position(coords)?),
        "MultiPoint" => Geometry::MultiPoint(parse_positions(coords)?),
        "LineString" => Geometry::LineString(parse_positions(coords)?),
        "MultiLineString" => Geometry::MultiLineString(parse_nested(coords, parse_positions)?),
        "Polygon" => Geometry::Polygon(parse_nested(coords, parse_positions)?),
        "MultiPolygon" => Geometry::MultiPolygon(parse_nested(coords, |poly| {
            parse_nested(poly, parse_positions)
        })?),
        other => return Err(format!("unsupported geometry type: {other}")),
    };
    Ok(Some(geometry))
}

fn parse_position(coords: &Value) -> Result<Vec2, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have at least [x, y]".to_string());
    }
    let x = arr[0].as_f64().ok_or("x must be a number".to_string())?;
    let y = arr[1].as_f64().ok_or("y must be a number".to_string())?;
    Ok(Vec2::new(x, y))
}

fn parse_positions(coords: &Value) -> Result<Vec<Vec2>, String> {
    parse_nested(coords, parse_position)
}

fn parse_nested<T>(
    coords: &Value,
    item: impl Fn(&Value) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(item).collect()
}

#[cfg(test)]
mod tests {
    use super::decode_geojson;
    use crate::error::ParseError;
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use scene::Geometry;
    use serde_json::json;

    #[test]
    fn decodes_wms_feature_collection() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "parks.42",
                    "properties": { "name": "Riverside", "area": 12.5 },
                    "geometry": { "type": "Point", "coordinates": [10.0, 20.0, 3.0] }
                },
                {
                    "type": "Feature",
                    "id": 7,
                    "properties": null,
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
                    }
                }
            ]
        })
        .to_string();

        let features = decode_geojson(body.as_bytes()).expect("decode");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id.as_deref(), Some("parks.42"));
        assert_eq!(features[0].geometry, Some(Geometry::Point(Vec2::new(10.0, 20.0))));
        assert_eq!(features[0].attribute("name"), Some(&json!("Riverside")));
        assert_eq!(features[1].id.as_deref(), Some("7"));
        assert!(features[1].attributes.is_empty());
        assert!(matches!(
            features[1].geometry,
            Some(Geometry::Polygon(ref rings)) if rings[0].len() == 4
        ));
    }

    #[test]
    fn single_feature_and_null_geometry() {
        let body = br#"{"type":"Feature","properties":{"a":[1,2]},"geometry":null}"#;
        let features = decode_geojson(body).expect("decode");
        assert_eq!(features.len(), 1);
        assert!(features[0].id.is_none());
        assert!(features[0].geometry.is_none());
    }

    #[test]
    fn rejects_non_feature_payloads() {
        assert!(matches!(
            decode_geojson(br#"{"type":"Point","coordinates":[0,0]}"#),
            Err(ParseError::NotAFeatureCollection)
        ));
        assert!(matches!(
            decode_geojson(br#"{"type":"FeatureCollection","features":[{"type":"Nope"}]}"#),
            Err(ParseError::InvalidFeature { index: 0, .. })
        ));
    }
}
