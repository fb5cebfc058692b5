//! GML feature-info decoding.
//!
//! Handles WFS-style `featureMember`/`featureMembers` collections and the
//! MapServer `msGMLOutput` layout (`<name>_layer` holding `<name>_feature`).
//! Coordinates are taken in document axis order. Bodies are transcoded to
//! UTF-8 from the transport charset, else the XML declaration, else UTF-8.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use foundation::math::Vec2;
use quick_xml::events::Event;
use quick_xml::Reader;
use scene::{FeatureRecord, Geometry};
use serde_json::{Map, Value};

use crate::error::ParseError;

const GEOMETRY_ELEMENTS: &[&str] = &[
    "Point",
    "LineString",
    "LinearRing",
    "Curve",
    "Polygon",
    "Surface",
    "MultiPoint",
    "MultiLineString",
    "MultiCurve",
    "MultiPolygon",
    "MultiSurface",
];

#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn is_geometry(&self) -> bool {
        GEOMETRY_ELEMENTS.contains(&self.name.as_str())
    }

    /// Pre-order search that does not descend into matches.
    fn collect_named<'a>(&'a self, names: &[&str], out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if names.contains(&child.name.as_str()) {
                out.push(child);
            } else {
                child.collect_named(names, out);
            }
        }
    }
}

fn local_name(raw: &[u8]) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(raw)?.to_string())
}

fn parse_tree(text: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut stack: Vec<Element> = vec![Element::default()];
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let mut el = Element {
                    name: local_name(start.local_name().as_ref())?,
                    ..Default::default()
                };
                for attr in start.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    el.attrs.push((
                        local_name(attr.key.local_name().as_ref())?,
                        attr.unescape_value()?.into_owned(),
                    ));
                }
                stack.push(el);
            }
            Event::Empty(start) => {
                let mut el = Element {
                    name: local_name(start.local_name().as_ref())?,
                    ..Default::default()
                };
                for attr in start.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    el.attrs.push((
                        local_name(attr.key.local_name().as_ref())?,
                        attr.unescape_value()?.into_owned(),
                    ));
                }
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(el);
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(ParseError::Malformed("unbalanced end tag".to_string()));
                }
                if let Some(done) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(done);
                    }
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(std::str::from_utf8(&data.into_inner())?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(ParseError::Malformed("unclosed element".to_string()));
    }
    let document = stack.pop().unwrap_or_default();
    document
        .children
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::Malformed("empty document".to_string()))
}

/// The `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(body: &[u8]) -> Option<&str> {
    let head = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = head.iter().position(|b| *b == b'>')?;
    let decl = std::str::from_utf8(&head[..end]).ok()?;
    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    value.find(quote).map(|i| &value[..i])
}

/// Transcodes `body` to UTF-8. A byte-order mark wins over any label and
/// unknown labels fall back to UTF-8.
fn to_utf8<'a>(body: &'a [u8], charset: Option<&str>) -> Result<Cow<'a, str>, ParseError> {
    let (encoding, body) = match Encoding::for_bom(body) {
        Some((encoding, bom_len)) => (encoding, &body[bom_len..]),
        None => {
            let label = charset.or_else(|| declared_encoding(body));
            let encoding = label
                .and_then(|l| Encoding::for_label(l.trim().as_bytes()))
                .unwrap_or(UTF_8);
            (encoding, body)
        }
    };
    if encoding == UTF_8 {
        return Ok(Cow::Borrowed(std::str::from_utf8(body)?));
    }
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(ParseError::Malformed(format!(
            "invalid {} byte sequence",
            encoding.name()
        )));
    }
    Ok(text)
}

/// Decodes a GML feature-info document into feature records.
pub fn decode_gml(body: &[u8]) -> Result<Vec<FeatureRecord>, ParseError> {
    decode_gml_with_charset(body, None)
}

/// Like [`decode_gml`], with the `charset` announced by the transport.
pub fn decode_gml_with_charset(
    body: &[u8],
    charset: Option<&str>,
) -> Result<Vec<FeatureRecord>, ParseError> {
    let text = to_utf8(body, charset)?;
    let root = parse_tree(&text)?;

    let mut feature_elements = Vec::new();
    if root.name == "msGMLOutput" {
        for layer in root.children.iter().filter(|c| c.name.ends_with("_layer")) {
            let features = layer.children.iter().filter(|c| c.name.ends_with("_feature"));
            feature_elements.extend(features);
        }
    } else {
        let mut members = Vec::new();
        root.collect_named(&["featureMember", "featureMembers"], &mut members);
        for member in members {
            feature_elements.extend(member.children.iter());
        }
    }

    Ok(feature_elements.into_iter().map(decode_feature).collect())
}

fn decode_feature(el: &Element) -> FeatureRecord {
    let id = el.attr("fid").or_else(|| el.attr("id")).map(str::to_string);
    let mut attributes = Map::new();
    let mut geometry = None;

    for child in &el.children {
        if child.name == "boundedBy" {
            continue;
        }
        if child.is_geometry() {
            if geometry.is_none() {
                geometry = parse_geometry(child, 2);
            }
            continue;
        }
        match child.children.first() {
            None => {
                attributes.insert(child.name.clone(), Value::String(child.text.clone()));
            }
            Some(inner) if inner.is_geometry() => {
                if geometry.is_none() {
                    geometry = parse_geometry(inner, 2);
                }
            }
            // Nested complex properties are not flattened.
            Some(_) => {}
        }
    }

    FeatureRecord::new(id, geometry, attributes)
}

fn srs_dimension(el: &Element, inherited: usize) -> usize {
    el.attr("srsDimension")
        .and_then(|d| d.parse::<usize>().ok())
        .filter(|d| *d >= 2)
        .unwrap_or(inherited)
}

fn parse_geometry(el: &Element, dim: usize) -> Option<Geometry> {
    let dim = srs_dimension(el, dim);
    match el.name.as_str() {
        "Point" => point_position(el, dim).map(Geometry::Point),
        "LineString" | "LinearRing" | "Curve" => {
            Some(Geometry::LineString(line_positions(el, dim)))
        }
        "Polygon" | "Surface" => Some(Geometry::Polygon(polygon_rings(el, dim))),
        "MultiPoint" => {
            let mut points = Vec::new();
            el.collect_named(&["Point"], &mut points);
            Some(Geometry::MultiPoint(
                points.into_iter().filter_map(|p| point_position(p, dim)).collect(),
            ))
        }
        "MultiLineString" | "MultiCurve" => {
            let mut lines = Vec::new();
            el.collect_named(&["LineString", "Curve", "LinearRing"], &mut lines);
            Some(Geometry::MultiLineString(
                lines.into_iter().map(|l| line_positions(l, dim)).collect(),
            ))
        }
        "MultiPolygon" | "MultiSurface" => {
            let mut polygons = Vec::new();
            el.collect_named(&["Polygon", "Surface"], &mut polygons);
            Some(Geometry::MultiPolygon(
                polygons.into_iter().map(|p| polygon_rings(p, dim)).collect(),
            ))
        }
        _ => None,
    }
}

fn point_position(el: &Element, dim: usize) -> Option<Vec2> {
    let dim = srs_dimension(el, dim);
    if let Some(pos) = el.child("pos") {
        return parse_pos_list(&pos.text, srs_dimension(pos, dim)).into_iter().next();
    }
    if let Some(coords) = el.child("coordinates") {
        return parse_coordinates(coords).into_iter().next();
    }
    el.child("coord").and_then(parse_coord)
}

/// Positions of a line-like element, flattening curve segments.
fn line_positions(el: &Element, dim: usize) -> Vec<Vec2> {
    let dim = srs_dimension(el, dim);
    if let Some(list) = el.child("posList") {
        return parse_pos_list(&list.text, srs_dimension(list, dim));
    }
    if let Some(coords) = el.child("coordinates") {
        return parse_coordinates(coords);
    }
    if let Some(segments) = el.child("segments") {
        return segments
            .children
            .iter()
            .flat_map(|segment| line_positions(segment, dim))
            .collect();
    }
    let pos: Vec<Vec2> = el
        .children_named("pos")
        .filter_map(|p| parse_pos_list(&p.text, srs_dimension(p, dim)).into_iter().next())
        .collect();
    if !pos.is_empty() {
        return pos;
    }
    el.children_named("coord").filter_map(parse_coord).collect()
}

fn polygon_rings(el: &Element, dim: usize) -> Vec<Vec<Vec2>> {
    let dim = srs_dimension(el, dim);
    // Surfaces carry their rings on a single PolygonPatch.
    let body = el
        .child("patches")
        .and_then(|p| p.children.first())
        .unwrap_or(el);

    let mut rings = Vec::new();
    for boundary in ["exterior", "outerBoundaryIs", "interior", "innerBoundaryIs"] {
        for b in body.children_named(boundary) {
            if let Some(ring) = b.children.first() {
                rings.push(line_positions(ring, dim));
            }
        }
    }
    rings
}

fn parse_pos_list(text: &str, dim: usize) -> Vec<Vec2> {
    let values: Vec<f64> = text
        .split_whitespace()
        .filter_map(|t| t.parse::<f64>().ok())
        .collect();
    values
        .chunks_exact(dim)
        .map(|c| Vec2::new(c[0], c[1]))
        .collect()
}

/// GML2 `<coordinates>` with optional `cs`/`ts` separators.
fn parse_coordinates(el: &Element) -> Vec<Vec2> {
    let cs = el.attr("cs").unwrap_or(",");
    let ts = el.attr("ts").filter(|t| !t.trim().is_empty());
    let tuples: Vec<&str> = match ts {
        Some(ts) => el.text.split(ts).collect(),
        None => el.text.split_whitespace().collect(),
    };
    tuples
        .into_iter()
        .filter_map(|tuple| {
            let mut parts = tuple.trim().split(cs).map(|v| v.trim().parse::<f64>());
            match (parts.next(), parts.next()) {
                (Some(Ok(x)), Some(Ok(y))) => Some(Vec2::new(x, y)),
                _ => None,
            }
        })
        .collect()
}

fn parse_coord(el: &Element) -> Option<Vec2> {
    let x = el.child("X")?.text.trim().parse().ok()?;
    let y = el.child("Y")?.text.trim().parse().ok()?;
    Some(Vec2::new(x, y))
}
