/// Feature encodings a response can be decoded from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResponseEncoding {
    GeoJson,
    Gml,
    /// Server answered with something we do not decode.
    Unsupported,
}

const GEOJSON_TYPES: &[&str] = &[
    "application/json",
    "application/geo+json",
    "application/geojson",
    "application/vnd.geo+json",
];

const GML_TYPES: &[&str] = &[
    "application/vnd.ogc.gml",
    "application/vnd.ogc.gml/3.1.1",
    "application/gml+xml",
    "text/xml",
    "application/xml",
];

/// Lower-cases a content type and strips parameters (`; charset=...`).
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// The `charset` parameter of a content type, unquoted.
pub fn content_type_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

impl ResponseEncoding {
    pub fn from_content_type(content_type: &str) -> Self {
        let normalized = normalize_content_type(content_type);
        if GEOJSON_TYPES.contains(&normalized.as_str()) {
            ResponseEncoding::GeoJson
        } else if GML_TYPES.contains(&normalized.as_str()) {
            ResponseEncoding::Gml
        } else {
            ResponseEncoding::Unsupported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ResponseEncoding, content_type_charset, normalize_content_type};

    #[test]
    fn strips_parameters_and_case() {
        assert_eq!(
            normalize_content_type(" Text/XML; subtype=gml/3.1.1 "),
            "text/xml"
        );
        assert_eq!(normalize_content_type(""), "");
    }

    #[test]
    fn classifies_known_types() {
        assert_eq!(
            ResponseEncoding::from_content_type("application/geo+json"),
            ResponseEncoding::GeoJson
        );
        assert_eq!(
            ResponseEncoding::from_content_type("application/vnd.ogc.gml; charset=UTF-8"),
            ResponseEncoding::Gml
        );
        assert_eq!(
            ResponseEncoding::from_content_type("text/plain"),
            ResponseEncoding::Unsupported
        );
    }

    #[test]
    fn extracts_charset_parameter() {
        assert_eq!(
            content_type_charset("text/xml; subtype=gml/2.1.2; Charset=\"ISO-8859-1\""),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(content_type_charset("application/vnd.ogc.gml"), None);
        assert_eq!(content_type_charset("text/xml; charset="), None);
    }
}
