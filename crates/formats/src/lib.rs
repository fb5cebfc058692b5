//! Response decoding for feature-info payloads.
//!
//! The declared content type picks the decoder; anything unrecognised
//! decodes to no features.

pub mod encoding;
pub mod error;
pub mod geojson;
pub mod gml;

pub use encoding::*;
pub use error::*;

use scene::FeatureRecord;
use tracing::{debug, warn};

/// Decodes `body` according to its declared `encoding`.
///
/// `charset` is the content type's `charset` parameter; GML bodies are
/// transcoded from it before parsing.
pub fn decode_features(
    encoding: ResponseEncoding,
    charset: Option<&str>,
    body: &[u8],
) -> Result<Vec<FeatureRecord>, ParseError> {
    match encoding {
        ResponseEncoding::GeoJson => geojson::decode_geojson(body),
        ResponseEncoding::Gml => gml::decode_gml_with_charset(body, charset),
        ResponseEncoding::Unsupported => Ok(Vec::new()),
    }
}

/// Decodes a response body, absorbing failures.
///
/// A malformed body yields zero features and a warning; an unknown content
/// type yields zero features silently.
pub fn parse_response(content_type: &str, body: &[u8]) -> Vec<FeatureRecord> {
    let encoding = ResponseEncoding::from_content_type(content_type);
    if encoding == ResponseEncoding::Unsupported {
        debug!("skipping response with unsupported content type {content_type:?}");
        return Vec::new();
    }
    let charset = content_type_charset(content_type);
    match decode_features(encoding, charset.as_deref(), body) {
        Ok(features) => features,
        Err(err) => {
            warn!("failed to decode {encoding:?} response: {err}");
            Vec::new()
        }
    }
}
