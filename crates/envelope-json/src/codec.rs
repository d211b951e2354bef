use envelope_core::{Container, EnvelopeError, Result};
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, trace};

use crate::config::JsonConfig;
use crate::decode::{check_nesting, Decoder};
use crate::legacy::{LegacyFlatDocument, LegacyNestedDocument};
use crate::shape::{find_shape, JsonShape};
use crate::unified::UnifiedDocument;

/// Decode a container from any supported JSON shape.
///
/// The shape is detected structurally; see [`JsonShape`]. Decoding is
/// all-or-nothing and errors carry the JSON path of the failure.
pub fn decode_json(src: &[u8], config: &JsonConfig) -> Result<Container> {
    trace!(len = src.len(), max_depth = config.max_depth, "decoding json container");
    check_nesting(src, config.max_depth)?;
    let doc: Json = serde_json::from_slice(src)
        .map_err(|err| EnvelopeError::InvalidJson(err.to_string()).at_path("$"))?;
    decode_json_value(&doc, config)
}

/// Decode a container from an already parsed JSON document.
pub fn decode_json_value(doc: &Json, config: &JsonConfig) -> Result<Container> {
    let entry = find_shape(doc)?;
    debug!(shape = %entry.shape, profile = ?config.profile, "detected json shape");

    let decoder = Decoder { config };
    let result = (entry.decode)(&decoder, doc);
    if let Err(err) = &result {
        debug!(shape = %entry.shape, error = %err, "json decode failed");
    }
    result
}

/// Decode a container from a JSON string with default configuration.
pub fn from_json(text: &str) -> Result<Container> {
    decode_json(text.as_bytes(), &JsonConfig::default())
}

/// Unified v2.0 document for `container`.
pub fn to_unified_document(container: &Container) -> UnifiedDocument {
    UnifiedDocument::from_container(container)
}

/// Compact unified v2.0 JSON.
pub fn to_unified_string(container: &Container) -> Result<String> {
    to_string(&to_unified_document(container), false)
}

/// Indented unified v2.0 JSON.
pub fn to_unified_pretty(container: &Container) -> Result<String> {
    to_string(&to_unified_document(container), true)
}

/// Legacy nested-header / object-values document. Duplicate names collapse
/// to the last value.
pub fn to_legacy_nested(container: &Container) -> LegacyNestedDocument {
    LegacyNestedDocument::from_container(container)
}

/// Legacy flat / array-values document.
pub fn to_legacy_flat(container: &Container) -> LegacyFlatDocument {
    LegacyFlatDocument::from_container(container)
}

/// Encode `container` as a JSON string in `shape`.
pub fn encode_json(container: &Container, shape: JsonShape, pretty: bool) -> Result<String> {
    match shape {
        JsonShape::Unified => to_string(&to_unified_document(container), pretty),
        JsonShape::LegacyNested => to_string(&to_legacy_nested(container), pretty),
        JsonShape::LegacyFlat => to_string(&to_legacy_flat(container), pretty),
    }
}

fn to_string<T: Serialize>(doc: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    out.map_err(|err| EnvelopeError::InvalidJson(err.to_string()))
}
