use std::fmt;

use envelope_core::{Container, EnvelopeError, Result};
use serde_json::Value as Json;

use crate::decode::Decoder;
use crate::{legacy, unified};

/// JSON document shapes understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonShape {
    /// `{"container":{"version":"2.0",...}}`
    Unified,
    /// `{"header":{...},"values":{"name":{...}}}`
    LegacyNested,
    /// `{"message_type":...,"values":[{"name":...}]}`
    LegacyFlat,
}

impl JsonShape {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unified => "unified",
            Self::LegacyNested => "legacy-nested",
            Self::LegacyFlat => "legacy-flat",
        }
    }
}

impl fmt::Display for JsonShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A structural signature paired with the parser for documents that carry it.
pub(crate) struct ShapeEntry {
    pub(crate) shape: JsonShape,
    pub(crate) matches: fn(&Json) -> bool,
    pub(crate) decode: fn(&Decoder<'_>, &Json) -> Result<Container>,
}

/// Detectors in priority order. The first match wins.
pub(crate) static SHAPES: [ShapeEntry; 3] = [
    ShapeEntry {
        shape: JsonShape::Unified,
        matches: unified::matches,
        decode: unified::decode_document,
    },
    ShapeEntry {
        shape: JsonShape::LegacyNested,
        matches: legacy::matches_nested,
        decode: legacy::decode_nested_document,
    },
    ShapeEntry {
        shape: JsonShape::LegacyFlat,
        matches: legacy::matches_flat,
        decode: legacy::decode_flat_document,
    },
];

pub(crate) fn find_shape(doc: &Json) -> Result<&'static ShapeEntry> {
    if !doc.is_object() {
        return Err(EnvelopeError::UnknownJsonShape("top level is not an object".into()).at_path("$"));
    }
    SHAPES
        .iter()
        .find(|entry| (entry.matches)(doc))
        .ok_or_else(|| {
            EnvelopeError::UnknownJsonShape("no known shape matches the document".into())
                .at_path("$")
        })
}

/// Identify the shape of a parsed JSON document.
pub fn detect_shape(doc: &Json) -> Result<JsonShape> {
    find_shape(doc).map(|entry| entry.shape)
}
