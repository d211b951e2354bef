//! Unified v2.0 shape, the canonical encode target.
//!
//! ```json
//! {"container":{"version":"2.0","metadata":{"message_type":"...","protocol_version":"1.0.0.0",
//!   "source":{"id":"...","sub_id":"..."},"target":{"id":"...","sub_id":"..."}},
//!   "values":[{"name":"...","type":13,"type_name":"string","data":"..."}]}}
//! ```

use envelope_core::{Container, EnvelopeError, Header, Result, Value};
use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::decode::{as_object, entry_error, header_error, header_string, Decoder};

/// Discriminator carried at `container.version`.
pub const UNIFIED_VERSION: &str = "2.0";

/// Top-level unified document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedDocument {
    pub container: UnifiedContainer,
}

/// Body of a unified document; also the `data` of nested containers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedContainer {
    pub version: String,
    pub metadata: UnifiedMetadata,
    pub values: Vec<UnifiedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedMetadata {
    pub message_type: String,
    pub protocol_version: String,
    pub source: Endpoint,
    pub target: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub id: String,
    pub sub_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedValue {
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: u8,
    /// Original tag name. Differs from `type` when the value was widened.
    pub type_name: &'static str,
    pub data: UnifiedData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UnifiedData {
    Text(String),
    Container(Box<UnifiedContainer>),
}

impl UnifiedDocument {
    pub fn from_container(container: &Container) -> Self {
        Self {
            container: UnifiedContainer::from_container(container),
        }
    }
}

impl UnifiedContainer {
    pub fn from_container(container: &Container) -> Self {
        let header = &container.header;
        Self {
            version: UNIFIED_VERSION.to_string(),
            metadata: UnifiedMetadata {
                message_type: header.message_type.clone(),
                protocol_version: header.version.clone(),
                source: Endpoint {
                    id: header.source_id.clone(),
                    sub_id: header.source_sub_id.clone(),
                },
                target: Endpoint {
                    id: header.target_id.clone(),
                    sub_id: header.target_sub_id.clone(),
                },
            },
            values: container.iter().map(UnifiedValue::from_value).collect(),
        }
    }
}

impl UnifiedValue {
    pub fn from_value(value: &Value) -> Self {
        let tag = value.tag();
        let data = match value.as_container() {
            Some(child) => UnifiedData::Container(Box::new(UnifiedContainer::from_container(child))),
            None => UnifiedData::Text(value.to_text().unwrap_or_default()),
        };
        Self {
            name: value.name().to_string(),
            type_id: tag.id(),
            type_name: wire_type_name(value),
            data,
        }
    }
}

/// Name written as `type_name`: the provenance tag when the value was widened
/// from it, otherwise the value's own tag.
fn wire_type_name(value: &Value) -> &'static str {
    let tag = value.tag();
    value
        .provenance()
        .filter(|original| original.widens_to() == Some(tag))
        .unwrap_or(tag)
        .name()
}

pub(crate) fn matches(doc: &Json) -> bool {
    doc.get("container")
        .and_then(|container| container.get("version"))
        .and_then(Json::as_str)
        == Some(UNIFIED_VERSION)
}

pub(crate) fn decode_document(decoder: &Decoder<'_>, doc: &Json) -> Result<Container> {
    let body = doc
        .get("container")
        .ok_or_else(|| EnvelopeError::UnknownJsonShape("missing container".into()).at_path("$"))?;
    decode_body(decoder, body, "$.container", 0)
}

fn decode_body(decoder: &Decoder<'_>, body: &Json, path: &str, depth: usize) -> Result<Container> {
    decoder.check_depth(depth, path)?;
    let map = as_object(body, path, entry_error)?;

    match map.get("version") {
        None => {}
        Some(Json::String(version)) if version == UNIFIED_VERSION => {}
        Some(other) => {
            return Err(EnvelopeError::UnknownJsonShape(format!(
                "unsupported container version {other}"
            ))
            .at_path(format!("{path}.version")))
        }
    }

    let mut container = Container::with_header(decode_metadata(map, path)?);

    let values_path = format!("{path}.values");
    let entries = match map.get("values") {
        Some(Json::Array(entries)) => entries,
        Some(_) => return Err(entry_error("values must be an array", &values_path)),
        None => return Err(entry_error("missing values", &values_path)),
    };
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = format!("{values_path}[{index}]");
        let entry = as_object(entry, &entry_path, entry_error)?;
        let name = match entry.get("name") {
            Some(Json::String(name)) => name,
            _ => return Err(entry_error("missing name", &format!("{entry_path}.name"))),
        };
        container.add(decoder.entry(name, entry, &entry_path, depth, decode_body)?);
    }
    Ok(container)
}

fn decode_metadata(body: &Map<String, Json>, path: &str) -> Result<Header> {
    let path = format!("{path}.metadata");
    let metadata = body
        .get("metadata")
        .ok_or_else(|| header_error("missing metadata", &path))?;
    let metadata = as_object(metadata, &path, header_error)?;

    let (source_id, source_sub_id) = decode_endpoint(metadata, "source", &path)?;
    let (target_id, target_sub_id) = decode_endpoint(metadata, "target", &path)?;
    Ok(Header {
        target_id,
        target_sub_id,
        source_id,
        source_sub_id,
        message_type: header_string(metadata, "message_type", &path)?,
        version: header_string(metadata, "protocol_version", &path)?,
    })
}

fn decode_endpoint(metadata: &Map<String, Json>, key: &str, path: &str) -> Result<(String, String)> {
    let path = format!("{path}.{key}");
    let endpoint = metadata
        .get(key)
        .ok_or_else(|| header_error("missing endpoint", &path))?;
    let endpoint = as_object(endpoint, &path, header_error)?;
    Ok((
        header_string(endpoint, "id", &path)?,
        header_string(endpoint, "sub_id", &path)?,
    ))
}

