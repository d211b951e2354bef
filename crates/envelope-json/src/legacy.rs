//! Legacy JSON shapes, accepted on decode and emitted only for
//! backward-compatibility tooling.
//!
//! Nested-header / object-values:
//! ```json
//! {"header":{"target_id":"...","target_sub_id":"...","source_id":"...","source_sub_id":"...",
//!   "message_type":"...","version":"1.0.0.0"},"values":{"age":{"type":4,"data":"25"}}}
//! ```
//!
//! Flat / array-values:
//! ```json
//! {"message_type":"...","version":"1.0.0.0","source_id":"...","source_sub_id":"...",
//!   "target_id":"...","target_sub_id":"...","values":[{"name":"age","type":4,"data":"25"}]}
//! ```
//!
//! Neither shape carries provenance; widened values are written with their
//! widened tag. The nested shape keys values by name, so duplicate names
//! collapse to the last one.

use std::collections::HashMap;

use envelope_core::{Container, Header, Result, Value};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::decode::{as_object, entry_error, header_error, header_string, Decoder};

/// Header object of the nested shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyHeader {
    pub target_id: String,
    pub target_sub_id: String,
    pub source_id: String,
    pub source_sub_id: String,
    pub message_type: String,
    pub version: String,
}

/// Nested-header / object-values document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyNestedDocument {
    pub header: LegacyHeader,
    pub values: NamedEntries,
}

/// Entries serialized as a JSON object keyed by value name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedEntries(Vec<(String, LegacyEntry)>);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyEntry {
    #[serde(rename = "type")]
    pub type_id: u8,
    pub data: LegacyData<LegacyNestedDocument>,
}

/// Flat / array-values document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyFlatDocument {
    pub message_type: String,
    pub version: String,
    pub source_id: String,
    pub source_sub_id: String,
    pub target_id: String,
    pub target_sub_id: String,
    pub values: Vec<LegacyFlatEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyFlatEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: u8,
    pub data: LegacyData<LegacyFlatDocument>,
}

/// Scalar text or a nested document of the same shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegacyData<T> {
    Text(String),
    Container(Box<T>),
}

impl Serialize for NamedEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entry) in &self.0 {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl NamedEntries {
    /// Insert or replace in place, keeping the position of the first insert.
    fn upsert(&mut self, index: &mut HashMap<String, usize>, name: &str, entry: LegacyEntry) {
        match index.get(name) {
            Some(&slot) => self.0[slot].1 = entry,
            None => {
                index.insert(name.to_string(), self.0.len());
                self.0.push((name.to_string(), entry));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl LegacyNestedDocument {
    pub fn from_container(container: &Container) -> Self {
        let header = &container.header;
        let mut values = NamedEntries::default();
        let mut index = HashMap::new();
        for value in container {
            let data = match value.as_container() {
                Some(child) => LegacyData::Container(Box::new(Self::from_container(child))),
                None => LegacyData::Text(value.to_text().unwrap_or_default()),
            };
            let entry = LegacyEntry {
                type_id: value.tag().id(),
                data,
            };
            values.upsert(&mut index, value.name(), entry);
        }
        Self {
            header: LegacyHeader {
                target_id: header.target_id.clone(),
                target_sub_id: header.target_sub_id.clone(),
                source_id: header.source_id.clone(),
                source_sub_id: header.source_sub_id.clone(),
                message_type: header.message_type.clone(),
                version: header.version.clone(),
            },
            values,
        }
    }
}

impl LegacyFlatDocument {
    pub fn from_container(container: &Container) -> Self {
        let header = &container.header;
        Self {
            message_type: header.message_type.clone(),
            version: header.version.clone(),
            source_id: header.source_id.clone(),
            source_sub_id: header.source_sub_id.clone(),
            target_id: header.target_id.clone(),
            target_sub_id: header.target_sub_id.clone(),
            values: container.iter().map(LegacyFlatEntry::from_value).collect(),
        }
    }
}

impl LegacyFlatEntry {
    fn from_value(value: &Value) -> Self {
        let data = match value.as_container() {
            Some(child) => LegacyData::Container(Box::new(LegacyFlatDocument::from_container(child))),
            None => LegacyData::Text(value.to_text().unwrap_or_default()),
        };
        Self {
            name: value.name().to_string(),
            type_id: value.tag().id(),
            data,
        }
    }
}

/// Header fields shared by both legacy shapes, read from `map`.
fn decode_header(map: &Map<String, Json>, path: &str) -> Result<Header> {
    Ok(Header {
        target_id: header_string(map, "target_id", path)?,
        target_sub_id: header_string(map, "target_sub_id", path)?,
        source_id: header_string(map, "source_id", path)?,
        source_sub_id: header_string(map, "source_sub_id", path)?,
        message_type: header_string(map, "message_type", path)?,
        version: header_string(map, "version", path)?,
    })
}

pub(crate) fn matches_nested(doc: &Json) -> bool {
    doc.get("header").is_some_and(Json::is_object)
}

pub(crate) fn decode_nested_document(decoder: &Decoder<'_>, doc: &Json) -> Result<Container> {
    decode_nested_body(decoder, doc, "$", 0)
}

fn decode_nested_body(
    decoder: &Decoder<'_>,
    body: &Json,
    path: &str,
    depth: usize,
) -> Result<Container> {
    decoder.check_depth(depth, path)?;
    let map = as_object(body, path, entry_error)?;

    let header_path = format!("{path}.header");
    let header = map
        .get("header")
        .ok_or_else(|| header_error("missing header", &header_path))?;
    let header = as_object(header, &header_path, header_error)?;
    let mut container = Container::with_header(decode_header(header, &header_path)?);

    let values_path = format!("{path}.values");
    let entries = match map.get("values") {
        Some(Json::Object(entries)) => entries,
        Some(_) => return Err(entry_error("values must be an object", &values_path)),
        None => return Err(entry_error("missing values", &values_path)),
    };
    for (name, entry) in entries {
        let entry_path = format!("{values_path}[{name:?}]");
        let entry = as_object(entry, &entry_path, entry_error)?;
        container.add(decoder.entry(name, entry, &entry_path, depth, decode_nested_body)?);
    }
    Ok(container)
}

pub(crate) fn matches_flat(doc: &Json) -> bool {
    doc.get("values").is_some_and(Json::is_array)
}

pub(crate) fn decode_flat_document(decoder: &Decoder<'_>, doc: &Json) -> Result<Container> {
    decode_flat_body(decoder, doc, "$", 0)
}

fn decode_flat_body(
    decoder: &Decoder<'_>,
    body: &Json,
    path: &str,
    depth: usize,
) -> Result<Container> {
    decoder.check_depth(depth, path)?;
    let map = as_object(body, path, entry_error)?;
    let mut container = Container::with_header(decode_header(map, path)?);

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
        container.add(decoder.entry(name, entry, &entry_path, depth, decode_flat_body)?);
    }
    Ok(container)
}
