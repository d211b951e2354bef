//! Format sniffing and conversion between every accepted wire format.
//!
//! All functions are pure: input is never mutated and repeated calls give the
//! same result.

use std::fmt;
use std::str::FromStr;

use envelope_core::{Container, EnvelopeError, Payload, Result, Value};
use envelope_text::{decode_text, is_text_format, to_text, TextConfig};
use serde_json::Value as Json;
use tracing::debug;

use crate::codec::{decode_json, encode_json, to_unified_document};
use crate::config::{JsonConfig, NativeProfile};
use crate::decode::check_nesting;
use crate::shape::{detect_shape, JsonShape};

/// A wire format recognised by [`detect_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `@header={...};@data={...};`
    Text,
    Json(JsonShape),
}

impl Format {
    pub const UNIFIED: Self = Self::Json(JsonShape::Unified);

    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json(shape) => shape.name(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "unified" => Ok(Self::UNIFIED),
            "legacy-nested" => Ok(Self::Json(JsonShape::LegacyNested)),
            "legacy-flat" => Ok(Self::Json(JsonShape::LegacyFlat)),
            other => Err(format!(
                "unknown format {other:?} (expected text, unified, legacy-nested or legacy-flat)"
            )),
        }
    }
}

/// Decoder settings for every accepted format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    pub text: TextConfig,
    pub json: JsonConfig,
}

impl AdapterConfig {
    /// Apply the same nesting limit to every decoder.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.text.max_depth = max_depth;
        self.json.max_depth = max_depth;
        self
    }
}

/// Identify the wire format of `src` without building a container.
pub fn detect_format(src: &[u8]) -> Result<Format> {
    detect_format_with(src, &AdapterConfig::default())
}

/// Identify the wire format of `src`, bounding JSON nesting by `config`.
pub fn detect_format_with(src: &[u8], config: &AdapterConfig) -> Result<Format> {
    if is_text_format(src) {
        return Ok(Format::Text);
    }
    check_nesting(src, config.json.max_depth)?;
    let doc: Json = serde_json::from_slice(src)
        .map_err(|err| EnvelopeError::InvalidJson(err.to_string()).at_path("$"))?;
    detect_shape(&doc).map(Format::Json)
}

/// Decode any accepted format with default configuration.
pub fn from_any(src: &[u8]) -> Result<Container> {
    from_any_with(src, &AdapterConfig::default())
}

/// Decode any accepted format. Text input is recognised by its leading
/// `@header=`; everything else is parsed as JSON and its shape detected.
pub fn from_any_with(src: &[u8], config: &AdapterConfig) -> Result<Container> {
    if is_text_format(src) {
        debug!(format = "text", "routing to text codec");
        let container = decode_text(src, &config.text)?;
        apply_profile(container, config.json.profile)
    } else {
        debug!(format = "json", "routing to json codec");
        decode_json(src, &config.json)
    }
}

/// Widen a container decoded from a format without type names so that a
/// minimal consumer sees the same values whatever format they arrived in.
/// Nested containers are walked; full consumers get the container back as is.
pub fn apply_profile(mut container: Container, profile: NativeProfile) -> Result<Container> {
    if profile == NativeProfile::Full {
        return Ok(container);
    }

    let mut widened = Container::with_header(std::mem::take(&mut container.header));
    for value in container.into_values() {
        let value = if value.as_container().is_some() {
            let name = value.name().to_string();
            match value.into_payload() {
                Payload::Container(child) => {
                    Value::container(name, apply_profile(*child, profile)?)?
                }
                other => Value::new(name, other)?,
            }
        } else if value.tag().widens_to().is_some() {
            debug!(value_name = value.name(), from = %value.tag(), "widened value for minimal consumer");
            value.widened()?
        } else {
            value
        };
        widened.add(value);
    }
    Ok(widened)
}

/// Unified v2.0 JSON value for `container`.
pub fn to_unified(container: &Container) -> Result<Json> {
    serde_json::to_value(to_unified_document(container))
        .map_err(|err| EnvelopeError::InvalidJson(err.to_string()))
}

/// Re-encode a container in `format`.
pub fn encode(container: &Container, format: Format, pretty: bool) -> Result<String> {
    match format {
        Format::Text => Ok(to_text(container)),
        Format::Json(shape) => encode_json(container, shape, pretty),
    }
}

/// Decode any accepted input and re-encode it in `target`.
pub fn convert(src: &[u8], target: Format, config: &AdapterConfig) -> Result<String> {
    let container = from_any_with(src, config)?;
    encode(&container, target, false)
}
