//! JSON Schema validation of unified v2.0 documents.

use envelope_core::{Container, EnvelopeError, Result};
use jsonschema::Validator;
use serde_json::{Map, Value as Json};

use crate::adapter::to_unified;

/// Embedded JSON Schema (draft 2020-12) for unified v2.0 documents.
pub const UNIFIED_SCHEMA: &str = include_str!("../schemas/unified-v2.schema.json");

/// Number of validation messages joined into one `SchemaViolation`.
const MAX_REPORTED_ERRORS: usize = 4;

/// Controls schema validation behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaConfig {
    /// When true, documents with members the schema does not name are rejected.
    pub strict_mode: bool,
}

/// Compiled validator for the unified v2.0 schema.
pub struct UnifiedSchema {
    validator: Validator,
    config: SchemaConfig,
}

impl UnifiedSchema {
    pub fn new(config: SchemaConfig) -> Result<Self> {
        let mut schema: Json = serde_json::from_str(UNIFIED_SCHEMA)
            .map_err(|err| EnvelopeError::InvalidJson(err.to_string()))?;
        if config.strict_mode {
            apply_strict_mode(&mut schema);
        }

        let validator = jsonschema::validator_for(&schema).map_err(|err| {
            EnvelopeError::SchemaViolation(format!("schema failed to compile: {err}"))
        })?;
        Ok(Self { validator, config })
    }

    /// Validate a parsed document.
    pub fn validate(&self, doc: &Json) -> Result<()> {
        let mut errors = self.validator.iter_errors(doc);
        if let Some(first) = errors.next() {
            let mut message = first.to_string();
            for err in errors.take(MAX_REPORTED_ERRORS - 1) {
                message.push_str("; ");
                message.push_str(&err.to_string());
            }
            return Err(EnvelopeError::SchemaViolation(message));
        }
        Ok(())
    }

    /// Parse and validate a serialized document.
    pub fn validate_bytes(&self, src: &[u8]) -> Result<()> {
        let doc: Json = serde_json::from_slice(src)
            .map_err(|err| EnvelopeError::InvalidJson(err.to_string()).at_path("$"))?;
        self.validate(&doc)
    }

    /// Validate the unified encoding of `container`.
    pub fn validate_container(&self, container: &Container) -> Result<()> {
        self.validate(&to_unified(container)?)
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }
}

/// Close every object schema to members it does not declare.
fn apply_strict_mode(value: &mut Json) {
    match value {
        Json::Object(map) => {
            if is_object_schema(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Json::Bool(false));
            }
            for key in ["properties", "$defs"] {
                if let Some(Json::Object(children)) = map.get_mut(key) {
                    children.values_mut().for_each(apply_strict_mode);
                }
            }
            for key in ["items", "additionalProperties"] {
                if let Some(child) = map.get_mut(key) {
                    apply_strict_mode(child);
                }
            }
            for key in ["anyOf", "allOf", "oneOf"] {
                if let Some(Json::Array(items)) = map.get_mut(key) {
                    items.iter_mut().for_each(apply_strict_mode);
                }
            }
        }
        Json::Array(items) => items.iter_mut().for_each(apply_strict_mode),
        _ => {}
    }
}

fn is_object_schema(map: &Map<String, Json>) -> bool {
    match map.get("type") {
        Some(Json::String(kind)) => kind == "object",
        Some(Json::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => map.contains_key("properties") || map.contains_key("required"),
    }
}
