//! Shape-independent pieces of JSON decoding: field access with JSON paths,
//! value construction, widening and depth accounting.

use envelope_core::{Container, EnvelopeError, Result, TypeTag, Value, FALSE_TOKEN, TRUE_TOKEN};
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::config::{JsonConfig, NativeProfile};

/// serde_json refuses documents nested deeper than this.
pub const JSON_NESTING_LIMIT: usize = 128;

/// JSON brackets added per level of container nesting, across all shapes.
const BRACKETS_PER_LEVEL: usize = 3;

/// Brackets around the outermost body plus header objects.
const BRACKETS_BASE: usize = 4;

/// Parses nested container bodies of one shape.
pub(crate) type BodyParser = fn(&Decoder<'_>, &Json, &str, usize) -> Result<Container>;

/// Decoding context shared by every shape.
pub(crate) struct Decoder<'c> {
    pub(crate) config: &'c JsonConfig,
}

impl Decoder<'_> {
    pub(crate) fn check_depth(&self, depth: usize, path: &str) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(EnvelopeError::MaxDepthExceeded {
                max: self.config.max_depth,
            }
            .at_path(path));
        }
        Ok(())
    }

    /// Build a value from one wire entry.
    ///
    /// `type_name` is only present in unified documents.
    pub(crate) fn entry(
        &self,
        name: &str,
        entry: &Map<String, Json>,
        path: &str,
        depth: usize,
        nested: BodyParser,
    ) -> Result<Value> {
        if name.is_empty() {
            return Err(EnvelopeError::EmptyName.at_path(path));
        }

        let type_path = format!("{path}.type");
        let tag = match entry.get("type") {
            Some(Json::Number(number)) => match number.as_i64() {
                Some(id) => TypeTag::from_id(id).map_err(|err| err.at_path(&type_path))?,
                None if number.is_u64() => {
                    return Err(
                        EnvelopeError::UnknownTypeTag(number.to_string()).at_path(&type_path)
                    )
                }
                None => return Err(entry_error("type must be an integer", &type_path)),
            },
            Some(_) => return Err(entry_error("type must be an integer", &type_path)),
            None => return Err(entry_error("missing type", &type_path)),
        };

        let original = match entry.get("type_name") {
            None => tag,
            Some(Json::String(type_name)) => {
                let name_path = format!("{path}.type_name");
                let original =
                    TypeTag::from_name(type_name).map_err(|err| err.at_path(&name_path))?;
                if original != tag && original.widens_to() != Some(tag) {
                    return Err(entry_error(
                        &format!("type_name {original} does not match type {tag}"),
                        &name_path,
                    ));
                }
                original
            }
            Some(_) => {
                return Err(entry_error(
                    "type_name must be a string",
                    &format!("{path}.type_name"),
                ))
            }
        };

        let data_path = format!("{path}.data");
        let data = entry.get("data");
        let value = if tag == TypeTag::Container {
            let Some(body) = data else {
                return Err(entry_error("missing container data", &data_path));
            };
            let child = nested(self, body, &data_path, depth + 1)?;
            Value::container(name, child).map_err(|err| err.at_path(&data_path))?
        } else {
            let text = scalar_text(tag, data, &data_path)?;
            Value::from_text(name, tag, &text).map_err(|err| err.at_path(&data_path))?
        };

        self.apply_profile(value, original)
            .map_err(|err| err.at_path(path))
    }

    fn apply_profile(&self, value: Value, original: TypeTag) -> Result<Value> {
        let tag = value.tag();
        match self.config.profile {
            NativeProfile::Full if original != tag => {
                debug!(value_name = value.name(), from = %tag, to = %original, "restored widened value");
                value.narrowed(original)
            }
            NativeProfile::Full => Ok(value),
            NativeProfile::Minimal => {
                let value = if original != tag {
                    value.with_provenance(original)
                } else {
                    value
                };
                if tag.widens_to().is_some() {
                    debug!(value_name = value.name(), from = %tag, "widened value for minimal consumer");
                    value.widened()
                } else {
                    Ok(value)
                }
            }
        }
    }
}

/// Text form of scalar data. Strings are taken verbatim; legacy producers
/// also send numbers, booleans and null.
fn scalar_text(tag: TypeTag, data: Option<&Json>, path: &str) -> Result<String> {
    match data {
        Some(Json::String(text)) => Ok(text.clone()),
        Some(Json::Number(number)) => Ok(number.to_string()),
        Some(Json::Bool(true)) => Ok(TRUE_TOKEN.to_string()),
        Some(Json::Bool(false)) => Ok(FALSE_TOKEN.to_string()),
        Some(Json::Null) | None if tag == TypeTag::Null => Ok(String::new()),
        None => Err(entry_error("missing data", path)),
        Some(_) => Err(entry_error(&format!("{tag} data must be a scalar"), path)),
    }
}

pub(crate) fn entry_error(reason: &str, path: &str) -> EnvelopeError {
    EnvelopeError::MalformedEntry(reason.to_string()).at_path(path)
}

pub(crate) fn header_error(reason: &str, path: &str) -> EnvelopeError {
    EnvelopeError::MalformedHeader(reason.to_string()).at_path(path)
}

/// Borrow `value` as an object or fail with `error`.
pub(crate) fn as_object<'a>(
    value: &'a Json,
    path: &str,
    error: fn(&str, &str) -> EnvelopeError,
) -> Result<&'a Map<String, Json>> {
    value
        .as_object()
        .ok_or_else(|| error("expected an object", path))
}

/// Required string member of a header object.
pub(crate) fn header_string(map: &Map<String, Json>, key: &str, path: &str) -> Result<String> {
    let path = format!("{path}.{key}");
    match map.get(key) {
        Some(Json::String(text)) => Ok(text.clone()),
        Some(_) => Err(header_error("expected a string", &path)),
        None => Err(header_error("missing field", &path)),
    }
}

/// Reject documents nested deeper than `max_depth` containers could produce,
/// before serde_json recurses into them.
pub(crate) fn check_nesting(src: &[u8], max_depth: usize) -> Result<()> {
    let limit = max_depth
        .saturating_mul(BRACKETS_PER_LEVEL)
        .saturating_add(BRACKETS_BASE)
        .min(JSON_NESTING_LIMIT);

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &byte) in src.iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Err(EnvelopeError::MaxDepthExceeded { max: max_depth }.at_offset(offset));
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use envelope_core::ErrorKind;

    #[test]
    fn nesting_scan_ignores_brackets_in_strings() {
        let text = format!(r#"{{"a":"{}"}}"#, "[".repeat(500));
        assert!(check_nesting(text.as_bytes(), 1).is_ok());
    }

    #[test]
    fn nesting_scan_rejects_deep_documents() {
        let text = format!("{}{}", "[".repeat(200), "]".repeat(200));
        let err = check_nesting(text.as_bytes(), 32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MaxDepthExceeded);
    }

    #[test]
    fn nesting_scan_handles_escaped_quotes() {
        let text = r#"{"a":"x\"[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[[["}"#;
        assert!(check_nesting(text.as_bytes(), 0).is_ok());
    }
}
