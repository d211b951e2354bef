use base64::prelude::*;
use bytes::Bytes;

use crate::container::Container;
use crate::error::{EnvelopeError, Result};
use crate::tag::{tag_of, TypeTag};

/// Literal token for `true` in every text encoding.
pub const TRUE_TOKEN: &str = "true";
/// Literal token for `false` in every text encoding.
pub const FALSE_TOKEN: &str = "false";

/// Native payload of a value, one variant per [`TypeTag`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    LLong(i64),
    ULLong(u64),
    Float(f32),
    Double(f64),
    Bytes(Bytes),
    String(String),
    Container(Box<Container>),
}

/// A named, type-tagged datum.
///
/// Immutable once built; replace by constructing a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    name: String,
    payload: Payload,
    provenance: Option<TypeTag>,
}

impl Value {
    /// Create a value, rejecting empty names.
    pub fn new(name: impl Into<String>, payload: Payload) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(EnvelopeError::EmptyName);
        }
        Ok(Self {
            name,
            payload,
            provenance: None,
        })
    }

    pub fn null(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Payload::Null)
    }

    pub fn bool(name: impl Into<String>, value: bool) -> Result<Self> {
        Self::new(name, Payload::Bool(value))
    }

    pub fn int(name: impl Into<String>, value: i32) -> Result<Self> {
        Self::new(name, Payload::Int(value))
    }

    pub fn long(name: impl Into<String>, value: i64) -> Result<Self> {
        Self::new(name, Payload::Long(value))
    }

    pub fn double(name: impl Into<String>, value: f64) -> Result<Self> {
        Self::new(name, Payload::Double(value))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(name, Payload::String(value.into()))
    }

    /// STRING value from raw bytes that must be UTF-8.
    pub fn string_from_utf8(name: impl Into<String>, raw: Vec<u8>) -> Result<Self> {
        let text =
            String::from_utf8(raw).map_err(|err| EnvelopeError::InvalidUtf8(err.to_string()))?;
        Self::string(name, text)
    }

    pub fn bytes(name: impl Into<String>, value: impl Into<Bytes>) -> Result<Self> {
        Self::new(name, Payload::Bytes(value.into()))
    }

    pub fn container(name: impl Into<String>, value: Container) -> Result<Self> {
        Self::new(name, Payload::Container(Box::new(value)))
    }

    /// Integer value for any integer tag, range-checked against the tag's width.
    pub fn integer(name: impl Into<String>, tag: TypeTag, value: i128) -> Result<Self> {
        let out_of_range = || EnvelopeError::ValueOutOfRange {
            tag,
            value: value.to_string(),
        };
        let payload = match tag {
            TypeTag::Short => Payload::Short(value.try_into().map_err(|_| out_of_range())?),
            TypeTag::UShort => Payload::UShort(value.try_into().map_err(|_| out_of_range())?),
            TypeTag::Int => Payload::Int(value.try_into().map_err(|_| out_of_range())?),
            TypeTag::UInt => Payload::UInt(value.try_into().map_err(|_| out_of_range())?),
            TypeTag::Long => Payload::Long(value.try_into().map_err(|_| out_of_range())?),
            TypeTag::ULong => Payload::ULong(value.try_into().map_err(|_| out_of_range())?),
            TypeTag::LLong => Payload::LLong(value.try_into().map_err(|_| out_of_range())?),
            TypeTag::ULLong => Payload::ULLong(value.try_into().map_err(|_| out_of_range())?),
            other => {
                return Err(EnvelopeError::MalformedEntry(format!(
                    "{other} is not an integer type"
                )))
            }
        };
        Self::new(name, payload)
    }

    /// Build a scalar value from its canonical text encoding.
    ///
    /// This is the payload form shared by the text format and every JSON
    /// shape. CONTAINER has no scalar form and is rejected.
    pub fn from_text(name: impl Into<String>, tag: TypeTag, text: &str) -> Result<Self> {
        let payload = match tag {
            TypeTag::Null => {
                if !text.is_empty() {
                    return Err(EnvelopeError::MalformedEntry(format!(
                        "null value carries data {text:?}"
                    )));
                }
                Payload::Null
            }
            TypeTag::Bool => match text {
                TRUE_TOKEN => Payload::Bool(true),
                FALSE_TOKEN => Payload::Bool(false),
                other => {
                    return Err(EnvelopeError::MalformedEntry(format!(
                        "invalid bool token {other:?}"
                    )))
                }
            },
            tag if tag.is_integer() => {
                let parsed: i128 = text.parse().map_err(|_| {
                    EnvelopeError::MalformedEntry(format!("invalid {tag} literal {text:?}"))
                })?;
                return Self::integer(name, tag, parsed);
            }
            TypeTag::Float => Payload::Float(parse_float(tag, text)?),
            TypeTag::Double => Payload::Double(parse_float(tag, text)?),
            TypeTag::Bytes => Payload::Bytes(Bytes::from(BASE64_STANDARD.decode(text)?)),
            TypeTag::String => Payload::String(text.to_string()),
            _ => {
                return Err(EnvelopeError::MalformedEntry(
                    "container has no scalar text form".to_string(),
                ))
            }
        };
        Self::new(name, payload)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> TypeTag {
        tag_of(&self.payload)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// Original wire tag when this value was widened on decode.
    pub fn provenance(&self) -> Option<TypeTag> {
        self.provenance
    }

    /// True when decoding widened this value away from its wire tag.
    pub fn is_widened(&self) -> bool {
        self.provenance.is_some_and(|original| original != self.tag())
    }

    /// Canonical text encoding, or `None` for CONTAINER.
    pub fn to_text(&self) -> Option<String> {
        let text = match &self.payload {
            Payload::Null => String::new(),
            Payload::Bool(true) => TRUE_TOKEN.to_string(),
            Payload::Bool(false) => FALSE_TOKEN.to_string(),
            Payload::Short(v) => v.to_string(),
            Payload::UShort(v) => v.to_string(),
            Payload::Int(v) => v.to_string(),
            Payload::UInt(v) => v.to_string(),
            Payload::Long(v) | Payload::LLong(v) => v.to_string(),
            Payload::ULong(v) | Payload::ULLong(v) => v.to_string(),
            Payload::Float(v) => v.to_string(),
            Payload::Double(v) => v.to_string(),
            Payload::Bytes(v) => BASE64_STANDARD.encode(v),
            Payload::String(v) => v.clone(),
            Payload::Container(_) => return None,
        };
        Some(text)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Any integer payload as `i128`.
    pub fn as_integer(&self) -> Option<i128> {
        match self.payload {
            Payload::Short(v) => Some(v.into()),
            Payload::UShort(v) => Some(v.into()),
            Payload::Int(v) => Some(v.into()),
            Payload::UInt(v) => Some(v.into()),
            Payload::Long(v) | Payload::LLong(v) => Some(v.into()),
            Payload::ULong(v) | Payload::ULLong(v) => Some(v.into()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.payload {
            Payload::Float(v) => Some(v.into()),
            Payload::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.payload {
            Payload::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match &self.payload {
            Payload::Container(v) => Some(v),
            _ => None,
        }
    }

    /// Record the wire tag this value was decoded from.
    pub fn with_provenance(mut self, original: TypeTag) -> Self {
        self.provenance = Some(original);
        self
    }

    /// Widen to the next tag a minimal consumer supports.
    ///
    /// Tags without a widening target are returned unchanged. The original tag
    /// is kept as provenance. Fails with `ValueOutOfRange` when the value does
    /// not fit the wider tag (unsigned 64-bit values above `i64::MAX`).
    pub fn widened(self) -> Result<Self> {
        let tag = self.tag();
        let Some(wider) = tag.widens_to() else {
            return Ok(self);
        };
        let original = self.provenance.unwrap_or(tag);
        let value = self.as_integer().ok_or_else(|| {
            EnvelopeError::MalformedEntry(format!("{tag} does not carry an integer"))
        })?;
        Ok(Self::integer(self.name, wider, value)?.with_provenance(original))
    }

    /// Restore a value widened from `original` back to that tag.
    pub fn narrowed(self, original: TypeTag) -> Result<Self> {
        let tag = self.tag();
        if tag == original {
            return Ok(Self {
                provenance: None,
                ..self
            });
        }
        if original.widens_to() != Some(tag) {
            return Err(EnvelopeError::MalformedEntry(format!(
                "{original} does not widen to {tag}"
            )));
        }
        let value = self.as_integer().ok_or_else(|| {
            EnvelopeError::MalformedEntry(format!("{tag} does not carry an integer"))
        })?;
        Self::integer(self.name, original, value)
    }
}

fn parse_float<T: std::str::FromStr>(tag: TypeTag, text: &str) -> Result<T> {
    text.parse()
        .map_err(|_| EnvelopeError::MalformedEntry(format!("invalid {tag} literal {text:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn empty_name_rejected() {
        assert_eq!(Value::int("", 1).unwrap_err().kind(), ErrorKind::EmptyName);
    }

    #[test]
    fn integer_ranges_are_enforced() {
        assert!(Value::integer("v", TypeTag::Short, i16::MAX as i128).is_ok());
        assert!(Value::integer("v", TypeTag::Short, i16::MIN as i128).is_ok());

        let cases = [
            (TypeTag::Short, i16::MAX as i128 + 1),
            (TypeTag::Short, i16::MIN as i128 - 1),
            (TypeTag::UShort, -1),
            (TypeTag::Int, i32::MAX as i128 + 1),
            (TypeTag::UInt, u32::MAX as i128 + 1),
            (TypeTag::Long, i64::MIN as i128 - 1),
            (TypeTag::ULong, -1),
            (TypeTag::ULLong, u64::MAX as i128 + 1),
        ];
        for (tag, value) in cases {
            let err = Value::integer("v", tag, value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueOutOfRange, "{tag} {value}");
        }
    }

    #[test]
    fn from_text_parses_every_scalar_tag() {
        assert_eq!(Value::from_text("n", TypeTag::Null, "").unwrap().payload(), &Payload::Null);
        assert_eq!(
            Value::from_text("b", TypeTag::Bool, "true").unwrap().as_bool(),
            Some(true)
        );
        assert_eq!(
            Value::from_text("s", TypeTag::Short, "-32768").unwrap().payload(),
            &Payload::Short(i16::MIN)
        );
        assert_eq!(
            Value::from_text("u", TypeTag::ULLong, "18446744073709551615")
                .unwrap()
                .payload(),
            &Payload::ULLong(u64::MAX)
        );
        assert_eq!(
            Value::from_text("f", TypeTag::Float, "1.5").unwrap().payload(),
            &Payload::Float(1.5)
        );
        assert_eq!(
            Value::from_text("b", TypeTag::Bytes, "AAH/").unwrap().as_bytes().unwrap().as_ref(),
            &[0x00, 0x01, 0xff]
        );
        assert_eq!(
            Value::from_text("s", TypeTag::String, "a,b").unwrap().as_str(),
            Some("a,b")
        );
    }

    #[test]
    fn from_text_rejections() {
        let kind = |tag, text| Value::from_text("v", tag, text).unwrap_err().kind();
        assert_eq!(kind(TypeTag::Bool, "TRUE"), ErrorKind::MalformedEntry);
        assert_eq!(kind(TypeTag::Int, "seven"), ErrorKind::MalformedEntry);
        assert_eq!(kind(TypeTag::Short, "40000"), ErrorKind::ValueOutOfRange);
        assert_eq!(kind(TypeTag::Bytes, "not base64!"), ErrorKind::InvalidBase64);
        assert_eq!(kind(TypeTag::Null, "x"), ErrorKind::MalformedEntry);
        assert_eq!(kind(TypeTag::Container, ""), ErrorKind::MalformedEntry);
    }

    #[test]
    fn string_requires_utf8() {
        let err = Value::string_from_utf8("s", vec![0xff, 0xfe]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
        assert!(Value::string_from_utf8("s", "é".as_bytes().to_vec()).is_ok());
    }

    #[test]
    fn text_round_trips_floats() {
        for v in [0.1f64, -1.0e-300, f64::MAX, f64::MIN_POSITIVE, 1.0 / 3.0] {
            let value = Value::double("d", v).unwrap();
            let text = value.to_text().unwrap();
            let back = Value::from_text("d", TypeTag::Double, &text).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn widening_keeps_provenance() {
        let value = Value::integer("s", TypeTag::Short, -7).unwrap();
        let wide = value.widened().unwrap();
        assert_eq!(wide.tag(), TypeTag::Int);
        assert_eq!(wide.as_integer(), Some(-7));
        assert_eq!(wide.provenance(), Some(TypeTag::Short));
        assert!(wide.is_widened());

        let restored = wide.narrowed(TypeTag::Short).unwrap();
        assert_eq!(restored, Value::integer("s", TypeTag::Short, -7).unwrap());
    }

    #[test]
    fn widening_unsigned_above_long_fails() {
        let value = Value::integer("u", TypeTag::ULLong, u64::MAX.into()).unwrap();
        assert_eq!(value.widened().unwrap_err().kind(), ErrorKind::ValueOutOfRange);
    }

    #[test]
    fn non_widening_tags_unchanged() {
        let value = Value::string("s", "x").unwrap();
        assert_eq!(value.clone().widened().unwrap(), value);
    }

    #[test]
    fn narrowing_rejects_unrelated_tags() {
        let value = Value::int("i", 1).unwrap();
        let err = value.narrowed(TypeTag::UInt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEntry);
    }
}
