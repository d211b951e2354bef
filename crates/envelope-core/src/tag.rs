//! Wire-stable value type tags.
//!
//! Tags 0-14 are part of the wire contract for every format and are never
//! renumbered. There is no extension mechanism: a new type means a registry
//! change and a version bump.

use std::fmt;

use crate::error::{EnvelopeError, Result};
use crate::value::Payload;

/// Value type tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Null = 0,
    Bool = 1,
    Short = 2,
    UShort = 3,
    Int = 4,
    UInt = 5,
    Long = 6,
    ULong = 7,
    LLong = 8,
    ULLong = 9,
    Float = 10,
    Double = 11,
    Bytes = 12,
    String = 13,
    Container = 14,
}

/// Encoded size of a tag's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Fixed(usize),
    Variable,
}

/// One row of the type registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub tag: TypeTag,
    pub name: &'static str,
    pub width: Width,
    /// Next wider tag a minimal consumer decodes this one into.
    pub widens_to: Option<TypeTag>,
}

/// Number of tags in the registry.
pub const TAG_COUNT: usize = 15;

/// The registry, indexed by tag id.
#[rustfmt::skip]
pub static REGISTRY: [TypeInfo; TAG_COUNT] = [
    TypeInfo { tag: TypeTag::Null, name: "null", width: Width::Fixed(0), widens_to: None },
    TypeInfo { tag: TypeTag::Bool, name: "bool", width: Width::Fixed(1), widens_to: None },
    TypeInfo { tag: TypeTag::Short, name: "short", width: Width::Fixed(2), widens_to: Some(TypeTag::Int) },
    TypeInfo { tag: TypeTag::UShort, name: "ushort", width: Width::Fixed(2), widens_to: Some(TypeTag::Int) },
    TypeInfo { tag: TypeTag::Int, name: "int", width: Width::Fixed(4), widens_to: None },
    TypeInfo { tag: TypeTag::UInt, name: "uint", width: Width::Fixed(4), widens_to: Some(TypeTag::Long) },
    TypeInfo { tag: TypeTag::Long, name: "long", width: Width::Fixed(8), widens_to: None },
    TypeInfo { tag: TypeTag::ULong, name: "ulong", width: Width::Fixed(8), widens_to: Some(TypeTag::Long) },
    TypeInfo { tag: TypeTag::LLong, name: "llong", width: Width::Fixed(8), widens_to: Some(TypeTag::Long) },
    TypeInfo { tag: TypeTag::ULLong, name: "ullong", width: Width::Fixed(8), widens_to: Some(TypeTag::Long) },
    TypeInfo { tag: TypeTag::Float, name: "float", width: Width::Fixed(4), widens_to: None },
    TypeInfo { tag: TypeTag::Double, name: "double", width: Width::Fixed(8), widens_to: None },
    TypeInfo { tag: TypeTag::Bytes, name: "bytes", width: Width::Variable, widens_to: None },
    TypeInfo { tag: TypeTag::String, name: "string", width: Width::Variable, widens_to: None },
    TypeInfo { tag: TypeTag::Container, name: "container", width: Width::Variable, widens_to: None },
];

impl TypeTag {
    /// Look up a tag by its wire id.
    pub fn from_id(id: i64) -> Result<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| REGISTRY.get(index))
            .map(|info| info.tag)
            .ok_or_else(|| EnvelopeError::UnknownTypeTag(id.to_string()))
    }

    /// Look up a tag by its canonical name.
    pub fn from_name(name: &str) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.tag)
            .ok_or_else(|| EnvelopeError::UnknownTypeTag(name.to_string()))
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn info(self) -> &'static TypeInfo {
        &REGISTRY[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn width(self) -> Width {
        self.info().width
    }

    pub fn widens_to(self) -> Option<TypeTag> {
        self.info().widens_to
    }

    pub fn is_integer(self) -> bool {
        (TypeTag::Short as u8..=TypeTag::ULLong as u8).contains(&(self as u8))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i64> for TypeTag {
    type Error = EnvelopeError;

    fn try_from(id: i64) -> Result<Self> {
        Self::from_id(id)
    }
}

/// Tag of a native payload.
pub fn tag_of(payload: &Payload) -> TypeTag {
    match payload {
        Payload::Null => TypeTag::Null,
        Payload::Bool(_) => TypeTag::Bool,
        Payload::Short(_) => TypeTag::Short,
        Payload::UShort(_) => TypeTag::UShort,
        Payload::Int(_) => TypeTag::Int,
        Payload::UInt(_) => TypeTag::UInt,
        Payload::Long(_) => TypeTag::Long,
        Payload::ULong(_) => TypeTag::ULong,
        Payload::LLong(_) => TypeTag::LLong,
        Payload::ULLong(_) => TypeTag::ULLong,
        Payload::Float(_) => TypeTag::Float,
        Payload::Double(_) => TypeTag::Double,
        Payload::Bytes(_) => TypeTag::Bytes,
        Payload::String(_) => TypeTag::String,
        Payload::Container(_) => TypeTag::Container,
    }
}

/// Encoded payload width of a tag.
pub fn width_of(tag: TypeTag) -> Width {
    tag.width()
}
