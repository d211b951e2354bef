//! Typed, named value containers exchanged between independently implemented
//! services, with a custom text wire format and three JSON encodings.
//!
//! # Crate Structure
//!
//! - [`model`]: type registry, values, headers and containers
//! - [`text`]: the `@header={...};@data={...};` codec
//! - [`json`]: legacy and unified JSON codecs plus the format adapter
//! - [`schema`]: JSON Schema validation of unified documents (behind `schema` feature)
//!
//! ```
//! use envelope::{from_any, to_text, Container, Header, Value};
//!
//! let header = Header::new("ping").with_target("server", "handler");
//! let ping = Container::with_header(header).with_value(Value::int("seq", 7)?);
//! let wire = to_text(&ping);
//! assert_eq!(from_any(wire.as_bytes())?, ping);
//! # Ok::<(), envelope::EnvelopeError>(())
//! ```

/// Re-export data model types.
pub mod model {
    pub use envelope_core::*;
}

/// Re-export text codec.
pub mod text {
    pub use envelope_text::*;
}

/// Re-export JSON codecs and the format adapter.
pub mod json {
    pub use envelope_json::*;
}

/// Re-export schema validation (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use envelope_json::schema::*;
}

pub use envelope_core::{
    Container, EnvelopeError, ErrorKind, Header, Location, Payload, Result, TypeTag, Value,
    DEFAULT_MAX_DEPTH,
};
pub use envelope_json::{
    convert, detect_format, from_any, from_any_with, from_json, to_unified, to_unified_string,
    AdapterConfig, Format, JsonConfig, JsonShape, NativeProfile,
};
pub use envelope_text::{from_text, to_text, TextConfig};
