//! JSON encodings for envelope containers and the format adapter.
//!
//! Three document shapes decode into the same [`Container`](envelope_core::Container):
//! - unified v2.0, the canonical encode target
//! - legacy nested-header / object-values
//! - legacy flat / array-values
//!
//! The [`adapter`] sniffs any accepted input, including the custom text
//! format, and converts between formats.
//!
//! # Features
//!
//! - `schema`: JSON Schema validation of unified documents via `jsonschema`.

pub mod adapter;
pub mod codec;
pub mod config;
mod decode;
pub mod legacy;
#[cfg(feature = "schema")]
pub mod schema;
pub mod shape;
pub mod unified;

pub use adapter::{
    apply_profile, convert, detect_format, detect_format_with, encode, from_any, from_any_with,
    to_unified, AdapterConfig, Format,
};
pub use codec::{
    decode_json, decode_json_value, encode_json, from_json, to_legacy_flat, to_legacy_nested,
    to_unified_document, to_unified_pretty, to_unified_string,
};
pub use config::{JsonConfig, NativeProfile};
pub use decode::JSON_NESTING_LIMIT;
pub use shape::{detect_shape, JsonShape};
pub use unified::{UnifiedDocument, UNIFIED_VERSION};

#[cfg(feature = "schema")]
pub use schema::{SchemaConfig, UnifiedSchema, UNIFIED_SCHEMA};
