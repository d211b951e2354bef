//! Typed, named value containers for cross-language message exchange.
//!
//! This is the data model shared by every codec:
//! - [`TypeTag`] and the static [`REGISTRY`] of the 15 wire-stable type tags
//! - [`Value`], a named datum with a tag-specific [`Payload`]
//! - [`Container`], an ordered list of values plus a routing [`Header`]
//!
//! Codecs live in `envelope-text` (custom text grammar) and `envelope-json`
//! (legacy and unified JSON shapes).

pub mod container;
pub mod error;
pub mod tag;
pub mod value;

pub use container::{Container, Header, DEFAULT_VERSION};
pub use error::{EnvelopeError, ErrorKind, Location, Result};
pub use tag::{tag_of, width_of, TypeInfo, TypeTag, Width, REGISTRY, TAG_COUNT};
pub use value::{Payload, Value, FALSE_TOKEN, TRUE_TOKEN};

/// Default maximum container nesting accepted by decoders.
pub const DEFAULT_MAX_DEPTH: usize = 32;
