use std::fmt;

use crate::tag::TypeTag;

/// Where in the input a decode error was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Byte offset into text input.
    Offset(usize),
    /// JSON path such as `$.container.values[1].type`.
    Path(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Offset(offset) => write!(f, "byte {offset}"),
            Location::Path(path) => f.write_str(path),
        }
    }
}

/// Errors that can occur while building, encoding or decoding containers.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The header block is missing fields, misnumbered, or structurally broken.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A value entry is structurally broken.
    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    /// A type id outside the closed registry.
    #[error("unknown type tag {0}")]
    UnknownTypeTag(String),

    /// An integer does not fit the declared tag.
    #[error("value {value} out of range for {tag}")]
    ValueOutOfRange { tag: TypeTag, value: String },

    /// STRING data is not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// BYTES data is not valid base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Container nesting exceeds the configured maximum.
    #[error("container nesting exceeds max depth {max}")]
    MaxDepthExceeded { max: usize },

    /// JSON input matches none of the known shapes.
    #[error("unknown JSON shape: {0}")]
    UnknownJsonShape(String),

    /// A container was nested within itself.
    #[error("container cannot be nested within itself: {0}")]
    DuplicateCycle(String),

    /// Lookup miss.
    #[error("no value named {0:?}")]
    NotFound(String),

    /// A value was constructed with an empty name.
    #[error("value name must not be empty")]
    EmptyName,

    /// JSON input is not syntactically valid.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// A unified document failed JSON Schema validation.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// A decode error annotated with where it happened.
    #[error("{source} (at {at})")]
    Located {
        at: Location,
        #[source]
        source: Box<EnvelopeError>,
    },
}

/// Classification of an [`EnvelopeError`], looking through location wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedHeader,
    MalformedEntry,
    UnknownTypeTag,
    ValueOutOfRange,
    InvalidUtf8,
    InvalidBase64,
    MaxDepthExceeded,
    UnknownJsonShape,
    DuplicateCycle,
    NotFound,
    EmptyName,
    InvalidJson,
    SchemaViolation,
}

impl EnvelopeError {
    /// Attach a location. Errors that already carry one keep the innermost.
    pub fn at(self, at: Location) -> Self {
        match self {
            located @ EnvelopeError::Located { .. } => located,
            other => EnvelopeError::Located {
                at,
                source: Box::new(other),
            },
        }
    }

    /// Attach a byte offset.
    pub fn at_offset(self, offset: usize) -> Self {
        self.at(Location::Offset(offset))
    }

    /// Attach a JSON path.
    pub fn at_path(self, path: impl Into<String>) -> Self {
        self.at(Location::Path(path.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvelopeError::MalformedHeader(_) => ErrorKind::MalformedHeader,
            EnvelopeError::MalformedEntry(_) => ErrorKind::MalformedEntry,
            EnvelopeError::UnknownTypeTag(_) => ErrorKind::UnknownTypeTag,
            EnvelopeError::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            EnvelopeError::InvalidUtf8(_) => ErrorKind::InvalidUtf8,
            EnvelopeError::InvalidBase64(_) => ErrorKind::InvalidBase64,
            EnvelopeError::MaxDepthExceeded { .. } => ErrorKind::MaxDepthExceeded,
            EnvelopeError::UnknownJsonShape(_) => ErrorKind::UnknownJsonShape,
            EnvelopeError::DuplicateCycle(_) => ErrorKind::DuplicateCycle,
            EnvelopeError::NotFound(_) => ErrorKind::NotFound,
            EnvelopeError::EmptyName => ErrorKind::EmptyName,
            EnvelopeError::InvalidJson(_) => ErrorKind::InvalidJson,
            EnvelopeError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            EnvelopeError::Located { source, .. } => source.kind(),
        }
    }

    /// Position of a decode failure, if known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            EnvelopeError::Located { at, .. } => Some(at),
            _ => None,
        }
    }

    /// True for errors produced while parsing input, as opposed to lookups
    /// or value construction in application code.
    pub fn is_decode_error(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::EmptyName | ErrorKind::DuplicateCycle
        )
    }
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
