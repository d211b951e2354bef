use crate::error::{EnvelopeError, Result};
use crate::value::{Payload, Value};

/// Default header version string.
pub const DEFAULT_VERSION: &str = "1.0.0.0";

/// Routing metadata carried with every container.
///
/// Opaque to the codecs beyond structural presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub target_id: String,
    pub target_sub_id: String,
    pub source_id: String,
    pub source_sub_id: String,
    pub message_type: String,
    pub version: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            target_id: String::new(),
            target_sub_id: String::new(),
            source_id: String::new(),
            source_sub_id: String::new(),
            message_type: String::new(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl Header {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, id: impl Into<String>, sub_id: impl Into<String>) -> Self {
        self.target_id = id.into();
        self.target_sub_id = sub_id.into();
        self
    }

    pub fn with_source(mut self, id: impl Into<String>, sub_id: impl Into<String>) -> Self {
        self.source_id = id.into();
        self.source_sub_id = sub_id.into();
        self
    }

    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = message_type.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Header for a reply: source and target exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            target_id: self.source_id.clone(),
            target_sub_id: self.source_sub_id.clone(),
            source_id: self.target_id.clone(),
            source_sub_id: self.target_sub_id.clone(),
            message_type: self.message_type.clone(),
            version: self.version.clone(),
        }
    }
}

/// Ordered collection of named values plus a routing header.
///
/// Duplicate names are kept in append order so order-preserving formats
/// serialize every entry; [`Container::get`] returns the last one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub header: Header,
    values: Vec<Value>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header: Header) -> Self {
        Self {
            header,
            values: Vec::new(),
        }
    }

    /// Append a value.
    pub fn add(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Builder-style [`Container::add`].
    pub fn with_value(mut self, value: Value) -> Self {
        self.add(value);
        self
    }

    /// Append a CONTAINER value owning `child`.
    pub fn add_container(&mut self, name: impl Into<String>, child: Container) -> Result<()> {
        self.add(Value::container(name, child)?);
        Ok(())
    }

    /// Last value appended under `name`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.values
            .iter()
            .rev()
            .find(|value| value.name() == name)
            .ok_or_else(|| EnvelopeError::NotFound(name.to_string()))
    }

    /// Every value appended under `name`, in append order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.values.iter().filter(move |value| value.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|value| value.name() == name)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Nesting depth: 0 when no value is a container.
    pub fn depth(&self) -> usize {
        self.values
            .iter()
            .filter_map(|value| match value.payload() {
                Payload::Container(child) => Some(child.depth() + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tag::TypeTag;

    fn header() -> Header {
        Header::new("user_profile")
            .with_target("server", "handler")
            .with_source("client", "session")
    }

    #[test]
    fn add_and_get() {
        let mut container = Container::with_header(header());
        container.add(Value::string("username", "alice").unwrap());
        container.add(Value::int("age", 25).unwrap());

        assert_eq!(container.len(), 2);
        assert_eq!(container.get("age").unwrap().as_integer(), Some(25));
        assert_eq!(container.get("username").unwrap().tag(), TypeTag::String);
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let container = Container::new();
        let err = container.get("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn duplicates_are_kept_and_last_wins() {
        let mut container = Container::new();
        container.add(Value::int("seq", 1).unwrap());
        container.add(Value::string("other", "x").unwrap());
        container.add(Value::int("seq", 2).unwrap());

        assert_eq!(container.len(), 3);
        assert_eq!(container.get("seq").unwrap().as_integer(), Some(2));
        let all: Vec<_> = container.get_all("seq").map(|v| v.as_integer()).collect();
        assert_eq!(all, vec![Some(1), Some(2)]);
    }

    #[test]
    fn values_keep_append_order() {
        let container = Container::new()
            .with_value(Value::int("b", 1).unwrap())
            .with_value(Value::int("a", 2).unwrap())
            .with_value(Value::int("c", 3).unwrap());
        let names: Vec<_> = container.iter().map(Value::name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn names_are_unique_per_level_only() {
        let inner = Container::new().with_value(Value::int("id", 1).unwrap());
        let mut outer = Container::new().with_value(Value::int("id", 2).unwrap());
        outer.add_container("child", inner).unwrap();

        assert_eq!(outer.get("id").unwrap().as_integer(), Some(2));
        let child = outer.get("child").unwrap().as_container().unwrap();
        assert_eq!(child.get("id").unwrap().as_integer(), Some(1));
    }

    #[test]
    fn depth_counts_nesting() {
        let mut level2 = Container::new();
        level2.add(Value::null("leaf").unwrap());
        let mut level1 = Container::new();
        level1.add_container("l2", level2).unwrap();
        let mut root = Container::new();
        root.add_container("l1", level1).unwrap();
        root.add(Value::int("flat", 0).unwrap());

        assert_eq!(root.depth(), 2);
        assert_eq!(Container::new().depth(), 0);
    }

    #[test]
    fn swapped_header_reverses_route() {
        let reply = header().swapped();
        assert_eq!(reply.target_id, "client");
        assert_eq!(reply.source_sub_id, "handler");
        assert_eq!(reply.message_type, "user_profile");
        assert_eq!(reply.version, DEFAULT_VERSION);
    }

    #[test]
    fn containers_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Container>();
        assert_send_sync::<Value>();
    }
}
