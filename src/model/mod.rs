//! Resource bundle model.
//!
//! A successful load produces a [`Resources`] value: a flat, named collection
//! of dynamically typed [`Resource`] entries. The shape intentionally mirrors
//! what configuration endpoints serve in practice — a JSON object whose
//! members are strings, numbers, booleans or nested collections — while
//! keeping lookups typed on the consumer side.

use std::collections::HashMap;

/// A single dynamically typed resource value.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Resource>),
    Map(HashMap<String, Resource>),
}

impl Resource {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Resource::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Resource::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Resource::Float(value) => Some(*value),
            Resource::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Resource::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Resource]> {
        match self {
            Resource::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Resource>> {
        match self {
            Resource::Map(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Resource::Null)
    }
}

impl From<serde_json::Value> for Resource {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Resource::Null,
            serde_json::Value::Bool(b) => Resource::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Resource::Integer(i),
                None => Resource::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Resource::String(s),
            serde_json::Value::Array(values) => {
                Resource::Array(values.into_iter().map(Resource::from).collect())
            }
            serde_json::Value::Object(members) => Resource::Map(
                members
                    .into_iter()
                    .map(|(name, value)| (name, Resource::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Named collection of [`Resource`] values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources {
    entries: HashMap<String, Resource>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Resource) -> Option<Resource> {
        self.entries.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.entries.get(name)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Resource::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Resource::as_bool)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Resource::as_integer)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Resource::as_float)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay `other` on top of this bundle; colliding names take the
    /// incoming value. Used to apply fetched resources over local defaults.
    pub fn merge(&mut self, other: Resources) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Resource)> for Resources {
    fn from_iter<I: IntoIterator<Item = (String, Resource)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let mut resources = Resources::new();
        resources.insert("title", Resource::String("hello".into()));
        resources.insert("enabled", Resource::Bool(true));
        resources.insert("retries", Resource::Integer(3));
        resources.insert("ratio", Resource::Float(0.5));

        assert_eq!(resources.get_string("title"), Some("hello"));
        assert_eq!(resources.get_bool("enabled"), Some(true));
        assert_eq!(resources.get_integer("retries"), Some(3));
        assert_eq!(resources.get_float("ratio"), Some(0.5));
        assert_eq!(resources.get_float("retries"), Some(3.0));
        assert_eq!(resources.get_string("missing"), None);
        assert_eq!(resources.get_bool("title"), None);
    }

    #[test]
    fn merge_prefers_incoming_values() {
        let mut base = Resources::new();
        base.insert("color", Resource::String("red".into()));
        base.insert("size", Resource::Integer(10));

        let mut fetched = Resources::new();
        fetched.insert("color", Resource::String("blue".into()));

        base.merge(fetched);
        assert_eq!(base.get_string("color"), Some("blue"));
        assert_eq!(base.get_integer("size"), Some(10));
    }

    #[test]
    fn json_values_map_onto_resources() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{"a": 1, "b": [true, "x"], "c": null}"#).unwrap();
        let resource = Resource::from(value);
        let map = resource.as_map().unwrap();
        assert_eq!(map["a"], Resource::Integer(1));
        assert_eq!(
            map["b"],
            Resource::Array(vec![Resource::Bool(true), Resource::String("x".into())])
        );
        assert!(map["c"].is_null());
    }
}
