use std::collections::HashMap;

use super::value::Value;

/// Name→value map used both for expression parameters and for the per-call
/// evaluation context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    data: HashMap<String, Value>,
}

impl Bindings {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, builder-style.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Bind a value (mutable reference version).
    pub fn insert(&mut self, name: &str, value: Value) {
        self.data.insert(name.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<S: Into<String>, V: Into<Value>> FromIterator<(S, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Bindings {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let b = Bindings::new().set("name", "alice").set("age", 25_i64);
        assert_eq!(b.get("name"), Some(&Value::String("alice".to_owned())));
        assert_eq!(b.get("age"), Some(&Value::Int(25)));
        assert_eq!(b.get("missing"), None);
    }

    #[test]
    fn insert_overwrites() {
        let mut b = Bindings::new();
        b.insert("x", Value::Int(1));
        b.insert("x", Value::Int(2));
        assert_eq!(b.get("x"), Some(&Value::Int(2)));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn from_iterator() {
        let b: Bindings = [("a", 1_i64), ("b", 2_i64)].into_iter().collect();
        assert!(b.contains("a"));
        assert!(b.contains("b"));
        assert_eq!(b.len(), 2);
    }
}
