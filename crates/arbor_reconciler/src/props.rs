//! Prop sets

use arbor_scene::{HandlerEvent, HandlerKind, SceneGraph, Value};
use indexmap::IndexMap;

/// Keys that never become object fields
pub const RESERVED_KEYS: &[&str] = &["children", "key", "ref", "args", "attach", "object"];

/// Prefix that marks an event binding
pub const HANDLER_PREFIX: &str = "on";

/// Whether a key is reserved for the reconciler
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Whether a prop binds an event handler
pub fn is_handler(key: &str, value: &Value) -> bool {
    key.starts_with(HANDLER_PREFIX) && matches!(value, Value::Callback(_))
}

/// Mapping from prop name to value
///
/// Keys may be dotted paths (`"position-x"`). Iteration follows insertion
/// order, but no semantics depend on it.
#[derive(Clone, Debug, Default)]
pub struct Props {
    entries: IndexMap<String, Value>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prop (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Bind a handler (builder style)
    pub fn on<F>(mut self, kind: HandlerKind, callback: F) -> Self
    where
        F: Fn(&mut SceneGraph, &HandlerEvent) + 'static,
    {
        self.set_handler(kind, callback);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Typed handler registration
    pub fn set_handler<F>(&mut self, kind: HandlerKind, callback: F)
    where
        F: Fn(&mut SceneGraph, &HandlerEvent) + 'static,
    {
        self.entries
            .insert(kind.prop_key().to_string(), Value::callback(callback));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shallow equality: same keys, each value [`Value::same`]
    pub fn same(&self, other: &Props) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o.same(v)))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
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
    fn test_handler_detection() {
        let cb = Value::callback(|_, _| {});
        assert!(is_handler("onClick", &cb));
        assert!(!is_handler("onClick", &Value::Number(1.0)));
        assert!(!is_handler("click", &cb));
    }

    #[test]
    fn test_same_ignores_order() {
        let a = Props::new().with("x", 1.0).with("name", "a");
        let b = Props::new().with("name", "a").with("x", 1.0);
        assert!(a.same(&b));
        assert!(!a.same(&b.clone().with("y", 2.0)));
    }

    #[test]
    fn test_typed_handler_key() {
        let props = Props::new().on(HandlerKind::Unhover, |_, _| {});
        assert!(props.contains("onUnhover"));
        assert!(is_reserved("children"));
        assert!(is_reserved("args"));
        assert!(!is_reserved("position"));
    }
}
