//! Scene objects
//!
//! Every object is a typed bag of named fields. Spatial objects additionally
//! carry a [`Spatial`] part with their place in the hierarchy; non-spatial
//! objects (geometries, materials) are only ever referenced from a field of
//! another object.

use crate::handlers::HandlerTable;
use crate::math::Vec3;
use crate::settable::{shared, Euler};
use crate::value::Value;
use indexmap::IndexMap;
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Stable identity of an object in a [`SceneGraph`](crate::SceneGraph)
    pub struct ObjectId;
}

/// Parent-child relationships of a spatial object
#[derive(Clone, Debug, Default)]
pub struct Spatial {
    /// Parent object (None for roots and detached objects)
    pub parent: Option<ObjectId>,
    /// Child objects in render order
    pub children: SmallVec<[ObjectId; 4]>,
}

impl Spatial {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// A live object
#[derive(Debug)]
pub struct Object {
    type_name: String,
    fields: IndexMap<String, Value>,
    spatial: Option<Spatial>,
    handlers: Option<HandlerTable>,
}

impl Object {
    /// Create a non-spatial object with no fields
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
            spatial: None,
            handlers: None,
        }
    }

    /// Create a spatial object with the default transform fields
    /// (`position`, `rotation`, `scale`, `visible`, `name`)
    pub fn spatial(type_name: impl Into<String>) -> Self {
        let mut object = Self::new(type_name);
        object.spatial = Some(Spatial::default());
        object
            .with_field("position", Value::Settable(shared(Vec3::ZERO)))
            .with_field("rotation", Value::Settable(shared(Euler::default())))
            .with_field("scale", Value::Settable(shared(Vec3::ONE)))
            .with_field("visible", Value::Bool(true))
            .with_field("name", Value::Text(String::new()))
    }

    /// Set a field (builder style)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether the object can hold children and be placed in the hierarchy
    pub fn is_spatial(&self) -> bool {
        self.spatial.is_some()
    }

    pub fn spatial_part(&self) -> Option<&Spatial> {
        self.spatial.as_ref()
    }

    pub(crate) fn spatial_part_mut(&mut self) -> Option<&mut Spatial> {
        self.spatial.as_mut()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Assign a field, returning the previous value
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Remove a field, keeping the order of the remaining ones
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn handlers(&self) -> Option<&HandlerTable> {
        self.handlers.as_ref()
    }

    /// Replace the handler table wholesale
    pub fn set_handlers(&mut self, handlers: Option<HandlerTable>) {
        self.handlers = handlers;
    }

    /// Local position, or zero if the field is missing or not a vector
    pub fn position(&self) -> Vec3 {
        self.field("position")
            .and_then(Value::to_vec3)
            .unwrap_or(Vec3::ZERO)
    }

    /// Local scale, or one if the field is missing or not a vector
    pub fn scale(&self) -> Vec3 {
        self.field("scale").and_then(Value::to_vec3).unwrap_or(Vec3::ONE)
    }

    /// Visibility flag (objects without the field are visible)
    pub fn visible(&self) -> bool {
        self.field("visible")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Read a numeric field
    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(Value::as_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_defaults() {
        let object = Object::spatial("group");
        assert!(object.is_spatial());
        assert_eq!(object.position(), Vec3::ZERO);
        assert_eq!(object.scale(), Vec3::ONE);
        assert!(object.visible());
        assert_eq!(object.spatial_part().unwrap().child_count(), 0);
    }

    #[test]
    fn test_data_object_fields() {
        let mut object = Object::new("boxGeometry").with_field("width", 2.0);
        assert!(!object.is_spatial());
        assert_eq!(object.number("width"), Some(2.0));

        let previous = object.set_field("width", Value::Number(3.0));
        assert!(previous.unwrap().same(&Value::Number(2.0)));
        assert!(object.remove_field("width").is_some());
        assert!(!object.has_field("width"));
    }
}
