//! Dynamic values carried by props and object fields

use crate::graph::SceneGraph;
use crate::handlers::HandlerEvent;
use crate::math::Vec3;
use crate::object::ObjectId;
use crate::settable::{shared, Color, Euler, SettableRef};
use std::fmt;
use std::rc::Rc;

/// Event callback attached to an object through a handler prop
///
/// Callbacks receive the live graph so they may mutate it; see
/// [`HandlerEvent`] for what is known about the triggering event.
pub type Callback = Rc<dyn Fn(&mut SceneGraph, &HandlerEvent)>;

/// A prop or field value
///
/// `Settable` values are shared cells with their own identity; `Object`
/// values reference another object in the same graph.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Settable(SettableRef),
    Object(ObjectId),
    Callback(Callback),
}

impl Value {
    /// Wrap a closure as a callback value
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&mut SceneGraph, &HandlerEvent) + 'static,
    {
        Value::Callback(Rc::new(f))
    }

    /// A fresh settable vector
    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Value::Settable(shared(Vec3::new(x, y, z)))
    }

    /// A fresh settable rotation
    pub fn euler(x: f32, y: f32, z: f32) -> Self {
        Value::Settable(shared(Euler::new(x, y, z)))
    }

    /// A fresh settable color from `0xRRGGBB`
    pub fn color(hex: u32) -> Self {
        Value::Settable(shared(Color::from_hex(hex)))
    }

    /// Shallow comparison.
    ///
    /// Primitives compare by value and lists element-wise; settables and
    /// callbacks compare by identity, objects by id.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
            }
            (Value::Settable(a), Value::Settable(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_settable(&self) -> Option<&SettableRef> {
        match self {
            Value::Settable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    /// Read a settable value as a `Vec3`
    pub fn to_vec3(&self) -> Option<Vec3> {
        self.as_settable()
            .and_then(|s| s.borrow().downcast_ref::<Vec3>().copied())
    }

    /// Read a settable value as a `Color`
    pub fn to_color(&self) -> Option<Color> {
        self.as_settable()
            .and_then(|s| s.borrow().downcast_ref::<Color>().copied())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Text(s) => write!(f, "Text({s:?})"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Settable(s) => match s.try_borrow() {
                Ok(inner) => write!(f, "Settable({inner:?})"),
                Err(_) => write!(f, "Settable(<borrowed>)"),
            },
            Value::Object(id) => write!(f, "Object({id:?})"),
            Value::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::Object(value)
    }
}

impl From<SettableRef> for Value {
    fn from(value: SettableRef) -> Self {
        Value::Settable(value)
    }
}

impl From<Vec3> for Value {
    fn from(value: Vec3) -> Self {
        Value::Settable(shared(value))
    }
}

impl From<Euler> for Value {
    fn from(value: Euler) -> Self {
        Value::Settable(shared(value))
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Settable(shared(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_primitives_by_value() {
        assert!(Value::from(1.0).same(&Value::from(1.0)));
        assert!(!Value::from(1.0).same(&Value::from(2.0)));
        assert!(Value::from("a").same(&Value::from("a")));
        assert!(!Value::from(true).same(&Value::from(1.0)));
        assert!(Value::from(vec![Value::Number(1.0), "x".into()])
            .same(&Value::from(vec![Value::Number(1.0), "x".into()])));
    }

    #[test]
    fn test_same_settables_by_identity() {
        let a = Value::vec3(1.0, 2.0, 3.0);
        let b = Value::vec3(1.0, 2.0, 3.0);
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert_eq!(a.to_vec3(), b.to_vec3());
    }

    #[test]
    fn test_same_callbacks_by_identity() {
        let cb = Value::callback(|_, _| {});
        let other = Value::callback(|_, _| {});
        assert!(cb.same(&cb.clone()));
        assert!(!cb.same(&other));
    }
}
