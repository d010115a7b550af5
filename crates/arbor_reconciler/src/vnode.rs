//! Virtual elements
//!
//! A [`VirtualNode`] is the description the external diffing engine hands to
//! the host: a type tag, constructor args, props and children.

use crate::props::Props;
use arbor_scene::{HandlerEvent, HandlerKind, SceneGraph, Value};

/// Description of one element
#[derive(Clone, Debug, Default)]
pub struct VirtualNode {
    pub type_tag: String,
    pub args: Vec<Value>,
    pub props: Props,
    pub children: Vec<VirtualNode>,
}

impl VirtualNode {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            ..Default::default()
        }
    }

    /// Add a constructor argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Replace all constructor arguments
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Bind an event handler
    pub fn on<F>(mut self, kind: HandlerKind, callback: F) -> Self
    where
        F: Fn(&mut SceneGraph, &HandlerEvent) + 'static,
    {
        self.props.set_handler(kind, callback);
        self
    }

    pub fn child(mut self, child: VirtualNode) -> Self {
        self.children.push(child);
        self
    }

    /// Positional shallow comparison of constructor args
    pub fn args_same(&self, other: &VirtualNode) -> bool {
        self.args.len() == other.args.len()
            && self.args.iter().zip(&other.args).all(|(a, b)| a.same(b))
    }

    /// Explicit `attach` prop, if any
    pub fn attach(&self) -> Option<&str> {
        self.props.get("attach").and_then(Value::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_compare_positionally() {
        let a = VirtualNode::new("boxGeometry").arg(1.0).arg(2.0);
        let b = VirtualNode::new("boxGeometry").arg(1.0).arg(2.0);
        let c = VirtualNode::new("boxGeometry").arg(2.0).arg(1.0);
        assert!(a.args_same(&b));
        assert!(!a.args_same(&c));
        assert!(!a.args_same(&VirtualNode::new("boxGeometry").arg(1.0)));
    }

    #[test]
    fn test_builder() {
        let node = VirtualNode::new("mesh")
            .prop("name", "cube")
            .on(HandlerKind::Click, |_, _| {})
            .child(VirtualNode::new("boxGeometry").prop("attach", "geometry"));
        assert_eq!(node.props.len(), 2);
        assert_eq!(node.children[0].attach(), Some("geometry"));
        assert_eq!(node.attach(), None);
    }
}
