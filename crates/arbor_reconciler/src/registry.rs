//! Type registry
//!
//! Maps element type tags (`"mesh"`, `"boxGeometry"`, ...) to object
//! constructors. Constructors receive the element's positional `args`.
//!
//! The tag [`PRIMITIVE`] is handled by the reconciler itself and can never be
//! registered.

use crate::error::{ReconcileError, Result};
use arbor_scene::{Color, Object, SceneError, Value};
use rustc_hash::FxHashMap;

/// Tag that adopts an existing object instead of constructing one
pub const PRIMITIVE: &str = "primitive";

/// Constructor signature: positional args to a fresh object
pub type ConstructorFn = Box<dyn Fn(&[Value]) -> arbor_scene::Result<Object>>;

struct Entry {
    build: ConstructorFn,
    attach: Option<String>,
}

/// Registry of constructible types
pub struct Registry {
    entries: FxHashMap<String, Entry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Create a registry with the stock scene types registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_defaults(&mut registry);
        registry
    }

    /// Register a type whose instances are spatial or attach under their tag
    pub fn register<F>(&mut self, type_tag: impl Into<String>, build: F) -> Result<()>
    where
        F: Fn(&[Value]) -> arbor_scene::Result<Object> + 'static,
    {
        self.insert(type_tag.into(), Box::new(build), None)
    }

    /// Register a data type that attaches to its parent under `attach`
    pub fn register_attached<F>(
        &mut self,
        type_tag: impl Into<String>,
        attach: impl Into<String>,
        build: F,
    ) -> Result<()>
    where
        F: Fn(&[Value]) -> arbor_scene::Result<Object> + 'static,
    {
        self.insert(type_tag.into(), Box::new(build), Some(attach.into()))
    }

    fn insert(&mut self, tag: String, build: ConstructorFn, attach: Option<String>) -> Result<()> {
        if tag == PRIMITIVE {
            return Err(ReconcileError::ReservedTag(tag));
        }
        self.entries.insert(tag, Entry { build, attach });
        Ok(())
    }

    /// Construct a fresh object for `type_tag`
    pub fn construct(&self, type_tag: &str, args: &[Value]) -> Result<Object> {
        let entry = self
            .entries
            .get(type_tag)
            .ok_or_else(|| ReconcileError::UnknownType(type_tag.to_string()))?;
        (entry.build)(args).map_err(|err| ReconcileError::Construct {
            type_tag: type_tag.to_string(),
            reason: err.to_string(),
        })
    }

    /// Default attach name for a type, if registered with one
    pub fn attach_name(&self, type_tag: &str) -> Option<&str> {
        self.entries.get(type_tag)?.attach.as_deref()
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.entries.contains_key(type_tag)
    }

    /// Registered tags, sorted
    pub fn type_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

/// Read up to `names.len()` numeric args into fields
fn numeric_args(
    kind: &'static str,
    mut object: Object,
    names: &[&str],
    args: &[Value],
) -> arbor_scene::Result<Object> {
    if args.len() > names.len() {
        return Err(SceneError::InvalidArguments {
            kind,
            reason: format!("expected at most {} arguments, got {}", names.len(), args.len()),
        });
    }
    for (name, arg) in names.iter().zip(args) {
        let number = arg.as_number().ok_or_else(|| SceneError::InvalidArguments {
            kind,
            reason: format!("`{name}` must be a number, got {arg:?}"),
        })?;
        object.set_field(*name, Value::Number(number));
    }
    Ok(object)
}

/// Lights take `(color, intensity)`
fn light(kind: &'static str, args: &[Value]) -> arbor_scene::Result<Object> {
    let (color, rest) = match args.split_first() {
        Some((color, rest)) => (Some(color), rest),
        None => (None, args),
    };
    let object = Object::spatial(kind)
        .with_field("color", Color::WHITE)
        .with_field("intensity", 1.0);
    if let (Some(color), Some(Value::Settable(cell))) = (color, object.field("color")) {
        cell.borrow_mut().set(std::slice::from_ref(color))?;
    }
    numeric_args(kind, object, &["intensity"], rest)
}

/// Register the stock scene types
pub fn register_defaults(registry: &mut Registry) {
    let spatial = ["scene", "group", "object3D", "mesh", "points", "line"];
    for tag in spatial {
        registry.entries.insert(
            tag.to_string(),
            Entry {
                build: Box::new(move |args: &[Value]| numeric_args("Object3D", Object::spatial(tag), &[], args)),
                attach: None,
            },
        );
    }

    let defaults: [(&str, Option<&str>, ConstructorFn); 9] = [
        (
            "perspectiveCamera",
            None,
            Box::new(|args: &[Value]| {
                let camera = Object::spatial("perspectiveCamera")
                    .with_field("fov", 75.0)
                    .with_field("aspect", 1.0)
                    .with_field("near", 0.1)
                    .with_field("far", 1000.0);
                numeric_args("PerspectiveCamera", camera, &["fov", "aspect", "near", "far"], args)
            }),
        ),
        ("ambientLight", None, Box::new(|args: &[Value]| light("ambientLight", args))),
        ("pointLight", None, Box::new(|args: &[Value]| light("pointLight", args))),
        ("directionalLight", None, Box::new(|args: &[Value]| light("directionalLight", args))),
        (
            "boxGeometry",
            Some("geometry"),
            Box::new(|args: &[Value]| {
                let geometry = Object::new("boxGeometry")
                    .with_field("width", 1.0)
                    .with_field("height", 1.0)
                    .with_field("depth", 1.0);
                numeric_args("BoxGeometry", geometry, &["width", "height", "depth"], args)
            }),
        ),
        (
            "sphereGeometry",
            Some("geometry"),
            Box::new(|args: &[Value]| {
                let geometry = Object::new("sphereGeometry").with_field("radius", 1.0);
                numeric_args("SphereGeometry", geometry, &["radius"], args)
            }),
        ),
        (
            "planeGeometry",
            Some("geometry"),
            Box::new(|args: &[Value]| {
                let geometry = Object::new("planeGeometry")
                    .with_field("width", 1.0)
                    .with_field("height", 1.0);
                numeric_args("PlaneGeometry", geometry, &["width", "height"], args)
            }),
        ),
        (
            "meshBasicMaterial",
            Some("material"),
            Box::new(|args: &[Value]| numeric_args("MeshBasicMaterial", material("meshBasicMaterial"), &[], args)),
        ),
        (
            "meshStandardMaterial",
            Some("material"),
            Box::new(|args: &[Value]| {
                let standard = material("meshStandardMaterial")
                    .with_field("roughness", 1.0)
                    .with_field("metalness", 0.0);
                numeric_args("MeshStandardMaterial", standard, &[], args)
            }),
        ),
    ];

    for (tag, attach, build) in defaults {
        registry.entries.insert(
            tag.to_string(),
            Entry {
                build,
                attach: attach.map(str::to_string),
            },
        );
    }
}

fn material(kind: &str) -> Object {
    Object::new(kind)
        .with_field("color", Color::WHITE)
        .with_field("opacity", 1.0)
        .with_field("transparent", false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let registry = Registry::with_defaults();
        for tag in ["scene", "group", "mesh", "boxGeometry", "meshStandardMaterial"] {
            assert!(registry.contains(tag), "{tag} missing");
        }
        assert!(!registry.contains(PRIMITIVE));
        assert_eq!(registry.attach_name("boxGeometry"), Some("geometry"));
        assert_eq!(registry.attach_name("meshBasicMaterial"), Some("material"));
        assert_eq!(registry.attach_name("mesh"), None);
    }

    #[test]
    fn test_construct_with_args() {
        let registry = Registry::with_defaults();
        let geometry = registry
            .construct("boxGeometry", &[Value::Number(2.0), Value::Number(3.0)])
            .unwrap();
        assert_eq!(geometry.number("width"), Some(2.0));
        assert_eq!(geometry.number("height"), Some(3.0));
        assert_eq!(geometry.number("depth"), Some(1.0));
        assert!(!geometry.is_spatial());

        let mesh = registry.construct("mesh", &[]).unwrap();
        assert!(mesh.is_spatial());
    }

    #[test]
    fn test_light_color_arg() {
        let registry = Registry::with_defaults();
        let light = registry
            .construct("pointLight", &[Value::Number(0xff0000 as f64), Value::Number(2.0)])
            .unwrap();
        assert_eq!(light.field("color").unwrap().to_color().unwrap().to_hex(), 0xff0000);
        assert_eq!(light.number("intensity"), Some(2.0));
    }

    #[test]
    fn test_construct_errors() {
        let registry = Registry::with_defaults();
        assert_eq!(
            registry.construct("teapot", &[]).unwrap_err(),
            ReconcileError::UnknownType("teapot".into())
        );
        let err = registry
            .construct("sphereGeometry", &["big".into()])
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Construct { ref type_tag, .. } if type_tag == "sphereGeometry"));
        assert!(registry.construct("group", &[Value::Number(1.0)]).is_err());
    }

    #[test]
    fn test_primitive_is_reserved() {
        let mut registry = Registry::new();
        let err = registry
            .register(PRIMITIVE, |_| Ok(Object::new("x")))
            .unwrap_err();
        assert_eq!(err, ReconcileError::ReservedTag(PRIMITIVE.into()));

        registry
            .register_attached("fog", "fog", |_| Ok(Object::new("fog")))
            .unwrap();
        assert_eq!(registry.attach_name("fog"), Some("fog"));
        assert_eq!(registry.type_tags(), vec!["fog"]);
    }
}
