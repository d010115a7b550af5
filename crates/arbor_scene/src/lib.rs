//! # Arbor Scene
//!
//! The retained scene graph Arbor reconciles into.
//!
//! This crate provides:
//! - **Objects** with named fields, addressed by stable [`ObjectId`]s
//! - **Hierarchy** between spatial objects, with ordered child lists
//! - **Settable values** ([`Vec3`], [`Euler`], [`Color`]) with shared identity
//! - **Handler tables** for hover, unhover, click and update callbacks
//! - **Ray queries** and a perspective [`Camera`] for pointer picking
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_scene::{Object, SceneGraph, Value};
//!
//! let mut graph = SceneGraph::new();
//! let scene = graph.insert(Object::spatial("scene"));
//! let mesh = graph.insert(Object::spatial("mesh").with_field("position", Value::vec3(0.0, 1.0, 0.0)));
//! graph.add(scene, mesh).unwrap();
//!
//! assert_eq!(graph.children(scene), &[mesh]);
//! ```

pub mod camera;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod math;
pub mod object;
pub mod raycast;
pub mod settable;
pub mod value;

pub use camera::Camera;
pub use error::{Result, SceneError};
pub use graph::SceneGraph;
pub use handlers::{HandlerEvent, HandlerKind, HandlerTable};
pub use math::{BoundingBox, Ray, Vec2, Vec3};
pub use object::{Object, ObjectId, Spatial};
pub use raycast::{Intersection, Raycaster, SpatialQuery};
pub use settable::{shared, Color, Euler, Settable, SettableRef};
pub use value::{Callback, Value};
