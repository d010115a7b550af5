//! Ray queries against the scene graph

use crate::graph::SceneGraph;
use crate::math::{BoundingBox, Ray, Vec3};
use crate::object::{Object, ObjectId};
use crate::value::Value;

/// A single ray hit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub object: ObjectId,
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Spatial query used by pointer picking
///
/// Implementations return hits nearest-first. The same object may appear
/// more than once.
pub trait SpatialQuery {
    /// Intersect `ray` with every descendant of `root` (excluding `root`)
    fn intersect(&self, graph: &SceneGraph, root: ObjectId, ray: &Ray) -> Vec<Intersection>;
}

/// Default query: tests the world-space bounding box of each object's
/// attached `geometry`
#[derive(Clone, Debug)]
pub struct Raycaster {
    pub near: f32,
    pub far: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: f32::INFINITY,
        }
    }
}

impl Raycaster {
    pub fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    fn visit(
        &self,
        graph: &SceneGraph,
        id: ObjectId,
        ray: &Ray,
        hits: &mut Vec<Intersection>,
    ) {
        let Some(object) = graph.get(id) else {
            return;
        };
        if !object.visible() {
            return;
        }

        if let Some(local) = local_bounds(graph, object) {
            let (translation, scale) = graph.world_transform(id);
            let world = local.transformed(translation, scale);
            if let Some(distance) = ray.intersect_box(&world) {
                if distance >= self.near && distance <= self.far {
                    hits.push(Intersection {
                        object: id,
                        distance,
                        point: ray.at(distance),
                    });
                }
            }
        }

        for child in graph.children(id) {
            self.visit(graph, *child, ray, hits);
        }
    }
}

impl SpatialQuery for Raycaster {
    fn intersect(&self, graph: &SceneGraph, root: ObjectId, ray: &Ray) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for child in graph.children(root) {
            self.visit(graph, *child, ray, &mut hits);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Local bounds of an object, derived from its attached geometry.
///
/// Objects without a recognized geometry are not pickable.
pub fn local_bounds(graph: &SceneGraph, object: &Object) -> Option<BoundingBox> {
    let geometry = graph.get(object.field("geometry").and_then(Value::as_object)?)?;
    geometry_bounds(geometry)
}

/// Bounds of a geometry object built by one of the stock geometry types
pub fn geometry_bounds(geometry: &Object) -> Option<BoundingBox> {
    let dim = |name: &str, default: f64| geometry.number(name).unwrap_or(default) as f32;
    let half = match geometry.type_name() {
        "boxGeometry" => Vec3::new(
            dim("width", 1.0) / 2.0,
            dim("height", 1.0) / 2.0,
            dim("depth", 1.0) / 2.0,
        ),
        "sphereGeometry" => Vec3::splat(dim("radius", 1.0)),
        "planeGeometry" => Vec3::new(dim("width", 1.0) / 2.0, dim("height", 1.0) / 2.0, 0.0),
        _ => return None,
    };
    Some(BoundingBox::from_center_half_extents(Vec3::ZERO, half))
}
