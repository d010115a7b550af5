//! Object storage and hierarchy
//!
//! The graph owns every live object. Structural edges only exist between
//! spatial objects; `add`/`remove` keep both sides of an edge in sync.
//! There is no indexed insert: callers that need a particular order splice
//! [`SceneGraph::children_mut`] themselves.

use crate::error::{Result, SceneError};
use crate::math::Vec3;
use crate::object::{Object, ObjectId};
use slotmap::SlotMap;
use smallvec::SmallVec;

/// Owner of all live objects
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: SlotMap<ObjectId, Object>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    /// Insert a detached object
    pub fn insert(&mut self, object: Object) -> ObjectId {
        let id = self.objects.insert(object);
        tracing::trace!(?id, "object inserted");
        id
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    /// Like [`get`](Self::get) but reports a missing object as an error
    pub fn try_get(&self, id: ObjectId) -> Result<&Object> {
        self.objects.get(id).ok_or(SceneError::UnknownObject(id))
    }

    /// Like [`get_mut`](Self::get_mut) but reports a missing object as an error
    pub fn try_get_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects.get_mut(id).ok_or(SceneError::UnknownObject(id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter()
    }

    // === Hierarchy ===

    /// Parent of a spatial object
    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.get(id)?.spatial_part()?.parent
    }

    /// Children of a spatial object (empty for unknown or non-spatial ids)
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.objects
            .get(id)
            .and_then(Object::spatial_part)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// Raw access to a child list.
    ///
    /// Reordering is allowed; adding or removing entries here bypasses the
    /// parent back-references, so use [`add`](Self::add) and
    /// [`remove`](Self::remove) for membership changes.
    pub fn children_mut(&mut self, id: ObjectId) -> Result<&mut SmallVec<[ObjectId; 4]>> {
        self.try_get_mut(id)?
            .spatial_part_mut()
            .map(|s| &mut s.children)
            .ok_or(SceneError::NotSpatial(id))
    }

    /// Append `child` to `parent`'s child list, detaching it from any
    /// previous parent first
    pub fn add(&mut self, parent: ObjectId, child: ObjectId) -> Result<()> {
        if !self.try_get(parent)?.is_spatial() {
            return Err(SceneError::NotSpatial(parent));
        }
        if !self.try_get(child)?.is_spatial() {
            return Err(SceneError::NotSpatial(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCycle { parent, child });
        }

        self.detach(child);

        if let Some(spatial) = self.objects[parent].spatial_part_mut() {
            spatial.children.push(child);
        }
        if let Some(spatial) = self.objects[child].spatial_part_mut() {
            spatial.parent = Some(parent);
        }
        Ok(())
    }

    /// Remove `child` from `parent`'s child list
    pub fn remove(&mut self, parent: ObjectId, child: ObjectId) -> Result<()> {
        let children = self.children_mut(parent)?;
        let Some(index) = children.iter().position(|c| *c == child) else {
            return Err(SceneError::NotAChild { parent, child });
        };
        children.remove(index);

        if let Some(spatial) = self.objects.get_mut(child).and_then(Object::spatial_part_mut) {
            spatial.parent = None;
        }
        Ok(())
    }

    /// Detach an object from its parent, if it has one
    pub fn detach(&mut self, child: ObjectId) {
        if let Some(parent) = self.parent(child) {
            let _ = self.remove(parent, child);
        }
    }

    /// Whether `ancestor` is on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Destroy an object and its spatial descendants.
    ///
    /// The object is detached from its parent first. Returns the number of
    /// objects removed.
    pub fn destroy(&mut self, id: ObjectId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        self.detach(id);

        let doomed = self.descendants(id);
        for object in &doomed {
            self.objects.remove(*object);
        }
        tracing::trace!(?id, count = doomed.len(), "object destroyed");
        doomed.len()
    }

    /// `id` and all spatial descendants, depth first, parents before children
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            // Reverse so the first child is visited first
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Accumulated world translation and scale of a spatial object.
    ///
    /// Rotation is not applied.
    pub fn world_transform(&self, id: ObjectId) -> (Vec3, Vec3) {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            chain.push(c);
            current = self.parent(c);
        }

        let mut position = Vec3::ZERO;
        let mut scale = Vec3::ONE;
        for object in chain.iter().rev().filter_map(|c| self.objects.get(*c)) {
            position = position + object.position().mul_elements(scale);
            scale = scale.mul_elements(object.scale());
        }
        (position, scale)
    }
}
