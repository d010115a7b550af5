//! Scene reconciler
//!
//! [`SceneReconciler`] implements [`HostConfig`] on top of a [`SceneGraph`].
//!
//! Spatial objects become [`Instance::Node`]s and live in child lists. Data
//! objects become [`Instance::Leaf`]s: they are exposed on their parent as a
//! named field and never enter a child list.
//!
//! Objects adopted through the `primitive` tag are owned by the caller and
//! are detached, never destroyed, when their element is removed.

use crate::apply::apply_props;
use crate::error::{ReconcileError, Result};
use crate::host::{HostConfig, TextInstance};
use crate::instance::{DataLeaf, Instance, LeafId};
use crate::props::Props;
use crate::registry::{Registry, PRIMITIVE};
use crate::vnode::VirtualNode;
use arbor_scene::{ObjectId, SceneGraph, SceneError, Value};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

/// Reconciles element trees into a scene graph
pub struct SceneReconciler {
    graph: SceneGraph,
    leaves: SlotMap<LeafId, DataLeaf>,
    registry: Registry,
    /// Objects adopted through `primitive`
    external: FxHashSet<ObjectId>,
}

impl Default for SceneReconciler {
    fn default() -> Self {
        Self::new(SceneGraph::new(), Registry::with_defaults())
    }
}

impl SceneReconciler {
    pub fn new(graph: SceneGraph, registry: Registry) -> Self {
        Self {
            graph,
            leaves: SlotMap::with_key(),
            registry,
            external: FxHashSet::default(),
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn leaf(&self, id: LeafId) -> Option<&DataLeaf> {
        self.leaves.get(id)
    }

    /// Number of live data leaves
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Current underlying object of an instance
    pub fn instance_object(&self, instance: Instance) -> Result<ObjectId> {
        match instance {
            Instance::Node(id) if self.graph.contains(id) => Ok(id),
            Instance::Node(id) => Err(SceneError::UnknownObject(id).into()),
            Instance::Leaf(id) => self
                .leaves
                .get(id)
                .map(|leaf| leaf.object)
                .ok_or(ReconcileError::UnknownLeaf(id)),
        }
    }

    /// Build a detached instance for `node` and its children, then append it
    /// to `parent`
    pub fn mount(&mut self, parent: Instance, node: &VirtualNode) -> Result<Instance> {
        let instance = self.build(node)?;
        self.append_child(parent, instance)?;
        Ok(instance)
    }

    fn build(&mut self, node: &VirtualNode) -> Result<Instance> {
        let instance = self.create_instance(&node.type_tag, &node.args, &node.props)?;
        for child in &node.children {
            let child = self.build(child)?;
            self.append_initial_child(instance, child)?;
        }
        Ok(instance)
    }

    /// Construct (or adopt) an object and apply its initial props.
    ///
    /// A constructed object is destroyed again if its props fail to apply.
    fn construct(&mut self, type_tag: &str, args: &[Value], props: &Props) -> Result<ObjectId> {
        if type_tag == PRIMITIVE {
            let id = props
                .get("object")
                .and_then(Value::as_object)
                .filter(|id| self.graph.contains(*id))
                .ok_or(ReconcileError::MissingPrimitive)?;
            apply_props(&mut self.graph, id, props, &Props::new())?;
            self.external.insert(id);
            return Ok(id);
        }

        let object = self.registry.construct(type_tag, args)?;
        let id = self.graph.insert(object);
        if let Err(err) = apply_props(&mut self.graph, id, props, &Props::new()) {
            self.graph.destroy(id);
            return Err(err.into());
        }
        Ok(id)
    }

    /// Destroy an object unless it is owned by the caller
    fn release_object(&mut self, id: ObjectId) {
        if self.external.remove(&id) {
            self.graph.detach(id);
        } else {
            self.graph.destroy(id);
        }
    }

    fn destroy_subtree(&mut self, root: ObjectId) {
        let subtree = self.graph.descendants(root);
        for id in subtree.iter().skip(1) {
            if self.external.remove(id) {
                self.graph.detach(*id);
            }
        }
        self.release_object(root);
        self.release_orphaned_leaves();
    }

    /// Drop leaves whose parent object no longer exists, along with their
    /// objects. Repeats until stable, since a released object may itself be
    /// the parent of another leaf.
    fn release_orphaned_leaves(&mut self) {
        loop {
            let orphans: Vec<LeafId> = self
                .leaves
                .iter()
                .filter(|(_, leaf)| leaf.parent.is_some_and(|p| !self.graph.contains(p)))
                .map(|(id, _)| id)
                .collect();
            if orphans.is_empty() {
                break;
            }
            for id in orphans {
                if let Some(leaf) = self.leaves.remove(id) {
                    self.release_object(leaf.object);
                }
            }
        }
    }

    fn attach_leaf(&mut self, parent: Instance, id: LeafId) -> Result<()> {
        let parent = self.instance_object(parent)?;
        let leaf = self.leaves.get(id).ok_or(ReconcileError::UnknownLeaf(id))?;
        if leaf.object == parent {
            return Err(SceneError::WouldCycle {
                parent,
                child: leaf.object,
            }
            .into());
        }
        let (object, attach, previous) = (leaf.object, leaf.attach.clone(), leaf.parent);

        self.graph
            .try_get_mut(parent)?
            .set_field(attach.as_str(), Value::Object(object));
        if previous.is_some_and(|p| p != parent) {
            self.unset_field(previous, &attach, object);
        }
        if let Some(leaf) = self.leaves.get_mut(id) {
            leaf.parent = Some(parent);
        }
        tracing::trace!(?id, ?parent, attach = attach.as_str(), "leaf attached");
        Ok(())
    }

    fn detach_leaf(&mut self, id: LeafId) -> Result<()> {
        let leaf = self.leaves.get_mut(id).ok_or(ReconcileError::UnknownLeaf(id))?;
        let (parent, object) = (leaf.parent.take(), leaf.object);
        let attach = leaf.attach.clone();
        self.unset_field(parent, &attach, object);
        Ok(())
    }

    /// Remove `parent.name` if it still refers to `object`
    fn unset_field(&mut self, parent: Option<ObjectId>, name: &str, object: ObjectId) {
        let Some(parent) = parent.and_then(|p| self.graph.get_mut(p)) else {
            return;
        };
        if parent.field(name).and_then(Value::as_object) == Some(object) {
            parent.remove_field(name);
        }
    }

    fn insert_node_before(&mut self, parent: ObjectId, child: ObjectId, before: ObjectId) -> Result<()> {
        if child == before {
            return Ok(());
        }
        if !self.graph.children(parent).contains(&before) {
            return Err(SceneError::NotAChild {
                parent,
                child: before,
            }
            .into());
        }

        self.graph.add(parent, child)?;
        let children = self.graph.children_mut(parent)?;
        children.retain(|c| *c != child);
        let index = children
            .iter()
            .position(|c| *c == before)
            .unwrap_or(children.len());
        children.insert(index, child);
        Ok(())
    }

    /// Swap the leaf's object for a freshly constructed one
    fn reinstantiate(&mut self, id: LeafId, new: &VirtualNode) -> Result<()> {
        let leaf = self.leaves.get(id).ok_or(ReconcileError::UnknownLeaf(id))?;
        let (old_object, parent, attach) = (leaf.object, leaf.parent, leaf.attach.clone());

        let replacement = self.construct(&new.type_tag, &new.args, &new.props)?;

        // Leaves attached to the old object move over to the replacement
        let mut moved = Vec::new();
        for (_, leaf) in self.leaves.iter_mut() {
            if leaf.parent == Some(old_object) {
                leaf.parent = Some(replacement);
                moved.push((leaf.attach.clone(), leaf.object));
            }
        }
        if let Some(object) = self.graph.get_mut(replacement) {
            for (attach, child) in &moved {
                object.set_field(attach.as_str(), Value::Object(*child));
            }
        }

        self.unset_field(parent, &attach, old_object);
        self.release_object(old_object);
        if let Some(parent) = parent {
            if let Some(object) = self.graph.get_mut(parent) {
                object.set_field(attach.as_str(), Value::Object(replacement));
            }
        }
        if let Some(leaf) = self.leaves.get_mut(id) {
            leaf.object = replacement;
        }

        tracing::debug!(?id, ?old_object, ?replacement, "data leaf re-instantiated");
        Ok(())
    }

    /// Move an attached leaf to a new field name
    fn rename_attach(&mut self, id: LeafId, attach: &str) {
        let Some(leaf) = self.leaves.get_mut(id) else {
            return;
        };
        if leaf.attach == attach {
            return;
        }
        let (parent, object) = (leaf.parent, leaf.object);
        let previous = std::mem::replace(&mut leaf.attach, attach.to_string());
        self.unset_field(parent, &previous, object);
        if let Some(parent) = parent.and_then(|p| self.graph.get_mut(p)) {
            parent.set_field(attach, Value::Object(object));
        }
    }
}

impl HostConfig for SceneReconciler {
    fn create_instance(
        &mut self,
        type_tag: &str,
        args: &[Value],
        props: &Props,
    ) -> Result<Instance> {
        let id = self.construct(type_tag, args, props)?;
        let object = self.graph.try_get(id)?;
        if object.is_spatial() {
            tracing::debug!(type_tag, ?id, "scene node created");
            return Ok(Instance::Node(id));
        }

        // Adopted objects resolve their default attach name by their own type
        let resolved_tag = if type_tag == PRIMITIVE {
            object.type_name()
        } else {
            type_tag
        };
        let attach = props
            .get("attach")
            .and_then(Value::as_text)
            .or_else(|| self.registry.attach_name(resolved_tag))
            .unwrap_or(resolved_tag)
            .to_string();

        let leaf = self.leaves.insert(DataLeaf::new(id, attach));
        tracing::debug!(type_tag, ?id, ?leaf, "data leaf created");
        Ok(Instance::Leaf(leaf))
    }

    fn append_initial_child(&mut self, parent: Instance, child: Instance) -> Result<()> {
        self.append_child(parent, child)
    }

    fn append_child(&mut self, parent: Instance, child: Instance) -> Result<()> {
        match child {
            Instance::Leaf(id) => self.attach_leaf(parent, id),
            Instance::Node(child) => {
                let parent = self.instance_object(parent)?;
                self.graph.add(parent, child)?;
                Ok(())
            }
        }
    }

    fn append_child_to_container(&mut self, container: ObjectId, child: Instance) -> Result<()> {
        self.append_child(Instance::Node(container), child)
    }

    fn insert_before(&mut self, parent: Instance, child: Instance, before: Instance) -> Result<()> {
        match (child, before) {
            // Field attachment has no order
            (Instance::Leaf(id), _) => self.attach_leaf(parent, id),
            // Data leaves are not in the child list: nothing to insert before
            (Instance::Node(_), Instance::Leaf(_)) => self.append_child(parent, child),
            (Instance::Node(child), Instance::Node(before)) => {
                let parent = self.instance_object(parent)?;
                self.insert_node_before(parent, child, before)
            }
        }
    }

    fn insert_in_container_before(
        &mut self,
        container: ObjectId,
        child: Instance,
        before: Instance,
    ) -> Result<()> {
        self.insert_before(Instance::Node(container), child, before)
    }

    fn remove_child(&mut self, parent: Instance, child: Instance) -> Result<()> {
        match child {
            Instance::Leaf(id) => {
                self.detach_leaf(id)?;
                if let Some(leaf) = self.leaves.remove(id) {
                    self.release_object(leaf.object);
                }
                self.release_orphaned_leaves();
                tracing::debug!(?id, "data leaf removed");
                Ok(())
            }
            Instance::Node(child) => {
                let parent = self.instance_object(parent)?;
                self.graph.remove(parent, child)?;
                self.destroy_subtree(child);
                tracing::debug!(?child, "scene node removed");
                Ok(())
            }
        }
    }

    fn remove_child_from_container(&mut self, container: ObjectId, child: Instance) -> Result<()> {
        self.remove_child(Instance::Node(container), child)
    }

    fn commit_update(
        &mut self,
        instance: Instance,
        old: &VirtualNode,
        new: &VirtualNode,
    ) -> Result<()> {
        match instance {
            Instance::Node(id) => {
                if !old.args_same(new) {
                    tracing::debug!(?id, "ignoring args change on scene node");
                }
                apply_props(&mut self.graph, id, &new.props, &old.props)?;
            }
            Instance::Leaf(id) => {
                if old.args_same(new) {
                    let object = self.instance_object(instance)?;
                    apply_props(&mut self.graph, object, &new.props, &old.props)?;
                } else {
                    self.reinstantiate(id, new)?;
                }
                if let Some(attach) = new.attach() {
                    self.rename_attach(id, attach);
                }
            }
        }
        Ok(())
    }

    fn create_text_instance(&mut self, text: &str) -> TextInstance {
        tracing::trace!(len = text.len(), "text content ignored");
        TextInstance
    }
}
