//! Host effect interface
//!
//! [`HostConfig`] is the set of effects an external tree-diffing engine
//! issues while committing a tree. Containers are scene roots, addressed by
//! their [`ObjectId`].
//!
//! Text content has no representation in a scene graph: the text hooks are
//! no-ops and never construct anything.

use crate::error::Result;
use crate::instance::Instance;
use crate::props::Props;
use crate::vnode::VirtualNode;
use arbor_scene::{ObjectId, Value};

/// Stateless host context
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostContext;

/// Placeholder returned for text children
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextInstance;

/// Marker that routes a commit through [`HostConfig::commit_update`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdatePayload;

/// Effects applied by the diff engine
pub trait HostConfig {
    /// Create a detached instance for an element
    fn create_instance(&mut self, type_tag: &str, args: &[Value], props: &Props)
        -> Result<Instance>;

    /// Link a child while building a detached subtree
    fn append_initial_child(&mut self, parent: Instance, child: Instance) -> Result<()>;

    fn append_child(&mut self, parent: Instance, child: Instance) -> Result<()>;

    fn append_child_to_container(&mut self, container: ObjectId, child: Instance) -> Result<()>;

    /// Place `child` immediately before `before` in `parent`
    fn insert_before(&mut self, parent: Instance, child: Instance, before: Instance)
        -> Result<()>;

    fn insert_in_container_before(
        &mut self,
        container: ObjectId,
        child: Instance,
        before: Instance,
    ) -> Result<()>;

    fn remove_child(&mut self, parent: Instance, child: Instance) -> Result<()>;

    fn remove_child_from_container(&mut self, container: ObjectId, child: Instance) -> Result<()>;

    /// Apply the difference between two descriptions of the same element
    fn commit_update(
        &mut self,
        instance: Instance,
        old: &VirtualNode,
        new: &VirtualNode,
    ) -> Result<()>;

    /// Every update is committed; the diff happens in `commit_update`
    fn prepare_update(
        &self,
        _instance: Instance,
        _type_tag: &str,
        _old: &Props,
        _new: &Props,
    ) -> Option<UpdatePayload> {
        Some(UpdatePayload)
    }

    fn finalize_initial_children(&mut self, _instance: Instance, _props: &Props) -> bool {
        false
    }

    fn root_host_context(&self, _container: ObjectId) -> HostContext {
        HostContext
    }

    fn child_host_context(&self, _parent: HostContext, _type_tag: &str) -> HostContext {
        HostContext
    }

    fn should_set_text_content(&self, _type_tag: &str, _props: &Props) -> bool {
        false
    }

    fn create_text_instance(&mut self, _text: &str) -> TextInstance {
        TextInstance
    }

    fn commit_text_update(&mut self, _text: TextInstance, _old: &str, _new: &str) {}
}
