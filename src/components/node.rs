//! Tree membership for scene nodes.
//!
//! Every entity managed by a [`Scene`](crate::scene::Scene) carries a [`Node`]
//! component. It records the node's name, a non-owning link to its parent and
//! the name → child map the node owns. Structural changes requested while the
//! tree is being traversed are parked in the two FIFO queues and applied by the
//! owning node once its children have finished updating.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Component, Entity};
use rustc_hash::FxHashMap;

/// Base tree primitive.
///
/// The children map is only mutated by the scene on behalf of this node:
/// through [`Scene::attach_child`](crate::scene::Scene::attach_child), the
/// queue drains at the end of the node's update, or teardown.
#[derive(Component, Debug, Clone, Default)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<Entity>,
    pub(crate) children: FxHashMap<String, Entity>,
    pub(crate) addition_queue: VecDeque<Entity>,
    pub(crate) removal_queue: VecDeque<Entity>,
    pub(crate) tearing_down: bool,
}

impl Node {
    /// Create a detached node that will request `name` when attached.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name of the node. Unique among its siblings once attached.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node's teardown has started.
    pub fn is_tearing_down(&self) -> bool {
        self.tearing_down
    }

    /// Direct lookup of a child by its attached name.
    pub fn child(&self, name: &str) -> Option<Entity> {
        self.children.get(name).copied()
    }

    /// Iterate the attached children. The order is unspecified.
    pub fn children(&self) -> impl Iterator<Item = Entity> + '_ {
        self.children.values().copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether `child` is registered under its current name in this node.
    pub fn has_child(&self, name: &str, child: Entity) -> bool {
        self.children.get(name) == Some(&child)
    }

    /// Nodes waiting to be attached at the end of this node's update.
    pub fn pending_additions(&self) -> impl Iterator<Item = Entity> + '_ {
        self.addition_queue.iter().copied()
    }

    /// Nodes waiting to be detached at the end of this node's update.
    pub fn pending_removals(&self) -> impl Iterator<Item = Entity> + '_ {
        self.removal_queue.iter().copied()
    }

    /// Pick a name for a new child.
    ///
    /// Returns `requested` when no sibling uses it, otherwise `requested`
    /// followed by the smallest positive integer that is still free.
    pub fn unique_child_name(&self, requested: &str) -> String {
        if !self.children.contains_key(requested) {
            return requested.to_string();
        }
        let mut suffix: u32 = 1;
        loop {
            let candidate = format!("{requested}{suffix}");
            if !self.children.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub(crate) fn enqueue_removal(&mut self, child: Entity) {
        if !self.removal_queue.contains(&child) {
            self.removal_queue.push_back(child);
        }
    }
}
