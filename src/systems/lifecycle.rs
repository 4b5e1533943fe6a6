//! Attaching, queueing and tearing down nodes.
//!
//! # Lifecycle
//!
//! 1. A node is spawned detached.
//! 2. It is attached, either directly with [`Scene::attach_child`] or at the
//!    end of the parent's next update after [`Scene::queue_for_addition`].
//! 3. [`Scene::queue_for_removal`] parks the node and its whole subtree on the
//!    removal queues; each parent detaches its queued children once its own
//!    children have updated.
//! 4. Teardown ([`Scene::complete_removal`]) runs children first, raises
//!    `Removed`, drops every handler and the behavior, then despawns.

use bevy_ecs::prelude::Entity;
use log::{debug, error};

use crate::components::node::Node;
use crate::error::SceneError;
use crate::events::node::NodeEvent;
use crate::scene::Scene;

impl Scene {
    /// Attach a detached node under `parent` immediately.
    ///
    /// The child keeps its requested name unless a sibling already uses it,
    /// in which case the smallest free numeric suffix is appended. Raises
    /// `ChildAdded` on the parent and returns the name actually assigned.
    pub fn attach_child(&mut self, parent: Entity, child: Entity) -> Result<String, SceneError> {
        if !self.is_live(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        if !self.is_live(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        let child_node = self.node(child).ok_or(SceneError::NodeNotFound(child))?;
        if child_node.parent().is_some() {
            return Err(SceneError::AlreadyAttached(child));
        }
        let requested = child_node.name().to_string();
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CyclicAttach { parent, child });
        }

        let name = {
            let mut parent_node = self
                .world
                .get_mut::<Node>(parent)
                .ok_or(SceneError::NodeNotFound(parent))?;
            let name = parent_node.unique_child_name(&requested);
            parent_node.children.insert(name.clone(), child);
            name
        };
        if let Some(mut child_node) = self.world.get_mut::<Node>(child) {
            child_node.name = name.clone();
            child_node.parent = Some(parent);
        }

        debug!("attached '{name}' ({child:?}) under {parent:?}");
        self.show_visual(child);
        self.emit(parent, NodeEvent::ChildAdded(child));
        Ok(name)
    }

    /// Attach `child` under `parent` at the end of the parent's next update.
    pub fn queue_for_addition(&mut self, parent: Entity, child: Entity) -> Result<(), SceneError> {
        if !self.is_live(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if !self.is_live(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let mut parent_node = self
            .world
            .get_mut::<Node>(parent)
            .ok_or(SceneError::NodeNotFound(parent))?;
        if !parent_node.addition_queue.contains(&child) {
            parent_node.addition_queue.push_back(child);
        }
        Ok(())
    }

    /// Mark `node` and its whole subtree for removal.
    ///
    /// Every node of the subtree is queued on its own parent, so the subtree
    /// is gone once the update pass that drains those queues completes.
    /// A node still waiting in an addition queue is queued on that parent
    /// instead: it gets attached and detached in the same drain. Other
    /// unattached or already removed nodes are ignored.
    pub fn queue_for_removal(&mut self, node: Entity) {
        let parent = match self.parent(node) {
            Some(parent) => parent,
            None => match self.pending_parent(node) {
                Some(parent) => parent,
                None => {
                    debug!("ignoring removal request for unattached node {node:?}");
                    return;
                }
            },
        };
        self.enqueue_subtree_removal(parent, node);
    }

    /// The live node whose addition queue holds `node`, if any.
    fn pending_parent(&mut self, node: Entity) -> Option<Entity> {
        if !self.is_live(node) {
            return None;
        }
        let mut nodes = self.world.query::<(Entity, &Node)>();
        nodes
            .iter(&self.world)
            .find(|(_, n)| !n.tearing_down && n.addition_queue.contains(&node))
            .map(|(entity, _)| entity)
    }

    /// Whether `node` exists and its teardown has not started.
    fn is_live(&self, node: Entity) -> bool {
        self.node(node).is_some_and(|n| !n.is_tearing_down())
    }

    fn enqueue_subtree_removal(&mut self, parent: Entity, node: Entity) {
        if let Some(mut parent_node) = self.world.get_mut::<Node>(parent) {
            parent_node.enqueue_removal(node);
        }
        for child in self.children(node) {
            self.enqueue_subtree_removal(node, child);
        }
    }

    /// Tear `node` down now.
    ///
    /// Children go first. `Removed` is raised on each node when `emit_event`
    /// is set, after which the node loses all its handlers, its behavior and
    /// its parent link, and is despawned. Nodes still waiting in its
    /// addition queue are discarded silently. Calling this on a node that is
    /// already gone or already being torn down does nothing.
    pub fn complete_removal(&mut self, node: Entity, emit_event: bool) {
        match self.world.get_mut::<Node>(node) {
            Some(mut n) if !n.tearing_down => n.tearing_down = true,
            _ => return,
        }

        for child in self.children(node) {
            self.complete_removal(child, emit_event);
        }
        if emit_event {
            self.emit(node, NodeEvent::Removed);
        }

        self.clear_subscriptions(node);
        self.drop_behavior(node);
        self.hide_visual(node);

        let Some(mut state) = self.world.get_mut::<Node>(node) else {
            return;
        };
        let pending: Vec<Entity> = state.addition_queue.drain(..).collect();
        state.removal_queue.clear();
        state.children.clear();
        let parent = state.parent.take();
        let name = std::mem::take(&mut state.name);

        for orphan in pending {
            if self.parent(orphan).is_none() && !self.is_ancestor_or_self(orphan, node) {
                self.complete_removal(orphan, false);
            }
        }
        if let Some(parent) = parent
            && let Some(mut parent_node) = self.world.get_mut::<Node>(parent)
            && parent_node.has_child(&name, node)
        {
            parent_node.children.remove(&name);
        }

        debug!("removed '{name}' ({node:?})");
        self.world.despawn(node);
    }

    /// Attach everything queued for addition, then detach and tear down
    /// everything queued for removal that is still a child of `node`.
    pub(crate) fn drain_queues(&mut self, node: Entity) {
        let additions = match self.world.get_mut::<Node>(node) {
            Some(mut n) => std::mem::take(&mut n.addition_queue),
            None => return,
        };
        for child in additions {
            if let Err(err) = self.attach_child(node, child) {
                error!("dropping queued addition of {child:?} to {node:?}: {err}");
            }
        }

        let removals = match self.world.get_mut::<Node>(node) {
            Some(mut n) => std::mem::take(&mut n.removal_queue),
            None => return,
        };
        for child in removals {
            let Some(name) = self.name(child).map(str::to_owned) else {
                continue;
            };
            let Some(mut parent_node) = self.world.get_mut::<Node>(node) else {
                return;
            };
            if !parent_node.has_child(&name, child) {
                continue;
            }
            parent_node.children.remove(&name);
            self.complete_removal(child, true);
        }
    }
}
