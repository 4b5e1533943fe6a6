//! Errors raised by structural scene operations.
//!
//! Every variant signals mis-wired gameplay code (a stale handle, a node
//! attached twice, a collision check on something that is not a collision
//! area). None of them are transient, so callers are expected to propagate
//! them with `?` or fail loudly rather than retry.

use std::fmt;

use bevy_ecs::prelude::Entity;

/// Failure of a scene-graph operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The handle does not refer to a live node.
    NodeNotFound(Entity),
    /// The child already has a parent and must be removed first.
    AlreadyAttached(Entity),
    /// Attaching would make a node its own ancestor.
    CyclicAttach {
        /// Requested parent.
        parent: Entity,
        /// Requested child.
        child: Entity,
    },
    /// The node has no [`Position`](crate::components::position::Position).
    NotANode2D(Entity),
    /// The node lacks a collision area, a position or a size.
    NotACollisionArea(Entity),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::NodeNotFound(e) => write!(f, "node {e:?} does not exist"),
            SceneError::AlreadyAttached(e) => write!(f, "node {e:?} already has a parent"),
            SceneError::CyclicAttach { parent, child } => write!(
                f,
                "cannot attach {child:?} under {parent:?}: it is the same node or one of its ancestors"
            ),
            SceneError::NotANode2D(e) => write!(f, "node {e:?} has no position"),
            SceneError::NotACollisionArea(e) => {
                write!(f, "node {e:?} is not a collision area with position and size")
            }
        }
    }
}

impl std::error::Error for SceneError {}
