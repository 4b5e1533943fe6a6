//! Notifications raised by scene nodes.
//!
//! Handlers are registered per node and per [`NodeEventKind`] through
//! [`Scene::subscribe`](crate::scene::Scene::subscribe). They run
//! synchronously, in subscription order, while the operation that raised the
//! event is still on the stack, and receive `&mut Scene` so they can move,
//! spawn or remove nodes right away.
//!
//! Teardown drops every handler registered on the removed node.

use bevy_ecs::prelude::Entity;
use kurbo::Vec2;

/// Event payload delivered to handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEvent {
    /// A child was attached to this node.
    ChildAdded(Entity),
    /// This node is being torn down.
    Removed,
    /// This Node2D was translated by the given delta.
    Moved(Vec2),
    /// This collision area detected the given area.
    Collided(Entity),
    /// This timer fired.
    Tick,
}

/// Discriminant used to pick which events a handler receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEventKind {
    ChildAdded,
    Removed,
    Moved,
    Collided,
    Tick,
}

impl NodeEvent {
    pub fn kind(&self) -> NodeEventKind {
        match self {
            NodeEvent::ChildAdded(_) => NodeEventKind::ChildAdded,
            NodeEvent::Removed => NodeEventKind::Removed,
            NodeEvent::Moved(_) => NodeEventKind::Moved,
            NodeEvent::Collided(_) => NodeEventKind::Collided,
            NodeEvent::Tick => NodeEventKind::Tick,
        }
    }
}

/// Handle returned by [`Scene::subscribe`](crate::scene::Scene::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);
