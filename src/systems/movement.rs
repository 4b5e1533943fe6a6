//! Rigid translation of Node2D subtrees.
//!
//! Setting a coordinate computes the delta from the current value and pushes
//! that same delta through the subtree. Plain nodes in between pass it on
//! without moving themselves, so every Node2D descendant shifts by exactly the
//! delta and relative offsets are preserved.
//!
//! On each Node2D, children are moved first, then `Moved(delta)` is raised,
//! then the node's own coordinate is committed. Once the whole subtree has
//! moved, the enclosing level re-tests its collision areas
//! (see [`crate::systems::collision`]).

use bevy_ecs::prelude::Entity;
use kurbo::Vec2;

use crate::components::position::Position;
use crate::error::SceneError;
use crate::events::node::NodeEvent;
use crate::scene::Scene;

impl Scene {
    pub fn set_x(&mut self, node: Entity, x: f64) -> Result<(), SceneError> {
        let current = self.require_position(node)?;
        self.translate(node, Vec2::new(x - current.x, 0.0));
        Ok(())
    }

    pub fn set_y(&mut self, node: Entity, y: f64) -> Result<(), SceneError> {
        let current = self.require_position(node)?;
        self.translate(node, Vec2::new(0.0, y - current.y));
        Ok(())
    }

    /// Set both coordinates as one move.
    pub fn set_position(&mut self, node: Entity, x: f64, y: f64) -> Result<(), SceneError> {
        let current = self.require_position(node)?;
        self.translate(node, Vec2::new(x - current.x, y - current.y));
        Ok(())
    }

    /// Shift the node (and its subtree) by `distance`.
    pub fn move_by(&mut self, node: Entity, distance: Vec2) -> Result<(), SceneError> {
        self.require_position(node)?;
        self.translate(node, distance);
        Ok(())
    }

    fn require_position(&self, node: Entity) -> Result<Position, SceneError> {
        if !self.contains(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        self.position(node).ok_or(SceneError::NotANode2D(node))
    }

    fn translate(&mut self, node: Entity, delta: Vec2) {
        self.propagate_translation(node, delta);
        if self.contains(node) {
            self.broadcast_collisions(node);
        }
    }

    fn propagate_translation(&mut self, node: Entity, delta: Vec2) {
        for child in self.children(node) {
            self.propagate_translation(child, delta);
        }
        if self.world.get::<Position>(node).is_none() {
            return;
        }
        self.emit(node, NodeEvent::Moved(delta));
        if let Some(mut position) = self.world.get_mut::<Position>(node) {
            position.translate(delta);
        }
    }
}
