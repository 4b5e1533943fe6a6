//! Pairwise collision detection and per-move broadcast.
//!
//! [`Scene::detect_collision`] tests one pair: an edge-inclusive AABB overlap,
//! then each direction's layer/mask filter on its own. The detecting side gets
//! `Collided(other)`.
//!
//! [`Scene::broadcast_collisions`] runs after every move. It finds the nearest
//! [`Level`](crate::components::level::Level) above the moved node and tests
//! every collision area of the moved subtree against every collision area of
//! the level's other immediate children. Handlers run synchronously and may
//! move or remove nodes mid-broadcast; nested moves start nested broadcasts,
//! and pairs whose nodes disappeared are skipped.

use bevy_ecs::prelude::Entity;
use kurbo::Rect;
use log::{debug, warn};

use crate::components::area::aabb_overlaps;
use crate::components::collisionarea::CollisionArea;
use crate::error::SceneError;
use crate::events::node::NodeEvent;
use crate::scene::Scene;

impl Scene {
    /// Test `source` against `target` and raise `Collided` on each side
    /// that detects the other.
    pub fn detect_collision(&mut self, source: Entity, target: Entity) -> Result<(), SceneError> {
        let (source_box, source_area) = self.collision_shape(source)?;
        let (target_box, target_area) = self.collision_shape(target)?;
        if source == target || !aabb_overlaps(source_box, target_box) {
            return Ok(());
        }

        let forward = source_area.detects(&target_area);
        let backward = target_area.detects(&source_area);
        if forward {
            debug!("{source:?} detected {target:?}");
            self.emit(source, NodeEvent::Collided(target));
        }
        if backward {
            debug!("{target:?} detected {source:?}");
            self.emit(target, NodeEvent::Collided(source));
        }
        Ok(())
    }

    fn collision_shape(&self, node: Entity) -> Result<(Rect, CollisionArea), SceneError> {
        if !self.contains(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        let area = self
            .collision_area(node)
            .ok_or(SceneError::NotACollisionArea(node))?;
        let bounds = self.bounds(node).ok_or(SceneError::NotACollisionArea(node))?;
        Ok((bounds, area))
    }

    /// The nearest level above `node`, with the level's child whose subtree
    /// contains `node`.
    pub fn collision_scope(&self, node: Entity) -> Option<(Entity, Entity)> {
        let mut branch = node;
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if self.is_level(parent) {
                return Some((parent, branch));
            }
            branch = parent;
            current = self.parent(parent);
        }
        None
    }

    /// Re-test the collision areas of `moved`'s subtree against those of every
    /// sibling branch of its level. Does nothing outside a level.
    pub fn broadcast_collisions(&mut self, moved: Entity) {
        let Some((level, branch)) = self.collision_scope(moved) else {
            return;
        };
        let sources = self.get_collision_areas(moved);
        if sources.is_empty() {
            return;
        }

        let others: Vec<Entity> = self
            .children(level)
            .into_iter()
            .filter(|&child| child != branch)
            .collect();
        for other in others {
            let targets = self.get_collision_areas(other);
            for &source in &sources {
                for &target in &targets {
                    if !self.contains(source) || !self.contains(target) {
                        continue;
                    }
                    if let Err(err) = self.detect_collision(source, target) {
                        warn!("skipping collision pair {source:?}/{target:?}: {err}");
                    }
                }
            }
        }
    }
}
