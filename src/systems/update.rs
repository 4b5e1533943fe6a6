//! The per-frame update pass.
//!
//! [`Scene::update`] visits a node and then its subtree depth-first:
//!
//! 1. The node's [`Timer`](crate::components::timer::Timer), if any, advances
//!    and may raise `Tick`.
//! 2. The node's [`Behavior`](crate::scene::Behavior), if any, runs.
//! 3. Every child attached when the loop starts is updated, in unspecified
//!    order. The loop walks a snapshot, so nothing requested meanwhile can
//!    disturb it.
//! 4. The node drains its addition queue, then its removal queue.
//!
//! A node queued for removal during a frame therefore still gets that frame's
//! update if it was attached before its parent's loop began, and disappears
//! once its parent has finished the loop.

use bevy_ecs::prelude::Entity;

use crate::components::timer::Timer;
use crate::events::node::NodeEvent;
use crate::scene::Scene;
use crate::systems::time::update_world_time;

impl Scene {
    /// Advance the world clock by `dt` (scaled by the time scale) and update
    /// the whole tree from the scene root.
    pub fn tick(&mut self, dt: f32) {
        let delta = update_world_time(&mut self.world, dt);
        let root = self.root();
        self.update(root, delta);
    }

    /// Update `node` and its subtree by `delta` seconds.
    pub fn update(&mut self, node: Entity, delta: f32) {
        if !self.contains(node) {
            return;
        }
        self.advance_timer(node, delta);
        self.run_behavior(node, delta);
        if !self.contains(node) {
            return;
        }

        for child in self.children(node) {
            // Skip children torn down or moved away by an earlier sibling.
            if self.parent(child) == Some(node) {
                self.update(child, delta);
            }
        }

        if self.contains(node) {
            self.drain_queues(node);
        }
    }

    fn advance_timer(&mut self, node: Entity, delta: f32) {
        let fired = self
            .world
            .get_mut::<Timer>(node)
            .is_some_and(|mut timer| timer.advance(delta));
        if fired {
            self.emit(node, NodeEvent::Tick);
        }
    }
}
