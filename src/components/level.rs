//! Collision scope marker.
//!
//! Entities with the [`Level`] component own the collision broadcast for
//! their subtree: when a Node2D below a level moves, the areas of the moved
//! subtree are tested against the areas of every other immediate child of the
//! level.

use bevy_ecs::prelude::Component;

/// Tag component marking the node that runs collision broadcast.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Level;
