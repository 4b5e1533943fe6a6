//! Layer/mask collision filtering.
//!
//! A [`CollisionArea`] sits on an Area node (one with both
//! [`Position`](super::position::Position) and
//! [`AreaSize`](super::area::AreaSize)). `layer` says what the area is,
//! `mask` says what it looks for. Detection is one-directional: `a` detects
//! `b` when `a` is monitoring, `b` is monitorable and `a.mask & b.layer != 0`.
//! The opposite direction is evaluated on its own, so a bullet can be seen by a
//! shield without the bullet ever seeing the shield.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionArea {
    /// Categories this area belongs to.
    pub layer: u32,
    /// Categories this area watches for.
    pub mask: u32,
    /// Whether this area actively reports what it overlaps.
    pub monitoring: bool,
    /// Whether other areas can report overlapping this one.
    pub monitorable: bool,
}

impl Default for CollisionArea {
    fn default() -> Self {
        Self {
            layer: 1,
            mask: 1,
            monitoring: true,
            monitorable: true,
        }
    }
}

impl CollisionArea {
    /// Monitoring and monitorable area with the given layer and mask.
    pub fn new(layer: u32, mask: u32) -> Self {
        Self {
            layer,
            mask,
            ..Default::default()
        }
    }

    pub fn with_monitoring(mut self, monitoring: bool) -> Self {
        self.monitoring = monitoring;
        self
    }

    pub fn with_monitorable(mut self, monitorable: bool) -> Self {
        self.monitorable = monitorable;
        self
    }

    /// Whether `self` reports `other` when their boxes overlap.
    pub fn detects(&self, other: &CollisionArea) -> bool {
        self.monitoring && other.monitorable && (self.mask & other.layer) != 0
    }
}
