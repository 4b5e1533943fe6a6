//! Absolute 2D position of a node.
//!
//! A node with a [`Position`] is a Node2D. Positions are stored in world
//! space; moving a node through
//! [`Scene::set_x`](crate::scene::Scene::set_x) and friends shifts every
//! Node2D descendant by the same delta, so relative offsets inside a subtree
//! never change. Writing the fields directly bypasses that propagation.

use bevy_ecs::prelude::Component;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::resources::screensize::ScreenSize;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// True when the point lies outside `[0, w] x [0, h]`.
    pub fn is_off_screen(&self, screen: &ScreenSize) -> bool {
        self.x < 0.0 || self.y < 0.0 || self.x > screen.width() || self.y > screen.height()
    }
}
