//! Rectangular extent of a Node2D.
//!
//! An [`AreaSize`] on a node that also has a
//! [`Position`](super::position::Position) turns it into an Area. The
//! position is the top-left corner; edges and center are derived:
//!
//! - `left = x`, `right = x + width`
//! - `top = y`, `bottom = y + height`
//! - `center = (x + width / 2, y + height / 2)`

use bevy_ecs::prelude::Component;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use super::position::Position;
use crate::resources::screensize::ScreenSize;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaSize {
    pub width: f64,
    pub height: f64,
}

impl AreaSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size taken from a visual's intrinsic dimensions.
    pub fn from_size(size: Size) -> Self {
        Self::new(size.width, size.height)
    }

    /// Bounding box of the area when its top-left corner sits at `position`.
    pub fn bounds(&self, position: &Position) -> Rect {
        Rect::new(
            position.x,
            position.y,
            position.x + self.width,
            position.y + self.height,
        )
    }

    pub fn center(&self, position: &Position) -> Point {
        Point::new(
            position.x + self.width / 2.0,
            position.y + self.height / 2.0,
        )
    }

    /// True when the area has no overlap at all with the screen rectangle.
    pub fn is_off_screen(&self, position: &Position, screen: &ScreenSize) -> bool {
        !aabb_overlaps(self.bounds(position), screen.rect())
    }
}

/// Edge-inclusive AABB test: boxes that merely touch count as overlapping.
pub fn aabb_overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}
