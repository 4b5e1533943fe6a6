//! Screen size resource.
//!
//! Stores the screen dimensions supplied by the platform layer. Off-screen
//! tests on Node2D and Area nodes compare against `[0, w] x [0, h]`.

use bevy_ecs::prelude::Resource;
use kurbo::Rect;

/// Current screen size in pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self { w: 640, h: 360 }
    }
}

impl ScreenSize {
    pub fn width(&self) -> f64 {
        f64::from(self.w)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.h)
    }

    /// The visible rectangle, origin at the top-left corner.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width(), self.height())
    }
}
