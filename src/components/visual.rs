//! Link between a node and its presentation.
//!
//! The scene never draws anything. When a node carrying a [`Visual`] becomes
//! attached, a [`VisibilityCmd::Show`](crate::events::visibility::VisibilityCmd)
//! is sent to the presentation layer; teardown sends the matching `Hide`.

use bevy_ecs::prelude::Component;
use kurbo::Size;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Visual {
    /// Asset key understood by the presentation layer.
    pub key: String,
    /// Intrinsic size of the asset, if known.
    pub size: Option<Size>,
}

impl Visual {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }
}
