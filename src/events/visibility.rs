//! Commands sent *to* the presentation layer.
//!
//! See [`crate::resources::visibility`] for the channel carrying them.

use bevy_ecs::prelude::Entity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityCmd {
    /// The node became part of the tree; show the asset `key` for it.
    Show { node: Entity, key: String },
    /// The node was torn down; hide whatever was shown for it.
    Hide { node: Entity },
}
