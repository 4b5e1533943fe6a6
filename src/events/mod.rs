//! Event types exchanged between the scene and its collaborators.
//!
//! Submodules:
//! - [`node`] – notifications raised by nodes (child added, removed, moved,
//!   collided, tick) and the subscription handle type
//! - [`visibility`] – show/hide commands for the presentation layer
pub mod node;
pub mod visibility;
