//! ECS components stored on scene nodes.
//!
//! Every node carries a [`node::Node`]; the other components decide what kind
//! of node it is.
//!
//! Submodules overview:
//! - [`area`] – width/height turning a Node2D into an Area, plus AABB helpers
//! - [`collisionarea`] – layer/mask filter and monitoring flags
//! - [`level`] – marker for the node that runs collision broadcast
//! - [`node`] – name, parent link, children map and deferred queues
//! - [`position`] – absolute 2D position of a Node2D
//! - [`timer`] – periodic or one-shot alarm
//! - [`visual`] – asset key announced to the presentation layer

pub mod area;
pub mod collisionarea;
pub mod level;
pub mod node;
pub mod position;
pub mod timer;
pub mod visual;
