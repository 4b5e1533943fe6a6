//! Engine systems.
//!
//! The operations that advance and restructure a
//! [`Scene`](crate::scene::Scene). Each submodule adds its own `impl Scene`
//! block.
//!
//! Submodules overview
//! - [`collision`] – pairwise layer/mask detection and the per-move broadcast
//! - [`lifecycle`] – attach, deferred add/remove queues, teardown
//! - [`movement`] – rigid translation of Node2D subtrees
//! - [`time`] – update simulation time and delta
//! - [`update`] – the recursive per-frame update pass

pub mod collision;
pub mod lifecycle;
pub mod movement;
pub mod time;
pub mod update;
