//! Scenegraph2d library.
//!
//! A hierarchical scene-graph engine for small real-time 2D games: a tree of
//! named nodes updated once per frame, with deferred structural changes,
//! rigid Node2D translation, layer/mask collision areas and timers.
//!
//! Nodes are entities of a bevy ECS [`World`](bevy_ecs::world::World) owned by
//! a [`scene::Scene`]. This crate exposes the components, events, resources
//! and systems for use in integration tests and by game content.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod scene;
pub mod snapshot;
pub mod systems;
