//! ECS resources stored in the scene's world.
//!
//! Overview
//! - `gameconfig` – settings for a simulation run, loaded from INI
//! - `scoreboard` – running totals for the demo level
//! - `screensize` – screen bounds used by off-screen tests
//! - `visibility` – channel carrying show/hide commands to the presentation layer
//! - `worldtime` – simulation time and delta
pub mod gameconfig;
pub mod scoreboard;
pub mod screensize;
pub mod visibility;
pub mod worldtime;
