//! Running totals for the demo level.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    pub score: u32,
    pub enemies_destroyed: u32,
    pub enemies_escaped: u32,
    pub shots_fired: u32,
    pub hits_taken: u32,
}
