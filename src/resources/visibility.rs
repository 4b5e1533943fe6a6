//! Channel between the scene and the presentation layer.
//!
//! The scene pushes [`VisibilityCmd`]s as nodes with a
//! [`Visual`](crate::components::visual::Visual) are attached and torn down.
//! Whatever draws the game holds a clone of the receiver and drains it once
//! per frame; the scene never waits on it.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::events::visibility::VisibilityCmd;

#[derive(Resource)]
pub struct VisibilityBridge {
    /// Sender for [`VisibilityCmd`] messages (scene -> presentation).
    pub tx_cmd: Sender<VisibilityCmd>,
    /// Receiver kept alive by the bridge so sends never fail.
    pub rx_cmd: Receiver<VisibilityCmd>,
}

impl Default for VisibilityBridge {
    fn default() -> Self {
        let (tx_cmd, rx_cmd) = unbounded::<VisibilityCmd>();
        Self { tx_cmd, rx_cmd }
    }
}

impl VisibilityBridge {
    pub fn send(&self, cmd: VisibilityCmd) {
        // The bridge owns a receiver, so the channel cannot be disconnected.
        let _ = self.tx_cmd.send(cmd);
    }

    /// A receiver for the presentation layer.
    pub fn receiver(&self) -> Receiver<VisibilityCmd> {
        self.rx_cmd.clone()
    }
}

/// Register the [`VisibilityBridge`] resource.
pub fn setup_visibility(world: &mut World) {
    world.insert_resource(VisibilityBridge::default());
}
