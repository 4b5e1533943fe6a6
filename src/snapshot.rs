//! Serializable dump of a scene subtree.
//!
//! Used by the `--dump` flag of the binary and handy in tests to compare a
//! whole tree at once. Children are sorted by name so the output does not
//! depend on map iteration order.

use std::path::Path;

use bevy_ecs::prelude::Entity;
use serde::{Deserialize, Serialize};

use crate::components::area::AreaSize;
use crate::components::collisionarea::CollisionArea;
use crate::components::position::Position;
use crate::components::timer::Timer;
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<AreaSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision: Option<CollisionArea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Look a descendant up by a `/`-separated path of names.
    pub fn find(&self, path: &str) -> Option<&NodeSnapshot> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| {
                node.children.iter().find(|c| c.name == segment)
            })
    }

    /// Number of nodes in this snapshot, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::node_count).sum::<usize>()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Scene {
    /// Capture `node` and its subtree. `None` if the node does not exist.
    pub fn snapshot(&self, node: Entity) -> Option<NodeSnapshot> {
        let name = self.name(node)?.to_string();
        let mut children: Vec<NodeSnapshot> = self
            .children(node)
            .into_iter()
            .filter_map(|child| self.snapshot(child))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Some(NodeSnapshot {
            name,
            position: self.position(node),
            size: self.area_size(node),
            collision: self.collision_area(node),
            timer: self.timer(node),
            children,
        })
    }
}

/// Write a snapshot as pretty JSON.
pub fn write_snapshot(path: &Path, snapshot: &NodeSnapshot) -> Result<(), String> {
    let json = snapshot
        .to_json()
        .map_err(|e| format!("Failed to serialize snapshot: {e}"))?;
    std::fs::write(path, json)
        .map_err(|e| format!("Failed to write snapshot to {}: {e}", path.display()))
}
