//! Periodic or one-shot alarm counted in simulation seconds.
//!
//! A timer lives on its own node, attached under whatever node it paces. The
//! node's update advances it and raises
//! [`NodeEvent::Tick`](crate::events::node::NodeEvent::Tick) when it fires.
//!
//! Firing happens at most once per update: a single large delta that covers
//! several periods still produces one tick, and only one `duration` is taken
//! off `elapsed`. The leftover makes the next update fire straight away.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub duration: f32,
    pub elapsed: f32,
    pub active: bool,
    pub repeat: bool,
}

impl Timer {
    /// Create a stopped timer. Negative durations are clamped to zero.
    pub fn new(duration: f32, repeat: bool) -> Self {
        Timer {
            duration: duration.max(0.0),
            elapsed: 0.0,
            active: false,
            repeat,
        }
    }

    /// Resume counting. Elapsed time is kept.
    pub fn start(&mut self) {
        self.active = true;
    }

    /// Stop counting and forget elapsed time.
    pub fn stop(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
    }

    /// Stop counting but keep elapsed time.
    pub fn pause(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by `delta` seconds. Returns `true` when the timer fired.
    pub fn advance(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed < self.duration {
            return false;
        }
        self.elapsed -= self.duration;
        if !self.repeat {
            self.stop();
        }
        true
    }
}
