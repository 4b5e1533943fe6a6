//! Game configuration resource.
//!
//! Holds the settings of a headless simulation run, loaded from an INI
//! file. Defaults are safe for startup, so a missing file is not fatal.
//!
//! # Configuration File Format
//!
//! ```ini
//! [screen]
//! width = 640
//! height = 360
//!
//! [simulation]
//! fps = 60
//! frames = 600
//! time_scale = 1.0
//! seed = 7
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::screensize::ScreenSize;

/// Default safe values for startup
const DEFAULT_SCREEN_WIDTH: u32 = 640;
const DEFAULT_SCREEN_HEIGHT: u32 = 360;
const DEFAULT_FPS: u32 = 60;
const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_SEED: u64 = 7;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Screen width in pixels, used for off-screen tests.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Simulated frames per second; each tick advances `1 / fps` seconds.
    pub fps: u32,
    /// Number of frames to simulate.
    pub frames: u64,
    /// Multiplier applied to every frame delta.
    pub time_scale: f32,
    /// Seed for the demo level's random enemy placement.
    pub seed: u64,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            fps: DEFAULT_FPS,
            frames: DEFAULT_FRAMES,
            time_scale: DEFAULT_TIME_SCALE,
            seed: DEFAULT_SEED,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [screen] section
        if let Some(width) = config.getuint("screen", "width").ok().flatten() {
            self.screen_width = width as u32;
        }
        if let Some(height) = config.getuint("screen", "height").ok().flatten() {
            self.screen_height = height as u32;
        }

        // [simulation] section
        if let Some(fps) = config.getuint("simulation", "fps").ok().flatten() {
            self.fps = (fps as u32).max(1);
        }
        if let Some(frames) = config.getuint("simulation", "frames").ok().flatten() {
            self.frames = frames;
        }
        if let Some(scale) = config.getfloat("simulation", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }
        if let Some(seed) = config.getuint("simulation", "seed").ok().flatten() {
            self.seed = seed;
        }

        info!(
            "Loaded config: {}x{} screen, fps={}, frames={}, time_scale={}, seed={}",
            self.screen_width,
            self.screen_height,
            self.fps,
            self.frames,
            self.time_scale,
            self.seed
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("screen", "width", Some(self.screen_width.to_string()));
        config.set("screen", "height", Some(self.screen_height.to_string()));

        config.set("simulation", "fps", Some(self.fps.to_string()));
        config.set("simulation", "frames", Some(self.frames.to_string()));
        config.set("simulation", "time_scale", Some(self.time_scale.to_string()));
        config.set("simulation", "seed", Some(self.seed.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Seconds simulated by one frame.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// Screen bounds for the scene. Sizes beyond `i32::MAX` saturate.
    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize {
            w: i32::try_from(self.screen_width).unwrap_or(i32::MAX),
            h: i32::try_from(self.screen_height).unwrap_or(i32::MAX),
        }
    }
}
