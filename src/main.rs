//! Scenegraph2d main entry point.
//!
//! Runs the demo level headlessly for a fixed number of frames:
//! - **bevy_ecs** stores the node arena
//! - **configparser** reads `config.ini`
//! - **crossbeam-channel** carries show/hide commands to the (logging)
//!   presentation stand-in
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 1200 --dump tree.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::{debug, error, info};

use scenegraph2d::events::visibility::VisibilityCmd;
use scenegraph2d::game::build_demo;
use scenegraph2d::resources::gameconfig::GameConfig;
use scenegraph2d::resources::scoreboard::ScoreBoard;
use scenegraph2d::resources::worldtime::WorldTime;
use scenegraph2d::scene::Scene;
use scenegraph2d::snapshot::write_snapshot;

/// Headless scene-graph demo runner.
#[derive(Parser)]
#[command(version, about = "Runs the scenegraph2d demo level without a window.")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of frames to simulate (overrides the config file).
    #[arg(long)]
    frames: Option<u64>,

    /// Seed for enemy placement (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON snapshot of the final tree to this path.
    #[arg(long, value_name = "PATH")]
    dump: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        info!("{e}; using defaults");
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut scene = Scene::new(config.screen_size());
    scene.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    let visibility = scene.visibility_receiver();

    if let Err(e) = build_demo(&mut scene, config.seed) {
        error!("Failed to build demo level: {e}");
        std::process::exit(1);
    }
    scene.insert_resource(config.clone());

    let dt = config.frame_delta();
    let mut visible: u64 = 0;
    for _ in 0..config.frames {
        scene.tick(dt);

        // Presentation stand-in: keep a count of what would be on screen.
        for cmd in visibility.try_iter() {
            match cmd {
                VisibilityCmd::Show { node, key } => {
                    visible += 1;
                    debug!("show {key} for {node:?}");
                }
                VisibilityCmd::Hide { node } => {
                    visible = visible.saturating_sub(1);
                    debug!("hide {node:?}");
                }
            }
        }
    }

    let time = scene.world_time();
    let board = scene.resource::<ScoreBoard>().copied().unwrap_or_default();
    info!(
        "Simulated {} frames ({:.2}s): score={}, destroyed={}, escaped={}, shots={}, hits taken={}, visuals shown={}",
        time.frame_count,
        time.elapsed,
        board.score,
        board.enemies_destroyed,
        board.enemies_escaped,
        board.shots_fired,
        board.hits_taken,
        visible
    );

    if let Some(path) = cli.dump {
        let root = scene.root();
        match scene.snapshot(root) {
            Some(snapshot) => match write_snapshot(&path, &snapshot) {
                Ok(()) => info!("Snapshot written to {}", path.display()),
                Err(e) => {
                    error!("{e}");
                    std::process::exit(1);
                }
            },
            None => error!("Scene root vanished; nothing to dump"),
        }
    }
}
