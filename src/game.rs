//! Demo level: a small side-scrolling shooter flown by an autopilot.
//!
//! Everything here is ordinary game content built on the public scene API:
//! behaviors move nodes, timers pace shots and enemy waves, collision handlers
//! queue removals and keep the [`ScoreBoard`] up to date. Input is out of
//! scope, so the player ship sweeps up and down on its own.
//!
//! Enemies are built through a table of constructor functions keyed by
//! [`EnemyKind`].

use std::cell::Cell;
use std::rc::Rc;

use bevy_ecs::prelude::Entity;
use kurbo::{Point, Vec2};
use log::{debug, warn};

use crate::components::collisionarea::CollisionArea;
use crate::components::visual::Visual;
use crate::error::SceneError;
use crate::events::node::{NodeEvent, NodeEventKind};
use crate::resources::scoreboard::ScoreBoard;
use crate::scene::{Behavior, Scene};

/// Collision layer bits used by the demo.
pub mod layers {
    pub const PLAYER: u32 = 1 << 0;
    pub const PLAYER_SHOT: u32 = 1 << 1;
    pub const ENEMY: u32 = 1 << 2;
}

const PLAYER_SIZE: f64 = 24.0;
const PLAYER_SPEED: f64 = 90.0;
const PLAYER_X: f64 = 16.0;
const SHOT_COOLDOWN: f32 = 0.25;
const SHOT_WIDTH: f64 = 8.0;
const SHOT_HEIGHT: f64 = 4.0;
const SHOT_SPEED: f64 = 320.0;
const SPAWN_INTERVAL: f32 = 0.8;
const ZIGZAG_TURN: f32 = 0.5;
const ZIGZAG_VERTICAL_SPEED: f64 = 60.0;

/// The kinds of enemy the spawner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Drone,
    Zigzag,
    Tank,
}

/// Builds a detached enemy subtree with its top-left corner at the given point.
pub type EnemySpawner = fn(&mut Scene, Point) -> Result<Entity, SceneError>;

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Drone, EnemyKind::Zigzag, EnemyKind::Tank];

    pub fn spawner(self) -> EnemySpawner {
        match self {
            EnemyKind::Drone => spawn_drone,
            EnemyKind::Zigzag => spawn_zigzag,
            EnemyKind::Tank => spawn_tank,
        }
    }

    pub fn spawn(self, scene: &mut Scene, at: Point) -> Result<Entity, SceneError> {
        (self.spawner())(scene, at)
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Drone => "Drone",
            EnemyKind::Zigzag => "Zigzag",
            EnemyKind::Tank => "Tank",
        }
    }

    fn asset_key(self) -> &'static str {
        match self {
            EnemyKind::Drone => "enemy_drone",
            EnemyKind::Zigzag => "enemy_zigzag",
            EnemyKind::Tank => "enemy_tank",
        }
    }

    pub fn points(self) -> u32 {
        match self {
            EnemyKind::Drone => 10,
            EnemyKind::Zigzag => 25,
            EnemyKind::Tank => 50,
        }
    }

    pub fn hit_points(self) -> u32 {
        match self {
            EnemyKind::Tank => 3,
            _ => 1,
        }
    }

    pub fn size(self) -> f64 {
        match self {
            EnemyKind::Drone => 16.0,
            EnemyKind::Zigzag => 16.0,
            EnemyKind::Tank => 32.0,
        }
    }

    /// Horizontal speed in pixels per second.
    pub fn speed(self) -> f64 {
        match self {
            EnemyKind::Drone => 80.0,
            EnemyKind::Zigzag => 60.0,
            EnemyKind::Tank => 30.0,
        }
    }
}

/// Build the demo level under the scene root and return it.
pub fn build_demo(scene: &mut Scene, seed: u64) -> Result<Entity, SceneError> {
    scene.insert_resource(ScoreBoard::default());
    let root = scene.root();
    let level = scene.spawn_level("Level");
    scene.attach_child(root, level)?;
    spawn_player(scene, level)?;
    spawn_enemy_spawner(scene, level, seed)?;
    Ok(level)
}

fn bump_score(scene: &mut Scene, f: impl FnOnce(&mut ScoreBoard)) {
    if let Some(mut board) = scene.resource_mut::<ScoreBoard>() {
        f(&mut *board);
    }
}

/// Stop an area from detecting or being detected again.
fn disarm(scene: &mut Scene, area: Entity) {
    if let Some(mut area) = scene.collision_area_mut(area) {
        area.monitoring = false;
        area.monitorable = false;
    }
}

fn spawn_player(scene: &mut Scene, level: Entity) -> Result<Entity, SceneError> {
    let y = (scene.screen_size().height() - PLAYER_SIZE) / 2.0;
    let player = scene.spawn_node2d("Player", PLAYER_X, y);
    scene.attach_child(level, player)?;

    let ship = scene.spawn_visual(
        "Ship",
        PLAYER_X,
        y,
        Visual::new("player").with_size(PLAYER_SIZE, PLAYER_SIZE),
    );
    scene.attach_child(player, ship)?;

    let hull = scene.spawn_collision_area(
        "Hull",
        PLAYER_X,
        y,
        PLAYER_SIZE,
        PLAYER_SIZE,
        CollisionArea::new(layers::PLAYER, layers::ENEMY),
    );
    scene.attach_child(player, hull)?;
    // Enemies do not watch the player, so only this side reports the crash.
    scene.subscribe(hull, NodeEventKind::Collided, |scene, _hull, event| {
        let NodeEvent::Collided(other) = *event else {
            return;
        };
        bump_score(scene, |board| board.hits_taken += 1);
        disarm(scene, other);
        if let Some(enemy) = scene.parent(other) {
            scene.queue_for_removal(enemy);
        }
    })?;

    let cooldown = scene.add_timer(player, "Cooldown", SHOT_COOLDOWN, true)?;
    scene.subscribe(cooldown, NodeEventKind::Tick, move |scene, _timer, _event| {
        if let Err(err) = fire_shot(scene, level, hull) {
            warn!("player could not fire: {err}");
        }
    })?;
    if let Some(mut timer) = scene.timer_mut(cooldown) {
        timer.start();
    }

    let mut direction = 1.0;
    scene.set_behavior(player, move |scene: &mut Scene, node: Entity, delta: f32| {
        let Some(position) = scene.position(node) else {
            return;
        };
        let height = scene.screen_size().height();
        if position.y <= 0.0 {
            direction = 1.0;
        } else if position.y + PLAYER_SIZE >= height {
            direction = -1.0;
        }
        let step = Vec2::new(0.0, direction * PLAYER_SPEED * f64::from(delta));
        if let Err(err) = scene.move_by(node, step) {
            warn!("player could not move: {err}");
        }
    })?;
    Ok(player)
}

fn fire_shot(scene: &mut Scene, level: Entity, hull: Entity) -> Result<(), SceneError> {
    let bounds = scene.bounds(hull).ok_or(SceneError::NotACollisionArea(hull))?;
    let center_y = (bounds.y0 + bounds.y1) / 2.0;
    let shot = scene.spawn_collision_area(
        "Shot",
        bounds.x1,
        center_y - SHOT_HEIGHT / 2.0,
        SHOT_WIDTH,
        SHOT_HEIGHT,
        CollisionArea::new(layers::PLAYER_SHOT, layers::ENEMY),
    );
    scene.insert(shot, Visual::new("shot").with_size(SHOT_WIDTH, SHOT_HEIGHT))?;
    scene.subscribe(shot, NodeEventKind::Collided, |scene, shot, _event| {
        disarm(scene, shot);
        scene.queue_for_removal(shot);
    })?;
    scene.set_behavior(shot, |scene: &mut Scene, node: Entity, delta: f32| {
        let step = Vec2::new(SHOT_SPEED * f64::from(delta), 0.0);
        if scene.move_by(node, step).is_err() {
            return;
        }
        if scene.is_off_screen(node) == Some(true) {
            scene.queue_for_removal(node);
        }
    })?;
    scene.queue_for_addition(level, shot)?;
    bump_score(scene, |board| board.shots_fired += 1);
    Ok(())
}

fn spawn_enemy_spawner(scene: &mut Scene, level: Entity, seed: u64) -> Result<Entity, SceneError> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let timer = scene.add_timer(level, "EnemySpawner", SPAWN_INTERVAL, true)?;
    scene.subscribe(timer, NodeEventKind::Tick, move |scene, _timer, _event| {
        let kind = EnemyKind::ALL[rng.usize(..EnemyKind::ALL.len())];
        let screen = scene.screen_size();
        let y = rng.f64() * (screen.height() - kind.size()).max(0.0);
        let at = Point::new(screen.width(), y);
        let spawned = kind
            .spawn(scene, at)
            .and_then(|enemy| scene.queue_for_addition(level, enemy));
        match spawned {
            Ok(()) => debug!("spawned {} at {at:?}", kind.name()),
            Err(err) => warn!("could not spawn {}: {err}", kind.name()),
        }
    })?;
    if let Some(mut t) = scene.timer_mut(timer) {
        t.start();
    }
    Ok(timer)
}

/// Horizontal drift to the left, with an optional vertical component whose
/// sign is flipped from outside.
struct Drift {
    speed: f64,
    size: f64,
    vertical: Option<(Rc<Cell<f64>>, f64)>,
}

impl Behavior for Drift {
    fn update(&mut self, scene: &mut Scene, node: Entity, delta: f32) {
        let dt = f64::from(delta);
        let dy = self
            .vertical
            .as_ref()
            .map_or(0.0, |(direction, speed)| direction.get() * speed * dt);
        if let Err(err) = scene.move_by(node, Vec2::new(-self.speed * dt, dy)) {
            warn!("enemy could not move: {err}");
            return;
        }
        let Some(position) = scene.position(node) else {
            return;
        };
        if position.x + self.size < 0.0 {
            bump_score(scene, |board| board.enemies_escaped += 1);
            scene.queue_for_removal(node);
        }
    }
}

/// Body, sprite and hitbox shared by every enemy kind.
fn build_enemy(scene: &mut Scene, kind: EnemyKind, at: Point) -> Result<Entity, SceneError> {
    let size = kind.size();
    let body = scene.spawn_node2d(kind.name(), at.x, at.y);
    let sprite = scene.spawn_visual(
        "Sprite",
        at.x,
        at.y,
        Visual::new(kind.asset_key()).with_size(size, size),
    );
    scene.attach_child(body, sprite)?;
    let hitbox = scene.spawn_collision_area(
        "Hitbox",
        at.x,
        at.y,
        size,
        size,
        CollisionArea::new(layers::ENEMY, layers::PLAYER_SHOT),
    );
    scene.attach_child(body, hitbox)?;

    let mut hit_points = kind.hit_points();
    scene.subscribe(hitbox, NodeEventKind::Collided, move |scene, hitbox, _event| {
        hit_points = hit_points.saturating_sub(1);
        if hit_points > 0 {
            return;
        }
        disarm(scene, hitbox);
        bump_score(scene, |board| {
            board.score += kind.points();
            board.enemies_destroyed += 1;
        });
        scene.queue_for_removal(body);
    })?;
    Ok(body)
}

fn spawn_drone(scene: &mut Scene, at: Point) -> Result<Entity, SceneError> {
    let kind = EnemyKind::Drone;
    let body = build_enemy(scene, kind, at)?;
    scene.set_behavior(
        body,
        Drift {
            speed: kind.speed(),
            size: kind.size(),
            vertical: None,
        },
    )?;
    Ok(body)
}

fn spawn_zigzag(scene: &mut Scene, at: Point) -> Result<Entity, SceneError> {
    let kind = EnemyKind::Zigzag;
    let body = build_enemy(scene, kind, at)?;
    let direction = Rc::new(Cell::new(1.0_f64));

    let turn = scene.add_timer(body, "Turn", ZIGZAG_TURN, true)?;
    let flip = Rc::clone(&direction);
    scene.subscribe(turn, NodeEventKind::Tick, move |_scene, _timer, _event| {
        flip.set(-flip.get());
    })?;
    if let Some(mut timer) = scene.timer_mut(turn) {
        timer.start();
    }

    scene.set_behavior(
        body,
        Drift {
            speed: kind.speed(),
            size: kind.size(),
            vertical: Some((direction, ZIGZAG_VERTICAL_SPEED)),
        },
    )?;
    Ok(body)
}

fn spawn_tank(scene: &mut Scene, at: Point) -> Result<Entity, SceneError> {
    let kind = EnemyKind::Tank;
    let body = build_enemy(scene, kind, at)?;
    scene.set_behavior(
        body,
        Drift {
            speed: kind.speed(),
            size: kind.size(),
            vertical: None,
        },
    )?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::screensize::ScreenSize;

    #[test]
    fn factory_builds_every_kind() {
        let mut scene = Scene::new(ScreenSize { w: 320, h: 200 });
        for kind in EnemyKind::ALL {
            let enemy = kind.spawn(&mut scene, Point::new(100.0, 50.0)).unwrap();
            assert_eq!(scene.name(enemy), Some(kind.name()));
            let hitbox = scene.get_child_by_name(enemy, "Hitbox").unwrap();
            assert_eq!(scene.get_collision_areas(enemy), vec![hitbox]);
            assert_eq!(
                scene.area_size(hitbox).map(|s| s.width),
                Some(kind.size())
            );
        }
    }

    #[test]
    fn zigzag_owns_a_running_turn_timer() {
        let mut scene = Scene::default();
        let enemy = EnemyKind::Zigzag.spawn(&mut scene, Point::new(0.0, 0.0)).unwrap();
        let turn = scene.get_child_by_name(enemy, "Turn").unwrap();
        assert!(scene.timer(turn).unwrap().is_active());
    }

    #[test]
    fn demo_runs_and_scores() {
        let mut scene = Scene::new(ScreenSize { w: 320, h: 200 });
        let level = build_demo(&mut scene, 3).unwrap();
        for _ in 0..1200 {
            scene.tick(1.0 / 60.0);
        }
        let board = *scene.resource::<ScoreBoard>().unwrap();
        assert!(board.shots_fired > 0);
        assert!(board.enemies_destroyed + board.enemies_escaped + board.hits_taken > 0);
        assert!(scene.get_child_by_name(level, "Player").is_some());
        assert!(scene.get_child_by_name(level, "EnemySpawner").is_some());
    }
}
