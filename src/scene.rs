//! The scene: an arena of nodes plus the closures attached to them.
//!
//! Nodes are entities in a private bevy [`World`]. Tree structure lives in
//! each entity's [`Node`] component: children are owned by id, the parent link
//! is a plain id that never keeps anything alive. Teardown despawns the
//! entity, so a stale [`Entity`] handle simply stops resolving.
//!
//! Gameplay closures ([`Behavior`]s and event handlers) capture arbitrary
//! state and are not `Send`, so they are kept in side tables keyed by entity
//! instead of as components. They receive `&mut Scene` when invoked; while one
//! runs it is taken out of its table, which is what lets it mutate the scene
//! freely.
//!
//! The structural operations live next to the systems they belong to:
//! - [`crate::systems::lifecycle`] – attach, queue, teardown
//! - [`crate::systems::update`] – the per-frame update pass
//! - [`crate::systems::movement`] – Node2D translation
//! - [`crate::systems::collision`] – pairwise detection and broadcast

use std::collections::VecDeque;

use bevy_ecs::prelude::*;
use crossbeam_channel::Receiver;
use kurbo::{Point, Rect};
use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::area::AreaSize;
use crate::components::collisionarea::CollisionArea;
use crate::components::level::Level;
use crate::components::node::Node;
use crate::components::position::Position;
use crate::components::timer::Timer;
use crate::components::visual::Visual;
use crate::error::SceneError;
use crate::events::node::{NodeEvent, NodeEventKind, SubscriptionId};
use crate::events::visibility::VisibilityCmd;
use crate::resources::screensize::ScreenSize;
use crate::resources::visibility::{VisibilityBridge, setup_visibility};
use crate::resources::worldtime::WorldTime;

/// Per-node gameplay logic, run at the start of the node's own update.
pub trait Behavior {
    fn update(&mut self, scene: &mut Scene, node: Entity, delta: f32);
}

impl<F> Behavior for F
where
    F: FnMut(&mut Scene, Entity, f32),
{
    fn update(&mut self, scene: &mut Scene, node: Entity, delta: f32) {
        self(scene, node, delta)
    }
}

/// Handler invoked with the scene, the node that raised the event and the event.
pub type NodeHandler = Box<dyn FnMut(&mut Scene, Entity, &NodeEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: NodeEventKind,
    // Empty while the handler is running.
    handler: Option<NodeHandler>,
    // Events raised while the handler was running, delivered once it returns.
    pending: VecDeque<NodeEvent>,
}

pub struct Scene {
    pub(crate) world: World,
    root: Entity,
    behaviors: FxHashMap<Entity, Box<dyn Behavior>>,
    subscriptions: FxHashMap<Entity, Vec<Subscription>>,
    next_subscription: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(ScreenSize::default())
    }
}

impl Scene {
    /// Create a scene with an attached-to-nothing root node named `"root"`.
    pub fn new(screen: ScreenSize) -> Self {
        let mut world = World::new();
        world.insert_resource(screen);
        world.insert_resource(WorldTime::default());
        setup_visibility(&mut world);
        let root = world.spawn(Node::new("root")).id();
        Self {
            world,
            root,
            behaviors: FxHashMap::default(),
            subscriptions: FxHashMap::default(),
            next_subscription: 0,
        }
    }

    /// The node driven by [`Scene::tick`].
    pub fn root(&self) -> Entity {
        self.root
    }

    /// Read-only access to the underlying world.
    pub fn world(&self) -> &World {
        &self.world
    }

    // ---------------------------------------------------------------------
    // Spawning. Every spawned node starts detached.
    // ---------------------------------------------------------------------

    pub fn spawn_node(&mut self, name: impl Into<String>) -> Entity {
        self.world.spawn(Node::new(name)).id()
    }

    pub fn spawn_node2d(&mut self, name: impl Into<String>, x: f64, y: f64) -> Entity {
        self.world
            .spawn((Node::new(name), Position::new(x, y)))
            .id()
    }

    pub fn spawn_area(
        &mut self,
        name: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Entity {
        self.world
            .spawn((
                Node::new(name),
                Position::new(x, y),
                AreaSize::new(width, height),
            ))
            .id()
    }

    pub fn spawn_collision_area(
        &mut self,
        name: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        area: CollisionArea,
    ) -> Entity {
        self.world
            .spawn((
                Node::new(name),
                Position::new(x, y),
                AreaSize::new(width, height),
                area,
            ))
            .id()
    }

    /// Spawn an Area sized after the visual's intrinsic size (zero if unknown).
    pub fn spawn_visual(&mut self, name: impl Into<String>, x: f64, y: f64, visual: Visual) -> Entity {
        let size = visual.size.map(AreaSize::from_size).unwrap_or_default();
        self.world
            .spawn((Node::new(name), Position::new(x, y), size, visual))
            .id()
    }

    /// Spawn a Node2D at the origin that owns collision broadcast for its subtree.
    pub fn spawn_level(&mut self, name: impl Into<String>) -> Entity {
        self.world
            .spawn((Node::new(name), Position::default(), Level))
            .id()
    }

    /// Spawn a stopped timer node.
    pub fn spawn_timer(&mut self, name: impl Into<String>, duration: f32, repeat: bool) -> Entity {
        self.world
            .spawn((Node::new(name), Timer::new(duration, repeat)))
            .id()
    }

    /// Spawn a stopped timer and attach it under `parent` right away.
    pub fn add_timer(
        &mut self,
        parent: Entity,
        name: impl Into<String>,
        duration: f32,
        repeat: bool,
    ) -> Result<Entity, SceneError> {
        let timer = self.spawn_timer(name, duration, repeat);
        if let Err(err) = self.attach_child(parent, timer) {
            self.world.despawn(timer);
            return Err(err);
        }
        Ok(timer)
    }

    /// Insert extra components on a live node.
    pub fn insert<B: Bundle>(&mut self, node: Entity, bundle: B) -> Result<(), SceneError> {
        if !self.contains(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        self.world.entity_mut(node).insert(bundle);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Whether `node` refers to a live node.
    pub fn contains(&self, node: Entity) -> bool {
        self.world.get::<Node>(node).is_some()
    }

    pub fn node(&self, node: Entity) -> Option<&Node> {
        self.world.get::<Node>(node)
    }

    pub fn name(&self, node: Entity) -> Option<&str> {
        self.node(node).map(Node::name)
    }

    pub fn parent(&self, node: Entity) -> Option<Entity> {
        self.node(node).and_then(Node::parent)
    }

    /// Snapshot of the attached children, in unspecified order.
    pub fn children(&self, node: Entity) -> SmallVec<[Entity; 8]> {
        self.node(node)
            .map(|n| n.children().collect())
            .unwrap_or_default()
    }

    /// Walk parent links up to the node that has none.
    pub fn get_root(&self, node: Entity) -> Entity {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub fn get_child_by_name(&self, parent: Entity, name: &str) -> Option<Entity> {
        self.node(parent).and_then(|n| n.child(name))
    }

    /// Every collision area in the subtree of `node`, `node` included.
    pub fn get_collision_areas(&self, node: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        self.collect_collision_areas(node, &mut out);
        out
    }

    fn collect_collision_areas(&self, node: Entity, out: &mut Vec<Entity>) {
        let Some(n) = self.node(node) else {
            return;
        };
        if self.world.get::<CollisionArea>(node).is_some() {
            out.push(node);
        }
        for child in n.children() {
            self.collect_collision_areas(child, out);
        }
    }

    /// Whether `ancestor` is `node` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: Entity, node: Entity) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    pub fn position(&self, node: Entity) -> Option<Position> {
        self.world.get::<Position>(node).copied()
    }

    pub fn area_size(&self, node: Entity) -> Option<AreaSize> {
        self.world.get::<AreaSize>(node).copied()
    }

    /// Bounding box of an Area node.
    pub fn bounds(&self, node: Entity) -> Option<Rect> {
        let position = self.world.get::<Position>(node)?;
        let size = self.world.get::<AreaSize>(node)?;
        Some(size.bounds(position))
    }

    pub fn center(&self, node: Entity) -> Option<Point> {
        let position = self.world.get::<Position>(node)?;
        let size = self.world.get::<AreaSize>(node)?;
        Some(size.center(position))
    }

    /// Off-screen test against the [`ScreenSize`] resource.
    ///
    /// Areas are off screen when their box has no overlap with the screen,
    /// plain Node2Ds when their point lies outside it. `None` for nodes
    /// without a position.
    pub fn is_off_screen(&self, node: Entity) -> Option<bool> {
        let position = self.world.get::<Position>(node)?;
        let screen = self.screen_size();
        match self.world.get::<AreaSize>(node) {
            Some(size) => Some(size.is_off_screen(position, &screen)),
            None => Some(position.is_off_screen(&screen)),
        }
    }

    pub fn collision_area(&self, node: Entity) -> Option<CollisionArea> {
        self.world.get::<CollisionArea>(node).copied()
    }

    pub fn collision_area_mut(&mut self, node: Entity) -> Option<Mut<'_, CollisionArea>> {
        self.world.get_mut::<CollisionArea>(node)
    }

    pub fn timer(&self, node: Entity) -> Option<Timer> {
        self.world.get::<Timer>(node).copied()
    }

    pub fn timer_mut(&mut self, node: Entity) -> Option<Mut<'_, Timer>> {
        self.world.get_mut::<Timer>(node)
    }

    pub fn is_level(&self, node: Entity) -> bool {
        self.world.get::<Level>(node).is_some()
    }

    // ---------------------------------------------------------------------
    // Resources
    // ---------------------------------------------------------------------

    pub fn resource<R: Resource>(&self) -> Option<&R> {
        self.world.get_resource::<R>()
    }

    pub fn resource_mut<R: Resource>(&mut self) -> Option<Mut<'_, R>> {
        self.world.get_resource_mut::<R>()
    }

    pub fn insert_resource<R: Resource>(&mut self, resource: R) {
        self.world.insert_resource(resource);
    }

    pub fn screen_size(&self) -> ScreenSize {
        self.world
            .get_resource::<ScreenSize>()
            .copied()
            .unwrap_or_default()
    }

    pub fn set_screen_size(&mut self, screen: ScreenSize) {
        self.world.insert_resource(screen);
    }

    pub fn world_time(&self) -> WorldTime {
        self.world
            .get_resource::<WorldTime>()
            .copied()
            .unwrap_or_default()
    }

    /// Receiver for the presentation layer; drain it once per frame.
    pub fn visibility_receiver(&self) -> Receiver<VisibilityCmd> {
        self.world.resource::<VisibilityBridge>().receiver()
    }

    pub(crate) fn send_visibility(&self, cmd: VisibilityCmd) {
        if let Some(bridge) = self.world.get_resource::<VisibilityBridge>() {
            bridge.send(cmd);
        }
    }

    pub(crate) fn show_visual(&self, node: Entity) {
        if let Some(visual) = self.world.get::<Visual>(node) {
            self.send_visibility(VisibilityCmd::Show {
                node,
                key: visual.key.clone(),
            });
        }
    }

    pub(crate) fn hide_visual(&self, node: Entity) {
        if self.world.get::<Visual>(node).is_some() {
            self.send_visibility(VisibilityCmd::Hide { node });
        }
    }

    // ---------------------------------------------------------------------
    // Behaviors
    // ---------------------------------------------------------------------

    /// Install the per-frame logic of `node`, replacing any previous one.
    pub fn set_behavior(
        &mut self,
        node: Entity,
        behavior: impl Behavior + 'static,
    ) -> Result<(), SceneError> {
        if !self.contains(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        self.behaviors.insert(node, Box::new(behavior));
        Ok(())
    }

    pub fn clear_behavior(&mut self, node: Entity) {
        self.behaviors.remove(&node);
    }

    pub(crate) fn run_behavior(&mut self, node: Entity, delta: f32) {
        let Some(mut behavior) = self.behaviors.remove(&node) else {
            return;
        };
        behavior.update(self, node, delta);
        // Dropped if the node was torn down or got a new behavior meanwhile.
        if self.contains(node) {
            self.behaviors.entry(node).or_insert(behavior);
        }
    }

    pub(crate) fn drop_behavior(&mut self, node: Entity) {
        self.behaviors.remove(&node);
    }

    // ---------------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------------

    /// Register `handler` for events of `kind` raised by `node`.
    pub fn subscribe<F>(
        &mut self,
        node: Entity,
        kind: NodeEventKind,
        handler: F,
    ) -> Result<SubscriptionId, SceneError>
    where
        F: FnMut(&mut Scene, Entity, &NodeEvent) + 'static,
    {
        if !self.contains(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.entry(node).or_default().push(Subscription {
            id,
            kind,
            handler: Some(Box::new(handler)),
            pending: VecDeque::new(),
        });
        Ok(id)
    }

    /// Remove one handler. Returns `false` if it was not registered on `node`.
    pub fn unsubscribe(&mut self, node: Entity, id: SubscriptionId) -> bool {
        let Some(subs) = self.subscriptions.get_mut(&node) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| s.id != id);
        let removed = subs.len() != before;
        if subs.is_empty() {
            self.subscriptions.remove(&node);
        }
        removed
    }

    /// Number of handlers registered on `node`, across all event kinds.
    pub fn subscription_count(&self, node: Entity) -> usize {
        self.subscriptions.get(&node).map_or(0, Vec::len)
    }

    pub(crate) fn clear_subscriptions(&mut self, node: Entity) {
        if let Some(subs) = self.subscriptions.remove(&node) {
            debug!("dropped {} handler(s) of {node:?}", subs.len());
        }
    }

    /// Invoke the handlers of `node` registered for this event's kind.
    ///
    /// A handler that is already running further up the stack gets the event
    /// queued instead, and sees it right after its current call returns.
    /// Handlers unsubscribed by an earlier handler of the same emission are
    /// skipped, and queued events die with their subscription.
    pub(crate) fn emit(&mut self, node: Entity, event: NodeEvent) {
        let kind = event.kind();
        let ids: SmallVec<[SubscriptionId; 4]> = match self.subscriptions.get(&node) {
            Some(subs) => subs.iter().filter(|s| s.kind == kind).map(|s| s.id).collect(),
            None => return,
        };
        for id in ids {
            let Some(sub) = self.subscription_mut(node, id) else {
                continue;
            };
            let Some(mut handler) = sub.handler.take() else {
                debug!("deferring {kind:?} for {node:?}: handler is running");
                sub.pending.push_back(event);
                continue;
            };
            handler(self, node, &event);
            while let Some(next) = self
                .subscription_mut(node, id)
                .and_then(|sub| sub.pending.pop_front())
            {
                handler(self, node, &next);
            }
            self.restore_handler(node, id, handler);
        }
    }

    fn subscription_mut(&mut self, node: Entity, id: SubscriptionId) -> Option<&mut Subscription> {
        self.subscriptions
            .get_mut(&node)?
            .iter_mut()
            .find(|s| s.id == id)
    }

    fn restore_handler(&mut self, node: Entity, id: SubscriptionId, handler: NodeHandler) {
        if let Some(slot) = self.subscription_mut(node, id) {
            slot.handler = Some(handler);
        }
    }
}
