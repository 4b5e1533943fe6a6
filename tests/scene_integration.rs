//! Integration tests for the node tree: naming, deferred attach/detach,
//! subtree teardown and rigid translation.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test scene_integration
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use bevy_ecs::prelude::Entity;
use kurbo::Vec2;

use scenegraph2d::components::visual::Visual;
use scenegraph2d::error::SceneError;
use scenegraph2d::events::node::{NodeEvent, NodeEventKind};
use scenegraph2d::events::visibility::VisibilityCmd;
use scenegraph2d::resources::screensize::ScreenSize;
use scenegraph2d::scene::Scene;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn record(scene: &mut Scene, node: Entity, kind: NodeEventKind) -> Rc<RefCell<Vec<NodeEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    scene
        .subscribe(node, kind, move |_, _, event| sink.borrow_mut().push(*event))
        .unwrap();
    log
}

// =============================================================================
// Naming and attachment
// =============================================================================

#[test]
fn duplicate_names_get_smallest_free_suffix() {
    let mut scene = Scene::default();
    let root = scene.root();
    let a = scene.spawn_node("X");
    let b = scene.spawn_node("X");
    let c = scene.spawn_node("X");

    assert_eq!(scene.attach_child(root, a).unwrap(), "X");
    assert_eq!(scene.attach_child(root, b).unwrap(), "X1");
    assert_eq!(scene.attach_child(root, c).unwrap(), "X2");
    assert_eq!(scene.get_child_by_name(root, "X1"), Some(b));
    assert_eq!(scene.name(c), Some("X2"));
}

#[test]
fn freed_name_is_reused() {
    let mut scene = Scene::default();
    let root = scene.root();
    let a = scene.spawn_node("X");
    let b = scene.spawn_node("X");
    scene.attach_child(root, a).unwrap();
    scene.attach_child(root, b).unwrap();

    scene.queue_for_removal(a);
    scene.update(root, 0.0);

    let c = scene.spawn_node("X");
    assert_eq!(scene.attach_child(root, c).unwrap(), "X");
}

#[test]
fn attach_child_rejects_bad_requests() {
    let mut scene = Scene::default();
    let root = scene.root();
    let parent = scene.spawn_node("Parent");
    let child = scene.spawn_node("Child");
    scene.attach_child(root, parent).unwrap();
    scene.attach_child(parent, child).unwrap();

    assert_eq!(
        scene.attach_child(root, child),
        Err(SceneError::AlreadyAttached(child))
    );
    assert_eq!(
        scene.attach_child(child, root),
        Err(SceneError::CyclicAttach {
            parent: child,
            child: root
        })
    );

    let loose = scene.spawn_node("Loose");
    let under = scene.spawn_node("Under");
    scene.attach_child(loose, under).unwrap();
    assert_eq!(
        scene.attach_child(under, loose),
        Err(SceneError::CyclicAttach {
            parent: under,
            child: loose
        })
    );
    assert_eq!(
        scene.attach_child(loose, loose),
        Err(SceneError::CyclicAttach {
            parent: loose,
            child: loose
        })
    );

    scene.queue_for_removal(parent);
    scene.update(root, 0.0);
    let fresh = scene.spawn_node("Fresh");
    assert_eq!(
        scene.attach_child(parent, fresh),
        Err(SceneError::NodeNotFound(parent))
    );
    assert_eq!(
        scene.attach_child(root, child),
        Err(SceneError::NodeNotFound(child))
    );
}

#[test]
fn attach_raises_child_added_on_parent() {
    let mut scene = Scene::default();
    let root = scene.root();
    let added = record(&mut scene, root, NodeEventKind::ChildAdded);
    let child = scene.spawn_node("Child");
    scene.attach_child(root, child).unwrap();
    assert_eq!(*added.borrow(), vec![NodeEvent::ChildAdded(child)]);
}

#[test]
fn get_root_walks_to_the_top() {
    let mut scene = Scene::default();
    let root = scene.root();
    let a = scene.spawn_node("A");
    let b = scene.spawn_node("B");
    scene.attach_child(root, a).unwrap();
    scene.attach_child(a, b).unwrap();
    assert_eq!(scene.get_root(b), root);
    assert_eq!(scene.get_root(root), root);

    let loose = scene.spawn_node("Loose");
    assert_eq!(scene.get_root(loose), loose);
}

#[test]
fn get_child_by_name_is_direct_only() {
    let mut scene = Scene::default();
    let root = scene.root();
    let a = scene.spawn_node("A");
    let b = scene.spawn_node("B");
    scene.attach_child(root, a).unwrap();
    scene.attach_child(a, b).unwrap();
    assert_eq!(scene.get_child_by_name(root, "A"), Some(a));
    assert_eq!(scene.get_child_by_name(root, "B"), None);
    assert_eq!(scene.get_child_by_name(a, "B"), Some(b));
}

// =============================================================================
// Deferred addition and removal
// =============================================================================

#[test]
fn queued_addition_lands_after_parent_update() {
    let mut scene = Scene::default();
    let root = scene.root();
    let child = scene.spawn_node("Late");
    scene.queue_for_addition(root, child).unwrap();

    assert_eq!(scene.get_child_by_name(root, "Late"), None);
    assert_eq!(scene.parent(child), None);
    assert_eq!(scene.node(root).unwrap().pending_additions().count(), 1);

    scene.update(root, 0.016);
    assert_eq!(scene.get_child_by_name(root, "Late"), Some(child));
    assert_eq!(scene.parent(child), Some(root));
}

#[test]
fn queued_addition_is_not_updated_in_the_same_frame() {
    let mut scene = Scene::default();
    let root = scene.root();
    let child = scene.spawn_node("Late");
    let runs = Rc::new(RefCell::new(0u32));
    let counter = runs.clone();
    scene
        .set_behavior(child, move |_: &mut Scene, _: Entity, _: f32| {
            *counter.borrow_mut() += 1
        })
        .unwrap();

    scene.queue_for_addition(root, child).unwrap();
    scene.update(root, 0.016);
    assert_eq!(*runs.borrow(), 0);
    scene.update(root, 0.016);
    assert_eq!(*runs.borrow(), 1);
}

#[test]
fn queued_removal_gets_one_last_update() {
    let mut scene = Scene::default();
    let root = scene.root();
    let doomed = scene.spawn_node("Doomed");
    scene.attach_child(root, doomed).unwrap();

    let runs = Rc::new(RefCell::new(0u32));
    let counter = runs.clone();
    scene
        .set_behavior(doomed, move |_: &mut Scene, _: Entity, _: f32| {
            *counter.borrow_mut() += 1
        })
        .unwrap();

    scene.queue_for_removal(doomed);
    assert!(scene.contains(doomed));
    assert_eq!(scene.get_child_by_name(root, "Doomed"), Some(doomed));

    scene.update(root, 0.016);
    assert_eq!(*runs.borrow(), 1);
    assert!(!scene.contains(doomed));
    assert_eq!(scene.get_child_by_name(root, "Doomed"), None);
}

#[test]
fn node_can_remove_itself_from_its_behavior() {
    let mut scene = Scene::default();
    let root = scene.root();
    let node = scene.spawn_node("SelfDestruct");
    scene.attach_child(root, node).unwrap();
    scene
        .set_behavior(node, |scene: &mut Scene, me: Entity, _: f32| {
            scene.queue_for_removal(me)
        })
        .unwrap();

    scene.update(root, 0.016);
    assert!(!scene.contains(node));
}

#[test]
fn queue_for_removal_is_idempotent() {
    let mut scene = Scene::default();
    let root = scene.root();
    let doomed = scene.spawn_node("Doomed");
    scene.attach_child(root, doomed).unwrap();
    let removed = record(&mut scene, doomed, NodeEventKind::Removed);

    scene.queue_for_removal(doomed);
    scene.queue_for_removal(doomed);
    assert_eq!(scene.node(root).unwrap().pending_removals().count(), 1);

    scene.update(root, 0.016);
    assert_eq!(removed.borrow().len(), 1);

    // Already gone: a no-op.
    scene.queue_for_removal(doomed);
    scene.update(root, 0.016);
    assert_eq!(removed.borrow().len(), 1);
}

#[test]
fn queue_for_removal_ignores_unattached_nodes() {
    let mut scene = Scene::default();
    let root = scene.root();
    let loose = scene.spawn_node("Loose");
    scene.queue_for_removal(loose);
    scene.queue_for_removal(root);
    scene.update(root, 0.016);
    assert!(scene.contains(loose));
    assert!(scene.contains(root));
}

#[test]
fn subtree_removal_is_total() {
    let mut scene = Scene::default();
    let root = scene.root();
    let a = scene.spawn_node("A");
    let b = scene.spawn_node2d("B", 1.0, 1.0);
    let c = scene.spawn_area("C", 0.0, 0.0, 2.0, 2.0);
    scene.attach_child(root, a).unwrap();
    scene.attach_child(a, b).unwrap();
    scene.attach_child(b, c).unwrap();

    let removed: Vec<_> = [a, b, c]
        .into_iter()
        .map(|n| record(&mut scene, n, NodeEventKind::Removed))
        .collect();

    scene.queue_for_removal(a);
    scene.update(root, 0.016);

    for (node, log) in [a, b, c].into_iter().zip(&removed) {
        assert!(!scene.contains(node));
        assert_eq!(*log.borrow(), vec![NodeEvent::Removed]);
        assert_eq!(scene.subscription_count(node), 0);
    }
    assert_eq!(scene.node(root).unwrap().child_count(), 0);
}

#[test]
fn removed_nodes_keep_no_subscribers() {
    let mut scene = Scene::default();
    let root = scene.root();
    let a = scene.spawn_node2d("A", 0.0, 0.0);
    scene.attach_child(root, a).unwrap();
    scene
        .subscribe(a, NodeEventKind::Moved, |_, _, _| {})
        .unwrap();
    scene
        .subscribe(a, NodeEventKind::Tick, |_, _, _| {})
        .unwrap();
    assert_eq!(scene.subscription_count(a), 2);

    scene.complete_removal(a, true);
    assert_eq!(scene.subscription_count(a), 0);
    assert!(!scene.contains(a));
    assert_eq!(scene.get_child_by_name(root, "A"), None);
    assert_eq!(
        scene.subscribe(a, NodeEventKind::Moved, |_, _, _| {}),
        Err(SceneError::NodeNotFound(a))
    );
}

#[test]
fn complete_removal_without_event_is_silent() {
    let mut scene = Scene::default();
    let root = scene.root();
    let a = scene.spawn_node("A");
    scene.attach_child(root, a).unwrap();
    let removed = record(&mut scene, a, NodeEventKind::Removed);

    scene.complete_removal(a, false);
    assert!(removed.borrow().is_empty());
    assert!(!scene.contains(a));
}

#[test]
fn pending_additions_of_removed_parent_are_discarded() {
    let mut scene = Scene::default();
    let root = scene.root();
    let parent = scene.spawn_node("Parent");
    scene.attach_child(root, parent).unwrap();
    let late = scene.spawn_node("Late");
    scene.queue_for_addition(parent, late).unwrap();

    scene.complete_removal(parent, true);
    assert!(!scene.contains(late));
}

#[test]
fn removed_parent_rejects_new_children() {
    let mut scene = Scene::default();
    let root = scene.root();
    let parent = scene.spawn_node("Parent");
    scene.attach_child(root, parent).unwrap();
    let late = scene.spawn_node("Late");
    let queued = scene.spawn_node("Queued");

    let results = Rc::new(RefCell::new(Vec::new()));
    let sink = results.clone();
    scene
        .subscribe(parent, NodeEventKind::Removed, move |scene, me, _| {
            sink.borrow_mut().push(scene.attach_child(me, late).map(|_| ()));
            sink.borrow_mut().push(scene.queue_for_addition(me, queued));
        })
        .unwrap();

    scene.queue_for_removal(parent);
    scene.tick(0.016);

    assert!(!scene.contains(parent));
    assert_eq!(
        *results.borrow(),
        vec![
            Err(SceneError::NodeNotFound(parent)),
            Err(SceneError::NodeNotFound(parent))
        ]
    );
    for node in [late, queued] {
        assert!(scene.contains(node));
        assert_eq!(scene.parent(node), None);
    }
}

#[test]
fn removing_a_pending_addition_cancels_it() {
    let mut scene = Scene::default();
    let root = scene.root();
    let late = scene.spawn_node("Late");
    let inner = scene.spawn_node("Inner");
    scene.attach_child(late, inner).unwrap();
    let runs = Rc::new(RefCell::new(0u32));
    let counter = runs.clone();
    scene
        .set_behavior(late, move |_: &mut Scene, _: Entity, _: f32| {
            *counter.borrow_mut() += 1
        })
        .unwrap();
    let removed = record(&mut scene, late, NodeEventKind::Removed);

    scene.queue_for_addition(root, late).unwrap();
    scene.queue_for_removal(late);
    scene.update(root, 0.016);

    assert!(!scene.contains(late));
    assert!(!scene.contains(inner));
    assert_eq!(scene.get_child_by_name(root, "Late"), None);
    assert_eq!(*removed.borrow(), vec![NodeEvent::Removed]);
    assert_eq!(*runs.borrow(), 0);
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut scene = Scene::default();
    let root = scene.root();
    let count = Rc::new(RefCell::new(0u32));
    let sink = count.clone();
    let id = scene
        .subscribe(root, NodeEventKind::ChildAdded, move |_, _, _| {
            *sink.borrow_mut() += 1
        })
        .unwrap();

    let a = scene.spawn_node("A");
    scene.attach_child(root, a).unwrap();
    assert!(scene.unsubscribe(root, id));
    assert!(!scene.unsubscribe(root, id));
    let b = scene.spawn_node("B");
    scene.attach_child(root, b).unwrap();
    assert_eq!(*count.borrow(), 1);
}

// =============================================================================
// Node2D translation
// =============================================================================

#[test]
fn translation_is_rigid() {
    let mut scene = Scene::default();
    let root = scene.root();
    let parent = scene.spawn_node2d("Parent", 10.0, 10.0);
    let plain = scene.spawn_node("Group");
    let child = scene.spawn_node2d("Child", 15.0, 12.0);
    let grandchild = scene.spawn_area("Grandchild", 20.0, 30.0, 4.0, 4.0);
    scene.attach_child(root, parent).unwrap();
    scene.attach_child(parent, plain).unwrap();
    scene.attach_child(parent, child).unwrap();
    scene.attach_child(plain, grandchild).unwrap();

    scene.set_x(parent, 25.0).unwrap();
    let p = scene.position(parent).unwrap();
    let c = scene.position(child).unwrap();
    let g = scene.position(grandchild).unwrap();
    assert!(approx_eq(p.x, 25.0) && approx_eq(p.y, 10.0));
    assert!(approx_eq(c.x, 30.0) && approx_eq(c.y, 12.0));
    assert!(approx_eq(g.x, 35.0) && approx_eq(g.y, 30.0));

    scene.move_by(parent, Vec2::new(-5.0, 3.0)).unwrap();
    let c = scene.position(child).unwrap();
    assert!(approx_eq(c.x, 25.0) && approx_eq(c.y, 15.0));

    scene.set_position(child, 0.0, 0.0).unwrap();
    let p = scene.position(parent).unwrap();
    assert!(approx_eq(p.x, 20.0) && approx_eq(p.y, 13.0));
}

#[test]
fn moved_reports_delta_children_first() {
    let mut scene = Scene::default();
    let root = scene.root();
    let parent = scene.spawn_node2d("Parent", 0.0, 0.0);
    let child = scene.spawn_node2d("Child", 5.0, 5.0);
    scene.attach_child(root, parent).unwrap();
    scene.attach_child(parent, child).unwrap();

    let order = Rc::new(RefCell::new(Vec::new()));
    for node in [parent, child] {
        let sink = order.clone();
        scene
            .subscribe(node, NodeEventKind::Moved, move |scene, me, event| {
                // The parent still reports its old coordinate at this point.
                let before = scene.position(me).unwrap();
                sink.borrow_mut().push((me, *event, before.y));
            })
            .unwrap();
    }

    scene.set_y(parent, 7.0).unwrap();
    let order = order.borrow();
    assert_eq!(order.len(), 2);
    assert_eq!(order[0].0, child);
    assert_eq!(order[1].0, parent);
    assert_eq!(order[1].1, NodeEvent::Moved(Vec2::new(0.0, 7.0)));
    assert!(approx_eq(order[1].2, 0.0));
}

#[test]
fn move_from_own_moved_handler_is_still_reported() {
    let mut scene = Scene::default();
    let root = scene.root();
    let node = scene.spawn_node2d("Bouncer", 0.0, 0.0);
    scene.attach_child(root, node).unwrap();

    let deltas = Rc::new(RefCell::new(Vec::new()));
    let sink = deltas.clone();
    scene
        .subscribe(node, NodeEventKind::Moved, move |scene, me, event| {
            let first = sink.borrow().is_empty();
            if let NodeEvent::Moved(delta) = event {
                sink.borrow_mut().push(*delta);
            }
            if first {
                scene.move_by(me, Vec2::new(0.0, 5.0)).unwrap();
            }
        })
        .unwrap();

    scene.move_by(node, Vec2::new(3.0, 0.0)).unwrap();

    assert_eq!(
        *deltas.borrow(),
        vec![Vec2::new(3.0, 0.0), Vec2::new(0.0, 5.0)]
    );
    let pos = scene.position(node).unwrap();
    assert!(approx_eq(pos.x, 3.0) && approx_eq(pos.y, 5.0));
}

#[test]
fn events_queued_for_a_running_handler_die_with_it() {
    let mut scene = Scene::default();
    let root = scene.root();
    let node = scene.spawn_node2d("Bouncer", 0.0, 0.0);
    scene.attach_child(root, node).unwrap();

    let calls = Rc::new(RefCell::new(0u32));
    let sink = calls.clone();
    scene
        .subscribe(node, NodeEventKind::Moved, move |scene, me, _| {
            *sink.borrow_mut() += 1;
            scene.move_by(me, Vec2::new(1.0, 0.0)).unwrap();
            scene.complete_removal(me, false);
        })
        .unwrap();

    scene.move_by(node, Vec2::new(1.0, 0.0)).unwrap();
    assert_eq!(*calls.borrow(), 1);
    assert!(!scene.contains(node));
}

#[test]
fn movement_errors() {
    let mut scene = Scene::default();
    let root = scene.root();
    let plain = scene.spawn_node("Plain");
    assert_eq!(scene.set_x(plain, 1.0), Err(SceneError::NotANode2D(plain)));
    assert_eq!(
        scene.move_by(root, Vec2::new(1.0, 0.0)),
        Err(SceneError::NotANode2D(root))
    );

    let gone = scene.spawn_node2d("Gone", 0.0, 0.0);
    scene.complete_removal(gone, false);
    assert_eq!(scene.set_y(gone, 1.0), Err(SceneError::NodeNotFound(gone)));
}

// =============================================================================
// Area geometry and visibility
// =============================================================================

#[test]
fn area_is_off_screen_only_without_overlap() {
    let mut scene = Scene::new(ScreenSize { w: 100, h: 100 });
    let root = scene.root();
    let area = scene.spawn_area("Area", 90.0, 10.0, 20.0, 20.0);
    scene.attach_child(root, area).unwrap();
    assert_eq!(scene.is_off_screen(area), Some(false));

    // Touching the right edge still counts as overlap.
    scene.set_x(area, 100.0).unwrap();
    assert_eq!(scene.is_off_screen(area), Some(false));

    scene.set_x(area, 100.5).unwrap();
    assert_eq!(scene.is_off_screen(area), Some(true));

    scene.set_position(area, -30.0, 50.0).unwrap();
    assert_eq!(scene.is_off_screen(area), Some(true));

    let center = scene.center(area).unwrap();
    assert!(approx_eq(center.x, -20.0) && approx_eq(center.y, 60.0));
    assert_eq!(scene.is_off_screen(root), None);
}

#[test]
fn node2d_off_screen_uses_its_point() {
    let mut scene = Scene::new(ScreenSize { w: 100, h: 50 });
    let root = scene.root();
    let point = scene.spawn_node2d("Point", 100.0, 50.0);
    scene.attach_child(root, point).unwrap();
    assert_eq!(scene.is_off_screen(point), Some(false));
    scene.set_y(point, 51.0).unwrap();
    assert_eq!(scene.is_off_screen(point), Some(true));
}

#[test]
fn visuals_are_shown_on_attach_and_hidden_on_removal() {
    let mut scene = Scene::default();
    let root = scene.root();
    let rx = scene.visibility_receiver();
    let sprite = scene.spawn_visual("Sprite", 0.0, 0.0, Visual::new("ship").with_size(16.0, 8.0));
    assert!(rx.try_recv().is_err());

    scene.attach_child(root, sprite).unwrap();
    assert_eq!(
        rx.try_recv().unwrap(),
        VisibilityCmd::Show {
            node: sprite,
            key: "ship".to_string()
        }
    );
    let size = scene.area_size(sprite).unwrap();
    assert!(approx_eq(size.width, 16.0) && approx_eq(size.height, 8.0));

    scene.queue_for_removal(sprite);
    scene.update(root, 0.016);
    assert_eq!(rx.try_recv().unwrap(), VisibilityCmd::Hide { node: sprite });
}
