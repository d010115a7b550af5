//! End-to-end tests: reconciliation, frame loop and picking on one session

use crate::prelude::*;
use crate::{Cursor, ManualClock, PointerKind, SubscriptionId};
use arbor_reconciler::{HostConfig, Instance};
use arbor_scene::{HandlerEvent, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type Log = Rc<RefCell<Vec<String>>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn record(log: &Log, entry: &'static str) -> impl Fn(&mut SceneGraph, &HandlerEvent) + 'static {
    let log = Rc::clone(log);
    move |_, _| log.borrow_mut().push(entry.to_string())
}

fn active_root() -> Root {
    init_tracing();
    let mut root = Root::builder(RootConfig::default().with_size(100.0, 100.0)).build();
    root.activate().unwrap();
    root
}

fn cube(name: &str) -> VirtualNode {
    VirtualNode::new("mesh")
        .prop("name", name.to_string())
        .child(VirtualNode::new("boxGeometry"))
}

#[test]
fn test_insert_before_through_session() {
    let mut root = active_root();
    let scene = root.scene();
    let [a, y, c] = ["a", "y", "c"].map(|name| root.render(&cube(name)).unwrap());

    let reconciler = root.reconciler_mut();
    let node = cube("x");
    let x = reconciler
        .create_instance(&node.type_tag, &node.args, &node.props)
        .unwrap();
    reconciler
        .insert_in_container_before(scene, x, y)
        .unwrap();

    let expected: Vec<ObjectId> = [a, x, y, c]
        .into_iter()
        .map(|i| i.as_node().unwrap())
        .collect();
    assert_eq!(root.graph().children(scene), expected.as_slice());
}

#[test]
fn test_hover_sequence_over_three_frames() {
    let mut root = active_root();
    let log = Log::default();
    let a = root
        .render(
            &cube("a")
                .on(HandlerKind::Hover, record(&log, "hover"))
                .on(HandlerKind::Unhover, record(&log, "unhover")),
        )
        .unwrap()
        .as_node()
        .unwrap();

    // Frames 1 and 2: pointer over A
    root.tick();
    root.handle_pointer(PointerEvent::moved(50.0, 50.0));
    assert_eq!(*log.borrow(), vec!["hover"]);
    root.tick();
    root.handle_pointer(PointerEvent::moved(50.0, 50.0));
    assert_eq!(*log.borrow(), vec!["hover"]);

    // Frame 3: pointer away
    root.tick();
    root.handle_pointer(PointerEvent::moved(0.0, 0.0));
    assert_eq!(*log.borrow(), vec!["hover", "unhover"]);
    assert!(!root.picker().is_hovered(a));
}

#[test]
fn test_cursor_sink_written_on_change_only() {
    init_tracing();
    let cursors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&cursors);
    let mut root = Root::builder(RootConfig::default().with_size(100.0, 100.0))
        .cursor_sink(move |cursor: Cursor| sink.borrow_mut().push(cursor))
        .build();
    root.activate().unwrap();
    root.render(&cube("a").on(HandlerKind::Hover, |_, _| {}))
        .unwrap();
    root.render(&cube("b").on(HandlerKind::Click, |_, _| {}))
        .unwrap();

    for event in [
        PointerEvent::moved(50.0, 50.0),
        PointerEvent::moved(51.0, 50.0),
        PointerEvent::moved(0.0, 0.0),
        PointerEvent::moved(1.0, 0.0),
    ] {
        assert_eq!(event.kind, PointerKind::Move);
        root.handle_pointer(event);
    }
    assert_eq!(*cursors.borrow(), vec![Cursor::Pointer, Cursor::Default]);
    assert_eq!(root.cursor(), Cursor::Default);
}

#[test]
fn test_click_fires_once_per_object() {
    use arbor_scene::{Intersection, Ray, SpatialQuery};

    /// Reports the first object under the scene twice
    struct Doubled;
    impl SpatialQuery for Doubled {
        fn intersect(&self, graph: &SceneGraph, root: ObjectId, ray: &Ray) -> Vec<Intersection> {
            let object = graph.children(root)[0];
            let hit = Intersection { object, distance: 1.0, point: ray.at(1.0) };
            vec![hit, Intersection { distance: 2.0, ..hit }]
        }
    }

    let log = Log::default();
    let mut root = Root::builder(RootConfig::default()).query(Doubled).build();
    root.activate().unwrap();
    let b = root
        .render(&cube("b").on(HandlerKind::Click, record(&log, "click")))
        .unwrap()
        .as_node()
        .unwrap();

    let fired = root.handle_pointer(PointerEvent::click(10.0, 10.0));
    assert_eq!(fired, vec![(b, HandlerKind::Click)]);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_geometry_reinstantiation_keeps_picking_in_sync() {
    let mut root = active_root();
    let log = Log::default();

    let old_geometry = VirtualNode::new("boxGeometry").arg(0.1).arg(0.1).arg(0.1);
    let mesh = root
        .render(&VirtualNode::new("mesh").on(HandlerKind::Click, record(&log, "click")))
        .unwrap();
    let reconciler = root.reconciler_mut();
    let geometry = reconciler
        .create_instance(&old_geometry.type_tag, &old_geometry.args, &old_geometry.props)
        .unwrap();
    reconciler.append_child(mesh, geometry).unwrap();

    // A small box at the origin is missed by an off-center click
    assert!(root.handle_pointer(PointerEvent::click(60.0, 50.0)).is_empty());

    let new_geometry = VirtualNode::new("boxGeometry").arg(4.0).arg(4.0).arg(4.0);
    root.reconciler_mut()
        .commit_update(geometry, &old_geometry, &new_geometry)
        .unwrap();
    assert!(matches!(geometry, Instance::Leaf(_)));
    assert_eq!(root.handle_pointer(PointerEvent::click(60.0, 50.0)).len(), 1);
}

#[test]
fn test_position_component_preserves_identity() {
    let mut root = active_root();
    let mesh = root
        .render(&VirtualNode::new("mesh"))
        .unwrap()
        .as_node()
        .unwrap();
    let before = root
        .graph()
        .get(mesh)
        .and_then(|o| o.field("position"))
        .and_then(Value::as_settable)
        .cloned()
        .unwrap();

    let old = VirtualNode::new("mesh");
    let new = VirtualNode::new("mesh").prop("position-x", 3.0);
    root.reconciler_mut()
        .commit_update(Instance::Node(mesh), &old, &new)
        .unwrap();

    let after = root.graph().get(mesh).unwrap();
    assert!(Rc::ptr_eq(after.field("position").unwrap().as_settable().unwrap(), &before));
    assert_eq!(after.position(), Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn test_subscribers_animate_scene() {
    init_tracing();
    let clock = Rc::new(ManualClock::new());
    let mut root = Root::builder(RootConfig::default())
        .clock(Rc::clone(&clock))
        .build();
    let mesh = root
        .render(&VirtualNode::new("mesh"))
        .unwrap()
        .as_node()
        .unwrap();

    let spin: SubscriptionId = root.subscribe(move |state| {
        let delta = state.delta_secs();
        if let Some(object) = state.graph.get(mesh) {
            let x = object.position().x + delta;
            if let Some(Value::Settable(position)) = object.field("position") {
                let _ = position.borrow_mut().set_component("x", &Value::from(x));
            }
        }
    });

    root.activate().unwrap();
    for _ in 0..4 {
        clock.advance(Duration::from_millis(250));
        root.tick();
    }
    assert!((root.graph().get(mesh).unwrap().position().x - 1.0).abs() < 1e-5);

    assert!(root.unsubscribe(spin));
    clock.advance(Duration::from_millis(250));
    root.tick();
    assert!((root.graph().get(mesh).unwrap().position().x - 1.0).abs() < 1e-5);
}

#[test]
fn test_deactivated_tick_does_nothing() {
    init_tracing();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let c = Rc::clone(&calls);
    let mut root = Root::builder(RootConfig::default())
        .scheduler(move || c.borrow_mut().push("schedule"))
        .build();
    let c = Rc::clone(&calls);
    root.set_frame_hook(move |_| c.borrow_mut().push("hook"));
    let c = Rc::clone(&calls);
    root.subscribe(move |_| c.borrow_mut().push("subscriber"));
    let c = Rc::clone(&calls);
    root.set_draw(move |_| c.borrow_mut().push("draw"));

    root.activate().unwrap();
    root.tick();
    assert_eq!(
        *calls.borrow(),
        vec!["schedule", "schedule", "hook", "subscriber", "draw"]
    );

    root.deactivate();
    calls.borrow_mut().clear();
    assert!(!root.tick());
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_deferred_tasks_run_after_draw_unless_cancelled() {
    let mut root = active_root();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let c = Rc::clone(&calls);
    root.set_draw(move |_| c.borrow_mut().push("draw"));
    let c = Rc::clone(&calls);
    root.defer(move |_| c.borrow_mut().push("task"));
    let c = Rc::clone(&calls);
    let cancelled = root.defer(move |_| c.borrow_mut().push("cancelled"));
    assert!(root.cancel(cancelled));

    root.tick();
    assert_eq!(*calls.borrow(), vec!["draw", "task"]);
    root.tick();
    assert_eq!(*calls.borrow(), vec!["draw", "task", "draw"]);
}

#[test]
fn test_removed_node_stops_receiving_events() {
    let mut root = active_root();
    let scene = root.scene();
    let log = Log::default();
    let mesh = root
        .render(
            &cube("gone")
                .on(HandlerKind::Hover, record(&log, "hover"))
                .on(HandlerKind::Unhover, record(&log, "unhover")),
        )
        .unwrap();
    root.handle_pointer(PointerEvent::moved(50.0, 50.0));

    root.reconciler_mut()
        .remove_child_from_container(scene, mesh)
        .unwrap();
    root.handle_pointer(PointerEvent::moved(50.0, 50.0));
    root.handle_pointer(PointerEvent::click(50.0, 50.0));

    assert_eq!(*log.borrow(), vec!["hover"]);
    assert_eq!(root.graph().len(), 1);
}

#[test]
fn test_config_from_toml_builds_session() {
    let config = RootConfig::from_toml_str(
        r#"
        width = 200
        height = 100

        [camera]
        fov = 60
        "#,
    )
    .unwrap();
    let root = Root::builder(config).build();
    assert_eq!(root.size(), Size::new(200.0, 100.0));
    assert_eq!(root.camera().aspect, 2.0);
    assert_eq!(root.camera().fov, 60.0);
}
