//! Integration tests for tessera.
//!
//! These tests exercise the public API from outside the crate: the resource
//! managers on their own, then widgets, routing and the event loop together
//! through the headless Pilot.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use tokio_test::assert_ok;

use tessera::arena::{ArenaConfig, GeometryArena};
use tessera::atlas::{Atlas, AtlasConfig};
use tessera::depth::DepthResolver;
use tessera::dom::{Dom, NodeData, NodeId};
use tessera::event::{Event, EventName, InputEvent, Key, Modifiers};
use tessera::geometry::{Offset, Region};
use tessera::render::BackendCall;
use tessera::testing::Pilot;
use tessera::widget::{Widget, WidgetExt};
use tessera::widgets::{Button, ImageView, Panel, Popup};
use tessera::{App, AppConfig};

type Log = Rc<RefCell<Vec<String>>>;

fn record(pilot: &mut Pilot, log: &Log, node: NodeId, tag: &str, names: &[EventName]) {
    for &name in names {
        let log = log.clone();
        let entry = format!("{tag}:{name}");
        pilot.screen_mut().on(node, name, move |_, _| log.borrow_mut().push(entry.clone()));
    }
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

// ---------------------------------------------------------------------------
// Resource managers
// ---------------------------------------------------------------------------

#[test]
fn arena_grows_once_for_three_slots() {
    let mut arena = GeometryArena::new(ArenaConfig::default().with_initial_slots(2));
    let slots = arena.alloc(3);
    assert_eq!(slots.len(), 3);
    assert_eq!(arena.grow_count(), 1);
    assert_eq!(arena.capacity(), 4);
    assert_eq!(arena.free_len() + arena.allocated_len(), arena.capacity());
}

#[test]
#[should_panic(expected = "double free")]
fn arena_double_free_aborts() {
    let mut arena = GeometryArena::default();
    let slots = arena.alloc(1);
    arena.dealloc(&slots);
    arena.dealloc(&slots);
}

#[test]
fn atlas_widens_for_oversized_block() {
    let mut atlas = Atlas::new(AtlasConfig::default());
    let pixels = vec![7u8; 200 * 50 * 4];
    let origin = atlas.build(&pixels, 200, 50);
    assert_eq!(origin, Offset::new(0, 0));
    assert_eq!(atlas.grow_count(), 1);
    assert_eq!((atlas.width(), atlas.height()), (256, 128));
    assert_eq!(atlas.free_area() + atlas.placed_area(), 256 * 128);
}

#[test]
fn atlas_reuses_freed_space() {
    let mut atlas = Atlas::new(AtlasConfig::default());
    atlas.build(&vec![2u8; 50 * 8 * 4], 50, 8);
    let block = vec![1u8; 30 * 20 * 4];
    let first = atlas.build(&block, 30, 20);
    atlas.free(first.x, first.y, 30, 20);
    let again = atlas.build(&block, 30, 20);
    assert_eq!(again, first);
}

#[test]
fn depth_defers_until_constraint_resolves() {
    let mut dom = Dom::new();
    let a = dom.insert_root(NodeData::new("A"));
    let b = dom.insert_root(NodeData::new("B"));
    let c = dom.insert_root(NodeData::new("C"));
    let visit = [(c, vec![a]), (a, vec![]), (b, vec![])];

    let mut resolver = DepthResolver::new();
    resolver.begin_pass();
    let first: Vec<Option<usize>> = visit.iter().map(|(n, cs)| resolver.add(*n, cs)).collect();
    assert_eq!(first, vec![None, Some(0), Some(1)]);
    assert!(resolver.is_dirty());

    resolver.begin_pass();
    let second: Vec<Option<usize>> = visit.iter().map(|(n, cs)| resolver.add(*n, cs)).collect();
    assert_eq!(second, vec![Some(2), Some(0), Some(1)]);
    assert!(!resolver.is_dirty());
    assert_eq!(resolver.max_index(), 3);
}

// ---------------------------------------------------------------------------
// Routing through the Pilot
// ---------------------------------------------------------------------------

/// ```text
/// body
///  └─ outer 0,0 100x100
///      └─ inner 10,10 40x40
/// ```
fn nested(pilot: &mut Pilot) -> (Panel, Panel) {
    let body = pilot.screen().body();
    let outer = Panel::new(pilot.screen_mut(), body, Region::new(0, 0, 100, 100));
    let inner = Panel::new(pilot.screen_mut(), outer.id(), Region::new(10, 10, 40, 40));
    pilot.settle();
    (outer, inner)
}

#[test]
fn double_click_then_reset_after_threshold() {
    let mut pilot = Pilot::new(200, 200);
    let (_outer, inner) = nested(&mut pilot);
    let log = Log::default();
    let names = [EventName::Click, EventName::DoubleClick, EventName::TripleClick];
    record(&mut pilot, &log, inner.id(), "inner", &names);

    pilot.tick(100);
    pilot.click(10, 10);
    pilot.tick(5);
    pilot.click(10, 10);
    pilot.tick(40);
    pilot.click(10, 10);
    assert_eq!(take(&log), vec!["inner:click", "inner:doubleclick", "inner:click"]);
}

#[test]
fn three_quick_ups_make_one_tripleclick() {
    let mut pilot = Pilot::new(200, 200);
    let (outer, inner) = nested(&mut pilot);
    let log = Log::default();
    let names = [EventName::Click, EventName::DoubleClick, EventName::TripleClick];
    record(&mut pilot, &log, inner.id(), "inner", &names);
    record(&mut pilot, &log, outer.id(), "outer", &[EventName::Click]);

    for _ in 0..3 {
        pilot.click(20, 20);
    }
    assert_eq!(
        take(&log),
        vec!["inner:click", "outer:click", "inner:doubleclick", "inner:tripleclick"]
    );
}

#[test]
fn stop_bubbling_and_stop_at() {
    let mut pilot = Pilot::new(200, 200);
    let (outer, inner) = nested(&mut pilot);
    let body = pilot.screen().body();
    let log = Log::default();
    record(&mut pilot, &log, outer.id(), "outer", &[EventName::Wheel, EventName::Click]);
    record(&mut pilot, &log, body, "body", &[EventName::Wheel, EventName::Click]);

    let seen = log.clone();
    pilot.screen_mut().on(inner.id(), EventName::Click, move |evt, _| {
        seen.borrow_mut().push("inner:click".into());
        evt.stop_bubbling();
    });
    pilot.click(20, 20);
    assert_eq!(take(&log), vec!["inner:click"]);

    let mut evt = Event::new().with_stop_at(outer.id());
    pilot.screen_mut().trigger(inner.id(), EventName::Wheel, &mut evt);
    assert_eq!(take(&log), vec!["outer:wheel"]);
}

#[test]
fn pointer_capture_follows_the_press() {
    let mut pilot = Pilot::new(200, 200);
    let body = pilot.screen().body();
    let left = Button::new(pilot.screen_mut(), body, Region::new(0, 0, 50, 50));
    let right = Button::new(pilot.screen_mut(), body, Region::new(100, 0, 50, 50));
    let log = Log::default();
    record(&mut pilot, &log, left.id(), "left", &[EventName::MouseUp, EventName::Click]);
    record(&mut pilot, &log, right.id(), "right", &[EventName::MouseUp, EventName::Click]);

    pilot.press(10, 10);
    assert!(left.is_pressed(pilot.screen()));
    pilot.move_to(120, 10);
    pilot.release(120, 10);
    assert_eq!(take(&log), vec!["left:mouseup", "left:click"]);
    assert_eq!(pilot.screen().pressed_node(), None);
}

#[test]
fn tab_walks_buttons_in_tree_order() {
    let mut pilot = Pilot::new(300, 100);
    let body = pilot.screen().body();
    let group = Panel::new(pilot.screen_mut(), body, Region::new(0, 0, 300, 100));
    let a = Button::new(pilot.screen_mut(), group.id(), Region::new(0, 0, 50, 20));
    let b = Button::new(pilot.screen_mut(), group.id(), Region::new(60, 0, 50, 20));
    let c = Button::new(pilot.screen_mut(), body, Region::new(120, 0, 50, 20));

    let mut order = Vec::new();
    for _ in 0..4 {
        pilot.key(Key::Tab, Modifiers::NONE);
        order.push(pilot.screen().focused());
    }
    assert_eq!(order, vec![Some(a.id()), Some(b.id()), Some(c.id()), Some(a.id())]);

    pilot.key(Key::Tab, Modifiers::SHIFT);
    assert_eq!(pilot.screen().focused(), Some(c.id()));
    assert_eq!(pilot.screen().focus_indicator_anchor(), Some(c.id()));
}

#[test]
fn keyboard_refocus_reclaims_indicator_from_popup() {
    let mut pilot = Pilot::new(200, 200);
    let body = pilot.screen().body();
    let button = Button::new(pilot.screen_mut(), body, Region::new(10, 10, 50, 20));
    let popup = Popup::new(pilot.screen_mut(), Region::new(80, 80, 60, 60));

    pilot.key(Key::Tab, Modifiers::NONE);
    assert_eq!(pilot.screen().focus_indicator_anchor(), Some(button.id()));

    popup.open(pilot.screen_mut());
    assert_eq!(pilot.screen().focus_indicator_anchor(), Some(popup.id()));

    pilot.key(Key::Tab, Modifiers::NONE);
    assert_eq!(pilot.screen().focused(), Some(button.id()));
    assert_eq!(pilot.screen().focus_indicator_anchor(), Some(button.id()));
}

#[test]
fn outside_press_dismisses_popup() {
    let mut pilot = Pilot::new(200, 200);
    let popup = Popup::new(pilot.screen_mut(), Region::new(50, 50, 60, 60));
    popup.open(pilot.screen_mut());
    pilot.settle();
    pilot.press(60, 60);
    assert!(popup.is_visible(pilot.screen()));
    pilot.release(60, 60);
    pilot.press(5, 5);
    assert!(!popup.is_visible(pilot.screen()));
}

#[test]
fn deleting_a_subtree_returns_slots_and_atlas_space() {
    let mut pilot = Pilot::new(200, 200);
    let arena_before = pilot.screen().surface().arena().allocated_len();
    let placed_before = pilot.screen().surface().atlas().placed_rects().len();

    let body = pilot.screen().body();
    let panel = Panel::new(pilot.screen_mut(), body, Region::new(0, 0, 100, 100));
    let pixels = vec![9u8; 12 * 12 * 4];
    let image = ImageView::new(pilot.screen_mut(), panel.id(), Region::new(10, 10, 24, 24), &pixels, 12, 12);
    Button::new(pilot.screen_mut(), panel.id(), Region::new(40, 10, 40, 20));
    pilot.settle();
    assert_eq!(pilot.screen().surface().atlas().placed_rects().len(), placed_before + 1);

    panel.delete(pilot.screen_mut());
    assert!(!pilot.screen().dom().contains(image.id()));
    assert_eq!(pilot.screen().surface().arena().allocated_len(), arena_before);
    assert_eq!(pilot.screen().surface().atlas().placed_rects().len(), placed_before);
    let atlas = pilot.screen().surface().atlas();
    assert_eq!(atlas.free_area() + atlas.placed_area(), atlas.size().area());
}

#[test]
fn listener_deleting_itself_mid_dispatch() {
    let mut pilot = Pilot::new(200, 200);
    let (outer, inner) = nested(&mut pilot);
    let log = Log::default();
    record(&mut pilot, &log, outer.id(), "outer", &[EventName::MouseDown]);
    let doomed = inner.id();
    pilot.screen_mut().on(doomed, EventName::MouseDown, move |_, screen| screen.delete(doomed));

    pilot.press(20, 20);
    assert!(!pilot.screen().dom().contains(doomed));
    assert_eq!(take(&log), vec!["outer:mousedown"]);
    pilot.release(20, 20);
    pilot.move_to(30, 30);
    assert_eq!(pilot.screen().pointer_target(), Some(outer.id()));
}

#[test]
fn failed_context_abandons_only_that_frame() {
    let mut pilot = Pilot::new(100, 100);
    pilot.backend_mut().fail_context(true);
    let body = pilot.screen().body();
    Panel::new(pilot.screen_mut(), body, Region::new(0, 0, 10, 10));
    pilot.settle();
    assert_eq!(pilot.backend().draw_count(), 0);

    pilot.backend_mut().fail_context(false);
    pilot.settle();
    assert_eq!(pilot.backend().draw_count(), 1);
    assert_eq!(pilot.backend().calls().last(), Some(&BackendCall::Release));
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_loop_routes_input_and_quits() {
    let mut app = App::headless(AppConfig::default().with_viewport(200, 200));
    let body = app.screen.body();
    let button = Button::new(&mut app.screen, body, Region::new(10, 10, 60, 20));
    let log = Rc::new(RefCell::new(Vec::new()));
    let seen = log.clone();
    button.on_click(&mut app.screen, move |evt, _| seen.borrow_mut().push(evt.from_keyboard));

    let (tx, rx) = mpsc::channel(16);
    assert_ok!(tx.send(InputEvent::press(20, 20)).await);
    assert_ok!(tx.send(InputEvent::release(20, 20)).await);
    assert_ok!(tx.send(InputEvent::key(Key::Enter, Modifiers::NONE)).await);
    assert_ok!(tx.send(InputEvent::Quit).await);

    assert_ok!(app.run(rx).await);
    assert_eq!(*log.borrow(), vec![false, true]);
    assert!(app.backend.draw_count() >= 2);
}
