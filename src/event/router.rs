//! Event routing: bubbling dispatch, pointer tracking and capture, focus.
//!
//! The router is the part of [`Screen`] that turns [`InputEvent`]s into named
//! events on widget nodes. All node references it keeps are plain ids and are
//! checked for liveness before every use, so deleting a widget from inside a
//! listener never leaves the router pointing at freed state.

use super::click::ClickTracker;
use super::focus;
use super::hit;
use super::input::{InputEvent, Key, KeyState, Modifiers, MouseButton};
use super::message::{Event, EventName};
use crate::dom::NodeId;
use crate::geometry::Offset;
use crate::render::CursorKind;
use crate::screen::Screen;

// ---------------------------------------------------------------------------
// PointerState
// ---------------------------------------------------------------------------

/// What the router remembers about the pointer between events.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Node currently under the pointer.
    pub(crate) target: Option<NodeId>,
    /// Node that received the press of each button still held.
    pub(crate) captured: Vec<(MouseButton, NodeId)>,
    pub(crate) press_tick: u64,
    pub(crate) position: Offset,
    /// The pointer has left the window.
    pub(crate) outside: bool,
    pub(crate) cursor: CursorKind,
    /// The cursor changed and the backend has not been told yet.
    pub(crate) cursor_pending: bool,
}

impl PointerState {
    /// Last known pointer position.
    pub fn position(&self) -> Offset {
        self.position
    }

    pub fn is_outside(&self) -> bool {
        self.outside
    }

    pub fn cursor(&self) -> CursorKind {
        self.cursor
    }

    /// The node holding `button`'s capture, live or not.
    fn capture_of(&self, button: MouseButton) -> Option<NodeId> {
        self.captured.iter().find(|(b, _)| *b == button).map(|&(_, id)| id)
    }

    fn capture(&mut self, button: MouseButton, node: NodeId) {
        self.captured.retain(|(b, _)| *b != button);
        self.captured.push((button, node));
    }

    fn release_capture(&mut self, button: MouseButton) -> Option<NodeId> {
        let pos = self.captured.iter().position(|(b, _)| *b == button)?;
        Some(self.captured.swap_remove(pos).1)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl Screen {
    /// Deliver `name` to `node` and bubble it toward the root.
    ///
    /// At each node the listener for `name` runs, if any. The walk ends when a
    /// listener stops bubbling, right after the node named by
    /// [`Event::stop_at`] has been visited, or at the root. Returns the
    /// number of listeners that ran.
    pub fn trigger(&mut self, node: NodeId, name: EventName, evt: &mut Event) -> usize {
        let mut fired = 0;
        let mut current = Some(node);
        while let Some(id) = current {
            if !self.dom.contains(id) {
                break;
            }
            let parent = self.dom.parent(id);
            if let Some(listener) = self.listeners.get(id, name) {
                listener(evt, self);
                fired += 1;
            }
            if evt.is_stopped() || evt.stop_target() == Some(id) {
                break;
            }
            current = parent;
        }
        fired
    }

    /// Deliver `name` to `node` only.
    fn trigger_local(&mut self, node: NodeId, name: EventName, evt: Event) -> usize {
        let mut evt = evt.with_stop_at(node);
        self.trigger(node, name, &mut evt)
    }

    // -----------------------------------------------------------------------
    // Hit-testing
    // -----------------------------------------------------------------------

    /// The node under (x, y), searching from the top of the right layer.
    pub fn hit_test(&self, x: i32, y: i32) -> NodeId {
        self.find_pointer_target(None, x, y).0
    }

    /// The node under (x, y), searching from `previous` when it lives in the
    /// layer being hit.
    ///
    /// The flag is true when the result is `previous` or one of its
    /// descendants.
    pub fn find_pointer_target(&self, previous: Option<NodeId>, x: i32, y: i32) -> (NodeId, bool) {
        let layer = if self.overlay_hit(x, y) { self.overlay() } else { self.body() };
        let previous = previous.filter(|&p| self.dom.contains(p));
        let start = previous.filter(|&p| self.dom.root_of(p) == layer).unwrap_or(layer);
        let hit = hit::hit_from(&self.dom, start, x, y);
        let same_or_child = previous.is_some_and(|p| self.dom.is_same_or_descendant(hit, p));
        (hit, same_or_child)
    }

    /// Whether a visible overlay child contains the point.
    fn overlay_hit(&self, x: i32, y: i32) -> bool {
        self.dom
            .children(self.overlay())
            .iter()
            .any(|&id| self.dom.get(id).is_some_and(|d| d.is_hit(x, y)))
    }

    /// Re-hit-test and fire leave/enter for the change of target.
    fn update_pointer_target(&mut self, x: i32, y: i32) {
        self.pointer.position = Offset::new(x, y);
        let old = self.pointer.target.filter(|&id| self.dom.contains(id));
        let (new, same_or_child) = self.find_pointer_target(old, x, y);

        match old {
            Some(old) if old == new => {}
            Some(old) => {
                let common = self.dom.common_ancestor(old, new);
                if !same_or_child {
                    let mut evt = Event::at(x, y).with_tick(self.tick);
                    if let Some(below) = common.and_then(|c| self.dom.child_toward(c, old)) {
                        evt.stop_at(below);
                    }
                    self.trigger(old, EventName::MouseLeave, &mut evt);
                }
                self.pointer.target = Some(new);
                if common != Some(new) {
                    let mut evt = Event::at(x, y).with_tick(self.tick);
                    if let Some(below) = common.and_then(|c| self.dom.child_toward(c, new)) {
                        evt.stop_at(below);
                    }
                    self.trigger(new, EventName::MouseEnter, &mut evt);
                }
            }
            None => {
                self.pointer.target = Some(new);
                let mut evt = Event::at(x, y).with_tick(self.tick);
                self.trigger(new, EventName::MouseEnter, &mut evt);
            }
        }

        self.refresh_cursor();
    }

    /// Pick the cursor of the hovered node or its nearest ancestor that sets one.
    fn refresh_cursor(&mut self) {
        let cursor = self
            .pointer
            .target
            .filter(|&id| self.dom.contains(id))
            .and_then(|target| {
                std::iter::once(target)
                    .chain(self.dom.ancestors(target))
                    .find_map(|id| self.dom.get(id).and_then(|d| d.cursor))
            })
            .unwrap_or_default();
        if cursor != self.pointer.cursor {
            self.pointer.cursor = cursor;
            self.pointer.cursor_pending = true;
        }
    }

    /// The node under the pointer, if it is still alive.
    pub fn pointer_target(&self) -> Option<NodeId> {
        self.pointer.target.filter(|&id| self.dom.contains(id))
    }

    /// The node holding pointer capture, if the button is still down.
    pub fn pressed_node(&self) -> Option<NodeId> {
        self.pointer.capture_of(MouseButton::Left).filter(|&id| self.dom.contains(id))
    }

    /// Ticks elapsed since the captured press, for hold-to-repeat widgets.
    pub fn held_ticks(&self) -> Option<u64> {
        self.pressed_node().map(|_| self.tick.saturating_sub(self.pointer.press_tick))
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// The focused node, if it is still alive.
    pub fn focused(&self) -> Option<NodeId> {
        self.focus_holder.filter(|&id| self.dom.contains(id))
    }

    /// Move focus to `new`, firing "blur" then "focus".
    ///
    /// Nothing fires when focus does not change, except that a keyboard-driven
    /// change re-fires "focus" on the holder if the focus indicator has been
    /// moved elsewhere in the meantime.
    pub fn change_focus(&mut self, new: Option<NodeId>, from_keyboard: bool) {
        let old = self.focused();
        let new = new.filter(|&id| self.dom.contains(id));
        let mut evt = Event::new().with_tick(self.tick);
        evt.from_keyboard = from_keyboard;

        if old == new {
            if let Some(holder) = new {
                if from_keyboard && self.focus_indicator_anchor() != Some(holder) {
                    self.trigger_local(holder, EventName::Focus, evt);
                }
            }
            return;
        }

        if let Some(old) = old {
            self.trigger_local(old, EventName::Blur, evt.clone());
        }
        self.focus_holder = new;
        if let Some(new) = new {
            self.trigger_local(new, EventName::Focus, evt);
        }
        tracing::debug!(?old, ?new, from_keyboard, "focus changed");
    }

    /// Give focus to `node` as if it had been clicked.
    pub fn focus(&mut self, node: NodeId) {
        self.change_focus(Some(node), false);
    }

    /// Tab traversal from the focus holder (or the top of the body).
    pub fn focus_next(&mut self, reverse: bool) {
        let origin = self.focused().unwrap_or(self.body());
        let next = focus::next_focusable(&self.dom, &self.listeners, origin, reverse);
        // With nowhere else to go, focus stays put (and may be re-announced).
        let target = next.or(self.focused());
        self.change_focus(target, true);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Route one platform input event.
    pub fn handle_input(&mut self, input: &InputEvent) {
        match input {
            InputEvent::PointerMoved { x, y } => self.pointer_moved(*x, *y),
            InputEvent::PointerPressed { button, x, y, modifiers } => {
                self.pointer_pressed(*button, *x, *y, *modifiers)
            }
            InputEvent::PointerReleased { button, x, y, modifiers } => {
                self.pointer_released(*button, *x, *y, *modifiers)
            }
            InputEvent::Wheel { x, y, dx, dy, modifiers } => {
                if !self.pointer.outside {
                    self.update_pointer_target(*x, *y);
                }
                if let Some(target) = self.pointer_target() {
                    let mut evt = Event::at(*x, *y).with_modifiers(*modifiers).with_tick(self.tick);
                    evt.dx = *dx;
                    evt.dy = *dy;
                    self.trigger(target, EventName::Wheel, &mut evt);
                }
            }
            InputEvent::Key { key, state, modifiers } => self.key(*key, *state, *modifiers),
            InputEvent::Text(text) => {
                if let Some(holder) = self.focused() {
                    let mut evt = Event::new().with_tick(self.tick);
                    evt.text = Some(text.clone());
                    evt.from_keyboard = true;
                    self.trigger(holder, EventName::TextInput, &mut evt);
                }
            }
            InputEvent::PointerLeft => self.pointer_left(),
            InputEvent::PointerEntered { x, y } => {
                self.pointer.outside = false;
                self.update_pointer_target(*x, *y);
            }
            InputEvent::WindowFocusLost => {
                if let Some(holder) = self.focused() {
                    self.trigger_local(holder, EventName::Blur, Event::new().with_tick(self.tick));
                }
            }
            InputEvent::WindowFocusGained => {
                if let Some(holder) = self.focused() {
                    self.trigger_local(holder, EventName::Focus, Event::new().with_tick(self.tick));
                }
            }
            InputEvent::Resized { width, height } => self.resize(*width, *height),
            InputEvent::Quit => {}
        }
    }

    /// Advance the animation clock and notify tick listeners.
    ///
    /// Every visible node with a "tick" listener is notified once, in
    /// pre-order, body before overlay. Ticks do not bubble.
    pub fn handle_tick(&mut self, tick: u64) {
        self.tick = tick;
        let mut order = self.dom.walk_with_visibility(self.body());
        order.extend(self.dom.walk_with_visibility(self.overlay()));
        for (id, visible) in order {
            if visible && self.dom.contains(id) && self.listeners.has(id, EventName::Tick) {
                self.trigger_local(id, EventName::Tick, Event::new().with_tick(tick));
            }
        }
    }

    /// The current animation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn pointer_moved(&mut self, x: i32, y: i32) {
        if self.pointer.outside {
            return;
        }
        self.update_pointer_target(x, y);
        let Some(target) = self.pointer_target() else {
            return;
        };
        if let Some(pressed) = self.pressed_node() {
            if pressed != target {
                let mut evt = Event::at(x, y).with_tick(self.tick);
                self.trigger(pressed, EventName::MouseMove, &mut evt);
            }
        }
        if self.dom.contains(target) {
            let mut evt = Event::at(x, y).with_tick(self.tick);
            self.trigger(target, EventName::MouseMove, &mut evt);
        }
    }

    fn pointer_pressed(&mut self, button: MouseButton, x: i32, y: i32, modifiers: Modifiers) {
        self.pointer.outside = false;
        self.dismiss_overlay(x, y);
        self.update_pointer_target(x, y);
        let Some(target) = self.pointer_target() else {
            return;
        };

        self.pointer.capture(button, target);
        if button == MouseButton::Left {
            self.pointer.press_tick = self.tick;
        }
        let mut evt = Event::at(x, y).with_button(button).with_modifiers(modifiers).with_tick(self.tick);
        self.trigger(target, EventName::MouseDown, &mut evt);

        if self.dom.contains(target) {
            let focus_target = focus::focusable_ancestor(&self.dom, &self.listeners, target);
            self.change_focus(focus_target, false);
        }
    }

    fn pointer_released(&mut self, button: MouseButton, x: i32, y: i32, modifiers: Modifiers) {
        if !self.pointer.outside {
            self.update_pointer_target(x, y);
        }
        let base = Event::at(x, y).with_button(button).with_modifiers(modifiers).with_tick(self.tick);

        // Capture: the node that saw the press gets the release, and for the
        // left button the click.
        let captured = self.pointer.release_capture(button).filter(|&id| self.dom.contains(id));
        let Some(target) = captured.or_else(|| self.pointer_target()) else {
            return;
        };
        self.trigger(target, EventName::MouseUp, &mut base.clone());

        if button == MouseButton::Left && self.dom.contains(target) {
            let count = self.clicks.register(Offset::new(x, y), self.tick);
            let listeners = &self.listeners;
            let name = ClickTracker::classify(count, |name| listeners.has(target, name));
            self.trigger(target, name, &mut base.clone());
        }

        if self.pointer.outside {
            self.pointer.target = None;
        }
    }

    fn pointer_left(&mut self) {
        if self.pointer.outside {
            return;
        }
        self.pointer.outside = true;
        if let Some(target) = self.pointer.target.take().filter(|&id| self.dom.contains(id)) {
            let mut evt = Event::at(self.pointer.position.x, self.pointer.position.y).with_tick(self.tick);
            self.trigger(target, EventName::MouseLeave, &mut evt);
        }
        if self.pointer.cursor != CursorKind::Arrow {
            self.pointer.cursor = CursorKind::Arrow;
            self.pointer.cursor_pending = true;
        }
    }

    fn key(&mut self, key: Key, state: KeyState, modifiers: Modifiers) {
        if key == Key::Tab {
            if state != KeyState::Released {
                self.focus_next(modifiers.shift());
            }
            return;
        }
        let Some(holder) = self.focused() else {
            return;
        };
        let evt = Event::keyboard(key, modifiers).with_tick(self.tick);
        match state {
            KeyState::Pressed => {
                self.trigger(holder, EventName::KeyDown, &mut evt.clone());
                if self.dom.contains(holder) {
                    self.trigger(holder, EventName::KeyPress, &mut evt.clone());
                }
            }
            KeyState::Repeat => {
                self.trigger(holder, EventName::KeyPress, &mut evt.clone());
            }
            KeyState::Released => {
                self.trigger(holder, EventName::KeyUp, &mut evt.clone());
            }
        }
    }

    /// Hide every visible overlay child if a press lands outside all of them.
    fn dismiss_overlay(&mut self, x: i32, y: i32) {
        let open: Vec<NodeId> = self
            .dom
            .children(self.overlay())
            .iter()
            .copied()
            .filter(|&id| self.dom.get(id).is_some_and(|d| d.visible))
            .collect();
        if open.is_empty() || self.overlay_hit(x, y) {
            return;
        }
        for id in open {
            self.set_visible(id, false);
        }
    }
}
