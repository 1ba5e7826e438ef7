//
// Copyright 2022-Present (c) Raja Lehtihet & Wael El Oraiby
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
// may be used to endorse or promote products derived from this software without
// specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
// LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
// CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
// SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
// INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
// CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
// ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.
//
//! Top-level windows: a root container plus layering, lifecycle requests, blocking and dimming
//! flags, listener hooks and drag-to-move with edge locking.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use super::*;
use crate::error::guarded;
use crate::input::offer_key;
use crate::render_cache::RenderPass;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Activity {
    Open,
    Closed,
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct Requests : u32 {
        const DISPOSE = 4;
        const CLOSE = 2;
        const OPEN = 1;
        const NONE = 0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Screen edge a window is locked to while being dragged.
pub enum Side {
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

/// Lifecycle notifications for a window. All hooks default to doing nothing.
///
/// Hooks run while the manager holds its lock; they must not call back into the manager. Use
/// [`Window::open`], [`Window::close`] and [`Window::dispose`] to request transitions instead.
pub trait WindowListener: Send {
    /// The window was added to a manager.
    fn added(&mut self, _window: &mut Window) -> HandlerResult { Ok(()) }
    /// The window was removed from its manager.
    fn removed(&mut self, _window: &mut Window) -> HandlerResult { Ok(()) }
    /// The window is being opened.
    fn opening(&mut self, _window: &mut Window) -> HandlerResult { Ok(()) }
    /// The window is being closed.
    fn closing(&mut self, _window: &mut Window) -> HandlerResult { Ok(()) }
    /// The window is being disposed.
    fn disposed(&mut self, _window: &mut Window) -> HandlerResult { Ok(()) }
    /// The window became the active window.
    fn gained_focus(&mut self, _window: &mut Window) -> HandlerResult { Ok(()) }
    /// The window stopped being the active window.
    fn lost_focus(&mut self, _window: &mut Window) -> HandlerResult { Ok(()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Hook {
    Added,
    Removed,
    Opening,
    Closing,
    Disposed,
    GainedFocus,
    LostFocus,
}

impl Hook {
    fn name(self) -> &'static str {
        match self {
            Hook::Added => "added",
            Hook::Removed => "removed",
            Hook::Opening => "opening",
            Hook::Closing => "closing",
            Hook::Disposed => "disposed",
            Hook::GainedFocus => "gained-focus",
            Hook::LostFocus => "lost-focus",
        }
    }
}

/// A top-level container managed by a [`WindowManager`].
pub struct Window {
    root: Component,
    activity: Activity,
    requests: Requests,
    layer: usize,
    closeable: bool,
    blocking: bool,
    dimming: bool,
    movable: bool,
    side_lock: Option<Side>,
    grab: Option<Vec2i>,
    moved: Option<Vec2i>,
    viewport: Dimensioni,
    pub(crate) opened_while_blocked: bool,
    touch_origin: Option<Id>,
    listener: Option<Box<dyn WindowListener>>,
    key_receiver: Option<Box<dyn GlobalKeyReceiver>>,
}

impl Window {
    /// Creates a closed window whose root container is named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            root: Component::container(name),
            activity: Activity::Closed,
            requests: Requests::NONE,
            layer: 0,
            closeable: true,
            blocking: false,
            dimming: false,
            movable: false,
            side_lock: None,
            grab: None,
            moved: None,
            viewport: dim(0, 0),
            opened_while_blocked: false,
            touch_origin: None,
            listener: None,
            key_receiver: None,
        }
    }

    /// Fixed placement in screen coordinates.
    pub fn with_rect(mut self, r: Recti) -> Self {
        self.root = self.root.with_rect(r);
        self
    }

    /// Placement rules resolved against the viewport.
    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.root = self.root.with_layout(layout);
        self
    }

    /// Skin painted behind the children.
    pub fn with_skin(mut self, skin: impl Paintable + 'static) -> Self {
        self.root = self.root.with_skin(skin);
        self
    }

    /// Receiver for events no child consumes.
    pub fn with_receiver(mut self, receiver: impl InputReceiver + 'static) -> Self {
        self.root = self.root.with_receiver(receiver);
        self
    }

    /// Lifecycle listener.
    pub fn with_listener(mut self, listener: impl WindowListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Manager-wide key receiver, invoked before per-window key routing while the window is open.
    pub fn with_key_receiver(mut self, receiver: impl GlobalKeyReceiver + 'static) -> Self {
        self.key_receiver = Some(Box::new(receiver));
        self
    }

    /// Whether the window may be closed by the user.
    pub fn closeable(mut self, closeable: bool) -> Self {
        self.closeable = closeable;
        self
    }

    /// Whether the window blocks input to the windows beneath it while active.
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Whether a translucent layer is painted behind the window while active.
    pub fn dimming(mut self, dimming: bool) -> Self {
        self.dimming = dimming;
        self
    }

    /// Whether the window can be dragged around.
    pub fn movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    /// Applies the record for this window under `parent`, if any.
    pub fn configure(mut self, provider: &dyn ConfigProvider, parent: &str) -> Self {
        self.root = self.root.configure(provider, parent);
        self.apply_window_keys();
        self
    }

    fn apply_window_keys(&mut self) {
        let Some(record) = self.root.state().config().cloned() else { return };
        self.closeable = record.bool_or("closeable", self.closeable);
        self.blocking = record.bool_or("blocking", self.blocking);
        self.dimming = record.bool_or("dimming", self.dimming);
        self.movable = record.bool_or("movable", self.movable);
    }

    pub(crate) fn refresh(&mut self, provider: &dyn ConfigProvider) {
        self.root.refresh(provider);
        self.apply_window_keys();
    }

    /// Identity (shared with the root container).
    pub fn id(&self) -> Id { self.root.id() }
    /// Name of the root container.
    pub fn name(&self) -> &str { self.root.name() }
    /// Rectangle in screen coordinates.
    pub fn rect(&self) -> Recti { self.root.rect() }
    /// Root container.
    pub fn root(&self) -> &Component { &self.root }
    /// Root container, mutably.
    pub fn root_mut(&mut self) -> &mut Component { &mut self.root }
    /// Layer index; `0` is the top-most window.
    pub fn layer(&self) -> usize { self.layer }
    pub(crate) fn set_layer(&mut self, layer: usize) { self.layer = layer; }
    /// Returns `true` while the window is open.
    pub fn is_enabled(&self) -> bool { self.activity == Activity::Open }
    /// Hidden windows are open but neither drawn nor hit.
    pub fn is_hidden(&self) -> bool { self.root.is_hidden() }
    /// Hides or shows the window.
    pub fn set_hidden(&mut self, hidden: bool) { self.root.set_hidden(hidden); }
    /// Returns `true` if the user may close the window.
    pub fn is_closeable(&self) -> bool { self.closeable }
    /// Returns `true` if the window blocks the windows beneath it.
    pub fn is_blocking(&self) -> bool { self.blocking }
    /// Returns `true` if a dim layer is painted behind the window.
    pub fn is_dimming(&self) -> bool { self.dimming }
    /// Returns `true` if the window can be dragged.
    pub fn is_movable(&self) -> bool { self.movable }
    /// Edge the window is locked to, if any.
    pub fn side_lock(&self) -> Option<Side> { self.side_lock }
    /// Returns `true` while the window is being dragged.
    pub fn is_moving(&self) -> bool { self.grab.is_some() }
    /// Returns `true` if the window has a manager-wide key receiver.
    pub fn has_key_receiver(&self) -> bool { self.key_receiver.is_some() }
    /// Returns `true` if the window was opened while another window blocked input.
    pub fn opened_while_blocked(&self) -> bool { self.opened_while_blocked }

    /// Requests the window to open at the next render pass.
    pub fn open(&mut self) {
        self.requests.remove(Requests::CLOSE);
        self.requests.insert(Requests::OPEN);
    }

    /// Requests the window to close at the next render pass.
    pub fn close(&mut self) { self.requests.insert(Requests::CLOSE); }

    /// Requests the window to close and be removed at the next render pass.
    pub fn dispose(&mut self) { self.requests.insert(Requests::CLOSE | Requests::DISPOSE); }

    pub(crate) fn wants_open(&self) -> bool { self.requests.contains(Requests::OPEN) }
    pub(crate) fn wants_close(&self) -> bool { self.requests.contains(Requests::CLOSE) }
    pub(crate) fn wants_dispose(&self) -> bool { self.requests.contains(Requests::DISPOSE) }

    /// Applies a pending close. Returns `true` if the window was open. Close wins over an open
    /// requested in the same frame.
    pub(crate) fn apply_close(&mut self) -> bool {
        self.requests.remove(Requests::CLOSE | Requests::OPEN);
        self.grab = None;
        self.side_lock = None;
        self.opened_while_blocked = false;
        if self.activity == Activity::Open {
            self.activity = Activity::Closed;
            self.root.on_exit();
            self.notify(Hook::Closing);
            log::debug!("window {} closed", self.name());
            true
        } else {
            false
        }
    }

    pub(crate) fn apply_open(&mut self, viewport: Dimensioni, while_blocked: bool) {
        self.requests.remove(Requests::OPEN);
        if self.activity == Activity::Open {
            return;
        }
        self.activity = Activity::Open;
        self.opened_while_blocked = while_blocked;
        self.resize(viewport);
        self.notify(Hook::Opening);
        log::debug!("window {} opened", self.name());
    }

    pub(crate) fn set_manager(&mut self, manager: Option<ManagerRef>) { self.root.set_manager(manager); }

    /// Lays the window out against the viewport, keeping a position the user dragged it to.
    pub fn resize(&mut self, viewport: Dimensioni) {
        self.viewport = viewport;
        self.root.resize(viewport);
        if !self.root.state().has_pending_resize() {
            self.restore_position();
        }
    }

    fn restore_position(&mut self) {
        if let Some(p) = self.moved {
            let size = self.root.state().size();
            let x = p.x.clamp(0, (self.viewport.width - size.width).max(0));
            let y = p.y.clamp(0, (self.viewport.height - size.height).max(0));
            self.root.state_mut().set_position(x, y);
        }
    }

    /// Returns `true` if the screen point lies inside the window.
    pub fn contains(&self, x: i32, y: i32) -> bool { rect_contains(&self.root.rect(), x, y) }

    pub(crate) fn notify(&mut self, hook: Hook) {
        let Some(mut listener) = self.listener.take() else { return };
        let name = self.name().to_string();
        guarded(&name, hook.name(), || match hook {
            Hook::Added => listener.added(self),
            Hook::Removed => listener.removed(self),
            Hook::Opening => listener.opening(self),
            Hook::Closing => listener.closing(self),
            Hook::Disposed => listener.disposed(self),
            Hook::GainedFocus => listener.gained_focus(self),
            Hook::LostFocus => listener.lost_focus(self),
        });
        if self.listener.is_none() {
            self.listener = Some(listener);
        }
    }

    pub(crate) fn global_key(&mut self, event: &WidgetEvent) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let Some(receiver) = self.key_receiver.as_mut() else { return false };
        offer_key(receiver.as_mut(), self.root.name(), event)
    }

    /// Delivers an event expressed in screen coordinates to the root container.
    pub(crate) fn deliver(&mut self, event: &WidgetEvent, ctx: &mut EventCtx) -> bool {
        let r = self.root.rect();
        let local = event.translated(r.x, r.y);
        let consumed = self.root.handle(&local, ctx);
        if let Some(request) = ctx.window_request.take() {
            match request {
                WindowRequest::Close => self.close(),
                WindowRequest::Dispose => self.dispose(),
            }
        }
        consumed
    }

    /// Starts a touch sequence at a screen point. Returns the component that consumed the
    /// touch-down, if any. An unconsumed touch on a movable window starts a move.
    pub(crate) fn touch_down(&mut self, event: &WidgetEvent) -> Option<Id> {
        let mut ctx = EventCtx::new();
        self.deliver(event, &mut ctx);
        self.touch_origin = ctx.touch_origin;
        if self.touch_origin.is_none() && self.movable {
            if let Some(p) = event.position() {
                let r = self.root.rect();
                self.grab = Some(vec2(p.x - r.x, p.y - r.y));
            }
        }
        self.touch_origin
    }

    /// Delivers a mid-sequence event using the origin recorded at touch-down.
    pub(crate) fn deliver_in_sequence(&mut self, event: &WidgetEvent) -> bool {
        let mut ctx = EventCtx::with_origin(self.touch_origin);
        self.deliver(event, &mut ctx)
    }

    /// Ends the touch sequence.
    pub(crate) fn end_sequence(&mut self) {
        self.touch_origin = None;
        self.grab = None;
        self.root.end_touch();
    }

    /// Returns `true` when the touch origin keeps the pointer for the whole sequence.
    pub(crate) fn origin_captures_pointer(&self) -> bool {
        self.touch_origin.and_then(|o| self.root.find(o)).is_some_and(|c| c.captures_pointer())
    }

    /// Moves a grabbed window so that the grab point follows `pointer` (screen coordinates).
    ///
    /// Crossing a viewport edge locks the window to it; while locked it slides along the edge
    /// and only unlocks when pulled more than `unlock` pixels away from it.
    pub(crate) fn drag_to(&mut self, pointer: Vec2i, unlock: i32) {
        let Some(grab) = self.grab else { return };
        let size = self.root.state().size();
        let vp = self.viewport;
        let max_x = (vp.width - size.width).max(0);
        let max_y = (vp.height - size.height).max(0);
        let mut x = pointer.x - grab.x;
        let mut y = pointer.y - grab.y;

        if let Some(side) = self.side_lock {
            let pull = match side {
                Side::Left => x,
                Side::Right => max_x - x,
                Side::Top => y,
                Side::Bottom => max_y - y,
            };
            if pull > unlock {
                log::trace!("window {} unlocked from {side:?}", self.name());
                self.side_lock = None;
            } else {
                match side {
                    Side::Left => x = 0,
                    Side::Right => x = max_x,
                    Side::Top => y = 0,
                    Side::Bottom => y = max_y,
                }
            }
        }

        if self.side_lock.is_none() {
            let overshoot = [(Side::Left, -x), (Side::Right, x - max_x), (Side::Top, -y), (Side::Bottom, y - max_y)];
            if let Some((side, _)) = overshoot.into_iter().filter(|(_, o)| *o > 0).max_by_key(|(_, o)| *o) {
                log::trace!("window {} locked to {side:?}", self.name());
                self.side_lock = Some(side);
            }
        }

        let x = x.clamp(0, max_x);
        let y = y.clamp(0, max_y);
        let r = self.root.rect();
        if (r.x, r.y) != (x, y) {
            self.root.state_mut().set_position(x, y);
            self.moved = Some(vec2(x, y));
        }
    }

    /// Draws the window at its screen rectangle.
    pub(crate) fn render(&mut self, pass: &mut RenderPass<'_>) {
        if self.root.apply_pending_resize() {
            self.restore_position();
        }
        self.root.render(pass);
    }

    /// Runs the removal hooks (removed, closing, disposed) and releases the whole tree.
    pub(crate) fn teardown(&mut self) {
        self.notify(Hook::Removed);
        self.requests = Requests::NONE;
        self.grab = None;
        self.side_lock = None;
        self.touch_origin = None;
        self.opened_while_blocked = false;
        self.activity = Activity::Closed;
        self.notify(Hook::Closing);
        self.root.on_exit();
        self.root.dispose();
        self.notify(Hook::Disposed);
        self.set_manager(None);
        log::debug!("window {} disposed", self.name());
    }
}

impl ContainerOf<Component> for Window {
    fn add_component(&mut self, child: Component) -> UiResult<Id> { self.root.add_component(child) }
    fn remove_component(&mut self, id: Id) -> bool { self.root.remove_component(id) }
    fn clear_components(&mut self) { self.root.clear_components() }
    fn component_count(&self) -> usize { self.root.component_count() }
}

/// Shared handle to a window. Cloning the handle does not clone the window.
#[derive(Clone)]
pub struct WindowHandle {
    id: Id,
    inner: Arc<Mutex<Window>>,
}

impl WindowHandle {
    /// Wraps `window` in a shareable handle.
    pub fn new(window: Window) -> Self { Self { id: window.id(), inner: Arc::new(Mutex::new(window)) } }

    /// Identity of the window.
    pub fn id(&self) -> Id { self.id }

    /// Locks the window. While a manager uses the handle, take the lock only from outside
    /// manager callbacks.
    pub fn inner(&self) -> MutexGuard<'_, Window> { self.inner.lock() }

    /// Returns `true` while the window is open.
    pub fn is_open(&self) -> bool { self.inner().is_enabled() }

    /// Layer index of the window.
    pub fn layer(&self) -> usize { self.inner().layer() }

    /// Requests the window to open at the next render pass.
    pub fn open(&self) { self.inner().open() }

    /// Requests the window to close at the next render pass.
    pub fn close(&self) { self.inner().close() }

    /// Requests the window to close and be removed at the next render pass.
    pub fn dispose(&self) { self.inner().dispose() }
}

impl From<Window> for WindowHandle {
    fn from(window: Window) -> Self { Self::new(window) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::sync::Mutex as StdMutex;

    fn make_window() -> Window {
        let mut w = Window::new("panel").with_rect(rect(100, 100, 200, 100)).movable(true);
        w.resize(dim(800, 600));
        w.apply_open(dim(800, 600), false);
        w
    }

    fn drag(w: &mut Window, from: (i32, i32), to: (i32, i32)) {
        w.touch_down(&down(from.0, from.1));
        w.drag_to(vec2(to.0, to.1), 24);
    }

    #[test]
    fn unconsumed_touch_moves_movable_windows() {
        let mut w = make_window();
        drag(&mut w, (150, 150), (250, 200));
        assert_eq!((w.rect().x, w.rect().y), (200, 150));
        assert!(w.side_lock().is_none());
        w.end_sequence();
        assert!(!w.is_moving());
    }

    #[test]
    fn consumed_touch_does_not_move() {
        let mut w = make_window();
        w.add_component(Component::new("button").with_rect(rect(0, 0, 50, 50)).with_receiver(recorder(&event_log(), consume_all))).unwrap();
        let origin = w.touch_down(&down(110, 110));
        assert!(origin.is_some());
        assert!(!w.is_moving());
    }

    #[test]
    fn crossing_an_edge_locks_and_pulling_unlocks() {
        let mut w = make_window();
        // grab at (10, 10) inside the window, push it past the left edge
        drag(&mut w, (110, 110), (-30, 200));
        assert_eq!(w.side_lock(), Some(Side::Left));
        assert_eq!((w.rect().x, w.rect().y), (0, 190));
        // sliding along the edge keeps the lock
        w.drag_to(vec2(20, 300), 24);
        assert_eq!(w.side_lock(), Some(Side::Left));
        assert_eq!((w.rect().x, w.rect().y), (0, 290));
        // pulling away by more than the threshold unlocks
        w.drag_to(vec2(60, 300), 24);
        assert_eq!(w.side_lock(), None);
        assert_eq!(w.rect().x, 50);
    }

    #[test]
    fn dragged_position_survives_resize() {
        let mut w = make_window();
        drag(&mut w, (150, 150), (450, 250));
        w.resize(dim(1024, 768));
        assert_eq!((w.rect().x, w.rect().y), (400, 200));
    }

    #[test]
    fn close_wins_over_same_frame_open() {
        let mut w = Window::new("dialog");
        w.open();
        w.close();
        assert!(w.wants_close());
        assert!(!w.apply_close());
        assert!(!w.wants_open());
        assert!(!w.is_enabled());
    }

    struct Hooks(Arc<StdMutex<Vec<&'static str>>>);

    impl WindowListener for Hooks {
        fn opening(&mut self, _w: &mut Window) -> HandlerResult {
            self.0.lock().unwrap().push("opening");
            Ok(())
        }
        fn closing(&mut self, w: &mut Window) -> HandlerResult {
            self.0.lock().unwrap().push("closing");
            assert!(!w.is_enabled());
            Err("listener failure".into())
        }
    }

    #[test]
    fn listener_survives_failures() {
        init_logger();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let mut w = Window::new("dialog").with_listener(Hooks(log.clone()));
        w.apply_open(dim(100, 100), false);
        assert!(w.apply_close());
        w.apply_open(dim(100, 100), false);
        assert_eq!(*log.lock().unwrap(), vec!["opening", "closing", "opening"]);
    }

    #[test]
    fn handlers_can_request_close() {
        let mut w = make_window();
        w.add_component(Component::new("x").with_rect(rect(0, 0, 20, 20)).with_receiver(
            |_: &WidgetEvent, _: &mut ComponentState, ctx: &mut EventCtx| -> HandlerResult<bool> {
                ctx.request_close();
                Ok(true)
            },
        ))
        .unwrap();
        w.touch_down(&down(105, 105));
        assert!(w.wants_close());
        assert!(!w.wants_dispose());
    }
}
