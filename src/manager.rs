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
//! The window manager: window stack and layers, focus and blocking, the input pipeline with
//! drag-and-drop, and the per-frame render pass.
//!
//! Input entry points hit-test and update activation synchronously under the manager lock, then
//! queue the event. Delivery to widgets happens on the dispatch side (the dispatch thread, or
//! [`WindowManager::dispatch_pending`] in manual mode). Lifecycle requests made by handlers are
//! applied in [`WindowManager::render`].
//!
//! Lock order is manager state first, then a window. Window listeners and input receivers run
//! with the manager locked and must not call back into it.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::Mutex;

use super::*;
use crate::dispatch::{self, InputKind, Message};
use crate::error::guarded;
use crate::input::offer_key;
use crate::window::Hook;

enum GlobalKey {
    Receiver(Box<dyn GlobalKeyReceiver>),
    Window(WindowHandle),
}

// touch sequence as seen by the dispatch side
struct Touch {
    window: Id,
    origin: Option<Id>,
    start: Vec2i,
    resistance: i32,
    // the origin keeps the pointer until release; moves never turn into drag-and-drop
    captured: bool,
    dragging: Option<DragPayload>,
}

struct ManagerState {
    name: String,
    manager: ManagerRef,
    ctx: UiContext,
    windows: Vec<WindowHandle>,
    active: Option<Id>,
    history: Vec<Id>,
    blocking: Option<Id>,
    hover: Option<Id>,
    pressed: Option<Id>,
    touch: Option<Touch>,
    global_keys: Vec<GlobalKey>,
    cache: RenderCache,
    tooltip: Option<Component>,
    viewport: Dimensioni,
    disposed: bool,
}

impl ManagerState {
    fn handle(&self, id: Id) -> Option<WindowHandle> { self.windows.iter().find(|h| h.id() == id).cloned() }

    /// Windows ordered front to back.
    fn by_layer(&self) -> Vec<WindowHandle> {
        let mut order: Vec<(usize, WindowHandle)> = self.windows.iter().map(|h| (h.layer(), h.clone())).collect();
        order.sort_by_key(|(layer, _)| *layer);
        order.into_iter().map(|(_, h)| h).collect()
    }

    /// Renumbers layers densely: enabled windows first, each group keeping its relative order.
    fn compact(&mut self) {
        let mut order: Vec<(bool, usize, WindowHandle)> = self
            .windows
            .iter()
            .map(|h| {
                let w = h.inner();
                (w.is_enabled(), w.layer(), h.clone())
            })
            .collect();
        order.sort_by_key(|(enabled, layer, _)| (!*enabled, *layer));
        for (index, (_, _, h)) in order.iter().enumerate() {
            h.inner().set_layer(index);
        }
    }

    fn eligible(&self, w: &Window) -> bool {
        match self.blocking {
            None => true,
            Some(blocker) => blocker == w.id() || w.opened_while_blocked(),
        }
    }

    fn hit_test(&self, x: i32, y: i32) -> Option<Id> {
        for h in self.by_layer() {
            let w = h.inner();
            if w.is_enabled() && !w.is_hidden() && w.contains(x, y) && self.eligible(&w) {
                return Some(w.id());
            }
        }
        None
    }

    fn notify(&self, id: Id, hook: Hook) {
        if let Some(h) = self.handle(id) {
            h.inner().notify(hook);
        }
    }

    fn remember(&mut self, id: Id) {
        self.history.retain(|h| *h != id);
        self.history.push(id);
    }

    fn clear_active(&mut self) {
        if let Some(prev) = self.active.take() {
            self.notify(prev, Hook::LostFocus);
            self.remember(prev);
            log::debug!("{}: no active window", self.name);
        }
    }

    fn set_active(&mut self, target: Option<Id>) -> UiResult<()> {
        let Some(id) = target else {
            self.clear_active();
            return Ok(());
        };
        let handle = self.handle(id).ok_or(UiError::UnknownWindow(id))?;
        let (blocking, opened_while_blocked, layer) = {
            let w = handle.inner();
            if !w.is_enabled() {
                return Err(UiError::WindowNotEnabled(id));
            }
            (w.is_blocking(), w.opened_while_blocked(), w.layer())
        };
        if self.active == Some(id) {
            return Ok(());
        }
        for h in self.windows.iter().filter(|h| h.id() != id) {
            let mut w = h.inner();
            let l = w.layer();
            if l < layer {
                w.set_layer(l + 1);
            }
        }
        handle.inner().set_layer(0);
        self.compact();

        if let Some(prev) = self.active.replace(id) {
            self.notify(prev, Hook::LostFocus);
            self.remember(prev);
        }
        self.history.retain(|h| *h != id);
        if blocking {
            self.blocking = Some(id);
        } else if self.blocking.is_some() && !opened_while_blocked {
            log::debug!("{}: activating {id} lifts the input block", self.name);
            self.blocking = None;
        }
        handle.inner().notify(Hook::GainedFocus);
        log::debug!("{}: window {id} is active", self.name);
        Ok(())
    }

    /// Drops every reference the manager holds to `id` apart from the window list. Returns
    /// `true` if the window was active.
    fn release(&mut self, id: Id) -> bool {
        let was_active = self.active == Some(id);
        if was_active {
            self.active = None;
            self.notify(id, Hook::LostFocus);
        }
        if self.blocking == Some(id) {
            log::debug!("{}: blocking window {id} went away", self.name);
            self.blocking = None;
        }
        if self.hover == Some(id) {
            self.hover = None;
        }
        if self.pressed == Some(id) {
            self.pressed = None;
        }
        if self.touch.as_ref().is_some_and(|t| t.window == id) {
            self.touch = None;
        }
        self.history.retain(|h| *h != id);
        was_active
    }

    fn restore_focus(&mut self) {
        while let Some(prev) = self.history.pop() {
            if self.handle(prev).is_some_and(|h| h.is_open()) && self.set_active(Some(prev)).is_ok() {
                return;
            }
        }
    }

    fn remove(&mut self, id: Id) -> UiResult<WindowHandle> {
        let index = self.windows.iter().position(|h| h.id() == id).ok_or(UiError::UnknownWindow(id))?;
        let was_active = self.release(id);
        let handle = self.windows.remove(index);
        self.global_keys.retain(|g| !matches!(g, GlobalKey::Window(h) if h.id() == id));
        handle.inner().teardown();
        self.compact();
        if was_active {
            self.restore_focus();
        }
        Ok(handle)
    }

    fn resize(&mut self, viewport: Dimensioni) {
        log::debug!("{}: viewport {}x{}", self.name, viewport.width, viewport.height);
        self.viewport = viewport;
        for h in &self.windows {
            let mut w = h.inner();
            if w.is_enabled() {
                w.resize(viewport);
            }
        }
        if let Some(tip) = self.tooltip.as_mut() {
            tip.resize(viewport);
        }
    }

    /// Applies close, dispose and open requests, in that order.
    fn apply_requests(&mut self) {
        let handles = self.windows.clone();
        let mut disposals = Vec::new();
        for h in &handles {
            let (close, dispose) = {
                let w = h.inner();
                (w.wants_close(), w.wants_dispose())
            };
            if dispose {
                disposals.push(h.id());
            } else if close {
                let was_active = self.release(h.id());
                h.inner().apply_close();
                if was_active {
                    self.restore_focus();
                }
            }
        }
        for id in disposals {
            if let Err(err) = self.remove(id) {
                log::warn!("{}: {err}", self.name);
            }
        }
        self.compact();

        for h in &self.windows.clone() {
            if !h.inner().wants_open() {
                continue;
            }
            let blocked = self.blocking.is_some();
            h.inner().apply_open(self.viewport, blocked);
            if let Err(err) = self.set_active(Some(h.id())) {
                log::warn!("{}: cannot activate opened window: {err}", self.name);
            }
        }
    }

    fn paint(&mut self, gfx: &mut dyn GraphicsContext) {
        let order = self.by_layer();
        let active = self.active.and_then(|id| self.handle(id));
        let atlas = self.ctx.atlas().clone();
        let dim_color = self.ctx.settings().dim_color;
        let viewport = self.viewport;
        let Self { cache, tooltip, .. } = self;

        let mut pass = RenderPass::new(gfx, cache, &*atlas);
        for h in order.iter().rev() {
            if active.as_ref().is_some_and(|a| a.id() == h.id()) {
                continue;
            }
            paint_window(&mut pass, h);
        }
        if let Some(h) = &active {
            let dims = {
                let w = h.inner();
                w.is_enabled() && !w.is_hidden() && w.is_dimming()
            };
            if dims {
                pass.fill(rect(0, 0, viewport.width, viewport.height), dim_color);
            }
            paint_window(&mut pass, h);
        }
        if let Some(tip) = tooltip.as_mut() {
            let depth = pass.cache.depth();
            let name = tip.name().to_string();
            guarded(&name, "render", || {
                tip.render(&mut pass);
                Ok(())
            });
            pass.unwind_to(depth);
        }
    }

    fn dispatch(&mut self, event: InputEvent) {
        if self.disposed {
            return;
        }
        let (x, y) = (event.x, event.y);
        match event.kind {
            InputKind::TouchDown { pointer, button } => {
                let Some(h) = event.target.and_then(|id| self.handle(id)) else { return };
                let mut w = h.inner();
                let origin = w.touch_down(&WidgetEvent::TouchDown { x, y, pointer, button });
                let captured = w.origin_captures_pointer();
                let resistance = if captured { 0 } else { origin.and_then(|o| w.root().find(o)).map(|c| c.state().drag_resistance()).unwrap_or(0) };
                self.touch = Some(Touch { window: h.id(), origin, start: vec2(x, y), resistance, captured, dragging: None });
            }
            InputKind::TouchDragged { pointer } => self.touch_dragged(event, pointer),
            InputKind::TouchUp { pointer, button } => self.touch_up(x, y, pointer, button),
            InputKind::MouseMoved => {
                self.hover_to(event.target);
                if let Some(h) = event.target.and_then(|id| self.handle(id)) {
                    h.inner().deliver(&WidgetEvent::MouseMoved { x, y }, &mut EventCtx::new());
                }
            }
            InputKind::Scrolled { dx, dy } => {
                if let Some(h) = event.target.and_then(|id| self.handle(id)) {
                    h.inner().deliver(&WidgetEvent::Scrolled { x, y, dx, dy }, &mut EventCtx::new());
                }
            }
            InputKind::KeyDown(key) => self.key(event.target, WidgetEvent::KeyDown(key)),
            InputKind::KeyUp(key) => self.key(event.target, WidgetEvent::KeyUp(key)),
            InputKind::KeyTyped(ch) => self.key(event.target, WidgetEvent::KeyTyped(ch)),
        }
    }

    fn touch_dragged(&mut self, event: InputEvent, pointer: i32) {
        let (x, y) = (event.x, event.y);
        if self.touch.is_none() {
            if let Some(h) = event.target.and_then(|id| self.handle(id)) {
                h.inner().deliver(&WidgetEvent::MouseMoved { x, y }, &mut EventCtx::new());
            }
            return;
        }
        let unlock = self.ctx.settings().unlock_threshold;
        let Some(touch) = self.touch.as_mut() else { return };
        let Some(h) = self.windows.iter().find(|h| h.id() == touch.window).cloned() else { return };
        let mut w = h.inner();
        if w.is_moving() {
            w.drag_to(vec2(x, y), unlock);
            return;
        }
        if touch.captured {
            w.deliver_in_sequence(&WidgetEvent::TouchDragged { x, y, pointer });
            return;
        }
        if let (None, Some(source)) = (touch.dragging, touch.origin) {
            let (dx, dy) = (x - touch.start.x, y - touch.start.y);
            let r = touch.resistance;
            if r > 0 && dx * dx + dy * dy >= r * r {
                log::trace!("{}: {source} is being dragged", self.name);
                touch.dragging = Some(DragPayload { source, window: touch.window });
            }
        }
        let widget_event = match touch.dragging {
            Some(_) => WidgetEvent::TouchDragged { x, y, pointer },
            None => WidgetEvent::MouseMoved { x, y },
        };
        w.deliver_in_sequence(&widget_event);
    }

    fn touch_up(&mut self, x: i32, y: i32, pointer: i32, button: MouseButton) {
        let Some(touch) = self.touch.take() else { return };
        let Some(source_window) = self.handle(touch.window) else { return };
        match touch.dragging {
            Some(payload) => {
                if let Some(target) = self.hit_test(x, y).and_then(|id| self.handle(id)) {
                    target.inner().deliver(&WidgetEvent::Drop { x, y, payload }, &mut EventCtx::new());
                }
                let mut w = source_window.inner();
                w.deliver_in_sequence(&WidgetEvent::DragRelease { x, y, payload });
                w.end_sequence();
            }
            None => {
                let mut w = source_window.inner();
                w.deliver_in_sequence(&WidgetEvent::TouchUp { x, y, pointer, button });
                w.end_sequence();
            }
        }
    }

    fn hover_to(&mut self, target: Option<Id>) {
        if self.hover == target {
            return;
        }
        if let Some(prev) = self.hover.and_then(|id| self.handle(id)) {
            prev.inner().root_mut().on_exit();
        }
        if let Some(next) = target.and_then(|id| self.handle(id)) {
            next.inner().root_mut().on_enter();
        }
        self.hover = target;
    }

    fn key(&mut self, target: Option<Id>, event: WidgetEvent) {
        for g in &mut self.global_keys {
            let consumed = match g {
                GlobalKey::Receiver(r) => offer_key(r.as_mut(), &self.name, &event),
                GlobalKey::Window(h) => h.inner().global_key(&event),
            };
            if consumed {
                return;
            }
        }
        if let Some(h) = target.and_then(|id| self.handle(id)) {
            h.inner().deliver(&event, &mut EventCtx::new());
        }
    }
}

fn paint_window(pass: &mut RenderPass<'_>, handle: &WindowHandle) {
    let mut w = handle.inner();
    if !w.is_enabled() || w.is_hidden() {
        return;
    }
    let depth = pass.cache.depth();
    let name = w.name().to_string();
    guarded(&name, "render", || {
        w.render(pass);
        Ok(())
    });
    pass.unwind_to(depth);
}

struct Shared {
    id: Id,
    mode: DispatchMode,
    state: Arc<Mutex<ManagerState>>,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    worker: Option<JoinHandle<()>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == std::thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                log::error!("window manager {}: dispatch thread panicked", self.id);
            }
        }
    }
}

/// Owns the windows of one UI surface. Cloning yields another handle to the same manager; the
/// dispatch thread stops when the last handle is dropped.
#[derive(Clone)]
pub struct WindowManager {
    shared: Arc<Shared>,
}

impl WindowManager {
    /// Creates a manager. In threaded mode this starts the dispatch thread.
    pub fn new(ctx: UiContext) -> UiResult<Self> {
        let id = Id::next();
        let name = format!("window-manager-{}", id.raw());
        let settings = ctx.settings().clone();
        let state = Arc::new(Mutex::new(ManagerState {
            name: name.clone(),
            manager: ManagerRef::new(id, ctx.graphics_thread(), settings.drag_resistance),
            cache: RenderCache::new(ctx.graphics_thread()),
            windows: Vec::new(),
            active: None,
            history: Vec::new(),
            blocking: None,
            hover: None,
            pressed: None,
            touch: None,
            global_keys: Vec::new(),
            tooltip: None,
            viewport: settings.viewport,
            disposed: false,
            ctx,
        }));
        let (tx, rx) = unbounded();
        let worker = match settings.dispatch {
            DispatchMode::Threaded => {
                let state = state.clone();
                Some(dispatch::spawn_worker(format!("{name}-dispatch"), rx.clone(), move |event| state.lock().dispatch(event))?)
            }
            DispatchMode::Manual => None,
        };
        log::debug!("{name}: created ({:?} dispatch)", settings.dispatch);
        Ok(Self { shared: Arc::new(Shared { id, mode: settings.dispatch, state, tx, rx, worker }) })
    }

    /// Identity of the manager.
    pub fn id(&self) -> Id { self.shared.id }

    fn enqueue(&self, kind: InputKind, target: Option<Id>, x: i32, y: i32) {
        if self.shared.tx.send(Message::Input(InputEvent { kind, target, x, y })).is_err() {
            log::warn!("window manager {}: input queue is closed", self.shared.id);
        }
    }

    /// Adds a closed window at the bottom of the stack and runs its `added` hook.
    pub fn add_window(&self, window: impl Into<WindowHandle>) -> UiResult<WindowHandle> {
        let handle = window.into();
        let mut st = self.shared.state.lock();
        if st.disposed {
            return Err(UiError::Disposed);
        }
        if st.handle(handle.id()).is_some() {
            return Err(UiError::DuplicateWindow(handle.id()));
        }
        {
            let mut w = handle.inner();
            w.set_manager(Some(st.manager.clone()));
            w.set_layer(st.windows.len());
        }
        st.windows.push(handle.clone());
        if handle.inner().has_key_receiver() {
            st.global_keys.push(GlobalKey::Window(handle.clone()));
        }
        handle.inner().notify(Hook::Added);
        st.compact();
        log::debug!("{}: added window {}", st.name, handle.id());
        Ok(handle)
    }

    /// Removes a window immediately, running its removed, closing and disposed hooks.
    pub fn remove_window(&self, id: Id) -> UiResult<()> {
        let mut st = self.shared.state.lock();
        st.remove(id).map(|_| ())
    }

    /// Makes `id` the active window (layer 0), or clears the active window for `None`.
    pub fn set_active_window(&self, id: Option<Id>) -> UiResult<()> { self.shared.state.lock().set_active(id) }

    /// The active window, if any.
    pub fn active_window(&self) -> Option<Id> { self.shared.state.lock().active }

    /// Handle of a managed window.
    pub fn window(&self, id: Id) -> Option<WindowHandle> { self.shared.state.lock().handle(id) }

    /// Every managed window with its layer, front to back.
    pub fn layers(&self) -> Vec<(Id, usize)> {
        let st = self.shared.state.lock();
        st.by_layer().iter().map(|h| (h.id(), h.layer())).collect()
    }

    /// Front-most enabled, visible, eligible window containing the screen point.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<Id> { self.shared.state.lock().hit_test(x, y) }

    /// Returns `true` while a blocking window holds back input to the windows beneath it.
    pub fn is_blocked(&self) -> bool { self.shared.state.lock().blocking.is_some() }

    /// Current viewport.
    pub fn viewport(&self) -> Dimensioni { self.shared.state.lock().viewport }

    /// Lays every open window (and the tooltip) out against a new viewport.
    pub fn resize(&self, viewport: Dimensioni) { self.shared.state.lock().resize(viewport); }

    /// Re-reads the configuration of every window tree and lays the open ones out again.
    pub fn refresh(&self) {
        let st = self.shared.state.lock();
        let config = st.ctx.config().clone();
        for h in &st.windows {
            let mut w = h.inner();
            w.refresh(&*config);
            if w.is_enabled() {
                w.resize(st.viewport);
            }
        }
    }

    /// Installs a manager-wide key receiver, offered keys before the active window.
    pub fn add_global_key_receiver(&self, receiver: impl GlobalKeyReceiver + 'static) {
        self.shared.state.lock().global_keys.push(GlobalKey::Receiver(Box::new(receiver)));
    }

    /// Replaces the tooltip overlay, painted above every window. The component is laid out
    /// against the viewport.
    pub fn set_tooltip(&self, tooltip: Option<Component>) {
        let mut st = self.shared.state.lock();
        if let Some(mut old) = st.tooltip.take() {
            old.dispose();
        }
        if let Some(mut tip) = tooltip {
            tip.set_manager(Some(st.manager.clone()));
            tip.resize(st.viewport);
            st.tooltip = Some(tip);
        }
    }

    /// Runs one frame: applies lifecycle requests and paints every window back to front.
    /// Must be called on the graphics thread.
    pub fn render(&self, gfx: &mut dyn GraphicsContext) -> UiResult<()> {
        let mut st = self.shared.state.lock();
        if st.disposed {
            return Err(UiError::Disposed);
        }
        st.cache.check_thread()?;
        if gfx.owner_thread() != st.cache.owner_thread() {
            log::error!("{}: graphics context belongs to another thread", st.name);
            return Err(UiError::WrongThread);
        }
        let viewport = gfx.viewport();
        if (viewport.width, viewport.height) != (st.viewport.width, st.viewport.height) {
            st.resize(viewport);
        }
        let released = st.cache.collect_released(gfx);
        if released > 0 {
            log::trace!("{}: destroyed {released} released targets", st.name);
        }
        st.apply_requests();
        gfx.begin_batch();
        gfx.set_blending(true);
        st.paint(gfx);
        gfx.end_batch();
        Ok(())
    }

    /// Pointer pressed. Activates the window hit, or clears the active window when nothing is
    /// hit and input is not blocked. Returns `true` if a window accepted the touch.
    pub fn touch_down(&self, x: i32, y: i32, pointer: i32, button: MouseButton) -> bool {
        let mut st = self.shared.state.lock();
        if st.disposed {
            return false;
        }
        let Some(id) = st.hit_test(x, y) else {
            st.pressed = None;
            if st.blocking.is_none() {
                st.clear_active();
            }
            return false;
        };
        if let Err(err) = st.set_active(Some(id)) {
            log::warn!("{}: {err}", st.name);
        }
        st.pressed = Some(id);
        self.enqueue(InputKind::TouchDown { pointer, button }, Some(id), x, y);
        true
    }

    /// Pointer released. Returns `true` if a window received the matching touch-down.
    pub fn touch_up(&self, x: i32, y: i32, pointer: i32, button: MouseButton) -> bool {
        let mut st = self.shared.state.lock();
        if st.disposed {
            return false;
        }
        let Some(id) = st.pressed.take() else { return false };
        self.enqueue(InputKind::TouchUp { pointer, button }, Some(id), x, y);
        true
    }

    /// Pointer moved while pressed. Goes to the window that received the touch-down.
    pub fn touch_dragged(&self, x: i32, y: i32, pointer: i32) -> bool {
        let st = self.shared.state.lock();
        if st.disposed {
            return false;
        }
        let Some(id) = st.pressed.or_else(|| st.hit_test(x, y)) else { return false };
        self.enqueue(InputKind::TouchDragged { pointer }, Some(id), x, y);
        true
    }

    /// Pointer moved while released. Returns `true` if the pointer is over a window.
    pub fn mouse_moved(&self, x: i32, y: i32) -> bool {
        let st = self.shared.state.lock();
        if st.disposed {
            return false;
        }
        let hit = st.hit_test(x, y);
        self.enqueue(InputKind::MouseMoved, hit, x, y);
        hit.is_some()
    }

    /// Wheel scrolled at a screen point.
    pub fn scrolled(&self, x: i32, y: i32, dx: i32, dy: i32) -> bool {
        let st = self.shared.state.lock();
        if st.disposed {
            return false;
        }
        let Some(id) = st.hit_test(x, y) else { return false };
        self.enqueue(InputKind::Scrolled { dx, dy }, Some(id), x, y);
        true
    }

    fn key(&self, kind: InputKind) -> bool {
        let st = self.shared.state.lock();
        if st.disposed || (st.active.is_none() && st.global_keys.is_empty()) {
            return false;
        }
        self.enqueue(kind, st.active, 0, 0);
        true
    }

    /// Key pressed. Returns `true` if a global receiver or an active window will see it.
    pub fn key_down(&self, key: Key) -> bool { self.key(InputKind::KeyDown(key)) }

    /// Key released.
    pub fn key_up(&self, key: Key) -> bool { self.key(InputKind::KeyUp(key)) }

    /// Character typed.
    pub fn key_typed(&self, ch: char) -> bool { self.key(InputKind::KeyTyped(ch)) }

    /// Dispatches queued input on the calling thread. Only does work in manual mode; returns how
    /// many events were handled.
    pub fn dispatch_pending(&self) -> usize {
        match self.shared.mode {
            DispatchMode::Manual => {
                let state = &self.shared.state;
                dispatch::drain("manual-dispatch", &self.shared.rx, |event| state.lock().dispatch(event))
            }
            DispatchMode::Threaded => 0,
        }
    }

    /// Blocks until every event queued before the call has been dispatched. Must not be called
    /// from an input handler.
    pub fn wait_idle(&self) {
        match self.shared.mode {
            DispatchMode::Manual => {
                self.dispatch_pending();
            }
            DispatchMode::Threaded => {
                if self.is_disposed() {
                    return;
                }
                let (reply_tx, reply_rx) = bounded(1);
                if self.shared.tx.send(Message::Flush(reply_tx)).is_ok() {
                    let _ = reply_rx.recv();
                }
            }
        }
    }

    /// Returns `true` once [`WindowManager::dispose`] has run.
    pub fn is_disposed(&self) -> bool { self.shared.state.lock().disposed }

    /// Tears down every window, destroys every cached target and stops dispatching. Must be
    /// called on the graphics thread.
    pub fn dispose(&self, gfx: &mut dyn GraphicsContext) -> UiResult<()> {
        let mut st = self.shared.state.lock();
        if st.disposed {
            return Ok(());
        }
        st.cache.check_thread()?;
        let ids: Vec<Id> = st.windows.iter().map(|h| h.id()).collect();
        for id in ids {
            if let Err(err) = st.remove(id) {
                log::warn!("{}: {err}", st.name);
            }
        }
        if let Some(mut tip) = st.tooltip.take() {
            tip.dispose();
        }
        st.global_keys.clear();
        st.cache.clear(gfx);
        st.disposed = true;
        if self.shared.worker.is_some() {
            let _ = self.shared.tx.send(Message::Shutdown);
        }
        log::debug!("{}: disposed", st.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LEFT: MouseButton = MouseButton::LEFT;

    fn make_manager() -> WindowManager {
        let settings = Settings { dispatch: DispatchMode::Manual, ..Settings::default() };
        WindowManager::new(UiContext::new().with_settings(settings)).unwrap()
    }

    fn open(m: &WindowManager, gfx: &mut RecordingGraphics, window: Window) -> WindowHandle {
        let h = m.add_window(window).unwrap();
        h.open();
        m.render(gfx).unwrap();
        h
    }

    fn plain(name: &str, r: Recti) -> Window { Window::new(name).with_rect(r) }

    fn without_focus(log: &EventLog) -> Vec<String> {
        take(log).into_iter().filter(|e| !e.ends_with(":enter") && !e.ends_with(":exit")).collect()
    }

    #[test]
    fn touch_activates_the_front_most_window() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let a = open(&m, &mut gfx, plain("a", rect(0, 0, 100, 100)));
        let b = open(&m, &mut gfx, plain("b", rect(50, 50, 100, 100)));
        m.set_active_window(Some(a.id())).unwrap();
        assert_eq!((a.layer(), b.layer()), (0, 1));
        assert_eq!(m.hit_test(60, 60), Some(a.id()));

        assert!(m.touch_down(10, 10, 0, LEFT));
        assert!(m.touch_up(10, 10, 0, LEFT));
        assert_eq!(m.active_window(), Some(a.id()));

        assert!(m.touch_down(140, 140, 0, LEFT));
        assert!(m.touch_up(140, 140, 0, LEFT));
        assert_eq!(m.active_window(), Some(b.id()));
        assert_eq!((a.layer(), b.layer()), (1, 0));

        assert!(!m.touch_down(400, 400, 0, LEFT));
        assert_eq!(m.active_window(), None);
        assert_eq!(m.dispatch_pending(), 4);
    }

    #[test]
    fn layers_stay_dense() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut handles: Vec<WindowHandle> = Vec::new();
        for step in 0..400 {
            match rng.random_range(0..5) {
                0 => handles.push(m.add_window(plain(&format!("w{step}"), rect(0, 0, 10, 10))).unwrap()),
                1 if !handles.is_empty() => {
                    let h = handles.swap_remove(rng.random_range(0..handles.len()));
                    m.remove_window(h.id()).unwrap();
                }
                2 if !handles.is_empty() => handles[rng.random_range(0..handles.len())].open(),
                3 if !handles.is_empty() => handles[rng.random_range(0..handles.len())].close(),
                4 if !handles.is_empty() => {
                    let h = &handles[rng.random_range(0..handles.len())];
                    let res = m.set_active_window(Some(h.id()));
                    assert_eq!(res.is_ok(), h.is_open());
                }
                _ => (),
            }
            m.render(&mut gfx).unwrap();

            let layers = m.layers();
            let mut seen: Vec<usize> = layers.iter().map(|(_, l)| *l).collect();
            seen.sort();
            assert_eq!(seen, (0..handles.len()).collect::<Vec<_>>());
            let open = handles.iter().filter(|h| h.is_open()).count();
            for h in &handles {
                assert_eq!(h.is_open(), h.layer() < open, "step {step}");
            }
            if let Some(active) = m.active_window() {
                assert_eq!(m.window(active).unwrap().layer(), 0);
            }
        }
    }

    struct FocusLog(EventLog);

    impl WindowListener for FocusLog {
        fn gained_focus(&mut self, w: &mut Window) -> HandlerResult {
            self.0.lock().unwrap().push(format!("{}:gained", w.name()));
            Ok(())
        }
        fn lost_focus(&mut self, w: &mut Window) -> HandlerResult {
            self.0.lock().unwrap().push(format!("{}:lost", w.name()));
            Ok(())
        }
        fn removed(&mut self, w: &mut Window) -> HandlerResult {
            self.0.lock().unwrap().push(format!("{}:removed", w.name()));
            Ok(())
        }
        fn closing(&mut self, w: &mut Window) -> HandlerResult {
            self.0.lock().unwrap().push(format!("{}:closing", w.name()));
            Ok(())
        }
        fn disposed(&mut self, w: &mut Window) -> HandlerResult {
            self.0.lock().unwrap().push(format!("{}:disposed", w.name()));
            Ok(())
        }
    }

    #[test]
    fn reactivation_is_silent() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let a = open(&m, &mut gfx, plain("a", rect(0, 0, 10, 10)).with_listener(FocusLog(log.clone())));
        assert_eq!(take(&log), vec!["a:gained"]);
        m.set_active_window(Some(a.id())).unwrap();
        assert!(take(&log).is_empty());
        let closed = m.add_window(plain("closed", rect(0, 0, 10, 10))).unwrap();
        assert_eq!(m.set_active_window(Some(closed.id())), Err(UiError::WindowNotEnabled(closed.id())));
        assert_eq!(m.add_window(closed.clone()).err(), Some(UiError::DuplicateWindow(closed.id())));
    }

    #[test]
    fn disposing_the_active_window_restores_the_previous_one() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let a = open(&m, &mut gfx, plain("a", rect(0, 0, 10, 10)));
        let b = open(&m, &mut gfx, plain("b", rect(0, 0, 10, 10)).with_listener(FocusLog(log.clone())));
        assert_eq!(m.active_window(), Some(b.id()));
        take(&log);

        b.dispose();
        m.render(&mut gfx).unwrap();
        assert!(m.window(b.id()).is_none());
        assert_eq!(m.active_window(), Some(a.id()));
        assert_eq!(a.layer(), 0);
        assert_eq!(take(&log), vec!["b:lost", "b:removed", "b:closing", "b:disposed"]);
    }

    #[test]
    fn drag_promotes_once_past_the_resistance() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let mut w = plain("w", rect(0, 0, 200, 200));
        w.add_component(Component::new("src").with_rect(rect(0, 0, 50, 50)).with_drag_resistance(10).with_receiver(recorder(&log, consume_touch))).unwrap();
        w.add_component(Component::new("dst").with_rect(rect(100, 100, 50, 50)).with_receiver(recorder(&log, consume_all))).unwrap();
        open(&m, &mut gfx, w);

        for _ in 0..2 {
            m.touch_down(10, 10, 0, LEFT);
            m.touch_dragged(15, 10, 0);
            m.touch_dragged(18, 10, 0);
            m.touch_dragged(20, 10, 0);
            m.touch_dragged(120, 120, 0);
            m.touch_up(120, 120, 0, LEFT);
            m.dispatch_pending();
            assert_eq!(
                without_focus(&log),
                vec!["src:touch-down", "src:mouse-moved", "src:mouse-moved", "src:touch-dragged", "src:touch-dragged", "dst:drop", "src:drag-release"]
            );
        }

        // below the resistance the press ends as a plain touch-up
        m.touch_down(10, 10, 0, LEFT);
        m.touch_dragged(13, 13, 0);
        m.touch_up(13, 13, 0, LEFT);
        m.dispatch_pending();
        assert_eq!(without_focus(&log), vec!["src:touch-down", "src:mouse-moved", "src:touch-up"]);
    }

    #[test]
    fn drop_outside_every_window_only_releases() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let mut w = plain("w", rect(0, 0, 100, 100));
        w.add_component(Component::new("src").with_rect(rect(0, 0, 50, 50)).with_receiver(recorder(&log, consume_touch))).unwrap();
        open(&m, &mut gfx, w);
        m.touch_down(10, 10, 0, LEFT);
        m.touch_dragged(500, 500, 0);
        m.touch_up(500, 500, 0, LEFT);
        m.dispatch_pending();
        assert_eq!(without_focus(&log), vec!["src:touch-down", "src:touch-dragged", "src:drag-release"]);
    }

    #[test]
    fn failing_handlers_do_not_stop_dispatch() {
        init_logger();
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let mut w = plain("w", rect(0, 0, 100, 100));
        w.add_component(Component::new("bad").with_rect(rect(0, 0, 50, 50)).with_receiver(
            |_: &WidgetEvent, _: &mut ComponentState, _: &mut EventCtx| -> HandlerResult<bool> { Err("boom".into()) },
        ))
        .unwrap();
        w.add_component(Component::new("worse").with_rect(rect(50, 0, 50, 50)).with_receiver(
            |_: &WidgetEvent, _: &mut ComponentState, _: &mut EventCtx| -> HandlerResult<bool> { panic!("kaboom") },
        ))
        .unwrap();
        w.add_component(Component::new("good").with_rect(rect(0, 50, 50, 50)).with_receiver(recorder(&log, consume_touch))).unwrap();
        open(&m, &mut gfx, w);
        for (x, y) in [(10, 10), (60, 10), (10, 60)] {
            assert!(m.touch_down(x, y, 0, LEFT));
            assert!(m.touch_up(x, y, 0, LEFT));
        }
        assert_eq!(m.dispatch_pending(), 6);
        assert_eq!(without_focus(&log), vec!["good:touch-down", "good:touch-up"]);
    }

    #[test]
    fn threaded_dispatch_preserves_order() {
        let m = WindowManager::new(UiContext::new()).unwrap();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let mut w = plain("w", rect(0, 0, 100, 100));
        w.add_component(Component::new("pad").with_rect(rect(0, 0, 100, 100)).with_receiver(recorder(&log, consume_all))).unwrap();
        open(&m, &mut gfx, w);

        let producer = m.clone();
        std::thread::spawn(move || {
            producer.touch_down(10, 10, 0, LEFT);
            producer.touch_up(10, 10, 0, LEFT);
            producer.key_down(Key::Enter);
        })
        .join()
        .unwrap();
        m.wait_idle();
        assert_eq!(without_focus(&log), vec!["pad:touch-down", "pad:touch-up", "pad:key-down"]);
        assert_eq!(m.dispatch_pending(), 0);
    }

    #[test]
    fn blocking_windows_hold_back_input_beneath() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let base = open(&m, &mut gfx, plain("base", rect(0, 0, 400, 400)));
        let dialog = open(&m, &mut gfx, plain("dialog", rect(100, 100, 100, 100)).blocking(true));
        assert!(m.is_blocked());

        assert!(!m.touch_down(10, 10, 0, LEFT));
        assert_eq!(m.active_window(), Some(dialog.id()));
        assert!(m.touch_down(150, 150, 0, LEFT));

        let toast = open(&m, &mut gfx, plain("toast", rect(300, 300, 50, 50)));
        assert!(toast.inner().opened_while_blocked());
        assert!(m.is_blocked());
        assert!(m.touch_down(310, 310, 0, LEFT));
        assert_eq!(m.active_window(), Some(toast.id()));

        dialog.close();
        m.render(&mut gfx).unwrap();
        assert!(!m.is_blocked());
        assert!(m.touch_down(10, 10, 0, LEFT));
        assert_eq!(m.active_window(), Some(base.id()));
    }

    #[test]
    fn dim_layer_follows_the_active_window() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let dim_fill = ((0, 0, 800, 600), color(0, 0, 0, 128));
        let h = m.add_window(plain("modal", rect(100, 100, 50, 50)).dimming(true)).unwrap();

        h.open();
        h.close();
        m.render(&mut gfx).unwrap();
        assert!(!h.is_open());
        assert!(!gfx.fills().contains(&dim_fill));

        h.open();
        m.render(&mut gfx).unwrap();
        assert!(h.is_open());
        assert_eq!(gfx.fills().iter().filter(|f| **f == dim_fill).count(), 1);
    }

    struct EscapeOnly(Arc<AtomicUsize>);

    impl GlobalKeyReceiver for EscapeOnly {
        fn key_down(&mut self, key: Key) -> HandlerResult<bool> {
            if key == Key::Escape {
                self.0.fetch_add(1, Ordering::SeqCst);
                return Ok(true);
            }
            Ok(false)
        }
    }

    #[test]
    fn global_key_receivers_come_first() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let hits = Arc::new(AtomicUsize::new(0));
        assert!(!m.key_down(Key::Enter));
        m.add_global_key_receiver(EscapeOnly(hits.clone()));
        open(&m, &mut gfx, plain("w", rect(0, 0, 10, 10)).with_receiver(recorder(&log, consume_all)));
        assert!(m.key_down(Key::Escape));
        assert!(m.key_down(Key::Enter));
        m.dispatch_pending();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(take(&log), vec!["w:key-down"]);
    }

    #[test]
    fn unchanged_frames_repaint_nothing() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let (skin, paints) = CountingSkin::new(Color::WHITE);
        let mut w = plain("w", rect(0, 0, 100, 100));
        w.add_component(Component::new("label").with_rect(rect(10, 10, 20, 20)).with_skin(skin)).unwrap();
        let (tip_skin, tip_paints) = CountingSkin::new(Color::WHITE);
        m.set_tooltip(Some(Component::new("tip").with_rect(rect(5, 5, 30, 10)).with_skin(tip_skin)));
        open(&m, &mut gfx, w);
        assert_eq!(paints.load(Ordering::SeqCst), 1);
        assert_eq!(tip_paints.load(Ordering::SeqCst), 1);
        let creates = gfx.creates();

        m.render(&mut gfx).unwrap();
        assert_eq!(paints.load(Ordering::SeqCst), 1);
        assert_eq!(tip_paints.load(Ordering::SeqCst), 1);
        assert_eq!(gfx.creates(), creates);
        assert_eq!(gfx.depth(), 0);
    }

    #[test]
    fn render_is_refused_off_the_graphics_thread() {
        let m = make_manager();
        let other = m.clone();
        let res = std::thread::spawn(move || other.render(&mut RecordingGraphics::new())).join().unwrap();
        assert_eq!(res, Err(UiError::WrongThread));
    }

    #[test]
    fn dispose_releases_everything() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let (skin, _) = CountingSkin::new(Color::WHITE);
        let mut w = plain("w", rect(0, 0, 100, 100));
        w.add_component(Component::new("label").with_rect(rect(10, 10, 20, 20)).with_skin(skin)).unwrap();
        let h = open(&m, &mut gfx, w);
        assert!(!gfx.live.is_empty());
        m.dispose(&mut gfx).unwrap();
        assert!(gfx.live.is_empty());
        assert!(m.window(h.id()).is_none());
        assert!(!m.touch_down(10, 10, 0, LEFT));
        assert_eq!(m.render(&mut gfx), Err(UiError::Disposed));
    }

    fn make_list_window(log: &EventLog) -> (Window, Id) {
        let mut list = Component::scroll_panel("list", Axis::Vertical, 10).with_rect(rect(0, 0, 100, 100));
        for i in 0..3 {
            list.add_component(Component::new(format!("item{i}")).with_layout(LayoutSpec { height: Expr::Absolute(50), ..LayoutSpec::default() })).unwrap();
        }
        let mut w = plain("w", rect(0, 0, 200, 200));
        let list = w.add_component(list).unwrap();
        w.add_component(Component::new("dst").with_rect(rect(110, 0, 80, 80)).with_receiver(recorder(log, consume_all))).unwrap();
        (w, list)
    }

    fn thumb_of(h: &WindowHandle, list: Id) -> Recti {
        let w = h.inner();
        let region = w.root().find(list).and_then(|c| c.as_scroll()).unwrap();
        region.thumb_rect(Axis::Vertical).unwrap()
    }

    fn list_offset(h: &WindowHandle, list: Id) -> i32 { h.inner().root().find(list).unwrap().scroll_offset().y }

    #[test]
    fn thumb_grab_ends_with_the_touch_off_the_panel() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let (w, list) = make_list_window(&log);
        let h = open(&m, &mut gfx, w);
        let thumb = thumb_of(&h, list);
        let (tx, ty) = (thumb.x + thumb.width / 2, thumb.y + 1);

        m.touch_down(tx, ty, 0, LEFT);
        m.touch_dragged(tx + 10, ty, 0);
        m.touch_dragged(tx + 50, ty + 40, 0);
        m.touch_up(tx + 50, ty + 40, 0, LEFT);
        m.dispatch_pending();
        let scrolled = list_offset(&h, list);
        assert!(scrolled > 0);
        assert!(!h.inner().root().find(list).and_then(|c| c.as_scroll()).unwrap().is_grabbing());

        m.mouse_moved(50, 80);
        m.mouse_moved(95, 95);
        m.dispatch_pending();
        assert_eq!(list_offset(&h, list), scrolled);
    }

    #[test]
    fn thumb_drag_is_never_dropped() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let (w, list) = make_list_window(&log);
        let h = open(&m, &mut gfx, w);
        let thumb = thumb_of(&h, list);
        let (tx, ty) = (thumb.x + thumb.width / 2, thumb.y + 1);

        m.touch_down(tx, ty, 0, LEFT);
        m.touch_dragged(150, 40, 0);
        m.touch_up(150, 40, 0, LEFT);
        m.dispatch_pending();
        assert!(without_focus(&log).is_empty());
        assert!(list_offset(&h, list) > 0);
    }

    #[test]
    fn off_thread_child_resize_lands_on_the_next_frame() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let (skin, paints) = CountingSkin::new(Color::WHITE);
        let mut w = plain("w", rect(0, 0, 200, 200));
        let layout = LayoutSpec { width: Expr::Percent(50.0), height: Expr::Absolute(20), ..LayoutSpec::default() };
        let label = w.add_component(Component::new("label").with_layout(layout).with_skin(skin)).unwrap();
        let h = open(&m, &mut gfx, w);
        assert_eq!(h.inner().root().find(label).unwrap().rect().width, 100);
        assert_eq!(paints.load(Ordering::SeqCst), 1);

        let remote = h.clone();
        std::thread::spawn(move || {
            if let Some(c) = remote.inner().root_mut().find_mut(label) {
                c.resize(dim(60, 200));
            }
        })
        .join()
        .unwrap();
        {
            let w = h.inner();
            let c = w.root().find(label).unwrap();
            assert!(c.state().has_pending_resize());
            assert_eq!(c.rect().width, 100);
        }

        m.render(&mut gfx).unwrap();
        let w = h.inner();
        let c = w.root().find(label).unwrap();
        assert!(!c.state().has_pending_resize());
        assert_eq!(c.rect().width, 30);
        assert_eq!(paints.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn hidden_windows_are_not_hit() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let back = open(&m, &mut gfx, plain("back", rect(0, 0, 100, 100)));
        let front = open(&m, &mut gfx, plain("front", rect(0, 0, 100, 100)));
        assert_eq!(m.hit_test(10, 10), Some(front.id()));
        front.inner().set_hidden(true);
        assert_eq!(m.hit_test(10, 10), Some(back.id()));
        assert!(m.touch_down(10, 10, 0, LEFT));
        assert_eq!(m.active_window(), Some(back.id()));
    }

    #[test]
    fn keys_go_to_the_window_active_when_queued() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let log = event_log();
        let a = open(&m, &mut gfx, plain("a", rect(0, 0, 10, 10)).with_receiver(recorder(&log, consume_all)));
        let b = open(&m, &mut gfx, plain("b", rect(0, 0, 10, 10)).with_receiver(recorder(&log, consume_all)));
        m.set_active_window(Some(a.id())).unwrap();
        assert!(m.key_down(Key::Enter));
        m.set_active_window(Some(b.id())).unwrap();
        m.dispatch_pending();
        assert_eq!(take(&log), vec!["a:key-down"]);
    }

    #[test]
    fn render_is_refused_with_a_foreign_graphics_context() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        gfx.owner = std::thread::spawn(|| std::thread::current().id()).join().unwrap();
        assert_eq!(m.render(&mut gfx), Err(UiError::WrongThread));
        assert!(gfx.ops.is_empty());
    }

    #[test]
    fn viewport_changes_reach_open_windows() {
        let m = make_manager();
        let mut gfx = RecordingGraphics::new();
        let layout = LayoutSpec { width: Expr::Percent(50.0), ..LayoutSpec::default() };
        let h = open(&m, &mut gfx, Window::new("half").with_layout(layout));
        assert_eq!(h.inner().rect().width, 400);
        gfx.viewport = dim(1000, 600);
        m.render(&mut gfx).unwrap();
        assert_eq!(h.inner().rect().width, 500);
        assert_eq!(m.viewport().width, 1000);
    }
}
