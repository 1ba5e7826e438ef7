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
//! The widget base: identity, placement, flags, the receiver chain and the cached render target.
//!
//! A [`Component`] is a tagged variant. Leaves carry only a skin and receivers; containers own
//! their children exclusively; scroll regions own a content container plus synthesized bars.

use std::sync::Arc;
use std::thread::ThreadId;

use super::*;
use crate::error::guarded;
use crate::render_cache::{ReleaseQueue, RenderPass};

/// Default distance in pixels a pointer must travel before a press turns into a drag.
pub const DEFAULT_DRAG_RESISTANCE: i32 = 15;

struct ManagerInfo {
    id: Id,
    graphics_thread: ThreadId,
    drag_resistance: i32,
}

/// Shared reference to the manager a component tree belongs to.
#[derive(Clone)]
pub struct ManagerRef(Arc<ManagerInfo>);

impl ManagerRef {
    pub(crate) fn new(id: Id, graphics_thread: ThreadId, drag_resistance: i32) -> Self {
        Self(Arc::new(ManagerInfo { id, graphics_thread, drag_resistance }))
    }

    /// Identity of the manager.
    pub fn id(&self) -> Id { self.0.id }

    /// Thread owning the graphics context of the manager.
    pub fn graphics_thread(&self) -> ThreadId { self.0.graphics_thread }

    /// Returns `true` when the calling thread owns the graphics context.
    pub fn on_graphics_thread(&self) -> bool { std::thread::current().id() == self.0.graphics_thread }

    /// Drag resistance of components that do not set their own.
    pub fn drag_resistance(&self) -> i32 { self.0.drag_resistance }
}

/// Per-component data shared by every component kind, and the view handed to skins and
/// receivers.
pub struct ComponentState {
    id: Id,
    name: String,
    parent: Option<Id>,
    manager: Option<ManagerRef>,
    rect: Recti,
    enabled: bool,
    hidden: bool,
    mouse_over: bool,
    animating: bool,
    dirty: bool,
    draw_priority: i32,
    drag_resistance: Option<i32>,
    layout: LayoutSpec,
    config: Option<ConfigRecord>,
    config_parent: Option<String>,
    pending_resize: Option<Dimensioni>,
    resize_on_enable: Option<Dimensioni>,
}

impl ComponentState {
    /// Creates state for a new component with a fresh identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Id::next(),
            name: name.into(),
            parent: None,
            manager: None,
            rect: rect(0, 0, 0, 0),
            enabled: true,
            hidden: false,
            mouse_over: false,
            animating: false,
            dirty: true,
            draw_priority: 0,
            drag_resistance: None,
            layout: LayoutSpec::default(),
            config: None,
            config_parent: None,
            pending_resize: None,
            resize_on_enable: None,
        }
    }

    /// Stable identity.
    pub fn id(&self) -> Id { self.id }
    /// Object name, used to look up configuration and in diagnostics.
    pub fn name(&self) -> &str { &self.name }
    /// Owning container, if attached.
    pub fn parent(&self) -> Option<Id> { self.parent }
    /// Owning manager, if the tree is attached to one.
    pub fn manager(&self) -> Option<&ManagerRef> { self.manager.as_ref() }
    /// Rectangle in parent-local coordinates.
    pub fn rect(&self) -> Recti { self.rect }
    /// Size of the component.
    pub fn size(&self) -> Dimensioni { dim(self.rect.width, self.rect.height) }
    /// Local bounds, `(0, 0, width, height)`.
    pub fn bounds(&self) -> Recti { rect(0, 0, self.rect.width, self.rect.height) }
    /// Enabled components receive input and are drawn.
    pub fn is_enabled(&self) -> bool { self.enabled }
    /// Hidden components are neither drawn nor hit.
    pub fn is_hidden(&self) -> bool { self.hidden }
    /// Returns `true` while the pointer is over the component.
    pub fn is_mouse_over(&self) -> bool { self.mouse_over }
    /// Animating components are rebuilt every frame.
    pub fn is_animating(&self) -> bool { self.animating }
    /// Returns `true` when the cached target is out of date.
    pub fn is_dirty(&self) -> bool { self.dirty }
    /// Paint order key used by [`Container::sort_by_draw_priority`].
    pub fn draw_priority(&self) -> i32 { self.draw_priority }
    /// Drag threshold in pixels; `0` disables dragging.
    pub fn drag_resistance(&self) -> i32 {
        self.drag_resistance.or_else(|| self.manager.as_ref().map(|m| m.drag_resistance())).unwrap_or(DEFAULT_DRAG_RESISTANCE)
    }
    /// Placement rules.
    pub fn layout(&self) -> &LayoutSpec { &self.layout }
    /// Last applied configuration record.
    pub fn config(&self) -> Option<&ConfigRecord> { self.config.as_ref() }
    /// Returns `true` when a resize is waiting for the graphics thread.
    pub fn has_pending_resize(&self) -> bool { self.pending_resize.is_some() }

    /// Flags the cached target for rebuild.
    pub fn mark_dirty(&mut self) { self.dirty = true; }

    /// Moves the component inside its parent without touching its layout rules.
    pub fn set_rect(&mut self, r: Recti) {
        self.rect = r;
        self.dirty = true;
    }

    /// Moves the component, keeping its size.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.rect.x = x;
        self.rect.y = y;
    }

    /// Starts or stops per-frame rebuilding.
    pub fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
        self.dirty = true;
    }

    /// Shows or hides the component.
    pub fn set_hidden(&mut self, hidden: bool) {
        if self.hidden != hidden {
            self.hidden = hidden;
            self.dirty = true;
        }
    }

    /// Sets the paint order key.
    pub fn set_draw_priority(&mut self, priority: i32) { self.draw_priority = priority; }

    /// Sets the drag threshold.
    pub fn set_drag_resistance(&mut self, resistance: i32) { self.drag_resistance = Some(resistance.max(0)); }

    /// Replaces the placement rules. Takes effect on the next resize.
    pub fn set_layout(&mut self, layout: LayoutSpec) { self.layout = layout; }
}

/// Capability of drawing a component into its cached target.
pub trait Paintable: Send {
    /// Paints the component. The painter is bound to the component's own target.
    fn paint(&mut self, painter: &mut Painter<'_>, state: &ComponentState) -> HandlerResult;

    /// Called once per frame before any rebuild decision.
    fn update(&mut self, _delta: f32, _state: &mut ComponentState) -> HandlerResult { Ok(()) }

    /// Called when the component is removed from its container.
    fn removed(&mut self, _state: &ComponentState) {}
}

/// Capability of tracking pointer hover.
pub trait Focusable {
    /// The pointer entered. A second enter without an exit in between is ignored.
    fn on_enter(&mut self);
    /// The pointer left. An exit without a preceding enter is ignored.
    fn on_exit(&mut self);
}

/// Capability of owning children of type `C`.
pub trait ContainerOf<C> {
    /// Adopts `child` and returns its identity.
    fn add_component(&mut self, child: C) -> UiResult<Id>;
    /// Removes and disposes the child with identity `id`. Returns `false` if not found.
    fn remove_component(&mut self, id: Id) -> bool;
    /// Removes and disposes every child.
    fn clear_components(&mut self);
    /// Number of direct children.
    fn component_count(&self) -> usize;
}

pub(crate) enum Kind {
    Leaf,
    Container(Container),
    Scroll(Box<ScrollRegion>),
}

/// A node of the widget tree.
pub struct Component {
    pub(crate) state: ComponentState,
    receivers: ReceiverChain,
    skin: Option<Box<dyn Paintable>>,
    target: Option<TargetKey>,
    releases: Option<ReleaseQueue>,
    pub(crate) kind: Kind,
    disposed: bool,
}

impl Component {
    pub(crate) fn with_kind(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            state: ComponentState::new(name),
            receivers: ReceiverChain::new(),
            skin: None,
            target: None,
            releases: None,
            kind,
            disposed: false,
        }
    }

    /// Creates a leaf component.
    pub fn new(name: impl Into<String>) -> Self { Self::with_kind(name, Kind::Leaf) }

    /// Creates an empty container.
    pub fn container(name: impl Into<String>) -> Self { Self::with_kind(name, Kind::Container(Container::new())) }

    /// Attaches a skin.
    pub fn with_skin(mut self, skin: impl Paintable + 'static) -> Self {
        self.skin = Some(Box::new(skin));
        self
    }

    /// Appends an input receiver.
    pub fn with_receiver(mut self, receiver: impl InputReceiver + 'static) -> Self {
        self.receivers.push(receiver);
        self
    }

    /// Replaces the placement rules.
    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.state.layout = layout;
        self
    }

    /// Fixed placement at `r` (parent-local).
    pub fn with_rect(mut self, r: Recti) -> Self {
        self.state.layout = LayoutSpec::fixed(r);
        self.state.rect = r;
        self
    }

    /// Sets the paint order key.
    pub fn with_draw_priority(mut self, priority: i32) -> Self {
        self.state.draw_priority = priority;
        self
    }

    /// Sets the drag threshold.
    pub fn with_drag_resistance(mut self, resistance: i32) -> Self {
        self.state.set_drag_resistance(resistance);
        self
    }

    /// Builder-style enable flag. Disabled components are resized when first enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.state.enabled = enabled;
        self
    }

    /// Looks up the record for this component under `parent` and applies it. A missing record
    /// leaves the defaults in place.
    pub fn configure(mut self, provider: &dyn ConfigProvider, parent: &str) -> Self {
        self.state.config_parent = Some(parent.to_string());
        match provider.record(parent, &self.state.name) {
            Some(record) => self.apply_record(&record),
            None => log::debug!("{}: no configuration record under `{parent}`; using defaults", self.state.name),
        }
        self
    }

    /// Applies the generic component keys (layout, flags, priorities) and the kind-specific ones.
    pub fn apply_record(&mut self, record: &ConfigRecord) {
        let s = &mut self.state;
        s.layout.apply_record(record);
        s.enabled = record.bool_or("enabled", s.enabled);
        s.hidden = record.bool_or("hidden", s.hidden);
        s.draw_priority = record.int_or("draw-priority", s.draw_priority);
        if record.contains("drag-resistance") {
            let resistance = record.int_or("drag-resistance", s.drag_resistance());
            s.set_drag_resistance(resistance);
        }
        s.config = Some(record.clone());
        s.dirty = true;
        if let Kind::Scroll(region) = &mut self.kind {
            region.apply_record(record);
        }
    }

    /// Re-reads configuration records for this subtree. Callers resize afterwards.
    pub fn refresh(&mut self, provider: &dyn ConfigProvider) {
        if let Some(parent) = self.state.config_parent.clone() {
            if let Some(record) = provider.record(&parent, &self.state.name) {
                self.apply_record(&record);
            }
        }
        for child in self.children_mut() {
            child.refresh(provider);
        }
    }

    /// Stable identity.
    pub fn id(&self) -> Id { self.state.id }
    /// Object name.
    pub fn name(&self) -> &str { &self.state.name }
    /// Rectangle in parent-local coordinates.
    pub fn rect(&self) -> Recti { self.state.rect }
    /// Shared state.
    pub fn state(&self) -> &ComponentState { &self.state }
    /// Mutable shared state.
    pub fn state_mut(&mut self) -> &mut ComponentState { &mut self.state }
    /// Receiver chain, for appending receivers after construction.
    pub fn receivers_mut(&mut self) -> &mut ReceiverChain { &mut self.receivers }
    /// Replaces the skin.
    pub fn set_skin(&mut self, skin: impl Paintable + 'static) {
        self.skin = Some(Box::new(skin));
        self.state.dirty = true;
    }
    /// Key of the cached target, once rendered.
    pub fn target(&self) -> Option<TargetKey> { self.target }
    /// Returns `true` after [`Component::dispose`].
    pub fn is_disposed(&self) -> bool { self.disposed }

    /// Returns `true` if the component is enabled.
    pub fn is_enabled(&self) -> bool { self.state.enabled }

    /// Enables or disables the component. Enabling applies a resize that was postponed while the
    /// component was disabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.state.enabled == enabled {
            return;
        }
        self.state.enabled = enabled;
        self.state.dirty = true;
        if enabled {
            if let Some(parent) = self.state.resize_on_enable.take() {
                self.resize(parent);
            }
        } else {
            self.on_exit();
        }
    }

    /// Returns `true` if the component is hidden.
    pub fn is_hidden(&self) -> bool { self.state.hidden }

    /// Shows or hides the component.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.state.set_hidden(hidden);
        if hidden {
            self.on_exit();
        }
    }

    /// Returns `true` if the component can own children.
    pub fn is_container(&self) -> bool { !matches!(self.kind, Kind::Leaf) }

    /// The container part, for plain containers.
    pub fn as_container(&self) -> Option<&Container> {
        match &self.kind {
            Kind::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Mutable container part, for plain containers.
    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            Kind::Container(c) => Some(c),
            _ => None,
        }
    }

    /// The scroll region, for scroll components.
    pub fn as_scroll(&self) -> Option<&ScrollRegion> {
        match &self.kind {
            Kind::Scroll(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable scroll region, for scroll components.
    pub fn as_scroll_mut(&mut self) -> Option<&mut ScrollRegion> {
        match &mut self.kind {
            Kind::Scroll(s) => Some(s),
            _ => None,
        }
    }

    fn children_container(&self) -> Option<&Container> {
        match &self.kind {
            Kind::Leaf => None,
            Kind::Container(c) => Some(c),
            Kind::Scroll(s) => Some(s.content()),
        }
    }

    fn children_container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            Kind::Leaf => None,
            Kind::Container(c) => Some(c),
            Kind::Scroll(s) => Some(s.content_mut()),
        }
    }

    /// Direct children in paint order. Empty for leaves.
    pub fn children(&self) -> &[Component] { self.children_container().map(|c| c.children()).unwrap_or(&[]) }

    /// Mutable direct children.
    pub fn children_mut(&mut self) -> &mut [Component] {
        match self.children_container_mut() {
            Some(c) => c.children_mut(),
            None => &mut [],
        }
    }

    /// Translation from this component's local space into the space its children live in.
    fn child_shift(&self) -> Vec2i {
        match &self.kind {
            Kind::Scroll(s) => {
                let o = s.offset();
                vec2(-o.x, -o.y)
            }
            _ => vec2(0, 0),
        }
    }

    /// Returns `true` while this component holds the pointer for the rest of a touch sequence.
    pub(crate) fn captures_pointer(&self) -> bool { self.as_scroll().is_some_and(|s| s.is_grabbing()) }

    /// Drops any pointer capture left in this subtree once a touch sequence is over.
    pub(crate) fn end_touch(&mut self) {
        if let Kind::Scroll(s) = &mut self.kind {
            s.release_grab();
        }
        for child in self.children_mut() {
            child.end_touch();
        }
    }

    /// Returns `true` if `id` is this component or one of its descendants.
    pub fn exists_in_hierarchy(&self, id: Id) -> bool { self.state.id == id || self.children().iter().any(|c| c.exists_in_hierarchy(id)) }

    /// Finds a component in this subtree.
    pub fn find(&self, id: Id) -> Option<&Component> {
        if self.state.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Finds a component in this subtree, mutably.
    pub fn find_mut(&mut self, id: Id) -> Option<&mut Component> {
        if self.state.id == id {
            return Some(self);
        }
        self.children_mut().iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Finds the first component named `name` in this subtree.
    pub fn find_by_name(&self, name: &str) -> Option<&Component> {
        if self.state.name == name {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_by_name(name))
    }

    /// Origin of descendant `id` expressed in this component's local coordinates, summing the
    /// origins of every component on the path (this one excluded).
    pub fn offset_of(&self, id: Id) -> Option<Vec2i> {
        let shift = self.child_shift();
        for child in self.children() {
            let r = child.state.rect;
            if child.state.id == id {
                return Some(vec2(r.x + shift.x, r.y + shift.y));
            }
            if let Some(inner) = child.offset_of(id) {
                return Some(vec2(r.x + shift.x + inner.x, r.y + shift.y + inner.y));
            }
        }
        None
    }

    pub(crate) fn set_manager(&mut self, manager: Option<ManagerRef>) {
        self.state.manager = manager.clone();
        if let Kind::Scroll(s) = &mut self.kind {
            s.set_manager(manager.clone());
        }
        for child in self.children_mut() {
            child.set_manager(manager.clone());
        }
    }

    /// Called by the owning container when the child is adopted. `size` is the space the child is
    /// laid out in, which is the parent's size except inside scroll regions.
    pub(crate) fn attach(&mut self, parent: &ComponentState, size: Dimensioni) {
        self.state.parent = Some(parent.id);
        self.set_manager(parent.manager.clone());
        self.resize_or_defer(size);
    }

    /// Resizes now when enabled, otherwise remembers `parent` until the component is enabled.
    pub(crate) fn resize_or_defer(&mut self, parent: Dimensioni) {
        if self.state.enabled {
            self.resize(parent);
        } else {
            self.state.resize_on_enable = Some(parent);
        }
    }

    /// Called by the owning container before disposal.
    pub(crate) fn detach(&mut self) {
        if let Some(skin) = self.skin.as_mut() {
            skin.removed(&self.state);
        }
        self.on_exit();
        self.state.parent = None;
        self.set_manager(None);
    }

    /// Recomputes the rectangle against a parent of size `parent` and marks the component dirty.
    /// Off the graphics thread the resize is recorded and applied on the next render.
    pub fn resize(&mut self, parent: Dimensioni) {
        if let Some(manager) = &self.state.manager {
            if !manager.on_graphics_thread() {
                log::trace!("{}: deferring resize to the graphics thread", self.state.name);
                self.state.pending_resize = Some(parent);
                return;
            }
        }
        self.resize_now(parent);
    }

    /// Applies a resize recorded off the graphics thread. Returns `true` if one was pending.
    pub(crate) fn apply_pending_resize(&mut self) -> bool {
        match self.state.pending_resize.take() {
            Some(parent) => {
                self.resize_now(parent);
                true
            }
            None => false,
        }
    }

    pub(crate) fn resize_now(&mut self, parent: Dimensioni) {
        self.state.pending_resize = None;
        self.state.rect = self.state.layout.resolve(parent);
        self.state.dirty = true;
        let size = self.state.size();
        match &mut self.kind {
            Kind::Leaf => (),
            Kind::Container(c) => c.resize_children(size),
            Kind::Scroll(s) => s.resize(size),
        }
    }

    /// Returns `true` if this component or any drawn descendant must be rebuilt.
    pub fn needs_redraw(&self) -> bool {
        if self.state.dirty || self.state.animating || self.state.pending_resize.is_some() {
            return true;
        }
        match &self.kind {
            Kind::Leaf => false,
            Kind::Container(c) => c.needs_redraw(),
            Kind::Scroll(s) => s.needs_redraw(),
        }
    }

    pub(crate) fn is_drawn(&self) -> bool { self.state.enabled && !self.state.hidden && !self.disposed }

    /// Draws the component into the current destination at its rectangle, rebuilding the cached
    /// target first when needed.
    pub fn render(&mut self, pass: &mut RenderPass<'_>) {
        let dst = self.state.rect;
        self.render_at(pass, dst);
    }

    /// Like [`Component::render`] but composites at `dst` instead of the component's rectangle.
    pub fn render_at(&mut self, pass: &mut RenderPass<'_>, dst: Recti) {
        if !self.is_drawn() {
            self.state.dirty = false;
            return;
        }
        self.apply_pending_resize();
        if let Some(skin) = self.skin.as_mut() {
            let delta = pass.delta;
            let state = &mut self.state;
            let name = state.name.clone();
            guarded(&name, "update", || skin.update(delta, state));
        }
        let size = self.state.size();
        if size.width <= 0 || size.height <= 0 {
            self.state.dirty = false;
            return;
        }
        if self.needs_redraw() || pass.cache.is_stale(self.target, size) {
            self.rebuild(pass, size);
        }
        if let Some(key) = self.target {
            pass.composite(key, rect(0, 0, size.width, size.height), rect(dst.x, dst.y, size.width, size.height));
        }
    }

    fn rebuild(&mut self, pass: &mut RenderPass<'_>, size: Dimensioni) {
        if self.releases.is_none() {
            self.releases = Some(pass.cache.release_queue());
        }
        let Self { state, skin, kind, target, .. } = self;
        let id = state.id;
        pass.rebuild(target, id, size, |pass| {
            if let Some(skin) = skin.as_mut() {
                let mut painter = pass.painter(size);
                guarded(&state.name, "paint", || skin.paint(&mut painter, state));
            }
            match kind {
                Kind::Leaf => (),
                Kind::Container(c) => c.render_children(pass),
                Kind::Scroll(s) => s.render(pass, id, size),
            }
        });
        state.dirty = false;
    }

    /// Routes `event` (in this component's local coordinates) through the subtree, children
    /// first, then this component's receiver chain. Returns `true` if anything consumed it.
    pub fn handle(&mut self, event: &WidgetEvent, ctx: &mut EventCtx) -> bool {
        if !self.is_drawn() {
            return false;
        }
        let consumed = match &mut self.kind {
            Kind::Leaf => false,
            Kind::Container(c) => c.route(event, ctx),
            Kind::Scroll(s) => s.route(event, &mut self.state, ctx),
        };
        if consumed {
            return true;
        }
        let own = self.receivers.dispatch(event, &mut self.state, ctx);
        if own && matches!(event, WidgetEvent::TouchDown { .. }) && ctx.touch_origin.is_none() {
            ctx.touch_origin = Some(self.state.id);
        }
        own
    }

    /// Releases the cached target and the receiver chain of this subtree. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let (Some(queue), Some(key)) = (self.releases.as_ref(), self.target.take()) {
            queue.release(key);
        }
        match &mut self.kind {
            Kind::Leaf => (),
            Kind::Container(c) => c.dispose_all(),
            Kind::Scroll(s) => s.dispose(),
        }
        self.receivers.clear();
        log::trace!("{}: disposed", self.state.name);
    }
}

impl Focusable for Component {
    fn on_enter(&mut self) {
        if self.state.mouse_over {
            return;
        }
        self.state.mouse_over = true;
        self.state.dirty = true;
        self.receivers.dispatch(&WidgetEvent::Enter, &mut self.state, &mut EventCtx::new());
    }

    fn on_exit(&mut self) {
        if !self.state.mouse_over {
            return;
        }
        self.state.mouse_over = false;
        self.state.dirty = true;
        if let Some(c) = self.children_container_mut() {
            c.exit_focus();
        }
        self.receivers.dispatch(&WidgetEvent::Exit, &mut self.state, &mut EventCtx::new());
    }
}

impl ContainerOf<Component> for Component {
    fn add_component(&mut self, child: Component) -> UiResult<Id> {
        let Self { state, kind, .. } = self;
        match kind {
            Kind::Leaf => Err(UiError::NotAContainer(state.name.clone())),
            Kind::Container(c) => {
                state.dirty = true;
                Ok(c.adopt(child, state))
            }
            Kind::Scroll(s) => {
                state.dirty = true;
                Ok(s.adopt(child, state))
            }
        }
    }

    fn remove_component(&mut self, id: Id) -> bool {
        let removed = match &mut self.kind {
            Kind::Leaf => false,
            Kind::Container(c) => c.remove(id),
            Kind::Scroll(s) => s.remove(id),
        };
        if removed {
            self.state.dirty = true;
        }
        removed
    }

    fn clear_components(&mut self) {
        match &mut self.kind {
            Kind::Leaf => (),
            Kind::Container(c) => c.clear(),
            Kind::Scroll(s) => s.clear(),
        }
        self.state.dirty = true;
    }

    fn component_count(&self) -> usize { self.children().len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_cache::RenderCache;
    use crate::test_support::*;
    use std::sync::atomic::Ordering;

    fn leaf(name: &str, r: Recti) -> Component { Component::new(name).with_rect(r) }

    fn render_once(root: &mut Component, gfx: &mut RecordingGraphics, cache: &mut RenderCache) -> usize {
        let atlas = StaticAtlas::new();
        let mut pass = RenderPass::new(gfx, cache, &atlas);
        root.render(&mut pass);
        pass.rebuilds()
    }

    #[test]
    fn leaves_reject_children() {
        let mut l = Component::new("label");
        assert_eq!(l.add_component(Component::new("x")), Err(UiError::NotAContainer("label".into())));
    }

    #[test]
    fn add_sets_parent_and_resizes() {
        let mut root = Component::container("root").with_rect(rect(0, 0, 200, 100));
        let child = Component::new("bar").with_layout(LayoutSpec { width: Expr::Percent(50.0), ..LayoutSpec::default() });
        let id = root.add_component(child).unwrap();
        let child = root.find(id).unwrap();
        assert_eq!(child.state().parent(), Some(root.id()));
        assert_eq!((child.rect().width, child.rect().height), (100, 100));
    }

    #[test]
    fn disabled_children_resize_when_enabled() {
        let mut root = Component::container("root").with_rect(rect(0, 0, 200, 100));
        let id = root.add_component(Component::new("late").with_enabled(false)).unwrap();
        assert_eq!(root.find(id).unwrap().rect().width, 0);
        root.find_mut(id).unwrap().set_enabled(true);
        assert_eq!(root.find(id).unwrap().rect().width, 200);
    }

    #[test]
    fn second_render_rebuilds_nothing() {
        let mut gfx = RecordingGraphics::new();
        let mut cache = RenderCache::new(std::thread::current().id());
        let (skin, paints) = CountingSkin::new(Color::WHITE);
        let mut root = Component::container("root").with_rect(rect(0, 0, 100, 100));
        root.add_component(leaf("a", rect(0, 0, 10, 10)).with_skin(skin)).unwrap();
        assert_eq!(render_once(&mut root, &mut gfx, &mut cache), 2);
        assert_eq!(render_once(&mut root, &mut gfx, &mut cache), 0);
        assert_eq!(paints.load(Ordering::SeqCst), 1);
        assert_eq!(gfx.creates(), 2);
    }

    #[test]
    fn dirty_child_rebuilds_parent_path_only() {
        let mut gfx = RecordingGraphics::new();
        let mut cache = RenderCache::new(std::thread::current().id());
        let mut root = Component::container("root").with_rect(rect(0, 0, 100, 100));
        let a = root.add_component(leaf("a", rect(0, 0, 10, 10))).unwrap();
        root.add_component(leaf("b", rect(20, 0, 10, 10))).unwrap();
        render_once(&mut root, &mut gfx, &mut cache);
        root.find_mut(a).unwrap().state_mut().mark_dirty();
        assert_eq!(render_once(&mut root, &mut gfx, &mut cache), 2);
    }

    #[test]
    fn animating_components_rebuild_every_frame() {
        let mut gfx = RecordingGraphics::new();
        let mut cache = RenderCache::new(std::thread::current().id());
        let mut spinner = leaf("spinner", rect(0, 0, 8, 8));
        spinner.state_mut().set_animating(true);
        render_once(&mut spinner, &mut gfx, &mut cache);
        assert_eq!(render_once(&mut spinner, &mut gfx, &mut cache), 1);
    }

    #[test]
    fn failing_paint_is_logged_and_target_stays_balanced() {
        init_logger();
        struct Broken;
        impl Paintable for Broken {
            fn paint(&mut self, _p: &mut Painter<'_>, _s: &ComponentState) -> HandlerResult { Err("no font".into()) }
        }
        let mut gfx = RecordingGraphics::new();
        let mut cache = RenderCache::new(std::thread::current().id());
        let mut c = leaf("broken", rect(0, 0, 8, 8)).with_skin(Broken);
        render_once(&mut c, &mut gfx, &mut cache);
        assert_eq!(gfx.depth(), 0);
        assert!(!c.needs_redraw());
    }

    #[test]
    fn enter_and_exit_never_repeat() {
        let log = event_log();
        let mut c = leaf("w", rect(0, 0, 8, 8)).with_receiver(recorder(&log, consume_none));
        c.on_enter();
        c.on_enter();
        c.on_exit();
        c.on_exit();
        assert_eq!(entries(&log), vec!["w:enter", "w:exit"]);
    }

    #[test]
    fn offsets_sum_ancestor_origins() {
        let mut root = Component::container("root").with_rect(rect(0, 0, 300, 300));
        let mut mid = Component::container("mid").with_rect(rect(10, 20, 200, 200));
        let deep = mid.add_component(leaf("deep", rect(5, 7, 10, 10))).unwrap();
        root.add_component(mid).unwrap();
        let off = root.offset_of(deep).unwrap();
        assert_eq!((off.x, off.y), (15, 27));
        assert!(root.exists_in_hierarchy(deep));
        assert!(root.offset_of(Id::next()).is_none());
    }

    #[test]
    fn resize_off_the_graphics_thread_is_deferred() {
        let gfx_thread = std::thread::current().id();
        let mut root = Component::container("root").with_layout(LayoutSpec::default());
        root.set_manager(Some(ManagerRef::new(Id::next(), gfx_thread, DEFAULT_DRAG_RESISTANCE)));
        let root = std::thread::spawn(move || {
            root.resize(dim(64, 32));
            root
        })
        .join()
        .unwrap();
        let mut root = root;
        assert!(root.state().has_pending_resize());
        assert_eq!(root.rect().width, 0);
        let mut gfx = RecordingGraphics::new();
        let mut cache = RenderCache::new(gfx_thread);
        render_once(&mut root, &mut gfx, &mut cache);
        assert!(!root.state().has_pending_resize());
        assert_eq!((root.rect().width, root.rect().height), (64, 32));
    }

    #[test]
    fn configure_applies_record_and_keeps_defaults_when_missing() {
        let provider = MapConfigProvider::new();
        provider.insert("hud", ConfigRecord::new("minimap").with("width", "25%").with("draw-priority", "3").with("hidden", "maybe"));
        let mut c = Component::new("minimap").configure(&provider, "hud");
        c.resize(dim(400, 100));
        assert_eq!(c.rect().width, 100);
        assert_eq!(c.state().draw_priority(), 3);
        assert!(!c.is_hidden());
        let other = Component::new("other").configure(&provider, "hud");
        assert_eq!(other.state().draw_priority(), 0);
    }

    #[test]
    fn dispose_queues_target_release() {
        let mut gfx = RecordingGraphics::new();
        let mut cache = RenderCache::new(std::thread::current().id());
        let mut root = Component::container("root").with_rect(rect(0, 0, 50, 50));
        root.add_component(leaf("a", rect(0, 0, 10, 10))).unwrap();
        render_once(&mut root, &mut gfx, &mut cache);
        assert_eq!(cache.len(), 2);
        root.dispose();
        root.dispose();
        assert_eq!(cache.collect_released(&mut gfx), 2);
        assert!(cache.is_empty());
    }
}
