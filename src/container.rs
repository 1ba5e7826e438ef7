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
//! Child ownership, hit-testing and focus delegation.

use super::*;
use crate::render_cache::RenderPass;

/// Ordered list of exclusively owned children plus the mouse and keyboard focus among them.
///
/// Insertion order is paint order: the last child is drawn on top and is hit first.
#[derive(Default)]
pub struct Container {
    children: Vec<Component>,
    mouse_focus: Option<Id>,
    key_focus: Option<Id>,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self { Self::default() }

    /// Children in paint order.
    pub fn children(&self) -> &[Component] { &self.children }

    /// Mutable children in paint order.
    pub fn children_mut(&mut self) -> &mut [Component] { &mut self.children }

    /// Number of children.
    pub fn len(&self) -> usize { self.children.len() }

    /// Returns `true` when there are no children.
    pub fn is_empty(&self) -> bool { self.children.is_empty() }

    /// Child currently under the pointer.
    pub fn mouse_focus(&self) -> Option<Id> { self.mouse_focus }

    /// Child receiving keyboard events first.
    pub fn key_focus(&self) -> Option<Id> { self.key_focus }

    /// Gives keyboard focus to a direct child (or clears it).
    pub fn set_key_focus(&mut self, id: Option<Id>) { self.key_focus = id.filter(|id| self.index_of(*id).is_some()); }

    /// Reorders children by ascending draw priority. Children with equal priority keep their
    /// relative order.
    pub fn sort_by_draw_priority(&mut self) { self.children.sort_by_key(|c| c.state().draw_priority()); }

    fn index_of(&self, id: Id) -> Option<usize> { self.children.iter().position(|c| c.id() == id) }

    /// Index of the top-most drawn child containing the local point.
    pub fn child_at(&self, x: i32, y: i32) -> Option<usize> {
        self.children.iter().rposition(|c| c.is_drawn() && rect_contains(&c.rect(), x, y))
    }

    pub(crate) fn adopt(&mut self, child: Component, parent: &ComponentState) -> Id { self.adopt_sized(child, parent, parent.size()) }

    pub(crate) fn adopt_sized(&mut self, mut child: Component, parent: &ComponentState, size: Dimensioni) -> Id {
        child.attach(parent, size);
        let id = child.id();
        self.children.push(child);
        id
    }

    pub(crate) fn remove(&mut self, id: Id) -> bool {
        let index = match self.index_of(id) {
            Some(index) => index,
            None => return false,
        };
        let mut child = self.children.remove(index);
        if self.mouse_focus == Some(id) {
            self.mouse_focus = None;
        }
        if self.key_focus == Some(id) {
            self.key_focus = None;
        }
        child.detach();
        child.dispose();
        true
    }

    pub(crate) fn clear(&mut self) {
        self.mouse_focus = None;
        self.key_focus = None;
        for mut child in self.children.drain(..) {
            child.detach();
            child.dispose();
        }
    }

    pub(crate) fn dispose_all(&mut self) {
        self.mouse_focus = None;
        self.key_focus = None;
        for child in &mut self.children {
            child.dispose();
        }
    }

    pub(crate) fn resize_children(&mut self, size: Dimensioni) {
        for child in &mut self.children {
            child.resize_or_defer(size);
        }
    }

    pub(crate) fn needs_redraw(&self) -> bool { self.children.iter().any(|c| c.state().is_dirty() || (c.is_drawn() && c.needs_redraw())) }

    pub(crate) fn render_children(&mut self, pass: &mut RenderPass<'_>) {
        for child in &mut self.children {
            child.render(pass);
        }
    }

    /// Drops the mouse focus, sending an exit to the focused child.
    pub(crate) fn exit_focus(&mut self) {
        if let Some(index) = self.mouse_focus.take().and_then(|id| self.index_of(id)) {
            self.children[index].on_exit();
        }
    }

    fn update_mouse_focus(&mut self, x: i32, y: i32) -> Option<usize> {
        let hit = self.child_at(x, y);
        let hit_id = hit.map(|i| self.children[i].id());
        if hit_id != self.mouse_focus {
            if let Some(prev) = self.mouse_focus.and_then(|id| self.index_of(id)) {
                self.children[prev].on_exit();
            }
            if let Some(i) = hit {
                self.children[i].on_enter();
            }
            self.mouse_focus = hit_id;
        }
        hit
    }

    fn deliver(&mut self, index: usize, event: &WidgetEvent, ctx: &mut EventCtx) -> bool {
        let child = &mut self.children[index];
        let r = child.rect();
        child.handle(&event.translated(r.x, r.y), ctx)
    }

    fn holder_of(&self, id: Id) -> Option<usize> { self.children.iter().position(|c| c.exists_in_hierarchy(id)) }

    /// Routes a local-space event to the children. Returns `true` if a child consumed it.
    pub(crate) fn route(&mut self, event: &WidgetEvent, ctx: &mut EventCtx) -> bool {
        match *event {
            WidgetEvent::MouseMoved { x, y } => match self.update_mouse_focus(x, y) {
                Some(i) => self.deliver(i, event, ctx),
                None => false,
            },
            WidgetEvent::TouchDown { x, y, .. } => {
                self.key_focus = None;
                match self.update_mouse_focus(x, y) {
                    Some(i) if self.deliver(i, event, ctx) => {
                        self.key_focus = Some(self.children[i].id());
                        true
                    }
                    _ => false,
                }
            }
            WidgetEvent::TouchUp { .. } => {
                let origin = match ctx.touch_origin {
                    Some(origin) => origin,
                    None => return false,
                };
                match self.mouse_focus.and_then(|id| self.index_of(id)) {
                    Some(i) if self.children[i].exists_in_hierarchy(origin) => self.deliver(i, event, ctx),
                    _ => false,
                }
            }
            WidgetEvent::TouchDragged { .. } => match ctx.touch_origin.and_then(|origin| self.holder_of(origin)) {
                Some(i) => self.deliver(i, event, ctx),
                None => false,
            },
            WidgetEvent::Scrolled { x, y, .. } => match self.update_mouse_focus(x, y) {
                Some(i) => self.deliver(i, event, ctx),
                None => false,
            },
            WidgetEvent::KeyDown(_) | WidgetEvent::KeyUp(_) | WidgetEvent::KeyTyped(_) => match self.key_focus.and_then(|id| self.index_of(id)) {
                Some(i) => self.deliver(i, event, ctx),
                None => false,
            },
            WidgetEvent::Drop { x, y, .. } => match self.child_at(x, y) {
                Some(i) => self.deliver(i, event, ctx),
                None => false,
            },
            WidgetEvent::DragRelease { payload, .. } => match self.holder_of(payload.source) {
                Some(i) => self.deliver(i, event, ctx),
                None => false,
            },
            WidgetEvent::Enter | WidgetEvent::Exit => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn make_tree(log: &EventLog) -> (Component, Id, Id) {
        let mut root = Component::container("root").with_rect(rect(0, 0, 100, 100)).with_receiver(recorder(log, consume_none));
        let a = root.add_component(Component::new("a").with_rect(rect(0, 0, 50, 50)).with_receiver(recorder(log, consume_touch))).unwrap();
        let b = root.add_component(Component::new("b").with_rect(rect(40, 0, 50, 50)).with_receiver(recorder(log, consume_none))).unwrap();
        (root, a, b)
    }

    fn moved(x: i32, y: i32) -> WidgetEvent { WidgetEvent::MouseMoved { x, y } }

    #[test]
    fn hit_test_prefers_last_painted() {
        let log = event_log();
        let (root, _, b) = make_tree(&log);
        let c = root.as_container().unwrap();
        assert_eq!(c.child_at(45, 10).map(|i| c.children()[i].id()), Some(b));
        assert_eq!(c.child_at(95, 95), None);
    }

    #[test]
    fn exit_is_sent_before_enter() {
        let log = event_log();
        let (mut root, a, _) = make_tree(&log);
        let mut ctx = EventCtx::new();
        root.handle(&moved(10, 10), &mut ctx);
        assert_eq!(root.as_container().unwrap().mouse_focus(), Some(a));
        take(&log);
        root.handle(&moved(60, 10), &mut ctx);
        assert_eq!(take(&log), vec!["a:exit", "b:enter", "b:mouse-moved", "root:mouse-moved"]);
    }

    #[test]
    fn touch_down_sets_key_focus_and_origin() {
        let log = event_log();
        let (mut root, a, _) = make_tree(&log);
        let mut ctx = EventCtx::new();
        assert!(root.handle(&down(10, 10), &mut ctx));
        assert_eq!(ctx.touch_origin(), Some(a));
        assert_eq!(root.as_container().unwrap().key_focus(), Some(a));
        // A touch that no child consumes clears key focus.
        let mut ctx = EventCtx::new();
        assert!(!root.handle(&down(95, 95), &mut ctx));
        assert_eq!(root.as_container().unwrap().key_focus(), None);
        assert_eq!(ctx.touch_origin(), None);
    }

    #[test]
    fn touch_up_goes_only_to_the_origin_subtree() {
        let log = event_log();
        let (mut root, a, _) = make_tree(&log);
        let mut ctx = EventCtx::new();
        root.handle(&down(10, 10), &mut ctx);
        let origin = ctx.touch_origin();
        assert_eq!(origin, Some(a));
        // Pointer moved onto b: b is mouse-focused but did not receive the touch-down.
        root.handle(&moved(60, 10), &mut EventCtx::with_origin(origin));
        take(&log);
        assert!(!root.handle(&up(60, 10), &mut EventCtx::with_origin(origin)));
        assert_eq!(take(&log), vec!["root:touch-up"]);
        // Back over a, the release reaches it.
        root.handle(&moved(10, 10), &mut EventCtx::with_origin(origin));
        take(&log);
        assert!(root.handle(&up(10, 10), &mut EventCtx::with_origin(origin)));
        assert_eq!(take(&log), vec!["a:touch-up"]);
    }

    #[test]
    fn keys_go_to_key_focus_first() {
        let log = event_log();
        let (mut root, _, _) = make_tree(&log);
        root.handle(&down(10, 10), &mut EventCtx::new());
        take(&log);
        root.handle(&WidgetEvent::KeyDown(Key::Enter), &mut EventCtx::new());
        assert_eq!(take(&log), vec!["a:key-down", "root:key-down"]);
    }

    #[test]
    fn children_receive_local_coordinates() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
        let s = seen.clone();
        let mut root = Component::container("root").with_rect(rect(0, 0, 100, 100));
        let mut mid = Component::container("mid").with_rect(rect(20, 30, 60, 60));
        mid.add_component(Component::new("leaf").with_rect(rect(5, 5, 20, 20)).with_receiver(
            move |ev: &WidgetEvent, _: &mut ComponentState, _: &mut EventCtx| -> HandlerResult<bool> {
                *s.lock().unwrap() = ev.position().map(|p| (p.x, p.y));
                Ok(true)
            },
        ))
        .unwrap();
        root.add_component(mid).unwrap();
        assert!(root.handle(&down(30, 40), &mut EventCtx::new()));
        assert_eq!(*seen.lock().unwrap(), Some((5, 5)));
    }

    #[test]
    fn remove_clears_focus_and_disposes() {
        let log = event_log();
        let (mut root, a, b) = make_tree(&log);
        root.handle(&down(10, 10), &mut EventCtx::new());
        assert!(root.remove_component(a));
        assert!(!root.remove_component(a));
        let c = root.as_container().unwrap();
        assert_eq!((c.mouse_focus(), c.key_focus()), (None, None));
        assert_eq!(root.component_count(), 1);
        assert!(root.find(b).is_some());
        root.clear_components();
        assert_eq!(root.component_count(), 0);
    }

    #[test]
    fn draw_priority_sort_is_stable() {
        let mut root = Component::container("root").with_rect(rect(0, 0, 10, 10));
        for (name, prio) in [("x", 2), ("y", 0), ("z", 2), ("w", 1)] {
            root.add_component(Component::new(name).with_draw_priority(prio)).unwrap();
        }
        root.as_container_mut().unwrap().sort_by_draw_priority();
        let names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn hidden_children_are_not_hit() {
        let log = event_log();
        let (mut root, _, b) = make_tree(&log);
        root.find_mut(b).unwrap().set_hidden(true);
        let c = root.as_container().unwrap();
        assert_eq!(c.child_at(45, 10).map(|i| c.children()[i].name().to_string()), Some("a".to_string()));
    }
}
