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
//! Scroll regions: a viewport onto content that may be larger than it.
//!
//! Two flavors exist. A *scrollable* has a fixed content size set by its owner. A *scroll panel*
//! stacks its children along one axis and grows its virtual extent to fit them. Both keep the
//! invariant `virtual >= viewport` and `0 <= offset <= virtual - viewport` on every axis.

use super::*;
use crate::render_cache::{ReleaseQueue, RenderPass};
use crate::scrollbar::*;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Axes a scroll region may scroll along.
    pub struct ScrollAxes : u32 {
        /// Vertical scrolling.
        const VERTICAL = 2;
        /// Horizontal scrolling.
        const HORIZONTAL = 1;
        /// Both axes.
        const BOTH = 3;
    }
}

impl ScrollAxes {
    /// Returns `true` if vertical scrolling is enabled.
    pub fn is_vertical(&self) -> bool { self.intersects(Self::VERTICAL) }
    /// Returns `true` if horizontal scrolling is enabled.
    pub fn is_horizontal(&self) -> bool { self.intersects(Self::HORIZONTAL) }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Distance moved by one wheel notch or arrow key.
pub enum ScrollStep {
    /// A fixed number of pixels.
    Fixed(i32),
    /// Half of the viewport extent along the scrolled axis.
    HalfViewport,
}

impl ScrollStep {
    fn parse(s: &str) -> Option<ScrollStep> {
        match s.trim() {
            "half" => Some(ScrollStep::HalfViewport),
            n => n.parse().ok().map(ScrollStep::Fixed),
        }
    }

    fn pixels(self, view_len: i32) -> i32 {
        match self {
            ScrollStep::Fixed(n) => n,
            ScrollStep::HalfViewport => (view_len / 2).max(1),
        }
    }
}

#[derive(Copy, Clone)]
enum Flavor {
    Fixed { content: Dimensioni },
    Panel { axis: Axis, gap: i32 },
}

/// Capability of exposing a scroll offset over a virtual extent.
pub trait Scrollable {
    /// Current offset of the viewport inside the virtual content.
    fn scroll_offset(&self) -> Vec2i;
    /// Moves the viewport, clamping to the valid range.
    fn scroll_to(&mut self, x: i32, y: i32);
    /// Moves the viewport relative to its current position.
    fn scroll_by(&mut self, dx: i32, dy: i32) {
        let o = self.scroll_offset();
        self.scroll_to(o.x + dx, o.y + dy);
    }
    /// Size of the virtual content.
    fn virtual_size(&self) -> Dimensioni;
    /// Size of the visible window onto the content.
    fn viewport(&self) -> Dimensioni;
}

struct BarSkin {
    image: Option<String>,
    color: Color,
}

impl Paintable for BarSkin {
    fn paint(&mut self, painter: &mut Painter<'_>, _state: &ComponentState) -> HandlerResult {
        let bounds = painter.bounds();
        match &self.image {
            Some(name) => painter.draw_image_or(name, bounds, Color::WHITE, self.color),
            None => painter.draw_rect(bounds, self.color),
        }
        Ok(())
    }
}

struct Bar {
    axis: Axis,
    track: Component,
    thumb: Component,
    visible: bool,
}

impl Bar {
    fn new(axis: Axis) -> Self {
        let name = match axis {
            Axis::Horizontal => "h",
            Axis::Vertical => "v",
        };
        Self {
            axis,
            track: Component::new(format!("{name}-track")).with_skin(BarSkin { image: None, color: color(0, 0, 0, 64) }),
            thumb: Component::new(format!("{name}-thumb")).with_skin(BarSkin { image: None, color: color(255, 255, 255, 140) }),
            visible: false,
        }
    }
}

#[derive(Copy, Clone)]
struct Grab {
    axis: Axis,
    // distance from the thumb start to the pointer when grabbed
    delta: i32,
}

/// Viewport, virtual extent, scroll offset and synthesized bars of a scroll component.
pub struct ScrollRegion {
    content: Container,
    axes: ScrollAxes,
    flavor: Flavor,
    viewport: Dimensioni,
    virtual_size: Dimensioni,
    offset: Vec2i,
    bar_size: i32,
    bar_min_size: i32,
    step: ScrollStep,
    wheel_scroll: bool,
    key_scroll: bool,
    bars: Vec<Bar>,
    grab: Option<Grab>,
    content_target: Option<TargetKey>,
    releases: Option<ReleaseQueue>,
    dirty: bool,
}

impl ScrollRegion {
    fn with_flavor(axes: ScrollAxes, flavor: Flavor) -> Self {
        let mut bars = Vec::new();
        if axes.is_vertical() {
            bars.push(Bar::new(Axis::Vertical));
        }
        if axes.is_horizontal() {
            bars.push(Bar::new(Axis::Horizontal));
        }
        Self {
            content: Container::new(),
            axes,
            flavor,
            viewport: dim(0, 0),
            virtual_size: dim(0, 0),
            offset: vec2(0, 0),
            bar_size: 8,
            bar_min_size: 16,
            step: ScrollStep::Fixed(20),
            wheel_scroll: true,
            key_scroll: true,
            bars,
            grab: None,
            content_target: None,
            releases: None,
            dirty: true,
        }
    }

    /// Region over content of a fixed size.
    pub fn fixed(axes: ScrollAxes, content: Dimensioni) -> Self { Self::with_flavor(axes, Flavor::Fixed { content }) }

    /// Region stacking its children along `axis` with `gap` pixels around each child.
    pub fn panel(axis: Axis, gap: i32) -> Self {
        let axes = match axis {
            Axis::Horizontal => ScrollAxes::HORIZONTAL,
            Axis::Vertical => ScrollAxes::VERTICAL,
        };
        Self::with_flavor(axes, Flavor::Panel { axis, gap: gap.max(0) })
    }

    /// The content container.
    pub fn content(&self) -> &Container { &self.content }

    /// The content container, mutably. Call [`ScrollRegion::relayout`] after changing children.
    pub fn content_mut(&mut self) -> &mut Container { &mut self.content }

    /// Enabled axes.
    pub fn axes(&self) -> ScrollAxes { self.axes }

    /// Thickness of the bars.
    pub fn bar_size(&self) -> i32 { self.bar_size }

    /// Sets the bar thickness.
    pub fn set_bar_size(&mut self, size: i32) {
        self.bar_size = size.max(0);
        self.update_bars();
    }

    /// Minimum thumb length.
    pub fn bar_min_size(&self) -> i32 { self.bar_min_size }

    /// Sets the minimum thumb length.
    pub fn set_bar_min_size(&mut self, size: i32) {
        self.bar_min_size = size.max(0);
        self.update_bars();
    }

    /// Wheel and arrow-key increment.
    pub fn step(&self) -> ScrollStep { self.step }

    /// Sets the wheel and arrow-key increment.
    pub fn set_step(&mut self, step: ScrollStep) { self.step = step; }

    /// Enables or disables wheel scrolling.
    pub fn set_wheel_scroll(&mut self, enabled: bool) { self.wheel_scroll = enabled; }

    /// Enables or disables keyboard scrolling.
    pub fn set_key_scroll(&mut self, enabled: bool) { self.key_scroll = enabled; }

    /// Gap between stacked children, for panels.
    pub fn gap(&self) -> Option<i32> {
        match self.flavor {
            Flavor::Panel { gap, .. } => Some(gap),
            Flavor::Fixed { .. } => None,
        }
    }

    /// Changes the content size of a fixed region and re-lays the children out against it.
    pub fn set_content_size(&mut self, size: Dimensioni) {
        if let Flavor::Fixed { content } = &mut self.flavor {
            *content = size;
            let layout = self.layout_size();
            self.content.resize_children(layout);
            self.relayout();
        }
    }

    /// Returns `true` while the bar for `axis` is shown.
    pub fn bar_visible(&self, axis: Axis) -> bool { self.bars.iter().any(|b| b.axis == axis && b.visible) }

    /// Track rectangle of the bar for `axis`, in viewport coordinates.
    pub fn track_rect(&self, axis: Axis) -> Option<Recti> { self.bars.iter().find(|b| b.axis == axis && b.visible).map(|b| b.track.rect()) }

    /// Thumb rectangle of the bar for `axis`, in viewport coordinates.
    pub fn thumb_rect(&self, axis: Axis) -> Option<Recti> { self.bars.iter().find(|b| b.axis == axis && b.visible).map(|b| b.thumb.rect()) }

    /// Space children are laid out in: the content size for fixed regions, the viewport for
    /// panels (their main-axis position is then assigned by stacking).
    fn layout_size(&self) -> Dimensioni {
        match self.flavor {
            Flavor::Fixed { content } => dim(content.width.max(self.viewport.width), content.height.max(self.viewport.height)),
            Flavor::Panel { .. } => self.viewport,
        }
    }

    pub(crate) fn apply_record(&mut self, record: &ConfigRecord) {
        self.bar_size = record.int_or("bar-size", self.bar_size).max(0);
        self.bar_min_size = record.int_or("bar-min-size", self.bar_min_size).max(0);
        if let Some(raw) = record.get("scroll-step") {
            match ScrollStep::parse(raw) {
                Some(step) => self.step = step,
                None => log::warn!("{}: invalid value `{raw}` for `scroll-step` (expected an integer or `half`); using default", record.name()),
            }
        }
        self.wheel_scroll = record.bool_or("wheel-scroll", self.wheel_scroll);
        self.key_scroll = record.bool_or("key-scroll", self.key_scroll);
        match &mut self.flavor {
            Flavor::Panel { gap, .. } => *gap = record.int_or("gap", *gap).max(0),
            Flavor::Fixed { content } => {
                content.width = record.int_or("content-width", content.width);
                content.height = record.int_or("content-height", content.height);
            }
        }
        for bar in &mut self.bars {
            let track_image = record.get("track-image").map(String::from);
            let thumb_image = record.get("thumb-image").map(String::from);
            let track_color = record.color_or("track-color", color(0, 0, 0, 64));
            let thumb_color = record.color_or("thumb-color", color(255, 255, 255, 140));
            bar.track.set_skin(BarSkin { image: track_image, color: track_color });
            bar.thumb.set_skin(BarSkin { image: thumb_image, color: thumb_color });
        }
        self.dirty = true;
    }

    pub(crate) fn set_manager(&mut self, manager: Option<ManagerRef>) {
        for bar in &mut self.bars {
            bar.track.set_manager(manager.clone());
            bar.thumb.set_manager(manager.clone());
        }
    }

    pub(crate) fn adopt(&mut self, child: Component, owner: &ComponentState) -> Id {
        let size = self.layout_size();
        let id = self.content.adopt_sized(child, owner, size);
        self.relayout();
        id
    }

    pub(crate) fn remove(&mut self, id: Id) -> bool {
        let removed = self.content.remove(id);
        if removed {
            self.relayout();
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.content.clear();
        self.relayout();
    }

    pub(crate) fn resize(&mut self, viewport: Dimensioni) {
        self.viewport = viewport;
        let layout = self.layout_size();
        self.content.resize_children(layout);
        self.relayout();
    }

    /// Recomputes the virtual extent (stacking children for panels), clamps the offset and
    /// updates the bars.
    pub fn relayout(&mut self) {
        let vp = self.viewport;
        self.virtual_size = match self.flavor {
            Flavor::Fixed { content } => dim(
                if self.axes.is_horizontal() { content.width.max(vp.width) } else { vp.width },
                if self.axes.is_vertical() { content.height.max(vp.height) } else { vp.height },
            ),
            Flavor::Panel { axis, gap } => {
                let mut pos = gap;
                for child in self.content.children_mut().iter_mut().filter(|c| c.is_enabled() && !c.is_hidden()) {
                    let r = child.rect();
                    match axis {
                        Axis::Vertical => child.state_mut().set_position(r.x, pos),
                        Axis::Horizontal => child.state_mut().set_position(pos, r.y),
                    }
                    pos += axis.len(r) + gap;
                }
                match axis {
                    Axis::Vertical => dim(vp.width, pos.max(vp.height)),
                    Axis::Horizontal => dim(pos.max(vp.width), vp.height),
                }
            }
        };
        self.dirty = true;
        self.clamp_offset();
        self.update_bars();
    }

    fn max_offset(&self) -> Vec2i {
        vec2(
            scrollbar_max_scroll(self.virtual_size.width, self.viewport.width),
            scrollbar_max_scroll(self.virtual_size.height, self.viewport.height),
        )
    }

    fn clamp_offset(&mut self) {
        let max = self.max_offset();
        let x = if self.axes.is_horizontal() { self.offset.x.clamp(0, max.x) } else { 0 };
        let y = if self.axes.is_vertical() { self.offset.y.clamp(0, max.y) } else { 0 };
        self.offset = vec2(x, y);
    }

    fn update_bars(&mut self) {
        let vp = self.viewport;
        let virt = self.virtual_size;
        let shown: Vec<bool> = self.bars.iter().map(|b| b.axis.extent(virt) > b.axis.extent(vp)).collect();
        let any_other = |axis: Axis| self.bars.iter().zip(&shown).any(|(b, s)| b.axis != axis && *s);
        let corners: Vec<bool> = self.bars.iter().map(|b| any_other(b.axis)).collect();
        for ((bar, shown), corner) in self.bars.iter_mut().zip(shown).zip(corners) {
            bar.visible = shown && self.bar_size > 0;
            if !bar.visible {
                continue;
            }
            let track = scrollbar_track(bar.axis, vp, self.bar_size, corner);
            let view_len = bar.axis.extent(vp);
            let content_len = bar.axis.extent(virt);
            let thumb = scrollbar_thumb(bar.axis, track, view_len, content_len, bar.axis.along(self.offset), self.bar_min_size);
            if !same_rect(bar.track.rect(), track) {
                bar.track.state_mut().set_rect(track);
            }
            if !same_rect(bar.thumb.rect(), thumb) {
                bar.thumb.state_mut().set_rect(thumb);
            }
        }
    }

    pub(crate) fn is_grabbing(&self) -> bool { self.grab.is_some() }

    pub(crate) fn release_grab(&mut self) { self.grab = None; }

    pub(crate) fn needs_redraw(&self) -> bool {
        self.dirty || self.content.needs_redraw() || self.bars.iter().filter(|b| b.visible).any(|b| b.track.needs_redraw() || b.thumb.needs_redraw())
    }

    pub(crate) fn render(&mut self, pass: &mut RenderPass<'_>, owner: Id, viewport: Dimensioni) {
        if self.releases.is_none() {
            self.releases = Some(pass.cache.release_queue());
        }
        let virt = self.virtual_size;
        if virt.width > 0 && virt.height > 0 {
            if self.content.needs_redraw() || pass.cache.is_stale(self.content_target, virt) {
                let content = &mut self.content;
                pass.rebuild(&mut self.content_target, owner, virt, |pass| content.render_children(pass));
            }
            if let Some(key) = self.content_target {
                let src = rect(self.offset.x, self.offset.y, viewport.width.min(virt.width), viewport.height.min(virt.height));
                pass.composite(key, src, rect(0, 0, src.width, src.height));
            }
        }
        for bar in self.bars.iter_mut().filter(|b| b.visible) {
            bar.track.render(pass);
            bar.thumb.render(pass);
        }
        self.dirty = false;
    }

    pub(crate) fn dispose(&mut self) {
        if let (Some(queue), Some(key)) = (self.releases.as_ref(), self.content_target.take()) {
            queue.release(key);
        }
        for bar in &mut self.bars {
            bar.track.dispose();
            bar.thumb.dispose();
        }
        self.content.dispose_all();
    }

    fn set_axis_offset(&mut self, axis: Axis, value: i32) {
        let o = self.offset;
        match axis {
            Axis::Horizontal => self.scroll_to(value, o.y),
            Axis::Vertical => self.scroll_to(o.x, value),
        }
    }

    fn page_toward(&mut self, axis: Axis, pointer: i32, thumb: Recti) {
        let half = (axis.extent(self.viewport) / 2).max(1);
        let current = axis.along(self.offset);
        if pointer < axis.start(thumb) {
            self.set_axis_offset(axis, current - half);
        } else if pointer >= axis.start(thumb) + axis.len(thumb) {
            self.set_axis_offset(axis, current + half);
        }
    }

    fn drag_thumb(&mut self, grab: Grab, p: Vec2i) {
        let Some(bar) = self.bars.iter().find(|b| b.axis == grab.axis) else { return };
        let track = bar.track.rect();
        let thumb = bar.thumb.rect();
        let pos = grab.axis.along(p) - grab.delta - grab.axis.start(track);
        let max = grab.axis.along(self.max_offset());
        let value = scrollbar_offset_for_thumb(pos, grab.axis.len(track), grab.axis.len(thumb), max);
        self.set_axis_offset(grab.axis, value);
    }

    fn bar_hit(&self, x: i32, y: i32) -> Option<(Axis, Recti, bool)> {
        self.bars.iter().filter(|b| b.visible).find_map(|b| {
            let thumb = b.thumb.rect();
            if rect_contains(&thumb, x, y) {
                Some((b.axis, thumb, true))
            } else if rect_contains(&b.track.rect(), x, y) {
                Some((b.axis, thumb, false))
            } else {
                None
            }
        })
    }

    fn scroll_key(&mut self, key: Key) -> bool {
        let primary = if self.axes.is_vertical() { Axis::Vertical } else { Axis::Horizontal };
        let step = |axis: Axis| self.step.pixels(axis.extent(self.viewport));
        let half = |axis: Axis| (axis.extent(self.viewport) / 2).max(1);
        let (dx, dy) = match key {
            Key::Up if self.axes.is_vertical() => (0, -step(Axis::Vertical)),
            Key::Down if self.axes.is_vertical() => (0, step(Axis::Vertical)),
            Key::Left if self.axes.is_horizontal() => (-step(Axis::Horizontal), 0),
            Key::Right if self.axes.is_horizontal() => (step(Axis::Horizontal), 0),
            Key::PageUp => match primary {
                Axis::Vertical => (0, -half(Axis::Vertical)),
                Axis::Horizontal => (-half(Axis::Horizontal), 0),
            },
            Key::PageDown => match primary {
                Axis::Vertical => (0, half(Axis::Vertical)),
                Axis::Horizontal => (half(Axis::Horizontal), 0),
            },
            Key::Home => {
                self.set_axis_offset(primary, 0);
                return true;
            }
            Key::End => {
                let max = primary.along(self.max_offset());
                self.set_axis_offset(primary, max);
                return true;
            }
            _ => return false,
        };
        self.scroll_by(dx, dy);
        true
    }

    /// Routes an event in the scroll component's local (viewport) space: bars first, then the
    /// content translated by the scroll offset, then wheel and key scrolling.
    pub(crate) fn route(&mut self, event: &WidgetEvent, state: &mut ComponentState, ctx: &mut EventCtx) -> bool {
        let to_content = event.translated(-self.offset.x, -self.offset.y);
        match *event {
            WidgetEvent::TouchDown { x, y, .. } => {
                if let Some((axis, thumb, on_thumb)) = self.bar_hit(x, y) {
                    if on_thumb {
                        self.grab = Some(Grab { axis, delta: axis.along(vec2(x, y)) - axis.start(thumb) });
                    } else {
                        self.page_toward(axis, axis.along(vec2(x, y)), thumb);
                    }
                    ctx.touch_origin.get_or_insert(state.id());
                    return true;
                }
                self.content.route(&to_content, ctx)
            }
            WidgetEvent::TouchDragged { x, y, .. } | WidgetEvent::MouseMoved { x, y } if self.grab.is_some() => {
                if let Some(grab) = self.grab {
                    self.drag_thumb(grab, vec2(x, y));
                }
                true
            }
            WidgetEvent::TouchUp { .. } | WidgetEvent::DragRelease { .. } if self.grab.is_some() => {
                self.grab = None;
                true
            }
            WidgetEvent::Scrolled { dx, dy, .. } => {
                if self.content.route(&to_content, ctx) {
                    return true;
                }
                if !self.wheel_scroll {
                    return false;
                }
                let sx = if self.axes.is_horizontal() { dx * self.step.pixels(self.viewport.width) } else { 0 };
                let sy = if self.axes.is_vertical() { dy * self.step.pixels(self.viewport.height) } else { 0 };
                if sx == 0 && sy == 0 {
                    return false;
                }
                self.scroll_by(sx, sy);
                true
            }
            WidgetEvent::KeyDown(key) => {
                if self.content.route(event, ctx) {
                    return true;
                }
                self.key_scroll && self.scroll_key(key)
            }
            WidgetEvent::KeyUp(_) | WidgetEvent::KeyTyped(_) => self.content.route(event, ctx),
            _ => self.content.route(&to_content, ctx),
        }
    }
}

fn same_rect(a: Recti, b: Recti) -> bool { (a.x, a.y, a.width, a.height) == (b.x, b.y, b.width, b.height) }

impl Scrollable for ScrollRegion {
    fn scroll_offset(&self) -> Vec2i { self.offset }

    fn scroll_to(&mut self, x: i32, y: i32) {
        let before = self.offset;
        self.offset = vec2(x, y);
        self.clamp_offset();
        if (before.x, before.y) != (self.offset.x, self.offset.y) {
            self.dirty = true;
            self.update_bars();
        }
    }

    fn virtual_size(&self) -> Dimensioni { self.virtual_size }

    fn viewport(&self) -> Dimensioni { self.viewport }
}

impl ScrollRegion {
    /// Current scroll offset.
    pub fn offset(&self) -> Vec2i { self.offset }
}

impl Component {
    /// Creates a scroll component over content of a fixed size.
    pub fn scrollable(name: impl Into<String>, axes: ScrollAxes, content: Dimensioni) -> Self {
        Self::with_kind(name, Kind::Scroll(Box::new(ScrollRegion::fixed(axes, content))))
    }

    /// Creates a scroll panel stacking its children along `axis`.
    pub fn scroll_panel(name: impl Into<String>, axis: Axis, gap: i32) -> Self {
        Self::with_kind(name, Kind::Scroll(Box::new(ScrollRegion::panel(axis, gap))))
    }
}

impl Scrollable for Component {
    fn scroll_offset(&self) -> Vec2i { self.as_scroll().map(|s| s.offset()).unwrap_or(vec2(0, 0)) }

    fn scroll_to(&mut self, x: i32, y: i32) {
        match &mut self.kind {
            Kind::Scroll(s) => s.scroll_to(x, y),
            _ => log::warn!("{}: not a scroll region; ignoring scroll_to", self.state.name()),
        }
    }

    fn virtual_size(&self) -> Dimensioni { self.as_scroll().map(|s| s.virtual_size()).unwrap_or(self.state().size()) }

    fn viewport(&self) -> Dimensioni { self.state().size() }
}
