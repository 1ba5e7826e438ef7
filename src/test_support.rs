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
//! Test-only graphics backend and widget helpers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use super::*;

type Rect4 = (i32, i32, i32, i32);

fn r4(r: Recti) -> Rect4 { (r.x, r.y, r.width, r.height) }

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Begin,
    End,
    Texture(TextureId, Rect4, Rect4),
    Target(RenderTargetId, Rect4, Rect4),
    Fill(Rect4, Color),
    Create(RenderTargetId, (i32, i32)),
    Resize(RenderTargetId, (i32, i32)),
    Destroy(RenderTargetId),
    Push(RenderTargetId),
    Pop,
    Blend(bool),
}

/// Graphics backend that records every call.
pub struct RecordingGraphics {
    pub ops: Vec<Op>,
    pub live: HashMap<RenderTargetId, (i32, i32)>,
    pub viewport: Dimensioni,
    pub owner: ThreadId,
    next_target: u64,
    depth: usize,
}

impl RecordingGraphics {
    pub fn new() -> Self { Self::with_viewport(800, 600) }

    pub fn with_viewport(w: i32, h: i32) -> Self {
        Self {
            ops: Vec::new(),
            live: HashMap::new(),
            viewport: dim(w, h),
            owner: std::thread::current().id(),
            next_target: 1,
            depth: 0,
        }
    }

    pub fn count(&self, f: impl Fn(&Op) -> bool) -> usize { self.ops.iter().filter(|op| f(op)).count() }

    pub fn creates(&self) -> usize { self.count(|op| matches!(op, Op::Create(..))) }

    pub fn pushes(&self) -> usize { self.count(|op| matches!(op, Op::Push(_))) }

    pub fn fills(&self) -> Vec<(Rect4, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill(r, c) => Some((*r, *c)),
                _ => None,
            })
            .collect()
    }

    pub fn depth(&self) -> usize { self.depth }

    pub fn clear(&mut self) { self.ops.clear(); }
}

impl GraphicsContext for RecordingGraphics {
    fn begin_batch(&mut self) { self.ops.push(Op::Begin); }
    fn end_batch(&mut self) { self.ops.push(Op::End); }
    fn draw_texture(&mut self, texture: TextureId, src: Recti, dst: Recti, _opts: DrawOptions, _tint: Color) {
        self.ops.push(Op::Texture(texture, r4(src), r4(dst)));
    }
    fn draw_target(&mut self, target: RenderTargetId, src: Recti, dst: Recti) {
        assert!(self.live.contains_key(&target), "drawing a destroyed target");
        self.ops.push(Op::Target(target, r4(src), r4(dst)));
    }
    fn fill_rect(&mut self, rect: Recti, color: Color) { self.ops.push(Op::Fill(r4(rect), color)); }
    fn create_target(&mut self, size: Dimensioni) -> RenderTargetId {
        let id = RenderTargetId(self.next_target);
        self.next_target += 1;
        self.live.insert(id, (size.width, size.height));
        self.ops.push(Op::Create(id, (size.width, size.height)));
        id
    }
    fn resize_target(&mut self, target: RenderTargetId, size: Dimensioni) {
        self.live.insert(target, (size.width, size.height));
        self.ops.push(Op::Resize(target, (size.width, size.height)));
    }
    fn destroy_target(&mut self, target: RenderTargetId) {
        self.live.remove(&target);
        self.ops.push(Op::Destroy(target));
    }
    fn push_target(&mut self, target: RenderTargetId) {
        self.depth += 1;
        self.ops.push(Op::Push(target));
    }
    fn pop_target(&mut self) {
        assert!(self.depth > 0, "unbalanced pop");
        self.depth -= 1;
        self.ops.push(Op::Pop);
    }
    fn set_blending(&mut self, enabled: bool) { self.ops.push(Op::Blend(enabled)); }
    fn viewport(&self) -> Dimensioni { self.viewport }
    fn delta_time(&self) -> f32 { 1.0 / 60.0 }
    fn owner_thread(&self) -> ThreadId { self.owner }
}

/// Skin that fills its bounds and counts paints.
pub struct CountingSkin {
    pub paints: Arc<AtomicUsize>,
    pub fill: Color,
}

impl CountingSkin {
    pub fn new(fill: Color) -> (Self, Arc<AtomicUsize>) {
        let paints = Arc::new(AtomicUsize::new(0));
        (Self { paints: paints.clone(), fill }, paints)
    }
}

impl Paintable for CountingSkin {
    fn paint(&mut self, painter: &mut Painter<'_>, _state: &ComponentState) -> HandlerResult {
        self.paints.fetch_add(1, Ordering::SeqCst);
        let bounds = painter.bounds();
        painter.draw_rect(bounds, self.fill);
        Ok(())
    }
}

/// Shared event log written by [`recorder`] receivers.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog { Arc::new(Mutex::new(Vec::new())) }

/// Receiver that logs `"<name>:<kind>"` and consumes according to `consume`.
pub fn recorder(log: &EventLog, consume: fn(&WidgetEvent) -> bool) -> impl InputReceiver + 'static {
    let log = log.clone();
    move |ev: &WidgetEvent, state: &mut ComponentState, _ctx: &mut EventCtx| -> HandlerResult<bool> {
        log.lock().unwrap().push(format!("{}:{}", state.name(), ev.kind()));
        Ok(consume(ev))
    }
}

pub fn consume_all(_: &WidgetEvent) -> bool { true }

pub fn consume_none(_: &WidgetEvent) -> bool { false }

pub fn consume_touch(ev: &WidgetEvent) -> bool { matches!(ev, WidgetEvent::TouchDown { .. } | WidgetEvent::TouchUp { .. }) }

pub fn entries(log: &EventLog) -> Vec<String> { log.lock().unwrap().clone() }

pub fn take(log: &EventLog) -> Vec<String> { std::mem::take(&mut *log.lock().unwrap()) }

pub fn init_logger() { let _ = env_logger::builder().is_test(true).try_init(); }

pub fn down(x: i32, y: i32) -> WidgetEvent { WidgetEvent::TouchDown { x, y, pointer: 0, button: MouseButton::LEFT } }

pub fn up(x: i32, y: i32) -> WidgetEvent { WidgetEvent::TouchUp { x, y, pointer: 0, button: MouseButton::LEFT } }
