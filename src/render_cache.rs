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
//! Offscreen render targets owned by components.
//!
//! Targets live in a generation-checked arena. Components hold the [`TargetKey`] of their own
//! target; disposal only queues the key, the backend target is destroyed on the next render pass
//! because destruction must happen on the graphics thread.

use std::sync::Arc;
use std::thread::ThreadId;

use parking_lot::Mutex;
use slotmap::SlotMap;

use super::*;

slotmap::new_key_type! {
    /// Generation-checked handle to a cached render target.
    pub struct TargetKey;
}

struct CachedTarget {
    backend: RenderTargetId,
    size: Dimensioni,
    owner: Id,
}

/// Queue of target keys released by disposed components, drained on the graphics thread.
#[derive(Clone, Default)]
pub struct ReleaseQueue(Arc<Mutex<Vec<TargetKey>>>);

impl ReleaseQueue {
    /// Queues `key` for destruction.
    pub fn release(&self, key: TargetKey) { self.0.lock().push(key); }

    fn drain(&self) -> Vec<TargetKey> { std::mem::take(&mut *self.0.lock()) }

    /// Number of keys waiting to be destroyed.
    pub fn pending(&self) -> usize { self.0.lock().len() }
}

/// Arena of offscreen render targets plus the push/pop stack used while rebuilding them.
pub struct RenderCache {
    targets: SlotMap<TargetKey, CachedTarget>,
    stack: Vec<TargetKey>,
    releases: ReleaseQueue,
    owner_thread: ThreadId,
}

impl RenderCache {
    /// Creates a cache whose targets may only be touched from `owner_thread`.
    pub fn new(owner_thread: ThreadId) -> Self {
        Self { targets: SlotMap::with_key(), stack: Vec::new(), releases: ReleaseQueue::default(), owner_thread }
    }

    /// Queue components use to hand back their keys on disposal.
    pub fn release_queue(&self) -> ReleaseQueue { self.releases.clone() }

    /// Thread allowed to create, resize and destroy targets.
    pub fn owner_thread(&self) -> ThreadId { self.owner_thread }

    /// Returns `Err(WrongThread)` when called off the owning thread.
    pub fn check_thread(&self) -> UiResult<()> {
        if std::thread::current().id() == self.owner_thread { Ok(()) } else { Err(UiError::WrongThread) }
    }

    /// Number of live targets.
    pub fn len(&self) -> usize { self.targets.len() }

    /// Returns `true` when no target is alive.
    pub fn is_empty(&self) -> bool { self.targets.is_empty() }

    /// Depth of the push stack.
    pub fn depth(&self) -> usize { self.stack.len() }

    /// Returns `true` if `key` still refers to a live target.
    pub fn contains(&self, key: TargetKey) -> bool { self.targets.contains_key(key) }

    /// Component owning the target behind `key`.
    pub fn owner_of(&self, key: TargetKey) -> Option<Id> { self.targets.get(key).map(|t| t.owner) }

    /// Size of the target behind `key`.
    pub fn size_of(&self, key: TargetKey) -> Option<Dimensioni> { self.targets.get(key).map(|t| t.size) }

    /// Returns `true` when `key` is absent, stale, or sized differently from `size`.
    pub fn is_stale(&self, key: Option<TargetKey>, size: Dimensioni) -> bool {
        match key.and_then(|k| self.targets.get(k)) {
            Some(t) => t.size.width != size.width || t.size.height != size.height,
            None => true,
        }
    }

    /// Makes sure `slot` refers to a live target of exactly `size`, creating or resizing as needed.
    pub fn ensure(&mut self, gfx: &mut dyn GraphicsContext, slot: &mut Option<TargetKey>, owner: Id, size: Dimensioni) -> UiResult<TargetKey> {
        self.check_thread()?;
        if let Some(key) = *slot {
            if let Some(t) = self.targets.get_mut(key) {
                if t.size.width != size.width || t.size.height != size.height {
                    log::trace!("resizing target of {owner} to {}x{}", size.width, size.height);
                    gfx.resize_target(t.backend, size);
                    t.size = size;
                }
                return Ok(key);
            }
        }
        let backend = gfx.create_target(size);
        let key = self.targets.insert(CachedTarget { backend, size, owner });
        log::trace!("created target for {owner} ({}x{})", size.width, size.height);
        *slot = Some(key);
        Ok(key)
    }

    /// Binds `key` as the drawing destination. Returns `false` for a dead key.
    pub fn push(&mut self, gfx: &mut dyn GraphicsContext, key: TargetKey) -> bool {
        match self.targets.get(key) {
            Some(t) => {
                gfx.push_target(t.backend);
                self.stack.push(key);
                true
            }
            None => false,
        }
    }

    /// Restores the previous destination.
    pub fn pop(&mut self, gfx: &mut dyn GraphicsContext) {
        if self.stack.pop().is_some() {
            gfx.pop_target();
        }
    }

    /// Draws `src` of the target behind `key` into `dst` of the current destination.
    pub fn composite(&self, gfx: &mut dyn GraphicsContext, key: TargetKey, src: Recti, dst: Recti) {
        if let Some(t) = self.targets.get(key) {
            gfx.draw_target(t.backend, src, dst);
        }
    }

    /// Destroys the target behind `key` immediately.
    pub fn release(&mut self, gfx: &mut dyn GraphicsContext, key: TargetKey) {
        if let Some(t) = self.targets.remove(key) {
            log::trace!("destroying target of {}", t.owner);
            gfx.destroy_target(t.backend);
        }
    }

    /// Destroys every target queued by disposed components. Returns how many were destroyed.
    pub fn collect_released(&mut self, gfx: &mut dyn GraphicsContext) -> usize {
        let keys = self.releases.drain();
        let before = self.targets.len();
        for key in keys {
            self.release(gfx, key);
        }
        before - self.targets.len()
    }

    /// Destroys every target.
    pub fn clear(&mut self, gfx: &mut dyn GraphicsContext) {
        self.releases.drain();
        for (_, t) in self.targets.drain() {
            gfx.destroy_target(t.backend);
        }
        self.stack.clear();
    }
}

/// State threaded through one render pass.
pub struct RenderPass<'a> {
    pub(crate) gfx: &'a mut dyn GraphicsContext,
    pub(crate) cache: &'a mut RenderCache,
    pub(crate) atlas: &'a dyn TextureAtlas,
    pub(crate) delta: f32,
    pub(crate) rebuilds: usize,
}

impl<'a> RenderPass<'a> {
    /// Starts a pass drawing into whatever destination `gfx` currently has bound.
    pub fn new(gfx: &'a mut dyn GraphicsContext, cache: &'a mut RenderCache, atlas: &'a dyn TextureAtlas) -> Self {
        let delta = gfx.delta_time();
        Self { gfx, cache, atlas, delta, rebuilds: 0 }
    }

    /// Number of cached targets rebuilt so far in this pass.
    pub fn rebuilds(&self) -> usize { self.rebuilds }

    /// Seconds elapsed since the previous frame.
    pub fn delta(&self) -> f32 { self.delta }

    pub(crate) fn painter(&mut self, size: Dimensioni) -> Painter<'_> { Painter::new(&mut *self.gfx, self.atlas, size) }

    /// Rebuilds `slot` at `size` by pushing it, running `draw`, and popping it again. The pop
    /// happens even when `draw` fails. Returns the key, or `None` when the target could not be
    /// allocated.
    pub(crate) fn rebuild(&mut self, slot: &mut Option<TargetKey>, owner: Id, size: Dimensioni, draw: impl FnOnce(&mut RenderPass<'_>)) -> Option<TargetKey> {
        let key = match self.cache.ensure(&mut *self.gfx, slot, owner, size) {
            Ok(key) => key,
            Err(err) => {
                log::error!("{owner}: cannot allocate render target: {err}");
                return None;
            }
        };
        if !self.cache.push(&mut *self.gfx, key) {
            return None;
        }
        draw(self);
        self.cache.pop(&mut *self.gfx);
        self.rebuilds += 1;
        Some(key)
    }

    /// Pops targets left pushed by a failed draw until the stack is back at `depth`.
    pub(crate) fn unwind_to(&mut self, depth: usize) {
        while self.cache.depth() > depth {
            self.cache.pop(&mut *self.gfx);
        }
    }

    /// Composites `key` into the current destination.
    pub(crate) fn composite(&mut self, key: TargetKey, src: Recti, dst: Recti) { self.cache.composite(&mut *self.gfx, key, src, dst); }

    /// Fills `r` in the current destination.
    pub(crate) fn fill(&mut self, r: Recti, c: Color) {
        if r.width > 0 && r.height > 0 {
            self.gfx.fill_rect(r, c);
        }
    }
}
