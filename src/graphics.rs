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
//! Backend interface the render pass draws through, plus a small painting helper for skins.
use std::thread::ThreadId;

use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Handle to an offscreen render target owned by the graphics backend.
pub struct RenderTargetId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq)]
/// Transform applied when drawing a textured rectangle.
pub struct DrawOptions {
    /// Uniform scale applied around the destination center.
    pub scale: f32,
    /// Rotation in degrees around the destination center.
    pub rotation: f32,
    /// Mirror horizontally.
    pub flip_x: bool,
    /// Mirror vertically.
    pub flip_y: bool,
}

impl Default for DrawOptions {
    fn default() -> Self { Self { scale: 1.0, rotation: 0.0, flip_x: false, flip_y: false } }
}

/// Trait implemented by the host's graphics backend.
///
/// All methods are only ever called from [`GraphicsContext::owner_thread`]. Coordinates are
/// relative to the target currently on top of the push stack, or to the screen when the stack is
/// empty.
pub trait GraphicsContext {
    /// Begins a textured draw-call batch.
    fn begin_batch(&mut self);
    /// Ends the current batch, flushing outstanding geometry.
    fn end_batch(&mut self);
    /// Draws `src` of `texture` into `dst`.
    fn draw_texture(&mut self, texture: TextureId, src: Recti, dst: Recti, opts: DrawOptions, tint: Color);
    /// Draws the `src` area of a render target into `dst`.
    fn draw_target(&mut self, target: RenderTargetId, src: Recti, dst: Recti);
    /// Fills `rect` with a solid color.
    fn fill_rect(&mut self, rect: Recti, color: Color);
    /// Creates an offscreen render target.
    fn create_target(&mut self, size: Dimensioni) -> RenderTargetId;
    /// Resizes an existing render target. Its contents become undefined.
    fn resize_target(&mut self, target: RenderTargetId, size: Dimensioni);
    /// Destroys a render target.
    fn destroy_target(&mut self, target: RenderTargetId);
    /// Makes `target` the current draw destination and clears it to transparent.
    fn push_target(&mut self, target: RenderTargetId);
    /// Restores the previous draw destination.
    fn pop_target(&mut self);
    /// Enables or disables alpha blending.
    fn set_blending(&mut self, enabled: bool);
    /// Current viewport size in pixels.
    fn viewport(&self) -> Dimensioni;
    /// Seconds elapsed since the previous frame.
    fn delta_time(&self) -> f32;
    /// Thread that owns the graphics context.
    fn owner_thread(&self) -> ThreadId;
}

/// Drawing helper handed to [`Paintable::paint`].
///
/// Coordinates are local to the component being painted: `(0, 0)` is its top-left corner.
pub struct Painter<'a> {
    gfx: &'a mut dyn GraphicsContext,
    atlas: &'a dyn TextureAtlas,
    size: Dimensioni,
}

impl<'a> Painter<'a> {
    pub(crate) fn new(gfx: &'a mut dyn GraphicsContext, atlas: &'a dyn TextureAtlas, size: Dimensioni) -> Self { Self { gfx, atlas, size } }

    /// Size of the surface being painted.
    pub fn size(&self) -> Dimensioni { self.size }

    /// Full local bounds of the surface.
    pub fn bounds(&self) -> Recti { rect(0, 0, self.size.width, self.size.height) }

    /// Draws a solid rectangle.
    pub fn draw_rect(&mut self, rect: Recti, color: Color) {
        if rect.width > 0 && rect.height > 0 {
            self.gfx.fill_rect(rect, color);
        }
    }

    /// Draws a 1-pixel outline.
    pub fn draw_box(&mut self, r: Recti, color: Color) {
        self.draw_rect(rect(r.x + 1, r.y, r.width - 2, 1), color);
        self.draw_rect(rect(r.x + 1, r.y + r.height - 1, r.width - 2, 1), color);
        self.draw_rect(rect(r.x, r.y, 1, r.height), color);
        self.draw_rect(rect(r.x + r.width - 1, r.y, 1, r.height), color);
    }

    /// Draws a filled frame with an optional border.
    pub fn draw_frame(&mut self, rect: Recti, fill: Color, border: Option<Color>) {
        self.draw_rect(rect, fill);
        if let Some(border) = border.filter(|c| c.a != 0) {
            self.draw_box(rect, border);
        }
    }

    /// Draws the image registered under `name`, nine-slicing it when the region carries slice
    /// metadata. Returns `false` (drawing nothing) when the atlas has no such image.
    pub fn draw_image(&mut self, name: &str, dst: Recti, opts: DrawOptions, tint: Color) -> bool {
        let region = match self.atlas.region(name) {
            Some(region) => region,
            None => {
                log::debug!("image `{name}` is not in the atlas; skipping");
                return false;
            }
        };
        match region.nine_slice_parts(dst) {
            Some(parts) => {
                for (src, dst) in parts {
                    self.gfx.draw_texture(region.texture, src, dst, DrawOptions::default(), tint);
                }
            }
            None => self.gfx.draw_texture(region.texture, region.src, dst, opts, tint),
        }
        true
    }

    /// Draws the image registered under `name`, or fills `dst` with `fallback` when it is missing.
    pub fn draw_image_or(&mut self, name: &str, dst: Recti, tint: Color, fallback: Color) {
        if !self.draw_image(name, dst, DrawOptions::default(), tint) {
            self.draw_rect(dst, fallback);
        }
    }

    /// Returns `true` if the atlas knows `name`.
    pub fn has_image(&self, name: &str) -> bool { self.atlas.contains(name) }
}
