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
//! Texture atlas lookup by image identifier, with nine-slice regions.
use std::collections::HashMap;

use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Handle referencing a backend-owned texture.
pub struct TextureId(pub u64);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
/// Border widths used to stretch an image without distorting its corners.
pub struct NineSlice {
    /// Left border in texels.
    pub left: i32,
    /// Right border in texels.
    pub right: i32,
    /// Top border in texels.
    pub top: i32,
    /// Bottom border in texels.
    pub bottom: i32,
}

#[derive(Copy, Clone)]
/// Drawable area inside a texture.
pub struct TextureRegion {
    /// Texture holding the pixels.
    pub texture: TextureId,
    /// Source rectangle in texels.
    pub src: Recti,
    /// Optional nine-slice metadata.
    pub nine_slice: Option<NineSlice>,
}

impl TextureRegion {
    /// Splits the region into nine `(src, dst)` pairs covering `dst`.
    /// Returns `None` when the region has no nine-slice metadata.
    pub fn nine_slice_parts(&self, dst: Recti) -> Option<Vec<(Recti, Recti)>> {
        let ns = self.nine_slice?;
        let s = self.src;
        let sx = [s.x, s.x + ns.left, s.x + s.width - ns.right, s.x + s.width];
        let sy = [s.y, s.y + ns.top, s.y + s.height - ns.bottom, s.y + s.height];
        let dx = [dst.x, dst.x + ns.left, dst.x + dst.width - ns.right, dst.x + dst.width];
        let dy = [dst.y, dst.y + ns.top, dst.y + dst.height - ns.bottom, dst.y + dst.height];
        let mut parts = Vec::with_capacity(9);
        for row in 0..3 {
            for col in 0..3 {
                let src = rect(sx[col], sy[row], sx[col + 1] - sx[col], sy[row + 1] - sy[row]);
                let dst = rect(dx[col], dy[row], dx[col + 1] - dx[col], dy[row + 1] - dy[row]);
                if src.width > 0 && src.height > 0 && dst.width > 0 && dst.height > 0 {
                    parts.push((src, dst));
                }
            }
        }
        Some(parts)
    }
}

/// Resolves string image identifiers to drawable regions.
pub trait TextureAtlas: Send + Sync {
    /// Returns the region registered under `name`.
    fn region(&self, name: &str) -> Option<TextureRegion>;

    /// Returns `true` if `name` resolves to a region.
    fn contains(&self, name: &str) -> bool { self.region(name).is_some() }
}

/// Atlas backed by a fixed name table.
#[derive(Default, Clone)]
pub struct StaticAtlas {
    regions: HashMap<String, TextureRegion>,
}

impl StaticAtlas {
    /// Creates an empty atlas.
    pub fn new() -> Self { Self::default() }

    /// Registers a region under `name`.
    pub fn insert(&mut self, name: impl Into<String>, region: TextureRegion) { self.regions.insert(name.into(), region); }
}

impl TextureAtlas for StaticAtlas {
    fn region(&self, name: &str) -> Option<TextureRegion> { self.regions.get(name).copied() }
}
