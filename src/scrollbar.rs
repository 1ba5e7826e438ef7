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
//! Scrollbar geometry shared by scroll regions.

use crate::{Dimensioni, Recti, Vec2i};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Scroll or layout direction.
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// Component of `v` along this axis.
    pub fn along(self, v: Vec2i) -> i32 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }

    /// Extent of `d` along this axis.
    pub fn extent(self, d: Dimensioni) -> i32 {
        match self {
            Axis::Horizontal => d.width,
            Axis::Vertical => d.height,
        }
    }

    /// Start coordinate of `r` along this axis.
    pub fn start(self, r: Recti) -> i32 {
        match self {
            Axis::Horizontal => r.x,
            Axis::Vertical => r.y,
        }
    }

    /// Length of `r` along this axis.
    pub fn len(self, r: Recti) -> i32 {
        match self {
            Axis::Horizontal => r.width,
            Axis::Vertical => r.height,
        }
    }
}

/// Track rectangle of the bar for `axis`, overlaid on the far edge of the viewport. When the
/// other bar is shown too the track stops short of the shared corner.
pub(crate) fn scrollbar_track(axis: Axis, viewport: Dimensioni, bar_size: i32, other_bar: bool) -> Recti {
    let corner = if other_bar { bar_size } else { 0 };
    match axis {
        Axis::Vertical => Recti::new(viewport.width - bar_size, 0, bar_size, (viewport.height - corner).max(0)),
        Axis::Horizontal => Recti::new(0, viewport.height - bar_size, (viewport.width - corner).max(0), bar_size),
    }
}

pub(crate) fn scrollbar_max_scroll(content_len: i32, view_len: i32) -> i32 { (content_len - view_len).max(0) }

/// Thumb length: the viewport share of the track, never below `min_len` nor above the track.
pub(crate) fn scrollbar_thumb_len(track_len: i32, view_len: i32, content_len: i32, min_len: i32) -> i32 {
    if track_len <= 0 || content_len <= 0 {
        return track_len.max(0);
    }
    let len = (track_len as i64 * view_len as i64 / content_len as i64) as i32;
    len.max(min_len).min(track_len)
}

pub(crate) fn scrollbar_thumb(axis: Axis, track: Recti, view_len: i32, content_len: i32, scroll: i32, min_len: i32) -> Recti {
    let mut thumb = track;
    let track_len = axis.len(track);
    let thumb_len = scrollbar_thumb_len(track_len, view_len, content_len, min_len);
    let max_scroll = scrollbar_max_scroll(content_len, view_len);
    let travel = track_len - thumb_len;
    let offset = if max_scroll > 0 && travel > 0 { scroll.clamp(0, max_scroll) * travel / max_scroll } else { 0 };
    match axis {
        Axis::Vertical => {
            thumb.height = thumb_len;
            thumb.y += offset;
        }
        Axis::Horizontal => {
            thumb.width = thumb_len;
            thumb.x += offset;
        }
    }
    thumb
}

/// Scroll offset that puts the thumb's leading edge at `thumb_pos` pixels into the track.
/// Without minimum-size clamping this equals the viewport-center mapping
/// `virtual * thumb_center / track - viewport / 2`.
pub(crate) fn scrollbar_offset_for_thumb(thumb_pos: i32, track_len: i32, thumb_len: i32, max_scroll: i32) -> i32 {
    let travel = track_len - thumb_len;
    if travel <= 0 || max_scroll <= 0 {
        return 0;
    }
    (thumb_pos.clamp(0, travel) as i64 * max_scroll as i64 / travel as i64) as i32
}
