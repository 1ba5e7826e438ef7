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
//! Layout expressions and anchors resolved against a parent's size.
use super::*;

/// Describes how one coordinate or extent is resolved against the parent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Expr {
    /// `120`: always 120px.
    Absolute(i32),
    /// `50%`: half of the parent extent.
    Percent(f32),
    /// `max`: the whole parent extent (size), or flush with the far edge (position).
    Max,
    /// `max-20`: parent extent minus 20 (size), or 20px in from the far edge (position).
    Relative(i32),
}

impl Expr {
    /// Parses `120`, `50%`, `max`, `max-20` or `max+4`.
    pub fn parse(s: &str) -> Option<Expr> {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            return pct.trim().parse::<f32>().ok().map(Expr::Percent);
        }
        if let Some(rest) = s.strip_prefix("max") {
            let rest = rest.trim();
            if rest.is_empty() {
                return Some(Expr::Max);
            }
            let rest = rest.strip_prefix('+').unwrap_or(rest);
            return rest.parse::<i32>().ok().map(Expr::Relative);
        }
        s.parse::<i32>().ok().map(Expr::Absolute)
    }

    /// Resolves an extent against the parent extent.
    pub fn size(self, parent: i32) -> i32 {
        let v = match self {
            Expr::Absolute(v) => v,
            Expr::Percent(p) => (parent as f32 * p / 100.0).round() as i32,
            Expr::Max => parent,
            Expr::Relative(d) => parent + d,
        };
        v.max(0)
    }

    /// Resolves a position along an axis given the parent extent and the already resolved size.
    pub fn position(self, parent: i32, size: i32) -> i32 {
        match self {
            Expr::Absolute(v) => v,
            Expr::Percent(p) => (parent as f32 * p / 100.0).round() as i32,
            Expr::Max => parent - size,
            Expr::Relative(d) => parent - size + d,
        }
    }
}

/// The nine canonical anchor positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Center of the top edge.
    Top,
    /// Top-right corner.
    TopRight,
    /// Center of the left edge.
    Left,
    /// Center of the parent.
    Center,
    /// Center of the right edge.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Center of the bottom edge.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// Parses names such as `top-left`, `center` or `bottom`.
    pub fn parse(s: &str) -> Option<Anchor> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        Some(match norm.as_str() {
            "top-left" => Anchor::TopLeft,
            "top" | "top-center" => Anchor::Top,
            "top-right" => Anchor::TopRight,
            "left" | "center-left" => Anchor::Left,
            "center" => Anchor::Center,
            "right" | "center-right" => Anchor::Right,
            "bottom-left" => Anchor::BottomLeft,
            "bottom" | "bottom-center" => Anchor::Bottom,
            "bottom-right" => Anchor::BottomRight,
            _ => return None,
        })
    }

    /// Returns the origin of a `size` box placed at this anchor inside `parent`.
    pub fn origin(self, parent: Dimensioni, size: Dimensioni) -> Vec2i {
        let x_left = 0;
        let x_mid = (parent.width - size.width) / 2;
        let x_right = parent.width - size.width;
        let y_top = 0;
        let y_mid = (parent.height - size.height) / 2;
        let y_bottom = parent.height - size.height;
        match self {
            Anchor::TopLeft => vec2(x_left, y_top),
            Anchor::Top => vec2(x_mid, y_top),
            Anchor::TopRight => vec2(x_right, y_top),
            Anchor::Left => vec2(x_left, y_mid),
            Anchor::Center => vec2(x_mid, y_mid),
            Anchor::Right => vec2(x_right, y_mid),
            Anchor::BottomLeft => vec2(x_left, y_bottom),
            Anchor::Bottom => vec2(x_mid, y_bottom),
            Anchor::BottomRight => vec2(x_right, y_bottom),
        }
    }
}

/// Placement rules of a component, read from its configuration record.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutSpec {
    /// Horizontal position (offset from the anchor when one is set).
    pub x: Expr,
    /// Vertical position (offset from the anchor when one is set).
    pub y: Expr,
    /// Width.
    pub width: Expr,
    /// Height.
    pub height: Expr,
    /// Optional anchor.
    pub anchor: Option<Anchor>,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            x: Expr::Absolute(0),
            y: Expr::Absolute(0),
            width: Expr::Max,
            height: Expr::Max,
            anchor: None,
        }
    }
}

impl LayoutSpec {
    /// Fixed placement at `r`.
    pub fn fixed(r: Recti) -> Self {
        Self {
            x: Expr::Absolute(r.x),
            y: Expr::Absolute(r.y),
            width: Expr::Absolute(r.width),
            height: Expr::Absolute(r.height),
            anchor: None,
        }
    }

    /// Reads `x`, `y`, `width`, `height` and `anchor` from `record`, keeping `self` for absent or
    /// malformed keys. Malformed keys are logged with the widget name.
    pub fn apply_record(&mut self, record: &ConfigRecord) {
        for (key, slot) in [("x", &mut self.x), ("y", &mut self.y), ("width", &mut self.width), ("height", &mut self.height)] {
            if let Some(raw) = record.get(key) {
                match Expr::parse(raw) {
                    Some(expr) => *slot = expr,
                    None => log::warn!("{}: invalid layout expression `{raw}` for `{key}`; keeping default", record.name()),
                }
            }
        }
        if let Some(raw) = record.get("anchor") {
            match Anchor::parse(raw) {
                Some(anchor) => self.anchor = Some(anchor),
                None => log::warn!("{}: unknown anchor `{raw}`; keeping default", record.name()),
            }
        }
    }

    /// Resolves the rectangle inside a parent of the given size.
    pub fn resolve(&self, parent: Dimensioni) -> Recti {
        let width = self.width.size(parent.width);
        let height = self.height.size(parent.height);
        match self.anchor {
            None => rect(self.x.position(parent.width, width), self.y.position(parent.height, height), width, height),
            Some(anchor) => {
                let origin = anchor.origin(parent, Dimensioni::new(width, height));
                let dx = self.x.position(parent.width, width);
                let dy = self.y.position(parent.height, height);
                rect(origin.x + dx, origin.y + dy, width, height)
            }
        }
    }
}
