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
//! Explicit context shared by everything a [`WindowManager`] creates.

use std::sync::Arc;
use std::thread::ThreadId;

use super::*;

/// Manager-wide settings.
#[derive(Clone)]
pub struct Settings {
    /// How queued input is dispatched.
    pub dispatch: DispatchMode,
    /// Color of the layer painted behind an active dimming window.
    pub dim_color: Color,
    /// Drag resistance for components that do not set their own.
    pub drag_resistance: i32,
    /// Distance a locked window must be pulled away from its edge before it unlocks.
    pub unlock_threshold: i32,
    /// Initial viewport, used until the graphics context reports one.
    pub viewport: Dimensioni,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Threaded,
            dim_color: color(0, 0, 0, 128),
            drag_resistance: DEFAULT_DRAG_RESISTANCE,
            unlock_threshold: 24,
            viewport: dim(800, 600),
        }
    }
}

impl Settings {
    /// Builds settings from `record`, falling back to the defaults for absent or malformed keys.
    pub fn from_record(record: &ConfigRecord) -> Self {
        let d = Self::default();
        let dispatch = match record.get("dispatch") {
            None => d.dispatch,
            Some("threaded") => DispatchMode::Threaded,
            Some("manual") => DispatchMode::Manual,
            Some(other) => {
                log::warn!("{}: invalid value `{other}` for `dispatch` (expected `threaded` or `manual`)", record.name());
                d.dispatch
            }
        };
        Self {
            dispatch,
            dim_color: record.color_or("dim-color", d.dim_color),
            drag_resistance: record.int_or("drag-resistance", d.drag_resistance).max(0),
            unlock_threshold: record.int_or("unlock-threshold", d.unlock_threshold).max(0),
            viewport: dim(record.int_or("viewport-width", d.viewport.width), record.int_or("viewport-height", d.viewport.height)),
        }
    }
}

/// Collaborators and settings handed to a [`WindowManager`] at construction.
#[derive(Clone)]
pub struct UiContext {
    graphics_thread: ThreadId,
    atlas: Arc<dyn TextureAtlas>,
    config: Arc<dyn ConfigProvider>,
    settings: Settings,
}

impl UiContext {
    /// Context whose graphics thread is the calling thread, with an empty atlas, no configuration
    /// and default settings.
    pub fn new() -> Self {
        Self {
            graphics_thread: std::thread::current().id(),
            atlas: Arc::new(StaticAtlas::new()),
            config: Arc::new(NoConfig),
            settings: Settings::default(),
        }
    }

    /// Thread that owns the graphics context.
    pub fn with_graphics_thread(mut self, thread: ThreadId) -> Self {
        self.graphics_thread = thread;
        self
    }

    /// Atlas used to resolve image identifiers.
    pub fn with_atlas(mut self, atlas: Arc<dyn TextureAtlas>) -> Self {
        self.atlas = atlas;
        self
    }

    /// Provider of configuration records.
    pub fn with_config(mut self, config: Arc<dyn ConfigProvider>) -> Self {
        self.config = config;
        self
    }

    /// Manager settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Thread that owns the graphics context.
    pub fn graphics_thread(&self) -> ThreadId { self.graphics_thread }
    /// Atlas used to resolve image identifiers.
    pub fn atlas(&self) -> &Arc<dyn TextureAtlas> { &self.atlas }
    /// Provider of configuration records.
    pub fn config(&self) -> &Arc<dyn ConfigProvider> { &self.config }
    /// Manager settings.
    pub fn settings(&self) -> &Settings { &self.settings }
}

impl Default for UiContext {
    fn default() -> Self { Self::new() }
}
