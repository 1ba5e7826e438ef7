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
//! Configuration records and the provider interface used to parametrize components.
//!
//! The declarative format itself is owned by the host. This module only consumes key/value
//! records. Lenient accessors log a diagnostic naming the widget and key and return the
//! caller's default; [`ConfigRecord::require`] is the fail-hard path.

use std::collections::HashMap;

use crate::{color, Color, UiError, UiResult, Vec2i};

/// Opaque key/value record describing one widget.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigRecord {
    name: String,
    entries: Vec<(String, String)>,
}

impl ConfigRecord {
    /// Creates an empty record for the named widget.
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), entries: Vec::new() } }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Name of the widget this record describes.
    pub fn name(&self) -> &str { &self.name }

    /// Inserts or replaces a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the raw string for `key`.
    pub fn get(&self, key: &str) -> Option<&str> { self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()) }

    /// Returns `true` when `key` is present.
    pub fn contains(&self, key: &str) -> bool { self.get(key).is_some() }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> { self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())) }

    /// Returns the value for `key` or a [`UiError::MissingKey`].
    pub fn require(&self, key: &str) -> UiResult<&str> {
        self.get(key).ok_or_else(|| UiError::MissingKey { widget: self.name.clone(), key: key.to_string() })
    }

    fn parse<T>(&self, key: &str, expected: &'static str, parse: impl FnOnce(&str) -> Option<T>) -> UiResult<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => parse(raw.trim()).map(Some).ok_or_else(|| UiError::InvalidValue {
                widget: self.name.clone(),
                key: key.to_string(),
                value: raw.to_string(),
                expected,
            }),
        }
    }

    /// Parses an integer value.
    pub fn int(&self, key: &str) -> UiResult<Option<i32>> { self.parse(key, "an integer", |s| s.parse().ok()) }

    /// Parses a floating-point value.
    pub fn float(&self, key: &str) -> UiResult<Option<f32>> { self.parse(key, "a number", |s| s.parse().ok()) }

    /// Parses a boolean value (`true`/`false`/`yes`/`no`/`1`/`0`).
    pub fn bool(&self, key: &str) -> UiResult<Option<bool>> { self.parse(key, "a boolean", parse_bool) }

    /// Parses a color given as `#RRGGBB`, `#RRGGBBAA` or `r,g,b[,a]`.
    pub fn color(&self, key: &str) -> UiResult<Option<Color>> { self.parse(key, "a color", parse_color) }

    /// Parses a position given as `x,y`.
    pub fn position(&self, key: &str) -> UiResult<Option<Vec2i>> { self.parse(key, "a position `x,y`", parse_position) }

    /// Splits a comma separated list. Empty items are dropped.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
    }

    /// Integer with fallback.
    pub fn int_or(&self, key: &str, default: i32) -> i32 { lenient(self.int(key), default) }

    /// Float with fallback.
    pub fn float_or(&self, key: &str, default: f32) -> f32 { lenient(self.float(key), default) }

    /// Boolean with fallback.
    pub fn bool_or(&self, key: &str, default: bool) -> bool { lenient(self.bool(key), default) }

    /// Color with fallback.
    pub fn color_or(&self, key: &str, default: Color) -> Color { lenient(self.color(key), default) }

    /// Position with fallback.
    pub fn position_or(&self, key: &str, default: Vec2i) -> Vec2i { lenient(self.position(key), default) }
}

fn lenient<T>(res: UiResult<Option<T>>, default: T) -> T {
    match res {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(err) => {
            log::warn!("{err}; using default");
            default
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_color(s: &str) -> Option<Color> {
    if let Some(hex) = s.strip_prefix('#') {
        let byte = |i: usize| hex.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok());
        return match hex.len() {
            6 => Some(color(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(color(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        };
    }
    let parts: Vec<u8> = s.split(',').map(|p| p.trim().parse().ok()).collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [r, g, b] => Some(color(*r, *g, *b, 255)),
        [r, g, b, a] => Some(color(*r, *g, *b, *a)),
        _ => None,
    }
}

fn parse_position(s: &str) -> Option<Vec2i> {
    let (x, y) = s.split_once(',')?;
    Some(Vec2i::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Source of configuration records, keyed by parent identifier and object name.
pub trait ConfigProvider: Send + Sync {
    /// Returns the record describing `name` inside `parent`, if any.
    fn record(&self, parent: &str, name: &str) -> Option<ConfigRecord>;
}

/// Provider that never has a record; every widget uses its defaults.
#[derive(Default, Clone, Copy)]
pub struct NoConfig;

impl ConfigProvider for NoConfig {
    fn record(&self, _parent: &str, _name: &str) -> Option<ConfigRecord> { None }
}

/// In-memory provider, mostly useful for tests and tools.
#[derive(Default)]
pub struct MapConfigProvider {
    records: parking_lot::RwLock<HashMap<(String, String), ConfigRecord>>,
}

impl MapConfigProvider {
    /// Creates an empty provider.
    pub fn new() -> Self { Self::default() }

    /// Registers (or replaces) the record for `parent`/`record.name()`.
    pub fn insert(&self, parent: &str, record: ConfigRecord) {
        self.records.write().insert((parent.to_string(), record.name().to_string()), record);
    }
}

impl ConfigProvider for MapConfigProvider {
    fn record(&self, parent: &str, name: &str) -> Option<ConfigRecord> {
        self.records.read().get(&(parent.to_string(), name.to_string())).cloned()
    }
}
