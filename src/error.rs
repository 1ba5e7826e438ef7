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
//! Error types.
//!
//! Two channels exist. [`UiError`] is returned from construction and configuration paths that the
//! caller must handle. [`HandlerError`] is what input receivers and paint routines return; those
//! errors are caught at the component boundary, logged and never propagated.

use thiserror::Error;

use crate::Id;

/// Errors raised by construction, configuration and manager operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// A required configuration key is absent.
    #[error("{widget}: required configuration key `{key}` is missing")]
    MissingKey {
        /// Widget (or record) name.
        widget: String,
        /// Missing key.
        key: String,
    },

    /// A configuration value could not be parsed.
    #[error("{widget}: invalid value `{value}` for `{key}` (expected {expected})")]
    InvalidValue {
        /// Widget (or record) name.
        widget: String,
        /// Offending key.
        key: String,
        /// Raw value.
        value: String,
        /// Description of the expected format.
        expected: &'static str,
    },

    /// The window was already added to this manager.
    #[error("window {0} is already managed")]
    DuplicateWindow(Id),

    /// The window is not managed by this manager.
    #[error("window {0} is not managed")]
    UnknownWindow(Id),

    /// The window must be open before it can become active.
    #[error("window {0} is not enabled")]
    WindowNotEnabled(Id),

    /// The component cannot own children.
    #[error("component {0} is not a container")]
    NotAContainer(String),

    /// A graphics operation was attempted off the graphics-context thread.
    #[error("graphics operation attempted off the graphics thread")]
    WrongThread,

    /// The dispatch thread could not be started.
    #[error("failed to start the dispatch thread: {0}")]
    DispatchThread(String),

    /// The manager has been disposed.
    #[error("window manager has been disposed")]
    Disposed,
}

/// Result type for construction and manager operations.
pub type UiResult<T> = Result<T, UiError>;

/// Error returned by input receivers, paint routines and listeners.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for per-event and per-frame callbacks.
pub type HandlerResult<T = ()> = Result<T, HandlerError>;

/// Runs `f`, converting both returned errors and panics into a logged failure.
///
/// Returns `None` when the callback failed. `who` names the widget and `what` the event kind.
pub(crate) fn guarded<T>(who: &str, what: &str, f: impl FnOnce() -> HandlerResult<T>) -> Option<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            log::error!("{who}: {what} handler failed: {err}");
            None
        }
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("{who}: {what} handler panicked: {msg}");
            None
        }
    }
}
