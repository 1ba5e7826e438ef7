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
//! Ordered input queue between the host's input callbacks and the dispatch thread.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use super::*;
use crate::error::guarded;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// How queued input is delivered to windows.
pub enum DispatchMode {
    /// A dedicated thread per manager blocks on the queue and dispatches as events arrive.
    Threaded,
    /// Events wait in the queue until the host calls [`WindowManager::dispatch_pending`].
    Manual,
}

#[derive(Copy, Clone, Debug, PartialEq)]
/// Kind-specific payload of a queued event.
pub enum InputKind {
    /// Pointer pressed.
    TouchDown {
        /// Pointer index.
        pointer: i32,
        /// Button pressed.
        button: MouseButton,
    },
    /// Pointer released.
    TouchUp {
        /// Pointer index.
        pointer: i32,
        /// Button released.
        button: MouseButton,
    },
    /// Pointer moved while pressed.
    TouchDragged {
        /// Pointer index.
        pointer: i32,
    },
    /// Pointer moved while released.
    MouseMoved,
    /// Wheel scrolled.
    Scrolled {
        /// Horizontal amount.
        dx: i32,
        /// Vertical amount.
        dy: i32,
    },
    /// Key pressed.
    KeyDown(Key),
    /// Key released.
    KeyUp(Key),
    /// Character typed.
    KeyTyped(char),
}

#[derive(Copy, Clone, Debug, PartialEq)]
/// Event captured by a [`WindowManager`] input entry point, immutable once queued.
pub struct InputEvent {
    /// What happened.
    pub kind: InputKind,
    /// Window chosen when the event was captured, if any.
    pub target: Option<Id>,
    /// Screen x coordinate (zero for key events).
    pub x: i32,
    /// Screen y coordinate (zero for key events).
    pub y: i32,
}

impl InputEvent {
    /// Short name of the event kind, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self.kind {
            InputKind::TouchDown { .. } => "touch-down",
            InputKind::TouchUp { .. } => "touch-up",
            InputKind::TouchDragged { .. } => "touch-dragged",
            InputKind::MouseMoved => "mouse-moved",
            InputKind::Scrolled { .. } => "scrolled",
            InputKind::KeyDown(_) => "key-down",
            InputKind::KeyUp(_) => "key-up",
            InputKind::KeyTyped(_) => "key-typed",
        }
    }
}

pub(crate) enum Message {
    Input(InputEvent),
    Flush(Sender<()>),
    Shutdown,
}

/// Starts the dispatch thread. It blocks on `rx`, hands every input event to `handler` in
/// arrival order, answers flush requests once everything queued before them is handled, and
/// exits on shutdown or when every sender is gone.
pub(crate) fn spawn_worker(name: String, rx: Receiver<Message>, mut handler: impl FnMut(InputEvent) + Send + 'static) -> UiResult<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            log::debug!("{name}: dispatch thread started");
            for message in rx.iter() {
                match message {
                    Message::Input(event) => run_one(&name, event, &mut handler),
                    Message::Flush(reply) => {
                        let _ = reply.send(());
                    }
                    Message::Shutdown => break,
                }
            }
            log::debug!("{name}: dispatch thread stopped");
        })
        .map_err(|err| UiError::DispatchThread(err.to_string()))
}

/// Dispatches whatever is queued on the calling thread. Returns how many events were handled.
pub(crate) fn drain(name: &str, rx: &Receiver<Message>, mut handler: impl FnMut(InputEvent)) -> usize {
    let mut handled = 0;
    while let Ok(message) = rx.try_recv() {
        match message {
            Message::Input(event) => {
                run_one(name, event, &mut handler);
                handled += 1;
            }
            Message::Flush(reply) => {
                let _ = reply.send(());
            }
            Message::Shutdown => break,
        }
    }
    handled
}

fn run_one(name: &str, event: InputEvent, handler: &mut impl FnMut(InputEvent)) {
    guarded(name, event.name(), || {
        handler(event);
        Ok(())
    });
}
