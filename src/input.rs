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
//! Widget-level input events, the receiver chain and the capability traits concrete widgets
//! implement to react to input.

use super::*;
use crate::error::guarded;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Reference to the component being dragged in a drag-and-drop sequence.
pub struct DragPayload {
    /// Component that was promoted to dragged component.
    pub source: Id,
    /// Window owning the dragged component.
    pub window: Id,
}

#[derive(Copy, Clone, Debug, PartialEq)]
/// Input event delivered to a component. Coordinates are local to the receiving component.
pub enum WidgetEvent {
    /// A pointer went down.
    TouchDown {
        /// Local x.
        x: i32,
        /// Local y.
        y: i32,
        /// Pointer index.
        pointer: i32,
        /// Pressed button.
        button: MouseButton,
    },
    /// A pointer went up.
    TouchUp {
        /// Local x.
        x: i32,
        /// Local y.
        y: i32,
        /// Pointer index.
        pointer: i32,
        /// Released button.
        button: MouseButton,
    },
    /// A pointer moved while held, after the drag resistance was exceeded.
    TouchDragged {
        /// Local x.
        x: i32,
        /// Local y.
        y: i32,
        /// Pointer index.
        pointer: i32,
    },
    /// The pointer moved without a drag in progress.
    MouseMoved {
        /// Local x.
        x: i32,
        /// Local y.
        y: i32,
    },
    /// Wheel scroll. Positive values scroll content down/right.
    Scrolled {
        /// Local x of the pointer.
        x: i32,
        /// Local y of the pointer.
        y: i32,
        /// Horizontal wheel amount.
        dx: i32,
        /// Vertical wheel amount.
        dy: i32,
    },
    /// A key was pressed.
    KeyDown(Key),
    /// A key was released.
    KeyUp(Key),
    /// A character was typed.
    KeyTyped(char),
    /// A dragged component was dropped here.
    Drop {
        /// Local x.
        x: i32,
        /// Local y.
        y: i32,
        /// The dragged component.
        payload: DragPayload,
    },
    /// The drag sequence this component started has ended.
    DragRelease {
        /// Local x.
        x: i32,
        /// Local y.
        y: i32,
        /// The dragged component.
        payload: DragPayload,
    },
    /// The pointer entered the component.
    Enter,
    /// The pointer left the component.
    Exit,
}

impl WidgetEvent {
    /// Short name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TouchDown { .. } => "touch-down",
            Self::TouchUp { .. } => "touch-up",
            Self::TouchDragged { .. } => "touch-dragged",
            Self::MouseMoved { .. } => "mouse-moved",
            Self::Scrolled { .. } => "scrolled",
            Self::KeyDown(_) => "key-down",
            Self::KeyUp(_) => "key-up",
            Self::KeyTyped(_) => "key-typed",
            Self::Drop { .. } => "drop",
            Self::DragRelease { .. } => "drag-release",
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }

    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Vec2i> {
        match *self {
            Self::TouchDown { x, y, .. }
            | Self::TouchUp { x, y, .. }
            | Self::TouchDragged { x, y, .. }
            | Self::MouseMoved { x, y }
            | Self::Scrolled { x, y, .. }
            | Self::Drop { x, y, .. }
            | Self::DragRelease { x, y, .. } => Some(vec2(x, y)),
            _ => None,
        }
    }

    /// Returns a copy with the pointer position shifted by `(-dx, -dy)`, i.e. translated into a
    /// child whose origin sits at `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> WidgetEvent {
        let mut ev = *self;
        match &mut ev {
            Self::TouchDown { x, y, .. }
            | Self::TouchUp { x, y, .. }
            | Self::TouchDragged { x, y, .. }
            | Self::MouseMoved { x, y }
            | Self::Scrolled { x, y, .. }
            | Self::Drop { x, y, .. }
            | Self::DragRelease { x, y, .. } => {
                *x -= dx;
                *y -= dy;
            }
            _ => (),
        }
        ev
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Lifecycle request raised by a handler for the window that owns it.
pub enum WindowRequest {
    /// Close the window at the next render pass.
    Close,
    /// Close and remove the window at the next render pass.
    Dispose,
}

/// Per-event context handed to receivers while an event is routed through a window.
#[derive(Default)]
pub struct EventCtx {
    pub(crate) touch_origin: Option<Id>,
    pub(crate) window_request: Option<WindowRequest>,
}

impl EventCtx {
    /// Creates an empty context.
    pub fn new() -> Self { Self::default() }

    /// Creates a context that remembers which component consumed the last touch-down.
    pub fn with_origin(origin: Option<Id>) -> Self { Self { touch_origin: origin, ..Self::default() } }

    /// Component that consumed the touch-down of the current touch sequence.
    pub fn touch_origin(&self) -> Option<Id> { self.touch_origin }

    /// Asks the manager to close the owning window at the next render pass.
    pub fn request_close(&mut self) { self.window_request = Some(WindowRequest::Close); }

    /// Asks the manager to close and remove the owning window at the next render pass.
    pub fn request_dispose(&mut self) { self.window_request = Some(WindowRequest::Dispose); }

    /// Pending lifecycle request, if any.
    pub fn window_request(&self) -> Option<WindowRequest> { self.window_request }
}

/// Handles input on behalf of a component. Returning `Ok(true)` consumes the event.
pub trait InputReceiver: Send {
    /// Reacts to `event`. `state` is the receiving component.
    fn receive(&mut self, event: &WidgetEvent, state: &mut ComponentState, ctx: &mut EventCtx) -> HandlerResult<bool>;
}

impl<F> InputReceiver for F
where
    F: FnMut(&WidgetEvent, &mut ComponentState, &mut EventCtx) -> HandlerResult<bool> + Send,
{
    fn receive(&mut self, event: &WidgetEvent, state: &mut ComponentState, ctx: &mut EventCtx) -> HandlerResult<bool> { self(event, state, ctx) }
}

/// Ordered list of receivers; the first one that consumes an event stops the chain.
#[derive(Default)]
pub struct ReceiverChain {
    receivers: Vec<Box<dyn InputReceiver>>,
}

impl ReceiverChain {
    /// Creates an empty chain.
    pub fn new() -> Self { Self::default() }

    /// Appends a receiver and returns the chain for chaining.
    pub fn push(&mut self, receiver: impl InputReceiver + 'static) -> &mut Self {
        self.receivers.push(Box::new(receiver));
        self
    }

    /// Number of receivers.
    pub fn len(&self) -> usize { self.receivers.len() }

    /// Returns `true` if the chain is empty.
    pub fn is_empty(&self) -> bool { self.receivers.is_empty() }

    /// Drops all receivers.
    pub fn clear(&mut self) { self.receivers.clear(); }

    /// Runs the chain. Failing receivers are logged and treated as not consuming the event.
    pub fn dispatch(&mut self, event: &WidgetEvent, state: &mut ComponentState, ctx: &mut EventCtx) -> bool {
        for receiver in &mut self.receivers {
            let name = state.name().to_string();
            if guarded(&name, event.kind(), || receiver.receive(event, state, ctx)) == Some(true) {
                return true;
            }
        }
        false
    }
}

/// Button-style callbacks. All methods default to doing nothing.
pub trait ClickListener: Send {
    /// A button went down inside the component.
    fn on_down(&mut self, _state: &mut ComponentState, _button: MouseButton) -> HandlerResult { Ok(()) }
    /// A button went up (inside or outside the component).
    fn on_up(&mut self, _state: &mut ComponentState, _button: MouseButton) -> HandlerResult { Ok(()) }
    /// A full press/release happened inside the component.
    fn on_pressed(&mut self, _state: &mut ComponentState, _button: MouseButton) -> HandlerResult { Ok(()) }
}

/// Receiver turning touch down/up pairs into [`ClickListener`] callbacks.
pub struct ClickReceiver {
    listeners: Vec<Box<dyn ClickListener>>,
    armed: Option<MouseButton>,
}

impl ClickReceiver {
    /// Creates a receiver with one listener.
    pub fn new(listener: impl ClickListener + 'static) -> Self { Self { listeners: vec![Box::new(listener)], armed: None } }

    /// Adds another listener; listeners run in insertion order.
    pub fn and(mut self, listener: impl ClickListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Returns `true` while a press is in progress.
    pub fn is_armed(&self) -> bool { self.armed.is_some() }
}

impl InputReceiver for ClickReceiver {
    fn receive(&mut self, event: &WidgetEvent, state: &mut ComponentState, _ctx: &mut EventCtx) -> HandlerResult<bool> {
        let bounds = rect(0, 0, state.rect().width, state.rect().height);
        match *event {
            WidgetEvent::TouchDown { x, y, button, .. } if rect_contains(&bounds, x, y) => {
                self.armed = Some(button);
                state.mark_dirty();
                for l in &mut self.listeners {
                    l.on_down(state, button)?;
                }
                Ok(true)
            }
            WidgetEvent::TouchUp { x, y, button, .. } => {
                let armed = match self.armed.take() {
                    Some(armed) => armed,
                    None => return Ok(false),
                };
                state.mark_dirty();
                for l in &mut self.listeners {
                    l.on_up(state, button)?;
                }
                if armed == button && rect_contains(&bounds, x, y) {
                    for l in &mut self.listeners {
                        l.on_pressed(state, button)?;
                    }
                }
                Ok(true)
            }
            WidgetEvent::DragRelease { .. } => {
                if self.armed.take().is_some() {
                    state.mark_dirty();
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }
}

/// Capability of intercepting key events manager-wide, before per-window routing.
pub trait GlobalKeyReceiver: Send {
    /// A key was pressed.
    fn key_down(&mut self, key: Key) -> HandlerResult<bool>;
    /// A key was released.
    fn key_up(&mut self, _key: Key) -> HandlerResult<bool> { Ok(false) }
    /// A character was typed.
    fn key_typed(&mut self, _ch: char) -> HandlerResult<bool> { Ok(false) }
}

/// Offers a key event to `receiver`, logging failures against `who`. Returns `true` if consumed.
pub(crate) fn offer_key(receiver: &mut dyn GlobalKeyReceiver, who: &str, event: &WidgetEvent) -> bool {
    guarded(who, event.kind(), || match *event {
        WidgetEvent::KeyDown(key) => receiver.key_down(key),
        WidgetEvent::KeyUp(key) => receiver.key_up(key),
        WidgetEvent::KeyTyped(ch) => receiver.key_typed(ch),
        _ => Ok(false),
    }) == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Log(Arc<Mutex<Vec<String>>>);

    impl ClickListener for Log {
        fn on_down(&mut self, _s: &mut ComponentState, _b: MouseButton) -> HandlerResult {
            self.0.lock().unwrap().push("down".into());
            Ok(())
        }
        fn on_up(&mut self, _s: &mut ComponentState, _b: MouseButton) -> HandlerResult {
            self.0.lock().unwrap().push("up".into());
            Ok(())
        }
        fn on_pressed(&mut self, _s: &mut ComponentState, _b: MouseButton) -> HandlerResult {
            self.0.lock().unwrap().push("pressed".into());
            Ok(())
        }
    }

    fn down(x: i32, y: i32) -> WidgetEvent { WidgetEvent::TouchDown { x, y, pointer: 0, button: MouseButton::LEFT } }
    fn up(x: i32, y: i32) -> WidgetEvent { WidgetEvent::TouchUp { x, y, pointer: 0, button: MouseButton::LEFT } }

    #[test]
    fn click_inside_fires_pressed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut state = ComponentState::new("button");
        state.set_rect(rect(0, 0, 20, 10));
        let mut recv = ClickReceiver::new(Log(log.clone()));
        let mut ctx = EventCtx::new();
        assert!(recv.receive(&down(5, 5), &mut state, &mut ctx).unwrap());
        assert!(recv.receive(&up(6, 6), &mut state, &mut ctx).unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["down", "up", "pressed"]);
    }

    #[test]
    fn release_outside_does_not_press() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut state = ComponentState::new("button");
        state.set_rect(rect(0, 0, 20, 10));
        let mut recv = ClickReceiver::new(Log(log.clone())).and(Log(log.clone()));
        let mut ctx = EventCtx::new();
        recv.receive(&down(5, 5), &mut state, &mut ctx).unwrap();
        recv.receive(&up(50, 5), &mut state, &mut ctx).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["down", "down", "up", "up"]);
    }

    #[test]
    fn chain_stops_at_first_consumer_and_survives_failures() {
        let mut chain = ReceiverChain::new();
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        chain
            .push(|_: &WidgetEvent, _: &mut ComponentState, _: &mut EventCtx| -> HandlerResult<bool> { Err("broken".into()) })
            .push(move |_: &WidgetEvent, _: &mut ComponentState, _: &mut EventCtx| -> HandlerResult<bool> {
                *h.lock().unwrap() += 1;
                Ok(true)
            })
            .push(|_: &WidgetEvent, _: &mut ComponentState, _: &mut EventCtx| -> HandlerResult<bool> { panic!("never reached") });
        let mut state = ComponentState::new("w");
        assert!(chain.dispatch(&WidgetEvent::KeyDown(Key::Enter), &mut state, &mut EventCtx::new()));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn translation_moves_pointer_events_only() {
        let ev = down(30, 40).translated(10, 15);
        assert_eq!(ev.position().map(|p| (p.x, p.y)), Some((20, 25)));
        assert_eq!(WidgetEvent::KeyTyped('a').translated(5, 5), WidgetEvent::KeyTyped('a'));
    }
}
