//! Host input events and the subscription capability that delivers them.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host owns the real pointer/resize listeners and user commands. The
//! controller subscribes through [`EventSource`] when it starts running and
//! drops the returned [`Subscription`] on teardown, which releases the
//! host-side registration.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::drag::{Button, Point};
use crate::position::Viewport;
use crate::theme::Theme;

/// Everything the outside world can tell the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Open/close the chat window (e.g. its close button). Ignored mid-drag.
    ToggleOpen,
    /// The input field's contents changed.
    SetInput(String),
    /// Submit `text` as a question.
    Send(String),
    ClearConversation,
    /// Pointer pressed on the trigger.
    PointerDown { pointer: Point, button: Button },
    PointerMove { pointer: Point },
    PointerUp { pointer: Point },
    PointerLeaveWindow,
    Resize(Viewport),
    IdentityChanged(Option<String>),
    ThemeChanged(Theme),
    /// The hosting page is tearing the widget down.
    Teardown,
}

pub type EventSink = mpsc::UnboundedSender<HostEvent>;

/// Scoped registration with an [`EventSource`]; released on drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Capability for receiving host events.
pub trait EventSource {
    /// Start delivering events to `sink` until the subscription is dropped.
    fn subscribe(&self, sink: EventSink) -> Subscription;
}

// =============================================================================
// CHANNEL EVENT SOURCE
// =============================================================================

/// In-process [`EventSource`] that fans [`ChannelEventSource::emit`] out to
/// every live subscriber.
#[derive(Clone, Default)]
pub struct ChannelEventSource {
    inner: Arc<Mutex<Subscribers>>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    sinks: Vec<(u64, EventSink)>,
}

impl ChannelEventSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every subscriber. Returns how many received it.
    pub fn emit(&self, event: HostEvent) -> usize {
        let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        subs.sinks.retain(|(_, sink)| !sink.is_closed());
        subs.sinks
            .iter()
            .filter(|(_, sink)| sink.send(event.clone()).is_ok())
            .count()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        subs.sinks.iter().filter(|(_, sink)| !sink.is_closed()).count()
    }
}

impl EventSource for ChannelEventSource {
    fn subscribe(&self, sink: EventSink) -> Subscription {
        let id = {
            let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            subs.next_id += 1;
            let id = subs.next_id;
            subs.sinks.push((id, sink));
            id
        };
        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            let mut subs = inner.lock().unwrap_or_else(PoisonError::into_inner);
            subs.sinks.retain(|(sid, _)| *sid != id);
        })
    }
}
