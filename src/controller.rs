//! Widget runtime: owns the state machine and executes its effects.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`WidgetController`] is the single public surface of the widget. Host
//! events go in (directly through the `on_*`/command methods, or via
//! [`WidgetController::run`] over an [`EventSource`]), effects come out of
//! [`WidgetState::apply`] and are executed here: position persistence,
//! spawning the chat request, queueing notifications, and publishing a
//! fresh [`WidgetView`] to observers.
//!
//! CONCURRENCY
//! ===========
//! All state changes happen on the task that owns the controller. The chat
//! request runs on a spawned task and reports back through a channel; its
//! result is applied only while the widget is still mounted. Once torn
//! down, late results are dropped.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::{ChatError, ChatReply, ChatRequest, ChatTransport};
use crate::conversation::SessionId;
use crate::dispatcher::ChatDispatcher;
use crate::drag::{Button, Point};
use crate::events::{EventSource, HostEvent};
use crate::position::{PositionStore, Viewport};
use crate::storage::KeyValueStore;
use crate::theme::Theme;
use crate::view::WidgetView;
use crate::widget::{Effect, Notification, NotificationLevel, WidgetEvent, WidgetState};

type ChatOutcome = Result<ChatReply, ChatError>;

enum Next {
    Host(Option<HostEvent>),
    Completed(ChatOutcome),
}

pub struct WidgetController<S> {
    state: WidgetState,
    positions: PositionStore<S>,
    transport: Arc<dyn ChatTransport>,
    completions_tx: mpsc::UnboundedSender<ChatOutcome>,
    completions_rx: mpsc::UnboundedReceiver<ChatOutcome>,
    notifications: VecDeque<Notification>,
    scroll_to: Option<u64>,
    view_tx: watch::Sender<WidgetView>,
    mounted: bool,
}

impl<S: KeyValueStore> WidgetController<S> {
    /// Mount a widget: restore its position and start a new session.
    pub fn mount(positions: PositionStore<S>, transport: Arc<dyn ChatTransport>, viewport: Option<Viewport>) -> Self {
        let position = positions.load(viewport);
        let state = WidgetState::new(position, viewport, positions.trigger_size(), SessionId::generate());
        info!(session_id = %state.session_id, x = position.x, y = position.y, "widget: mounted");

        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(WidgetView::snapshot(&state, None));
        Self {
            state,
            positions,
            transport,
            completions_tx,
            completions_rx,
            notifications: VecDeque::new(),
            scroll_to: None,
            view_tx,
            mounted: true,
        }
    }

    // =========================================================================
    // PUBLIC SURFACE
    // =========================================================================

    pub fn toggle_open(&mut self) {
        self.handle(HostEvent::ToggleOpen);
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.handle(HostEvent::SetInput(text.into()));
    }

    /// Send `text`. Rejected silently when blank or while a request is pending.
    pub fn send_current_input(&mut self, text: impl Into<String>) {
        self.handle(HostEvent::Send(text.into()));
    }

    pub fn clear_conversation(&mut self) {
        self.handle(HostEvent::ClearConversation);
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        self.handle(HostEvent::Resize(viewport));
    }

    pub fn on_pointer_down(&mut self, pointer: Point, button: Button) {
        self.handle(HostEvent::PointerDown { pointer, button });
    }

    pub fn on_pointer_move(&mut self, pointer: Point) {
        self.handle(HostEvent::PointerMove { pointer });
    }

    pub fn on_pointer_up(&mut self, pointer: Point) {
        self.handle(HostEvent::PointerUp { pointer });
    }

    pub fn on_pointer_leave(&mut self) {
        self.handle(HostEvent::PointerLeaveWindow);
    }

    pub fn set_identity(&mut self, user_id: Option<String>) {
        self.handle(HostEvent::IdentityChanged(user_id));
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.handle(HostEvent::ThemeChanged(theme));
    }

    /// Apply one host event. Events after teardown are dropped.
    pub fn handle(&mut self, event: HostEvent) {
        if !self.mounted {
            debug!(?event, "widget: event after teardown ignored");
            return;
        }
        if matches!(event, HostEvent::Teardown) {
            self.unmount();
            return;
        }
        let effects = self.state.apply(WidgetEvent::Host(event));
        self.execute(effects);
    }

    /// Wait for the in-flight request (if any) and apply its result.
    ///
    /// Returns `true` when a result was applied to the conversation.
    pub async fn await_response(&mut self) -> bool {
        if !self.state.dispatcher.is_pending() {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(outcome) => self.apply_completion(outcome),
            None => false,
        }
    }

    /// Drive the widget from `source` until teardown.
    ///
    /// Host events and chat completions are processed interleaved on this
    /// task; the subscription is released before returning.
    pub async fn run(&mut self, source: &impl EventSource) {
        let (sink, mut events) = mpsc::unbounded_channel();
        let subscription = source.subscribe(sink);
        debug!(session_id = %self.state.session_id, "widget: listening for host events");

        while self.mounted {
            let next = tokio::select! {
                event = events.recv() => Next::Host(event),
                Some(outcome) = self.completions_rx.recv() => Next::Completed(outcome),
            };
            match next {
                Next::Host(Some(event)) => self.handle(event),
                Next::Host(None) => self.unmount(),
                Next::Completed(outcome) => {
                    self.apply_completion(outcome);
                }
            }
        }

        drop(subscription);
        debug!(session_id = %self.state.session_id, "widget: host listeners released");
    }

    /// Tear the widget down. Pending results will not be applied.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        info!(
            session_id = %self.state.session_id,
            pending = self.state.dispatcher.is_pending(),
            "widget: unmounted"
        );
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    #[must_use]
    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn view(&self) -> WidgetView {
        WidgetView::snapshot(&self.state, self.scroll_to)
    }

    /// Receive a fresh [`WidgetView`] after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WidgetView> {
        self.view_tx.subscribe()
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    #[must_use]
    pub fn positions(&self) -> &PositionStore<S> {
        &self.positions
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    fn apply_completion(&mut self, outcome: ChatOutcome) -> bool {
        if !self.mounted {
            debug!(session_id = %self.state.session_id, "widget: response after teardown suppressed");
            return false;
        }
        let effects = self.state.apply(WidgetEvent::ChatCompleted(outcome));
        let applied = !effects.is_empty();
        self.execute(effects);
        applied
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistPosition(position) => self.positions.save(position),
                Effect::Dispatch(request) => self.spawn_request(request),
                Effect::Notify(notification) => {
                    match notification.level {
                        NotificationLevel::Success => info!(text = %notification.text, "widget: notify"),
                        NotificationLevel::Error => warn!(text = %notification.text, "widget: notify"),
                    }
                    self.notifications.push_back(notification);
                }
                Effect::ScrollToNewest(message_id) => self.scroll_to = Some(message_id),
                Effect::ResetScroll => self.scroll_to = None,
            }
        }
        self.view_tx
            .send_replace(WidgetView::snapshot(&self.state, self.scroll_to));
    }

    fn spawn_request(&mut self, request: ChatRequest) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("widget: no async runtime, failing chat request");
            let outcome = Err(ChatError::Request("no async runtime available".into()));
            if self.completions_tx.send(outcome).is_err() {
                debug!("widget: completion channel closed");
            }
            return;
        };
        let transport = Arc::clone(&self.transport);
        let completions = self.completions_tx.clone();
        runtime.spawn(async move {
            let outcome = ChatDispatcher::execute(transport.as_ref(), &request).await;
            if completions.send(outcome).is_err() {
                debug!(session_id = %request.session_id, "widget: dropped; discarding chat response");
            }
        });
    }
}
