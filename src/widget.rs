//! Widget state machine.
//!
//! DESIGN
//! ======
//! [`WidgetState`] is plain data; [`WidgetState::apply`] is the only
//! transition function. It never performs I/O: side effects (persisting the
//! position, issuing a request, notifying the user, scrolling) come back as
//! [`Effect`]s for the controller to execute. [`reduce`] is the by-value
//! form for callers that prefer `state -> state`.

#[cfg(test)]
#[path = "widget_test.rs"]
mod widget_test;

use crate::api::{ChatError, ChatReply, ChatRequest};
use crate::conversation::{ConversationLog, SessionId};
use crate::dispatcher::{ChatDispatcher, Completion, FAILURE_NOTICE, RequestState};
use crate::drag::{DragController, DragOutcome};
use crate::events::HostEvent;
use crate::position::{Position, Viewport, clamp};
use crate::theme::Theme;

pub const CLEARED_NOTICE: &str = "Conversation cleared";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient, user-visible notice (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    #[must_use]
    pub fn success(text: &str) -> Self {
        Self { level: NotificationLevel::Success, text: text.to_owned() }
    }

    #[must_use]
    pub fn error(text: &str) -> Self {
        Self { level: NotificationLevel::Error, text: text.to_owned() }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Host(HostEvent),
    /// The in-flight chat request finished.
    ChatCompleted(Result<ChatReply, ChatError>),
}

impl From<HostEvent> for WidgetEvent {
    fn from(event: HostEvent) -> Self {
        Self::Host(event)
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PersistPosition(Position),
    Dispatch(ChatRequest),
    Notify(Notification),
    /// Observers should bring this message into view.
    ScrollToNewest(u64),
    /// The previous scroll target no longer exists.
    ResetScroll,
}

/// Widget state. Mutated only through [`WidgetState::apply`] or [`reduce`].
#[derive(Debug, Clone)]
pub struct WidgetState {
    pub(crate) open: bool,
    pub(crate) position: Position,
    pub(crate) viewport: Option<Viewport>,
    pub(crate) trigger_size: f64,
    pub(crate) drag: DragController,
    pub(crate) dispatcher: ChatDispatcher,
    pub(crate) conversation: ConversationLog,
    pub(crate) input: String,
    pub(crate) session_id: SessionId,
    pub(crate) user_id: Option<String>,
    pub(crate) theme: Theme,
}

impl WidgetState {
    /// Initial state: closed, empty conversation, idle request.
    #[must_use]
    pub fn new(position: Position, viewport: Option<Viewport>, trigger_size: f64, session_id: SessionId) -> Self {
        Self {
            open: false,
            position,
            viewport,
            trigger_size,
            drag: DragController::new(),
            dispatcher: ChatDispatcher::new(),
            conversation: ConversationLog::new(),
            input: String::new(),
            session_id,
            user_id: None,
            theme: Theme::default(),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[must_use]
    pub fn trigger_size(&self) -> f64 {
        self.trigger_size
    }

    #[must_use]
    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    #[must_use]
    pub fn dispatcher(&self) -> &ChatDispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn request_state(&self) -> RequestState {
        self.dispatcher.state()
    }

    /// Whether the current input would be accepted by a send.
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.input.trim().is_empty() && !self.dispatcher.is_pending()
    }

    /// Apply one event and return the effects it requests.
    pub fn apply(&mut self, event: WidgetEvent) -> Vec<Effect> {
        match event {
            WidgetEvent::Host(host) => self.apply_host(host),
            WidgetEvent::ChatCompleted(outcome) => self.apply_completion(outcome),
        }
    }

    fn apply_host(&mut self, event: HostEvent) -> Vec<Effect> {
        match event {
            HostEvent::ToggleOpen => {
                if !self.drag.is_dragging() {
                    self.open = !self.open;
                }
                Vec::new()
            }
            HostEvent::SetInput(text) => {
                self.input = text;
                Vec::new()
            }
            HostEvent::Send(text) => self.send(&text),
            HostEvent::ClearConversation => {
                self.conversation.clear();
                vec![Effect::ResetScroll, Effect::Notify(Notification::success(CLEARED_NOTICE))]
            }
            HostEvent::PointerDown { pointer, button } => {
                self.drag.pointer_down(pointer, button, self.position);
                Vec::new()
            }
            HostEvent::PointerMove { pointer } => {
                let outcome = self
                    .drag
                    .pointer_move(pointer, self.viewport, self.trigger_size);
                self.apply_drag(outcome)
            }
            HostEvent::PointerUp { .. } => {
                let outcome = self.drag.pointer_up(self.position);
                self.apply_drag(outcome)
            }
            HostEvent::PointerLeaveWindow => {
                let outcome = self.drag.pointer_leave(self.position);
                self.apply_drag(outcome)
            }
            HostEvent::Resize(viewport) => {
                self.viewport = Some(viewport);
                self.position = clamp(self.position, viewport, self.trigger_size);
                Vec::new()
            }
            HostEvent::IdentityChanged(user_id) => {
                self.user_id = user_id;
                Vec::new()
            }
            HostEvent::ThemeChanged(theme) => {
                self.theme = theme;
                Vec::new()
            }
            // Listener release is the controller's job; state is untouched.
            HostEvent::Teardown => Vec::new(),
        }
    }

    fn send(&mut self, text: &str) -> Vec<Effect> {
        let Some(dispatch) = self.dispatcher.begin(
            &mut self.conversation,
            text,
            &self.session_id,
            self.user_id.as_deref(),
        ) else {
            return Vec::new();
        };
        self.input.clear();
        vec![Effect::ScrollToNewest(dispatch.message_id), Effect::Dispatch(dispatch.request)]
    }

    fn apply_drag(&mut self, outcome: DragOutcome) -> Vec<Effect> {
        match outcome {
            DragOutcome::Ignored | DragOutcome::Started => Vec::new(),
            DragOutcome::Moved(position) => {
                self.position = position;
                Vec::new()
            }
            DragOutcome::Released { position, click } => {
                self.position = position;
                if click {
                    self.open = !self.open;
                }
                vec![Effect::PersistPosition(position)]
            }
        }
    }

    fn apply_completion(&mut self, outcome: Result<ChatReply, ChatError>) -> Vec<Effect> {
        match self.dispatcher.complete(&mut self.conversation, outcome) {
            None => Vec::new(),
            Some(Completion::Answered { message_id }) => vec![Effect::ScrollToNewest(message_id)],
            Some(Completion::Failed { message_id, .. }) => vec![
                Effect::ScrollToNewest(message_id),
                Effect::Notify(Notification::error(FAILURE_NOTICE)),
            ],
        }
    }
}

/// By-value transition: `(state, event) -> (state', effects)`.
#[must_use]
pub fn reduce(mut state: WidgetState, event: WidgetEvent) -> (WidgetState, Vec<Effect>) {
    let effects = state.apply(event);
    (state, effects)
}
