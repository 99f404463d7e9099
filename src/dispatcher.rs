//! Chat request lifecycle: optimistic append, single in-flight request,
//! deterministic fallback.
//!
//! DESIGN
//! ======
//! A send is split into [`ChatDispatcher::begin`] (synchronous: validate,
//! append the user message, go `Pending`) and [`ChatDispatcher::complete`]
//! (synchronous: append the answer or the fallback, go `Idle`). The network
//! step in between is [`ChatDispatcher::execute`]. Splitting lets an event
//! loop keep handling other events while the request runs;
//! [`ChatDispatcher::send`] chains all three for callers that can simply
//! await.
//!
//! TRADE-OFFS
//! ==========
//! Exactly one attempt per send, no retry. A second send while `Pending` is
//! rejected rather than queued.

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod dispatcher_test;

use tracing::{debug, info, warn};

use crate::api::{ChatError, ChatReply, ChatRequest, ChatTransport};
use crate::conversation::{ConversationLog, NewMessage, SessionId};

/// Assistant-role text appended when a request fails for any reason.
pub const APOLOGY: &str = "Sorry, I'm having trouble answering right now. Please try again in a moment.";

/// Transient notification text shown alongside [`APOLOGY`].
pub const FAILURE_NOTICE: &str = "The AI assistant is unavailable. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
}

/// A request accepted by [`ChatDispatcher::begin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub request: ChatRequest,
    /// Id of the optimistically appended user message.
    pub message_id: u64,
}

/// How a pending request was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Answered { message_id: u64 },
    Failed { message_id: u64, error: ChatError },
}

impl Completion {
    #[must_use]
    pub fn message_id(&self) -> u64 {
        match self {
            Self::Answered { message_id } | Self::Failed { message_id, .. } => *message_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatDispatcher {
    state: RequestState,
}

impl ChatDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == RequestState::Pending
    }

    /// Accept `text` for sending: append it as a user message and go `Pending`.
    ///
    /// Returns `None` (and changes nothing) when the trimmed text is empty or
    /// a request is already pending.
    pub fn begin(
        &mut self,
        log: &mut ConversationLog,
        text: &str,
        session_id: &SessionId,
        user_id: Option<&str>,
    ) -> Option<Dispatch> {
        let question = text.trim();
        if question.is_empty() {
            return None;
        }
        if self.is_pending() {
            debug!(%session_id, "dispatcher: send rejected, request already pending");
            return None;
        }

        let message_id = log.append(NewMessage::user(question));
        self.state = RequestState::Pending;
        Some(Dispatch {
            request: ChatRequest {
                question: question.to_owned(),
                session_id: session_id.clone(),
                user_id: user_id.map(str::to_owned),
            },
            message_id,
        })
    }

    /// Perform the network step for `request`. One attempt, logged.
    ///
    /// # Errors
    ///
    /// Returns whatever [`ChatError`] the transport produced.
    pub async fn execute(transport: &dyn ChatTransport, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        info!(
            session_id = %request.session_id,
            question_len = request.question.len(),
            signed_in = request.user_id.is_some(),
            "dispatcher: chat request"
        );
        let outcome = transport.send(request).await;
        match &outcome {
            Ok(reply) => info!(
                session_id = %request.session_id,
                answer_len = reply.answer.len(),
                has_context = reply.context.is_some(),
                "dispatcher: chat answered"
            ),
            Err(e) => warn!(
                session_id = %request.session_id,
                error = %e,
                retryable = e.retryable(),
                "dispatcher: chat failed"
            ),
        }
        outcome
    }

    /// Apply the outcome of the pending request and return to `Idle`.
    ///
    /// Returns `None` when no request was pending; the outcome is dropped.
    pub fn complete(&mut self, log: &mut ConversationLog, outcome: Result<ChatReply, ChatError>) -> Option<Completion> {
        if !self.is_pending() {
            debug!("dispatcher: completion without pending request ignored");
            return None;
        }
        self.state = RequestState::Idle;
        let completion = match outcome {
            Ok(reply) => Completion::Answered { message_id: log.append(NewMessage::assistant(reply.answer, reply.context)) },
            Err(error) => Completion::Failed { message_id: log.append(NewMessage::assistant_error(APOLOGY)), error },
        };
        Some(completion)
    }

    /// Full send cycle in one call: `begin`, `execute`, `complete`.
    ///
    /// Returns `None` when the send was rejected by `begin`.
    pub async fn send(
        &mut self,
        log: &mut ConversationLog,
        transport: &dyn ChatTransport,
        text: &str,
        session_id: &SessionId,
        user_id: Option<&str>,
    ) -> Option<Completion> {
        let dispatch = self.begin(log, text, session_id, user_id)?;
        let outcome = Self::execute(transport, &dispatch.request).await;
        self.complete(log, outcome)
    }
}
