//! Render snapshot handed to the presentation layer.

use crate::conversation::Message;
use crate::position::Position;
use crate::theme::Theme;
use crate::widget::WidgetState;

/// Everything a renderer needs, detached from the live state.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub open: bool,
    pub position: Position,
    pub dragging: bool,
    pub theme: Theme,
    pub messages: Vec<Message>,
    /// A request is in flight; renderers show a typing indicator.
    pub pending: bool,
    pub input: String,
    pub can_send: bool,
    /// Latest message the renderer should scroll into view.
    pub scroll_to: Option<u64>,
}

impl WidgetView {
    #[must_use]
    pub fn snapshot(state: &WidgetState, scroll_to: Option<u64>) -> Self {
        Self {
            open: state.open,
            position: state.position,
            dragging: state.drag.is_dragging(),
            theme: state.theme,
            messages: state.conversation.messages().to_vec(),
            pending: state.dispatcher.is_pending(),
            input: state.input.clone(),
            can_send: state.can_send(),
            scroll_to,
        }
    }
}
