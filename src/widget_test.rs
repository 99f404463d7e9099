use super::*;
use crate::conversation::Role;
use crate::dispatcher::APOLOGY;
use crate::drag::{Button, Point};

const SIZE: f64 = 56.0;

fn state_at(x: f64, y: f64) -> WidgetState {
    WidgetState::new(Position::new(x, y), Some(Viewport::new(1280.0, 800.0)), SIZE, SessionId::generate())
}

fn host(state: &mut WidgetState, event: HostEvent) -> Vec<Effect> {
    state.apply(WidgetEvent::Host(event))
}

fn down(x: f64, y: f64) -> HostEvent {
    HostEvent::PointerDown { pointer: Point::new(x, y), button: Button::Primary }
}

fn mv(x: f64, y: f64) -> HostEvent {
    HostEvent::PointerMove { pointer: Point::new(x, y) }
}

fn up(x: f64, y: f64) -> HostEvent {
    HostEvent::PointerUp { pointer: Point::new(x, y) }
}

// =============================================================
// Initial state
// =============================================================

#[test]
fn initial_state_is_closed_idle_empty() {
    let state = state_at(10.0, 10.0);
    assert!(!state.open);
    assert!(state.conversation.is_empty());
    assert_eq!(state.request_state(), RequestState::Idle);
    assert!(state.input.is_empty());
    assert!(!state.can_send());
    assert_eq!(state.theme, Theme::Light);
}

// =============================================================
// Toggle and click-vs-drag
// =============================================================

#[test]
fn toggle_flips_open() {
    let mut state = state_at(10.0, 10.0);
    host(&mut state, HostEvent::ToggleOpen);
    assert!(state.open);
    host(&mut state, HostEvent::ToggleOpen);
    assert!(!state.open);
}

#[test]
fn toggle_ignored_while_dragging() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, down(110.0, 110.0));
    host(&mut state, HostEvent::ToggleOpen);
    assert!(!state.open);
}

#[test]
fn plain_click_toggles_and_persists() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, down(110.0, 110.0));
    let effects = host(&mut state, up(110.0, 110.0));
    assert!(state.open);
    assert_eq!(effects, vec![Effect::PersistPosition(Position::new(100.0, 100.0))]);
}

#[test]
fn drag_terminating_release_does_not_toggle() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, down(110.0, 110.0));
    host(&mut state, mv(111.0, 110.0));
    host(&mut state, up(111.0, 110.0));
    assert!(!state.open);

    host(&mut state, HostEvent::ToggleOpen);
    host(&mut state, down(115.0, 110.0));
    host(&mut state, mv(300.0, 300.0));
    host(&mut state, up(300.0, 300.0));
    assert!(state.open);
}

// =============================================================
// Dragging
// =============================================================

#[test]
fn drag_delta_is_applied_and_persisted_on_release() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, down(100.0, 100.0));
    assert!(host(&mut state, mv(130.0, 115.0)).is_empty());
    assert!(host(&mut state, mv(150.0, 130.0)).is_empty());
    assert_eq!(state.position, Position::new(150.0, 130.0));

    let effects = host(&mut state, up(150.0, 130.0));
    assert_eq!(effects, vec![Effect::PersistPosition(Position::new(150.0, 130.0))]);
}

#[test]
fn drag_grab_offset_prevents_jump() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, down(120.0, 140.0));
    host(&mut state, mv(121.0, 141.0));
    assert_eq!(state.position, Position::new(101.0, 101.0));
}

#[test]
fn drag_is_clamped_live() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, down(100.0, 100.0));
    host(&mut state, mv(-500.0, 5000.0));
    assert_eq!(state.position, Position::new(0.0, 800.0 - SIZE));
}

#[test]
fn leave_window_ends_drag_and_persists() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, down(100.0, 100.0));
    host(&mut state, mv(200.0, 200.0));
    let effects = host(&mut state, HostEvent::PointerLeaveWindow);
    assert_eq!(effects, vec![Effect::PersistPosition(Position::new(200.0, 200.0))]);
    assert!(!state.drag.is_dragging());
    assert!(!state.open);
}

#[test]
fn secondary_button_does_not_drag() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, HostEvent::PointerDown { pointer: Point::new(100.0, 100.0), button: Button::Secondary });
    host(&mut state, mv(200.0, 200.0));
    assert_eq!(state.position, Position::new(100.0, 100.0));
    assert!(host(&mut state, up(200.0, 200.0)).is_empty());
    assert!(!state.open);
}

#[test]
fn resize_reclamps_without_drag_or_persist() {
    let mut state = state_at(1200.0, 700.0);
    let effects = host(&mut state, HostEvent::Resize(Viewport::new(640.0, 480.0)));
    assert!(effects.is_empty());
    assert_eq!(state.position, Position::new(640.0 - SIZE, 480.0 - SIZE));
    assert_eq!(state.viewport, Some(Viewport::new(640.0, 480.0)));
}

// =============================================================
// Sending
// =============================================================

#[test]
fn whitespace_send_is_silent_noop() {
    let mut state = state_at(0.0, 0.0);
    host(&mut state, HostEvent::SetInput("  ".into()));
    let effects = host(&mut state, HostEvent::Send("  ".into()));
    assert!(effects.is_empty());
    assert!(state.conversation.is_empty());
    assert_eq!(state.request_state(), RequestState::Idle);
    assert_eq!(state.input, "  ");
}

#[test]
fn send_clears_input_and_dispatches() {
    let mut state = state_at(0.0, 0.0);
    host(&mut state, HostEvent::IdentityChanged(Some("user-7".into())));
    host(&mut state, HostEvent::SetInput("hello".into()));
    assert!(state.can_send());

    let effects = host(&mut state, HostEvent::Send("hello".into()));

    assert!(state.input.is_empty());
    assert_eq!(state.request_state(), RequestState::Pending);
    assert_eq!(state.conversation.len(), 1);
    let user_msg_id = state.conversation.last().unwrap().id;
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::ScrollToNewest(user_msg_id));
    let Effect::Dispatch(request) = &effects[1] else {
        panic!("expected dispatch, got {:?}", effects[1]);
    };
    assert_eq!(request.question, "hello");
    assert_eq!(request.session_id, state.session_id);
    assert_eq!(request.user_id.as_deref(), Some("user-7"));
}

#[test]
fn send_while_pending_is_noop() {
    let mut state = state_at(0.0, 0.0);
    host(&mut state, HostEvent::Send("first".into()));
    host(&mut state, HostEvent::SetInput("hello".into()));
    assert!(!state.can_send());

    let effects = host(&mut state, HostEvent::Send("hello".into()));
    assert!(effects.is_empty());
    assert_eq!(state.conversation.len(), 1);
    assert_eq!(state.input, "hello");
}

#[test]
fn success_completion_appends_answer() {
    let mut state = state_at(0.0, 0.0);
    host(&mut state, HostEvent::Send("hello".into()));
    let effects = state.apply(WidgetEvent::ChatCompleted(Ok(ChatReply { answer: "hi".into(), context: None })));

    assert_eq!(state.conversation.len(), 2);
    let last = state.conversation.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "hi");
    assert_eq!(effects, vec![Effect::ScrollToNewest(last.id)]);
    assert_eq!(state.request_state(), RequestState::Idle);
}

#[test]
fn failed_completion_appends_apology_and_notifies() {
    let mut state = state_at(0.0, 0.0);
    host(&mut state, HostEvent::Send("hello".into()));
    let effects = state.apply(WidgetEvent::ChatCompleted(Err(ChatError::Request("offline".into()))));

    assert_eq!(state.conversation.len(), 2);
    let last = state.conversation.last().unwrap();
    assert!(last.is_error);
    assert_eq!(last.content, APOLOGY);
    assert_eq!(
        effects,
        vec![Effect::ScrollToNewest(last.id), Effect::Notify(Notification::error(FAILURE_NOTICE))]
    );
    assert_eq!(state.request_state(), RequestState::Idle);
}

#[test]
fn completion_while_idle_is_ignored() {
    let mut state = state_at(0.0, 0.0);
    let effects = state.apply(WidgetEvent::ChatCompleted(Ok(ChatReply { answer: "late".into(), context: None })));
    assert!(effects.is_empty());
    assert!(state.conversation.is_empty());
}

#[test]
fn drag_and_toggle_still_work_while_pending() {
    let mut state = state_at(100.0, 100.0);
    host(&mut state, HostEvent::Send("hello".into()));
    host(&mut state, HostEvent::ToggleOpen);
    host(&mut state, down(100.0, 100.0));
    host(&mut state, mv(120.0, 120.0));
    host(&mut state, up(120.0, 120.0));
    assert!(state.open);
    assert_eq!(state.position, Position::new(120.0, 120.0));
    assert_eq!(state.request_state(), RequestState::Pending);
}

// =============================================================
// Clearing, identity, theme
// =============================================================

#[test]
fn clear_empties_log_keeps_session_and_notifies() {
    let mut state = state_at(0.0, 0.0);
    let session = state.session_id.clone();
    host(&mut state, HostEvent::Send("hello".into()));
    state.apply(WidgetEvent::ChatCompleted(Ok(ChatReply { answer: "hi".into(), context: None })));

    let effects = host(&mut state, HostEvent::ClearConversation);

    assert!(state.conversation.is_empty());
    assert_eq!(state.session_id, session);
    assert_eq!(
        effects,
        vec![Effect::ResetScroll, Effect::Notify(Notification::success(CLEARED_NOTICE))]
    );
}

#[test]
fn theme_change_is_recorded() {
    let mut state = state_at(0.0, 0.0);
    host(&mut state, HostEvent::ThemeChanged(Theme::Dark));
    assert_eq!(state.theme, Theme::Dark);
}

#[test]
fn teardown_leaves_state_untouched() {
    let mut state = state_at(5.0, 6.0);
    assert!(host(&mut state, HostEvent::Teardown).is_empty());
    assert_eq!(state.position, Position::new(5.0, 6.0));
}

#[test]
fn reduce_is_by_value_apply() {
    let state = state_at(0.0, 0.0);
    let (state, effects) = reduce(state, WidgetEvent::Host(HostEvent::ToggleOpen));
    assert!(state.open);
    assert!(effects.is_empty());
}
