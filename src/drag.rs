//! Pointer gesture state machine for repositioning the trigger.
//!
//! `Idle --down(primary)--> Dragging --move--> Dragging --up|leave--> Idle`
//!
//! The grab offset captured on pointer-down keeps the trigger fixed under
//! the pointer instead of snapping its corner to it. Moves produce clamped
//! live positions without persisting; the release reports the final
//! position for the caller to persist, and whether the gesture was a plain
//! click (released with no intervening move) that should toggle the window.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::position::{Position, Viewport, clamp};

/// A pointer location in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// Pointer position relative to the trigger's top-left at grab time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        offset: Offset,
        /// At least one move arrived since pointer-down.
        moved: bool,
    },
}

/// What a pointer event did to the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Event had no effect (wrong button, or no gesture in progress).
    Ignored,
    /// A drag gesture began.
    Started,
    /// The trigger's live position changed.
    Moved(Position),
    /// The gesture ended; `position` should be persisted.
    Released {
        position: Position,
        /// Released with no intervening move: treat as a click on the trigger.
        click: bool,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Begin a gesture when the primary button goes down on the trigger.
    pub fn pointer_down(&mut self, pointer: Point, button: Button, trigger: Position) -> DragOutcome {
        if button != Button::Primary || self.is_dragging() {
            return DragOutcome::Ignored;
        }
        let offset = Offset { dx: pointer.x - trigger.x, dy: pointer.y - trigger.y };
        self.state = DragState::Dragging { offset, moved: false };
        DragOutcome::Started
    }

    /// Follow the pointer. The result is clamped when the viewport is known.
    pub fn pointer_move(&mut self, pointer: Point, viewport: Option<Viewport>, trigger_size: f64) -> DragOutcome {
        let DragState::Dragging { offset, .. } = self.state else {
            return DragOutcome::Ignored;
        };
        self.state = DragState::Dragging { offset, moved: true };
        let raw = Position { x: pointer.x - offset.dx, y: pointer.y - offset.dy };
        let position = match viewport {
            Some(vp) => clamp(raw, vp, trigger_size),
            None => raw,
        };
        DragOutcome::Moved(position)
    }

    /// End the gesture on pointer-up. `current` is the live trigger position.
    pub fn pointer_up(&mut self, current: Position) -> DragOutcome {
        let DragState::Dragging { moved, .. } = self.state else {
            return DragOutcome::Ignored;
        };
        self.state = DragState::Idle;
        DragOutcome::Released { position: current, click: !moved }
    }

    /// End the gesture because the pointer left the window. Never a click.
    pub fn pointer_leave(&mut self, current: Position) -> DragOutcome {
        if !self.is_dragging() {
            return DragOutcome::Ignored;
        }
        self.state = DragState::Idle;
        DragOutcome::Released { position: current, click: false }
    }
}
