//! Trigger position: persistence, defaults, and viewport clamping.
//!
//! DESIGN
//! ======
//! The persisted value under [`POSITION_KEY`] is the only source of truth
//! for where the trigger sits across reloads. Reads and writes are
//! best-effort: any storage or parse failure falls back to a computed
//! default and is logged, never surfaced.

#[cfg(test)]
#[path = "position_test.rs"]
mod position_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

/// Storage key for the persisted trigger position.
pub const POSITION_KEY: &str = "ai-chatbot-position";

/// Position used when no viewport is known (non-interactive hosts).
pub const FALLBACK_POSITION: Position = Position { x: 24.0, y: 24.0 };

/// Viewport pixel coordinates of the trigger's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visible viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Project `position` so the whole trigger stays inside the viewport.
///
/// Each axis lands in `[0, dimension - trigger_size]`; when the viewport is
/// smaller than the trigger the upper bound collapses to zero. Non-finite
/// coordinates snap to zero. Idempotent.
#[must_use]
pub fn clamp(position: Position, viewport: Viewport, trigger_size: f64) -> Position {
    Position {
        x: clamp_axis(position.x, viewport.width, trigger_size),
        y: clamp_axis(position.y, viewport.height, trigger_size),
    }
}

fn clamp_axis(value: f64, dimension: f64, trigger_size: f64) -> f64 {
    let upper = dimension - trigger_size;
    let upper = if upper.is_finite() { upper.max(0.0) } else { 0.0 };
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, upper)
}

/// Bottom-right default: `dimension - trigger_size - margin` on each axis.
#[must_use]
pub fn default_position(viewport: Option<Viewport>, trigger_size: f64, margin: f64) -> Position {
    match viewport {
        Some(vp) => clamp(
            Position { x: vp.width - trigger_size - margin, y: vp.height - trigger_size - margin },
            vp,
            trigger_size,
        ),
        None => FALLBACK_POSITION,
    }
}

// =============================================================================
// POSITION STORE
// =============================================================================

/// Persists and restores the trigger position through a [`KeyValueStore`].
pub struct PositionStore<S> {
    store: S,
    trigger_size: f64,
    margin: f64,
}

impl<S: KeyValueStore> PositionStore<S> {
    pub fn new(store: S, trigger_size: f64, margin: f64) -> Self {
        Self { store, trigger_size, margin }
    }

    #[must_use]
    pub fn trigger_size(&self) -> f64 {
        self.trigger_size
    }

    /// Borrow the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restore the persisted position, clamped to `viewport` when known.
    ///
    /// Missing, unreadable, or unparseable values fall back to
    /// [`default_position`].
    pub fn load(&self, viewport: Option<Viewport>) -> Position {
        let fallback = || default_position(viewport, self.trigger_size, self.margin);
        let raw = match self.store.get(POSITION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback(),
            Err(e) => {
                warn!(error = %e, "position: storage read failed, using default");
                return fallback();
            }
        };
        match serde_json::from_str::<Position>(&raw) {
            Ok(saved) => match viewport {
                Some(vp) => clamp(saved, vp, self.trigger_size),
                None => saved,
            },
            Err(e) => {
                warn!(error = %e, "position: persisted value unparseable, using default");
                fallback()
            }
        }
    }

    /// Persist `position`. Failures are logged and swallowed.
    pub fn save(&mut self, position: Position) {
        let raw = match serde_json::to_string(&position) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "position: serialize failed");
                return;
            }
        };
        match self.store.set(POSITION_KEY, &raw) {
            Ok(()) => debug!(x = position.x, y = position.y, "position: saved"),
            Err(e) => warn!(error = %e, "position: storage write failed"),
        }
    }
}
