// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events consumed by the diagram, effects it emits, and the read-only
//! traits its collaborators implement.
//!
//! The diagram is a synchronous reducer: the host feeds it
//! [`PointerEvent`]s (plus focus and key notifications), and it returns
//! [`Effect`] values describing every externally observable consequence —
//! rotation deltas for the time model, a cursor change, visual flag flips.
//! State reads go the other way through [`TimeModel`] and [`Layout`], which
//! the host passes by reference into each call; the diagram never holds or
//! mutates its collaborators.

use kurbo::Point;

use orrery_gesture::session::TouchId;

use crate::body::{BodyId, RotationUnit};

/// Opaque snapshot of the time model's state, captured at drag start and
/// echoed back with every delta so the model can apply them against a fixed
/// baseline rather than a moving target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeToken(pub u64);

/// Read-only view of the external time model.
pub trait TimeModel {
    /// The body's current phase angle, radians in the body's convention.
    fn phase_angle(&self, body: BodyId) -> f64;

    /// Snapshot of the model's current state.
    fn checkpoint(&self) -> TimeToken;
}

/// Read-only view of the diagram's layout.
///
/// The diagram never computes or mutates layout; it only needs to know
/// where things currently are.
pub trait Layout {
    /// Screen position of the shared pivot (the orbit center).
    fn pivot(&self) -> Point;

    /// Screen position of a body's center.
    fn body_center(&self, body: BodyId) -> Point;

    /// A body's current radius in pixels.
    fn body_radius(&self, body: BodyId) -> f64;
}

/// A pointer notification from the host.
///
/// Mouse events carry no id (the primary pointer is exclusive); touch
/// events are identified per finger. `MouseLeave` and `TouchCancel` are the
/// "pointer lost" notifications: same consequences as a release, minus the
/// user's intent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Primary pointer pressed.
    MouseDown(Point),
    /// Primary pointer moved (pressed or not).
    MouseMove(Point),
    /// Primary pointer released.
    MouseUp,
    /// Primary pointer left the widget or was lost.
    MouseLeave,
    /// A finger landed.
    TouchStart {
        /// Per-session finger id.
        id: TouchId,
        /// Landing point.
        point: Point,
    },
    /// A finger moved.
    TouchMove {
        /// Per-session finger id.
        id: TouchId,
        /// New position.
        point: Point,
    },
    /// A finger lifted.
    TouchEnd {
        /// Per-session finger id.
        id: TouchId,
    },
    /// A finger was lost to the system (palm rejection, focus steal, ...).
    TouchCancel {
        /// Per-session finger id.
        id: TouchId,
    },
}

/// A key press routed to the focused body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Nudge backward.
    Left,
    /// Nudge forward.
    Right,
    /// Nudge forward.
    Up,
    /// Nudge backward.
    Down,
}

impl Key {
    /// Signed nudge direction: forward is `+1.0`.
    #[must_use]
    pub fn direction(self) -> f64 {
        match self {
            Self::Right | Self::Up => 1.0,
            Self::Left | Self::Down => -1.0,
        }
    }
}

/// Cursor affordances the diagram may request.
///
/// The effective cursor is reported through [`Effect::Cursor`]; `None`
/// there means "restore the host default".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CursorIcon {
    /// An open hand: this body could be grabbed.
    Grab,
    /// A closed hand: a drag is in progress.
    Grabbing,
}

/// Broker key for a cursor request source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CursorSource {
    Hover(BodyId),
    Drag(BodyId),
}

/// A rotation delta for the external time model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RotationDelta {
    /// Which body was rotated.
    pub body: BodyId,
    /// Signed amount in `unit`s since `baseline`. One full rotation of the
    /// body is one unit.
    pub amount: f64,
    /// The body's delta vocabulary.
    pub unit: RotationUnit,
    /// The model snapshot this delta is relative to.
    pub baseline: TimeToken,
    /// Whether the model should animate toward the new state. Always
    /// `false` for drag-driven deltas; `true` for keyboard nudges.
    pub animate: bool,
}

/// An externally observable consequence of reducing one event.
///
/// Effects are emitted at most once per actual change; replaying an event
/// that changes nothing yields no effects.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Effect {
    /// Forward a rotation delta to the time model.
    Rotate(RotationDelta),
    /// Apply a global cursor (`None` restores the default).
    Cursor(Option<CursorIcon>),
    /// Show or hide a body's roll-over/drag highlight.
    Highlight(BodyId, bool),
    /// Show or hide a body's keyboard focus ring.
    FocusRing(BodyId, bool),
    /// Add a body to, or remove it from, the tab order.
    Tabbable(BodyId, bool),
}
