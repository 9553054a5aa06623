// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orrery Diagram: the widget assembly for a two-body draggable orbit
//! diagram.
//!
//! An [`OrbitDiagram`] owns the two bodies (inner at the pivot, outer on the
//! orbit circle), one drag arbitrator, and one cursor broker. The host feeds
//! it pointer, focus, and key notifications; the diagram reduces each into a
//! list of [`Effect`]s — rotation deltas for the external time model, cursor
//! changes, visual flag flips — and never touches its collaborators
//! directly. Layout and time state are read through the [`Layout`] and
//! [`TimeModel`] traits passed into every call, so the diagram holds no
//! references and the host stays free to reshape its world between events.
//!
//! ## Usage
//!
//! ```
//! use kurbo::Point;
//! use orrery_diagram::body::{BodyConfig, BodyId};
//! use orrery_diagram::types::{Effect, Layout, PointerEvent, TimeModel, TimeToken};
//! use orrery_diagram::OrbitDiagram;
//!
//! // A time model frozen at phase zero.
//! struct Still;
//! impl TimeModel for Still {
//!     fn phase_angle(&self, _body: BodyId) -> f64 {
//!         0.0
//!     }
//!     fn checkpoint(&self) -> TimeToken {
//!         TimeToken(0)
//!     }
//! }
//!
//! // A fixed layout: pivot at (100, 100), the outer body due west of it.
//! struct Fixed;
//! impl Layout for Fixed {
//!     fn pivot(&self) -> Point {
//!         Point::new(100.0, 100.0)
//!     }
//!     fn body_center(&self, body: BodyId) -> Point {
//!         match body {
//!             BodyId::Inner => Point::new(100.0, 100.0),
//!             BodyId::Outer => Point::new(20.0, 100.0),
//!         }
//!     }
//!     fn body_radius(&self, body: BodyId) -> f64 {
//!         match body {
//!             BodyId::Inner => 30.0,
//!             BodyId::Outer => 14.0,
//!         }
//!     }
//! }
//!
//! let mut diagram = OrbitDiagram::builder()
//!     .body(BodyId::Inner, BodyConfig::earth())
//!     .unwrap()
//!     .body(BodyId::Outer, BodyConfig::moon())
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! // Press on the outer body and drag it a quarter orbit.
//! diagram.handle(&Fixed, &Still, PointerEvent::MouseDown(Point::new(20.0, 100.0)));
//! assert_eq!(diagram.dragging_body(), Some(BodyId::Outer));
//!
//! let effects = diagram.handle(&Fixed, &Still, PointerEvent::MouseMove(Point::new(100.0, 180.0)));
//! let rotated = effects.iter().find_map(|e| match e {
//!     Effect::Rotate(delta) => Some(delta.amount),
//!     _ => None,
//! });
//! assert!((rotated.unwrap() - 0.25).abs() < 1e-9);
//! ```
//!
//! ## Batched input
//!
//! Touch notifications may arrive in bursts — several simultaneous
//! touch-starts delivered together. [`OrbitDiagram::handle_batch`] resolves
//! such a burst atomically: every touch-start in the batch is scored against
//! both bodies, exactly one session starts on the best candidate, and the
//! rest join its backup pool. No intermediate state is observable mid-batch.
//!
//! This crate is `no_std` compatible.

#![no_std]

extern crate alloc;

pub mod body;
pub mod types;

use alloc::vec::Vec;

use kurbo::Point;
use smallvec::SmallVec;

use orrery_arbiter::DragArbitrator;
use orrery_arbiter::cursor::CursorBroker;
use orrery_arbiter::visual::{VisualFlags, VisualInputs, VisualStateController, VisualTransition};
use orrery_gesture::controller::{BodyGeometry, DragController, Motion, Release};
use orrery_gesture::session::{PointerKind, TouchId};

use crate::body::{BodyConfig, BodyId, PlacedBody};
use crate::types::{
    CursorIcon, CursorSource, Effect, Key, Layout, PointerEvent, RotationDelta, TimeModel,
};

/// Error raised by [`DiagramBuilder`] on invalid registration.
///
/// Both cases are fatal: the widget refuses to run with partial wiring.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// The same body slot was configured twice.
    AlreadyRegistered(BodyId),
    /// A body slot was never configured.
    Missing(BodyId),
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyRegistered(body) => write!(f, "body {body:?} registered twice"),
            Self::Missing(body) => write!(f, "body {body:?} was never registered"),
        }
    }
}

impl core::error::Error for BuildError {}

/// Builder for [`OrbitDiagram`]: both bodies must be registered exactly
/// once.
#[derive(Clone, Debug, Default)]
pub struct DiagramBuilder {
    slots: [Option<BodyConfig>; 2],
}

impl DiagramBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the configuration for one body.
    pub fn body(mut self, id: BodyId, config: BodyConfig) -> Result<Self, BuildError> {
        let slot = &mut self.slots[id.index()];
        if slot.is_some() {
            return Err(BuildError::AlreadyRegistered(id));
        }
        *slot = Some(config);
        Ok(self)
    }

    /// Finishes construction, failing if either body is missing.
    pub fn build(self) -> Result<OrbitDiagram, BuildError> {
        let [inner, outer] = self.slots;
        let inner = inner.ok_or(BuildError::Missing(BodyId::Inner))?;
        let outer = outer.ok_or(BuildError::Missing(BodyId::Outer))?;
        Ok(OrbitDiagram {
            bodies: [BodySlot::new(inner), BodySlot::new(outer)],
            arbiter: DragArbitrator::new(),
            cursors: CursorBroker::new(),
        })
    }
}

#[derive(Clone, Debug)]
struct BodySlot {
    config: BodyConfig,
    controller: DragController<types::TimeToken>,
    visual: VisualStateController,
    hovered: bool,
    focused: bool,
}

impl BodySlot {
    fn new(config: BodyConfig) -> Self {
        Self {
            config,
            controller: DragController::new(),
            visual: VisualStateController::new(),
            hovered: false,
            focused: false,
        }
    }
}

/// The assembled two-body widget core.
///
/// All state transitions happen synchronously inside the call that delivers
/// the input; the returned effects are complete by the time the call
/// returns. See the crate docs for the full protocol.
#[derive(Clone, Debug)]
pub struct OrbitDiagram {
    bodies: [BodySlot; 2],
    arbiter: DragArbitrator<BodyId>,
    cursors: CursorBroker<CursorSource, CursorIcon>,
}

impl OrbitDiagram {
    /// Starts building a diagram.
    #[must_use]
    pub fn builder() -> DiagramBuilder {
        DiagramBuilder::new()
    }

    /// Returns the body currently being dragged, if any.
    #[must_use]
    pub fn dragging_body(&self) -> Option<BodyId> {
        self.arbiter.holder()
    }

    /// Returns `true` while the host permits dragging.
    #[must_use]
    pub fn is_drag_allowed(&self) -> bool {
        self.arbiter.is_drag_allowed()
    }

    /// Returns a body's currently applied visual flags.
    #[must_use]
    pub fn visual_flags(&self, body: BodyId) -> VisualFlags {
        self.bodies[body.index()].visual.flags()
    }

    /// Returns `true` while the pointer hovers a body's hit region.
    #[must_use]
    pub fn is_hovered(&self, body: BodyId) -> bool {
        self.bodies[body.index()].hovered
    }

    /// Returns the cursor currently in effect (`None` = host default).
    #[must_use]
    pub fn effective_cursor(&self) -> Option<CursorIcon> {
        self.cursors.effective()
    }

    /// Reduces a single pointer event.
    pub fn handle(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        event: PointerEvent,
    ) -> Vec<Effect> {
        self.handle_batch(layout, model, core::slice::from_ref(&event))
    }

    /// Reduces a burst of pointer events atomically.
    ///
    /// Touch-starts in the batch are held back and resolved as one group
    /// after the other events: each is scored against both bodies, the
    /// lowest finite score starts the session, and the remaining touches
    /// join its backup pool instead of competing for a second drag.
    pub fn handle_batch(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        events: &[PointerEvent],
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let mut starts: SmallVec<[(TouchId, Point); 4]> = SmallVec::new();
        for event in events {
            match *event {
                PointerEvent::TouchStart { id, point } => starts.push((id, point)),
                other => self.reduce(layout, model, other, &mut effects),
            }
        }
        if !starts.is_empty() {
            self.reduce_touch_starts(layout, model, &starts, &mut effects);
        }
        self.refresh(&mut effects);
        effects
    }

    /// Enables or disables dragging, per the host's interactivity rules.
    ///
    /// Disabling cancels any in-progress drag synchronously: by the time
    /// this returns, no session exists and stale pointer ids are no-ops.
    pub fn set_dragging_allowed(&mut self, allowed: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.arbiter.set_drag_allowed(allowed) {
            return effects;
        }
        if !allowed {
            for body in BodyId::ALL {
                if self.bodies[body.index()].controller.cancel() {
                    self.arbiter.notify_drag_end(body);
                    self.request_cursor(CursorSource::Drag(body), None, &mut effects);
                }
            }
        }
        self.refresh(&mut effects);
        effects
    }

    /// Records keyboard focus arriving on a body.
    pub fn focus_gained(&mut self, body: BodyId) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.bodies[body.index()].focused = true;
        self.refresh(&mut effects);
        effects
    }

    /// Records keyboard focus leaving a body.
    pub fn focus_lost(&mut self, body: BodyId) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.bodies[body.index()].focused = false;
        self.refresh(&mut effects);
        effects
    }

    /// Reduces a key press on the focused body into a rotation nudge.
    ///
    /// Nudges are suppressed while any drag is in progress (the drag owns
    /// the time model) and while dragging is disallowed.
    pub fn key_press(&mut self, model: &impl TimeModel, body: BodyId, key: Key) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.arbiter.is_drag_allowed() || self.arbiter.holder().is_some() {
            return effects;
        }
        let config = &self.bodies[body.index()].config;
        effects.push(Effect::Rotate(RotationDelta {
            body,
            amount: key.direction() * config.nudge_amount,
            unit: config.unit,
            baseline: model.checkpoint(),
            animate: true,
        }));
        effects
    }

    fn reduce(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        event: PointerEvent,
        effects: &mut Vec<Effect>,
    ) {
        match event {
            PointerEvent::MouseDown(point) => {
                self.update_hover(layout, model, point);
                self.try_begin_primary(layout, model, point, effects);
            }
            PointerEvent::MouseMove(point) => {
                self.update_hover(layout, model, point);
                self.primary_motion(layout, model, point, effects);
            }
            PointerEvent::MouseUp => {
                self.release_primary(layout, model, effects);
            }
            PointerEvent::MouseLeave => {
                for body in BodyId::ALL {
                    self.bodies[body.index()].hovered = false;
                }
                self.release_primary(layout, model, effects);
            }
            PointerEvent::TouchMove { id, point } => {
                self.touch_motion(layout, model, id, point, effects);
            }
            PointerEvent::TouchEnd { id } | PointerEvent::TouchCancel { id } => {
                self.release_touch(layout, model, id, effects);
            }
            PointerEvent::TouchStart { .. } => {
                // Grouped by `handle_batch`; never reaches here.
                debug_assert!(false, "touch start escaped batching");
            }
        }
    }

    /// Scores a primary press against both bodies and starts the winner.
    fn try_begin_primary(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        point: Point,
        effects: &mut Vec<Effect>,
    ) {
        let mut best: Option<(BodyId, f64)> = None;
        for body in BodyId::ALL {
            let placed = self.placed(layout, model, body);
            let permitted = self.arbiter.can_initiate(body);
            let score = self.bodies[body.index()].controller.initiation_score(
                &placed,
                point,
                PointerKind::Primary,
                permitted,
            );
            if score.is_finite() && best.is_none_or(|(_, s)| score < s) {
                best = Some((body, score));
            }
        }
        let Some((body, _)) = best else { return };
        let placed = self.placed(layout, model, body);
        let phase = model.phase_angle(body);
        self.bodies[body.index()]
            .controller
            .begin_primary(&placed, point, phase, model.checkpoint());
        self.arbiter.notify_drag_start(body);
        self.request_cursor(CursorSource::Drag(body), Some(CursorIcon::Grabbing), effects);
    }

    fn primary_motion(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        point: Point,
        effects: &mut Vec<Effect>,
    ) {
        let Some(body) = self.arbiter.holder() else {
            return;
        };
        if self.bodies[body.index()].controller.kind() != Some(PointerKind::Primary) {
            // A stray mouse move during a touch drag only updates hover.
            return;
        }
        let placed = self.placed(layout, model, body);
        let phase = model.phase_angle(body);
        let motion = self.bodies[body.index()]
            .controller
            .motion(&placed, None, point, phase);
        if let Motion::Dragged(rotations) = motion {
            self.emit_rotation(body, rotations, effects);
        }
    }

    fn release_primary(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        effects: &mut Vec<Effect>,
    ) {
        let Some(body) = self.arbiter.holder() else {
            return;
        };
        if self.bodies[body.index()].controller.kind() != Some(PointerKind::Primary) {
            return;
        }
        let placed = self.placed(layout, model, body);
        let phase = model.phase_angle(body);
        let release = self.bodies[body.index()]
            .controller
            .release(&placed, None, phase);
        if release == Release::Ended {
            self.end_drag(body, effects);
        }
    }

    fn touch_motion(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        id: TouchId,
        point: Point,
        effects: &mut Vec<Effect>,
    ) {
        let Some(body) = self.arbiter.holder() else {
            return;
        };
        let placed = self.placed(layout, model, body);
        let phase = model.phase_angle(body);
        let motion = self.bodies[body.index()]
            .controller
            .motion(&placed, Some(id), point, phase);
        match motion {
            Motion::Dragged(rotations) => self.emit_rotation(body, rotations, effects),
            Motion::BackupMoved => {}
            Motion::Ignored => {
                log::debug!("ignoring move for touch {id:?} unknown to the active session");
            }
        }
    }

    fn release_touch(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        id: TouchId,
        effects: &mut Vec<Effect>,
    ) {
        let Some(body) = self.arbiter.holder() else {
            return;
        };
        let placed = self.placed(layout, model, body);
        let phase = model.phase_angle(body);
        let release = self.bodies[body.index()]
            .controller
            .release(&placed, Some(id), phase);
        match release {
            Release::Ended => self.end_drag(body, effects),
            Release::Promoted(successor) => {
                log::debug!("touch {id:?} lost; {successor:?} took over");
            }
            Release::BackupDropped | Release::Ignored => {}
        }
    }

    /// Resolves a group of simultaneous touch-starts.
    fn reduce_touch_starts(
        &mut self,
        layout: &impl Layout,
        model: &impl TimeModel,
        starts: &[(TouchId, Point)],
        effects: &mut Vec<Effect>,
    ) {
        if let Some(holder) = self.arbiter.holder() {
            let slot = &mut self.bodies[holder.index()];
            if slot.controller.kind() == Some(PointerKind::Multi) {
                for &(id, point) in starts {
                    slot.controller.add_backup(id, point);
                }
            } else {
                log::debug!("ignoring {} touch(es) during a mouse drag", starts.len());
            }
            return;
        }

        // Score every (touch, body) pair; the global minimum wins.
        let mut best: Option<(BodyId, TouchId, Point, f64)> = None;
        for &(id, point) in starts {
            for body in BodyId::ALL {
                let placed = self.placed(layout, model, body);
                let permitted = self.arbiter.can_initiate(body);
                let score = self.bodies[body.index()].controller.initiation_score(
                    &placed,
                    point,
                    PointerKind::Multi,
                    permitted,
                );
                if score.is_finite() && best.is_none_or(|(_, _, _, s)| score < s) {
                    best = Some((body, id, point, score));
                }
            }
        }
        let Some((body, winner, point, _)) = best else {
            return;
        };
        let placed = self.placed(layout, model, body);
        let phase = model.phase_angle(body);
        self.bodies[body.index()]
            .controller
            .begin_multi(&placed, winner, point, phase, model.checkpoint());
        self.arbiter.notify_drag_start(body);
        self.request_cursor(CursorSource::Drag(body), Some(CursorIcon::Grabbing), effects);

        // Everyone else in the burst becomes a backup.
        for &(id, point) in starts {
            if id != winner {
                self.bodies[body.index()].controller.add_backup(id, point);
            }
        }
    }

    fn end_drag(&mut self, body: BodyId, effects: &mut Vec<Effect>) {
        self.arbiter.notify_drag_end(body);
        self.request_cursor(CursorSource::Drag(body), None, effects);
    }

    fn emit_rotation(&self, body: BodyId, rotations: f64, effects: &mut Vec<Effect>) {
        let slot = &self.bodies[body.index()];
        let Some(baseline) = slot.controller.baseline() else {
            return;
        };
        effects.push(Effect::Rotate(RotationDelta {
            body,
            amount: rotations,
            unit: slot.config.unit,
            baseline,
            animate: false,
        }));
    }

    /// Re-derives which body the primary pointer is over.
    fn update_hover(&mut self, layout: &impl Layout, model: &impl TimeModel, point: Point) {
        let mut best: Option<(BodyId, f64)> = None;
        for body in BodyId::ALL {
            let placed = self.placed(layout, model, body);
            if placed.accepts(point, PointerKind::Primary) {
                let distance = point.distance(placed.hotspot());
                if best.is_none_or(|(_, d)| distance < d) {
                    best = Some((body, distance));
                }
            }
        }
        for body in BodyId::ALL {
            self.bodies[body.index()].hovered = best.is_some_and(|(b, _)| b == body);
        }
    }

    /// Recomputes both bodies' visual state and hover cursor requests.
    ///
    /// Diff-based throughout: calling this with unchanged inputs emits
    /// nothing.
    fn refresh(&mut self, effects: &mut Vec<Effect>) {
        let can_accept = self.arbiter.can_accept_new_session();
        let drag_allowed = self.arbiter.is_drag_allowed();
        for body in BodyId::ALL {
            let slot = &mut self.bodies[body.index()];
            let inputs = VisualInputs {
                dragging: slot.controller.is_dragging(),
                hovered: slot.hovered,
                focused: slot.focused,
                can_accept,
                drag_allowed,
            };
            for transition in slot.visual.apply(inputs) {
                effects.push(match transition {
                    VisualTransition::Highlight(on) => Effect::Highlight(body, on),
                    VisualTransition::FocusRing(on) => Effect::FocusRing(body, on),
                    VisualTransition::Tabbable(on) => Effect::Tabbable(body, on),
                });
            }
        }
        for body in BodyId::ALL {
            let affordance = self.bodies[body.index()].hovered && can_accept;
            self.request_cursor(
                CursorSource::Hover(body),
                affordance.then_some(CursorIcon::Grab),
                effects,
            );
        }
    }

    fn request_cursor(
        &mut self,
        source: CursorSource,
        icon: Option<CursorIcon>,
        effects: &mut Vec<Effect>,
    ) {
        if let Some(effective) = self.cursors.request(source, icon) {
            effects.push(Effect::Cursor(effective));
        }
    }

    fn placed(&self, layout: &impl Layout, model: &impl TimeModel, body: BodyId) -> PlacedBody {
        PlacedBody::new(
            &self.bodies[body.index()].config,
            layout.pivot(),
            layout.body_center(body),
            layout.body_radius(body),
            model.phase_angle(body),
        )
    }
}
