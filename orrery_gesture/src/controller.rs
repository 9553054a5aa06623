// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-body drag state machine.
//!
//! A [`DragController`] owns one [`PointerSession`] and one [`AngleTracker`]
//! and runs the `IDLE → DRAGGING → IDLE` machine for a single body. It is
//! deliberately ignorant of its sibling body and of global policy: the caller
//! resolves permissions (via the arbitrator) and passes the verdict into
//! [`DragController::initiation_score`].
//!
//! ## Usage
//!
//! 1) On pointer-down, call [`initiation_score`] for each body and start the
//!    drag on the body with the lowest finite score
//!    ([`begin_primary`] / [`begin_multi`]).
//! 2) Feed moves through [`motion`]; a [`Motion::Dragged`] result carries the
//!    accumulated rotation count to forward to the external time model.
//! 3) On release or pointer loss, call [`release`]. Multi sessions try to
//!    promote the best backup candidate within [`MAX_HANDOFF_DISTANCE`];
//!    otherwise the session ends as if released normally.
//! 4) [`cancel`] force-ends the session without producing further deltas and
//!    is safe to call when idle.
//!
//! [`initiation_score`]: DragController::initiation_score
//! [`begin_primary`]: DragController::begin_primary
//! [`begin_multi`]: DragController::begin_multi
//! [`motion`]: DragController::motion
//! [`release`]: DragController::release
//! [`cancel`]: DragController::cancel

use kurbo::Point;

use crate::angle::AngleTracker;
use crate::session::{PointerKind, PointerSession, TouchId};

/// Maximum distance (px) from a body's hotspot at which a backup candidate
/// still qualifies for promotion when the active touch is lost.
pub const MAX_HANDOFF_DISTANCE: f64 = 100.0;

/// Per-body geometry strategy: where the body wants to be grabbed and how it
/// measures angles.
///
/// The two bodies of an orbit diagram differ here — one is grabbed by its
/// geometric center, the other by a protrusion on its rim — so the controller
/// takes the geometry as a trait rather than branching on body identity.
pub trait BodyGeometry {
    /// The screen point against which pointer distance is scored.
    fn hotspot(&self) -> Point;

    /// Maps a screen point to an angle in the body's convention, `[0, 2π)`.
    fn angle_at(&self, point: Point) -> f64;

    /// Returns `true` if a pointer of `kind` at `point` may start a drag.
    fn accepts(&self, point: Point, kind: PointerKind) -> bool;
}

/// Result of feeding a pointer move through [`DragController::motion`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Motion {
    /// The driving pointer moved; the payload is the accumulated signed
    /// rotation count since session start.
    Dragged(f64),
    /// A backup candidate moved; its last-known point was refreshed.
    BackupMoved,
    /// The event did not belong to this session. Nothing changed.
    Ignored,
}

/// Result of [`DragController::release`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Release {
    /// The session ended (explicit release, or loss with no viable backup).
    Ended,
    /// The active touch was lost and the given backup took over; angle
    /// tracking was re-based so the rotation count is continuous.
    Promoted(TouchId),
    /// A backup candidate was released and left the pool; the session
    /// continues.
    BackupDropped,
    /// The event did not belong to this session. Nothing changed.
    Ignored,
}

/// Drag controller for one body.
///
/// `T` is an opaque baseline snapshot captured at session start (typically
/// the external time model's state token) and handed back unchanged with
/// every emitted rotation, so deltas are expressed against a fixed baseline
/// rather than a moving target.
#[derive(Clone, Debug)]
pub struct DragController<T> {
    tracker: AngleTracker,
    session: Option<Session<T>>,
}

#[derive(Clone, Debug)]
struct Session<T> {
    pointers: PointerSession,
    baseline: T,
}

impl<T> Default for DragController<T> {
    fn default() -> Self {
        Self {
            tracker: AngleTracker::default(),
            session: None,
        }
    }
}

impl<T: Copy> DragController<T> {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a session is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the active session's pointer family, if any.
    #[must_use]
    pub fn kind(&self) -> Option<PointerKind> {
        self.session.as_ref().map(|s| s.pointers.kind())
    }

    /// Returns the baseline snapshot captured at session start, if any.
    #[must_use]
    pub fn baseline(&self) -> Option<T> {
        self.session.as_ref().map(|s| s.baseline)
    }

    /// Returns the accumulated signed rotation count for the active session.
    #[must_use]
    pub fn rotations(&self) -> f64 {
        self.tracker.rotations()
    }

    /// Returns `true` if `id` identifies the session's driving pointer.
    #[must_use]
    pub fn is_active_pointer(&self, id: Option<TouchId>) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.pointers.is_active(id))
    }

    /// Scores a pointer-down for drag initiation on this body.
    ///
    /// Returns `f64::INFINITY` ("do not start") when the caller's arbitration
    /// verdict `permitted` is false, when the point falls outside the body's
    /// hit region, or when a session of an incompatible shape is already
    /// active: the primary pointer never nests, and a primary session takes
    /// no touch backups. Otherwise returns the distance from `point` to the
    /// body's hotspot — lower wins when bodies compete for the same input,
    /// and the same value ranks backup candidates while a multi session is
    /// open.
    #[must_use]
    pub fn initiation_score(
        &self,
        geometry: &impl BodyGeometry,
        point: Point,
        kind: PointerKind,
        permitted: bool,
    ) -> f64 {
        if !permitted {
            return f64::INFINITY;
        }
        match (&self.session, kind) {
            (Some(_), PointerKind::Primary) => return f64::INFINITY,
            (Some(s), PointerKind::Multi) if s.pointers.kind() == PointerKind::Primary => {
                return f64::INFINITY;
            }
            _ => {}
        }
        if !geometry.accepts(point, kind) {
            return f64::INFINITY;
        }
        point.distance(geometry.hotspot())
    }

    /// Starts a primary-pointer session.
    ///
    /// `phase` is the external model's current phase angle and `baseline` its
    /// state snapshot. The caller must have obtained a finite
    /// [`initiation_score`](Self::initiation_score) first; a stray second
    /// begin replaces the session outright.
    pub fn begin_primary(
        &mut self,
        geometry: &impl BodyGeometry,
        point: Point,
        phase: f64,
        baseline: T,
    ) {
        debug_assert!(self.session.is_none(), "begin while dragging");
        self.tracker.begin(phase, geometry.angle_at(point));
        self.session = Some(Session {
            pointers: PointerSession::primary(),
            baseline,
        });
    }

    /// Starts a multi-pointer session driven by `id`.
    pub fn begin_multi(
        &mut self,
        geometry: &impl BodyGeometry,
        id: TouchId,
        point: Point,
        phase: f64,
        baseline: T,
    ) {
        debug_assert!(self.session.is_none(), "begin while dragging");
        self.tracker.begin(phase, geometry.angle_at(point));
        self.session = Some(Session {
            pointers: PointerSession::multi(id),
            baseline,
        });
    }

    /// Feeds a pointer move into the session.
    ///
    /// `id` is `None` for the primary pointer. Moves from the driving pointer
    /// advance the angle tracker against the model's current `phase`; moves
    /// from backup candidates refresh their last-known points; anything else
    /// is ignored without mutating state.
    pub fn motion(
        &mut self,
        geometry: &impl BodyGeometry,
        id: Option<TouchId>,
        point: Point,
        phase: f64,
    ) -> Motion {
        let Some(session) = &mut self.session else {
            return Motion::Ignored;
        };
        if session.pointers.is_active(id) {
            match self.tracker.update(phase, geometry.angle_at(point)) {
                Some(rotations) => Motion::Dragged(rotations),
                None => Motion::Ignored,
            }
        } else if let Some(id) = id {
            if session.pointers.update_backup(id, point) {
                Motion::BackupMoved
            } else {
                Motion::Ignored
            }
        } else {
            Motion::Ignored
        }
    }

    /// Handles release or loss of the pointer `id`.
    ///
    /// Releasing the driving pointer of a multi session promotes the closest
    /// backup within [`MAX_HANDOFF_DISTANCE`] of the hotspot, re-basing the
    /// angle tracker at the candidate's last-known point so the rotation
    /// count is continuous across the hand-off. With no qualifying backup the
    /// session ends as if released normally. Calling this when idle, or with
    /// a pointer the session does not know, is a no-op.
    pub fn release(
        &mut self,
        geometry: &impl BodyGeometry,
        id: Option<TouchId>,
        phase: f64,
    ) -> Release {
        let Some(session) = &mut self.session else {
            return Release::Ignored;
        };
        if session.pointers.is_active(id) {
            match session
                .pointers
                .promote_best(geometry.hotspot(), MAX_HANDOFF_DISTANCE)
            {
                Some(candidate) => {
                    self.tracker.rebase(phase, geometry.angle_at(candidate.point));
                    Release::Promoted(candidate.id)
                }
                None => {
                    self.end();
                    Release::Ended
                }
            }
        } else if let Some(id) = id {
            if session.pointers.drop_backup(id) {
                Release::BackupDropped
            } else {
                Release::Ignored
            }
        } else {
            Release::Ignored
        }
    }

    /// Records a new touch as a backup candidate.
    ///
    /// Only meaningful while a multi session is active; returns `false` (and
    /// changes nothing) otherwise.
    pub fn add_backup(&mut self, id: TouchId, point: Point) -> bool {
        self.session
            .as_mut()
            .is_some_and(|s| s.pointers.add_backup(id, point))
    }

    /// Forcibly ends any active session without producing further deltas.
    ///
    /// Safe to call when idle. Returns `true` if a session was dropped.
    pub fn cancel(&mut self) -> bool {
        if self.session.is_none() {
            return false;
        }
        self.end();
        true
    }

    fn end(&mut self) {
        self.tracker.end();
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::f64::consts::FRAC_PI_2;

    use crate::angle::AngleConvention;

    /// Circular test body: hotspot at the center, math-convention angles
    /// about a separate pivot, hit within `radius` for either pointer kind.
    struct Disc {
        center: Point,
        pivot: Point,
        radius: f64,
    }

    impl Disc {
        fn on_orbit() -> Self {
            Self {
                center: Point::new(200.0, 100.0),
                pivot: Point::new(100.0, 100.0),
                radius: 30.0,
            }
        }
    }

    impl BodyGeometry for Disc {
        fn hotspot(&self) -> Point {
            self.center
        }

        fn angle_at(&self, point: Point) -> f64 {
            AngleConvention::MATH.angle_from(self.pivot, point)
        }

        fn accepts(&self, point: Point, _kind: PointerKind) -> bool {
            point.distance(self.center) <= self.radius
        }
    }

    fn ctl() -> DragController<u32> {
        DragController::new()
    }

    #[test]
    fn score_is_distance_to_hotspot() {
        let disc = Disc::on_orbit();
        let c = ctl();
        let score = c.initiation_score(
            &disc,
            Point::new(205.0, 100.0),
            PointerKind::Primary,
            true,
        );
        assert_eq!(score, 5.0);
    }

    #[test]
    fn score_is_infinite_when_forbidden_or_outside() {
        let disc = Disc::on_orbit();
        let c = ctl();
        let inside = Point::new(205.0, 100.0);
        assert_eq!(
            c.initiation_score(&disc, inside, PointerKind::Primary, false),
            f64::INFINITY
        );
        let outside = Point::new(300.0, 100.0);
        assert_eq!(
            c.initiation_score(&disc, outside, PointerKind::Multi, true),
            f64::INFINITY
        );
    }

    #[test]
    fn primary_never_nests() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_primary(&disc, Point::new(205.0, 100.0), 0.0, 1);
        assert_eq!(
            c.initiation_score(&disc, Point::new(205.0, 100.0), PointerKind::Primary, true),
            f64::INFINITY
        );
    }

    #[test]
    fn multi_scores_stay_finite_for_backup_ranking() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_multi(&disc, TouchId(1), Point::new(205.0, 100.0), 0.0, 1);
        let score = c.initiation_score(&disc, Point::new(210.0, 100.0), PointerKind::Multi, true);
        assert_eq!(score, 10.0);
    }

    #[test]
    fn touches_cannot_back_up_a_primary_session() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_primary(&disc, Point::new(205.0, 100.0), 0.0, 1);
        assert_eq!(
            c.initiation_score(&disc, Point::new(205.0, 100.0), PointerKind::Multi, true),
            f64::INFINITY
        );
        assert!(!c.add_backup(TouchId(1), Point::new(205.0, 100.0)));
    }

    #[test]
    fn primary_drag_accumulates_rotations() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        // Grab due east of the pivot while the model reads a quarter turn.
        c.begin_primary(&disc, Point::new(200.0, 100.0), FRAC_PI_2, 42);
        assert!(c.is_dragging());
        assert_eq!(c.baseline(), Some(42));

        // An eighth of a turn: (π/4 − 0) / 2π = 0.125 rotations.
        let m = c.motion(&disc, None, Point::new(170.7, 29.3), FRAC_PI_2);
        let Motion::Dragged(rotations) = m else {
            panic!("expected a drag, got {m:?}");
        };
        assert!((rotations - 0.125).abs() < 1e-3);
    }

    #[test]
    fn wrong_kind_motion_is_ignored() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_multi(&disc, TouchId(1), Point::new(200.0, 100.0), 0.0, 1);
        // A primary move reaching a multi session mutates nothing.
        assert_eq!(c.motion(&disc, None, Point::new(190.0, 90.0), 0.0), Motion::Ignored);
        assert_eq!(c.rotations(), 0.0);
    }

    #[test]
    fn release_when_idle_is_a_no_op() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        assert_eq!(c.release(&disc, None, 0.0), Release::Ignored);
        assert!(!c.cancel());
    }

    #[test]
    fn primary_release_ends_the_session() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_primary(&disc, Point::new(200.0, 100.0), 0.0, 1);
        assert_eq!(c.release(&disc, None, 0.0), Release::Ended);
        assert!(!c.is_dragging());
        // The stale pointer is now a no-op.
        assert_eq!(c.motion(&disc, None, Point::new(0.0, 0.0), 0.0), Motion::Ignored);
    }

    #[test]
    fn lost_touch_promotes_the_nearest_backup_continuously() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        let grab = Point::new(200.0, 100.0);
        c.begin_multi(&disc, TouchId(1), grab, 0.0, 1);

        // Second finger rests on the same spot; third is out of range.
        c.add_backup(TouchId(2), grab);
        c.add_backup(TouchId(3), Point::new(600.0, 100.0));

        let m = c.motion(&disc, Some(TouchId(1)), Point::new(200.0, 60.0), 0.0);
        let Motion::Dragged(before) = m else {
            panic!("expected a drag, got {m:?}");
        };
        let phase = before * core::f64::consts::TAU;

        assert_eq!(c.release(&disc, Some(TouchId(1)), phase), Release::Promoted(TouchId(2)));
        assert!(c.is_dragging());

        // Promotion at the candidate's resting point leaves the count intact.
        let m = c.motion(&disc, Some(TouchId(2)), grab, phase);
        let Motion::Dragged(after) = m else {
            panic!("expected a drag, got {m:?}");
        };
        assert!((after - before).abs() < 1e-9);
    }

    #[test]
    fn lost_touch_with_no_viable_backup_ends_gracefully() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_multi(&disc, TouchId(1), Point::new(200.0, 100.0), 0.0, 1);
        c.add_backup(TouchId(2), Point::new(600.0, 100.0));
        assert_eq!(c.release(&disc, Some(TouchId(1)), 0.0), Release::Ended);
        assert!(!c.is_dragging());
    }

    #[test]
    fn releasing_a_backup_keeps_the_session_alive() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_multi(&disc, TouchId(1), Point::new(200.0, 100.0), 0.0, 1);
        c.add_backup(TouchId(2), Point::new(205.0, 100.0));
        assert_eq!(c.release(&disc, Some(TouchId(2)), 0.0), Release::BackupDropped);
        assert!(c.is_dragging());
        assert!(c.is_active_pointer(Some(TouchId(1))));
    }

    #[test]
    fn unknown_touch_release_is_ignored() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_multi(&disc, TouchId(1), Point::new(200.0, 100.0), 0.0, 1);
        assert_eq!(c.release(&disc, Some(TouchId(9)), 0.0), Release::Ignored);
        assert!(c.is_dragging());
    }

    #[test]
    fn cancel_drops_the_session_without_deltas() {
        let disc = Disc::on_orbit();
        let mut c = ctl();
        c.begin_multi(&disc, TouchId(1), Point::new(200.0, 100.0), 0.0, 7);
        assert!(c.cancel());
        assert!(!c.is_dragging());
        assert_eq!(c.baseline(), None);
        assert_eq!(c.rotations(), 0.0);
        // Idempotent.
        assert!(!c.cancel());
    }
}
