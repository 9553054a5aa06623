// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Angle conventions and session-scoped rotation unwrapping.
//!
//! ## Usage
//!
//! 1) Describe how a body measures angles with an [`AngleConvention`]: the
//!    screen direction of its zero angle and its winding sign.
//! 2) Start a drag session with [`AngleTracker::begin`], passing the external
//!    model's current phase angle and the pointer's starting angle.
//! 3) On each move, call [`AngleTracker::update`] to advance the accumulated
//!    rotation count. The accumulator is unbounded (multiple full revolutions
//!    in one continuous drag are fine), but a single increment never exceeds
//!    half a rotation, even when the raw angle wraps past zero.
//! 4) If the driving pointer is replaced mid-session, call
//!    [`AngleTracker::rebase`] with the new pointer's angle; the accumulator
//!    is preserved so the hand-off introduces no discontinuity.

use kurbo::{Point, Vec2};

use core::f64::consts::{PI, TAU};

/// Winding sign of a body's angle convention.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Winding {
    /// Angles increase counterclockwise on screen.
    #[default]
    Ccw,
    /// Angles increase clockwise on screen.
    Cw,
}

/// A body-specific mapping from screen directions to angles.
///
/// Screen coordinates grow downward; this type flips the y axis so that the
/// underlying measurement is the mathematical one, then remaps it through the
/// body's zero direction and winding sign. The two bodies of an orbit diagram
/// rotate on different conventions relative to the shared pivot, so each
/// carries its own `AngleConvention`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AngleConvention {
    /// Mathematical angle (radians, CCW from screen east) of the convention's
    /// zero direction.
    pub zero: f64,
    /// Direction in which the body's angle increases.
    pub winding: Winding,
}

impl AngleConvention {
    /// The plain mathematical convention: zero points east, CCW winding.
    pub const MATH: Self = Self {
        zero: 0.0,
        winding: Winding::Ccw,
    };

    /// Returns the angle of `point` as seen from `pivot`, in `[0, 2π)`.
    #[must_use]
    pub fn angle_from(&self, pivot: Point, point: Point) -> f64 {
        // Flip y so the atan2 measurement is CCW-positive.
        let raw = Vec2::new(point.x - pivot.x, pivot.y - point.y).atan2();
        let mapped = match self.winding {
            Winding::Ccw => raw - self.zero,
            Winding::Cw => self.zero - raw,
        };
        wrap_unsigned(mapped)
    }

    /// Maps a body angle back to the mathematical angle it names.
    ///
    /// Inverse of the remapping inside [`angle_from`](Self::angle_from);
    /// useful for placing a feature that sits at a known body angle on
    /// screen.
    #[must_use]
    pub fn math_angle_of(&self, angle: f64) -> f64 {
        let raw = match self.winding {
            Winding::Ccw => angle + self.zero,
            Winding::Cw => self.zero - angle,
        };
        wrap_unsigned(raw)
    }

    /// Returns the unit screen direction (y-down) of a body angle as seen
    /// from the pivot.
    #[must_use]
    pub fn screen_direction_of(&self, angle: f64) -> Vec2 {
        let v = Vec2::from_angle(self.math_angle_of(angle));
        // Undo the y flip applied by the measurement.
        Vec2::new(v.x, -v.y)
    }
}

/// Normalizes an angle into `[0, 2π)`.
#[must_use]
pub fn wrap_unsigned(angle: f64) -> f64 {
    let r = angle % TAU;
    if r < 0.0 { r + TAU } else { r }
}

/// Normalizes an angle into `(−π, π]`: the `[0, 2π)` representative, less a
/// full turn when it exceeds `π`.
#[must_use]
pub fn wrap_signed(angle: f64) -> f64 {
    let r = wrap_unsigned(angle);
    if r > PI { r - TAU } else { r }
}

/// Session-scoped rotation accumulator with wraparound correction.
///
/// The tracker records an angle offset at session start — the difference
/// between the external model's phase angle and the pointer's instantaneous
/// angle — so that the pointer does not need to sit exactly on the phase
/// direction to grab it. Each update measures the adjusted pointer angle
/// against the model's current phase angle and folds the increment into a
/// running rotation count.
#[derive(Copy, Clone, Debug, Default)]
pub struct AngleTracker {
    offset: f64,
    rotations: f64,
    active: bool,
}

impl AngleTracker {
    /// Starts a new session.
    ///
    /// `phase` is the external model's current phase angle and `angle` the
    /// pointer's angle at the initial screen point, both in the body's
    /// convention. Any previous session state is discarded.
    pub fn begin(&mut self, phase: f64, angle: f64) {
        self.offset = phase - angle;
        self.rotations = 0.0;
        self.active = true;
    }

    /// Re-captures the angle offset for a replacement pointer, preserving the
    /// accumulated rotation count.
    ///
    /// Called when a backup pointer takes over mid-session: the new pointer's
    /// angle is paired with the same phase angle, so the next [`update`]
    /// measures from the hand-off point and no discontinuity is introduced.
    /// No-op when idle.
    ///
    /// [`update`]: Self::update
    pub fn rebase(&mut self, phase: f64, angle: f64) {
        if self.active {
            self.offset = phase - angle;
        }
    }

    /// Advances the session with a new pointer angle and returns the
    /// accumulated rotation count, or `None` when idle.
    ///
    /// The increment is the signed difference between the offset-adjusted
    /// pointer angle and `phase`, normalized into `(−π, π]`. A single call
    /// therefore never moves the accumulator by more than half a rotation;
    /// the caller is expected to feed the result back into the model so that
    /// `phase` tracks the accumulator between calls.
    pub fn update(&mut self, phase: f64, angle: f64) -> Option<f64> {
        if !self.active {
            return None;
        }
        let raw = angle + self.offset;
        let delta = wrap_signed(raw - phase);
        self.rotations += delta / TAU;
        Some(self.rotations)
    }

    /// Ends the session and resets the accumulator.
    pub fn end(&mut self) {
        self.offset = 0.0;
        self.rotations = 0.0;
        self.active = false;
    }

    /// Returns the accumulated signed rotation count for the current session.
    #[must_use]
    pub fn rotations(&self) -> f64 {
        self.rotations
    }

    /// Returns `true` while a session is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}
