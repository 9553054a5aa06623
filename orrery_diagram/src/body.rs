// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Body identity, hotspot strategies, and per-body configuration.
//!
//! The diagram has exactly two bodies. They share the pivot and the drag
//! machinery but differ in how they want to be grabbed: the outer body by
//! its geometric center, the inner body by the figure protruding from its
//! rim. Those strategies live here as [`BodyShape`] variants; resolving a
//! shape against the current layout and phase angle yields a [`PlacedBody`]
//! that the gesture engine consumes through its geometry trait.

use kurbo::Point;

use orrery_gesture::angle::AngleConvention;
use orrery_gesture::controller::BodyGeometry;
use orrery_gesture::session::PointerKind;

use core::f64::consts::PI;

/// Minimum radius (px) of any touch hit region, so fingers are not asked to
/// land on targets smaller than a fingertip.
pub const MIN_TOUCH_RADIUS: f64 = 24.0;

/// Mean length of the synodic month in days.
pub const SYNODIC_DAYS: f64 = 29.530589;

/// Identity of one of the two bodies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyId {
    /// The body at the pivot (the earth of the reference diagram).
    Inner,
    /// The body riding the orbit circle (the moon).
    Outer,
}

impl BodyId {
    /// Returns the other body.
    #[must_use]
    pub fn sibling(self) -> Self {
        match self {
            Self::Inner => Self::Outer,
            Self::Outer => Self::Inner,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Inner => 0,
            Self::Outer => 1,
        }
    }

    pub(crate) const ALL: [Self; 2] = [Self::Inner, Self::Outer];
}

/// Unit carried by a rotation delta. One full rotation of a body always maps
/// to one unit of its kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RotationUnit {
    /// Fractional days (the inner body's rotation).
    Days,
    /// Fractional synodic periods (the outer body's orbit).
    SynodicPeriods,
}

/// How a body wants to be grabbed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BodyShape {
    /// Grabbed by its geometric center; hit within the body disc.
    Center,
    /// Grabbed by a protrusion on its rim, at the body's current phase
    /// direction. The body disc itself still accepts a grab, but distance is
    /// scored against the protrusion tip.
    Rim {
        /// Protrusion tip distance from the center, as a multiple of the
        /// body radius.
        height_ratio: f64,
        /// Protrusion half-width at the rim, as a multiple of the body
        /// radius (the sine of its base half-angle).
        half_width_ratio: f64,
    },
}

/// Static configuration of one body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyConfig {
    /// Grab strategy.
    pub shape: BodyShape,
    /// The body's angle convention about the pivot.
    pub convention: AngleConvention,
    /// Unit of the body's rotation deltas.
    pub unit: RotationUnit,
    /// Magnitude of one keyboard nudge, in the body's unit.
    pub nudge_amount: f64,
}

impl BodyConfig {
    /// The reference diagram's earth: rim-grabbed (the stick figure reaches
    /// half a radius past the globe, 15° base half-angle), east-zero CCW
    /// convention, day units, one-hour nudges.
    #[must_use]
    pub fn earth() -> Self {
        Self {
            shape: BodyShape::Rim {
                height_ratio: 1.5,
                // sin 15°
                half_width_ratio: 0.258_819_045_102_521,
            },
            convention: AngleConvention::MATH,
            unit: RotationUnit::Days,
            nudge_amount: 1.0 / 24.0,
        }
    }

    /// The reference diagram's moon: center-grabbed, west-zero CCW
    /// convention (new moon sits between earth and sun), synodic-period
    /// units, one-day nudges.
    #[must_use]
    pub fn moon() -> Self {
        Self {
            shape: BodyShape::Center,
            convention: AngleConvention {
                zero: PI,
                ..AngleConvention::MATH
            },
            unit: RotationUnit::SynodicPeriods,
            nudge_amount: 1.0 / SYNODIC_DAYS,
        }
    }
}

/// A body's shape resolved against the current layout and phase angle.
///
/// This is the concrete [`BodyGeometry`] the gesture engine scores and
/// tracks against. It is cheap to build and is reconstructed for every
/// event, so layout changes between events are picked up automatically.
#[derive(Copy, Clone, Debug)]
pub struct PlacedBody {
    shape: BodyShape,
    convention: AngleConvention,
    pivot: Point,
    center: Point,
    radius: f64,
    phase: f64,
}

impl PlacedBody {
    pub(crate) fn new(
        config: &BodyConfig,
        pivot: Point,
        center: Point,
        radius: f64,
        phase: f64,
    ) -> Self {
        Self {
            shape: config.shape,
            convention: config.convention,
            pivot,
            center,
            radius,
            phase,
        }
    }

    fn disc_radius(&self, kind: PointerKind) -> f64 {
        match kind {
            PointerKind::Primary => self.radius,
            PointerKind::Multi => self.radius.max(MIN_TOUCH_RADIUS),
        }
    }
}

impl BodyGeometry for PlacedBody {
    fn hotspot(&self) -> Point {
        match self.shape {
            BodyShape::Center => self.center,
            BodyShape::Rim { height_ratio, .. } => {
                let direction = self.convention.screen_direction_of(self.phase);
                self.center + direction * (self.radius * height_ratio)
            }
        }
    }

    fn angle_at(&self, point: Point) -> f64 {
        self.convention.angle_from(self.pivot, point)
    }

    fn accepts(&self, point: Point, kind: PointerKind) -> bool {
        match self.shape {
            BodyShape::Center => point.distance(self.center) <= self.disc_radius(kind),
            BodyShape::Rim {
                half_width_ratio, ..
            } => {
                if point.distance(self.center) <= self.disc_radius(kind) {
                    return true;
                }
                let mut half_width = self.radius * half_width_ratio;
                if kind == PointerKind::Multi {
                    // Widen a skinny protrusion for fingers.
                    half_width = half_width.max(MIN_TOUCH_RADIUS);
                }
                segment_distance(point, self.center, self.hotspot()) <= half_width
            }
        }
    }
}

/// Distance from `point` to the segment `a..b`.
fn segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len2).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
