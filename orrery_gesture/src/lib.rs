// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orrery Gesture: the per-body gesture engine for a draggable orbit diagram.
//!
//! This crate converts raw, possibly-interrupted pointer input into a
//! continuous, unwrapped rotation signal for one draggable body. It is the
//! bottom layer of the Orrery stack and knows nothing about widgets, siblings,
//! or cursors; those concerns live in `orrery_arbiter` and `orrery_diagram`.
//!
//! Three focused modules:
//!
//! - [`angle`]: pure geometry — map a screen point to an angle in a
//!   body-specific convention, and accumulate signed rotation count across a
//!   drag session with wraparound correction.
//! - [`session`]: pointer identity — one active pointer plus a pool of touch
//!   backup candidates that can seamlessly take over if the active one is
//!   lost.
//! - [`controller`]: the per-body drag state machine tying the two together:
//!   initiation scoring, begin/move/release, backup promotion, cancellation.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use orrery_gesture::angle::{AngleConvention, AngleTracker};
//!
//! let convention = AngleConvention::MATH;
//! let pivot = Point::new(100.0, 100.0);
//!
//! // Pointer starts due east of the pivot while the external model reads
//! // a quarter turn; the tracker captures the offset between the two.
//! let mut tracker = AngleTracker::default();
//! let start = convention.angle_from(pivot, Point::new(150.0, 100.0));
//! tracker.begin(core::f64::consts::FRAC_PI_2, start);
//!
//! // Moving the pointer an eighth of a turn reads back 0.125 rotations.
//! let up_east = convention.angle_from(pivot, Point::new(150.0, 50.0));
//! let rotations = tracker
//!     .update(core::f64::consts::FRAC_PI_2, up_east)
//!     .unwrap();
//! assert!((rotations - 0.125).abs() < 1e-12);
//! ```
//!
//! ## Design notes
//!
//! The engine is single-threaded and synchronous: every state transition
//! happens inside the call that delivers the input, and no operation blocks,
//! suspends, or schedules work. Recoverable anomalies (an unknown touch id, a
//! release with no session) degrade to no-ops rather than errors.
//!
//! This crate is `no_std` compatible for all modules.

#![no_std]

pub mod angle;
pub mod controller;
pub mod session;
