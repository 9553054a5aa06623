// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orrery Arbiter: shared drag policy for a widget with competing draggable
//! bodies.
//!
//! Where `orrery_gesture` runs the drag machinery for one body in isolation,
//! this crate holds the state that must be agreed on across all of them:
//!
//! - [`DragArbitrator`]: the single "current drag holder" slot and the
//!   host-controlled interactivity flag. At most one body drags at a time,
//!   and nothing drags while the host has interactivity switched off.
//! - [`cursor::CursorBroker`]: a priority broker for the one global cursor.
//!   Several sources (hover on either body, an active drag) may want a
//!   cursor at once; the most recently changed live request wins, and the
//!   effective cursor is applied exactly once per change.
//! - [`visual::VisualStateController`]: per-body highlight / focus-ring /
//!   tab-order flags derived from drag, hover, focus, and arbitration state,
//!   with idempotent change reporting.
//!
//! All types are generic over a body-key type `K: Copy + Eq`, so the crate
//! assumes nothing about how the widget names its bodies.
//!
//! ## Minimal example
//!
//! ```
//! use orrery_arbiter::DragArbitrator;
//!
//! #[derive(Copy, Clone, PartialEq, Eq, Debug)]
//! enum Body {
//!     Inner,
//!     Outer,
//! }
//!
//! let mut arb: DragArbitrator<Body> = DragArbitrator::new();
//! assert!(arb.can_accept_new_session());
//!
//! arb.notify_drag_start(Body::Outer);
//! // The sibling may not start while the outer body holds the drag...
//! assert!(!arb.can_initiate(Body::Inner));
//! // ...but the holder itself may keep scoring (backup candidates).
//! assert!(arb.can_initiate(Body::Outer));
//!
//! arb.notify_drag_end(Body::Outer);
//! assert!(arb.can_accept_new_session());
//! ```
//!
//! This crate is `no_std` compatible for all modules.

#![no_std]

pub mod cursor;
pub mod visual;

/// Global drag policy: one holder slot plus the interactivity flag.
///
/// The arbitrator is constructed once per widget and consulted by every
/// body before starting a session. It does not cancel sessions itself —
/// cancellation must reach into per-body controllers, which the arbitrator
/// deliberately does not own — so [`set_drag_allowed`] reports a change and
/// the caller cancels synchronously in the same call stack.
///
/// [`set_drag_allowed`]: Self::set_drag_allowed
#[derive(Copy, Clone, Debug)]
pub struct DragArbitrator<K> {
    allowed: bool,
    holder: Option<K>,
}

impl<K> Default for DragArbitrator<K> {
    fn default() -> Self {
        Self {
            allowed: true,
            holder: None,
        }
    }
}

impl<K: Copy + Eq> DragArbitrator<K> {
    /// Creates an arbitrator with dragging allowed and no holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while the host permits dragging at all.
    #[must_use]
    pub fn is_drag_allowed(&self) -> bool {
        self.allowed
    }

    /// Sets the host interactivity flag, returning `true` if it changed.
    ///
    /// Turning dragging off while a session is in progress obliges the
    /// caller to cancel that session before yielding; the arbitrator keeps
    /// reporting the stale holder until [`notify_drag_end`] is called.
    ///
    /// [`notify_drag_end`]: Self::notify_drag_end
    pub fn set_drag_allowed(&mut self, allowed: bool) -> bool {
        let changed = self.allowed != allowed;
        self.allowed = allowed;
        changed
    }

    /// Returns the body currently holding a drag session, if any.
    #[must_use]
    pub fn holder(&self) -> Option<K> {
        self.holder
    }

    /// Returns `true` if a brand-new drag session may start right now:
    /// dragging is allowed and no body holds a session.
    #[must_use]
    pub fn can_accept_new_session(&self) -> bool {
        self.allowed && self.holder.is_none()
    }

    /// Returns `true` if `body` may initiate drag work: dragging is allowed
    /// and the holder slot is free or already owned by `body`.
    ///
    /// The looser check matters for backup-candidate scoring, which keeps
    /// running on the holder while its session is open.
    #[must_use]
    pub fn can_initiate(&self, body: K) -> bool {
        self.allowed && self.holder.is_none_or(|h| h == body)
    }

    /// Records `body` as the current drag holder.
    pub fn notify_drag_start(&mut self, body: K) {
        debug_assert!(
            self.holder.is_none_or(|h| h == body),
            "second concurrent drag"
        );
        self.holder = Some(body);
    }

    /// Clears the holder slot if `body` owns it. Returns `true` on change.
    pub fn notify_drag_end(&mut self, body: K) -> bool {
        if self.holder == Some(body) {
            self.holder = None;
            true
        } else {
            false
        }
    }
}
