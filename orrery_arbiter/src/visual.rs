// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived per-body visual state.
//!
//! Highlight, focus ring, and tab order are never set directly by input
//! handlers; they are a pure function of drag, hover, focus, and arbitration
//! state, recomputed on every relevant event. [`VisualStateController`]
//! wraps the derivation with a diff against the previously applied flags so
//! that recomputing with unchanged inputs produces no transitions — the
//! side effects these flags drive are externally observable, so applying
//! them must be idempotent.

use smallvec::SmallVec;

bitflags::bitflags! {
    /// Derived visual flags for one body.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct VisualFlags: u8 {
        /// The roll-over/drag highlight is visible.
        const HIGHLIGHTED = 0b0000_0001;
        /// The keyboard focus ring is visible.
        const FOCUS_RING  = 0b0000_0010;
        /// The body participates in tab order.
        const TABBABLE    = 0b0000_0100;
    }
}

/// Inputs to the visual-state derivation for one body.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VisualInputs {
    /// The body holds an active drag session.
    pub dragging: bool,
    /// The pointer is hovering the body's hit region.
    pub hovered: bool,
    /// The body has keyboard focus.
    pub focused: bool,
    /// The arbitrator would accept a brand-new session right now.
    pub can_accept: bool,
    /// The host permits dragging at all.
    pub drag_allowed: bool,
}

/// Computes the visual flags for one body.
///
/// The highlight shows while dragging, or while hovered if a new session
/// could start; it is forced off whenever the focus ring shows, so the two
/// are never visible together.
#[must_use]
pub fn derive(inputs: VisualInputs) -> VisualFlags {
    let mut flags = VisualFlags::empty();
    if inputs.focused {
        flags |= VisualFlags::FOCUS_RING;
    }
    let wants_highlight = inputs.dragging || (inputs.hovered && inputs.can_accept);
    if wants_highlight && !inputs.focused {
        flags |= VisualFlags::HIGHLIGHTED;
    }
    if inputs.drag_allowed {
        flags |= VisualFlags::TABBABLE;
    }
    flags
}

/// A single observable visual change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VisualTransition {
    /// Show or hide the roll-over/drag highlight.
    Highlight(bool),
    /// Show or hide the keyboard focus ring.
    FocusRing(bool),
    /// Add the body to, or remove it from, the tab order.
    Tabbable(bool),
}

/// Tracks the applied flags for one body and reports only actual changes.
#[derive(Copy, Clone, Debug, Default)]
pub struct VisualStateController {
    applied: VisualFlags,
}

impl VisualStateController {
    /// Creates a controller with nothing applied yet.
    ///
    /// The first [`apply`](Self::apply) reports every set flag, letting the
    /// host synchronize from its own defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently applied flags.
    #[must_use]
    pub fn flags(&self) -> VisualFlags {
        self.applied
    }

    /// Recomputes the flags from `inputs` and returns the transitions
    /// needed to reach them. Unchanged recomputation returns nothing.
    pub fn apply(&mut self, inputs: VisualInputs) -> SmallVec<[VisualTransition; 3]> {
        let next = derive(inputs);
        let changed = self.applied ^ next;
        let mut out = SmallVec::new();
        if changed.contains(VisualFlags::HIGHLIGHTED) {
            out.push(VisualTransition::Highlight(next.contains(VisualFlags::HIGHLIGHTED)));
        }
        if changed.contains(VisualFlags::FOCUS_RING) {
            out.push(VisualTransition::FocusRing(next.contains(VisualFlags::FOCUS_RING)));
        }
        if changed.contains(VisualFlags::TABBABLE) {
            out.push(VisualTransition::Tabbable(next.contains(VisualFlags::TABBABLE)));
        }
        self.applied = next;
        out
    }
}
