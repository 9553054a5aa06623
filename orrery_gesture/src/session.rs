// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer identity and the multi-touch backup pool.
//!
//! A drag session is driven by exactly one pointer at a time. For the
//! primary pointer (a mouse) that is the whole story: it is exclusive and has
//! no backups. For multi pointers (touches), additional fingers that land
//! while a session is open are recorded as backup candidates with their
//! last-known screen points; when the driving finger is lost, the nearest
//! candidate within the hand-off distance takes over seamlessly.

use kurbo::Point;
use smallvec::SmallVec;

/// Discriminates the two supported pointer families.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A single exclusive pointer with no backups (e.g. a mouse).
    Primary,
    /// One of potentially several concurrent, independently identified
    /// pointer inputs (e.g. touches).
    Multi,
}

/// Opaque per-session identifier of a multi pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TouchId(pub u64);

/// A non-active multi pointer recorded while a session is open, eligible to
/// take over if the active one is lost.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BackupCandidate {
    /// The candidate's pointer id.
    pub id: TouchId,
    /// Its last-known screen point.
    pub point: Point,
}

/// One active pointer plus (for `Multi`) an ordered pool of backups.
#[derive(Clone, Debug)]
pub struct PointerSession {
    kind: PointerKind,
    /// Driving pointer id; `None` for the primary pointer.
    active: Option<TouchId>,
    backups: SmallVec<[BackupCandidate; 4]>,
}

impl PointerSession {
    /// Creates a session driven by the primary pointer.
    #[must_use]
    pub fn primary() -> Self {
        Self {
            kind: PointerKind::Primary,
            active: None,
            backups: SmallVec::new(),
        }
    }

    /// Creates a session driven by the multi pointer `id`.
    #[must_use]
    pub fn multi(id: TouchId) -> Self {
        Self {
            kind: PointerKind::Multi,
            active: Some(id),
            backups: SmallVec::new(),
        }
    }

    /// Returns the pointer family driving this session.
    #[must_use]
    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    /// Returns the id of the driving multi pointer, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<TouchId> {
        self.active
    }

    /// Returns `true` if `id` identifies the driving pointer.
    ///
    /// The primary pointer carries no id and matches `None`.
    #[must_use]
    pub fn is_active(&self, id: Option<TouchId>) -> bool {
        // `active` is `Some` exactly for multi sessions, so a bare equality
        // check also rejects cross-family ids.
        self.active == id
    }

    /// Records (or refreshes) a backup candidate.
    ///
    /// Primary sessions take no backups; the driving pointer itself is never
    /// a candidate. Re-adding an existing candidate updates its point.
    /// Returns `true` if the candidate is now in the pool.
    pub fn add_backup(&mut self, id: TouchId, point: Point) -> bool {
        if self.kind == PointerKind::Primary || self.active == Some(id) {
            return false;
        }
        if let Some(b) = self.backups.iter_mut().find(|b| b.id == id) {
            b.point = point;
        } else {
            self.backups.push(BackupCandidate { id, point });
        }
        true
    }

    /// Updates a known candidate's last-known point.
    ///
    /// Returns `false` for ids not in the pool.
    pub fn update_backup(&mut self, id: TouchId, point: Point) -> bool {
        if let Some(b) = self.backups.iter_mut().find(|b| b.id == id) {
            b.point = point;
            true
        } else {
            false
        }
    }

    /// Removes a candidate from the pool.
    ///
    /// Returns `false` for ids not in the pool.
    pub fn drop_backup(&mut self, id: TouchId) -> bool {
        let before = self.backups.len();
        self.backups.retain(|b| b.id != id);
        self.backups.len() != before
    }

    /// Returns the current backup pool, in arrival order.
    #[must_use]
    pub fn backups(&self) -> &[BackupCandidate] {
        &self.backups
    }

    /// Promotes the best qualifying backup to the driving pointer.
    ///
    /// The best candidate is the one whose last-known point lies closest to
    /// `hotspot`; candidates farther than `max_distance` never qualify. On
    /// success the candidate leaves the pool, becomes the active pointer, and
    /// is returned so the caller can re-base its angle tracking. Returns
    /// `None` (leaving the session unchanged) when no candidate qualifies.
    pub fn promote_best(&mut self, hotspot: Point, max_distance: f64) -> Option<BackupCandidate> {
        if self.kind == PointerKind::Primary {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, b) in self.backups.iter().enumerate() {
            let d = b.point.distance(hotspot);
            if d <= max_distance && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        let (i, _) = best?;
        let candidate = self.backups.remove(i);
        self.active = Some(candidate.id);
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_session_has_no_id_and_takes_no_backups() {
        let mut s = PointerSession::primary();
        assert_eq!(s.kind(), PointerKind::Primary);
        assert!(s.is_active(None));
        assert!(!s.is_active(Some(TouchId(1))));
        assert!(!s.add_backup(TouchId(1), Point::ZERO));
        assert!(s.backups().is_empty());
        assert!(s.promote_best(Point::ZERO, f64::INFINITY).is_none());
    }

    #[test]
    fn multi_session_matches_only_its_driving_id() {
        let s = PointerSession::multi(TouchId(7));
        assert!(s.is_active(Some(TouchId(7))));
        assert!(!s.is_active(Some(TouchId(8))));
        assert!(!s.is_active(None));
    }

    #[test]
    fn driving_pointer_is_never_a_candidate() {
        let mut s = PointerSession::multi(TouchId(7));
        assert!(!s.add_backup(TouchId(7), Point::ZERO));
        assert!(s.backups().is_empty());
    }

    #[test]
    fn re_adding_a_candidate_refreshes_its_point() {
        let mut s = PointerSession::multi(TouchId(1));
        s.add_backup(TouchId(2), Point::new(1.0, 0.0));
        s.add_backup(TouchId(2), Point::new(5.0, 0.0));
        assert_eq!(s.backups().len(), 1);
        assert_eq!(s.backups()[0].point, Point::new(5.0, 0.0));
    }

    #[test]
    fn update_and_drop_report_unknown_ids() {
        let mut s = PointerSession::multi(TouchId(1));
        s.add_backup(TouchId(2), Point::ZERO);
        assert!(s.update_backup(TouchId(2), Point::new(3.0, 4.0)));
        assert!(!s.update_backup(TouchId(9), Point::ZERO));
        assert!(s.drop_backup(TouchId(2)));
        assert!(!s.drop_backup(TouchId(2)));
    }

    #[test]
    fn promotion_picks_the_closest_candidate() {
        let mut s = PointerSession::multi(TouchId(1));
        s.add_backup(TouchId(2), Point::new(40.0, 0.0));
        s.add_backup(TouchId(3), Point::new(5.0, 0.0));
        let promoted = s.promote_best(Point::ZERO, 100.0).unwrap();
        assert_eq!(promoted.id, TouchId(3));
        assert!(s.is_active(Some(TouchId(3))));
        // The loser stays in the pool.
        assert_eq!(s.backups().len(), 1);
        assert_eq!(s.backups()[0].id, TouchId(2));
    }

    #[test]
    fn promotion_respects_the_hand_off_distance() {
        let mut s = PointerSession::multi(TouchId(1));
        s.add_backup(TouchId(2), Point::new(500.0, 0.0));
        assert!(s.promote_best(Point::ZERO, 100.0).is_none());
        // The stale candidate is untouched and the session still reports
        // its original driver.
        assert_eq!(s.backups().len(), 1);
        assert!(s.is_active(Some(TouchId(1))));
    }
}
