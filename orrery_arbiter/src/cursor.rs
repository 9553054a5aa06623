// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Priority brokering for the one global cursor.
//!
//! Several interaction sources may want to style the cursor at the same
//! time: hovering either body suggests a grab affordance, an active drag
//! demands a grabbing one. The broker keeps at most one live request per
//! source key, stamps each changed request with a strictly increasing
//! priority, and resolves the effective cursor to the highest-priority live
//! request — so the most recently changed request always wins ties, and
//! withdrawing a request falls back to the next-newest rather than to a
//! stale one.
//!
//! ## Usage
//!
//! ```
//! use orrery_arbiter::cursor::CursorBroker;
//!
//! #[derive(Copy, Clone, PartialEq, Debug)]
//! enum Icon {
//!     Grab,
//!     Grabbing,
//! }
//!
//! let mut broker: CursorBroker<&'static str, Icon> = CursorBroker::new();
//!
//! // Hover suggests a grab; the change is reported for application.
//! assert_eq!(broker.request("hover", Some(Icon::Grab)), Some(Some(Icon::Grab)));
//!
//! // A drag starts and outranks it.
//! assert_eq!(broker.request("drag", Some(Icon::Grabbing)), Some(Some(Icon::Grabbing)));
//!
//! // Withdrawing the older hover request changes nothing observable.
//! assert_eq!(broker.request("hover", None), None);
//!
//! // Withdrawing the drag reverts to the default cursor.
//! assert_eq!(broker.request("drag", None), Some(None));
//! ```

use core::hash::Hash;

use hashbrown::HashMap;

#[derive(Copy, Clone, Debug)]
struct Entry<C> {
    priority: u64,
    cursor: C,
}

/// Cursor-request broker keyed by requester.
///
/// `K` identifies a request source, `C` names a cursor. The effective cursor
/// is `None` when no requests are live, which callers should interpret as
/// "restore the default".
#[derive(Clone, Debug)]
pub struct CursorBroker<K, C> {
    entries: HashMap<K, Entry<C>>,
    counter: u64,
    effective: Option<C>,
}

impl<K, C> Default for CursorBroker<K, C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            counter: 0,
            effective: None,
        }
    }
}

impl<K: Copy + Eq + Hash, C: Copy + PartialEq> CursorBroker<K, C> {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts, updates, or withdraws (`cursor = None`) the request under
    /// `key`, and returns `Some(new_effective)` exactly when the effective
    /// cursor changed.
    ///
    /// Requests that restate the key's current value are left untouched —
    /// in particular their priority stamp is not refreshed, so a source
    /// that re-asserts itself on every refresh pass cannot creep above a
    /// genuinely newer request.
    pub fn request(&mut self, key: K, cursor: Option<C>) -> Option<Option<C>> {
        match cursor {
            Some(c) => {
                let stale = self.entries.get(&key).is_none_or(|e| e.cursor != c);
                if stale {
                    self.counter += 1;
                    self.entries.insert(
                        key,
                        Entry {
                            priority: self.counter,
                            cursor: c,
                        },
                    );
                }
            }
            None => {
                self.entries.remove(&key);
            }
        }
        let effective = self
            .entries
            .values()
            .max_by_key(|e| e.priority)
            .map(|e| e.cursor);
        if effective != self.effective {
            self.effective = effective;
            Some(effective)
        } else {
            None
        }
    }

    /// Returns the current effective cursor, `None` meaning the default.
    #[must_use]
    pub fn effective(&self) -> Option<C> {
        self.effective
    }

    /// Returns `true` when no requests are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
