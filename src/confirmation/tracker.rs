use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::model::ItemId;

/// Identities whose confirmation action is currently running.
///
/// Shared between the workflows of one view through `Arc`; a workflow sees
/// the markers set by its siblings. The lock is never held across an
/// `.await`.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    in_flight: Mutex<HashSet<ItemId>>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn set(&self) -> MutexGuard<'_, HashSet<ItemId>> {
        // A panic while holding this lock cannot leave the set half-updated,
        // so a poisoned lock is still usable.
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Idempotent.
    pub fn mark_in_flight(&self, id: ItemId) {
        if self.set().insert(id) {
            debug!(item_id = %id, "Marked in flight");
        }
    }

    /// Idempotent.
    pub fn clear_in_flight(&self, id: ItemId) {
        if self.set().remove(&id) {
            debug!(item_id = %id, "Cleared in-flight marker");
        }
    }

    pub fn is_in_flight(&self, id: ItemId) -> bool {
        self.set().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.set().len()
    }

    pub fn is_empty(&self) -> bool {
        self.set().is_empty()
    }

    /// Sorted copy of the current markers.
    pub fn snapshot(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.set().iter().copied().collect();
        ids.sort();
        ids
    }

    /// Marks `id` and returns a guard that clears it when dropped, on every
    /// exit path including unwinding.
    pub fn begin(&self, id: ItemId) -> InFlightGuard<'_> {
        self.mark_in_flight(id);
        InFlightGuard { tracker: self, id }
    }
}

#[must_use = "dropping the guard clears the in-flight marker immediately"]
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    tracker: &'a InFlightTracker,
    id: ItemId,
}

impl InFlightGuard<'_> {
    pub fn id(&self) -> ItemId {
        self.id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.tracker.clear_in_flight(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> ItemId {
        ItemId::new(raw).unwrap()
    }

    #[test]
    fn marking_twice_keeps_one_entry() {
        let tracker = InFlightTracker::new();
        tracker.mark_in_flight(id(1));
        assert!(tracker.is_in_flight(id(1)));
        tracker.mark_in_flight(id(1));
        assert!(tracker.is_in_flight(id(1)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn clearing_absent_identity_is_noop() {
        let tracker = InFlightTracker::new();
        tracker.clear_in_flight(id(9));
        assert!(tracker.is_empty());

        tracker.mark_in_flight(id(2));
        tracker.clear_in_flight(id(2));
        tracker.clear_in_flight(id(2));
        assert!(!tracker.is_in_flight(id(2)));
    }

    #[test]
    fn guard_clears_on_drop() {
        let tracker = InFlightTracker::new();
        {
            let guard = tracker.begin(id(5));
            assert_eq!(guard.id(), id(5));
            assert!(tracker.is_in_flight(id(5)));
        }
        assert!(!tracker.is_in_flight(id(5)));
    }

    #[test]
    fn guard_clears_when_unwinding() {
        let tracker = InFlightTracker::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = tracker.begin(id(6));
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(tracker.is_empty());
    }

    #[test]
    fn shared_tracker_is_visible_to_every_holder() {
        let tracker = InFlightTracker::shared();
        let other = Arc::clone(&tracker);
        tracker.mark_in_flight(id(3));
        tracker.mark_in_flight(id(1));
        assert!(other.is_in_flight(id(3)));
        assert_eq!(other.snapshot(), vec![id(1), id(3)]);
    }
}
