//! Approximate size accounting for drain and shutdown decisions.
//!
//! `data` counts committed items not yet popped. `actions` counts the push
//! and pop obligations still outstanding: a push books two (its own and the
//! pop it will need) the moment it starts, so a consumer draining with
//! `has_work()` keeps going while a producer is mid-transfer.
//!
//! Neither counter decides whether a push or pop succeeds.

use crossbeam_utils::CachePadded;

use crate::sync::{AtomicIsize, Ordering};

pub(crate) struct Pending {
    data: CachePadded<AtomicIsize>,
    actions: CachePadded<AtomicIsize>,
}

impl Pending {
    pub(crate) fn new() -> Self {
        Pending {
            data: CachePadded::new(AtomicIsize::new(0)),
            actions: CachePadded::new(AtomicIsize::new(0)),
        }
    }

    /// A push is about to look for a slot.
    #[inline]
    pub(crate) fn begin_push(&self) {
        self.actions.fetch_add(2, Ordering::AcqRel);
    }

    /// The push found the queue full.
    #[inline]
    pub(crate) fn abort_push(&self) {
        self.actions.fetch_sub(2, Ordering::AcqRel);
    }

    /// The item is written. Must run before the slot is published so the
    /// matching pop never sees `data` at zero.
    #[inline]
    pub(crate) fn commit_push(&self) {
        self.data.fetch_add(1, Ordering::AcqRel);
        self.actions.fetch_sub(1, Ordering::AcqRel);
    }

    /// An item was taken out of the queue.
    #[inline]
    pub(crate) fn complete_pop(&self) {
        let data = self.data.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(data > 0, "pending item count went negative");

        let actions = self.actions.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(actions > 0, "pending action count went negative");
    }

    #[inline]
    pub(crate) fn has_data(&self) -> bool {
        self.data.load(Ordering::Acquire) > 0
    }

    #[inline]
    pub(crate) fn has_work(&self) -> bool {
        self.actions.load(Ordering::Acquire) > 0
    }

    /// Committed items, clamped at zero.
    #[inline]
    pub(crate) fn items(&self) -> usize {
        usize::try_from(self.data.load(Ordering::Acquire)).unwrap_or(0)
    }

    pub(crate) fn snapshot(&self) -> (isize, isize) {
        (
            self.data.load(Ordering::Acquire),
            self.actions.load(Ordering::Acquire),
        )
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn push_books_work_before_data() {
        let pending = Pending::new();
        pending.begin_push();
        assert!(pending.has_work());
        assert!(!pending.has_data());

        pending.commit_push();
        assert!(pending.has_data());
        assert_eq!(pending.snapshot(), (1, 1));

        pending.complete_pop();
        assert_eq!(pending.snapshot(), (0, 0));
        assert!(!pending.has_work());
    }

    #[test]
    fn aborted_push_leaves_no_trace() {
        let pending = Pending::new();
        pending.begin_push();
        pending.abort_push();
        assert_eq!(pending.snapshot(), (0, 0));
        assert_eq!(pending.items(), 0);
    }

    #[test]
    fn items_counts_committed_only() {
        let pending = Pending::new();
        for _ in 0..3 {
            pending.begin_push();
            pending.commit_push();
        }
        pending.begin_push();
        assert_eq!(pending.items(), 3);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "pending item count went negative")]
    fn pop_without_push_fails_loudly() {
        Pending::new().complete_pop();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "pending action count went negative")]
    fn commit_without_begin_fails_loudly_on_pop() {
        let pending = Pending::new();
        pending.commit_push();
        assert_eq!(pending.snapshot(), (1, -1));
        pending.complete_pop();
    }
}
