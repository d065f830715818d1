use core::fmt;

use crate::backoff::Backoff;
use crate::coordinator::{Claim, Coordinator};
use crate::counters::Pending;
use crate::error::{PopError, PushError};
use crate::ring::Ring;
use crate::slot::{BusyFlag, SlotProtocol};
use crate::trace::{debug, trace};

/// Fixed-capacity multi-producer multi-consumer queue.
///
/// `N` slots, of which `N - 1` can hold items at once. Threads reserve a slot
/// under a short spin gate, release the gate, and only then move the item in
/// or out, so the gate's hold time is independent of the item size.
///
/// `P` picks the per-slot ownership flag; see [`BusyFlag`] (default) and
/// [`CommitFlag`](crate::CommitFlag).
///
/// Share it through an `Arc`; the queue itself is neither `Clone` nor meant
/// to be moved while threads hold references to it.
pub struct Queue<T, const N: usize, P: SlotProtocol = BusyFlag> {
    ring: Ring<T, N, P>,
    coordinator: Coordinator<N>,
    pending: Pending,
    backoff: Backoff,
}

impl<T, const N: usize> Queue<T, N> {
    /// Busy-flag queue with the default backoff.
    ///
    /// `N` must be at least 2; smaller rings fail to build:
    ///
    /// ```compile_fail
    /// let _queue = spin_mpmc::Queue::<i32, 1>::new();
    /// ```
    pub fn new() -> Self {
        Self::with_protocol(Backoff::default())
    }

    /// Busy-flag queue with a custom backoff.
    pub fn with_backoff(backoff: Backoff) -> Self {
        Self::with_protocol(backoff)
    }
}

impl<T, const N: usize, P: SlotProtocol> Queue<T, N, P> {
    /// Queue using slot protocol `P`.
    ///
    /// ```compile_fail
    /// use spin_mpmc::{Backoff, CommitFlag, Queue};
    /// let _queue = Queue::<i32, 0, CommitFlag>::with_protocol(Backoff::default());
    /// ```
    pub fn with_protocol(backoff: Backoff) -> Self {
        let ring = Ring::new();
        debug!(slots = N, ?backoff, "queue constructed");
        Queue {
            ring,
            coordinator: Coordinator::new(),
            pending: Pending::new(),
            backoff,
        }
    }

    /// Non-blocking push.
    ///
    /// Contention for the gate or for a slot still owned by a consumer is
    /// retried with backoff; the call fails only when the queue is full, in
    /// which case the item comes back in the error.
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        self.pending.begin_push();

        let mut pause = self.backoff.first();
        let index = loop {
            match self.coordinator.claim_tail(&self.ring) {
                Claim::Granted(index) => break index,
                Claim::Retry => pause = self.backoff.pause(pause),
                Claim::Exhausted => {
                    self.pending.abort_push();
                    trace!("push rejected: queue full");
                    return Err(PushError(item));
                }
            }
        };

        let slot = self.ring.slot(index);
        // SAFETY: the claim makes this thread the slot's only writer, and a
        // slot outside the live range holds no item.
        unsafe { slot.write(item) };
        self.pending.commit_push();
        slot.state.publish();
        Ok(())
    }

    /// Non-blocking pop.
    ///
    /// Waits out a producer still writing the head slot, but fails at once
    /// when the live range is empty.
    pub fn try_pop(&self) -> Result<T, PopError> {
        let mut pause = self.backoff.first();
        let index = loop {
            match self.coordinator.claim_head(&self.ring) {
                Claim::Granted(index) => break index,
                Claim::Retry => pause = self.backoff.pause(pause),
                Claim::Exhausted => {
                    trace!("pop found queue empty");
                    return Err(PopError);
                }
            }
        };

        let slot = self.ring.slot(index);
        // SAFETY: the claim makes this thread the slot's only reader, and the
        // producer published the slot only after writing it.
        let item = unsafe { slot.take() };
        self.pending.complete_pop();
        slot.state.vacate();
        Ok(item)
    }

    /// Whether committed items are waiting. Advisory.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.pending.has_data()
    }

    /// Whether any push or pop obligation is outstanding, including pushes
    /// still moving their item in. Drain loops keep popping while this
    /// holds. Advisory.
    #[inline]
    pub fn has_work(&self) -> bool {
        self.pending.has_work()
    }

    /// Approximate number of committed items.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.items()
    }

    /// `!has_data()`. Advisory.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.has_data()
    }

    /// Items the queue can hold at once: `N - 1`.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Slots in the ring, including the one kept empty.
    pub const fn slot_count(&self) -> usize {
        N
    }

    /// The retry policy used while contending for the gate.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }
}

impl<T, const N: usize, P: SlotProtocol> Default for Queue<T, N, P> {
    fn default() -> Self {
        Self::with_protocol(Backoff::default())
    }
}

impl<T, const N: usize, P: SlotProtocol> fmt::Debug for Queue<T, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (data, actions) = self.pending.snapshot();
        f.debug_struct("Queue")
            .field("slots", &N)
            .field("reserved", &self.coordinator.reserved())
            .field("pending_data", &data)
            .field("pending_actions", &actions)
            .finish_non_exhaustive()
    }
}

impl<T, const N: usize, P: SlotProtocol> Drop for Queue<T, N, P> {
    fn drop(&mut self) {
        let (head, tail) = self.coordinator.bounds();
        // SAFETY: `&mut self` means every producer and consumer is gone, so
        // each slot in `[head, tail)` holds a published item.
        let dropped = unsafe { self.ring.drop_live(head, tail) };
        if dropped > 0 {
            debug!(dropped, "dropped items left in queue");
        }
    }
}
