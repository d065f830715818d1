//! Head/tail coordination behind a spin gate.
//!
//! The gate is a single atomic flag: acquire by a compare-and-set from off to
//! on, release by clearing it. Holding it grants
//! the right to read-modify-write `head` and `tail` and to try one slot
//! claim. It is held for the index arithmetic and the claim toggle only,
//! never while an item is moved, so its hold time does not depend on `T`.
//!
//! `head` and `tail` are atomics so that advisory readers never race, but
//! every mutation happens with the gate held and uses relaxed ordering; the
//! gate's acquire/release pair orders them.

use crossbeam_utils::CachePadded;

use crate::ring::{self, Ring};
use crate::slot::SlotProtocol;
use crate::sync::{AtomicBool, AtomicUsize, Ordering};

/// Outcome of one pass through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// The caller owns this slot index.
    Granted(usize),
    /// Gate held by someone else, or the slot is still owned by a thread
    /// from the other side. Try again.
    Retry,
    /// Full (push) or empty (pop).
    Exhausted,
}

pub(crate) struct Coordinator<const N: usize> {
    gate: CachePadded<AtomicBool>,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
}

struct GateGuard<'a> {
    gate: &'a AtomicBool,
}

impl Drop for GateGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.gate.store(false, Ordering::Release);
    }
}

impl<const N: usize> Coordinator<N> {
    pub(crate) fn new() -> Self {
        Coordinator {
            gate: CachePadded::new(AtomicBool::new(false)),
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    #[inline]
    fn enter(&self) -> Option<GateGuard<'_>> {
        self.gate
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| GateGuard { gate: &self.gate })
    }

    /// Try to reserve the tail slot for a producer.
    #[inline]
    pub(crate) fn claim_tail<T, P: SlotProtocol>(&self, ring: &Ring<T, N, P>) -> Claim {
        let Some(_held) = self.enter() else {
            return Claim::Retry;
        };

        let tail = self.tail.load(Ordering::Relaxed);
        let next = ring::next::<N>(tail);
        if next == self.head.load(Ordering::Relaxed) {
            return Claim::Exhausted;
        }
        if !ring.slot(tail).state.claim_write() {
            return Claim::Retry;
        }

        self.tail.store(next, Ordering::Relaxed);
        Claim::Granted(tail)
    }

    /// Try to reserve the head slot for a consumer.
    #[inline]
    pub(crate) fn claim_head<T, P: SlotProtocol>(&self, ring: &Ring<T, N, P>) -> Claim {
        let Some(_held) = self.enter() else {
            return Claim::Retry;
        };

        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Relaxed) {
            return Claim::Exhausted;
        }
        if !ring.slot(head).state.claim_read() {
            return Claim::Retry;
        }

        self.head.store(ring::next::<N>(head), Ordering::Relaxed);
        Claim::Granted(head)
    }

    /// Reserved-but-unpopped slot count. Unsynchronized, advisory only.
    pub(crate) fn reserved(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        ring::span::<N>(head, tail)
    }

    /// `(head, tail)` once no other thread can reach the queue.
    pub(crate) fn bounds(&mut self) -> (usize, usize) {
        (
            self.head.load(Ordering::Relaxed),
            self.tail.load(Ordering::Relaxed),
        )
    }
}
