//! Per-slot ownership tracking.
//!
//! A slot cycles `Free -> claimed by a producer -> committed -> claimed by a
//! consumer -> Free`. The coordinator decides *which* slot a thread may try
//! next; the [`SlotProtocol`] decides whether that slot can be taken right
//! now and performs the hand-off that makes the item's bytes visible to the
//! next owner.
//!
//! Claims run inside the coordinator's gate. `publish` and `vacate` run
//! outside it, after the item has been moved in or out.

use core::mem::MaybeUninit;

use crate::sync::{AtomicBool, Ordering, UnsafeCell};

mod sealed {
    pub trait Sealed {}
}

/// State flag(s) guarding one slot.
///
/// Sealed: the queue's safety rests on the exact acquire/release pairing of
/// the two implementations.
pub trait SlotProtocol: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn new() -> Self;

    /// Try to take a free slot for writing.
    #[doc(hidden)]
    fn claim_write(&self) -> bool;

    /// The item is written; hand the slot to consumers.
    #[doc(hidden)]
    fn publish(&self);

    /// Try to take a slot in the live range for reading.
    #[doc(hidden)]
    fn claim_read(&self) -> bool;

    /// The item is moved out; hand the slot back to producers.
    #[doc(hidden)]
    fn vacate(&self);
}

/// "Claimed by exactly one thread" flag, independent of whether the slot
/// holds data.
///
/// Both sides claim by setting the flag from off to on and release by
/// clearing it, so a producer only clears it once the write is done and
/// "not busy" inside the live range always means "readable". A producer that reaches a slot a slow
/// consumer is still reading from finds it busy and retries.
#[derive(Debug)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl sealed::Sealed for BusyFlag {}

impl BusyFlag {
    /// Test-and-set. A failed attempt is a relaxed load and writes nothing.
    #[inline]
    fn try_take(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }
}

impl SlotProtocol for BusyFlag {
    fn new() -> Self {
        BusyFlag {
            busy: AtomicBool::new(false),
        }
    }

    #[inline]
    fn claim_write(&self) -> bool {
        self.try_take()
    }

    #[inline]
    fn publish(&self) {
        self.busy.store(false, Ordering::Release);
    }

    #[inline]
    fn claim_read(&self) -> bool {
        self.try_take()
    }

    #[inline]
    fn vacate(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// "Holds a fully written item" flag.
///
/// Set by the producer after writing and cleared by the consumer after
/// reading. Claiming only inspects the flag; exclusivity between two
/// producers (or two consumers) comes from the index advancing under the
/// gate.
#[derive(Debug)]
pub struct CommitFlag {
    committed: AtomicBool,
}

impl sealed::Sealed for CommitFlag {}

impl SlotProtocol for CommitFlag {
    fn new() -> Self {
        CommitFlag {
            committed: AtomicBool::new(false),
        }
    }

    #[inline]
    fn claim_write(&self) -> bool {
        !self.committed.load(Ordering::Acquire)
    }

    #[inline]
    fn publish(&self) {
        self.committed.store(true, Ordering::Release);
    }

    #[inline]
    fn claim_read(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    #[inline]
    fn vacate(&self) {
        self.committed.store(false, Ordering::Release);
    }
}

/// One storage cell plus its state flag.
pub(crate) struct Slot<T, P> {
    pub(crate) state: P,
    value: UnsafeCell<MaybeUninit<T>>,
}

// Access to `value` is serialized by the claim held through `state`.
unsafe impl<T: Send, P: SlotProtocol> Send for Slot<T, P> {}
unsafe impl<T: Send, P: SlotProtocol> Sync for Slot<T, P> {}

impl<T, P: SlotProtocol> Slot<T, P> {
    pub(crate) fn new() -> Self {
        Slot {
            state: P::new(),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// # Safety
    ///
    /// The caller holds the write claim on this slot and the slot is empty.
    #[inline]
    pub(crate) unsafe fn write(&self, item: T) {
        self.value.with_mut(|cell| {
            (*cell).write(item);
        });
    }

    /// # Safety
    ///
    /// The caller holds the read claim on this slot and the slot holds an
    /// item written by a producer.
    #[inline]
    pub(crate) unsafe fn take(&self) -> T {
        self.value.with_mut(|cell| (*cell).assume_init_read())
    }

    /// # Safety
    ///
    /// No other thread can reach this slot and it holds an item.
    pub(crate) unsafe fn drop_in_place(&self) {
        self.value.with_mut(|cell| (*cell).assume_init_drop());
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn busy_flag_excludes_second_claimant() {
        let flag = BusyFlag::new();
        assert!(flag.claim_write());
        assert!(!flag.claim_write());
        assert!(!flag.claim_read());
        flag.publish();
        assert!(flag.claim_read());
        assert!(!flag.claim_write());
        flag.vacate();
        assert!(flag.claim_write());
    }

    #[test]
    fn commit_flag_tracks_data_presence() {
        let flag = CommitFlag::new();
        assert!(!flag.claim_read());
        assert!(flag.claim_write());
        flag.publish();
        assert!(!flag.claim_write());
        assert!(flag.claim_read());
        flag.vacate();
        assert!(!flag.claim_read());
        assert!(flag.claim_write());
    }

    #[test]
    fn slot_moves_item_in_and_out() {
        let slot = Slot::<String, BusyFlag>::new();
        assert!(slot.state.claim_write());
        unsafe { slot.write("payload".to_string()) };
        slot.state.publish();

        assert!(slot.state.claim_read());
        let item = unsafe { slot.take() };
        slot.state.vacate();
        assert_eq!(item, "payload");
    }
}
