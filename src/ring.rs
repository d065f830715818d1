//! Fixed ring of slots. Owns storage only; who may touch which slot is
//! decided by the coordinator and the slot protocol.

use crate::slot::{Slot, SlotProtocol};

/// Index following `index` on a ring of `N` slots.
#[inline(always)]
pub(crate) const fn next<const N: usize>(index: usize) -> usize {
    (index + 1) % N
}

/// Number of slots in the cyclic range `[head, tail)`.
#[inline(always)]
pub(crate) const fn span<const N: usize>(head: usize, tail: usize) -> usize {
    (tail + N - head) % N
}

pub(crate) struct Ring<T, const N: usize, P> {
    slots: Box<[Slot<T, P>]>,
}

impl<T, const N: usize, P: SlotProtocol> Ring<T, N, P> {
    // One slot always stays empty to tell "full" from "empty".
    const MIN_SLOTS: () = assert!(N >= 2, "slot count must be at least 2");

    pub(crate) fn new() -> Self {
        let () = Self::MIN_SLOTS;

        let slots: Box<[Slot<T, P>]> = (0..N).map(|_| Slot::new()).collect();
        Ring { slots }
    }

    #[inline(always)]
    pub(crate) fn slot(&self, index: usize) -> &Slot<T, P> {
        &self.slots[index]
    }

    /// Drop every item in `[head, tail)` and return how many there were.
    ///
    /// # Safety
    ///
    /// No other thread can reach the ring, and every slot in `[head, tail)`
    /// holds a published item.
    pub(crate) unsafe fn drop_live(&mut self, head: usize, tail: usize) -> usize {
        let mut index = head;
        while index != tail {
            self.slots[index].drop_in_place();
            index = next::<N>(index);
        }
        span::<N>(head, tail)
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use crate::slot::BusyFlag;

    #[test]
    fn indices_wrap() {
        assert_eq!(next::<4>(0), 1);
        assert_eq!(next::<4>(3), 0);
        assert_eq!(span::<4>(0, 0), 0);
        assert_eq!(span::<4>(3, 1), 2);
        assert_eq!(span::<5>(1, 0), 4);
    }

    #[test]
    fn two_slot_ring_is_the_smallest() {
        let ring = Ring::<u8, 2, BusyFlag>::new();
        assert_eq!(ring.slots.len(), 2);
    }

    #[test]
    fn drop_live_only_touches_live_range() {
        use std::rc::Rc;

        let marker = Rc::new(());
        let mut ring = Ring::<Rc<()>, 4, BusyFlag>::new();
        for index in [3, 0] {
            unsafe { ring.slot(index).write(Rc::clone(&marker)) };
        }
        assert_eq!(Rc::strong_count(&marker), 3);

        let dropped = unsafe { ring.drop_live(3, 1) };
        assert_eq!(dropped, 2);
        assert_eq!(Rc::strong_count(&marker), 1);
    }
}
