//! Blocking and deadline-bounded wrappers over the non-blocking core.
//!
//! These retry `try_push`/`try_pop` with the queue's own [`Backoff`]
//! between attempts. The core never waits on a full or empty queue by
//! itself.
//!
//! [`Backoff`]: crate::Backoff

use std::time::Instant;

use crate::error::{PopError, PushError};
use crate::queue::Queue;
use crate::slot::SlotProtocol;

impl<T, const N: usize, P: SlotProtocol> Queue<T, N, P> {
    /// Push, waiting as long as it takes for a slot to free up.
    pub fn push(&self, item: T) {
        let mut item = item;
        let mut pause = self.backoff().first();
        while let Err(PushError(rejected)) = self.try_push(item) {
            item = rejected;
            pause = self.backoff().pause(pause);
        }
    }

    /// Pop, waiting as long as it takes for an item to arrive.
    ///
    /// Never returns on a queue nobody pushes to again; call it only when
    /// more items are known to be on the way.
    pub fn pop(&self) -> T {
        let mut pause = self.backoff().first();
        loop {
            match self.try_pop() {
                Ok(item) => return item,
                Err(PopError) => pause = self.backoff().pause(pause),
            }
        }
    }

    /// Push, giving up once `deadline` has passed.
    ///
    /// Makes at least one attempt even if the deadline is already behind.
    pub fn push_until(&self, item: T, deadline: Instant) -> Result<(), PushError<T>> {
        let mut item = item;
        let mut pause = self.backoff().first();
        loop {
            match self.try_push(item) {
                Ok(()) => return Ok(()),
                Err(err) if Instant::now() >= deadline => return Err(err),
                Err(PushError(rejected)) => {
                    item = rejected;
                    pause = self.backoff().pause(pause);
                }
            }
        }
    }

    /// Pop, giving up once `deadline` has passed.
    pub fn pop_until(&self, deadline: Instant) -> Result<T, PopError> {
        let mut pause = self.backoff().first();
        loop {
            match self.try_pop() {
                Ok(item) => return Ok(item),
                Err(err) if Instant::now() >= deadline => return Err(err),
                Err(PopError) => pause = self.backoff().pause(pause),
            }
        }
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::{PopError, PushError, Queue};

    #[test]
    fn blocking_pair_hands_over_every_item() {
        let q = Arc::new(Queue::<u64, 4>::new());
        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || (0..500).for_each(|i| q.push(i)))
        };

        let sum: u64 = (0..500).map(|_| q.pop()).sum();
        producer.join().unwrap();
        assert_eq!(sum, (0..500).sum());
    }

    #[test]
    fn push_until_expires_on_full_queue() {
        let q = Queue::<u8, 2>::new();
        q.push(1);
        let deadline = Instant::now() + Duration::from_millis(5);
        assert_eq!(q.push_until(2, deadline), Err(PushError(2)));
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn pop_until_expires_on_empty_queue() {
        let q = Queue::<u8, 2>::new();
        let deadline = Instant::now() + Duration::from_millis(5);
        assert_eq!(q.pop_until(deadline), Err(PopError));
    }

    #[test]
    fn pop_until_sees_late_item() {
        let q = Arc::new(Queue::<u8, 2>::new());
        let pusher = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(2));
                q.push(9);
            })
        };
        let deadline = Instant::now() + Duration::from_secs(10);
        assert_eq!(q.pop_until(deadline), Ok(9));
        pusher.join().unwrap();
    }
}
