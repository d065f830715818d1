use thiserror::Error;

/// Returned by [`Queue::try_push`](crate::Queue::try_push) when every usable
/// slot is taken. Carries the rejected item back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full")]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// Recover the item that could not be queued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Returned by [`Queue::try_pop`](crate::Queue::try_pop) when no slot in the
/// live range holds an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is empty")]
pub struct PopError;
