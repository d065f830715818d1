//! spin_mpmc - fixed-capacity MPMC ring queue with a spin-gated claim protocol
//!
//! Producers and consumers reserve a slot under a short spin gate that covers
//! only the head/tail arithmetic and a per-slot ownership flag. The item is
//! moved in or out after the gate is released, and a release/acquire flag
//! hand-off makes it visible to the next owner.
//!
//! The core operations, [`Queue::try_push`] and [`Queue::try_pop`], never wait
//! on a full or empty queue. [`Queue::push`], [`Queue::pop`] and the
//! `*_until` deadline variants layer waiting on top.
//!
//! ```
//! use spin_mpmc::Queue;
//!
//! let queue = Queue::<&str, 4>::new();
//! queue.try_push("a").unwrap();
//! queue.try_push("b").unwrap();
//! assert_eq!(queue.try_pop(), Ok("a"));
//! assert_eq!(queue.try_pop(), Ok("b"));
//! assert!(queue.try_pop().is_err());
//! ```
#![warn(missing_docs)]

mod backoff;
mod blocking;
mod coordinator;
mod counters;
mod error;
mod queue;
mod ring;
mod slot;
mod sync;
mod trace;

pub use backoff::{Backoff, Pause};
pub use error::{PopError, PushError};
pub use queue::Queue;
pub use slot::{BusyFlag, CommitFlag, SlotProtocol};
pub use trace::init_tracing;
