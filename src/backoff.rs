//! Retry backoff for threads that lose the race for the gate or a slot.
//!
//! The first few retries are pure spins. After that every retry yields to
//! the scheduler and sleeps, the sleep growing linearly by `step` until it
//! reaches `max`. With `wrap` set, a thread that has slept at `max` starts
//! over from the spin phase instead of settling at the longest sleep.

use std::time::Duration;

use crate::sync;
use crate::trace::trace;

const DEFAULT_SPIN_LIMIT: u32 = 10;
const DEFAULT_STEP: Duration = Duration::from_nanos(1);
const DEFAULT_MAX: Duration = Duration::from_nanos(100);

/// Where a retrying thread currently is in its backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Busy-wait; the payload counts spins already taken.
    Spin(u32),
    /// Yield, then sleep for the given duration.
    Sleep(Duration),
}

/// Backoff policy, fixed for the lifetime of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    spin_limit: u32,
    step: Duration,
    max: Duration,
    wrap: bool,
}

impl Backoff {
    /// 10 spins, then sleeps growing by 1 ns up to 100 ns, wrapping.
    pub const fn new() -> Self {
        Backoff {
            spin_limit: DEFAULT_SPIN_LIMIT,
            step: DEFAULT_STEP,
            max: DEFAULT_MAX,
            wrap: true,
        }
    }

    /// Number of pure spins before the first sleep.
    pub const fn spin_limit(mut self, spins: u32) -> Self {
        self.spin_limit = spins;
        self
    }

    /// Increment added to the sleep after each failed retry.
    pub const fn step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Longest sleep. A `max` below `step` is raised to `step`.
    pub const fn max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    /// Return to the spin phase after sleeping at `max`.
    pub const fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// The state a fresh retry loop starts from.
    pub const fn first(&self) -> Pause {
        if self.spin_limit == 0 {
            Pause::Sleep(self.step)
        } else {
            Pause::Spin(0)
        }
    }

    fn ceiling(&self) -> Duration {
        self.max.max(self.step)
    }

    /// The state after `current`. Pure: performs no waiting.
    pub fn advance(&self, current: Pause) -> Pause {
        match current {
            Pause::Spin(spins) if spins + 1 < self.spin_limit => Pause::Spin(spins + 1),
            Pause::Spin(_) => Pause::Sleep(self.step),
            Pause::Sleep(slept) if slept < self.ceiling() => {
                Pause::Sleep(slept.saturating_add(self.step).min(self.ceiling()))
            }
            Pause::Sleep(_) if self.wrap => {
                trace!("backoff wrapped to spin phase");
                self.first()
            }
            Pause::Sleep(slept) => Pause::Sleep(slept),
        }
    }

    /// Wait as `current` prescribes and return the next state.
    pub fn pause(&self, current: Pause) -> Pause {
        match current {
            Pause::Spin(_) => sync::spin_hint(),
            Pause::Sleep(duration) => {
                sync::yield_now();
                sync::sleep(duration);
            }
        }
        self.advance(current)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::new()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    fn schedule(policy: &Backoff, steps: usize) -> Vec<Pause> {
        let mut out = Vec::with_capacity(steps);
        let mut pause = policy.first();
        for _ in 0..steps {
            out.push(pause);
            pause = policy.advance(pause);
        }
        out
    }

    #[test]
    fn spins_before_sleeping() {
        let policy = Backoff::new().spin_limit(3);
        assert_eq!(
            schedule(&policy, 4),
            vec![
                Pause::Spin(0),
                Pause::Spin(1),
                Pause::Spin(2),
                Pause::Sleep(Duration::from_nanos(1)),
            ]
        );
    }

    #[test]
    fn sleep_grows_linearly_then_wraps() {
        let policy = Backoff::new()
            .spin_limit(1)
            .step(Duration::from_micros(2))
            .max(Duration::from_micros(5));
        assert_eq!(
            schedule(&policy, 6),
            vec![
                Pause::Spin(0),
                Pause::Sleep(Duration::from_micros(2)),
                Pause::Sleep(Duration::from_micros(4)),
                Pause::Sleep(Duration::from_micros(5)),
                Pause::Spin(0),
                Pause::Sleep(Duration::from_micros(2)),
            ]
        );
    }

    #[test]
    fn without_wrap_settles_at_max() {
        let policy = Backoff::new()
            .spin_limit(0)
            .step(Duration::from_nanos(10))
            .max(Duration::from_nanos(20))
            .wrap(false);
        assert_eq!(policy.first(), Pause::Sleep(Duration::from_nanos(10)));
        let tail = schedule(&policy, 5);
        assert_eq!(tail[4], Pause::Sleep(Duration::from_nanos(20)));
    }

    #[test]
    fn max_below_step_is_raised() {
        let policy = Backoff::new()
            .spin_limit(0)
            .step(Duration::from_nanos(50))
            .max(Duration::from_nanos(1))
            .wrap(false);
        let next = policy.advance(policy.first());
        assert_eq!(next, Pause::Sleep(Duration::from_nanos(50)));
    }

    #[test]
    fn huge_step_saturates_at_max() {
        let step = Duration::MAX / 2 + Duration::from_secs(1);
        let policy = Backoff::new()
            .spin_limit(0)
            .step(step)
            .max(Duration::MAX)
            .wrap(false);
        let next = policy.advance(policy.first());
        assert_eq!(next, Pause::Sleep(Duration::MAX));
        assert_eq!(policy.advance(next), Pause::Sleep(Duration::MAX));
    }

    #[test]
    fn pause_returns_advanced_state() {
        let policy = Backoff::default();
        let pause = policy.first();
        assert_eq!(policy.pause(pause), policy.advance(pause));
    }

    #[test]
    fn default_matches_new() {
        assert_eq!(Backoff::default(), Backoff::new());
        assert_eq!(schedule(&Backoff::new(), 11)[10], Pause::Sleep(DEFAULT_STEP));
    }
}
