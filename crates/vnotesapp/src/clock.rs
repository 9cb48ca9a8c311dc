//! Time sources.
//!
//! Two clocks are in play: the wall clock stamps `createdAt`/`updatedAt`, and the
//! monotonic clock drives the rate gate and the autosave schedule. Both come from one
//! [`Clock`] so tests can move them together with [`ManualClock::advance`].

use chrono::{DateTime, SubsecRound, Utc};
use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Wall-clock time, truncated to the millisecond precision notes are stored with.
    fn now(&self) -> DateTime<Utc>;

    fn monotonic(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    fn monotonic(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    wall: Cell<DateTime<Utc>>,
    base: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            wall: Cell::new(start.trunc_subsecs(3)),
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
        if let Ok(delta) = chrono::Duration::from_std(by) {
            self.wall.set(self.wall.get() + delta);
        }
    }

    /// Move only the wall clock, e.g. to simulate an NTP correction.
    pub fn set_wall(&self, at: DateTime<Utc>) {
        self.wall.set(at.trunc_subsecs(3));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.wall.get()
    }

    fn monotonic(&self) -> Instant {
        self.base + self.offset.get()
    }
}
