use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of the current time for animations, timers and the hover poll.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<Instant>>);

impl ManualClock {
    pub fn new() -> Self { ManualClock(Arc::new(Mutex::new(Instant::now()))) }

    pub fn advance(&self, by: Duration) { *self.0.lock() += by; }
}

impl Default for ManualClock {
    fn default() -> Self { Self::new() }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant { *self.0.lock() }
}
