use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeDelta};

/// Time source for the widget: wall-clock time for the countdown arithmetic and a monotonic
/// instant for timers and animation.
pub trait Clock {
    fn wall(&self) -> DateTime<Local>;
    fn mono(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn wall(&self) -> DateTime<Local> {
        Local::now()
    }

    fn mono(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests. Clones share the same elapsed offset, so a test can keep a
/// handle and advance the clock owned by a widget.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base_wall: DateTime<Local>,
    base_mono: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new(base_wall: DateTime<Local>) -> Self {
        Self {
            base_wall,
            base_mono: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for ManualClock {
    fn wall(&self) -> DateTime<Local> {
        let offset = TimeDelta::from_std(self.elapsed.get()).unwrap_or(TimeDelta::MAX);
        self.base_wall
            .checked_add_signed(offset)
            .unwrap_or(self.base_wall)
    }

    fn mono(&self) -> Instant {
        self.base_mono + self.elapsed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_elapsed_time() {
        let start = Local::now();
        let clock = ManualClock::new(start);
        let handle = clock.clone();
        let mono0 = clock.mono();

        handle.advance(Duration::from_millis(1_500));

        assert_eq!(clock.wall() - start, TimeDelta::milliseconds(1_500));
        assert_eq!(clock.mono() - mono0, Duration::from_millis(1_500));
    }
}
