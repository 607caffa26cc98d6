//! Frame timing and engine-owned periodic tasks.
//!
//! [`FrameClock`] measures wall time between frames for the windowed front
//! end. [`Interval`] is a plain value the engine advances with the frame
//! delta; it fires at most once per tick and is cancelled by dropping it or
//! calling [`Interval::cancel`].
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! let mut regen = Interval::new(Duration::from_secs(3));
//!
//! // In the frame loop:
//! let delta = clock.update();
//! if regen.tick(delta) {
//!     scheduler.regenerate();
//! }
//! ```

use std::time::{Duration, Instant};

/// Wall-clock frame timing.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed: Duration,
    delta: Duration,
    frame_count: u64,
    /// Fixed delta for deterministic stepping.
    fixed_delta: Option<Duration>,
    /// Longest delta reported, so a stalled window does not produce a jump.
    max_delta: Duration,
}

impl FrameClock {
    /// Create a clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frame_count: 0,
            fixed_delta: None,
            max_delta: Duration::from_millis(250),
        }
    }

    /// Advance one frame and return its delta.
    pub fn update(&mut self) -> Duration {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.delta = self.fixed_delta.unwrap_or(raw).min(self.max_delta);
        self.elapsed = match self.fixed_delta {
            Some(_) => self.elapsed + self.delta,
            None => now.duration_since(self.start),
        };
        self.frame_count += 1;
        self.delta
    }

    /// Total elapsed time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Use a constant delta instead of wall time. `None` restores wall time.
    pub fn set_fixed_delta(&mut self, delta: Option<Duration>) {
        self.fixed_delta = delta;
    }

    pub fn reset(&mut self) {
        *self = Self {
            fixed_delta: self.fixed_delta,
            ..Self::new()
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A repeating timer driven by explicit deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    period: Duration,
    elapsed: Duration,
    active: bool,
}

impl Interval {
    /// A running interval. A zero period is treated as one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            active: true,
        }
    }

    /// Advance by `delta`. Returns true when the period has elapsed.
    ///
    /// Fires at most once per call; leftover time carries into the next
    /// period, capped below one period.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed >= self.period {
            self.elapsed = (self.elapsed - self.period).min(self.period - Duration::from_nanos(1));
            true
        } else {
            false
        }
    }

    /// Stop firing until [`restart`](Self::restart).
    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }

    /// Start a fresh period, optionally with a new length.
    pub fn restart(&mut self, period: Option<Duration>) {
        if let Some(period) = period {
            self.period = period.max(Duration::from_millis(1));
        }
        self.elapsed = Duration::ZERO;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time until the next firing, or `None` when cancelled.
    pub fn remaining(&self) -> Option<Duration> {
        self.active.then(|| self.period - self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_update() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let delta = clock.update();

        assert!(delta > Duration::ZERO);
        assert!(clock.elapsed() > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_clock_fixed_delta() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(Duration::from_millis(16)));
        thread::sleep(Duration::from_millis(30));
        clock.update();
        clock.update();

        assert_eq!(clock.delta(), Duration::from_millis(16));
        assert!((clock.elapsed() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn test_interval_fires_each_period() {
        let mut interval = Interval::new(Duration::from_secs(3));
        let frame = Duration::from_millis(500);
        let fired: Vec<bool> = (0..12).map(|_| interval.tick(frame)).collect();
        let count = fired.iter().filter(|f| **f).count();

        assert_eq!(count, 2);
        assert!(fired[5]);
        assert!(fired[11]);
    }

    #[test]
    fn test_interval_fires_once_per_tick() {
        let mut interval = Interval::new(Duration::from_secs(1));
        assert!(interval.tick(Duration::from_secs(10)));
        // leftover is capped below one period
        assert!(!interval.tick(Duration::ZERO));
    }

    #[test]
    fn test_interval_cancel_and_restart() {
        let mut interval = Interval::new(Duration::from_secs(1));
        interval.tick(Duration::from_millis(900));
        interval.cancel();
        assert!(!interval.tick(Duration::from_secs(5)));
        assert_eq!(interval.remaining(), None);

        interval.restart(Some(Duration::from_secs(2)));
        assert!(!interval.tick(Duration::from_millis(1500)));
        assert!(interval.tick(Duration::from_millis(500)));
    }
}
