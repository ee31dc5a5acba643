//! Sliding-window call limiter: at most `max_calls` calls in any trailing `period`,
//! enforced by sleeping the caller. Time comes from a pluggable `Clock`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Longest window accepted; larger periods are clamped so instant arithmetic stays in range.
pub const MAX_PERIOD: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Source of time for the limiter. `sleep` blocks (or pretends to).
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);
}

/// Wall clock: `Instant::now()` and `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

/// Virtual clock whose `sleep` advances time instantly and records the request.
/// Clones share state, so a test can keep a handle while the limiter owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    origin: Instant,
    now: Instant,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        let origin = Instant::now();
        Self { inner: Arc::new(Mutex::new(ManualState { origin, now: origin, sleeps: Vec::new() })) }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // A poisoned lock only means another test thread panicked; the data is still usable.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn advance(&self, d: Duration) {
        let mut st = self.state();
        st.now = st.now.checked_add(d).unwrap_or(st.now);
    }

    /// Move to `secs` after the origin (never backwards).
    pub fn set_elapsed(&self, secs: f64) {
        let mut st = self.state();
        let target = st.origin + Duration::from_secs_f64(secs);
        if target > st.now {
            st.now = target;
        }
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        let st = self.state();
        st.now - st.origin
    }

    /// Every non-zero sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state().sleeps.clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.state().sleeps.iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.state().now
    }
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        let mut st = self.state();
        st.now = st.now.checked_add(d).unwrap_or(st.now);
        st.sleeps.push(d);
    }
}

#[derive(Debug)]
pub struct RateLimiter<C: Clock = SystemClock> {
    max_calls: usize,
    period: Duration,
    calls: VecDeque<Instant>,
    total_calls: u64,
    clock: C,
}

impl RateLimiter<SystemClock> {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self::with_clock(max_calls, period, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(max_calls: usize, period: Duration, clock: C) -> Self {
        let max_calls = max_calls.max(1);
        let period = period.min(MAX_PERIOD);
        Self { max_calls, period, calls: VecDeque::with_capacity(max_calls), total_calls: 0, clock }
    }

    /// Block until one more call fits in the window, then record it.
    /// Returns how long the caller was put to sleep.
    pub fn call(&mut self) -> Duration {
        let mut now = self.clock.now();
        self.prune(now);

        let mut slept = Duration::ZERO;
        while self.calls.len() >= self.max_calls {
            let oldest = match self.calls.front() {
                Some(t) => *t,
                None => break,
            };
            // Negative gaps saturate to zero.
            let wait = oldest
                .checked_add(self.period)
                .map_or(self.period, |t| t.saturating_duration_since(now));
            if !wait.is_zero() {
                tracing::debug!(wait_ms = wait.as_millis() as u64, in_window = self.calls.len(), "rate limit reached, sleeping");
                self.clock.sleep(wait);
                slept = slept.saturating_add(wait);
            }
            now = self.clock.now();
            self.prune(now);
        }

        self.calls.push_back(now);
        self.total_calls += 1;
        slept
    }

    /// Lifetime number of `call()` invocations.
    pub fn total_calls(&self) -> u64 {
        self.total_calls
    }

    /// Calls currently tracked inside the trailing window.
    pub fn in_window(&self) -> usize {
        self.calls.len()
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Drop entries that have left `(now - period, now]`.
    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.calls.front() {
            // An unrepresentable end instant is still ahead of `now`.
            let expired = front.checked_add(self.period).is_some_and(|end| end <= now);
            if expired {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }
}
