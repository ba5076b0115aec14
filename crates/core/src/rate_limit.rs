//! Sliding-window admission control
//!
//! The API allows a fixed number of requests per second per credential. The
//! limiter keeps the timestamps of recent requests and, once the window is
//! full, suspends the caller until the oldest one slides out.
//!
//! Timestamps are stamped with the server's `Date` header when the response
//! carries one, which keeps the window aligned with the server's own
//! accounting rather than local clock drift.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

/// Requests admitted per window
pub const DEFAULT_BUDGET: usize = 5;

/// Length of the sliding window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Source of wall-clock time and suspension for the limiter
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time
    fn now(&self) -> Timestamp;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Deterministic clock for tests: sleeping advances time instantly
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            slept: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = add(*now, duration);
    }

    /// Every duration passed to [`Clock::sleep`], in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
    }
}

fn add(ts: Timestamp, duration: Duration) -> Timestamp {
    let signed = SignedDuration::try_from(duration).unwrap_or(SignedDuration::MAX);
    ts.checked_add(signed).unwrap_or(Timestamp::MAX)
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    id: u64,
    at: Timestamp,
}

/// Timestamps of requests admitted within the trailing window
#[derive(Debug, Default)]
struct RateWindow {
    slots: Vec<Slot>,
    next_id: u64,
}

impl RateWindow {
    /// Drop every slot at least one window old
    fn trim(&mut self, now: Timestamp, window: SignedDuration) {
        self.slots.retain(|slot| now.duration_since(slot.at) < window);
    }

    fn oldest(&self) -> Option<Timestamp> {
        self.slots.iter().map(|slot| slot.at).min()
    }

    fn reserve(&mut self, at: Timestamp) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push(Slot { id, at });
        id
    }

    fn stamp(&mut self, id: u64, at: Timestamp) {
        match self.slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) => slot.at = at,
            None => self.slots.push(Slot { id, at }),
        }
    }
}

/// Process-wide sliding-window rate limiter.
///
/// Clone is cheap and clones share one window, so a single limiter can be
/// handed to every pipeline that uses the same credential.
#[derive(Clone)]
pub struct RateLimiter {
    window: Arc<Mutex<RateWindow>>,
    budget: usize,
    span: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("budget", &self.budget)
            .field("span", &self.span)
            .field("in_window", &self.in_window())
            .finish()
    }
}

impl RateLimiter {
    /// Create a limiter admitting `budget` requests per `span`
    pub fn new(budget: usize, span: Duration) -> Self {
        Self::with_clock(budget, span, Arc::new(SystemClock))
    }

    /// Create a limiter reading time from `clock`
    pub fn with_clock(budget: usize, span: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window: Arc::new(Mutex::new(RateWindow::default())),
            budget: budget.max(1),
            span,
            clock,
        }
    }

    /// Requests admitted per window
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Number of slots currently held in the window (before trimming)
    pub fn in_window(&self) -> usize {
        self.lock().slots.len()
    }

    fn lock(&self) -> MutexGuard<'_, RateWindow> {
        self.window.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn span(&self) -> SignedDuration {
        SignedDuration::try_from(self.span).unwrap_or(SignedDuration::MAX)
    }

    /// Wait for room in the window and reserve a slot.
    ///
    /// The check and the reservation happen under one lock, so concurrent
    /// callers can never jointly exceed the budget. The lock is released
    /// while sleeping.
    pub async fn admit(&self) -> Admission {
        loop {
            let wait = {
                let now = self.clock.now();
                let mut window = self.lock();
                window.trim(now, self.span());

                if window.slots.len() < self.budget {
                    let id = window.reserve(now);
                    return Admission {
                        limiter: self.clone(),
                        id,
                    };
                }

                // Non-empty here: the budget is at least one.
                let oldest = window.oldest().unwrap_or(now);
                let elapsed = now.duration_since(oldest);
                (self.span() - elapsed).clamp(SignedDuration::ZERO, self.span())
            };

            tracing::debug!(
                wait_ms = wait.as_millis() as i64,
                budget = self.budget,
                "Rate window full, waiting"
            );
            self.clock
                .sleep(Duration::try_from(wait).unwrap_or(self.span))
                .await;
        }
    }

    fn complete(&self, id: u64, server_time: Option<Timestamp>) {
        let at = server_time.unwrap_or_else(|| self.clock.now());
        self.lock().stamp(id, at);
    }
}

/// A reserved slot in the rate window.
///
/// The slot is held at the local admission time until the request finishes;
/// [`Admission::complete`] then re-stamps it with the server's time.
#[derive(Debug)]
#[must_use = "complete the admission once the response arrives"]
pub struct Admission {
    limiter: RateLimiter,
    id: u64,
}

impl Admission {
    /// Record the request as finished, preferring the server's timestamp
    pub fn complete(self, server_time: Option<Timestamp>) {
        self.limiter.complete(self.id, server_time);
    }
}

/// Parse an HTTP `Date` header (`Tue, 15 Nov 1994 08:12:31 GMT`)
pub fn parse_http_date(value: &str) -> Option<Timestamp> {
    jiff::fmt::rfc2822::DateTimeParser::new()
        .parse_timestamp(value.trim())
        .ok()
}
