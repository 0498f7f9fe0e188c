//! Fixed-window request pacing shared by every call through a gateway.
//!
//! A window opens on the first request after the previous one expired and
//! admits `capacity` requests. Callers past the capacity sleep until the
//! window rolls over; they are delayed, never rejected.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Length of a rate-limit window
pub const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter.
///
/// The lock is only held to inspect and bump the counter, never across a sleep.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimiter {
    /// Limiter admitting `capacity` requests per 60 seconds
    #[must_use]
    pub fn per_minute(capacity: u32) -> Self {
        Self::new(capacity, WINDOW)
    }

    /// Limiter admitting `capacity` requests per `window`.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Requests admitted per window
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Window length
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Waits for a free slot and takes it. Returns how long the caller was delayed.
    pub async fn acquire(&self) -> Duration {
        let begin = Instant::now();
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                if now.duration_since(state.started) >= self.window {
                    state.started = now;
                    state.count = 0;
                }
                if state.count < self.capacity {
                    state.count += 1;
                    debug!(
                        used = state.count,
                        capacity = self.capacity,
                        "rate limit slot acquired"
                    );
                    return begin.elapsed();
                }
                self.window
                    .saturating_sub(now.duration_since(state.started))
            };
            info!(
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                capacity = self.capacity,
                "rate limit reached, waiting for window to reset"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests already admitted in the current window
    pub async fn used(&self) -> u32 {
        let state = self.state.lock().await;
        if state.started.elapsed() >= self.window {
            0
        } else {
            state.count
        }
    }
}
