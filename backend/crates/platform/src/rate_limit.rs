//! Rate Limiting Infrastructure
//!
//! In-memory, per-process rate limiters keyed by client identity and
//! endpoint configuration. Two strategies share one [`RateLimiter`] trait:
//!
//! - [`FixedWindowRateLimiter`]: one counter per window. Cheap, but up to
//!   `2 × max_requests` requests can pass around a window boundary. Good
//!   enough for anti-spam.
//! - [`SlidingWindowRateLimiter`]: one timestamp per admitted request.
//!   Exact bound, O(requests in window) memory per client.
//!
//! Neither store is persisted or shared between processes; each instance
//! enforces its own limits.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use dashmap::DashMap;

use crate::clock::Clock;
use crate::sweeper::Sweep;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Rate limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }

    /// Store key. Includes the configuration so two endpoints with different
    /// limits never share a counter for the same client.
    pub fn key_for(&self, client_id: &str) -> String {
        format!("{}:{}:{}", client_id, self.window_ms(), self.max_requests)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: i64,
    /// Present only when the request was rejected
    pub retry_after_secs: Option<u64>,
}

impl RateLimitResult {
    fn allowed(config: &RateLimitConfig, remaining: u32, reset_at_ms: i64) -> Self {
        Self {
            allowed: true,
            limit: config.max_requests,
            remaining,
            reset_at_ms,
            retry_after_secs: None,
        }
    }

    fn denied(config: &RateLimitConfig, reset_at_ms: i64, now_ms: i64) -> Self {
        Self {
            allowed: false,
            limit: config.max_requests,
            remaining: 0,
            reset_at_ms,
            retry_after_secs: Some(retry_after_secs(reset_at_ms, now_ms)),
        }
    }

    /// Window reset time in unix seconds, rounded up
    pub fn reset_at_secs(&self) -> i64 {
        (self.reset_at_ms + 999).div_euclid(1000)
    }

    /// `X-RateLimit-*` headers, plus `Retry-After` on rejection
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(self.reset_at_secs()));
        if let Some(retry_after) = self.retry_after_secs {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        headers
    }
}

/// Seconds until `reset_at_ms`, rounded up, never below 1.
fn retry_after_secs(reset_at_ms: i64, now_ms: i64) -> u64 {
    let wait_ms = (reset_at_ms - now_ms).max(0) as u64;
    wait_ms.div_ceil(1000).max(1)
}

/// Admission check shared by both strategies.
///
/// Implementations are synchronous and safe to call from many request
/// tasks at once.
pub trait RateLimiter: Sweep {
    /// Count the request against `client_id` and decide whether it is admitted.
    fn check(&self, client_id: &str, config: &RateLimitConfig) -> RateLimitResult;
}

// ============================================================================
// Fixed window
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    count: u32,
    window_reset_at_ms: i64,
}

/// Fixed-window counter per (client, config)
pub struct FixedWindowRateLimiter {
    records: DashMap<String, RateLimitRecord>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowRateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.records.len()
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, client_id: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = self.clock.now_ms();
        let window_ms = config.window_ms();

        // The entry guard holds the shard lock, so check-and-increment is
        // atomic per key.
        let mut entry = self
            .records
            .entry(config.key_for(client_id))
            .or_insert(RateLimitRecord {
                count: 0,
                window_reset_at_ms: now + window_ms,
            });
        let record = entry.value_mut();

        if now > record.window_reset_at_ms {
            *record = RateLimitRecord {
                count: 0,
                window_reset_at_ms: now + window_ms,
            };
        }

        if record.count >= config.max_requests {
            return RateLimitResult::denied(config, record.window_reset_at_ms, now);
        }

        record.count += 1;
        RateLimitResult::allowed(
            config,
            config.max_requests - record.count,
            record.window_reset_at_ms,
        )
    }
}

impl Sweep for FixedWindowRateLimiter {
    fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.records.len();
        self.records
            .retain(|_, record| now <= record.window_reset_at_ms);
        before.saturating_sub(self.records.len())
    }
}

// ============================================================================
// Sliding window
// ============================================================================

/// Sliding-window log per (client, config)
pub struct SlidingWindowRateLimiter {
    logs: DashMap<String, SlidingLog>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct SlidingLog {
    timestamps: VecDeque<i64>,
    window_ms: i64,
}

impl SlidingLog {
    fn prune(&mut self, now: i64) {
        let cutoff = now - self.window_ms;
        while self.timestamps.front().is_some_and(|t| *t <= cutoff) {
            self.timestamps.pop_front();
        }
    }
}

impl SlidingWindowRateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            logs: DashMap::new(),
            clock,
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.logs.len()
    }
}

impl RateLimiter for SlidingWindowRateLimiter {
    fn check(&self, client_id: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = self.clock.now_ms();
        let window_ms = config.window_ms();

        let mut entry = self
            .logs
            .entry(config.key_for(client_id))
            .or_insert_with(|| SlidingLog {
                timestamps: VecDeque::new(),
                window_ms,
            });
        let log = entry.value_mut();
        log.prune(now);

        let max = config.max_requests as usize;
        if log.timestamps.len() >= max {
            let reset_at = log.timestamps.front().map_or(now, |oldest| oldest + window_ms);
            return RateLimitResult::denied(config, reset_at, now);
        }

        log.timestamps.push_back(now);
        let reset_at = log.timestamps.front().map_or(now, |oldest| oldest + window_ms);
        RateLimitResult::allowed(
            config,
            (max - log.timestamps.len()) as u32,
            reset_at,
        )
    }
}

impl Sweep for SlidingWindowRateLimiter {
    fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.logs.len();
        self.logs.retain(|_, log| {
            log.prune(now);
            !log.timestamps.is_empty()
        });
        before.saturating_sub(self.logs.len())
    }
}
