//! Fixed-window request rate limiting keyed by source address.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

/// Window length for the fixed-window counter.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Maximum admitted requests per window per source key.
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 10;

/// Per-key counter state. At most one entry exists per key, and
/// `count` is at least 1 once the entry is present.
#[derive(Debug)]
struct RateLimitEntry {
    window_start: Instant,
    count: u32,
}

/// Fixed-window rate limiter shared across concurrent requests.
///
/// Constructed once at process start and injected through application
/// state; tests get a fresh instance each. The per-key
/// read-modify-write happens under one lock acquisition, so
/// increment-and-compare is atomic per call.
///
/// Stale keys are never evicted; the map grows with the number of
/// distinct sources seen since the last restart.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(RATE_LIMIT_WINDOW, RATE_LIMIT_MAX_REQUESTS)
    }

    /// Custom window and budget, primarily for tests.
    pub fn with_limits(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request for `source_key` and report whether the key
    /// has exceeded its budget for the current window (true = limited).
    ///
    /// An absent or expired entry resets to {now, 1} and is never
    /// limited; otherwise the count is incremented and compared.
    pub fn check(&self, source_key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(source_key) {
            Some(entry) if now.duration_since(entry.window_start) <= self.window => {
                entry.count += 1;
                entry.count > self.max_requests
            }
            _ => {
                entries.insert(
                    source_key.to_string(),
                    RateLimitEntry {
                        window_start: now,
                        count: 1,
                    },
                );
                false
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the rate-limit source key for a request: the first
/// `X-Forwarded-For` entry (comma-split, trimmed), falling back to the
/// transport peer address, falling back to "unknown".
pub fn source_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}
