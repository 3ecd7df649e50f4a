//! Fixed windows and the per-window counter record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::KvKey;

/// Namespace tag for counter records in the shared store.
pub const COUNTER_NAMESPACE: &str = "rate_limit";

/// A clock-aligned time bucket.
///
/// Boundaries are `floor(now / length) * length` on wall-clock epoch
/// milliseconds, so every identity rotates windows at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindow {
    /// Window start, epoch milliseconds
    pub start_ms: i64,
    /// Window length, milliseconds
    pub length_ms: i64,
}

impl FixedWindow {
    /// The window containing `now_ms`. `length_ms` must be positive.
    pub fn containing(now_ms: i64, length_ms: i64) -> Self {
        Self {
            start_ms: now_ms.div_euclid(length_ms) * length_ms,
            length_ms,
        }
    }

    /// First millisecond of the next window.
    pub fn end_ms(&self) -> i64 {
        self.start_ms.saturating_add(self.length_ms)
    }

    /// Whole seconds until the window closes, rounded up.
    ///
    /// Always within `1..=ceil(length / 1000)` for a `now_ms` inside the window.
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = self.end_ms().saturating_sub(now_ms).max(0);
        u64::try_from(remaining_ms.saturating_add(999) / 1000).unwrap_or(0)
    }
}

/// Requests admitted for one identity in one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowCounter {
    pub identity: String,
    pub window_start: i64,
    pub count: u64,
    pub first_request_at: DateTime<Utc>,
    pub last_request_at: DateTime<Utc>,
}

impl WindowCounter {
    /// The counter written by the first admitted request of a window.
    pub fn first(identity: &str, window_start: i64, now: DateTime<Utc>) -> Self {
        Self {
            identity: identity.to_string(),
            window_start,
            count: 1,
            first_request_at: now,
            last_request_at: now,
        }
    }

    /// This counter after one more admitted request.
    pub fn incremented(&self, now: DateTime<Utc>) -> Self {
        Self {
            count: self.count + 1,
            last_request_at: now,
            ..self.clone()
        }
    }
}

/// Store key for the counter of `identity` in the window starting at `window_start`.
pub fn counter_key(identity: &str, window_start: i64) -> KvKey {
    KvKey::new(COUNTER_NAMESPACE).with(identity).with(window_start)
}
