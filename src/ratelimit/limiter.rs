//! Store-backed fixed-window rate limiter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, trace, warn};

use super::clock::{Clock, SystemClock};
use super::counter::{counter_key, FixedWindow, WindowCounter};
use super::rejection::RateLimitInfo;
use crate::config::RateLimitConfig;
use crate::store::{CommitOutcome, KvStore, StoreError};

/// Read-then-conditional-write rounds before giving up on a contended key.
pub const MAX_COMMIT_ATTEMPTS: usize = 5;

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through; a creation or increment was persisted
    /// unless the limiter failed open.
    Admit,
    /// The identity's quota for the current window is spent.
    Reject(RateLimitInfo),
}

impl Decision {
    pub fn is_admit(&self) -> bool {
        matches!(self, Decision::Admit)
    }
}

/// Internal faults. Neither reaches the caller: both fail open.
#[derive(Debug)]
enum AdmissionFault {
    /// Every conditional write lost to a concurrent writer.
    Contention,
    /// The store errored or timed out.
    Store(StoreError),
}

impl From<StoreError> for AdmissionFault {
    fn from(error: StoreError) -> Self {
        AdmissionFault::Store(error)
    }
}

/// Enforces at most `max_requests` admissions per identity per window.
///
/// Holds no counter state of its own; all of it lives in the injected store,
/// and the store's conditional write is the only serialization point between
/// concurrent requests.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, store: Arc<dyn KvStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Create a limiter whose gate reads time from `clock`.
    pub fn with_clock(
        config: RateLimitConfig,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Current time according to the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Decide whether `identity` may perform one more write at `now`.
    ///
    /// Store faults and exhausted retries admit the request.
    pub async fn admit(&self, identity: &str, now: DateTime<Utc>) -> Decision {
        if !self.config.enabled {
            return Decision::Admit;
        }

        match self.try_admit(identity, now).await {
            Ok(decision) => decision,
            Err(AdmissionFault::Contention) => {
                warn!(
                    identity = %identity,
                    attempts = MAX_COMMIT_ATTEMPTS,
                    "Rate limiter exhausted commit retries, admitting request"
                );
                Decision::Admit
            }
            Err(AdmissionFault::Store(e)) => {
                error!(
                    identity = %identity,
                    error = %e,
                    "Rate limiter store error, admitting request"
                );
                Decision::Admit
            }
        }
    }

    async fn try_admit(
        &self,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Result<Decision, AdmissionFault> {
        let now_ms = now.timestamp_millis();
        let window = FixedWindow::containing(now_ms, self.config.window_ms());
        let key = counter_key(identity, window.start_ms);
        let ttl = Some(self.config.window());

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let (expected, next) = match self.store.get(&key).await? {
                None => (None, WindowCounter::first(identity, window.start_ms, now)),
                Some(entry) => {
                    let current: WindowCounter = entry.decode()?;
                    if current.count >= self.config.max_requests {
                        debug!(
                            key = %key,
                            count = current.count,
                            limit = self.config.max_requests,
                            "Rate limit exceeded"
                        );
                        return Ok(Decision::Reject(RateLimitInfo::exceeded(
                            &self.config,
                            &window,
                            now_ms,
                        )));
                    }
                    (Some(entry.versionstamp), current.incremented(now))
                }
            };

            let value = serde_json::to_value(&next).map_err(StoreError::from)?;
            match self.store.check_and_set(&key, expected, value, ttl).await? {
                CommitOutcome::Committed(versionstamp) => {
                    trace!(
                        key = %key,
                        count = next.count,
                        versionstamp = %versionstamp,
                        "Request admitted"
                    );
                    return Ok(Decision::Admit);
                }
                CommitOutcome::Conflict => {
                    trace!(key = %key, attempt, "Lost counter update race, retrying");
                }
            }
        }

        Err(AdmissionFault::Contention)
    }
}
