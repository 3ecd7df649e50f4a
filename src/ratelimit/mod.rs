//! Creation rate limiting: identity extraction, window counters, and the gate.

mod clock;
mod counter;
mod gate;
mod identity;
mod limiter;
mod rejection;

pub use clock::{Clock, FixedClock, SystemClock};
pub use counter::{counter_key, FixedWindow, WindowCounter, COUNTER_NAMESPACE};
pub use gate::rate_limit_gate;
pub use identity::{extract_identity, UNKNOWN_IDENTITY};
pub use limiter::{Decision, RateLimiter, MAX_COMMIT_ATTEMPTS};
pub use rejection::RateLimitInfo;
