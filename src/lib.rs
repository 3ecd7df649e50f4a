//! Countdown - time-bound countdown pages behind a creation rate limiter
//!
//! Countdown creation is gated by a fixed-window, per-client rate limiter whose
//! counters live in a shared versioned key-value store and are updated with
//! compare-and-swap writes. The limiter fails open on store faults.

pub mod config;
pub mod countdown;
pub mod error;
pub mod http;
pub mod ratelimit;
pub mod store;
