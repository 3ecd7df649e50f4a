//! Versioned key-value storage shared by the rate limiter and countdown records.
//!
//! Every write stamps the entry with a fresh [`Versionstamp`]. Conditional
//! writes via [`KvStore::check_and_set`] compare that stamp, which is the only
//! serialization point the rate limiter relies on.

mod kv;
mod memory;
mod timeout;

#[cfg(test)]
pub(crate) mod testing;

pub use kv::{CommitOutcome, KeyPart, KvEntry, KvKey, KvStore, StoreError, StoreResult, Versionstamp};
pub use memory::{spawn_expiry_sweeper, MemoryKv};
pub use timeout::TimeoutKv;
