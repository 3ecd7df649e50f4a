//! In-process store backed by a sharded concurrent map.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::kv::{CommitOutcome, KvEntry, KvKey, KvStore, StoreResult, Versionstamp};

/// A stored value plus its bookkeeping.
#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    versionstamp: Versionstamp,
    expires_at: Option<Instant>,
}

impl Slot {
    fn new(value: Value, versionstamp: Versionstamp, expire_in: Option<Duration>, now: Instant) -> Self {
        Self {
            value,
            versionstamp,
            expires_at: expire_in.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }

    fn to_entry(&self) -> KvEntry {
        KvEntry {
            value: self.value.clone(),
            versionstamp: self.versionstamp,
        }
    }
}

/// In-memory [`KvStore`].
///
/// Conditional writes hold the key's shard lock between the versionstamp
/// comparison and the write, so they are atomic per key. Expired entries are
/// invisible to readers immediately and are reclaimed by [`MemoryKv::purge_expired`].
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<KvKey, Slot>,
    last_versionstamp: AtomicU64,
}

impl MemoryKv {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_versionstamp(&self) -> Versionstamp {
        Versionstamp(self.last_versionstamp.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut purged = 0;
        self.entries.retain(|_, slot| {
            let live = slot.is_live(now);
            if !live {
                purged += 1;
            }
            live
        });
        purged
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &KvKey) -> StoreResult<Option<KvEntry>> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .and_then(|slot| slot.is_live(now).then(|| slot.to_entry())))
    }

    async fn set(
        &self,
        key: &KvKey,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<Versionstamp> {
        let now = Instant::now();
        let versionstamp = self.next_versionstamp();
        self.entries
            .insert(key.clone(), Slot::new(value, versionstamp, expire_in, now));
        Ok(versionstamp)
    }

    async fn check_and_set(
        &self,
        key: &KvKey,
        expected: Option<Versionstamp>,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<CommitOutcome> {
        let now = Instant::now();

        match self.entries.entry(key.clone()) {
            Entry::Vacant(vacant) => {
                if expected.is_some() {
                    return Ok(CommitOutcome::Conflict);
                }
                let versionstamp = self.next_versionstamp();
                vacant.insert(Slot::new(value, versionstamp, expire_in, now));
                Ok(CommitOutcome::Committed(versionstamp))
            }
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get();
                let current = slot.is_live(now).then_some(slot.versionstamp);
                if current != expected {
                    return Ok(CommitOutcome::Conflict);
                }
                let versionstamp = self.next_versionstamp();
                occupied.insert(Slot::new(value, versionstamp, expire_in, now));
                Ok(CommitOutcome::Committed(versionstamp))
            }
        }
    }

    async fn delete(&self, key: &KvKey) -> StoreResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, slot)| slot.is_live(now)))
    }

    async fn list(&self, prefix: &KvKey) -> StoreResult<Vec<(KvKey, KvEntry)>> {
        let now = Instant::now();
        let mut found: Vec<(KvKey, KvEntry)> = self
            .entries
            .iter()
            .filter(|item| item.key().starts_with(prefix) && item.value().is_live(now))
            .map(|item| (item.key().clone(), item.value().to_entry()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }
}

/// Periodically purge expired entries from `store` until the task is aborted.
pub fn spawn_expiry_sweeper(store: Arc<MemoryKv>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = store.len(), "Purged expired store entries");
            }
        }
    })
}
