//! Fault-injecting stores for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::kv::{CommitOutcome, KvEntry, KvKey, KvStore, StoreError, StoreResult, Versionstamp};

/// Every call fails as if the backend were down.
#[derive(Debug, Default)]
pub(crate) struct FailingKv;

fn outage() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl KvStore for FailingKv {
    async fn get(&self, _key: &KvKey) -> StoreResult<Option<KvEntry>> {
        Err(outage())
    }

    async fn set(&self, _: &KvKey, _: Value, _: Option<Duration>) -> StoreResult<Versionstamp> {
        Err(outage())
    }

    async fn check_and_set(
        &self,
        _: &KvKey,
        _: Option<Versionstamp>,
        _: Value,
        _: Option<Duration>,
    ) -> StoreResult<CommitOutcome> {
        Err(outage())
    }

    async fn delete(&self, _key: &KvKey) -> StoreResult<bool> {
        Err(outage())
    }

    async fn list(&self, _prefix: &KvKey) -> StoreResult<Vec<(KvKey, KvEntry)>> {
        Err(outage())
    }
}

/// Every call hangs forever.
#[derive(Debug, Default)]
pub(crate) struct StalledKv;

#[async_trait]
impl KvStore for StalledKv {
    async fn get(&self, _key: &KvKey) -> StoreResult<Option<KvEntry>> {
        std::future::pending().await
    }

    async fn set(&self, _: &KvKey, _: Value, _: Option<Duration>) -> StoreResult<Versionstamp> {
        std::future::pending().await
    }

    async fn check_and_set(
        &self,
        _: &KvKey,
        _: Option<Versionstamp>,
        _: Value,
        _: Option<Duration>,
    ) -> StoreResult<CommitOutcome> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &KvKey) -> StoreResult<bool> {
        std::future::pending().await
    }

    async fn list(&self, _prefix: &KvKey) -> StoreResult<Vec<(KvKey, KvEntry)>> {
        std::future::pending().await
    }
}

/// Reads always see an empty key, and every conditional write loses the race.
#[derive(Debug, Default)]
pub(crate) struct ContendedKv {
    pub(crate) commit_attempts: AtomicUsize,
}

impl ContendedKv {
    pub(crate) fn attempts(&self) -> usize {
        self.commit_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for ContendedKv {
    async fn get(&self, _key: &KvKey) -> StoreResult<Option<KvEntry>> {
        Ok(None)
    }

    async fn set(&self, _: &KvKey, _: Value, _: Option<Duration>) -> StoreResult<Versionstamp> {
        Ok(Versionstamp(0))
    }

    async fn check_and_set(
        &self,
        _: &KvKey,
        _: Option<Versionstamp>,
        _: Value,
        _: Option<Duration>,
    ) -> StoreResult<CommitOutcome> {
        self.commit_attempts.fetch_add(1, Ordering::SeqCst);
        Ok(CommitOutcome::Conflict)
    }

    async fn delete(&self, _key: &KvKey) -> StoreResult<bool> {
        Ok(false)
    }

    async fn list(&self, _prefix: &KvKey) -> StoreResult<Vec<(KvKey, KvEntry)>> {
        Ok(Vec::new())
    }
}
