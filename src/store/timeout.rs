//! Per-call deadline for store backends.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::kv::{CommitOutcome, KvEntry, KvKey, KvStore, StoreError, StoreResult, Versionstamp};

/// Wraps a store so that every call fails with [`StoreError::Timeout`] once
/// `deadline` elapses instead of stalling the request.
#[derive(Debug, Clone)]
pub struct TimeoutKv<S> {
    inner: S,
    deadline: Duration,
}

impl<S: KvStore> TimeoutKv<S> {
    pub fn new(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    async fn bounded<T, F>(&self, operation: &'static str, key: &KvKey, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, key = %key, deadline = ?self.deadline, "Store call timed out");
                Err(StoreError::Timeout(self.deadline))
            }
        }
    }
}

#[async_trait]
impl<S: KvStore> KvStore for TimeoutKv<S> {
    async fn get(&self, key: &KvKey) -> StoreResult<Option<KvEntry>> {
        self.bounded("get", key, self.inner.get(key)).await
    }

    async fn set(
        &self,
        key: &KvKey,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<Versionstamp> {
        self.bounded("set", key, self.inner.set(key, value, expire_in))
            .await
    }

    async fn check_and_set(
        &self,
        key: &KvKey,
        expected: Option<Versionstamp>,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<CommitOutcome> {
        self.bounded(
            "check_and_set",
            key,
            self.inner.check_and_set(key, expected, value, expire_in),
        )
        .await
    }

    async fn delete(&self, key: &KvKey) -> StoreResult<bool> {
        self.bounded("delete", key, self.inner.delete(key)).await
    }

    async fn list(&self, prefix: &KvKey) -> StoreResult<Vec<(KvKey, KvEntry)>> {
        self.bounded("list", prefix, self.inner.list(prefix)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::StalledKv;
    use crate::store::MemoryKv;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_stalled_call_times_out() {
        let store = TimeoutKv::new(StalledKv, Duration::from_millis(250));
        let key = KvKey::new("test").with("a");

        let result = store.get(&key).await;
        assert!(matches!(result, Err(StoreError::Timeout(d)) if d == Duration::from_millis(250)));

        let result = store.check_and_set(&key, None, json!(1), None).await;
        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_fast_calls_pass_through() {
        let store = TimeoutKv::new(MemoryKv::new(), Duration::from_secs(1));
        let key = KvKey::new("test").with("a");

        let versionstamp = store.set(&key, json!("v"), None).await.unwrap();
        let entry = store.get(&key).await.unwrap().unwrap();
        assert_eq!(entry.versionstamp, versionstamp);
        assert_eq!(store.list(&KvKey::new("test")).await.unwrap().len(), 1);
        assert!(store.delete(&key).await.unwrap());
    }
}
