//! Store trait and key/value types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer within the configured deadline.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// A stored value could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One component of a [`KvKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    /// A string component, e.g. a namespace tag or an identity.
    Str(String),
    /// An integer component, e.g. a window start in epoch milliseconds.
    Int(i64),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Str(s) => write!(f, "{}", s),
            KeyPart::Int(i) => write!(f, "{}", i),
        }
    }
}

/// An ordered, hierarchical key such as `rate_limit/203.0.113.1/1700000040000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KvKey(Vec<KeyPart>);

impl KvKey {
    /// Start a key with its leading (namespace) component.
    pub fn new(first: impl Into<KeyPart>) -> Self {
        Self(vec![first.into()])
    }

    /// Append a component.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    /// Whether `prefix` is a leading run of this key's components.
    pub fn starts_with(&self, prefix: &KvKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for KvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// Version marker attached to every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Versionstamp(pub u64);

impl fmt::Display for Versionstamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:020}", self.0)
    }
}

/// A live value together with the versionstamp of the write that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub value: Value,
    pub versionstamp: Versionstamp,
}

impl KvEntry {
    /// Deserialize the stored JSON value.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The write was applied under the returned versionstamp.
    Committed(Versionstamp),
    /// The live entry no longer matched the expectation; nothing was written.
    Conflict,
}

/// A shared key-value store with versioned, conditionally-writable entries.
///
/// Entries written with an `expire_in` duration are treated as absent once
/// that duration has elapsed.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the live entry at `key`.
    async fn get(&self, key: &KvKey) -> StoreResult<Option<KvEntry>>;

    /// Unconditionally write `value` at `key`.
    async fn set(
        &self,
        key: &KvKey,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<Versionstamp>;

    /// Write `value` only if the live entry's versionstamp equals `expected`.
    ///
    /// `expected == None` means "only if absent". Two calls carrying the same
    /// expectation can never both commit.
    async fn check_and_set(
        &self,
        key: &KvKey,
        expected: Option<Versionstamp>,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<CommitOutcome>;

    /// Remove the entry at `key`, returning whether a live entry existed.
    async fn delete(&self, key: &KvKey) -> StoreResult<bool>;

    /// All live entries whose key starts with `prefix`, in key order.
    async fn list(&self, prefix: &KvKey) -> StoreResult<Vec<(KvKey, KvEntry)>>;
}

#[async_trait]
impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    async fn get(&self, key: &KvKey) -> StoreResult<Option<KvEntry>> {
        (**self).get(key).await
    }

    async fn set(
        &self,
        key: &KvKey,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<Versionstamp> {
        (**self).set(key, value, expire_in).await
    }

    async fn check_and_set(
        &self,
        key: &KvKey,
        expected: Option<Versionstamp>,
        value: Value,
        expire_in: Option<Duration>,
    ) -> StoreResult<CommitOutcome> {
        (**self).check_and_set(key, expected, value, expire_in).await
    }

    async fn delete(&self, key: &KvKey) -> StoreResult<bool> {
        (**self).delete(key).await
    }

    async fn list(&self, prefix: &KvKey) -> StoreResult<Vec<(KvKey, KvEntry)>> {
        (**self).list(prefix).await
    }
}
