//! Countdown persistence over the shared store.

use std::sync::Arc;

use uuid::Uuid;

use super::model::Countdown;
use crate::error::Result;
use crate::store::{KvKey, KvStore};

const COUNTDOWN_NAMESPACE: &str = "countdowns";

/// Stores countdowns under `countdowns/<id>`, without expiry.
#[derive(Clone)]
pub struct CountdownRepository {
    store: Arc<dyn KvStore>,
}

impl CountdownRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn key_for(id: Uuid) -> KvKey {
        KvKey::new(COUNTDOWN_NAMESPACE).with(id.to_string())
    }

    pub async fn save(&self, countdown: &Countdown) -> Result<()> {
        let value = serde_json::to_value(countdown).map_err(crate::store::StoreError::from)?;
        self.store.set(&Self::key_for(countdown.id), value, None).await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Countdown>> {
        match self.store.get(&Self::key_for(id)).await? {
            Some(entry) => Ok(Some(entry.decode()?)),
            None => Ok(None),
        }
    }

    /// All countdowns, ordered by creation time.
    pub async fn list(&self) -> Result<Vec<Countdown>> {
        let entries = self.store.list(&KvKey::new(COUNTDOWN_NAMESPACE)).await?;
        let mut countdowns = entries
            .into_iter()
            .map(|(_, entry)| entry.decode::<Countdown>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        countdowns.sort_by_key(|countdown| countdown.created_at);
        Ok(countdowns)
    }

    /// Returns whether a countdown was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.store.delete(&Self::key_for(id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::CountdownInput;
    use crate::store::MemoryKv;
    use chrono::{Duration, Utc};

    fn countdown(title: &str, created_offset_secs: i64) -> Countdown {
        let input = CountdownInput {
            title: title.to_string(),
            expiration: "2030-01-01".to_string(),
            ..CountdownInput::default()
        };
        let created = Utc::now() + Duration::seconds(created_offset_secs);
        Countdown::from_input(input, Uuid::new_v4(), created).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let repository = CountdownRepository::new(Arc::new(MemoryKv::new()));
        let saved = countdown("Launch", 0);

        repository.save(&saved).await.unwrap();
        assert_eq!(repository.get(saved.id).await.unwrap(), Some(saved));
        assert_eq!(repository.get(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_ordered_by_creation() {
        let repository = CountdownRepository::new(Arc::new(MemoryKv::new()));
        let later = countdown("Later", 60);
        let earlier = countdown("Earlier", 0);

        repository.save(&later).await.unwrap();
        repository.save(&earlier).await.unwrap();

        let titles: Vec<String> = repository
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|countdown| countdown.title)
            .collect();
        assert_eq!(titles, vec!["Earlier", "Later"]);
    }

    #[tokio::test]
    async fn test_list_ignores_other_namespaces() {
        let store = Arc::new(MemoryKv::new());
        store
            .set(
                &crate::ratelimit::counter_key("203.0.113.1", 0),
                serde_json::json!({}),
                None,
            )
            .await
            .unwrap();
        let repository = CountdownRepository::new(store);

        assert!(repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let repository = CountdownRepository::new(Arc::new(MemoryKv::new()));
        let saved = countdown("Launch", 0);
        repository.save(&saved).await.unwrap();

        assert!(repository.delete(saved.id).await.unwrap());
        assert!(!repository.delete(saved.id).await.unwrap());
        assert_eq!(repository.get(saved.id).await.unwrap(), None);
    }
}
