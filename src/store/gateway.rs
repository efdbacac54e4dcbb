use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::RecordStore;
use crate::cache::{Revalidate, PAGE_PATH};
use crate::errors::AppError;
use crate::models::Entity;

/// A record store that signals cache invalidation after every successful mutation.
pub struct Gateway<E: Entity> {
    store: Arc<dyn RecordStore<E>>,
    cache: Arc<dyn Revalidate>,
}

impl<E: Entity> Clone for Gateway<E> {
    fn clone(&self) -> Self {
        Gateway {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<E: Entity> Gateway<E> {
    pub fn new(store: Arc<dyn RecordStore<E>>, cache: Arc<dyn Revalidate>) -> Self {
        Gateway { store, cache }
    }
}

#[async_trait]
impl<E: Entity> RecordStore<E> for Gateway<E> {
    async fn list(&self) -> Result<Vec<E>, AppError> {
        self.store.list().await
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, AppError> {
        let record = self.store.create(draft).await?;
        self.cache.revalidate(PAGE_PATH);
        Ok(record)
    }

    async fn update(&self, id: Uuid, draft: &E::Draft) -> Result<E, AppError> {
        let record = self.store.update(id, draft).await?;
        self.cache.revalidate(PAGE_PATH);
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete(id).await?;
        self.cache.revalidate(PAGE_PATH);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RenderCache;
    use crate::models::{JobTitle, JobTitleDraft};
    use crate::store::memory::{MemoryStore, Operation};

    fn gateway() -> (Gateway<JobTitle>, Arc<MemoryStore<JobTitle>>, Arc<RenderCache<u32>>) {
        let store = Arc::new(MemoryStore::<JobTitle>::new());
        let cache = Arc::new(RenderCache::<u32>::new());
        let gateway = Gateway::new(store.clone(), cache.clone());
        (gateway, store, cache)
    }

    fn draft() -> JobTitleDraft {
        JobTitleDraft { title: "Analyst".into(), base_salary: 50_000.0 }
    }

    #[tokio::test]
    async fn successful_mutations_invalidate_the_page() {
        let (gateway, _store, cache) = gateway();
        cache.put_if_current(PAGE_PATH, 7, cache.generation());

        let record = gateway.create(&draft()).await.unwrap();
        assert_eq!(cache.get(PAGE_PATH), None);

        cache.put_if_current(PAGE_PATH, 8, cache.generation());
        gateway.delete(record.id).await.unwrap();
        assert_eq!(cache.get(PAGE_PATH), None);
    }

    #[tokio::test]
    async fn failed_mutations_and_reads_keep_the_cache() {
        let (gateway, store, cache) = gateway();
        cache.put_if_current(PAGE_PATH, 7, cache.generation());
        store.fail_on(Operation::Create, "insert failed");

        assert!(gateway.create(&draft()).await.is_err());
        gateway.list().await.unwrap();
        assert_eq!(cache.get(PAGE_PATH), Some(7));
    }
}
