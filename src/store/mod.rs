//! Record store gateway: typed access to the persistent collections.

pub mod gateway;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ClockEvent, Entity, NewClockEvent};

pub use gateway::Gateway;
pub use memory::{MemoryClockEventStore, MemoryStore};
pub use postgres::PgStore;

/// One remote round trip per call. Errors carry the store's message as-is.
#[async_trait]
pub trait RecordStore<E: Entity>: Send + Sync {
    /// All records in the collection's list order.
    async fn list(&self) -> Result<Vec<E>, AppError>;

    async fn create(&self, draft: &E::Draft) -> Result<E, AppError>;

    /// Replaces every mutable field of `id`.
    async fn update(&self, id: Uuid, draft: &E::Draft) -> Result<E, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
impl<E, S> RecordStore<E> for Arc<S>
where
    E: Entity,
    S: RecordStore<E> + ?Sized,
{
    async fn list(&self) -> Result<Vec<E>, AppError> {
        (**self).list().await
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, AppError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: Uuid, draft: &E::Draft) -> Result<E, AppError> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        (**self).delete(id).await
    }
}

/// Append-only storage for clock events. Date and time are stamped by the store.
#[async_trait]
pub trait ClockEventStore: Send + Sync {
    async fn record(&self, event: NewClockEvent) -> Result<ClockEvent, AppError>;

    /// Newest first.
    async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<ClockEvent>, AppError>;
}
