use log::info;
use uuid::Uuid;

use crate::cache::{Revalidate, ATTENDANCE_PATH};
use crate::errors::AppError;
use crate::models::{ClockEvent, ClockEventKind, NewClockEvent};
use crate::store::ClockEventStore;

/// Records a clock-in or clock-out for `employee_id`, stamped with the
/// store's current date and time.
///
/// `kind` must be `CLOCK_IN` or `CLOCK_OUT`; anything else fails validation
/// and nothing is written.
pub async fn record_clock_event(
    store: &dyn ClockEventStore,
    cache: &dyn Revalidate,
    employee_id: Uuid,
    kind: &str,
) -> Result<ClockEvent, AppError> {
    let kind: ClockEventKind = kind.parse()?;
    let event = store.record(NewClockEvent { employee_id, kind }).await?;
    info!("Recorded {} for employee {}", event.kind, event.employee_id);
    cache.revalidate(ATTENDANCE_PATH);
    Ok(event)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{NoCache, RenderCache};
    use crate::models::{Employee, EmployeeDraft};
    use crate::store::{MemoryClockEventStore, MemoryStore, RecordStore};

    async fn store_with_employee() -> (MemoryClockEventStore, Uuid) {
        let employees = Arc::new(MemoryStore::<Employee>::new());
        let employee = employees
            .create(&EmployeeDraft {
                name: "Ana".into(),
                age: 30,
                gender: "femenino".into(),
                email: "ana@example.com".into(),
            })
            .await
            .unwrap();
        (MemoryClockEventStore::new(employees), employee.id)
    }

    #[tokio::test]
    async fn rejects_unknown_kinds_without_writing() {
        let (store, employee_id) = store_with_employee().await;
        let err = record_clock_event(&store, &NoCache, employee_id, "LUNCH")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn records_and_invalidates_attendance() {
        let (store, employee_id) = store_with_employee().await;
        let cache = RenderCache::new();
        cache.put_if_current(ATTENDANCE_PATH, 1u8, cache.generation());

        let event = record_clock_event(&store, &cache, employee_id, "CLOCK_IN")
            .await
            .unwrap();

        assert_eq!(event.kind, ClockEventKind::ClockIn);
        assert_eq!(event.employee_id, employee_id);
        assert_eq!(store.len(), 1);
        assert_eq!(cache.get(ATTENDANCE_PATH), None);
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let (store, employee_id) = store_with_employee().await;
        store.fail_with("connection reset");
        let err = record_clock_event(&store, &NoCache, employee_id, "CLOCK_OUT")
            .await
            .unwrap_err();
        assert_eq!(err, AppError::DatabaseError("connection reset".into()));
    }

    #[tokio::test]
    async fn unknown_employee_is_not_found_and_keeps_the_cache() {
        let (store, _) = store_with_employee().await;
        let cache = RenderCache::new();
        cache.put_if_current(ATTENDANCE_PATH, 1u8, cache.generation());

        let err = record_clock_event(&store, &cache, Uuid::new_v4(), "CLOCK_IN")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.is_empty());
        assert_eq!(cache.get(ATTENDANCE_PATH), Some(1));
    }
}
