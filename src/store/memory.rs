use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Local, Timelike, Utc};
use uuid::Uuid;

use super::{ClockEventStore, RecordStore};
use crate::errors::AppError;
use crate::models::{ClockEvent, Employee, Entity, NewClockEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

struct Inner<E> {
    records: Vec<E>,
    failures: HashMap<Operation, String>,
    calls: HashMap<Operation, usize>,
}

/// In-process store with the same ordering rules as the database.
///
/// Failures can be injected per operation; they persist until cleared.
pub struct MemoryStore<E> {
    inner: Mutex<Inner<E>>,
    yield_before_calls: AtomicBool,
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<E>) -> Self {
        MemoryStore {
            inner: Mutex::new(Inner {
                records,
                failures: HashMap::new(),
                calls: HashMap::new(),
            }),
            yield_before_calls: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current contents in list order, bypassing failure injection.
    pub fn snapshot(&self) -> Vec<E> {
        let mut records = self.lock().records.clone();
        records.sort_by(E::list_order);
        records
    }

    /// Whether a record with `id` exists, bypassing failure injection.
    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().records.iter().any(|r| r.id() == id)
    }

    pub fn fail_on(&self, operation: Operation, message: &str) {
        self.lock().failures.insert(operation, message.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Makes every call suspend once before touching the data, like a network hop.
    pub fn set_yield_before_calls(&self, enabled: bool) {
        self.yield_before_calls.store(enabled, Ordering::Relaxed);
    }

    /// Counts the call and applies any injected failure.
    async fn begin(&self, operation: Operation) -> Result<(), AppError> {
        if self.yield_before_calls.load(Ordering::Relaxed) {
            tokio::task::yield_now().await;
        }
        let mut inner = self.lock();
        *inner.calls.entry(operation).or_insert(0) += 1;
        if let Some(message) = inner.failures.get(&operation).cloned() {
            return Err(AppError::DatabaseError(message));
        }
        Ok(())
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("{} {} not found", E::LABEL, id))
    }
}

#[async_trait]
impl<E: Entity> RecordStore<E> for MemoryStore<E> {
    async fn list(&self) -> Result<Vec<E>, AppError> {
        self.begin(Operation::List).await?;
        let mut records = self.lock().records.clone();
        records.sort_by(E::list_order);
        Ok(records)
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, AppError> {
        self.begin(Operation::Create).await?;
        let mut inner = self.lock();
        let record = E::from_draft(Uuid::new_v4(), Utc::now(), draft.clone());
        // Newest first so equal timestamps still sort most recent first.
        inner.records.insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, draft: &E::Draft) -> Result<E, AppError> {
        self.begin(Operation::Update).await?;
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply(draft.clone());
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.begin(Operation::Delete).await?;
        let mut inner = self.lock();
        let position = inner
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        inner.records.remove(position);
        Ok(())
    }
}

/// Clock events for employees held in `employees`; unknown ids are
/// rejected like the `tickeos` foreign key does.
pub struct MemoryClockEventStore {
    employees: Arc<MemoryStore<Employee>>,
    events: Mutex<Vec<ClockEvent>>,
    failure: Mutex<Option<String>>,
}

impl MemoryClockEventStore {
    pub fn new(employees: Arc<MemoryStore<Employee>>) -> Self {
        MemoryClockEventStore {
            employees,
            events: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_failure(&self) -> Result<(), AppError> {
        match self.failure.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(message) => Err(AppError::DatabaseError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClockEventStore for MemoryClockEventStore {
    async fn record(&self, event: NewClockEvent) -> Result<ClockEvent, AppError> {
        self.check_failure()?;
        if !self.employees.contains(event.employee_id) {
            return Err(MemoryStore::<Employee>::not_found(event.employee_id));
        }
        let now = Local::now();
        let stored = ClockEvent {
            id: Uuid::new_v4(),
            employee_id: event.employee_id,
            date: now.date_naive(),
            time: now.time().with_nanosecond(0).unwrap_or_else(|| now.time()),
            kind: event.kind,
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<ClockEvent>, AppError> {
        self.check_failure()?;
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(events
            .iter()
            .rev()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockEventKind, Employee, EmployeeDraft, JobTitle, JobTitleDraft};

    fn employee(name: &str) -> EmployeeDraft {
        EmployeeDraft {
            name: name.to_string(),
            age: 30,
            gender: "f".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn employees_list_newest_first() {
        let store = MemoryStore::<Employee>::new();
        store.create(&employee("First")).await.unwrap();
        store.create(&employee("Second")).await.unwrap();
        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["Second", "First"]);
    }

    #[tokio::test]
    async fn job_titles_list_alphabetically() {
        let store = MemoryStore::<JobTitle>::new();
        for title in ["Zeta", "Alpha", "Mid"] {
            store
                .create(&JobTitleDraft { title: title.into(), base_salary: 1.0 })
                .await
                .unwrap();
        }
        let titles: Vec<_> = store.list().await.unwrap().into_iter().map(|j| j.title).collect();
        assert_eq!(titles, ["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::<Employee>::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.delete(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            store.update(id, &employee("Nobody")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn injected_failures_persist_until_cleared() {
        let store = MemoryStore::<Employee>::new();
        store.fail_on(Operation::List, "connection refused");
        assert_eq!(
            store.list().await.unwrap_err(),
            AppError::DatabaseError("connection refused".into())
        );
        assert!(store.list().await.is_err());
        store.clear_failures();
        assert!(store.list().await.is_ok());
        assert_eq!(store.call_count(Operation::List), 3);
    }

    #[tokio::test]
    async fn clock_events_are_stamped_and_listed_per_employee() {
        let employees = Arc::new(MemoryStore::<Employee>::new());
        let ana = employees.create(&employee("Ana")).await.unwrap().id;
        let ben = employees.create(&employee("Ben")).await.unwrap().id;
        let store = MemoryClockEventStore::new(employees);
        store
            .record(NewClockEvent { employee_id: ana, kind: ClockEventKind::ClockIn })
            .await
            .unwrap();
        store
            .record(NewClockEvent { employee_id: ben, kind: ClockEventKind::ClockIn })
            .await
            .unwrap();
        store
            .record(NewClockEvent { employee_id: ana, kind: ClockEventKind::ClockOut })
            .await
            .unwrap();

        let events = store.list_for_employee(ana).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ClockEventKind::ClockOut);
        assert_eq!(events[0].date, Local::now().date_naive());
    }

    #[tokio::test]
    async fn clock_events_for_unknown_employees_are_rejected() {
        let employees = Arc::new(MemoryStore::<Employee>::new());
        let store = MemoryClockEventStore::new(employees);

        let err = store
            .record(NewClockEvent { employee_id: Uuid::new_v4(), kind: ClockEventKind::ClockIn })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.is_empty());
    }
}
