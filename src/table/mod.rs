//! Table controller: the session's list of records for one collection, the
//! edit dialog, and reconciliation with the store after every mutation.
//!
//! Form success only raises `needs_refresh`. The re-fetch runs as a separate
//! effect ([`TableController::run_effects`]) and is the only place the dialog
//! closes after a save, so the table never shows a mix of submitted and
//! stale data.

use std::sync::Arc;

use log::{debug, error, info};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::forms::{EntityForm, FieldSet};
use crate::models::Entity;
use crate::notify::{Confirm, ConfirmRequest, Notification, Notifier};
use crate::store::RecordStore;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Idle,
    DialogOpen,
    Submitting,
    RefreshPending,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent to the store.
    Cancelled,
}

pub struct TableController<E: Entity> {
    store: Arc<dyn RecordStore<E>>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirm>,
    records: Vec<E>,
    /// `Some` while the dialog is open; its target is the record being edited.
    form: Option<EntityForm<E>>,
    needs_refresh: bool,
    is_loading: bool,
}

impl<E: Entity> TableController<E> {
    pub fn new(
        store: Arc<dyn RecordStore<E>>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirm>,
        initial: Vec<E>,
    ) -> Self {
        TableController {
            store,
            notifier,
            confirmer,
            records: initial,
            form: None,
            needs_refresh: false,
            is_loading: false,
        }
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn is_dialog_open(&self) -> bool {
        self.form.is_some()
    }

    /// `None` in create mode or when the dialog is closed.
    pub fn editing_target(&self) -> Option<&E> {
        self.form.as_ref().and_then(EntityForm::target)
    }

    pub fn form(&self) -> Option<&EntityForm<E>> {
        self.form.as_ref()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        (!self.is_loading && self.records.is_empty()).then_some(E::EMPTY_MESSAGE)
    }

    pub fn state(&self) -> TableState {
        if self.is_loading {
            TableState::Refreshing
        } else if self.needs_refresh {
            TableState::RefreshPending
        } else {
            match &self.form {
                Some(form) if form.is_submitting() => TableState::Submitting,
                Some(_) => TableState::DialogOpen,
                None => TableState::Idle,
            }
        }
    }

    pub fn open_create(&mut self) -> Result<(), AppError> {
        self.open_dialog(None)
    }

    pub fn open_edit(&mut self, id: Uuid) -> Result<(), AppError> {
        let record = self
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", E::LABEL, id)))?;
        self.open_dialog(Some(record))
    }

    fn open_dialog(&mut self, target: Option<E>) -> Result<(), AppError> {
        match self.state() {
            TableState::Idle | TableState::DialogOpen => {
                self.form = Some(EntityForm::new(target));
                Ok(())
            }
            state => Err(AppError::Conflict(format!(
                "Cannot open the {} dialog while {:?}",
                E::COLLECTION,
                state
            ))),
        }
    }

    /// Dismisses the dialog. Refused once a save has succeeded and the
    /// re-fetch has not completed yet.
    pub fn close_dialog(&mut self) -> bool {
        if self.state() == TableState::DialogOpen {
            self.form = None;
            true
        } else {
            false
        }
    }

    /// Submits the open dialog's form.
    ///
    /// On success the table moves to `RefreshPending` with the dialog still
    /// open; `records` is untouched until [`run_effects`](Self::run_effects).
    /// The owner must call `run_effects` next: until it does, opening,
    /// closing and submitting are all refused. [`save`](Self::save) does both.
    /// On failure the error has already been notified and the dialog stays
    /// open for another attempt.
    pub async fn submit(&mut self, fields: &FieldSet) -> Result<E, AppError> {
        if self.needs_refresh || self.is_loading {
            return Err(AppError::SubmissionInFlight);
        }
        let form = self
            .form
            .as_ref()
            .ok_or_else(|| AppError::Conflict(format!("No {} dialog is open", E::COLLECTION)))?;
        let needs_refresh = &mut self.needs_refresh;

        form.submit(
            self.store.as_ref(),
            self.notifier.as_ref(),
            fields,
            || *needs_refresh = true,
        )
        .await
    }

    /// Submits the form and, on success, reconciles with the store before
    /// returning. The dialog is closed and `records` holds the fresh list.
    pub async fn save(&mut self, fields: &FieldSet) -> Result<E, AppError> {
        let record = self.submit(fields).await?;
        self.run_effects().await;
        Ok(record)
    }

    /// Runs the refresh effect if `needs_refresh` is raised. Returns whether it ran.
    pub async fn run_effects(&mut self) -> bool {
        if !self.needs_refresh || self.is_loading {
            return false;
        }
        self.is_loading = true;
        debug!("Refreshing {}", E::COLLECTION);

        let fetched = self.store.list().await;

        match fetched {
            Ok(records) => {
                info!("Refreshed {}: {} records", E::COLLECTION, records.len());
                self.records = records;
            }
            Err(err) => {
                error!("Error refreshing {}: {}", E::COLLECTION, err);
                self.notifier.notify(Notification::error(format!(
                    "Error al actualizar la lista: {}",
                    err.message()
                )));
            }
        }
        self.is_loading = false;
        self.needs_refresh = false;
        self.form = None;
        true
    }

    /// Re-fetches the list on demand through the same effect used after a save.
    pub async fn refresh(&mut self) -> bool {
        self.needs_refresh = true;
        self.run_effects().await
    }

    /// Asks for confirmation, then deletes. A successful delete removes the
    /// record locally without a re-fetch; a failed one is notified and leaves
    /// `records` as it was.
    pub async fn delete(&mut self, id: Uuid) -> Result<DeleteOutcome, AppError> {
        let label = E::LABEL.to_lowercase();
        let request = ConfirmRequest {
            message: format!("¿Estás seguro de que quieres eliminar este {}?", label),
        };
        if !self.confirmer.confirm(request).await {
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.store.delete(id).await {
            Ok(()) => {
                self.records.retain(|r| r.id() != id);
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                error!("Error deleting {} {}: {}", E::COLLECTION, id, err);
                self.notifier.notify(Notification::error(format!(
                    "Error al eliminar {}: {}",
                    label,
                    err.message()
                )));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, JobTitle};
    use crate::notify::{notification_channel, AutoConfirm};
    use crate::store::memory::{MemoryStore, Operation};

    fn controller<E: Entity>(store: Arc<MemoryStore<E>>) -> TableController<E> {
        let (notifier, _rx) = notification_channel();
        TableController::new(store, Arc::new(notifier), Arc::new(AutoConfirm(true)), Vec::new())
    }

    #[test]
    fn starts_idle_with_empty_message() {
        let table = controller::<JobTitle>(Arc::new(MemoryStore::new()));
        assert_eq!(table.state(), TableState::Idle);
        assert_eq!(table.empty_message(), Some(JobTitle::EMPTY_MESSAGE));
    }

    #[test]
    fn open_and_close_dialog() {
        let mut table = controller::<Employee>(Arc::new(MemoryStore::new()));
        table.open_create().unwrap();
        assert_eq!(table.state(), TableState::DialogOpen);
        assert!(table.editing_target().is_none());
        assert!(table.close_dialog());
        assert_eq!(table.state(), TableState::Idle);
        assert!(!table.close_dialog());
    }

    #[test]
    fn open_edit_requires_a_known_record() {
        let mut table = controller::<Employee>(Arc::new(MemoryStore::new()));
        assert!(matches!(table.open_edit(Uuid::new_v4()), Err(AppError::NotFound(_))));
        assert!(!table.is_dialog_open());
    }

    #[tokio::test]
    async fn save_submits_and_reconciles() {
        let store = Arc::new(MemoryStore::<JobTitle>::new());
        let mut table = controller(store.clone());
        table.open_create().unwrap();

        let saved = table
            .save(&FieldSet::from([
                ("title", "Analyst".to_string()),
                ("base_salary", "1000".to_string()),
            ]))
            .await
            .unwrap();

        assert_eq!(table.state(), TableState::Idle);
        assert!(!table.is_dialog_open());
        assert_eq!(table.records(), [saved].as_slice());
        table.open_create().unwrap();
    }

    #[tokio::test]
    async fn failed_save_skips_the_refresh() {
        let store = Arc::new(MemoryStore::<JobTitle>::new());
        store.fail_on(Operation::Create, "insert failed");
        let mut table = controller(store.clone());
        table.open_create().unwrap();

        let result = table
            .save(&FieldSet::from([
                ("title", "Analyst".to_string()),
                ("base_salary", "1000".to_string()),
            ]))
            .await;

        assert!(result.is_err());
        assert_eq!(table.state(), TableState::DialogOpen);
        assert_eq!(store.call_count(Operation::List), 0);
    }

    #[tokio::test]
    async fn submit_without_dialog_is_refused() {
        let store = Arc::new(MemoryStore::<JobTitle>::new());
        let mut table = controller(store.clone());
        let fields = FieldSet::from([
            ("title", "Analyst".to_string()),
            ("base_salary", "1".to_string()),
        ]);
        assert!(matches!(table.submit(&fields).await, Err(AppError::Conflict(_))));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn run_effects_is_a_no_op_without_the_flag() {
        let mut table = controller::<JobTitle>(Arc::new(MemoryStore::new()));
        assert!(!table.run_effects().await);
    }
}
