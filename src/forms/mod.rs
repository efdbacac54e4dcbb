//! Form input handling: raw field sets and the entity form bound to one record.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveTime;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Draft, Entity};
use crate::notify::{Notification, Notifier};
use crate::store::RecordStore;

/// Plain string key/value pairs, exactly as typed by the user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, String>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Trimmed value, `None` when missing or blank.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str, AppError> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("Field '{}' is required", name)))
    }

    pub fn parse_integer(&self, name: &str) -> Result<i32, AppError> {
        self.require(name)?
            .parse()
            .map_err(|_| AppError::Validation(format!("Field '{}' must be a whole number", name)))
    }

    /// Finite, rounded to two decimals.
    pub fn parse_decimal(&self, name: &str) -> Result<f64, AppError> {
        let value: f64 = self
            .require(name)?
            .parse()
            .map_err(|_| AppError::Validation(format!("Field '{}' must be a number", name)))?;
        if !value.is_finite() {
            return Err(AppError::Validation(format!("Field '{}' must be a number", name)));
        }
        Ok(round_cents(value))
    }

    /// Accepts `HH:MM` from time inputs and `HH:MM:SS` as stored.
    pub fn parse_time(&self, name: &str) -> Result<NaiveTime, AppError> {
        let raw = self.require(name)?;
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| AppError::Validation(format!("Field '{}' must be a time (HH:MM)", name)))
    }
}

/// Rounds to two decimals, as `NUMERIC(12,2)` stores it.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl<const N: usize> From<[(&str, String); N]> for FieldSet {
    fn from(pairs: [(&str, String); N]) -> Self {
        FieldSet(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl FromIterator<(String, String)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        FieldSet(iter.into_iter().collect())
    }
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A form bound to one record (edit mode) or none (create mode).
///
/// The form keeps no state after a successful submission; the caller learns
/// about success only through the callback passed to [`EntityForm::submit`].
#[derive(Debug)]
pub struct EntityForm<E: Entity> {
    target: Option<E>,
    in_flight: Arc<AtomicBool>,
}

impl<E: Entity> EntityForm<E> {
    pub fn new(target: Option<E>) -> Self {
        EntityForm {
            target,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn target(&self) -> Option<&E> {
        self.target.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The submit control is disabled while a request is in flight.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting()
    }

    pub fn title(&self) -> String {
        if self.is_editing() {
            format!("Editar {}", E::LABEL)
        } else {
            format!("Crear Nuevo {}", E::LABEL)
        }
    }

    pub fn submit_label(&self) -> String {
        if self.is_submitting() {
            "Guardando...".to_string()
        } else if self.is_editing() {
            format!("Actualizar {}", E::LABEL)
        } else {
            format!("Crear {}", E::LABEL)
        }
    }

    /// Initial input values: the target's fields in edit mode, empty otherwise.
    pub fn default_fields(&self) -> FieldSet {
        self.target.as_ref().map(E::form_fields).unwrap_or_default()
    }

    /// Parses `fields`, then creates or updates through `store`.
    ///
    /// On success `on_success` is invoked and the persisted record returned.
    /// Failures are pushed to `notifier` as error notifications and returned;
    /// a second call while one is pending fails with
    /// [`AppError::SubmissionInFlight`] without touching the store.
    pub async fn submit<F>(
        &self,
        store: &dyn RecordStore<E>,
        notifier: &dyn Notifier,
        fields: &FieldSet,
        on_success: F,
    ) -> Result<E, AppError>
    where
        F: FnOnce(),
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Ignoring duplicate {} submission", E::COLLECTION);
            return Err(AppError::SubmissionInFlight);
        }
        let _guard = InFlight(&self.in_flight);

        let result = match E::Draft::from_fields(fields) {
            Ok(draft) => match &self.target {
                Some(target) => store.update(target.id(), &draft).await,
                None => store.create(&draft).await,
            },
            Err(err) => Err(err),
        };

        match result {
            Ok(record) => {
                on_success();
                Ok(record)
            }
            Err(err) => {
                error!("Error saving {} record: {}", E::COLLECTION, err);
                notifier.notify(Notification::error(format!("Error: {}", err.message())));
                Err(err)
            }
        }
    }
}
