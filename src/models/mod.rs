pub mod clock_event;
pub mod employee;
pub mod job_title;
pub mod shift;

use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::forms::FieldSet;
use crate::utils::validation::validate_payload;

pub use clock_event::{ClockEvent, ClockEventKind, NewClockEvent};
pub use employee::{Employee, EmployeeDraft};
pub use job_title::{JobTitle, JobTitleDraft};
pub use shift::{Shift, ShiftDraft};

/// A record kept in one of the editable collections.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// The full set of mutable fields, as submitted by a form.
    type Draft: Draft;

    /// Collection name in the record store.
    const COLLECTION: &'static str;
    /// Singular label used in dialog titles and submit buttons.
    const LABEL: &'static str;
    /// Shown by an empty table.
    const EMPTY_MESSAGE: &'static str;

    fn id(&self) -> Uuid;

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// Full replace of every mutable field.
    fn apply(&mut self, draft: Self::Draft);

    /// Order in which `list()` returns records.
    fn list_order(a: &Self, b: &Self) -> Ordering;

    /// Current values as form defaults for edit mode.
    fn form_fields(&self) -> FieldSet;
}

pub trait Draft:
    Validate + Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Parses raw form input. Numeric and time fields are converted here, so
    /// malformed input never reaches the store.
    fn from_fields(fields: &FieldSet) -> Result<Self, AppError>;

    /// Trims text, folds blank optional text to `None` and rounds amounts to
    /// what the database keeps.
    fn normalize(self) -> Self;

    /// Normalizes, then validates. Form and JSON input both pass through here
    /// before reaching a store.
    fn prepare(self) -> Result<Self, AppError> {
        let draft = self.normalize();
        validate_payload(&draft)?;
        Ok(draft)
    }
}
