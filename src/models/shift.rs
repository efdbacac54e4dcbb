use std::cmp::Ordering;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Draft, Entity};
use crate::errors::AppError;
use crate::forms::{format_time, FieldSet};

pub const UNNAMED_SHIFT: &str = "Sin Nombre";

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Shift {
    pub id: Uuid,
    pub shift_name: Option<String>,
    pub clock_in: NaiveTime,
    pub clock_out: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl Shift {
    pub fn display_name(&self) -> &str {
        self.shift_name.as_deref().unwrap_or(UNNAMED_SHIFT)
    }
}

/// Clock-out earlier than clock-in is stored as given (overnight shifts).
#[derive(Deserialize, Serialize, Validate, Debug, Clone, PartialEq)]
pub struct ShiftDraft {
    #[validate(length(min = 1))]
    pub shift_name: Option<String>,
    pub clock_in: NaiveTime,
    pub clock_out: NaiveTime,
}

impl Draft for ShiftDraft {
    fn from_fields(fields: &FieldSet) -> Result<Self, AppError> {
        ShiftDraft {
            shift_name: fields.optional("shift_name").map(str::to_string),
            clock_in: fields.parse_time("clock_in")?,
            clock_out: fields.parse_time("clock_out")?,
        }
        .prepare()
    }

    fn normalize(self) -> Self {
        ShiftDraft {
            shift_name: self
                .shift_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            ..self
        }
    }
}

impl Entity for Shift {
    type Draft = ShiftDraft;

    const COLLECTION: &'static str = "horarios";
    const LABEL: &'static str = "Horario";
    const EMPTY_MESSAGE: &'static str = "No hay horarios para mostrar. ¡Crea uno!";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: ShiftDraft) -> Self {
        Shift {
            id,
            shift_name: draft.shift_name,
            clock_in: draft.clock_in,
            clock_out: draft.clock_out,
            created_at,
        }
    }

    fn apply(&mut self, draft: ShiftDraft) {
        self.shift_name = draft.shift_name;
        self.clock_in = draft.clock_in;
        self.clock_out = draft.clock_out;
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.clock_in.cmp(&b.clock_in)
    }

    fn form_fields(&self) -> FieldSet {
        FieldSet::from([
            ("shift_name", self.shift_name.clone().unwrap_or_default()),
            ("clock_in", format_time(self.clock_in)),
            ("clock_out", format_time(self.clock_out)),
        ])
    }
}
