use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Draft, Entity};
use crate::errors::AppError;
use crate::forms::FieldSet;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Validate, Debug, Clone, PartialEq)]
pub struct EmployeeDraft {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1, max = 120))]
    pub age: i32,
    #[validate(length(min = 1))]
    pub gender: String,
    #[validate(email)]
    pub email: String,
}

impl Draft for EmployeeDraft {
    fn from_fields(fields: &FieldSet) -> Result<Self, AppError> {
        EmployeeDraft {
            name: fields.require("name")?.to_string(),
            age: fields.parse_integer("age")?,
            gender: fields.require("gender")?.to_string(),
            email: fields.require("email")?.to_string(),
        }
        .prepare()
    }

    fn normalize(self) -> Self {
        EmployeeDraft {
            name: self.name.trim().to_string(),
            age: self.age,
            gender: self.gender.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

impl Entity for Employee {
    type Draft = EmployeeDraft;

    const COLLECTION: &'static str = "usuarios";
    const LABEL: &'static str = "Usuario";
    const EMPTY_MESSAGE: &'static str = "No hay usuarios para mostrar. ¡Crea uno!";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: EmployeeDraft) -> Self {
        Employee {
            id,
            name: draft.name,
            age: draft.age,
            gender: draft.gender,
            email: draft.email,
            created_at,
        }
    }

    fn apply(&mut self, draft: EmployeeDraft) {
        self.name = draft.name;
        self.age = draft.age;
        self.gender = draft.gender;
        self.email = draft.email;
    }

    // Most recently created first.
    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }

    fn form_fields(&self) -> FieldSet {
        FieldSet::from([
            ("name", self.name.clone()),
            ("age", self.age.to_string()),
            ("gender", self.gender.clone()),
            ("email", self.email.clone()),
        ])
    }
}
