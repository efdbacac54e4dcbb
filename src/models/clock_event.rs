use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockEventKind {
    ClockIn,
    ClockOut,
}

impl ClockEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockEventKind::ClockIn => "CLOCK_IN",
            ClockEventKind::ClockOut => "CLOCK_OUT",
        }
    }
}

impl fmt::Display for ClockEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockEventKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLOCK_IN" => Ok(ClockEventKind::ClockIn),
            "CLOCK_OUT" => Ok(ClockEventKind::ClockOut),
            other => Err(AppError::Validation(format!(
                "Clock event kind must be CLOCK_IN or CLOCK_OUT, got '{}'",
                other
            ))),
        }
    }
}

/// Append-only: there is no update or delete for clock events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClockEvent {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub kind: ClockEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewClockEvent {
    pub employee_id: Uuid,
    pub kind: ClockEventKind,
}

impl<'r> FromRow<'r, PgRow> for ClockEvent {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        Ok(ClockEvent {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            kind: kind.parse().map_err(|err: AppError| sqlx::Error::ColumnDecode {
                index: "kind".to_string(),
                source: Box::new(err),
            })?,
        })
    }
}
