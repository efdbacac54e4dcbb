use async_trait::async_trait;
use log::error;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use super::{ClockEventStore, RecordStore};
use crate::errors::AppError;
use crate::models::{
    ClockEvent, Employee, EmployeeDraft, Entity, JobTitle, JobTitleDraft, NewClockEvent, Shift,
    ShiftDraft,
};

type PgQueryAs<'q, E> = QueryAs<'q, Postgres, E, PgArguments>;

/// SQL for one editable collection. Ids and `created_at` are assigned by the database.
pub trait PgRecord: Entity + for<'r> FromRow<'r, PgRow> {
    /// `SELECT <columns> FROM <table>`
    const SELECT: &'static str;
    const ORDER_BY: &'static str;
    /// Draft fields bound as `$1..$n`, returning the full row.
    const INSERT: &'static str;
    /// Draft fields bound as `$1..$n`, id as `$n+1`, returning the full row.
    const UPDATE: &'static str;

    fn bind_draft<'q>(query: PgQueryAs<'q, Self>, draft: &Self::Draft) -> PgQueryAs<'q, Self>;
}

impl PgRecord for Employee {
    const SELECT: &'static str = "SELECT id, name, age, gender, email, created_at FROM usuarios";
    const ORDER_BY: &'static str = "created_at DESC";
    const INSERT: &'static str = "INSERT INTO usuarios (name, age, gender, email) VALUES ($1, $2, $3, $4) \
         RETURNING id, name, age, gender, email, created_at";
    const UPDATE: &'static str = "UPDATE usuarios SET name = $1, age = $2, gender = $3, email = $4 WHERE id = $5 \
         RETURNING id, name, age, gender, email, created_at";

    fn bind_draft<'q>(query: PgQueryAs<'q, Self>, draft: &EmployeeDraft) -> PgQueryAs<'q, Self> {
        query
            .bind(draft.name.clone())
            .bind(draft.age)
            .bind(draft.gender.clone())
            .bind(draft.email.clone())
    }
}

impl PgRecord for JobTitle {
    const SELECT: &'static str =
        "SELECT id, title, base_salary::float8 AS base_salary, created_at FROM cargos";
    const ORDER_BY: &'static str = "title ASC";
    const INSERT: &'static str = "INSERT INTO cargos (title, base_salary) VALUES ($1, $2::numeric) \
         RETURNING id, title, base_salary::float8 AS base_salary, created_at";
    const UPDATE: &'static str = "UPDATE cargos SET title = $1, base_salary = $2::numeric WHERE id = $3 \
         RETURNING id, title, base_salary::float8 AS base_salary, created_at";

    fn bind_draft<'q>(query: PgQueryAs<'q, Self>, draft: &JobTitleDraft) -> PgQueryAs<'q, Self> {
        query.bind(draft.title.clone()).bind(draft.base_salary)
    }
}

impl PgRecord for Shift {
    const SELECT: &'static str =
        "SELECT id, shift_name, clock_in, clock_out, created_at FROM horarios";
    const ORDER_BY: &'static str = "clock_in ASC";
    const INSERT: &'static str = "INSERT INTO horarios (shift_name, clock_in, clock_out) VALUES ($1, $2, $3) \
         RETURNING id, shift_name, clock_in, clock_out, created_at";
    const UPDATE: &'static str = "UPDATE horarios SET shift_name = $1, clock_in = $2, clock_out = $3 WHERE id = $4 \
         RETURNING id, shift_name, clock_in, clock_out, created_at";

    fn bind_draft<'q>(query: PgQueryAs<'q, Self>, draft: &ShiftDraft) -> PgQueryAs<'q, Self> {
        query
            .bind(draft.shift_name.clone())
            .bind(draft.clock_in)
            .bind(draft.clock_out)
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn store_error(collection: &str, action: &str, err: sqlx::Error) -> AppError {
    error!("Error {} {}: {:?}", action, collection, err);
    AppError::DatabaseError(err.to_string())
}

fn not_found<E: Entity>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", E::LABEL, id))
}

#[async_trait]
impl<E: PgRecord> RecordStore<E> for PgStore {
    async fn list(&self) -> Result<Vec<E>, AppError> {
        let sql = format!("{} ORDER BY {}", E::SELECT, E::ORDER_BY);
        sqlx::query_as::<_, E>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| store_error(E::COLLECTION, "listing", err))
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, AppError> {
        E::bind_draft(sqlx::query_as::<_, E>(E::INSERT), draft)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| store_error(E::COLLECTION, "creating", err))
    }

    async fn update(&self, id: Uuid, draft: &E::Draft) -> Result<E, AppError> {
        E::bind_draft(sqlx::query_as::<_, E>(E::UPDATE), draft)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| store_error(E::COLLECTION, "updating", err))?
            .ok_or_else(|| not_found::<E>(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::COLLECTION);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| store_error(E::COLLECTION, "deleting", err))?;

        if result.rows_affected() == 0 {
            return Err(not_found::<E>(id));
        }
        Ok(())
    }
}

#[async_trait]
impl ClockEventStore for PgStore {
    async fn record(&self, event: NewClockEvent) -> Result<ClockEvent, AppError> {
        sqlx::query_as::<_, ClockEvent>(
            "INSERT INTO tickeos (employee_id, event_date, event_time, kind) \
             VALUES ($1, CURRENT_DATE, LOCALTIME(0), $2) \
             RETURNING id, employee_id, event_date AS date, event_time AS time, kind",
        )
        .bind(event.employee_id)
        .bind(event.kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            let unknown_employee = err
                .as_database_error()
                .map_or(false, |db| db.is_foreign_key_violation());
            if unknown_employee {
                return not_found::<Employee>(event.employee_id);
            }
            store_error("tickeos", &format!("recording {}", event.kind), err)
        })
    }

    async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<ClockEvent>, AppError> {
        sqlx::query_as::<_, ClockEvent>(
            "SELECT id, employee_id, event_date AS date, event_time AS time, kind FROM tickeos \
             WHERE employee_id = $1 ORDER BY event_date DESC, event_time DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| store_error("tickeos", "listing", err))
    }
}
