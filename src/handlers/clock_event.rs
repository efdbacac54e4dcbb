use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::cache::RenderCache;
use crate::clock;
use crate::errors::AppError;
use crate::page::PageSnapshot;
use crate::store::ClockEventStore;

#[derive(Deserialize)]
pub struct ClockEventRequest {
    employee_id: Uuid,
    kind: String,
}

pub async fn record_clock_event(
    store: web::Data<dyn ClockEventStore>,
    cache: web::Data<RenderCache<PageSnapshot>>,
    request: web::Json<ClockEventRequest>,
) -> Result<HttpResponse, AppError> {
    let event =
        clock::record_clock_event(store.get_ref(), cache.get_ref(), request.employee_id, &request.kind)
            .await?;
    Ok(HttpResponse::Created().json(event))
}

pub async fn get_clock_events(
    store: web::Data<dyn ClockEventStore>,
    employee_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let events = store.list_for_employee(employee_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(events))
}
