use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Draft, Entity};
use crate::store::RecordStore;

pub async fn list_records<E: Entity>(
    store: web::Data<dyn RecordStore<E>>,
) -> Result<HttpResponse, AppError> {
    let records = store.list().await?;
    Ok(HttpResponse::Ok().json(records))
}

pub async fn create_record<E: Entity>(
    store: web::Data<dyn RecordStore<E>>,
    draft: web::Json<E::Draft>,
) -> Result<HttpResponse, AppError> {
    let draft = draft.into_inner().prepare()?;

    let record = store.create(&draft).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Full replace; every mutable field must be present.
pub async fn update_record<E: Entity>(
    store: web::Data<dyn RecordStore<E>>,
    id: web::Path<Uuid>,
    draft: web::Json<E::Draft>,
) -> Result<HttpResponse, AppError> {
    let draft = draft.into_inner().prepare()?;

    let record = store.update(id.into_inner(), &draft).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete_record<E: Entity>(
    store: web::Data<dyn RecordStore<E>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    store.delete(id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} deleted successfully", E::LABEL),
    })))
}
