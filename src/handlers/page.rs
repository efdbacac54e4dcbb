use actix_web::{web, HttpResponse};

use crate::cache::RenderCache;
use crate::errors::AppError;
use crate::page::{load_cached, PageSnapshot, PanelStores};

/// The three lists as one snapshot. If any of them fails to load only the
/// error list is returned.
pub async fn get_page(
    stores: web::Data<PanelStores>,
    cache: web::Data<RenderCache<PageSnapshot>>,
) -> Result<HttpResponse, AppError> {
    let snapshot = load_cached(&stores, &cache).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}
