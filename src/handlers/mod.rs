pub mod clock_event;
pub mod page;
pub mod records;

use std::sync::Arc;

use actix_web::web;
use sqlx::PgPool;

use crate::cache::{RenderCache, Revalidate};
use crate::errors::AppError;
use crate::models::{Employee, Entity, JobTitle, Shift};
use crate::page::{PageSnapshot, PanelStores};
use crate::store::{ClockEventStore, Gateway, MemoryClockEventStore, MemoryStore, PgStore, RecordStore};

/// Everything the handlers share. Every record store is wrapped in a
/// [`Gateway`] that invalidates the cached page after mutations.
#[derive(Clone)]
pub struct AppState {
    pub stores: PanelStores,
    pub clock_events: Arc<dyn ClockEventStore>,
    pub cache: Arc<RenderCache<PageSnapshot>>,
}

impl AppState {
    pub fn new(
        employees: Arc<dyn RecordStore<Employee>>,
        job_titles: Arc<dyn RecordStore<JobTitle>>,
        shifts: Arc<dyn RecordStore<Shift>>,
        clock_events: Arc<dyn ClockEventStore>,
    ) -> Self {
        let cache = Arc::new(RenderCache::new());
        let revalidate: Arc<dyn Revalidate> = cache.clone();
        let stores = PanelStores {
            employees: Arc::new(Gateway::new(employees, revalidate.clone())),
            job_titles: Arc::new(Gateway::new(job_titles, revalidate.clone())),
            shifts: Arc::new(Gateway::new(shifts, revalidate)),
        };
        AppState { stores, clock_events, cache }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store.clone(), store.clone(), store)
    }

    pub fn memory() -> Self {
        let employees = Arc::new(MemoryStore::<Employee>::new());
        Self::new(
            employees.clone(),
            Arc::new(MemoryStore::<JobTitle>::new()),
            Arc::new(MemoryStore::<Shift>::new()),
            Arc::new(MemoryClockEventStore::new(employees)),
        )
    }
}

/// Registers shared state and every route.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

        cfg.app_data(json_config)
            .app_data(web::Data::from(state.stores.employees.clone()))
            .app_data(web::Data::from(state.stores.job_titles.clone()))
            .app_data(web::Data::from(state.stores.shifts.clone()))
            .app_data(web::Data::from(state.clock_events.clone()))
            .app_data(web::Data::from(state.cache.clone()))
            .app_data(web::Data::new(state.stores.clone()))
            .service(web::resource("/").route(web::get().to(page::get_page)))
            .configure(record_routes::<Employee>)
            .configure(record_routes::<JobTitle>)
            .configure(record_routes::<Shift>)
            .service(
                web::resource("/v1/tickeos")
                    .route(web::post().to(clock_event::record_clock_event)),
            )
            .service(
                web::resource("/v1/tickeos/{employee_id}")
                    .route(web::get().to(clock_event::get_clock_events)),
            );
    }
}

fn record_routes<E: Entity>(cfg: &mut web::ServiceConfig) {
    let collection = format!("/v1/{}", E::COLLECTION);
    cfg.service(
        web::resource(collection.as_str())
            .route(web::get().to(records::list_records::<E>))
            .route(web::post().to(records::create_record::<E>)),
    )
    .service(
        web::resource(format!("{}/{{id}}", collection))
            .route(web::put().to(records::update_record::<E>))
            .route(web::delete().to(records::delete_record::<E>)),
    );
}
