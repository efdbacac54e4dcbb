use actix_web::{App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use rrhh_panel::config::{Config, StoreBackend};
use rrhh_panel::db;
use rrhh_panel::handlers::{self, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    })?;

    let state = match &config.backend {
        StoreBackend::Postgres { database_url } => {
            let pool = db::create_pool(database_url).await.map_err(|err| {
                error!("{}", err);
                std::io::Error::new(std::io::ErrorKind::Other, err)
            })?;
            AppState::postgres(pool)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            AppState::memory()
        }
    };

    info!("Starting server at {}", config.bind_addr);

    HttpServer::new(move || App::new().configure(handlers::configure(state.clone())))
        .bind(&config.bind_addr)?
        .run()
        .await
}
