use log::info;
use sqlx::PgPool;

use crate::errors::AppError;

/// Connects to Postgres and applies pending migrations.
pub async fn create_pool(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPool::connect(database_url)
        .await
        .map_err(|err| AppError::DatabaseError(format!("Failed to connect to the database: {}", err)))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|err| AppError::DatabaseError(format!("Failed to run migrations: {}", err)))?;
    info!("Database migrations applied");

    Ok(pool)
}
