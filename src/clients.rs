use std::{sync::Arc, time::Duration};

use color_eyre::eyre::Result;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::{info, warn};

use crate::{
    config::Config,
    repository::{MemoryPlaceRepository, PgPlaceRepository, PlaceRepository},
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<Pool<Postgres>> {
    info!("Connecting to db");
    let db_pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!().run(&db_pool).await?;
    info!("Connected");
    Ok(db_pool)
}

pub async fn init_repository(config: &Config) -> Result<Arc<dyn PlaceRepository>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = init_db(database_url, config.db_max_connections).await?;
            Ok(Arc::new(PgPlaceRepository::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, spaces are kept in memory only");
            Ok(Arc::new(MemoryPlaceRepository::default()))
        }
    }
}

pub fn init_reqwest_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
