use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use store::postgres;

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>> {
        let config = Config::load();
        let pool = postgres::connect(&config.db).await?;

        Ok(Arc::new(Self { config, pool }))
    }
}
