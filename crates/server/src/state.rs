use chrono::{Local, NaiveDate};
use finpulse_storage::DbPool;
use std::sync::Arc;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// Date the review week and dashboard are computed for.
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            today: local_today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
